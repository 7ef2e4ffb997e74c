use async_trait::async_trait;

use crate::domains::message::AgentMessage;
use crate::error::Result;

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: AgentMessage) -> Result<()>;
}
