use reqwest::Response;

use crate::error::{AgentverseError, Result};

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

pub(crate) fn address_path(address: &str) -> String {
    urlencoding::encode(address.trim()).into_owned()
}

pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(AgentverseError::http_status(status.as_u16(), &url, &body))
}
