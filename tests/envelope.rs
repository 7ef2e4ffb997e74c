mod common;

use serde_json::json;
use uuid::Uuid;

use agentverse::domains::envelope::{parse_message, Envelope};
use agentverse::error::AgentverseError;
use agentverse::interfaces::identity::Identity;

use common::{identity, BrokenSigner};

fn signed_envelope() -> Envelope {
    let alice = identity("alice");
    let bob = identity("bob");
    let mut env = Envelope::new(alice.address(), bob.address(), "model:hello", None)
        .with_expires(1_700_000_000)
        .with_nonce(7);
    env.encode_payload(r#"{"text":"hi bob"}"#);
    env.sign(&alice).unwrap();
    env
}

#[test]
fn signed_envelopes_verify() {
    let alice = identity("alice");
    let bob = identity("bob");
    for payload in ["{}", "[1,2,3]", r#"{"nested":{"a":[null,true]}}"#, "\"ünïcødé\""] {
        let mut env = Envelope::new(alice.address(), bob.address(), "schema", Some("proto".into()));
        env.encode_payload(payload);
        env.sign(&alice).unwrap();
        assert!(env.verify().unwrap());
        assert_eq!(env.decode_payload().unwrap(), payload);
    }

    // no payload, expiry or nonce at all
    let mut bare = Envelope::new(alice.address(), bob.address(), "schema", None);
    bare.sign(&alice).unwrap();
    assert!(bare.verify().unwrap());
}

#[test]
fn mutating_digested_fields_breaks_the_signature() {
    let original = signed_envelope();
    assert!(original.verify().unwrap());

    let mutations: Vec<Box<dyn Fn(&mut Envelope)>> = vec![
        Box::new(|e| e.sender = identity("mallory").address().to_string()),
        Box::new(|e| e.target = identity("mallory").address().to_string()),
        Box::new(|e| e.session = Uuid::new_v4()),
        Box::new(|e| e.schema_digest = "model:other".to_string()),
        Box::new(|e| e.encode_payload(r#"{"text":"hi eve"}"#)),
        Box::new(|e| e.payload = None),
        Box::new(|e| e.expires = Some(1_700_000_001)),
        Box::new(|e| e.expires = None),
        Box::new(|e| e.nonce = Some(8)),
        Box::new(|e| e.nonce = None),
    ];
    for mutate in mutations {
        let mut env = original.clone();
        mutate(&mut env);
        assert!(!env.verify().unwrap());
    }

    // fields outside the digest can change freely
    let mut env = original.clone();
    env.protocol_digest = Some("proto:changed".to_string());
    env.version = 2;
    assert!(env.verify().unwrap());
}

#[test]
fn verify_without_signature_is_an_error_not_false() {
    let env = Envelope::new("agent1a", "agent1b", "schema", None);
    let err = env.verify().unwrap_err();
    assert!(matches!(err, AgentverseError::Config(_)));
}

#[test]
fn signing_failures_surface_as_signing_errors() {
    let mut env = Envelope::new("agent1broken", "agent1b", "schema", None);
    let err = env.sign(&BrokenSigner).unwrap_err();
    assert!(matches!(err, AgentverseError::Signing(_)));
    assert!(err.to_string().contains("hardware key unplugged"));
    assert!(env.signature.is_none());
}

#[test]
fn wire_json_round_trips_and_parses() {
    let env = signed_envelope();
    let wire = env.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["session"], env.session.to_string());
    assert_eq!(value["protocol_digest"], serde_json::Value::Null);
    assert_eq!(value["expires"], 1_700_000_000u64);

    let message = parse_message(&wire).unwrap();
    assert_eq!(message.sender, env.sender);
    assert_eq!(message.target, env.target);
    assert_eq!(message.payload, json!({"text": "hi bob"}));
}

#[test]
fn parse_rejects_tampered_unsigned_and_malformed_envelopes() {
    let mut env = signed_envelope();
    env.encode_payload(r#"{"text":"forged"}"#);
    let err = parse_message(&env.to_json().unwrap()).unwrap_err();
    assert!(matches!(err, AgentverseError::InvalidSignature(_)));

    env.signature = None;
    let err = parse_message(&env.to_json().unwrap()).unwrap_err();
    assert!(matches!(err, AgentverseError::Config(_)));

    let err = parse_message("{not json").unwrap_err();
    assert!(matches!(err, AgentverseError::Serialization(_)));
}

#[test]
fn parse_rejects_payloads_that_are_not_json() {
    let alice = identity("alice");
    let mut env = Envelope::new(alice.address(), "agent1b", "schema", None);
    env.encode_payload("plain text");
    env.sign(&alice).unwrap();
    let err = parse_message(&env.to_json().unwrap()).unwrap_err();
    assert!(matches!(err, AgentverseError::Serialization(_)));
}

#[test]
fn only_version_4_sessions_are_accepted_on_the_wire() {
    let env = signed_envelope();
    let mut value: serde_json::Value = serde_json::from_str(&env.to_json().unwrap()).unwrap();
    value["session"] = json!("00000000-0000-1000-8000-000000000000");
    let err = Envelope::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, AgentverseError::Serialization(_)));
    assert!(err.to_string().contains("version 4"));

    let err = parse_message(&value.to_string()).unwrap_err();
    assert!(matches!(err, AgentverseError::Serialization(_)));

    // uppercase hex is still a valid v4 session
    value["session"] = json!(env.session.to_string().to_uppercase());
    let parsed = Envelope::from_json(&value.to_string()).unwrap();
    assert_eq!(parsed.session, env.session);
    assert!(parsed.verify().unwrap());
}
