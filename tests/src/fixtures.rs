//! Shared builders for integration tests.

use shared_types::{
    DispositionReceiver, HeaderValue, Headers, InboundMessage, DUPLICATE_ID_HEADER,
};
use std::time::Duration;

pub const BANK_A: &str = "O=Bank A, L=London, C=GB";
pub const BANK_B: &str = "O=Bank B, L=New York, C=US";

/// Build a message from `source` to `topic` with the given header keys.
#[must_use]
pub fn message(
    source: &str,
    topic: &str,
    payload: &[u8],
    header_keys: &[&str],
) -> (InboundMessage, DispositionReceiver) {
    let headers: Headers = header_keys
        .iter()
        .map(|k| ((*k).to_string(), HeaderValue::from(format!("{k}-value"))))
        .collect();
    InboundMessage::new(source, topic, payload.to_vec(), headers)
}

/// Build a message carrying an idempotency token.
#[must_use]
pub fn message_with_token(
    source: &str,
    topic: &str,
    token: &str,
) -> (InboundMessage, DispositionReceiver) {
    let mut headers = Headers::new();
    headers.insert(DUPLICATE_ID_HEADER.to_string(), HeaderValue::from(token));
    InboundMessage::new(source, topic, b"payload".to_vec(), headers)
}

/// Poll `condition` until it holds, panicking after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let reached = tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "condition not reached within 2s");
}
