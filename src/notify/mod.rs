//! Delivery seam for recipient-addressed text messages, plus the router
//! that decides who gets what.

pub mod router;
pub mod slack;

use async_trait::async_trait;

/// Delivers one formatted text message to one named recipient.
///
/// `true` means confirmed delivery. Ordinary delivery failures are logged
/// inside the implementation and surface as `false`; only configuration
/// problems (missing credentials) are errors, and those are caught at
/// config time before a sender is ever built.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> bool;
}

// --- Test helper ---
/// Records every send; optionally fails for chosen recipients.
#[derive(Debug, Default)]
pub struct RecordingSender {
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
    pub fail_for: Vec<String>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_for: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, recipient: &str, text: &str) -> bool {
        if self.fail_for.iter().any(|r| r == recipient) {
            return false;
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));
        true
    }
}
