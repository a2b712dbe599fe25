//! # Inbox Registry
//!
//! Routing legitimacy check backed by a registry of inbox queues.
//!
//! A topic is legitimate for a source when it has the form
//! `p2p.inbound.<inbox>` and `<inbox>` is registered for the source's
//! organisation.

use crate::ports::InboxTopicValidator;
use parking_lot::RwLock;
use shared_bus::{ServiceState, ServiceStateSupport};
use shared_types::{LegalName, P2P_INBOUND_PREFIX};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub struct InboxRegistry {
    state: ServiceState,
    inboxes: RwLock<HashMap<String, HashSet<String>>>,
}

impl InboxRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ServiceState::new("inbox-registry"),
            inboxes: RwLock::new(HashMap::new()),
        }
    }

    pub fn start(&self) {
        self.state.set_active(true);
    }

    pub fn stop(&self) {
        self.state.set_active(false);
    }

    /// Allow `owner`'s organisation to deliver to `inbox`.
    pub fn register(&self, owner: &LegalName, inbox: impl Into<String>) {
        let inbox = inbox.into();
        debug!(organisation = %owner.organisation, %inbox, "Inbox registered");
        self.inboxes
            .write()
            .entry(owner.organisation.clone())
            .or_default()
            .insert(inbox);
    }

    /// Returns `true` if the inbox was registered.
    pub fn unregister(&self, owner: &LegalName, inbox: &str) -> bool {
        let mut inboxes = self.inboxes.write();
        let Some(owned) = inboxes.get_mut(&owner.organisation) else {
            return false;
        };
        let removed = owned.remove(inbox);
        if owned.is_empty() {
            inboxes.remove(&owner.organisation);
        }
        removed
    }

    /// Full topic for `inbox`.
    #[must_use]
    pub fn topic_for(inbox: &str) -> String {
        format!("{P2P_INBOUND_PREFIX}{inbox}")
    }
}

impl Default for InboxRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceStateSupport for InboxRegistry {
    fn service_state(&self) -> &ServiceState {
        &self.state
    }
}

impl InboxTopicValidator for InboxRegistry {
    fn validate_receive_topic(&self, topic: &str, source: &LegalName) -> bool {
        let Some(inbox) = topic.strip_prefix(P2P_INBOUND_PREFIX) else {
            return false;
        };
        if inbox.is_empty() {
            return false;
        }
        self.inboxes
            .read()
            .get(&source.organisation)
            .is_some_and(|owned| owned.contains(inbox))
    }
}
