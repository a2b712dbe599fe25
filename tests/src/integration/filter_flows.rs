//! # Message Filter Flows
//!
//! The gate wired to the in-memory broker, inbox registry and tracing audit,
//! driven through the public `IncomingMessageFilter` port.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fw_01_message_filter::{
        AuditEventKind, InMemoryBroker, InboxRegistry, IncomingMessageFilter,
        MessageFilterService, TracingAuditService, DEPENDENCIES_DOWN_REASON,
    };
    use shared_bus::ServiceStateSupport;
    use shared_types::{
        Disposition, FirewallConfiguration, FirewallMode, LegalName, BRIDGED_CERTIFICATE_SUBJECT,
    };

    use crate::fixtures::{eventually, message, message_with_token, BANK_A, BANK_B};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct Bridge {
        broker: Arc<InMemoryBroker>,
        audit: Arc<TracingAuditService>,
        gate: MessageFilterService<InMemoryBroker, InboxRegistry, TracingAuditService>,
    }

    fn bridge(config: FirewallConfiguration) -> Bridge {
        let broker = Arc::new(InMemoryBroker::new());
        let inboxes = Arc::new(InboxRegistry::new());
        let audit = Arc::new(TracingAuditService::new());
        inboxes.register(&LegalName::parse(BANK_A).unwrap(), "bank-a");
        audit.start();
        inboxes.start();

        let gate = MessageFilterService::new(
            &config,
            Arc::clone(&broker),
            Arc::clone(&inboxes),
            Arc::clone(&audit),
        );
        Bridge {
            broker,
            audit,
            gate,
        }
    }

    async fn active_bridge(config: FirewallConfiguration) -> Bridge {
        let bridge = bridge(config);
        bridge.broker.set_connected(true);
        bridge.gate.start();
        eventually(|| bridge.gate.is_active()).await;
        bridge
    }

    fn bank_a_inbox() -> String {
        InboxRegistry::topic_for("bank-a")
    }

    // =========================================================================
    // INTEGRATION TESTS
    // =========================================================================

    #[tokio::test]
    async fn test_inactive_gate_requests_redelivery() {
        let bridge = bridge(FirewallConfiguration::new(FirewallMode::BridgeInner));
        bridge.gate.start();

        let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &[]);
        bridge.gate.send_message_to_local_broker(msg);

        assert_eq!(rx.await.unwrap(), Disposition::Redeliver);
        let events = bridge.audit.recent_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            AuditEventKind::Dropped {
                reason: DEPENDENCIES_DOWN_REASON.to_string()
            }
        );
        assert!(bridge.broker.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_whitelisted_headers_are_forwarded_with_bridged_identity() {
        let config = FirewallConfiguration::new(FirewallMode::BridgeInner)
            .with_whitelist(["A", "B", "C"]);
        let bridge = active_bridge(config).await;

        let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &["A", "B"]);
        bridge.gate.send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Forwarded);

        let delivered = bridge.broker.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].address, bank_a_inbox());
        let outbound = &delivered[0].message;
        let keys: Vec<&str> = outbound.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B", BRIDGED_CERTIFICATE_SUBJECT]);
        assert_eq!(outbound.bridged_identity(), Some(BANK_A));
        assert_eq!(outbound.body, b"abc");

        assert_eq!(bridge.audit.stats().inbound_accepted, 1);
        assert_eq!(bridge.audit.stats().inbound_dropped, 0);
    }

    #[tokio::test]
    async fn test_disallowed_header_is_consumed() {
        let config = FirewallConfiguration::new(FirewallMode::BridgeInner)
            .with_whitelist(["A", "B", "C"]);
        let bridge = active_bridge(config).await;

        let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &["Z"]);
        bridge.gate.send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Dropped);

        let events = bridge.audit.recent_events();
        assert_eq!(events.len(), 1);
        match &events[0].kind {
            AuditEventKind::Dropped { reason } => assert!(reason.contains("Disallowed header")),
            other => panic!("unexpected audit event {other:?}"),
        }
        assert!(bridge.broker.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_cross_tenant_topic_is_consumed() {
        let bridge = active_bridge(FirewallConfiguration::new(FirewallMode::BridgeInner)).await;

        let (msg, rx) = message(BANK_B, &bank_a_inbox(), b"abc", &[]);
        bridge.gate.send_message_to_local_broker(msg);

        assert_eq!(rx.await.unwrap(), Disposition::Dropped);
        assert_eq!(bridge.audit.stats().inbound_dropped, 1);
        assert!(bridge.broker.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_broker_flap_reopens_link() {
        let bridge = active_bridge(FirewallConfiguration::new(FirewallMode::BridgeInner)).await;
        let first = bridge.gate.link_generation();

        bridge.broker.set_connected(false);
        eventually(|| !bridge.gate.is_active()).await;
        let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &[]);
        bridge.gate.send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Redeliver);
        assert_eq!(bridge.broker.open_sessions(), 0);

        bridge.broker.set_connected(true);
        eventually(|| bridge.gate.is_active()).await;
        assert_ne!(bridge.gate.link_generation(), first);

        let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &[]);
        bridge.gate.send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Forwarded);
        assert_eq!(bridge.gate.stats().links_opened, 2);
    }

    #[tokio::test]
    async fn test_repeated_failures_log_once_per_token() {
        let bridge = active_bridge(FirewallConfiguration::new(FirewallMode::BridgeInner)).await;
        bridge.broker.fail_sends(true);

        for _ in 0..5 {
            let (msg, rx) = message_with_token(BANK_A, &bank_a_inbox(), "retry-1");
            bridge.gate.send_message_to_local_broker(msg);
            assert_eq!(rx.await.unwrap(), Disposition::Redeliver);
        }
        let stats = bridge.gate.stats();
        assert_eq!(stats.forward_failures, 5);
        assert_eq!(stats.failures_logged, 1);
        assert_eq!(stats.failures_suppressed, 4);

        for _ in 0..3 {
            let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &[]);
            bridge.gate.send_message_to_local_broker(msg);
            assert_eq!(rx.await.unwrap(), Disposition::Redeliver);
        }
        let stats = bridge.gate.stats();
        assert_eq!(stats.failures_logged, 4);
        assert_eq!(stats.failures_suppressed, 4);
    }

    #[tokio::test]
    async fn test_unacknowledged_send_redelivers_on_disconnect() {
        let bridge = active_bridge(FirewallConfiguration::new(FirewallMode::BridgeInner)).await;
        bridge.broker.set_manual_acknowledge(true);

        let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &[]);
        bridge.gate.send_message_to_local_broker(msg);
        eventually(|| bridge.broker.pending_count() == 1).await;

        bridge.broker.set_connected(false);
        assert_eq!(rx.await.unwrap(), Disposition::Redeliver);
        assert_eq!(bridge.audit.stats().inbound_accepted, 0);
    }

    #[tokio::test]
    async fn test_stop_then_traffic_redelivers() {
        let bridge = active_bridge(FirewallConfiguration::new(FirewallMode::BridgeInner)).await;
        bridge.gate.stop();
        bridge.gate.stop();

        let (msg, rx) = message(BANK_A, &bank_a_inbox(), b"abc", &[]);
        bridge.gate.send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Redeliver);
        assert_eq!(bridge.broker.open_sessions(), 0);
    }
}
