//! # Runtime Flows
//!
//! Configuration loading, registry resolution and service lifecycle as the
//! `fw-runtime` binary performs them.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use fw_runtime::{
        load_config_from, FirewallService, RegistryError, RuntimeConfig, RuntimeConfigError,
        ServiceRegistry,
    };
    use shared_types::{ConfigError, Disposition, FirewallMode};

    use crate::fixtures::{eventually, message, BANK_A};

    fn env(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| vars.get(key).map(|v| (*v).to_string())
    }

    fn config_with_inbox(mode: &str) -> RuntimeConfig {
        let config = RuntimeConfig::from_toml(&format!(
            r#"
            firewall_mode = "{mode}"

            [[inboxes]]
            owner = "{BANK_A}"
            inbox = "bank-a"
            "#
        ))
        .unwrap();
        assert_eq!(config.inboxes.len(), 1);
        config
    }

    #[tokio::test]
    async fn test_bridge_inner_end_to_end() {
        let config = config_with_inbox("bridge-inner");
        let service = ServiceRegistry::with_defaults().resolve(&config).unwrap();
        assert_eq!(service.name(), "bridge-inner");

        service.start().await.unwrap();
        eventually(|| service.is_active()).await;

        let (msg, rx) = message(BANK_A, "p2p.inbound.bank-a", b"abc", &["platform-topic"]);
        service
            .message_filter()
            .unwrap()
            .send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Forwarded);

        service.stop().await;
        assert!(!service.is_active());

        let (msg, rx) = message(BANK_A, "p2p.inbound.bank-a", b"abc", &[]);
        service
            .message_filter()
            .unwrap()
            .send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Redeliver);
    }

    #[tokio::test]
    async fn test_mode_from_environment_selects_service() {
        let config = load_config_from(None, env(&[("FW_FIREWALL_MODE", "float-outer")])).unwrap();
        let service = ServiceRegistry::with_defaults().resolve(&config).unwrap();
        assert_eq!(service.name(), "float-outer");
        assert!(service.message_filter().is_none());

        service.start().await.unwrap();
        eventually(|| service.is_active()).await;
        service.stop().await;
        assert!(!service.is_active());
    }

    #[tokio::test]
    async fn test_combined_runs_both_halves() {
        let config = config_with_inbox("combined");
        let service = ServiceRegistry::with_defaults().resolve(&config).unwrap();
        service.start().await.unwrap();
        eventually(|| service.is_active()).await;

        let (msg, rx) = message(BANK_A, "p2p.inbound.bank-a", b"abc", &["Z"]);
        service
            .message_filter()
            .unwrap()
            .send_message_to_local_broker(msg);
        assert_eq!(rx.await.unwrap(), Disposition::Dropped);

        service.stop().await;
        assert!(!service.is_active());
    }

    #[test]
    fn test_unknown_mode_is_fatal() {
        let err = load_config_from(None, env(&[("FW_FIREWALL_MODE", "notary")])).unwrap_err();
        assert!(matches!(
            err,
            RuntimeConfigError::Invalid(ConfigError::UnknownMode(_))
        ));

        let err = match ServiceRegistry::with_defaults().create("notary", &RuntimeConfig::default()) {
            Err(err) => err,
            Ok(_) => panic!("unknown service resolved"),
        };
        match err {
            RegistryError::UnknownService { name, available } => {
                assert_eq!(name, "notary");
                assert_eq!(available.len(), FirewallMode::all().len());
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
