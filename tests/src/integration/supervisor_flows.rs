//! # Float Supervisor Flows
//!
//! The supervisor composed with the no-op adapters and with journaling
//! doubles, including chaining it into a process-level aggregate.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fw_02_float_supervisor::{
        ControlChannelService, FloatSupervisor, FloatSupervisorService, ListenerService,
        NoOpControlChannel, NoOpListener, SupervisorError,
    };
    use parking_lot::Mutex;
    use shared_bus::{LivenessAggregator, ServiceState, ServiceStateSupport};
    use shared_types::{ConfigError, FirewallConfiguration, FirewallMode, HaConfig};

    use crate::fixtures::eventually;

    type Journal = Arc<Mutex<Vec<&'static str>>>;

    struct JournalListener {
        state: ServiceState,
        journal: Journal,
    }

    impl ServiceStateSupport for JournalListener {
        fn service_state(&self) -> &ServiceState {
            &self.state
        }
    }

    impl ListenerService for JournalListener {
        fn start(&self) {
            self.journal.lock().push("listener.start");
            self.state.set_active(true);
        }

        fn stop(&self) {
            self.journal.lock().push("listener.stop");
            self.state.set_active(false);
        }
    }

    struct JournalControl {
        state: ServiceState,
        journal: Journal,
    }

    impl ServiceStateSupport for JournalControl {
        fn service_state(&self) -> &ServiceState {
            &self.state
        }
    }

    impl ControlChannelService for JournalControl {
        fn start(&self) {
            self.journal.lock().push("control.start");
            self.state.set_active(true);
        }

        fn stop(&self) {
            self.journal.lock().push("control.stop");
            self.state.set_active(false);
        }
    }

    fn journaled(
        config: &FirewallConfiguration,
        journal: &Journal,
    ) -> Result<FloatSupervisorService<JournalListener, JournalControl>, SupervisorError> {
        let listener = Arc::new(JournalListener {
            state: ServiceState::new("listener"),
            journal: Arc::clone(journal),
        });
        let control_journal = Arc::clone(journal);
        FloatSupervisorService::new(config, listener, move |_, _| {
            control_journal.lock().push("control.new");
            Arc::new(JournalControl {
                state: ServiceState::new("control"),
                journal: control_journal,
            })
        })
    }

    #[test]
    fn test_float_outer_with_ha_never_starts() {
        let journal: Journal = Arc::default();
        let config = FirewallConfiguration::new(FirewallMode::FloatOuter).with_ha_config(HaConfig {
            ha_connection_string: "bully".into(),
            ha_priority: 10,
        });

        let err = match journaled(&config, &journal) {
            Err(err) => err,
            Ok(_) => panic!("float-outer with HA config constructed"),
        };
        assert_eq!(err, SupervisorError::Config(ConfigError::FloatWithHaConfig));
        assert!(journal.lock().is_empty());
    }

    #[tokio::test]
    async fn test_float_outer_lifecycle_ordering() {
        let journal: Journal = Arc::default();
        let supervisor =
            journaled(&FirewallConfiguration::new(FirewallMode::FloatOuter), &journal).unwrap();

        supervisor.start();
        eventually(|| supervisor.is_active()).await;
        supervisor.stop();

        assert!(!supervisor.is_active());
        assert_eq!(
            *journal.lock(),
            vec![
                "control.new",
                "listener.start",
                "control.start",
                "control.stop",
                "listener.stop"
            ]
        );
    }

    #[tokio::test]
    async fn test_control_loss_drives_supervisor_down() {
        let journal: Journal = Arc::default();
        let supervisor =
            journaled(&FirewallConfiguration::new(FirewallMode::FloatOuter), &journal).unwrap();
        supervisor.start();
        eventually(|| supervisor.is_active()).await;

        let control = supervisor.control_channel().unwrap();
        control.state.set_active(false);
        eventually(|| !supervisor.is_active()).await;

        control.state.set_active(true);
        eventually(|| supervisor.is_active()).await;
    }

    #[tokio::test]
    async fn test_noop_adapters_in_every_mode() {
        for mode in FirewallMode::all() {
            let supervisor = FloatSupervisorService::new(
                &FirewallConfiguration::new(mode),
                Arc::new(NoOpListener::new()),
                |_, listener| Arc::new(NoOpControlChannel::new(listener)),
            )
            .unwrap();
            assert_eq!(
                supervisor.control_channel().is_some(),
                mode == FirewallMode::FloatOuter
            );

            supervisor.start();
            eventually(|| supervisor.is_active()).await;
            supervisor.stop();
            assert!(!supervisor.listener().is_active());
        }
    }

    #[tokio::test]
    async fn test_supervisor_as_dependency_of_process_aggregate() {
        let journal: Journal = Arc::default();
        let supervisor =
            journaled(&FirewallConfiguration::new(FirewallMode::Combined), &journal).unwrap();
        let gate = ServiceState::new("gate");
        let process = LivenessAggregator::new(
            "process",
            vec![supervisor.service_state().clone(), gate.clone()],
        );
        process.start();
        supervisor.start();
        gate.set_active(true);
        eventually(|| process.is_active()).await;

        supervisor.stop();
        eventually(|| !process.is_active()).await;
        assert_eq!(*journal.lock(), vec!["listener.start", "listener.stop"]);
    }
}
