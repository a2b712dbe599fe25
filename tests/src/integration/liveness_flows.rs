//! # Liveness Aggregation Flows
//!
//! Random dependency toggling, concurrent and sequential, checked against
//! the AND of the final statuses once notifications settle.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_bus::{LivenessAggregator, ServiceState, ServiceStateSupport};

    use crate::fixtures::eventually;

    fn states(n: usize) -> Vec<ServiceState> {
        (0..n).map(|i| ServiceState::new(format!("dep-{i}"))).collect()
    }

    fn all_active(states: &[ServiceState]) -> bool {
        states.iter().all(ServiceState::is_active)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_random_sequences_settle_to_conjunction() {
        let mut rng = StdRng::seed_from_u64(0x00f1_4e3a);
        let deps = states(4);
        let aggregator = LivenessAggregator::new("random", deps.clone());
        aggregator.start();

        for _ in 0..50 {
            let steps = rng.gen_range(1..20);
            for _ in 0..steps {
                let i = rng.gen_range(0..deps.len());
                deps[i].set_active(rng.gen_bool(0.7));
            }
            let expected = all_active(&deps);
            eventually(|| aggregator.is_active() == expected).await;
        }
        aggregator.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_toggling_settles_to_conjunction() {
        let deps = states(6);
        let aggregator = LivenessAggregator::new("concurrent", deps.clone());
        aggregator.start();

        for round in 0..10u64 {
            let mut tasks = Vec::new();
            for (i, dep) in deps.iter().cloned().enumerate() {
                tasks.push(tokio::spawn(async move {
                    let mut rng = StdRng::seed_from_u64(round * 100 + i as u64);
                    for _ in 0..50 {
                        dep.set_active(rng.gen_bool(0.5));
                        tokio::task::yield_now().await;
                    }
                    dep.set_active(rng.gen_bool(0.8));
                }));
            }
            for task in tasks {
                task.await.unwrap();
            }
            let expected = all_active(&deps);
            eventually(|| aggregator.is_active() == expected).await;
        }
    }

    #[tokio::test]
    async fn test_single_flap_drives_aggregate_down() {
        let deps = states(3);
        for dep in &deps {
            dep.set_active(true);
        }
        let aggregator = LivenessAggregator::new("flap", deps.clone());
        aggregator.start();
        assert!(aggregator.is_active());

        let mut observed = aggregator.service_state().subscribe();
        deps[1].set_active(false);
        observed.changed().await.unwrap();
        assert!(!*observed.borrow_and_update());

        deps[1].set_active(true);
        observed.changed().await.unwrap();
        assert!(*observed.borrow_and_update());
    }

    #[tokio::test]
    async fn test_nested_aggregators() {
        let inner_deps = states(2);
        let inner = Arc::new(LivenessAggregator::new("inner", inner_deps.clone()));
        let sibling = ServiceState::new("sibling");
        let outer = LivenessAggregator::new(
            "outer",
            vec![inner.service_state().clone(), sibling.clone()],
        );
        inner.start();
        outer.start();

        sibling.set_active(true);
        for dep in &inner_deps {
            dep.set_active(true);
        }
        eventually(|| outer.is_active()).await;

        inner_deps[0].set_active(false);
        eventually(|| !outer.is_active()).await;
    }

    #[tokio::test]
    async fn test_silent_dependency_keeps_aggregate_inactive() {
        let deps = states(2);
        deps[0].set_active(true);
        let aggregator = LivenessAggregator::new("silent", deps);
        aggregator.start();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!aggregator.is_active());
    }
}
