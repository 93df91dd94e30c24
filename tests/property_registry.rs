//! Property tests for registration idempotence and conflict convergence.

use std::collections::HashMap;
use std::sync::Arc;

use muster::services::{ConflictResolver, Registry};
use muster::{ComponentInstance, Element, HostEnvironment, MemoryHost};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::json;
use uuid::Uuid;

const NAMES: [&str; 4] = ["Core", "UI", "Notepad", "Todo"];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    /// Property: one entry per name, holding the most recent registration
    #[test]
    fn prop_registration_keeps_latest_instance(
        registrations in prop::collection::vec((0usize..NAMES.len(), 0u32..1000), 1..40)
    ) {
        let registry = Registry::new(Arc::new(MemoryHost::new()));
        let mut expected: HashMap<&str, u32> = HashMap::new();

        runtime().block_on(async {
            for &(index, payload) in &registrations {
                let name = NAMES[index];
                registry
                    .register(name, ComponentInstance::passive(json!(payload)))
                    .await
                    .unwrap();
                expected.insert(name, payload);
            }
        });

        let snapshot = runtime().block_on(registry.snapshot());
        prop_assert_eq!(snapshot.len(), expected.len());
        for descriptor in snapshot {
            let ComponentInstance::Passive(value) = &descriptor.instance else {
                return Err(TestCaseError::fail("expected passive instance"));
            };
            prop_assert_eq!(value, &json!(expected[descriptor.name.as_str()]));
        }
    }

    /// Property: repeating the same registration never bumps the generation
    #[test]
    fn prop_identical_registration_is_idempotent(repeats in 1usize..10) {
        let registry = Registry::new(Arc::new(MemoryHost::new()));
        let instance = ComponentInstance::passive(json!({ "settings": true }));

        let generations: Vec<u64> = runtime().block_on(async {
            let mut generations = Vec::new();
            for _ in 0..=repeats {
                let outcome = registry.register("Core", instance.clone()).await.unwrap();
                generations.push(outcome.generation);
            }
            generations
        });

        prop_assert!(generations.windows(2).all(|pair| pair[0] == pair[1]));
        prop_assert_eq!(runtime().block_on(registry.len()), 1);
    }

    /// Property: at most one sidebar artifact survives resolution and dedupe
    #[test]
    fn prop_conflicts_converge(
        stale in 0usize..12,
        unrelated in 0usize..5,
        duplicates in 0usize..6
    ) {
        let host = Arc::new(MemoryHost::new());
        for index in 0..stale {
            host.mount(Element::container(format!("muster-sidebar-{index}"), "stale")).unwrap();
        }
        for index in 0..unrelated {
            host.mount(Element::container(format!("page-widget-{index}"), "page")).unwrap();
        }

        let resolver = ConflictResolver::new(host.clone(), "muster-sidebar", Uuid::new_v4());
        let report = resolver.resolve();
        prop_assert_eq!(report.removed.len(), stale);
        prop_assert!(host.find_artifacts("muster-sidebar").len() <= 1);

        for index in 0..duplicates {
            host.mount(Element::container(format!("muster-sidebar-new-{index}"), "new")).unwrap();
        }
        resolver.dedupe();

        prop_assert_eq!(host.find_artifacts("muster-sidebar").len(), duplicates.min(1));
        prop_assert_eq!(host.find_artifacts("page-widget").len(), unrelated);
    }
}
