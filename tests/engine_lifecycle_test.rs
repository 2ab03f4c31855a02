use mtce_core::core::state::host::{Action, AdminState, HostRecord, NodeType, OperState};
use mtce_core::core::state::HostRegistry;
use mtce_core::Engine;
use std::sync::Arc;

fn engine_with_one_host(hostname: &str) -> Arc<Engine> {
    let registry = Arc::new(HostRegistry::new());
    registry.insert(HostRecord::new(hostname, NodeType::WORKER));
    Arc::new(Engine::new(registry))
}

#[test]
fn force_lock_drives_host_to_locked_disabled_offline() {
    let engine = engine_with_one_host("compute-0");
    engine.set_action("compute-0", Action::ForceLock).unwrap();

    for _ in 0..10 {
        engine.tick();
    }

    let shared = engine.registry.get("compute-0").unwrap();
    let host = shared.lock();
    assert_eq!(host.action, Action::None);
    assert_eq!(host.triad.admin, AdminState::Locked);
    assert_eq!(host.triad.oper, OperState::Disabled);
}

#[test]
fn set_action_refuses_second_action_while_one_is_active() {
    let engine = engine_with_one_host("compute-1");
    engine.set_action("compute-1", Action::Reset).unwrap();

    let err = engine.set_action("compute-1", Action::Reinstall).unwrap_err();
    assert!(matches!(
        err,
        mtce_core::MtceError::ActionInFlight(host, Action::Reset) if host == "compute-1"
    ));
}

#[test]
fn set_action_on_unknown_host_errors() {
    let engine = engine_with_one_host("compute-2");
    let err = engine.set_action("compute-99", Action::Reset).unwrap_err();
    assert!(matches!(err, mtce_core::MtceError::HostNotFound(h) if h == "compute-99"));
}

#[test]
fn swact_is_rejected_on_non_controller_node() {
    let engine = engine_with_one_host("compute-3");
    let err = engine.set_action("compute-3", Action::Swact).unwrap_err();
    assert!(matches!(err, mtce_core::MtceError::InvalidStage(_, _)));
}
