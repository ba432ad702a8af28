//! Registry state-machine tests: registration, connect/disconnect,
//! rename, and current-user selection.

use chrono::Utc;
use dialboard_core::error::RegistryError;
use dialboard_core::registry::UserRegistry;
use std::sync::Arc;

#[test]
fn duplicate_registration_is_rejected_and_harmless() {
    let registry = UserRegistry::new();
    registry.register("u1", "Alice").unwrap();

    let err = registry.register("u1", "Mallory").unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));

    let record = registry.user("u1").expect("first registration intact");
    assert_eq!(record.name, "Alice");
    assert!(!record.connected);
    assert_eq!(record.total_revenue, 0.0);
    assert!(record.last_deal.is_none());
}

#[test]
fn empty_id_or_name_is_rejected() {
    let registry = UserRegistry::new();

    assert!(matches!(
        registry.register("", "Alice").unwrap_err(),
        RegistryError::InvalidArgument { .. }
    ));
    assert!(matches!(
        registry.register("u1", "").unwrap_err(),
        RegistryError::InvalidArgument { .. }
    ));

    registry.register("u1", "Alice").unwrap();
    assert!(matches!(
        registry.rename("u1", "").unwrap_err(),
        RegistryError::InvalidArgument { .. }
    ));
    assert!(matches!(
        registry.rename("", "Bob").unwrap_err(),
        RegistryError::InvalidArgument { .. }
    ));
}

#[test]
fn connect_twice_fails_with_already_connected() {
    let registry = UserRegistry::new();
    registry.register("u1", "Alice").unwrap();

    registry.set_connected("u1").unwrap();
    let err = registry.set_connected("u1").unwrap_err();

    assert!(matches!(err, RegistryError::AlreadyConnected { .. }));
    assert!(registry.user("u1").unwrap().connected);
}

#[test]
fn disconnect_without_connect_fails_with_not_connected() {
    let registry = UserRegistry::new();
    registry.register("u1", "Alice").unwrap();

    let err = registry.set_disconnected("u1").unwrap_err();

    assert!(matches!(err, RegistryError::NotConnected { .. }));
}

#[test]
fn connect_disconnect_round_trip() {
    let registry = UserRegistry::new();
    registry.register("u1", "Alice").unwrap();

    registry.set_connected("u1").unwrap();
    registry.set_disconnected("u1").unwrap();
    registry.set_connected("u1").unwrap();

    assert!(registry.user("u1").unwrap().connected);
}

#[test]
fn operations_on_unknown_users_fail_with_not_found() {
    let registry = UserRegistry::new();

    assert!(matches!(
        registry.set_connected("ghost").unwrap_err(),
        RegistryError::NotFound { .. }
    ));
    assert!(matches!(
        registry.set_disconnected("ghost").unwrap_err(),
        RegistryError::NotFound { .. }
    ));
    assert!(matches!(
        registry.rename("ghost", "Name").unwrap_err(),
        RegistryError::NotFound { .. }
    ));
    assert!(matches!(
        registry
            .record_deal("ghost", Utc::now(), 1.0)
            .unwrap_err(),
        RegistryError::NotFound { .. }
    ));
}

#[test]
fn rename_overwrites_name() {
    let registry = UserRegistry::new();
    registry.register("u1", "Alice").unwrap();

    registry.rename("u1", "Alicia").unwrap();

    assert_eq!(registry.user("u1").unwrap().name, "Alicia");
}

#[test]
fn deal_requires_connection() {
    let registry = UserRegistry::new();
    registry.register("u1", "Alice").unwrap();

    let err = registry.record_deal("u1", Utc::now(), 5.0).unwrap_err();

    assert!(matches!(err, RegistryError::NotConnected { .. }));
    assert_eq!(registry.user("u1").unwrap().total_revenue, 0.0);
}

#[test]
fn concurrent_deals_serialize_without_loss() {
    let registry = Arc::new(UserRegistry::new());
    registry.register("u1", "Alice").unwrap();
    registry.set_connected("u1").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    registry.record_deal("u1", Utc::now(), 1.0).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.user("u1").unwrap().total_revenue, 400.0);
}

#[test]
fn current_user_selection_requires_registration() {
    let registry = UserRegistry::new();
    assert!(registry.current_user().is_none());

    let err = registry.select_current_user("ghost").unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { .. }));
    assert!(registry.current_user().is_none());

    registry.register("u1", "Alice").unwrap();
    registry.select_current_user("u1").unwrap();
    assert_eq!(registry.current_user().as_deref(), Some("u1"));
}
