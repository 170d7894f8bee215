mod common;

use common::{engines, sqlite_engines, BrokenStore};
use licensor_license::{ErrorKind, LicenseError, ManagementEngine, StateChange};
use licensor_store::LicenseStore;
use pretty_assertions::assert_eq;
use std::sync::Arc;

// ── add ──────────────────────────────────────────────────────────

#[test]
fn add_creates_active_unbound_license() {
    let (_, manage, store) = engines();
    let record = manage.add("K1", "S1", "alice").unwrap();

    assert!(record.active);
    assert!(record.hwid.is_none());
    assert_eq!(store.find_by_key("K1").unwrap(), Some(record));
}

#[test]
fn add_duplicate_key_conflicts_regardless_of_other_fields() {
    for (_, manage, store) in [engines(), sqlite_engines()] {
        manage.add("K1", "S1", "alice").unwrap();
        for (server, owner) in [("S1", "alice"), ("S2", "bob"), ("S1", "carol")] {
            let err = manage.add("K1", server, owner).unwrap_err();
            assert!(matches!(err, LicenseError::Conflict(ref k) if k == "K1"));
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
        assert_eq!(store.find_by_key("K1").unwrap().unwrap().owner, "alice");
    }
}

#[test]
fn add_requires_every_field() {
    let (_, manage, store) = engines();
    let err = manage.add("K1", "", "alice").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(store.find_by_key("K1").unwrap().is_none());
}

// ── lookup ───────────────────────────────────────────────────────

#[test]
fn lookup_matches_key_and_server() {
    let (verify, manage, _) = engines();
    manage.add("K1", "S1", "alice").unwrap();
    verify.verify("K1", "S1", "HW-A").unwrap();

    let record = manage.lookup("K1", "S1").unwrap();
    assert_eq!(record.owner, "alice");
    assert_eq!(record.hwid.as_deref(), Some("HW-A"));
}

#[test]
fn lookup_with_wrong_server_is_not_found() {
    let (_, manage, _) = engines();
    manage.add("K1", "S1", "alice").unwrap();
    assert!(matches!(manage.lookup("K1", "S2"), Err(LicenseError::NotFound)));
}

// ── set_state ────────────────────────────────────────────────────

#[test]
fn deactivate_and_activate_toggle_flag() {
    let (_, manage, store) = engines();
    manage.add("K1", "S1", "alice").unwrap();

    assert_eq!(manage.set_state("K1", "deactivate").unwrap(), StateChange::Applied);
    assert!(!store.find_by_key("K1").unwrap().unwrap().active);

    assert_eq!(manage.set_state("K1", "activate").unwrap(), StateChange::Applied);
    assert!(store.find_by_key("K1").unwrap().unwrap().active);
}

#[test]
fn reset_hwid_unbinds_without_touching_active() {
    let (verify, manage, store) = engines();
    manage.add("K1", "S1", "alice").unwrap();
    verify.verify("K1", "S1", "HW-A").unwrap();
    manage.set_state("K1", "deactivate").unwrap();

    manage.set_state("K1", "reset-hwid").unwrap();
    let record = store.find_by_key("K1").unwrap().unwrap();
    assert!(!record.is_bound());
    assert!(!record.active);
}

#[test]
fn unrecognized_action_is_a_successful_no_op() {
    let (verify, manage, store) = engines();
    manage.add("K1", "S1", "alice").unwrap();
    verify.verify("K1", "S1", "HW-A").unwrap();
    let before = store.find_by_key("K1").unwrap().unwrap();

    assert_eq!(manage.set_state("K1", "explode").unwrap(), StateChange::Ignored);
    assert_eq!(store.find_by_key("K1").unwrap().unwrap(), before);
}

#[test]
fn set_state_on_missing_key_is_not_found() {
    let (_, manage, _) = engines();
    assert!(matches!(manage.set_state("ghost", "activate"), Err(LicenseError::NotFound)));
    assert!(matches!(manage.set_state("ghost", "explode"), Err(LicenseError::NotFound)));
}

#[test]
fn set_state_requires_action() {
    let (_, manage, _) = engines();
    manage.add("K1", "S1", "alice").unwrap();
    assert_eq!(manage.set_state("K1", "").unwrap_err().kind(), ErrorKind::Validation);
}

// ── list / delete ────────────────────────────────────────────────

#[test]
fn list_returns_newest_first() {
    for (_, manage, _) in [engines(), sqlite_engines()] {
        for key in ["K1", "K2", "K3"] {
            manage.add(key, "S1", "alice").unwrap();
        }
        let keys: Vec<String> = manage.list().unwrap().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["K3", "K2", "K1"]);
    }
}

#[test]
fn delete_removes_and_second_delete_is_not_found() {
    let (verify, manage, _) = engines();
    manage.add("K1", "S1", "alice").unwrap();

    manage.delete("K1").unwrap();
    assert!(matches!(manage.delete("K1"), Err(LicenseError::NotFound)));
    assert!(matches!(verify.verify("K1", "S1", "HW"), Err(LicenseError::InvalidKey)));
}

#[test]
fn deleted_key_can_be_reissued() {
    let (verify, manage, _) = engines();
    manage.add("K1", "S1", "alice").unwrap();
    verify.verify("K1", "S1", "HW-A").unwrap();
    manage.delete("K1").unwrap();

    let record = manage.add("K1", "S9", "bob").unwrap();
    assert!(!record.is_bound());
}

#[test]
fn store_failures_are_classified() {
    let manage = ManagementEngine::new(Arc::new(BrokenStore));
    assert_eq!(manage.add("K", "S", "o").unwrap_err().kind(), ErrorKind::StoreFailure);
    assert_eq!(manage.lookup("K", "S").unwrap_err().kind(), ErrorKind::StoreFailure);
    assert_eq!(manage.set_state("K", "activate").unwrap_err().kind(), ErrorKind::StoreFailure);
    assert_eq!(manage.list().unwrap_err().kind(), ErrorKind::StoreFailure);
    assert_eq!(manage.delete("K").unwrap_err().kind(), ErrorKind::StoreFailure);
}
