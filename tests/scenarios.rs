//! End-to-end scenarios driven through `GameEngine::dispatch`.

use cat_clicker::catalog::{PurchaseId, PurchaseOutcome};
use cat_clicker::save::{MemoryStore, SaveStore};
use cat_clicker::state::{ResourceId, TierId};
use cat_clicker::{Action, GameEngine, Outcome, PersistError};

const SLOT: &str = "cat-save";

fn fresh() -> GameEngine<MemoryStore> {
    GameEngine::new(MemoryStore::new()).unwrap()
}

/// An engine whose state was loaded from a save with `overrides` applied on
/// top of a fresh game.
fn seeded(overrides: &[(&str, u64)]) -> GameEngine<MemoryStore> {
    let mut eng = fresh();
    assert!(matches!(eng.dispatch(Action::Save).outcome, Outcome::Saved));
    let mut record: serde_json::Value =
        serde_json::from_str(eng.store().contents(SLOT).unwrap()).unwrap();
    for (name, value) in overrides {
        record[*name] = (*value).into();
    }
    eng.store_mut().insert(SLOT, &record.to_string());
    assert!(matches!(eng.dispatch(Action::Load).outcome, Outcome::Loaded));
    eng
}

#[test]
fn catch_on_fresh_engine_yields_one_food() {
    let mut eng = fresh();
    let report = eng.dispatch(Action::Catch);
    assert!(matches!(report.outcome, Outcome::Caught { amount: 1, .. }));
    assert_eq!(eng.snapshot().amount(ResourceId::Food), 1);
}

#[test]
fn hire_cat_with_exact_funds() {
    let mut eng = seeded(&[("food", 5)]);
    let report = eng.dispatch(Action::Purchase(PurchaseId::HireCat));
    assert!(matches!(
        report.outcome,
        Outcome::Purchase(PurchaseOutcome::Applied(_))
    ));
    let snap = eng.snapshot();
    assert_eq!(snap.amount(ResourceId::Food), 0);
    assert_eq!(snap.rate(ResourceId::Food), 1);
    assert_eq!(snap.purchase(PurchaseId::HireCat).cost, 10);
}

#[test]
fn upgrade_catch_at_max_tier_is_rejected() {
    let mut eng = seeded(&[("catch", 9), ("food", 10_000)]);
    let before = eng.snapshot();
    let report = eng.dispatch(Action::Purchase(PurchaseId::UpgradeCatch));
    assert!(matches!(
        report.outcome,
        Outcome::Purchase(PurchaseOutcome::MaxTierReached {
            tier: TierId::Catch
        })
    ));
    assert_eq!(eng.snapshot(), before);
    assert_eq!(eng.snapshot().tier(TierId::Catch).value, 9);
}

#[test]
fn upgrade_catch_without_funds_changes_nothing() {
    let mut eng = seeded(&[("food", 50)]);
    let report = eng.dispatch(Action::Purchase(PurchaseId::UpgradeCatch));
    assert!(matches!(
        report.outcome,
        Outcome::Purchase(PurchaseOutcome::InsufficientFunds {
            cost: 100,
            available: 50
        })
    ));
    let snap = eng.snapshot();
    assert_eq!(snap.amount(ResourceId::Food), 50);
    assert_eq!(snap.purchase(PurchaseId::UpgradeCatch).cost, 100);
}

#[test]
fn save_then_load_restores_food() {
    let mut eng = fresh();
    for _ in 0..42 {
        eng.dispatch(Action::Catch);
    }
    assert!(matches!(eng.dispatch(Action::Save).outcome, Outcome::Saved));
    for _ in 0..8 {
        eng.dispatch(Action::Catch);
    }
    assert!(matches!(eng.dispatch(Action::Load).outcome, Outcome::Loaded));
    assert_eq!(eng.snapshot().amount(ResourceId::Food), 42);
}

#[test]
fn catch_follows_the_catch_tier() {
    let mut eng = seeded(&[("catch", 4)]);
    let report = eng.dispatch(Action::Catch);
    assert!(matches!(
        report.outcome,
        Outcome::Caught {
            amount: 4,
            prey: "Squirrel"
        }
    ));
}

#[test]
fn load_without_save_reports_not_found() {
    let mut eng = fresh();
    let report = eng.dispatch(Action::Load);
    assert!(matches!(
        report.outcome,
        Outcome::LoadFailed(PersistError::NotFound { .. })
    ));
    assert_eq!(report.message, "There is no save file to load.");
}

#[test]
fn corrupt_save_keeps_current_game() {
    let mut eng = fresh();
    for _ in 0..3 {
        eng.dispatch(Action::Catch);
    }
    eng.store_mut().insert(SLOT, r#"{"food": "lots"}"#);
    let before = eng.snapshot();
    let report = eng.dispatch(Action::Load);
    assert!(matches!(
        report.outcome,
        Outcome::LoadFailed(PersistError::Corrupt { .. })
    ));
    assert_eq!(eng.snapshot(), before);
}

#[test]
fn save_out_of_range_tier_is_corrupt() {
    let mut eng = fresh();
    eng.dispatch(Action::Save);
    let mut record: serde_json::Value =
        serde_json::from_str(eng.store().contents(SLOT).unwrap()).unwrap();
    record["upgrade"] = 10.into();
    eng.store_mut().insert(SLOT, &record.to_string());
    let report = eng.dispatch(Action::Load);
    assert!(matches!(
        report.outcome,
        Outcome::LoadFailed(PersistError::Corrupt { .. })
    ));
}

#[test]
fn resume_restores_existing_save() {
    let mut store = MemoryStore::new();
    {
        let mut eng = GameEngine::new(MemoryStore::new()).unwrap();
        for _ in 0..7 {
            eng.dispatch(Action::Catch);
        }
        eng.dispatch(Action::Save);
        store.insert(SLOT, eng.store().contents(SLOT).unwrap());
    }
    assert!(store.read(SLOT).unwrap().is_some());

    let mut eng = GameEngine::new(store).unwrap();
    assert!(eng.resume());
    assert_eq!(eng.snapshot().amount(ResourceId::Food), 7);
}

#[test]
fn resume_without_save_is_silent() {
    let mut eng = fresh();
    let logged = eng.log().len();
    assert!(!eng.resume());
    assert_eq!(eng.log().len(), logged);
}

#[test]
fn production_runs_after_load() {
    let mut eng = seeded(&[("food_rate", 3), ("catnip_rate", 2)]);
    eng.advance(2_000);
    let snap = eng.snapshot();
    assert_eq!(snap.amount(ResourceId::Food), 6);
    assert_eq!(snap.amount(ResourceId::Catnip), 4);
}

#[test]
fn autosave_writes_the_slot() {
    let mut eng = fresh();
    eng.dispatch(Action::Catch);
    assert!(eng.store().contents(SLOT).is_none());
    let tick = eng.advance(30_000);
    assert!(matches!(tick.autosave, Some(Ok(()))));
    assert!(eng.store().contents(SLOT).is_some());
}

#[test]
fn autosave_failure_is_logged_and_play_continues() {
    let mut eng = seeded(&[("food_rate", 1)]);
    eng.store_mut().set_fail_writes(true);
    let tick = eng.advance(30_000);
    assert!(matches!(tick.autosave, Some(Err(PersistError::Io { .. }))));
    assert!(eng
        .log()
        .last()
        .is_some_and(|e| e.text.starts_with("Autosave failed")));
    eng.advance(1_000);
    assert_eq!(eng.snapshot().amount(ResourceId::Food), 31);
}

#[test]
fn unknown_action_id_is_rejected() {
    let mut eng = fresh();
    assert!(eng.dispatch_id("pet-dog").is_err());
    let report = eng.dispatch_id("catch").unwrap();
    assert_eq!(report.action, Action::Catch);
}

#[test]
fn later_purchases_stay_locked_until_revealed() {
    let mut eng = fresh();
    for _ in 0..50 {
        eng.dispatch(Action::Catch);
    }
    let before = eng.snapshot();
    assert_eq!(before.rate(ResourceId::Food), 0);
    assert!(!before.purchase(PurchaseId::Catnip).visible);

    for id in [
        PurchaseId::Catnip,
        PurchaseId::Racoon,
        PurchaseId::Science,
        PurchaseId::Upgrade,
    ] {
        let report = eng.dispatch(Action::Purchase(id));
        assert!(matches!(
            report.outcome,
            Outcome::Purchase(PurchaseOutcome::Locked)
        ));
    }
    assert_eq!(eng.snapshot(), before);
}

#[test]
fn reveals_survive_a_new_session() {
    let mut eng = fresh();
    let mut record: serde_json::Value = {
        eng.dispatch(Action::Save);
        serde_json::from_str(eng.store().contents(SLOT).unwrap()).unwrap()
    };
    record["catnip"] = 10.into();
    eng.store_mut().insert(SLOT, &record.to_string());
    eng.dispatch(Action::Load);
    assert!(eng.snapshot().purchase(PurchaseId::Science).visible);
    eng.dispatch(Action::Purchase(PurchaseId::Science));
    eng.dispatch(Action::Save);
    let saved = eng.snapshot();
    assert_eq!(saved.amount(ResourceId::Catnip), 0);

    let mut next = GameEngine::new(eng.store().clone()).unwrap();
    assert!(next.resume());
    assert_eq!(next.snapshot(), saved);
    assert!(next.snapshot().purchase(PurchaseId::Science).visible);
}

#[test]
fn legacy_record_without_reveals_loads() {
    let mut eng = fresh();
    eng.dispatch(Action::Save);
    let mut record: serde_json::Value =
        serde_json::from_str(eng.store().contents(SLOT).unwrap()).unwrap();
    record.as_object_mut().unwrap().remove("revealed");
    record["science_cost"] = 14.into();
    record["upgrade"] = 3.into();
    eng.store_mut().insert(SLOT, &record.to_string());

    let mut next = GameEngine::new(eng.store().clone()).unwrap();
    assert!(next.resume());
    let snap = next.snapshot();
    assert!(snap.purchase(PurchaseId::Science).visible);
    assert!(snap.purchase(PurchaseId::Upgrade).visible);
    assert!(!snap.purchase(PurchaseId::Catnip).visible);
}
