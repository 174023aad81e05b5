//! Long-running play: unlock order, the full tier path and invariants over
//! random action sequences.

use std::collections::HashMap;

use cat_clicker::catalog::{PurchaseId, PurchaseOutcome};
use cat_clicker::save::MemoryStore;
use cat_clicker::state::{ResourceId, TierId};
use cat_clicker::{Action, GameEngine, Outcome, Snapshot};
use proptest::prelude::*;

fn fresh() -> GameEngine<MemoryStore> {
    GameEngine::new(MemoryStore::new()).unwrap()
}

/// Buy the first visible, enabled purchase in priority order. Returns what
/// the purchase revealed, or `None` when nothing could be bought.
fn buy_one(eng: &mut GameEngine<MemoryStore>) -> Option<Vec<PurchaseId>> {
    const PRIORITY: [PurchaseId; 6] = [
        PurchaseId::Upgrade,
        PurchaseId::Science,
        PurchaseId::Racoon,
        PurchaseId::UpgradeCatch,
        PurchaseId::Catnip,
        PurchaseId::HireCat,
    ];
    let snap = eng.snapshot();
    let id = PRIORITY.into_iter().find(|id| snap.purchase(*id).enabled())?;
    let report = eng.dispatch(Action::Purchase(id));
    assert!(matches!(report.outcome, Outcome::Purchase(ref o) if o.is_applied()));
    Some(report.revealed)
}

#[test]
fn only_base_purchases_start_visible() {
    let snap = fresh().snapshot();
    for p in &snap.purchases {
        let expected = matches!(p.id, PurchaseId::HireCat | PurchaseId::UpgradeCatch);
        assert_eq!(p.visible, expected, "{:?}", p.id);
    }
}

#[test]
fn greedy_player_reaches_every_final_tier() {
    let mut eng = fresh();
    // Step at which each purchase was revealed.
    let mut revealed_at = HashMap::new();
    let mut step = 0usize;
    let mut record = |revealed: Vec<PurchaseId>, step: usize| {
        for id in revealed {
            revealed_at.entry(id).or_insert(step);
        }
    };

    for _ in 0..5_000 {
        step += 1;
        record(eng.advance(1_000).revealed, step);
        for _ in 0..5 {
            step += 1;
            record(eng.dispatch(Action::Catch).revealed, step);
        }
        while let Some(revealed) = buy_one(&mut eng) {
            step += 1;
            record(revealed, step);
        }
        let snap = eng.snapshot();
        if snap.tier(TierId::Catch).maxed && snap.tier(TierId::Upgrade).maxed {
            break;
        }
    }

    let snap = eng.snapshot();
    assert!(snap.tier(TierId::Catch).maxed);
    assert!(snap.tier(TierId::Upgrade).maxed);
    assert_eq!(snap.tier(TierId::Upgrade).label, Some("Rocket"));
    assert!(snap.purchases.iter().all(|p| p.visible));

    let at = |id| revealed_at[&id];
    assert!(at(PurchaseId::Catnip) < at(PurchaseId::Science));
    assert!(at(PurchaseId::Science) < at(PurchaseId::Upgrade));
    // Racoons may appear in the same refresh as upgrades, never earlier.
    assert!(at(PurchaseId::Upgrade) <= at(PurchaseId::Racoon));

    let report = eng.dispatch(Action::Purchase(PurchaseId::Upgrade));
    assert_eq!(
        report.message,
        "There is nothing left to build. You gaze up at the stars."
    );
}

#[test]
fn racoon_production_scales_with_upgrade_tier() {
    let mut eng = fresh();
    while !eng.snapshot().purchase(PurchaseId::Racoon).visible {
        eng.advance(1_000);
        for _ in 0..5 {
            eng.dispatch(Action::Catch);
        }
        while buy_one(&mut eng).is_some() {}
    }
    // Save a food pile so the next racoon is affordable.
    while !eng.snapshot().purchase(PurchaseId::Racoon).affordable {
        eng.dispatch(Action::Catch);
    }
    let snap = eng.snapshot();
    let tier = snap.tier(TierId::Upgrade).value as u64;
    let rate = snap.rate(ResourceId::Food);
    eng.dispatch(Action::Purchase(PurchaseId::Racoon));
    assert_eq!(eng.snapshot().rate(ResourceId::Food), rate + tier);
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => Just(Action::Catch),
        1 => Just(Action::Purchase(PurchaseId::HireCat)),
        1 => Just(Action::Purchase(PurchaseId::UpgradeCatch)),
        1 => Just(Action::Purchase(PurchaseId::Catnip)),
        1 => Just(Action::Purchase(PurchaseId::Racoon)),
        1 => Just(Action::Purchase(PurchaseId::Science)),
        1 => Just(Action::Purchase(PurchaseId::Upgrade)),
    ]
}

#[derive(Clone, Debug)]
enum Step {
    Do(Action),
    Wait(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => action_strategy().prop_map(Step::Do),
        1 => (0u64..5_000).prop_map(Step::Wait),
    ]
}

fn run(eng: &mut GameEngine<MemoryStore>, steps: &[Step]) {
    for step in steps {
        match step {
            Step::Do(action) => {
                eng.dispatch(*action);
            }
            Step::Wait(ms) => {
                eng.advance(*ms);
            }
        }
    }
}

/// The persisted part of a snapshot: balances, rates, costs and tiers.
fn persisted(snap: &Snapshot) -> (Vec<(u64, u64)>, Vec<u64>, Vec<u32>) {
    (
        snap.resources.iter().map(|r| (r.amount, r.rate)).collect(),
        snap.purchases.iter().map(|p| p.cost).collect(),
        snap.tiers.iter().map(|t| t.value).collect(),
    )
}

proptest! {
    #[test]
    fn costs_never_decrease(steps in prop::collection::vec(step_strategy(), 0..200)) {
        let mut eng = fresh();
        let mut costs: Vec<u64> = eng.snapshot().purchases.iter().map(|p| p.cost).collect();
        for step in &steps {
            run(&mut eng, std::slice::from_ref(step));
            let now: Vec<u64> = eng.snapshot().purchases.iter().map(|p| p.cost).collect();
            for (before, after) in costs.iter().zip(&now) {
                prop_assert!(after >= before);
            }
            costs = now;
        }
    }

    #[test]
    fn tiers_stay_within_tables(steps in prop::collection::vec(step_strategy(), 0..200)) {
        let mut eng = fresh();
        run(&mut eng, &steps);
        for tier in &eng.snapshot().tiers {
            prop_assert!((1..=9).contains(&tier.value));
            prop_assert!(tier.label.is_some());
        }
    }

    #[test]
    fn reveals_are_never_withdrawn(steps in prop::collection::vec(step_strategy(), 0..200)) {
        let mut eng = fresh();
        let mut seen = vec![false; PurchaseId::COUNT];
        for step in &steps {
            run(&mut eng, std::slice::from_ref(step));
            for p in &eng.snapshot().purchases {
                let i = p.id.index();
                prop_assert!(p.visible || !seen[i], "{:?} was hidden again", p.id);
                seen[i] |= p.visible;
            }
        }
    }

    #[test]
    fn save_then_load_round_trips(
        before in prop::collection::vec(step_strategy(), 0..100),
        after in prop::collection::vec(action_strategy(), 0..50),
    ) {
        let mut eng = fresh();
        run(&mut eng, &before);
        prop_assert!(matches!(eng.dispatch(Action::Save).outcome, Outcome::Saved));
        let saved = eng.snapshot();

        for action in &after {
            eng.dispatch(*action);
        }
        prop_assert!(matches!(eng.dispatch(Action::Load).outcome, Outcome::Loaded));
        let loaded = eng.snapshot();
        prop_assert_eq!(persisted(&loaded), persisted(&saved));
        // Reveals made after the save stay revealed.
        for (now, then) in loaded.purchases.iter().zip(&saved.purchases) {
            prop_assert!(now.visible || !then.visible);
        }
    }

    #[test]
    fn load_in_new_session_reproduces_snapshot(
        steps in prop::collection::vec(step_strategy(), 0..150),
    ) {
        let mut eng = fresh();
        run(&mut eng, &steps);
        prop_assert!(matches!(eng.dispatch(Action::Save).outcome, Outcome::Saved));
        let saved = eng.snapshot();

        let mut next = GameEngine::new(eng.store().clone()).unwrap();
        prop_assert!(matches!(next.dispatch(Action::Load).outcome, Outcome::Loaded));
        prop_assert_eq!(next.snapshot(), saved);
    }

    #[test]
    fn hidden_purchases_never_apply(steps in prop::collection::vec(step_strategy(), 0..150)) {
        let mut eng = fresh();
        for step in &steps {
            let visible = match step {
                Step::Do(Action::Purchase(id)) => eng.snapshot().purchase(*id).visible,
                _ => true,
            };
            if let Step::Do(action) = step {
                let report = eng.dispatch(*action);
                if !visible {
                    prop_assert!(matches!(
                        report.outcome,
                        Outcome::Purchase(PurchaseOutcome::Locked)
                    ));
                }
            } else {
                run(&mut eng, std::slice::from_ref(step));
            }
        }
    }
}
