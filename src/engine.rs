//! Game engine: the single owner of a session's state.
//!
//! Player actions go through [`GameEngine::dispatch`], which runs to
//! completion before returning, so a purchase is never interleaved with a
//! production tick. Time only moves through [`GameEngine::advance`].

use crate::actions::Action;
use crate::catalog::{PurchaseId, PurchaseOutcome};
use crate::config::EngineConfig;
use crate::error::{ConfigError, PersistError, UnknownAction};
use crate::save::{load_game, save_game, SaveStore};
use crate::scheduler::{Firings, ProductionScheduler};
use crate::state::{validate_label_tables, EngineState, MessageLog, ResourceId, TierId};

/// What a dispatched action did.
#[derive(Debug)]
pub enum Outcome {
    Caught { amount: u64, prey: &'static str },
    Purchase(PurchaseOutcome),
    Saved,
    Loaded,
    SaveFailed(PersistError),
    LoadFailed(PersistError),
}

/// Result of one [`GameEngine::dispatch`].
#[derive(Debug)]
pub struct ActionReport {
    pub action: Action,
    pub outcome: Outcome,
    /// The line appended to the message log.
    pub message: String,
    /// Purchases revealed as a consequence of this action.
    pub revealed: Vec<PurchaseId>,
}

/// Result of one [`GameEngine::advance`].
#[derive(Debug, Default)]
pub struct TickReport {
    pub firings: Firings,
    /// Set when the autosave task came due.
    pub autosave: Option<Result<(), PersistError>>,
    pub revealed: Vec<PurchaseId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceView {
    pub id: ResourceId,
    pub amount: u64,
    pub rate: u64,
    pub multiplier: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseView {
    pub id: PurchaseId,
    pub name: &'static str,
    pub cost_resource: ResourceId,
    pub cost: u64,
    pub visible: bool,
    pub affordable: bool,
    pub maxed: bool,
}

impl PurchaseView {
    pub fn enabled(&self) -> bool {
        self.visible && self.affordable && !self.maxed
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierView {
    pub id: TierId,
    pub value: u32,
    pub label: Option<&'static str>,
    pub maxed: bool,
}

/// Read-only copy of everything the presentation layer renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub resources: Vec<ResourceView>,
    pub purchases: Vec<PurchaseView>,
    pub tiers: Vec<TierView>,
}

impl Snapshot {
    pub fn capture(state: &EngineState) -> Self {
        let resources = state
            .ledger
            .iter()
            .map(|r| ResourceView {
                id: r.id,
                amount: r.amount,
                rate: r.rate,
                multiplier: r.multiplier,
            })
            .collect();
        let purchases = PurchaseId::all()
            .iter()
            .map(|&id| {
                let status = state
                    .gate
                    .status(id, &state.ledger, &state.catalog, &state.tiers);
                let def = id.def();
                PurchaseView {
                    id,
                    name: def.name,
                    cost_resource: def.cost_resource,
                    cost: state.catalog.cost(id),
                    visible: status.visible,
                    affordable: status.affordable,
                    maxed: status.maxed,
                }
            })
            .collect();
        let tiers = TierId::all()
            .iter()
            .map(|&id| {
                let counter = state.tiers.get(id);
                TierView {
                    id,
                    value: counter.value,
                    label: counter.label(),
                    maxed: counter.is_maxed(),
                }
            })
            .collect();
        Self {
            resources,
            purchases,
            tiers,
        }
    }

    pub fn resource(&self, id: ResourceId) -> &ResourceView {
        &self.resources[id.index()]
    }

    pub fn amount(&self, id: ResourceId) -> u64 {
        self.resource(id).amount
    }

    pub fn rate(&self, id: ResourceId) -> u64 {
        self.resource(id).rate
    }

    pub fn purchase(&self, id: PurchaseId) -> &PurchaseView {
        &self.purchases[id.index()]
    }

    pub fn tier(&self, id: TierId) -> &TierView {
        match id {
            TierId::Catch => &self.tiers[0],
            TierId::Upgrade => &self.tiers[1],
        }
    }
}

/// Re-render hooks for the presentation layer.
pub trait StateListener {
    /// Production credited at least one resource.
    fn on_tick(&mut self, _snapshot: &Snapshot, _report: &TickReport) {}

    /// A player action was dispatched.
    fn on_state_changed(&mut self, _snapshot: &Snapshot, _report: &ActionReport) {}
}

pub struct GameEngine<S: SaveStore> {
    state: EngineState,
    scheduler: ProductionScheduler,
    store: S,
    config: EngineConfig,
    listeners: Vec<Box<dyn StateListener>>,
}

impl<S: SaveStore> GameEngine<S> {
    pub fn new(store: S) -> Result<Self, ConfigError> {
        Self::with_config(store, EngineConfig::builtin())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Result<Self, ConfigError> {
        validate_label_tables()?;
        let mut scheduler = ProductionScheduler::new();
        scheduler.schedule_autosave(config.autosave_interval_ms);
        Ok(Self {
            state: EngineState::new(config.message_log_capacity),
            scheduler,
            store,
            config,
            listeners: Vec::new(),
        })
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn log(&self) -> &MessageLog {
        &self.state.log
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &ProductionScheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    pub fn subscribe(&mut self, listener: Box<dyn StateListener>) {
        self.listeners.push(listener);
    }

    /// Apply one player action and log its message.
    pub fn dispatch(&mut self, action: Action) -> ActionReport {
        let (outcome, message, important) = match action {
            Action::Catch => self.catch(),
            Action::Purchase(id) => self.purchase(id),
            Action::Save => self.save(),
            Action::Load => self.load(),
        };
        self.state.log.push(&message, important);
        let revealed = self.refresh_gate();

        let report = ActionReport {
            action,
            outcome,
            message,
            revealed,
        };
        if !self.listeners.is_empty() {
            let snapshot = self.snapshot();
            for listener in &mut self.listeners {
                listener.on_state_changed(&snapshot, &report);
            }
        }
        report
    }

    /// Dispatch by action id (`"hire-cat"`, `"save"`, ...).
    pub fn dispatch_id(&mut self, id: &str) -> Result<ActionReport, UnknownAction> {
        let action = id.parse()?;
        Ok(self.dispatch(action))
    }

    /// Load the configured slot if one exists. A missing save is silent;
    /// any other failure is logged and the fresh game is kept.
    pub fn resume(&mut self) -> bool {
        match self.store.read(&self.config.save_slot) {
            Ok(None) => false,
            Ok(Some(_)) | Err(_) => {
                let report = self.dispatch(Action::Load);
                matches!(report.outcome, Outcome::Loaded)
            }
        }
    }

    /// Move the clock forward, crediting producers and running autosave.
    pub fn advance(&mut self, elapsed_ms: u64) -> TickReport {
        let firings = self.scheduler.advance(elapsed_ms, &mut self.state.ledger);
        if firings.is_empty() {
            return TickReport {
                firings,
                ..TickReport::default()
            };
        }

        let autosave = (firings.autosaves > 0).then(|| self.autosave());
        let revealed = if firings.credited.is_empty() {
            Vec::new()
        } else {
            self.refresh_gate()
        };

        let report = TickReport {
            firings,
            autosave,
            revealed,
        };
        // An autosave alone changes nothing on screen.
        if !report.firings.credited.is_empty() && !self.listeners.is_empty() {
            let snapshot = self.snapshot();
            for listener in &mut self.listeners {
                listener.on_tick(&snapshot, &report);
            }
        }
        report
    }

    fn catch(&mut self) -> (Outcome, String, bool) {
        let amount = self.state.ledger.multiplier(ResourceId::Food);
        self.state.ledger.credit(ResourceId::Food, amount);
        let prey = self.state.tiers.catch.label().unwrap_or_default();
        (
            Outcome::Caught { amount, prey },
            format!("You catch an unsuspecting {prey}."),
            false,
        )
    }

    fn purchase(&mut self, id: PurchaseId) -> (Outcome, String, bool) {
        let state = &mut self.state;
        let outcome = if state.gate.is_revealed(id) {
            state
                .catalog
                .attempt_purchase(id, &mut state.ledger, &mut state.tiers)
        } else {
            PurchaseOutcome::Locked
        };
        let flavour = &id.def().flavour;

        let (message, important) = match &outcome {
            PurchaseOutcome::Applied(applied) => {
                if let Some(resource) = applied.rescheduled {
                    self.scheduler
                        .reschedule(resource, state.ledger.rate(resource));
                }
                let label = applied.tier_label.unwrap_or_default();
                (
                    flavour.applied.replace("{label}", label),
                    applied.tier_label.is_some(),
                )
            }
            PurchaseOutcome::InsufficientFunds { .. } => (flavour.insufficient.to_string(), false),
            PurchaseOutcome::MaxTierReached { .. } => (flavour.maxed.to_string(), false),
            PurchaseOutcome::Locked => (
                format!("You don't know how to {} yet.", id.def().name.to_lowercase()),
                false,
            ),
        };
        (Outcome::Purchase(outcome), message, important)
    }

    fn save(&mut self) -> (Outcome, String, bool) {
        match save_game(&mut self.store, &self.config.save_slot, &self.state) {
            Ok(_) => (Outcome::Saved, "Game saved!".to_string(), false),
            Err(e) => {
                let message = format!("Could not save the game: {e}");
                (Outcome::SaveFailed(e), message, true)
            }
        }
    }

    fn load(&mut self) -> (Outcome, String, bool) {
        match load_game(&self.store, &self.config.save_slot) {
            Ok(loaded) => {
                loaded.apply_to(&mut self.state);
                for &id in ResourceId::all() {
                    self.scheduler.reschedule(id, self.state.ledger.rate(id));
                }
                (Outcome::Loaded, "Save loaded!".to_string(), true)
            }
            Err(e) => {
                let message = match &e {
                    PersistError::NotFound { .. } => "There is no save file to load.".to_string(),
                    PersistError::Empty { .. } => "Save file is empty!".to_string(),
                    PersistError::Corrupt { .. } => {
                        format!("The save file is damaged, so you keep playing. ({e})")
                    }
                    _ => format!("Could not load the game: {e}"),
                };
                (Outcome::LoadFailed(e), message, true)
            }
        }
    }

    fn autosave(&mut self) -> Result<(), PersistError> {
        let result = save_game(&mut self.store, &self.config.save_slot, &self.state).map(|_| ());
        if let Err(e) = &result {
            self.state.log.push(&format!("Autosave failed: {e}"), true);
        }
        result
    }

    fn refresh_gate(&mut self) -> Vec<PurchaseId> {
        let state = &mut self.state;
        let revealed = state.gate.refresh(&state.ledger, &state.catalog);
        for id in &revealed {
            state
                .log
                .push(&format!("A new option appears: {}.", id.def().name), true);
        }
        revealed
    }
}
