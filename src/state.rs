//! Cat Clicker game state definitions.

use crate::catalog::PurchaseCatalog;
use crate::error::ConfigError;
use crate::gate::ProgressionGate;
use crate::ledger::ResourceLedger;

/// Kinds of resources tracked by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    Food,
    Catnip,
    Science,
}

impl ResourceId {
    pub const COUNT: usize = 3;

    /// All resources in display order.
    pub fn all() -> &'static [ResourceId] {
        &[ResourceId::Food, ResourceId::Catnip, ResourceId::Science]
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceId::Food => "Food",
            ResourceId::Catnip => "Catnip",
            ResourceId::Science => "Science",
        }
    }

    /// Position in `ResourceId::all()`.
    pub fn index(&self) -> usize {
        match self {
            ResourceId::Food => 0,
            ResourceId::Catnip => 1,
            ResourceId::Science => 2,
        }
    }
}

/// Bounded counters that index into a label table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TierId {
    Catch,
    Upgrade,
}

impl TierId {
    pub fn all() -> &'static [TierId] {
        &[TierId::Catch, TierId::Upgrade]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TierId::Catch => "catch",
            TierId::Upgrade => "upgrade",
        }
    }

    /// The fixed label table this counter indexes into.
    pub fn labels(&self) -> &'static LabelTable {
        match self {
            TierId::Catch => &CATCH_LABELS,
            TierId::Upgrade => &UPGRADE_LABELS,
        }
    }
}

/// Fixed ordered tier → display name table. Tier values are 1-based.
#[derive(Debug)]
pub struct LabelTable {
    pub name: &'static str,
    pub labels: &'static [&'static str],
}

impl LabelTable {
    /// Highest valid tier value. Reaching it is the "fully upgraded" state.
    pub fn last(&self) -> u32 {
        self.labels.len() as u32
    }

    /// Label for a tier value, `None` outside `1..=last()`.
    pub fn label(&self, value: u32) -> Option<&'static str> {
        let idx = usize::try_from(value).ok()?.checked_sub(1)?;
        self.labels.get(idx).copied()
    }

    pub fn contains(&self, value: u32) -> bool {
        self.label(value).is_some()
    }

    /// Reject empty tables and blank labels.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.is_empty() {
            return Err(ConfigError::LabelTable {
                table: self.name,
                reason: "table has no labels".into(),
            });
        }
        if let Some(pos) = self.labels.iter().position(|l| l.trim().is_empty()) {
            return Err(ConfigError::LabelTable {
                table: self.name,
                reason: format!("tier {} has a blank label", pos + 1),
            });
        }
        Ok(())
    }
}

pub static CATCH_LABELS: LabelTable = LabelTable {
    name: "catch",
    labels: &[
        "Fish", "Mouse", "Rat", "Squirrel", "Sparrow", "Pigeon", "Chicken", "Turkey", "Peacock",
    ],
};

pub static UPGRADE_LABELS: LabelTable = LabelTable {
    name: "upgrade",
    labels: &[
        "Sharpened Claws",
        "Yarn Trap",
        "Cardboard Fort",
        "Laser Pointer",
        "Robot Vacuum",
        "Catapult",
        "Hot Air Balloon",
        "Observatory",
        "Rocket",
    ],
};

/// Validate every label table used by a tier counter.
pub fn validate_label_tables() -> Result<(), ConfigError> {
    TierId::all().iter().try_for_each(|t| t.labels().validate())
}

/// A bounded counter over a label table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierCounter {
    pub id: TierId,
    pub value: u32,
}

impl TierCounter {
    pub fn new(id: TierId) -> Self {
        Self { id, value: 1 }
    }

    pub fn label(&self) -> Option<&'static str> {
        self.id.labels().label(self.value)
    }

    /// At or past the last entry of the label table.
    pub fn is_maxed(&self) -> bool {
        self.value >= self.id.labels().last()
    }

    /// Move to the next tier. Returns false (and leaves the value alone) when maxed.
    pub fn advance(&mut self) -> bool {
        if self.is_maxed() {
            return false;
        }
        self.value += 1;
        true
    }
}

/// All tier counters of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tiers {
    pub catch: TierCounter,
    pub upgrade: TierCounter,
}

impl Tiers {
    pub fn new() -> Self {
        Self {
            catch: TierCounter::new(TierId::Catch),
            upgrade: TierCounter::new(TierId::Upgrade),
        }
    }

    pub fn get(&self, id: TierId) -> &TierCounter {
        match id {
            TierId::Catch => &self.catch,
            TierId::Upgrade => &self.upgrade,
        }
    }

    pub fn get_mut(&mut self, id: TierId) -> &mut TierCounter {
        match id {
            TierId::Catch => &mut self.catch,
            TierId::Upgrade => &mut self.upgrade,
        }
    }

    pub fn value(&self, id: TierId) -> u32 {
        self.get(id).value
    }
}

impl Default for Tiers {
    fn default() -> Self {
        Self::new()
    }
}

/// Log entry shown in the info panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Bounded message log; the oldest entry is dropped first.
#[derive(Clone, Debug)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, text: &str, is_important: bool) {
        self.entries.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Full state of a session, owned by the engine.
#[derive(Clone, Debug)]
pub struct EngineState {
    pub ledger: ResourceLedger,
    pub catalog: PurchaseCatalog,
    pub tiers: Tiers,
    pub gate: ProgressionGate,
    pub log: MessageLog,
}

impl EngineState {
    pub fn new(log_capacity: usize) -> Self {
        let mut log = MessageLog::new(log_capacity);
        log.push("You feel hungry, go catch some food!", true);
        Self {
            ledger: ResourceLedger::new(),
            catalog: PurchaseCatalog::new(),
            tiers: Tiers::new(),
            gate: ProgressionGate::new(),
            log,
        }
    }
}
