//! Progression gate: which purchases are visible and which are affordable.
//!
//! Visibility is latched: once every predicate of a purchase held at the same
//! time it stays revealed for the rest of the session. Affordability is
//! re-evaluated from the ledger on every read. All comparisons use `>=`.
//!
//! The latch travels with saves as a bitmask ([`ProgressionGate::mask`]).
//! Saves without it get the latch back from progress evidence
//! ([`ProgressionGate::latch_progress`]).

use crate::catalog::{Effect, PurchaseCatalog, PurchaseId, PURCHASE_TABLE};
use crate::ledger::ResourceLedger;
use crate::state::{ResourceId, Tiers};

/// A value read from the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Amount(ResourceId),
    Rate(ResourceId),
}

impl Metric {
    fn read(&self, ledger: &ResourceLedger) -> u64 {
        match self {
            Metric::Amount(r) => ledger.amount(*r),
            Metric::Rate(r) => ledger.rate(*r),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Threshold {
    Value(u64),
    /// The purchase's current cost.
    CostOf(PurchaseId),
}

impl Threshold {
    fn read(&self, catalog: &PurchaseCatalog) -> u64 {
        match self {
            Threshold::Value(v) => *v,
            Threshold::CostOf(id) => catalog.cost(*id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    AtLeast { metric: Metric, threshold: Threshold },
    Revealed(PurchaseId),
}

/// Unlock predicates of one purchase. An empty list means always visible.
#[derive(Clone, Copy, Debug)]
pub struct RevealRule {
    pub id: PurchaseId,
    pub requires: &'static [Predicate],
}

pub static REVEAL_RULES: [RevealRule; PurchaseId::COUNT] = [
    RevealRule {
        id: PurchaseId::HireCat,
        requires: &[],
    },
    RevealRule {
        id: PurchaseId::UpgradeCatch,
        requires: &[],
    },
    RevealRule {
        id: PurchaseId::Catnip,
        requires: &[
            Predicate::AtLeast {
                metric: Metric::Rate(ResourceId::Food),
                threshold: Threshold::Value(10),
            },
            Predicate::AtLeast {
                metric: Metric::Amount(ResourceId::Food),
                threshold: Threshold::CostOf(PurchaseId::Catnip),
            },
        ],
    },
    RevealRule {
        id: PurchaseId::Racoon,
        requires: &[
            Predicate::Revealed(PurchaseId::Upgrade),
            Predicate::AtLeast {
                metric: Metric::Amount(ResourceId::Food),
                threshold: Threshold::CostOf(PurchaseId::Racoon),
            },
        ],
    },
    RevealRule {
        id: PurchaseId::Science,
        requires: &[Predicate::AtLeast {
            metric: Metric::Amount(ResourceId::Catnip),
            threshold: Threshold::CostOf(PurchaseId::Science),
        }],
    },
    RevealRule {
        id: PurchaseId::Upgrade,
        requires: &[Predicate::AtLeast {
            metric: Metric::Amount(ResourceId::Science),
            threshold: Threshold::CostOf(PurchaseId::Upgrade),
        }],
    },
];

/// Render-ready status of one purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseStatus {
    pub id: PurchaseId,
    pub visible: bool,
    pub affordable: bool,
    pub maxed: bool,
}

impl PurchaseStatus {
    /// Shown, not maxed out, and affordable right now.
    pub fn enabled(&self) -> bool {
        self.visible && self.affordable && !self.maxed
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressionGate {
    revealed: [bool; PurchaseId::COUNT],
}

impl ProgressionGate {
    pub fn new() -> Self {
        let mut revealed = [false; PurchaseId::COUNT];
        for rule in &REVEAL_RULES {
            revealed[rule.id.index()] = rule.requires.is_empty();
        }
        Self { revealed }
    }

    pub fn is_revealed(&self, id: PurchaseId) -> bool {
        self.revealed[id.index()]
    }

    /// Re-evaluate every rule against the ledger and latch newly satisfied
    /// ones. Returns the purchases revealed by this call, in table order.
    pub fn refresh(&mut self, ledger: &ResourceLedger, catalog: &PurchaseCatalog) -> Vec<PurchaseId> {
        let mut newly = Vec::new();
        // Rules may depend on other reveals; iterate to a fixpoint.
        loop {
            let mut changed = false;
            for rule in &REVEAL_RULES {
                if self.revealed[rule.id.index()] {
                    continue;
                }
                if rule.requires.iter().all(|p| self.holds(p, ledger, catalog)) {
                    self.revealed[rule.id.index()] = true;
                    newly.push(rule.id);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        newly.sort();
        newly
    }

    /// Revealed purchases as bits, by [`PurchaseId::index`].
    pub fn mask(&self) -> u64 {
        self.revealed
            .iter()
            .enumerate()
            .filter(|(_, revealed)| **revealed)
            .fold(0, |mask, (i, _)| mask | 1 << i)
    }

    /// Rebuild a latch from [`Self::mask`]. `None` when a bit names no
    /// purchase. Always-visible purchases stay visible whatever the mask says.
    pub fn from_mask(mask: u64) -> Option<Self> {
        if mask >> PurchaseId::COUNT != 0 {
            return None;
        }
        let mut gate = Self::new();
        for (i, revealed) in gate.revealed.iter_mut().enumerate() {
            *revealed |= mask & (1 << i) != 0;
        }
        Some(gate)
    }

    /// Union with another latch.
    pub fn merge(&mut self, other: &ProgressionGate) {
        for (mine, theirs) in self.revealed.iter_mut().zip(other.revealed) {
            *mine |= theirs;
        }
    }

    /// Latch every purchase the state shows was bought at least once: its cost
    /// left the base cost, its tier counter moved past 1, or it is the only
    /// source of a rate that is above 0. A latched purchase also latches the
    /// reveals its own rule depends on.
    pub fn latch_progress(
        &mut self,
        ledger: &ResourceLedger,
        catalog: &PurchaseCatalog,
        tiers: &Tiers,
    ) {
        for def in &PURCHASE_TABLE {
            let bought = catalog.cost(def.id) != def.base_cost
                || match def.effect {
                    Effect::AdvanceTier { tier, .. } => tiers.value(tier) > 1,
                    Effect::RaiseRate { resource, .. } => {
                        ledger.rate(resource) > 0 && sole_rate_source(def.id, resource)
                    }
                    Effect::Grant { .. } => false,
                };
            if bought {
                self.revealed[def.id.index()] = true;
            }
        }

        loop {
            let missing: Vec<PurchaseId> = REVEAL_RULES
                .iter()
                .filter(|rule| self.revealed[rule.id.index()])
                .flat_map(|rule| rule.requires)
                .filter_map(|predicate| match predicate {
                    Predicate::Revealed(dep) if !self.revealed[dep.index()] => Some(*dep),
                    _ => None,
                })
                .collect();
            if missing.is_empty() {
                break;
            }
            for dep in missing {
                self.revealed[dep.index()] = true;
            }
        }
    }

    pub fn status(
        &self,
        id: PurchaseId,
        ledger: &ResourceLedger,
        catalog: &PurchaseCatalog,
        tiers: &Tiers,
    ) -> PurchaseStatus {
        PurchaseStatus {
            id,
            visible: self.is_revealed(id),
            affordable: catalog.is_affordable(id, ledger),
            maxed: catalog.is_maxed(id, tiers),
        }
    }

    fn holds(&self, predicate: &Predicate, ledger: &ResourceLedger, catalog: &PurchaseCatalog) -> bool {
        match predicate {
            Predicate::AtLeast { metric, threshold } => metric.read(ledger) >= threshold.read(catalog),
            Predicate::Revealed(id) => self.is_revealed(*id),
        }
    }
}

fn sole_rate_source(id: PurchaseId, resource: ResourceId) -> bool {
    PURCHASE_TABLE.iter().all(|def| {
        def.id == id || !matches!(def.effect, Effect::RaiseRate { resource: r, .. } if r == resource)
    })
}

impl Default for ProgressionGate {
    fn default() -> Self {
        Self::new()
    }
}
