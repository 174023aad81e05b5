//! Purchase catalog: one data-driven table and a single generic purchase routine.
//!
//! Adding a purchase means adding a row to [`PURCHASE_TABLE`] (plus an id);
//! [`PurchaseCatalog::attempt_purchase`] has no per-purchase branches.

use crate::ledger::ResourceLedger;
use crate::state::{ResourceId, TierId, Tiers};

/// Everything the player can buy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PurchaseId {
    HireCat,
    UpgradeCatch,
    Catnip,
    Racoon,
    Science,
    Upgrade,
}

impl PurchaseId {
    pub const COUNT: usize = 6;

    /// All purchases in display order.
    pub fn all() -> &'static [PurchaseId] {
        &[
            PurchaseId::HireCat,
            PurchaseId::UpgradeCatch,
            PurchaseId::Catnip,
            PurchaseId::Racoon,
            PurchaseId::Science,
            PurchaseId::Upgrade,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            PurchaseId::HireCat => 0,
            PurchaseId::UpgradeCatch => 1,
            PurchaseId::Catnip => 2,
            PurchaseId::Racoon => 3,
            PurchaseId::Science => 4,
            PurchaseId::Upgrade => 5,
        }
    }

    /// The table row for this purchase.
    pub fn def(&self) -> &'static PurchaseDef {
        &PURCHASE_TABLE[self.index()]
    }
}

/// A quantity that is either constant or read from a tier counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Amount {
    Fixed(u64),
    Tier(TierId),
}

impl Amount {
    pub fn resolve(&self, tiers: &Tiers) -> u64 {
        match self {
            Amount::Fixed(n) => *n,
            Amount::Tier(t) => u64::from(tiers.value(*t)),
        }
    }
}

/// What a successful purchase does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Increase a production rate.
    RaiseRate { resource: ResourceId, by: Amount },
    /// Credit a resource directly.
    Grant { resource: ResourceId, by: Amount },
    /// Advance a tier counter; optionally the resource's click multiplier
    /// follows the new tier value.
    AdvanceTier {
        tier: TierId,
        multiplier_of: Option<ResourceId>,
    },
}

/// How a purchase's cost moves after each successful purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthRule {
    Fixed(u64),
    /// `step` times the tier value (read after the effect is applied).
    Scaled { step: u64, by: TierId },
}

impl GrowthRule {
    pub fn next_cost(&self, cost: u64, tiers: &Tiers) -> u64 {
        let delta = match self {
            GrowthRule::Fixed(n) => *n,
            GrowthRule::Scaled { step, by } => step.saturating_mul(u64::from(tiers.value(*by))),
        };
        cost.saturating_add(delta)
    }
}

/// Log lines for each outcome. `{label}` is replaced by the new tier label.
#[derive(Clone, Copy, Debug)]
pub struct Flavour {
    pub applied: &'static str,
    pub insufficient: &'static str,
    pub maxed: &'static str,
}

/// One row of the purchase table.
#[derive(Clone, Copy, Debug)]
pub struct PurchaseDef {
    pub id: PurchaseId,
    pub name: &'static str,
    pub cost_resource: ResourceId,
    pub base_cost: u64,
    pub growth: GrowthRule,
    pub effect: Effect,
    /// Purchase is permanently unavailable once this counter is maxed.
    pub max_tier: Option<TierId>,
    pub flavour: Flavour,
}

pub static PURCHASE_TABLE: [PurchaseDef; PurchaseId::COUNT] = [
    PurchaseDef {
        id: PurchaseId::HireCat,
        name: "Hire Cat",
        cost_resource: ResourceId::Food,
        base_cost: 5,
        growth: GrowthRule::Fixed(5),
        effect: Effect::RaiseRate {
            resource: ResourceId::Food,
            by: Amount::Fixed(1),
        },
        max_tier: None,
        flavour: Flavour {
            applied: "You pass some food (and an employment contract) to a street cat, and they nod.",
            insufficient: "The cat rolls their eyes at your lowball offer.",
            maxed: "",
        },
    },
    PurchaseDef {
        id: PurchaseId::UpgradeCatch,
        name: "Upgrade Catch",
        cost_resource: ResourceId::Food,
        base_cost: 100,
        growth: GrowthRule::Fixed(100),
        effect: Effect::AdvanceTier {
            tier: TierId::Catch,
            multiplier_of: Some(ResourceId::Food),
        },
        max_tier: Some(TierId::Catch),
        flavour: Flavour {
            applied: "You spend a few minutes licking yourself and have an epiphany. You can now catch {label}!",
            insufficient: "You try and fail to catch a bigger prey.",
            maxed: "You realize that you're happy with your current catch, and you take comfort in your contentment.",
        },
    },
    PurchaseDef {
        id: PurchaseId::Catnip,
        name: "Plant Catnip",
        cost_resource: ResourceId::Food,
        base_cost: 50,
        growth: GrowthRule::Fixed(1),
        effect: Effect::RaiseRate {
            resource: ResourceId::Catnip,
            by: Amount::Fixed(1),
        },
        max_tier: None,
        flavour: Flavour {
            applied: "You trade food for a catnip seedling. The garden smells wonderful.",
            insufficient: "The gardener cat wants more food for the seeds.",
            maxed: "",
        },
    },
    PurchaseDef {
        id: PurchaseId::Racoon,
        name: "Hire Racoon",
        cost_resource: ResourceId::Food,
        base_cost: 200,
        growth: GrowthRule::Fixed(10),
        effect: Effect::RaiseRate {
            resource: ResourceId::Food,
            by: Amount::Tier(TierId::Upgrade),
        },
        max_tier: None,
        flavour: Flavour {
            applied: "A racoon signs on as a forager, tools in paw.",
            insufficient: "The racoon sniffs at your pile of food and waddles off.",
            maxed: "",
        },
    },
    PurchaseDef {
        id: PurchaseId::Science,
        name: "Do Science",
        cost_resource: ResourceId::Catnip,
        base_cost: 10,
        growth: GrowthRule::Fixed(2),
        effect: Effect::Grant {
            resource: ResourceId::Science,
            by: Amount::Fixed(1),
        },
        max_tier: None,
        flavour: Flavour {
            applied: "You stare at the catnip until it turns into science.",
            insufficient: "You need more catnip to think clearly.",
            maxed: "",
        },
    },
    PurchaseDef {
        id: PurchaseId::Upgrade,
        name: "Build Upgrade",
        cost_resource: ResourceId::Science,
        base_cost: 5,
        growth: GrowthRule::Scaled {
            step: 5,
            by: TierId::Upgrade,
        },
        effect: Effect::AdvanceTier {
            tier: TierId::Upgrade,
            multiplier_of: None,
        },
        max_tier: Some(TierId::Upgrade),
        flavour: Flavour {
            applied: "Your engineers unveil the {label}.",
            insufficient: "Science is hard. You need more of it.",
            maxed: "There is nothing left to build. You gaze up at the stars.",
        },
    },
];

/// A purchase that went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub id: PurchaseId,
    pub paid: u64,
    pub new_cost: u64,
    /// Resource whose rate changed and needs rescheduling.
    pub rescheduled: Option<ResourceId>,
    /// New label when a tier counter advanced.
    pub tier_label: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Applied(Applied),
    InsufficientFunds { cost: u64, available: u64 },
    MaxTierReached { tier: TierId },
    /// Not revealed by the progression gate yet. Nothing was charged.
    Locked,
}

impl PurchaseOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PurchaseOutcome::Applied(_))
    }
}

/// Current cost of every purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseCatalog {
    costs: [u64; PurchaseId::COUNT],
}

impl PurchaseCatalog {
    pub fn new() -> Self {
        let mut costs = [0; PurchaseId::COUNT];
        for def in &PURCHASE_TABLE {
            costs[def.id.index()] = def.base_cost;
        }
        Self { costs }
    }

    pub fn cost(&self, id: PurchaseId) -> u64 {
        self.costs[id.index()]
    }

    pub(crate) fn set_cost(&mut self, id: PurchaseId, cost: u64) {
        self.costs[id.index()] = cost;
    }

    /// Permanently unavailable because its tier counter is maxed.
    pub fn is_maxed(&self, id: PurchaseId, tiers: &Tiers) -> bool {
        id.def().max_tier.is_some_and(|t| tiers.get(t).is_maxed())
    }

    /// The cost resource covers the current cost.
    pub fn is_affordable(&self, id: PurchaseId, ledger: &ResourceLedger) -> bool {
        ledger.amount(id.def().cost_resource) >= self.cost(id)
    }

    /// Validate and apply a purchase. Rejections leave every balance, cost and
    /// counter untouched.
    pub fn attempt_purchase(
        &mut self,
        id: PurchaseId,
        ledger: &mut ResourceLedger,
        tiers: &mut Tiers,
    ) -> PurchaseOutcome {
        let def = id.def();
        let cost = self.cost(id);

        if let Some(tier) = def.max_tier {
            if tiers.get(tier).is_maxed() {
                return PurchaseOutcome::MaxTierReached { tier };
            }
        }

        if let Err(short) = ledger.debit(def.cost_resource, cost) {
            return PurchaseOutcome::InsufficientFunds {
                cost,
                available: short.available,
            };
        }

        let mut rescheduled = None;
        let mut tier_label = None;
        match def.effect {
            Effect::RaiseRate { resource, by } => {
                let rate = ledger.rate(resource).saturating_add(by.resolve(tiers));
                ledger.set_rate(resource, rate);
                rescheduled = Some(resource);
            }
            Effect::Grant { resource, by } => {
                ledger.credit(resource, by.resolve(tiers));
            }
            Effect::AdvanceTier {
                tier,
                multiplier_of,
            } => {
                let counter = tiers.get_mut(tier);
                counter.advance();
                tier_label = counter.label();
                if let Some(resource) = multiplier_of {
                    ledger.set_multiplier(resource, u64::from(counter.value));
                }
            }
        }

        let new_cost = def.growth.next_cost(cost, tiers);
        self.costs[id.index()] = new_cost;

        PurchaseOutcome::Applied(Applied {
            id,
            paid: cost,
            new_cost,
            rescheduled,
            tier_label,
        })
    }
}

impl Default for PurchaseCatalog {
    fn default() -> Self {
        Self::new()
    }
}
