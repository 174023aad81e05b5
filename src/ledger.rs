//! Resource ledger: amounts, production rates and click multipliers.
//!
//! Pure bookkeeping. Every spend goes through [`ResourceLedger::debit`], which
//! refuses instead of clamping, so amounts can never go negative.

use crate::state::ResourceId;

/// A single resource balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub id: ResourceId,
    pub amount: u64,
    /// Units credited per second by the scheduler.
    pub rate: u64,
    /// Units credited per manual action (default 1).
    pub multiplier: u64,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            amount: 0,
            rate: 0,
            multiplier: 1,
        }
    }
}

/// Rejected debit. The ledger is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insufficient {
    pub needed: u64,
    pub available: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLedger {
    resources: Vec<Resource>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self {
            resources: ResourceId::all().iter().map(|&id| Resource::new(id)).collect(),
        }
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn amount(&self, id: ResourceId) -> u64 {
        self.resource(id).amount
    }

    pub fn rate(&self, id: ResourceId) -> u64 {
        self.resource(id).rate
    }

    pub fn multiplier(&self, id: ResourceId) -> u64 {
        self.resource(id).multiplier
    }

    pub fn credit(&mut self, id: ResourceId, delta: u64) {
        let r = &mut self.resources[id.index()];
        r.amount = r.amount.saturating_add(delta);
    }

    /// Subtract `cost` only if the balance covers it.
    pub fn debit(&mut self, id: ResourceId, cost: u64) -> Result<(), Insufficient> {
        let r = &mut self.resources[id.index()];
        if r.amount < cost {
            return Err(Insufficient {
                needed: cost,
                available: r.amount,
            });
        }
        r.amount -= cost;
        Ok(())
    }

    /// Replace the production rate. Callers reschedule the producer afterwards.
    pub fn set_rate(&mut self, id: ResourceId, rate: u64) {
        self.resources[id.index()].rate = rate;
    }

    /// Replace the click multiplier (never below 1).
    pub fn set_multiplier(&mut self, id: ResourceId, multiplier: u64) {
        self.resources[id.index()].multiplier = multiplier.max(1);
    }

    pub(crate) fn set_amount(&mut self, id: ResourceId, amount: u64) {
        self.resources[id.index()].amount = amount;
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}
