//! Player actions, their ids and key bindings.

use std::fmt;
use std::str::FromStr;

use crate::catalog::PurchaseId;
use crate::error::UnknownAction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Manual click on the primary resource.
    Catch,
    Purchase(PurchaseId),
    Save,
    Load,
}

impl Action {
    /// Every action in menu order.
    pub fn all() -> &'static [Action] {
        &[
            Action::Catch,
            Action::Purchase(PurchaseId::HireCat),
            Action::Purchase(PurchaseId::UpgradeCatch),
            Action::Purchase(PurchaseId::Catnip),
            Action::Purchase(PurchaseId::Racoon),
            Action::Purchase(PurchaseId::Science),
            Action::Purchase(PurchaseId::Upgrade),
            Action::Save,
            Action::Load,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Action::Catch => "catch",
            Action::Purchase(PurchaseId::HireCat) => "hire-cat",
            Action::Purchase(PurchaseId::UpgradeCatch) => "upgrade-catch",
            Action::Purchase(PurchaseId::Catnip) => "catnip",
            Action::Purchase(PurchaseId::Racoon) => "racoon",
            Action::Purchase(PurchaseId::Science) => "science",
            Action::Purchase(PurchaseId::Upgrade) => "upgrade",
            Action::Save => "save",
            Action::Load => "load",
        }
    }

    pub fn key(&self) -> char {
        match self {
            Action::Catch => 'c',
            Action::Purchase(PurchaseId::HireCat) => 'h',
            Action::Purchase(PurchaseId::UpgradeCatch) => 'g',
            Action::Purchase(PurchaseId::Catnip) => 'n',
            Action::Purchase(PurchaseId::Racoon) => 'r',
            Action::Purchase(PurchaseId::Science) => 'x',
            Action::Purchase(PurchaseId::Upgrade) => 'u',
            Action::Save => 's',
            Action::Load => 'l',
        }
    }

    pub fn from_key(key: char) -> Option<Action> {
        let key = key.to_ascii_lowercase();
        Action::all().iter().copied().find(|a| a.key() == key)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::all()
            .iter()
            .copied()
            .find(|a| a.id() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
