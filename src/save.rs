//! セーブ/ロード機能。整数フィールドのフラットなレコードと、それを保持するストア。
//!
//! ## フォーマット
//!
//! スロットごとに JSON オブジェクトを 1 つ保存する。中身は [`SAVE_FIELDS`] の
//! 13 フィールドと、公開済み購入のビットマスク [`REVEALED_FIELD`]。
//!
//! - 13 フィールドは必須。1 つでも欠けていれば破損扱いにする（部分セーブはない）。
//! - [`REVEALED_FIELD`] は後から追加したフィールドなので省略可能。無い場合は
//!   他のフィールドに残る進行状況から公開状態を復元する。
//! - 未知のフィールドは無視する。
//!
//! ロードは全部適用するか何もしないかのどちらか。[`SaveRecord::restore`] が
//! 全フィールドを検証して切り離された [`LoadedState`] を作り、
//! 実行中のゲームには検証が済むまで一切触れない。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{PurchaseCatalog, PurchaseId};
use crate::error::PersistError;
use crate::gate::ProgressionGate;
use crate::ledger::ResourceLedger;
use crate::state::{EngineState, ResourceId, TierId, Tiers};

/// 保存される整数がエンジン状態のどこに対応するか。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Amount(ResourceId),
    Rate(ResourceId),
    Cost(PurchaseId),
    Tier(TierId),
}

pub const SAVE_FIELDS: [(&str, Field); 13] = [
    ("food", Field::Amount(ResourceId::Food)),
    ("food_rate", Field::Rate(ResourceId::Food)),
    ("hire_cat_cost", Field::Cost(PurchaseId::HireCat)),
    ("catch", Field::Tier(TierId::Catch)),
    ("catch_cost", Field::Cost(PurchaseId::UpgradeCatch)),
    ("catnip", Field::Amount(ResourceId::Catnip)),
    ("catnip_cost", Field::Cost(PurchaseId::Catnip)),
    ("catnip_rate", Field::Rate(ResourceId::Catnip)),
    ("racoon_cost", Field::Cost(PurchaseId::Racoon)),
    ("science", Field::Amount(ResourceId::Science)),
    ("science_cost", Field::Cost(PurchaseId::Science)),
    ("upgrade", Field::Tier(TierId::Upgrade)),
    ("upgrade_cost", Field::Cost(PurchaseId::Upgrade)),
];

/// 公開済み購入のビットマスク（[`ProgressionGate::mask`]）。省略可能。
pub const REVEALED_FIELD: &str = "revealed";

/// ゲーム状態全体を表すフィールド名 → 整数のマップ。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveRecord {
    fields: BTreeMap<String, u64>,
}

impl SaveRecord {
    /// 状態から保存対象のフィールドをすべて取り出す。
    pub fn capture(state: &EngineState) -> Self {
        let mut fields: BTreeMap<String, u64> = SAVE_FIELDS
            .iter()
            .map(|(name, field)| {
                let value = match field {
                    Field::Amount(r) => state.ledger.amount(*r),
                    Field::Rate(r) => state.ledger.rate(*r),
                    Field::Cost(p) => state.catalog.cost(*p),
                    Field::Tier(t) => u64::from(state.tiers.value(*t)),
                };
                (name.to_string(), value)
            })
            .collect();
        fields.insert(REVEALED_FIELD.to_string(), state.gate.mask());
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.fields.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// 保存内容をパースする。未知のフィールドは捨てる。
    /// 非負整数の JSON オブジェクトでなければ破損扱い。
    pub fn parse(slot: &str, contents: &str) -> Result<Self, PersistError> {
        if contents.trim().is_empty() {
            return Err(PersistError::Empty {
                slot: slot.to_string(),
            });
        }
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| PersistError::corrupt(slot, format!("invalid JSON: {e}")))?;
        let object = match value {
            Value::Object(map) => map,
            other => {
                return Err(PersistError::corrupt(
                    slot,
                    format!("expected an object, found {}", json_kind(&other)),
                ))
            }
        };
        if object.is_empty() {
            return Err(PersistError::Empty {
                slot: slot.to_string(),
            });
        }

        let mut fields = BTreeMap::new();
        let optional = object.get(REVEALED_FIELD).map(|raw| (REVEALED_FIELD, raw));
        let required = SAVE_FIELDS.iter().map(|(name, _)| {
            object
                .get(*name)
                .map(|raw| (*name, raw))
                .ok_or_else(|| PersistError::corrupt(slot, format!("field `{name}` is missing")))
        });
        for entry in required.chain(optional.map(Ok)) {
            let (name, raw) = entry?;
            let value = raw.as_u64().ok_or_else(|| {
                PersistError::corrupt(
                    slot,
                    format!("field `{name}` is not a non-negative integer: {raw}"),
                )
            })?;
            fields.insert(name.to_string(), value);
        }
        Ok(Self { fields })
    }

    /// レコードを検証して切り離された状態に変換する。失敗しても副作用はない。
    pub fn restore(&self, slot: &str) -> Result<LoadedState, PersistError> {
        let mut ledger = ResourceLedger::new();
        let mut catalog = PurchaseCatalog::new();
        let mut tiers = Tiers::new();

        for (name, field) in &SAVE_FIELDS {
            let value = self
                .get(name)
                .ok_or_else(|| PersistError::corrupt(slot, format!("field `{name}` is missing")))?;
            match field {
                Field::Amount(r) => ledger.set_amount(*r, value),
                Field::Rate(r) => ledger.set_rate(*r, value),
                Field::Cost(p) => catalog.set_cost(*p, value),
                Field::Tier(t) => {
                    let table = t.labels();
                    let tier = u32::try_from(value)
                        .ok()
                        .filter(|v| table.contains(*v))
                        .ok_or_else(|| {
                            PersistError::corrupt(
                                slot,
                                format!("field `{name}` = {value} is outside 1..={}", table.last()),
                            )
                        })?;
                    tiers.get_mut(*t).value = tier;
                }
            }
        }
        ledger.set_multiplier(ResourceId::Food, u64::from(tiers.value(TierId::Catch)));

        let mut gate = match self.get(REVEALED_FIELD) {
            Some(mask) => ProgressionGate::from_mask(mask).ok_or_else(|| {
                PersistError::corrupt(
                    slot,
                    format!("field `{REVEALED_FIELD}` = {mask} names unknown purchases"),
                )
            })?,
            None => ProgressionGate::new(),
        };
        // 買ったことがある購入は、マスクの有無に関係なく公開済みにする。
        gate.latch_progress(&ledger, &catalog, &tiers);

        Ok(LoadedState {
            ledger,
            catalog,
            tiers,
            gate,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 検証済みでまだ適用していないセーブ。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedState {
    pub ledger: ResourceLedger,
    pub catalog: PurchaseCatalog,
    pub tiers: Tiers,
    pub gate: ProgressionGate,
}

impl LoadedState {
    /// 資源・コスト・ティアを一度に置き換える。
    /// 公開状態はセッション中に減らないので、現在の公開状態との和集合を取る。
    /// メッセージログはそのまま残す。
    pub fn apply_to(self, state: &mut EngineState) {
        state.ledger = self.ledger;
        state.catalog = self.catalog;
        state.tiers = self.tiers;
        state.gate.merge(&self.gate);
    }
}

/// セーブスロットの永続化先。
pub trait SaveStore {
    /// 一度も書き込まれていないスロットは `Ok(None)`。
    fn read(&self, slot: &str) -> Result<Option<String>, PersistError>;

    fn write(&mut self, slot: &str, contents: &str) -> Result<(), PersistError>;
}

/// 状態をシリアライズしてスロットに書き込む。書き込んだレコードを返す。
pub fn save_game<S: SaveStore + ?Sized>(
    store: &mut S,
    slot: &str,
    state: &EngineState,
) -> Result<SaveRecord, PersistError> {
    let record = SaveRecord::capture(state);
    let json = record.to_json()?;
    store.write(slot, &json)?;
    Ok(record)
}

/// スロットを読み込んで検証する。
pub fn load_game<S: SaveStore + ?Sized>(store: &S, slot: &str) -> Result<LoadedState, PersistError> {
    let contents = store.read(slot)?.ok_or_else(|| PersistError::NotFound {
        slot: slot.to_string(),
    })?;
    SaveRecord::parse(slot, &contents)?.restore(slot)
}

/// ヘッドレス実行とテスト用のインメモリストア。
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// スロットに生の文字列を直接入れる。
    pub fn insert(&mut self, slot: &str, contents: &str) {
        self.slots.insert(slot.to_string(), contents.to_string());
    }

    pub fn contents(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    /// 読み取り専用の媒体のように、すべての書き込みを失敗させる。
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>, PersistError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn write(&mut self, slot: &str, contents: &str) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Io {
                slot: slot.to_string(),
                reason: "store is read-only".into(),
            });
        }
        self.slots.insert(slot.to_string(), contents.to_string());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::SaveStore;
    use crate::error::PersistError;

    /// ディレクトリ内にスロットごとの `<slot>.json` を置く。
    #[derive(Clone, Debug)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        pub fn path(&self, slot: &str) -> PathBuf {
            self.dir.join(format!("{slot}.json"))
        }
    }

    impl SaveStore for FileStore {
        fn read(&self, slot: &str) -> Result<Option<String>, PersistError> {
            match fs::read_to_string(self.path(slot)) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(PersistError::io(slot, &e)),
            }
        }

        fn write(&mut self, slot: &str, contents: &str) -> Result<(), PersistError> {
            fs::create_dir_all(&self.dir).map_err(|e| PersistError::io(slot, &e))?;
            fs::write(self.path(slot), contents).map_err(|e| PersistError::io(slot, &e))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use super::SaveStore;
    use crate::error::PersistError;

    /// `window.localStorage` にスロットごとに 1 キー。
    #[derive(Clone, Debug)]
    pub struct LocalStorageStore {
        prefix: String,
    }

    impl LocalStorageStore {
        pub fn new(prefix: &str) -> Self {
            Self {
                prefix: prefix.to_string(),
            }
        }

        fn key(&self, slot: &str) -> String {
            format!("{}{}", self.prefix, slot)
        }
    }

    fn get_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    fn storage_error(slot: &str, reason: String) -> PersistError {
        web_sys::console::warn_1(&format!("Cat Clicker: localStorage error on {slot}: {reason}").into());
        PersistError::Io {
            slot: slot.to_string(),
            reason,
        }
    }

    impl SaveStore for LocalStorageStore {
        fn read(&self, slot: &str) -> Result<Option<String>, PersistError> {
            let storage =
                get_storage().ok_or_else(|| storage_error(slot, "localStorage unavailable".into()))?;
            storage
                .get_item(&self.key(slot))
                .map_err(|e| storage_error(slot, format!("{e:?}")))
        }

        fn write(&mut self, slot: &str, contents: &str) -> Result<(), PersistError> {
            let storage =
                get_storage().ok_or_else(|| storage_error(slot, "localStorage unavailable".into()))?;
            storage
                .set_item(&self.key(slot), contents)
                .map_err(|e| storage_error(slot, format!("{e:?}")))
        }
    }
}
