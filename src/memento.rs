//! Serialized cache contents, keyed by cell.
//!
//! A memento is the JSON text of the cache's coins, bottom to top, as
//! `[i, j, serial]` triples, e.g. `[[5,5,0],[5,5,2],[1,-4,7]]`. Restoring
//! one never consults luck, so the coins come back exactly as they were left.

use std::collections::{BTreeMap, HashSet};

use crate::coin::{Coin, CoinStack};
use crate::error::{GameError, Result};
use crate::grid::Cell;

pub(crate) type CoinRecord = (i32, i32, u32);

pub(crate) fn coin_records(coins: &CoinStack) -> Vec<CoinRecord> {
    coins
        .iter()
        .map(|c| (c.origin.i, c.origin.j, c.serial))
        .collect()
}

pub(crate) fn coins_from_records(records: Vec<CoinRecord>) -> CoinStack {
    records
        .into_iter()
        .map(|(i, j, serial)| Coin::new(Cell { i, j }, serial))
        .collect()
}

/// Encode coins into the memento text format.
pub fn encode_coins(coins: &CoinStack) -> Result<String> {
    Ok(serde_json::to_string(&coin_records(coins))?)
}

/// Decode memento text. `key` only labels the error. A coin listed twice
/// makes the whole memento corrupt.
pub fn decode_coins(key: &str, raw: &str) -> Result<CoinStack> {
    let corrupt = |reason: String| GameError::CorruptMemento {
        key: key.to_string(),
        reason,
    };
    let records: Vec<CoinRecord> = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    let coins = coins_from_records(records);
    let mut seen = HashSet::with_capacity(coins.len());
    if let Some(dup) = coins.iter().find(|coin| !seen.insert(**coin)) {
        return Err(corrupt(format!("coin {} listed twice", dup)));
    }
    Ok(coins)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MementoStore {
    entries: BTreeMap<String, String>,
}

impl MementoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from previously exported `(cell key, memento)` pairs.
    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Overwrites whatever was stored for `cell` with its current coins.
    pub fn save(&mut self, cell: Cell, coins: &CoinStack) -> Result<()> {
        let encoded = encode_coins(coins)?;
        self.entries.insert(cell.key(), encoded);
        Ok(())
    }

    pub fn load(&self, cell: Cell) -> Option<&str> {
        self.entries.get(&cell.key()).map(String::as_str)
    }

    /// Decoded coins for `cell`, `None` if it was never saved.
    pub fn restore(&self, cell: Cell) -> Result<Option<CoinStack>> {
        let key = cell.key();
        match self.entries.get(&key) {
            Some(raw) => decode_coins(&key, raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.entries.contains_key(&cell.key())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}
