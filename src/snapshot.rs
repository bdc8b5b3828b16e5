//! Persisted snapshot: three independent storage keys, each holding a
//! versioned JSON envelope `{"version": 1, "data": ...}`.
//!
//! - `{prefix}caches`    cell key -> memento text
//! - `{prefix}inventory` `[i, j, serial]` triples, acquisition order
//! - `{prefix}player`    `{"lat": .., "lng": ..}`
//!
//! A key whose envelope cannot be read, or carries another version, is logged
//! and treated as missing. An inventory that lists a coin twice keeps only the
//! first copy.

use std::collections::{BTreeMap, HashSet};

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::coin::CoinStack;
use crate::error::Result;
use crate::grid::LatLng;
use crate::memento::{self, CoinRecord, MementoStore};
use crate::storage::KeyValueStore;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotKeys {
    pub caches: String,
    pub inventory: String,
    pub player: String,
}

impl SnapshotKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            caches: format!("{prefix}caches"),
            inventory: format!("{prefix}inventory"),
            player: format!("{prefix}player"),
        }
    }

    fn all(&self) -> [&str; 3] {
        [self.caches.as_str(), self.inventory.as_str(), self.player.as_str()]
    }
}

/// Everything a session needs to resume where the player left off.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistedSnapshot {
    pub mementos: MementoStore,
    pub inventory: CoinStack,
    pub player: Option<LatLng>,
}

fn read_envelope<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let envelope: Envelope<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("ignoring unreadable snapshot key [{}]: {}", key, err);
            return Ok(None);
        }
    };
    if envelope.version != SNAPSHOT_VERSION {
        warn!(
            "ignoring snapshot key [{}]: version {} (expected {})",
            key, envelope.version, SNAPSHOT_VERSION
        );
        return Ok(None);
    }
    match serde_json::from_value(envelope.data) {
        Ok(data) => Ok(Some(data)),
        Err(err) => {
            warn!("ignoring malformed snapshot key [{}]: {}", key, err);
            Ok(None)
        }
    }
}

fn write_envelope<T, S>(store: &mut S, key: &str, data: T) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore,
{
    let raw = serde_json::to_string(&Envelope {
        version: SNAPSHOT_VERSION,
        data,
    })?;
    store.set(key, &raw)
}

fn distinct_inventory(records: Vec<CoinRecord>) -> CoinStack {
    let listed = records.len();
    let mut seen = HashSet::with_capacity(listed);
    let inventory: CoinStack = memento::coins_from_records(records)
        .iter()
        .copied()
        .filter(|coin| seen.insert(*coin))
        .collect();
    if inventory.len() < listed {
        warn!(
            "saved inventory listed {} duplicate coins, keeping first copies",
            listed - inventory.len()
        );
    }
    inventory
}

pub fn load<S: KeyValueStore>(store: &S, keys: &SnapshotKeys) -> Result<PersistedSnapshot> {
    let mementos = read_envelope::<BTreeMap<String, String>, _>(store, &keys.caches)?
        .map(MementoStore::from_entries)
        .unwrap_or_default();
    let inventory = read_envelope::<Vec<CoinRecord>, _>(store, &keys.inventory)?
        .map(distinct_inventory)
        .unwrap_or_default();
    let player = read_envelope::<LatLng, _>(store, &keys.player)?;
    Ok(PersistedSnapshot {
        mementos,
        inventory,
        player,
    })
}

pub fn save_mementos<S: KeyValueStore>(
    store: &mut S,
    keys: &SnapshotKeys,
    mementos: &MementoStore,
) -> Result<()> {
    write_envelope(store, &keys.caches, mementos.entries())
}

pub fn save_inventory<S: KeyValueStore>(
    store: &mut S,
    keys: &SnapshotKeys,
    inventory: &CoinStack,
) -> Result<()> {
    write_envelope(store, &keys.inventory, memento::coin_records(inventory))
}

pub fn save_player<S: KeyValueStore>(
    store: &mut S,
    keys: &SnapshotKeys,
    position: LatLng,
) -> Result<()> {
    write_envelope(store, &keys.player, position)
}

/// Drop every snapshot key.
pub fn clear<S: KeyValueStore>(store: &mut S, keys: &SnapshotKeys) -> Result<()> {
    for key in keys.all() {
        store.remove(key)?;
    }
    Ok(())
}
