//! Lazy per-cell caches.
//!
//! A cell is tested for a cache only when it first enters the player's
//! neighborhood. A cache that exists is either generated from luck (first
//! visit) or restored from its memento (every later visit). Leaving the
//! neighborhood archives the cache back into the memento store.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use crate::coin::{Coin, CoinStack};
use crate::error::{GameError, Result};
use crate::grid::Cell;
use crate::luck::{self, Luck};
use crate::memento::MementoStore;

/// How an active cache got its coins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOrigin {
    Generated,
    Restored,
}

/// Lifecycle position of a cell's cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Never tested.
    Unknown,
    /// Tested, holds no cache. Re-testing always agrees.
    Absent,
    /// Instantiated and mutable.
    Active(CacheOrigin),
    /// Left behind; its coins live only in the memento store.
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Geocache {
    pub cell: Cell,
    pub origin: CacheOrigin,
    pub coins: CoinStack,
}

pub struct CacheManager<L: Luck> {
    luck: L,
    spawn_probability: f64,
    coin_scale: u32,
    active: BTreeMap<Cell, Geocache>,
    absent: HashSet<Cell>,
    mementos: MementoStore,
}

impl<L: Luck> CacheManager<L> {
    pub fn new(luck: L, spawn_probability: f64, coin_scale: u32, mementos: MementoStore) -> Self {
        Self {
            luck,
            spawn_probability,
            coin_scale,
            active: BTreeMap::new(),
            absent: HashSet::new(),
            mementos,
        }
    }

    /// Pure existence test for `cell`.
    pub fn exists_at(&self, cell: Cell) -> bool {
        self.luck.luck(&luck::existence_key(cell)) < self.spawn_probability
    }

    /// Coins a freshly generated cache in `cell` starts with.
    pub fn initial_coin_count(&self, cell: Cell) -> u32 {
        let roll = self.luck.luck(&luck::initial_value_key(cell));
        (roll * self.coin_scale as f64).floor() as u32
    }

    pub fn status(&self, cell: Cell) -> CacheStatus {
        if let Some(cache) = self.active.get(&cell) {
            CacheStatus::Active(cache.origin)
        } else if self.absent.contains(&cell) {
            CacheStatus::Absent
        } else if self.mementos.contains(cell) {
            CacheStatus::Archived
        } else {
            CacheStatus::Unknown
        }
    }

    /// Bring the cache for `cell` into memory, restoring or generating it.
    /// Returns `None` for cells that hold no cache.
    pub fn activate(&mut self, cell: Cell) -> Option<&Geocache> {
        self.activate_beside(cell, &CoinStack::new())
    }

    /// Like [`activate`](Self::activate), but restored coins that `inventory`
    /// already holds are dropped from the cache.
    pub fn activate_beside(&mut self, cell: Cell, inventory: &CoinStack) -> Option<&Geocache> {
        if !self.active.contains_key(&cell) {
            if !self.exists_at(cell) {
                self.absent.insert(cell);
                return None;
            }
            let cache = self.instantiate(cell, inventory);
            self.active.insert(cell, cache);
        }
        self.active.get(&cell)
    }

    fn instantiate(&self, cell: Cell, inventory: &CoinStack) -> Geocache {
        match self.mementos.restore(cell) {
            Ok(Some(coins)) => {
                let restored = coins.len();
                let coins: CoinStack = coins
                    .iter()
                    .copied()
                    .filter(|coin| !inventory.contains(coin))
                    .collect();
                if coins.len() < restored {
                    warn!(
                        "cache {} listed {} coins already in the inventory, dropped them",
                        cell,
                        restored - coins.len()
                    );
                }
                debug!("restored cache {} with {} coins", cell, coins.len());
                return Geocache { cell, origin: CacheOrigin::Restored, coins };
            }
            Ok(None) => {}
            Err(err) => warn!("discarding unreadable cache {}, regenerating: {}", cell, err),
        }
        let count = self.initial_coin_count(cell);
        debug!("generated cache {} with {} coins", cell, count);
        Geocache {
            cell,
            origin: CacheOrigin::Generated,
            coins: CoinStack::minted(cell, count),
        }
    }

    /// Save every active cache and drop it from memory. Returns the archived cells.
    /// Absent cells are forgotten too; re-testing them always agrees.
    pub fn archive_all(&mut self) -> Result<Vec<Cell>> {
        self.checkpoint_all()?;
        let cells: Vec<Cell> = self.active.keys().copied().collect();
        self.active.clear();
        self.absent.clear();
        Ok(cells)
    }

    /// Save every active cache, keeping it in memory.
    pub fn checkpoint_all(&mut self) -> Result<()> {
        for cache in self.active.values() {
            self.mementos.save(cache.cell, &cache.coins)?;
        }
        Ok(())
    }

    /// Move the top coin of `cell`'s cache into `inventory`.
    pub fn collect(&mut self, cell: Cell, inventory: &mut CoinStack) -> Result<Coin> {
        let cache = self
            .active
            .get_mut(&cell)
            .ok_or(GameError::NoCacheAt { cell })?;
        let coin = cache.coins.pop().ok_or(GameError::EmptyCache { cell })?;
        inventory.push(coin);
        Ok(coin)
    }

    /// Move `coin` out of `inventory` onto the top of `cell`'s cache.
    pub fn deposit(&mut self, cell: Cell, coin: Coin, inventory: &mut CoinStack) -> Result<()> {
        let cache = self
            .active
            .get_mut(&cell)
            .ok_or(GameError::NoCacheAt { cell })?;
        let coin = inventory.take(&coin).ok_or(GameError::InvalidCoin { coin })?;
        cache.coins.push(coin);
        Ok(())
    }

    pub fn cache(&self, cell: Cell) -> Option<&Geocache> {
        self.active.get(&cell)
    }

    /// Active caches in row-major cell order.
    pub fn active_caches(&self) -> impl Iterator<Item = &Geocache> {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn mementos(&self) -> &MementoStore {
        &self.mementos
    }

    /// Coins held by caches that are archived rather than active. Entries
    /// that cannot be read are logged and count as empty.
    pub fn archived_coin_count(&self) -> usize {
        let mut total = 0;
        for key in self.mementos.entries().keys() {
            let Some(cell) = Cell::parse_key(key) else {
                warn!("skipping memento under unreadable cell key [{}]", key);
                continue;
            };
            if self.active.contains_key(&cell) {
                continue;
            }
            match self.mementos.restore(cell) {
                Ok(Some(coins)) => total += coins.len(),
                Ok(None) => {}
                Err(err) => warn!("skipping unreadable cache {}: {}", cell, err),
            }
        }
        total
    }

    /// Forget every cache, active or archived.
    pub fn reset(&mut self) {
        self.active.clear();
        self.absent.clear();
        self.mementos.clear();
    }
}
