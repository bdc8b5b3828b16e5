//! The running game: one owner for the board, caches, inventory and player.
//!
//! Every player action is a synchronous reaction that leaves the session
//! consistent and checkpointed to storage before the next one is accepted.
//! Movement, whether from buttons or geolocation, goes through one queue and
//! always runs in the same order:
//!
//! 1. archive every active cache into the memento store
//! 2. clear them from the map
//! 3. compute the new neighborhood
//! 4. restore or generate each cache in it
//! 5. persist the player position

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::cache::{CacheManager, CacheStatus, Geocache};
use crate::coin::{Coin, CoinStack};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::events::GameEvent;
use crate::grid::{Board, Cell, CellBounds, Direction, LatLng};
use crate::luck::Luck;
use crate::snapshot::{self, SnapshotKeys};
use crate::storage::KeyValueStore;

/// Text the player must type, exactly, to wipe all progress.
pub const RESET_CONFIRMATION: &str = "yes";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Movement {
    /// One tile in a compass direction (movement buttons).
    Step(Direction),
    /// Jump to an absolute position (geolocation).
    Teleport(LatLng),
}

pub struct GameSession<S: KeyValueStore, L: Luck> {
    config: GameConfig,
    keys: SnapshotKeys,
    store: S,
    board: Board,
    caches: CacheManager<L>,
    inventory: CoinStack,
    player: LatLng,
    player_cell: Cell,
    trail: Vec<LatLng>,
    pending: VecDeque<Movement>,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore, L: Luck> GameSession<S, L> {
    /// Resume from whatever `store` holds (or start fresh at home) and build
    /// the first neighborhood.
    pub fn new(config: GameConfig, store: S, luck: L) -> Result<Self> {
        config.validate()?;
        let keys = SnapshotKeys::with_prefix(&config.storage_prefix);
        let saved = snapshot::load(&store, &keys)?;
        let mut board = Board::new(config.tile_width, config.visibility_radius);
        let home = home_cell(&mut board, &config)?;
        let (player, player_cell) = match saved.player {
            Some(position) => match board.cell_for_point(position) {
                Some(cell) => (position, cell),
                None => {
                    warn!("ignoring saved player position {:?} off the board", position);
                    (config.home, home)
                }
            },
            None => (config.home, home),
        };
        let caches = CacheManager::new(
            luck,
            config.spawn_probability,
            config.coin_scale,
            saved.mementos,
        );
        info!(
            "session starting at {} with {} coins in inventory",
            player_cell,
            saved.inventory.len()
        );

        let mut session = Self {
            config,
            keys,
            store,
            board,
            caches,
            inventory: saved.inventory,
            player,
            player_cell,
            trail: vec![player],
            pending: VecDeque::new(),
            events: Vec::new(),
        };
        session.push_player_event();
        session.rebuild_neighborhood()?;
        session.push_inventory_event();
        session.persist()?;
        Ok(session)
    }

    // --- Inbound UI triggers -------------------------------------------------

    pub fn move_player(&mut self, direction: Direction) -> Result<()> {
        self.queue_movement(Movement::Step(direction))
    }

    pub fn set_player_position(&mut self, position: LatLng) -> Result<()> {
        self.queue_movement(Movement::Teleport(position))
    }

    /// Queue a movement and drain the queue in arrival order. A failed
    /// movement drops whatever was still queued behind it.
    pub fn queue_movement(&mut self, movement: Movement) -> Result<()> {
        self.pending.push_back(movement);
        while let Some(next) = self.pending.pop_front() {
            if let Err(err) = self.apply_movement(next) {
                self.pending.clear();
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn collect_from_cache(&mut self, cell: Cell) -> Result<Coin> {
        let coin = self.caches.collect(cell, &mut self.inventory)?;
        debug!("collected {} from {}", coin, cell);
        self.push_cache_event(cell);
        self.push_inventory_event();
        self.persist()?;
        Ok(coin)
    }

    pub fn deposit_to_cache(&mut self, cell: Cell, coin: Coin) -> Result<()> {
        self.caches.deposit(cell, coin, &mut self.inventory)?;
        debug!("deposited {} into {}", coin, cell);
        self.push_cache_event(cell);
        self.push_inventory_event();
        self.persist()
    }

    /// Wipe every cache, the inventory and the saved snapshot, then start over
    /// at home. Anything but the exact confirmation text changes nothing.
    pub fn reset_game(&mut self, confirmation: &str) -> Result<()> {
        if confirmation != RESET_CONFIRMATION {
            return Err(GameError::MalformedConfirmation);
        }
        info!("resetting game");
        self.caches.reset();
        self.inventory.clear();
        self.pending.clear();
        snapshot::clear(&mut self.store, &self.keys)?;

        self.board.forget_cells();
        self.player = self.config.home;
        self.player_cell = home_cell(&mut self.board, &self.config)?;
        self.trail = vec![self.player];
        self.events.push(GameEvent::CachesCleared);
        self.push_player_event();
        self.rebuild_neighborhood()?;
        self.push_inventory_event();
        self.persist()
    }

    // --- Movement ------------------------------------------------------------

    fn apply_movement(&mut self, movement: Movement) -> Result<()> {
        let target = match movement {
            Movement::Step(direction) => self.board.step(self.player, direction),
            Movement::Teleport(position) => position,
        };
        let Some(cell) = self.board.cell_for_point(target) else {
            warn!("ignoring movement to {:?}, off the board", target);
            return Ok(());
        };
        let crossed = cell != self.player_cell;
        self.player = target;
        self.player_cell = cell;
        self.trail.push(target);
        self.push_player_event();
        if crossed {
            self.rebuild_neighborhood()?;
        }
        self.persist()
    }

    fn rebuild_neighborhood(&mut self) -> Result<()> {
        let archived = self.caches.archive_all()?;
        if !archived.is_empty() {
            self.events.push(GameEvent::CachesCleared);
        }
        self.board.forget_cells();
        let cells = self.board.visible_cells(self.player);
        for cell in cells {
            if let Some(cache) = self.caches.activate_beside(cell, &self.inventory) {
                self.events.push(GameEvent::CacheStateChanged {
                    cell,
                    bounds: self.board.cell_bounds(cell),
                    coins: cache.coins.as_slice().to_vec(),
                });
            }
        }
        debug!(
            "neighborhood around {}: archived {}, active {}",
            self.player_cell,
            archived.len(),
            self.caches.active_count()
        );
        Ok(())
    }

    // --- Persistence & events ------------------------------------------------

    fn persist(&mut self) -> Result<()> {
        self.caches.checkpoint_all()?;
        snapshot::save_mementos(&mut self.store, &self.keys, self.caches.mementos())?;
        snapshot::save_inventory(&mut self.store, &self.keys, &self.inventory)?;
        snapshot::save_player(&mut self.store, &self.keys, self.player)
    }

    fn push_player_event(&mut self) {
        self.events.push(GameEvent::PlayerMoved {
            position: self.player,
            cell: self.player_cell,
        });
    }

    fn push_cache_event(&mut self, cell: Cell) {
        if let Some(cache) = self.caches.cache(cell) {
            self.events.push(GameEvent::CacheStateChanged {
                cell,
                bounds: self.board.cell_bounds(cell),
                coins: cache.coins.as_slice().to_vec(),
            });
        }
    }

    fn push_inventory_event(&mut self) {
        self.events.push(GameEvent::InventoryChanged {
            coins: self.inventory.as_slice().to_vec(),
        });
    }

    /// Take every event produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Queries -------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_position(&self) -> LatLng {
        self.player
    }

    pub fn player_cell(&self) -> Cell {
        self.player_cell
    }

    pub fn inventory(&self) -> &CoinStack {
        &self.inventory
    }

    pub fn cache_at(&self, cell: Cell) -> Option<&Geocache> {
        self.caches.cache(cell)
    }

    pub fn cache_status(&self, cell: Cell) -> CacheStatus {
        self.caches.status(cell)
    }

    pub fn active_caches(&self) -> impl Iterator<Item = &Geocache> {
        self.caches.active_caches()
    }

    pub fn cell_bounds(&self, cell: Cell) -> CellBounds {
        self.board.cell_bounds(cell)
    }

    /// Every position the player has stood on since start or the last reset.
    pub fn trail(&self) -> &[LatLng] {
        &self.trail
    }

    /// Coins in the inventory, active caches and archived caches combined.
    pub fn total_coins(&self) -> usize {
        let active: usize = self.caches.active_caches().map(|c| c.coins.len()).sum();
        self.inventory.len() + active + self.caches.archived_coin_count()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// End the session, handing back the storage it was writing to.
    pub fn into_store(self) -> S {
        self.store
    }
}

fn home_cell(board: &mut Board, config: &GameConfig) -> Result<Cell> {
    board.cell_for_point(config.home).ok_or_else(|| {
        GameError::InvalidConfig(format!("home {:?} lies off the board", config.home))
    })
}
