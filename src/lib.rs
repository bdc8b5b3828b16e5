//! Geocoin Carrier core crate.
//!
//! The world is an infinite grid of small lat/lng tiles. Some tiles hold a
//! cache of coins; which ones, and how many coins they start with, is a pure
//! function of the tile coordinates. Caches come into being lazily as the
//! player walks near them, are archived to mementos when left behind, and are
//! restored verbatim on return, surviving page reloads via `localStorage`.
//!
//! Map rendering, popups and geolocation wiring live on the JS side; they talk
//! to the [`Game`] handle exported here.

use wasm_bindgen::prelude::*;

pub mod cache;
pub mod coin;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod logging;
pub mod luck;
pub mod memento;
pub mod session;
pub mod snapshot;
pub mod storage;
mod web;

pub use cache::{CacheManager, CacheOrigin, CacheStatus, Geocache};
pub use coin::{Coin, CoinStack};
pub use config::GameConfig;
pub use error::{GameError, Result};
pub use events::GameEvent;
pub use grid::{Board, Cell, CellBounds, Direction, LatLng};
pub use luck::{Luck, LuckFn, Sha256Luck};
pub use memento::MementoStore;
pub use session::{GameSession, Movement, RESET_CONFIRMATION};
pub use storage::{BrowserStore, KeyValueStore, MemoryStore};
pub use web::Game;

pub const APP_NAME: &str = "Geocoin Carrier";

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
    log::info!("{} loaded", APP_NAME);
}
