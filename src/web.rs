//! JavaScript-facing game handle. The page owns the map, markers and buttons;
//! it forwards user input here and redraws from the JSON events it drains.

use log::warn;
use wasm_bindgen::prelude::*;

use crate::coin::Coin;
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::grid::{Cell, Direction, LatLng};
use crate::luck::Sha256Luck;
use crate::session::GameSession;
use crate::storage::BrowserStore;

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Collapse the user-visible no-op errors into `false`; anything else is a real failure.
fn inert<T>(result: Result<T>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(
            err @ (GameError::EmptyCache { .. }
            | GameError::InvalidCoin { .. }
            | GameError::NoCacheAt { .. }
            | GameError::MalformedConfirmation),
        ) => {
            warn!("{}", err);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

#[wasm_bindgen]
pub struct Game {
    session: GameSession<BrowserStore, Sha256Luck>,
}

#[wasm_bindgen]
impl Game {
    /// `config_json` may be omitted, or any subset of the `GameConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> std::result::Result<Game, JsValue> {
        let config = match config_json {
            Some(raw) => GameConfig::from_json(&raw)?,
            None => GameConfig::default(),
        };
        let store = BrowserStore::local()?;
        let session = GameSession::new(config, store, Sha256Luck)?;
        Ok(Game { session })
    }

    /// `direction` is one of north / south / east / west.
    pub fn move_player(&mut self, direction: &str) -> std::result::Result<(), JsValue> {
        let direction: Direction = direction.parse()?;
        Ok(self.session.move_player(direction)?)
    }

    pub fn set_player_position(&mut self, lat: f64, lng: f64) -> std::result::Result<(), JsValue> {
        Ok(self.session.set_player_position(LatLng::new(lat, lng))?)
    }

    /// `false` when the cache is empty or no longer on the map.
    pub fn collect_from_cache(&mut self, i: i32, j: i32) -> std::result::Result<bool, JsValue> {
        Ok(inert(self.session.collect_from_cache(Cell { i, j }))?)
    }

    /// `false` when the coin is not in the inventory or the cache is gone.
    pub fn deposit_to_cache(
        &mut self,
        i: i32,
        j: i32,
        origin_i: i32,
        origin_j: i32,
        serial: u32,
    ) -> std::result::Result<bool, JsValue> {
        let coin = Coin::new(Cell { i: origin_i, j: origin_j }, serial);
        Ok(inert(self.session.deposit_to_cache(Cell { i, j }, coin))?)
    }

    /// `false` (and nothing changes) unless `confirmation` is exactly "yes".
    pub fn reset_game(&mut self, confirmation: &str) -> std::result::Result<bool, JsValue> {
        Ok(inert(self.session.reset_game(confirmation))?)
    }

    /// Pending events as a JSON array, oldest first.
    pub fn drain_events(&mut self) -> std::result::Result<String, JsValue> {
        let events = self.session.drain_events();
        Ok(serde_json::to_string(&events).map_err(GameError::from)?)
    }

    pub fn inventory_json(&self) -> std::result::Result<String, JsValue> {
        Ok(serde_json::to_string(self.session.inventory().as_slice()).map_err(GameError::from)?)
    }

    pub fn player_json(&self) -> std::result::Result<String, JsValue> {
        Ok(serde_json::to_string(&self.session.player_position()).map_err(GameError::from)?)
    }

    /// Positions visited since start or the last reset, for the movement polyline.
    pub fn trail_json(&self) -> std::result::Result<String, JsValue> {
        Ok(serde_json::to_string(self.session.trail()).map_err(GameError::from)?)
    }
}
