//! Fixed gameplay constants, overridable from the host page as a JSON object.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::grid::LatLng;

/// Oakes College classroom, the default place a fresh player starts.
pub const HOME_POSITION: LatLng = LatLng {
    lat: 36.98949379578401,
    lng: -122.06277128548504,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Edge length of one cell, in degrees.
    pub tile_width: f64,
    /// Cells are visible within this many tiles of the player, in each axis.
    pub visibility_radius: i32,
    /// Chance that any given cell holds a cache.
    pub spawn_probability: f64,
    /// Initial coin count is `floor(luck * coin_scale)`.
    pub coin_scale: u32,
    pub home: LatLng,
    /// Prepended to every persisted storage key.
    pub storage_prefix: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_width: 1e-4,
            visibility_radius: 8,
            spawn_probability: 0.1,
            coin_scale: 100,
            home: HOME_POSITION,
            storage_prefix: "geocoin.".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override. Empty input yields the defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GameConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tile_width.is_finite() || self.tile_width <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "tileWidth must be a positive number, got {}",
                self.tile_width
            )));
        }
        if self.visibility_radius < 0 {
            return Err(GameError::InvalidConfig(format!(
                "visibilityRadius must not be negative, got {}",
                self.visibility_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(GameError::InvalidConfig(format!(
                "spawnProbability must lie in [0, 1], got {}",
                self.spawn_probability
            )));
        }
        if !self.home.lat.is_finite() || !self.home.lng.is_finite() {
            return Err(GameError::InvalidConfig("home must be a finite coordinate".into()));
        }
        if self.storage_prefix.is_empty() {
            return Err(GameError::InvalidConfig("storagePrefix must not be empty".into()));
        }
        Ok(())
    }
}
