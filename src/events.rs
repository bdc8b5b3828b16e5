use serde::Serialize;

use crate::coin::Coin;
use crate::grid::{Cell, CellBounds, LatLng};

/// Outbound notifications for the presentation layer. Each carries the data
/// to redraw from, so the UI never holds on to a cache by reference.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    PlayerMoved {
        position: LatLng,
        cell: Cell,
    },
    #[serde(rename_all = "camelCase")]
    CacheStateChanged {
        cell: Cell,
        bounds: CellBounds,
        coins: Vec<Coin>,
    },
    InventoryChanged {
        coins: Vec<Coin>,
    },
    /// Every cache from the previous neighborhood is gone from the map.
    CachesCleared,
}
