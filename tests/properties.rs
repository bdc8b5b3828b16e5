// Property tests for the grid, memento and cache invariants.

use std::collections::HashSet;

use geocoin_carrier::{
    Board, CacheManager, Cell, Coin, CoinStack, LatLng, LuckFn, MementoStore, Sha256Luck,
};
use proptest::prelude::*;

/// Every cell holds a cache of five coins.
fn five_everywhere(key: &str) -> f64 {
    if key.ends_with("initialValue") { 0.05 } else { 0.0 }
}

fn coin_strategy() -> impl Strategy<Value = Coin> {
    (-2_000_000_i32..2_000_000, -2_000_000_i32..2_000_000, 0_u32..1_000)
        .prop_map(|(i, j, serial)| Coin::new(Cell { i, j }, serial))
}

proptest! {
    #[test]
    fn cells_are_canonical(lat in -90.0_f64..90.0, lng in -180.0_f64..180.0) {
        let mut board = Board::new(1e-4, 8);
        let a = board.cell_for_point(LatLng::new(lat, lng)).unwrap();
        let b = board.cell_for_point(LatLng::new(lat, lng)).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(board.known_cell_count(), 1);
        let keyed: HashSet<Cell> = [a, b].into_iter().collect();
        prop_assert_eq!(keyed.len(), 1);
    }

    #[test]
    fn point_lies_inside_its_cell(lat in -90.0_f64..90.0, lng in -180.0_f64..180.0) {
        // Power-of-two tile widths keep the division exact.
        let mut board = Board::new(0.25, 1);
        let point = LatLng::new(lat, lng);
        let cell = board.cell_for_point(point).unwrap();
        prop_assert!(board.cell_bounds(cell).contains(point));
    }

    #[test]
    fn neighborhood_is_complete(
        lat in -80.0_f64..80.0,
        lng in -170.0_f64..170.0,
        radius in -3_i32..12,
    ) {
        let mut board = Board::new(1e-4, 8);
        let point = LatLng::new(lat, lng);
        let origin = board.cell_for_point(point).unwrap();
        let cells = board.cells_near_point(point, radius);
        let expected = if radius <= 0 { 0 } else { (2 * radius * 2 * radius) as usize };
        prop_assert_eq!(cells.len(), expected);
        let unique: HashSet<&Cell> = cells.iter().collect();
        prop_assert_eq!(unique.len(), cells.len());
        for c in &cells {
            prop_assert!(c.i >= origin.i - radius && c.i < origin.i + radius);
            prop_assert!(c.j >= origin.j - radius && c.j < origin.j + radius);
        }
    }

    #[test]
    fn memento_round_trip(coins in prop::collection::vec(coin_strategy(), 0..40)) {
        let cell = Cell { i: 1, j: 1 };
        let mut seen = HashSet::new();
        let stack: CoinStack = coins.into_iter().filter(|c| seen.insert(*c)).collect();
        let mut store = MementoStore::new();
        store.save(cell, &stack).unwrap();
        prop_assert_eq!(store.restore(cell).unwrap(), Some(stack));
    }

    #[test]
    fn existence_and_seeding_are_pure(i in -1_000_000_i32..1_000_000, j in -1_000_000_i32..1_000_000) {
        let cell = Cell { i, j };
        let a = CacheManager::new(Sha256Luck, 0.1, 100, MementoStore::new());
        let b = CacheManager::new(Sha256Luck, 0.1, 100, MementoStore::new());
        prop_assert_eq!(a.exists_at(cell), b.exists_at(cell));
        prop_assert_eq!(a.initial_coin_count(cell), b.initial_coin_count(cell));
    }

    #[test]
    fn collect_and_deposit_conserve_coins(ops in prop::collection::vec((0_u8..3, 0_usize..64), 0..80)) {
        let cells = [Cell { i: 0, j: 0 }, Cell { i: 0, j: 1 }, Cell { i: 7, j: -3 }];
        let mut caches = CacheManager::new(
            LuckFn(five_everywhere as fn(&str) -> f64),
            0.1,
            100,
            MementoStore::new(),
        );
        for cell in cells {
            caches.activate(cell);
        }
        let mut inventory = CoinStack::new();
        let total = |caches: &CacheManager<_>, inventory: &CoinStack| {
            let active: usize = caches.active_caches().map(|c| c.coins.len()).sum();
            inventory.len() + active + caches.archived_coin_count()
        };
        prop_assert_eq!(total(&caches, &inventory), 15);

        for (op, n) in ops {
            let cell = cells[n % cells.len()];
            match op {
                0 => {
                    let _ = caches.collect(cell, &mut inventory);
                }
                1 => {
                    if !inventory.is_empty() {
                        let coin = inventory.as_slice()[n % inventory.len()];
                        caches.deposit(cell, coin, &mut inventory).unwrap();
                    }
                }
                _ => {
                    caches.archive_all().unwrap();
                    for cell in cells {
                        caches.activate(cell);
                    }
                }
            }
            prop_assert_eq!(total(&caches, &inventory), 15);
        }

        let mut seen = HashSet::new();
        for coin in inventory.iter().chain(caches.active_caches().flat_map(|c| c.coins.iter())) {
            prop_assert!(seen.insert(*coin), "coin {} held twice", coin);
        }
    }
}
