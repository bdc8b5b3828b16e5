// Browser-only checks for the localStorage backend.
// Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use geocoin_carrier::{BrowserStore, Game, KeyValueStore};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let mut store = BrowserStore::local().expect("localStorage available");
    store.set("geocoin.test", "value").unwrap();
    assert_eq!(store.get("geocoin.test").unwrap().as_deref(), Some("value"));
    store.remove("geocoin.test").unwrap();
    assert_eq!(store.get("geocoin.test").unwrap(), None);
}

#[wasm_bindgen_test]
fn game_starts_and_resets() {
    let mut game = Game::new(Some(r#"{"storagePrefix": "geocoin.browsertest."}"#.into()))
        .expect("game starts");
    let events = game.drain_events().unwrap();
    assert!(events.contains("playerMoved"));
    assert!(!game.reset_game("nope").unwrap());
    game.move_player("north").unwrap();
    assert!(game.reset_game("yes").unwrap());
    assert!(game.move_player("sideways").is_err());
}
