//! Browser-side checks of the JSON facade. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use pitch_duel::game::catalog;
use pitch_duel::MatchHandle;

wasm_bindgen_test_configure!(run_in_browser);

fn deck_json() -> String {
    let cards: Vec<_> = catalog::pool().into_iter().chain(catalog::pool()).collect();
    serde_json::to_string(&cards).expect("catalog serializes")
}

#[wasm_bindgen_test]
fn facade_plays_a_card_and_lets_the_ai_answer() {
    let mut handle = MatchHandle::new(None, None).expect("default config");
    let started = handle
        .init_match(&deck_json(), Some(deck_json()), Some("Home".into()), None)
        .expect("match starts");
    assert!(started.contains("\"turn\":\"player\""));

    let played = handle.play_card(0, "player").expect("valid side");
    assert!(!played.contains("\"rejected\""));

    let answer = handle.apply_ai_move("opponent").expect("valid side");
    assert!(answer.contains("\"decision\""));
}

#[wasm_bindgen_test]
fn unknown_side_is_reported_to_js() {
    let mut handle = MatchHandle::new(None, None).expect("default config");
    assert!(handle.pass("referee").is_err());
}
