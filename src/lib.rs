pub mod ai;
pub mod config;
pub mod engine;
pub mod game;
pub mod utils;

use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiAgent, AiController, AiDecision, AiError, GameAction};
pub use config::{AiConfig, MatchConfig};
pub use engine::MatchEngine;
pub use game::{
    compute_power, power_bonus, Card, CardId, DuelOutcome, EffectTag, FieldView, GoalReason,
    GoalRecord, InstanceId, IntegrityError, LogEntry, MatchEvent, MatchState, Phase, Position,
    PowerBonus, Role, RuleEngine, RuleError, RuleResolution, Side, Winner,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_console_logger(log::LevelFilter::Info);
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_side(value: &str) -> Result<Side, JsValue> {
    Side::from_str(value).map_err(|_| JsValue::from_str(&format!("unknown side: {value}")))
}

fn parse_ai_config(json: Option<String>) -> Result<AiConfig, JsValue> {
    json.as_deref()
        .map(AiConfig::from_json)
        .transpose()
        .map_err(serde_to_js_error)
        .map(Option::unwrap_or_default)
}

#[derive(Serialize)]
struct ActionResponse<'a> {
    #[serde(flatten)]
    resolution: &'a RuleResolution,
    state: &'a MatchState,
}

#[derive(Serialize)]
struct PowerResponse {
    total: u8,
    #[serde(flatten)]
    bonus: PowerBonus,
}

#[derive(Serialize)]
struct AiMoveResponse<'a> {
    decision: &'a AiDecision,
    #[serde(flatten)]
    applied: ActionResponse<'a>,
}

/// JS handle on one match session. Every mutating method answers with the
/// resolution and the snapshot it produced, as JSON.
#[wasm_bindgen(js_name = "MatchEngine")]
pub struct MatchHandle {
    engine: MatchEngine,
    ai: AiConfig,
}

impl MatchHandle {
    fn respond(&self, resolution: &RuleResolution) -> Result<String, JsValue> {
        let state = self.engine.snapshot();
        serde_json::to_string(&ActionResponse {
            resolution,
            state: &state,
        })
        .map_err(serde_to_js_error)
    }
}

#[wasm_bindgen(js_class = "MatchEngine")]
impl MatchHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        ai_config_json: Option<String>,
    ) -> Result<MatchHandle, JsValue> {
        let config = config_json
            .as_deref()
            .map(MatchConfig::from_json)
            .transpose()
            .map_err(serde_to_js_error)?
            .unwrap_or_default();
        Ok(MatchHandle {
            engine: MatchEngine::new(config),
            ai: parse_ai_config(ai_config_json)?,
        })
    }

    #[wasm_bindgen(js_name = "initMatch")]
    pub fn init_match(
        &mut self,
        opponent_deck_json: &str,
        player_deck_json: Option<String>,
        player_name: Option<String>,
        opponent_name: Option<String>,
    ) -> Result<String, JsValue> {
        let opponent_deck: Vec<Card> =
            serde_json::from_str(opponent_deck_json).map_err(serde_to_js_error)?;
        let player_deck: Option<Vec<Card>> = player_deck_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(serde_to_js_error)?;
        let resolution = self.engine.init_match(
            opponent_deck,
            player_deck,
            player_name.as_deref().unwrap_or("Player"),
            opponent_name.as_deref().unwrap_or("Opponent"),
        );
        if let Some(error) = &resolution.rejected {
            return Err(to_js_error(error.clone()));
        }
        self.respond(&resolution)
    }

    #[wasm_bindgen(js_name = "playCard")]
    pub fn play_card(&mut self, hand_index: usize, side: &str) -> Result<String, JsValue> {
        let side = parse_side(side)?;
        let resolution = self.engine.play_card(hand_index, side);
        self.respond(&resolution)
    }

    #[wasm_bindgen(js_name = "declareAttack")]
    pub fn declare_attack(
        &mut self,
        instance_id: InstanceId,
        side: &str,
    ) -> Result<String, JsValue> {
        let side = parse_side(side)?;
        let resolution = self.engine.declare_attack(instance_id, side);
        self.respond(&resolution)
    }

    #[wasm_bindgen(js_name = "chooseBlocker")]
    pub fn choose_blocker(
        &mut self,
        instance_id: InstanceId,
        boost_instance_id: Option<InstanceId>,
    ) -> Result<String, JsValue> {
        let resolution = self.engine.choose_blocker(instance_id, boost_instance_id);
        self.respond(&resolution)
    }

    pub fn pass(&mut self, side: &str) -> Result<String, JsValue> {
        let side = parse_side(side)?;
        let resolution = self.engine.pass(side);
        self.respond(&resolution)
    }

    #[wasm_bindgen(js_name = "resumeGame")]
    pub fn resume_game(&mut self) -> Result<String, JsValue> {
        let resolution = self.engine.resume_game();
        self.respond(&resolution)
    }

    #[wasm_bindgen(js_name = "forceEnd")]
    pub fn force_end(&mut self) -> Result<String, JsValue> {
        let resolution = self.engine.force_end();
        self.respond(&resolution)
    }

    #[wasm_bindgen(js_name = "stateJson")]
    pub fn state_json(&self) -> Result<String, JsValue> {
        self.engine.snapshot_json().map_err(serde_to_js_error)
    }

    #[wasm_bindgen(js_name = "setStateJson")]
    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.engine.restore_json(json).map_err(serde_to_js_error)
    }

    /// Decides for `side` and applies the decision immediately.
    #[wasm_bindgen(js_name = "applyAiMove")]
    pub fn apply_ai_move(&mut self, side: &str) -> Result<String, JsValue> {
        let side = parse_side(side)?;
        let decision = AiAgent::new(self.ai.clone()).decide(&self.engine.snapshot(), side);
        let resolution = self.engine.apply_decision(&decision);
        let state = self.engine.snapshot();
        let response = AiMoveResponse {
            decision: &decision,
            applied: ActionResponse {
                resolution: &resolution,
                state: &state,
            },
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// Decides for `side` after the debounce delay without touching the
    /// match; the caller applies the result once it is still relevant.
    #[wasm_bindgen(js_name = "thinkAi")]
    pub fn think_ai(&self, side: &str, delay_ms: Option<u32>) -> Result<Promise, JsValue> {
        let side = parse_side(side)?;
        let state = self.engine.snapshot();
        let agent = AiAgent::new(self.ai.clone());
        let delay = delay_ms
            .unwrap_or_else(|| u32::try_from(self.ai.debounce_ms).unwrap_or(u32::MAX));

        Ok(future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let decision = agent.decide(&state, side);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        }))
    }
}

/// Total strength of `card` in `role` given both fields, with the bonus
/// breakdown the UI shows next to it.
#[wasm_bindgen(js_name = "computePower")]
pub fn compute_power_js(
    card: JsValue,
    role: &str,
    own_field: JsValue,
    opposing_field: JsValue,
) -> Result<JsValue, JsValue> {
    let card: Card = from_value(card).map_err(JsValue::from)?;
    let role = Role::from_str(role)
        .map_err(|_| JsValue::from_str(&format!("unknown role: {role}")))?;
    let own: Vec<Option<Card>> = from_value(own_field).map_err(JsValue::from)?;
    let opposing: Vec<Option<Card>> = from_value(opposing_field).map_err(JsValue::from)?;
    let view = FieldView::new(&own, &opposing);
    let response = PowerResponse {
        total: compute_power(&card, role, &view),
        bonus: power_bonus(&card, role, &view),
    };
    to_value(&response).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    state: JsValue,
    side: &str,
    ai_config_json: Option<String>,
) -> Result<JsValue, JsValue> {
    let state: MatchState = from_value(state).map_err(JsValue::from)?;
    let side = parse_side(side)?;
    let config = parse_ai_config(ai_config_json)?;
    let decision = ai::decide(&state, side, &config);
    to_value(&decision).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: MatchState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))
}
