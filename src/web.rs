//! Browser bindings
//!
//! The page owns rendering, menus and the animation-frame loop. It forwards
//! keyboard events here, steps the round once per frame, and reads back JSON
//! events and snapshots.

use wasm_bindgen::prelude::*;
use web_sys::KeyboardEvent;

use crate::audio::LogAudio;
use crate::ledger::Ledger;
use crate::platform::{self, FrameClock};
use crate::session::Session;
use crate::sim::{KeyBindings, KeyTracker, Round};
use crate::tuning::Tuning;

const EMPTY_FRAME: &str = r#"{"events":[],"audio":[]}"#;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    platform::init_logging();
    log::info!("Valor Arena core loaded");
}

/// Fresh tournament seed for pages that don't replay a fixed one
#[wasm_bindgen(js_name = randomSeed)]
pub fn random_seed() -> u64 {
    let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let lo = js_sys::Date::now() as u64 & 0xffff_ffff;
    (hi << 32) | lo
}

/// One tournament driven from the page
#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    round: Option<Round>,
    keys: KeyTracker,
    clock: FrameClock,
    audio: LogAudio,
}

#[wasm_bindgen]
impl WebGame {
    /// Fresh tournament; the ledger JSON comes from the menu screen
    #[wasm_bindgen(constructor)]
    pub fn new(ledger_json: &str, seed: u64) -> Result<WebGame, JsValue> {
        let mut ledger = Ledger::from_json(ledger_json).map_err(js_error)?;
        if ledger.bracket.is_empty() {
            ledger.seed_first_round();
        }
        Ok(Self {
            session: Session::new(ledger, Tuning::default(), seed),
            round: None,
            keys: KeyTracker::new(KeyBindings::default()),
            clock: FrameClock::new(),
            audio: LogAudio,
        })
    }

    /// Start the current match. An empty arena name picks one at random.
    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(&mut self, arena: &str) -> Result<(), JsValue> {
        let round = if arena.is_empty() {
            self.session.start_round()
        } else {
            self.session.start_round_in(arena)
        }
        .map_err(js_error)?;
        log::info!(
            "{} vs {} in {}",
            round.fighters[0].name,
            round.fighters[1].name,
            round.arena.variant.as_str()
        );
        self.round = Some(round);
        self.clock.reset();
        Ok(())
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, event: &KeyboardEvent) {
        if self.keys.key_down(&event.code()) {
            event.prevent_default();
        }
    }

    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, event: &KeyboardEvent) {
        if self.keys.key_up(&event.code()) {
            event.prevent_default();
        }
    }

    /// Step the round to `timestamp` (ms).
    ///
    /// Returns `{"events": [...], "audio": [...]}`. Each audio entry is keyed by
    /// the sink call to make: `playCue`, `playLoop` or `stopLoop`.
    pub fn frame(&mut self, timestamp: f64) -> String {
        let input = self.keys.take_frame();
        let dt = self.clock.delta(timestamp);
        let Some(round) = self.round.as_mut() else {
            return EMPTY_FRAME.to_string();
        };
        let frame = round.update(dt, &input);
        frame.forward_audio(&mut self.audio);
        frame.to_json().unwrap_or_else(|e| {
            log::error!("Failed to encode frame: {}", e);
            EMPTY_FRAME.to_string()
        })
    }

    /// HUD view of the running round as JSON
    pub fn snapshot(&self) -> Option<String> {
        let round = self.round.as_ref()?;
        serde_json::to_string(&round.snapshot())
            .map_err(|e| log::error!("Failed to encode snapshot: {}", e))
            .ok()
    }

    /// Write the finished round into the ledger and return the ledger JSON
    #[wasm_bindgen(js_name = finishRound)]
    pub fn finish_round(&mut self) -> Result<String, JsValue> {
        let round = self
            .round
            .as_ref()
            .ok_or_else(|| JsValue::from_str("no round in progress"))?;
        self.session.finish_round(round).map_err(js_error)?;
        self.round = None;
        self.session.ledger.to_json().map_err(js_error)
    }

    /// Page lost focus: drop held keys and restart frame timing
    pub fn blur(&mut self) {
        self.keys = KeyTracker::new(KeyBindings::default());
        self.clock.reset();
    }
}
