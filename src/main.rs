//! Valor Arena entry point
//!
//! On the web the page drives everything through `valor_arena::web`. Natively
//! this plays a headless two-player match between scripted fighters and logs
//! what happens.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use valor_arena::audio::LogAudio;
    use valor_arena::sim::{
        Button, Buttons, FighterKeys, GameEvent, Round, Side, StatPath, TickInput,
    };
    use valor_arena::{Ledger, Session, Tuning};

    const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Long enough for the clock, overtime and sudden death
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    /// Walk at the opponent and swing when close
    fn scripted_keys(round: &Round, side: Side, frame: u32) -> FighterKeys {
        let me = &round.fighter(side).body;
        let them = &round.fighter(side.other()).body;
        let dx = them.pos.x - me.pos.x;
        let mut held = Buttons::default();
        let mut pressed = Buttons::default();
        if dx.abs() > 40.0 {
            held.set(if dx > 0.0 { Button::Right } else { Button::Left }, true);
        } else if frame % 20 == 0 {
            held.set(Button::Attack, true);
            pressed.set(Button::Attack, true);
        }
        if them.pos.y < me.pos.y - 60.0 && me.grounded && frame % 45 == 0 {
            held.set(Button::Up, true);
            pressed.set(Button::Up, true);
        }
        FighterKeys { held, pressed }
    }

    pub fn run(seed: u64) {
        let mut ledger = Ledger::new(2);
        if ledger.set_stat_choice(2, StatPath::Endurance).is_err() {
            log::warn!("Player 2 missing from the ledger");
        }
        ledger.seed_first_round();
        let mut session = Session::new(ledger, Tuning::default(), seed);

        let mut round = match session.start_round() {
            Ok(round) => round,
            Err(e) => {
                log::error!("Could not start a round: {}", e);
                return;
            }
        };
        log::info!(
            "{} vs {} in {}",
            round.fighters[0].name,
            round.fighters[1].name,
            round.arena.variant.as_str()
        );

        let mut audio = LogAudio;
        for frame in 0..MAX_FRAMES {
            let input = TickInput {
                a: scripted_keys(&round, Side::A, frame),
                b: scripted_keys(&round, Side::B, frame),
            };
            let events = round.update(FRAME_MS, &input);
            events.forward_audio(&mut audio);
            for event in &events.events {
                match event {
                    GameEvent::ClockTick { .. } => log::debug!("{:?}", event),
                    _ => log::info!("{:?}", event),
                }
            }
            if round.is_resolved() {
                break;
            }
        }

        match session.finish_round(&round) {
            Ok(outcome) => log::info!(
                "{} wins by {:?} after {:.1}s",
                round.fighter(outcome.winner).name,
                outcome.cause,
                round.elapsed_ms / 1000.0
            ),
            Err(e) => log::warn!("Round did not finish: {}", e),
        }
        match session.ledger.to_json() {
            Ok(json) => log::info!("Ledger: {}", json),
            Err(e) => log::error!("Failed to encode ledger: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    valor_arena::platform::init_logging();
    log::info!("Valor Arena (native) starting...");
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is valor_arena::web::start
}
