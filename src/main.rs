//! Crab Strike headless demo
//!
//! Runs a scripted session of each game mode at a fixed 60 Hz timestep and
//! logs the flow. Useful for eyeballing the orchestration without a
//! frontend; pass a seed as the first argument to vary the waves.

use crab_strike::consts::SIM_DT;
use crab_strike::services::{MemoryStore, NullAudio};
use crab_strike::sim::{GameMode, GameSession, SessionServices, SessionState, ShipInput};
use crab_strike::tables::StaticTables;

/// Scripted input: sweep back and forth with the trigger held, and ask for
/// the beam whenever the gauge might be ready.
fn scripted_input(tick: u32) -> ShipInput {
    let phase = (tick / 240) % 2;
    ShipInput {
        turn: if phase == 0 { 1.0 } else { -1.0 },
        aim: 0.0,
        fire: true,
        beam: tick % 600 == 0,
    }
}

fn run_mode(mode: GameMode, level: u32, seed: u64) {
    let services = SessionServices {
        data: Box::new(StaticTables::demo()),
        audio: Box::new(NullAudio),
        store: Box::new(MemoryStore::new()),
    };
    let mut session = GameSession::new(mode, level, services, seed);

    // Cap at five minutes of simulated time
    let mut tick = 0u32;
    while !session.is_finished() && tick < 5 * 60 * 60 {
        session.tick(scripted_input(tick), SIM_DT);
        tick += 1;
    }

    match session.state() {
        SessionState::Clear => {
            let result = session.result().expect("clear state has results");
            log::info!(
                "{mode:?} finished: score {:.0} ({} perfect / {} great / {} good) in {:.1}s",
                result.final_score,
                result.perfect_count,
                result.great_count,
                result.good_count,
                result.elapsed,
            );
        }
        SessionState::GameOver => {
            log::info!(
                "{mode:?} game over with {} broken",
                session.score_board().break_count()
            );
        }
        state => log::warn!("{mode:?} still in {state:?} at the time cap"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xC4AB);

    run_mode(GameMode::Normal, 1, seed);
    run_mode(GameMode::Endless, 0, seed);
}
