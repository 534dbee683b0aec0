//! Octa Runner entry point
//!
//! Runs a headless session: an autopilot plays through the generated track
//! while events feed the HUD model and audio cues.
//!
//! Usage: `octa-runner [settings.json] [seconds]`

use octa_runner::audio::{AudioManager, LogAudio};
use octa_runner::consts::SIM_DT;
use octa_runner::persistence::JsonFileStore;
use octa_runner::platform::{DemoPlayer, FixedStep, JumpDirection, Player};
use octa_runner::sim::{GameEvent, GameLoop, GamePhase, PlatformSpawner, SeededRandom, TickInput};
use octa_runner::ui::Hud;
use octa_runner::Settings;

/// Flight time of a demo jump (2 * impulse / gravity)
const FLIGHT_SECS: f32 = 0.816;

/// Session counters for the final summary
#[derive(Debug, Default)]
struct Summary {
    runs: u32,
    deaths: u32,
    best_run: u32,
    announced: u32,
    branches: u32,
    collapses: u32,
}

/// Pick a jump toward the next platform on the current or a neighbouring ring
fn autopilot(player: &DemoPlayer, spawner: &PlatformSpawner) -> Option<JumpDirection> {
    if !player.is_grounded() {
        return None;
    }
    let z = player.forward_position();
    let ring = player.ring();
    let current = spawner.platform_under(z, ring)?;
    let current_end = current.z + current.scale * 0.5;

    let target = spawner
        .iter()
        .filter(|p| p.z - p.scale * 0.5 > current_end)
        .filter(|p| p.position.distance(ring) <= 1)
        .min_by(|a, b| a.z.total_cmp(&b.z))?;

    let reach = target.speed * FLIGHT_SECS;
    let leaving = current_end - z < target.speed * SIM_DT * 2.0;
    if target.z - z <= reach || leaving {
        JumpDirection::between(ring, target.position)
    } else {
        None
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let settings = args
        .get(1)
        .map(|path| Settings::load_from(path))
        .unwrap_or_default();
    let seconds: f32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(120.0);

    log::info!("Octa Runner (headless) starting, seed {}", settings.seed);

    let store = JsonFileStore::new(std::env::temp_dir().join("octa-runner-best.json"));
    let player = DemoPlayer::new(settings.player_z, settings.starting_ring_position);
    let mut game = GameLoop::new(&settings, SeededRandom::new(settings.seed), player, store);
    let mut hud = Hud::new();
    let mut audio = AudioManager::new(LogAudio);
    let mut fixed = FixedStep::new();
    let mut summary = Summary::default();

    // Uneven frame pacing exercises the fixed-step accumulator
    let frame_times = [1.0 / 50.0, 1.0 / 75.0, 1.0 / 60.0];
    let mut elapsed = 0.0;
    let mut frame = 0usize;
    let mut ticks = 0u64;

    while elapsed < seconds {
        let frame_dt = frame_times[frame % frame_times.len()];
        frame += 1;
        elapsed += frame_dt;

        for _ in 0..fixed.advance(frame_dt) {
            ticks += 1;
            let mut input = TickInput::default();

            // Background the session once to exercise the countdown resume
            if ticks == 20 * 60 {
                input.focus = Some(false);
            } else if ticks == 21 * 60 {
                input.focus = Some(true);
            }

            match game.phase() {
                GamePhase::Menu | GamePhase::Dead => input.start = true,
                GamePhase::Running => {
                    if let Some(direction) = autopilot(game.player(), game.generator().spawner()) {
                        if game.player_mut().jump(direction) {
                            input.jump = Some(direction);
                        }
                    }
                    let z = game.player().forward_position();
                    let ring = game.player().ring();
                    let supported = game.generator().spawner().platform_under(z, ring).is_some();
                    input.landed = game.player_mut().step(SIM_DT, supported);
                }
                GamePhase::Paused => {}
            }

            game.tick(&input, SIM_DT);

            for event in game.drain_events() {
                hud.apply(&event);
                audio.handle(&event);
                match event {
                    GameEvent::MenuHidden => summary.runs += 1,
                    GameEvent::Died { score, .. } => {
                        summary.deaths += 1;
                        summary.best_run = summary.best_run.max(score);
                        if let Some(text) = hud.death_text() {
                            log::info!("{}", text);
                        }
                    }
                    GameEvent::PathAnnounced { .. } => summary.announced += 1,
                    GameEvent::LaneBranched { .. } => summary.branches += 1,
                    GameEvent::LaneCollapsed { .. } => summary.collapses += 1,
                    GameEvent::Countdown(_) => {
                        if let Some(text) = hud.countdown_text() {
                            log::info!("Resuming in {}", text);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    println!("Simulated {:.1}s ({} ticks)", elapsed, ticks);
    println!(
        "Runs: {}  Deaths: {}  Best run: {}  Stored best: {}",
        summary.runs,
        summary.deaths,
        summary.best_run,
        game.best_score()
    );
    println!(
        "Primary platforms: {}  Branches: {}  Collapses: {}  Live platforms: {}",
        summary.announced,
        summary.branches,
        summary.collapses,
        game.generator().spawner().len()
    );
    println!("Final speed: {:.2}  Score: {}", game.generator().current_speed(), hud.score_text());
}
