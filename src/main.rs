//! Brickfall entry point
//!
//! Headless runner: seeds a game, autoplays the paddle and logs the outcome.
//! A renderer would sit on top of the same `tick` loop.
//!
//! Usage: brickfall [seed] [max-ticks] [--tuning <path>] [--dump <path>]

use std::path::PathBuf;
use std::process::ExitCode;

use brickfall::consts::SIM_DT;
use brickfall::sim::{GamePhase, GameState, TickInput, build_level, tick};
use brickfall::tuning::Tuning;

struct Args {
    seed: u64,
    max_ticks: u64,
    tuning: Option<PathBuf>,
    dump: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        seed: 42,
        max_ticks: 120 * 600,
        tuning: None,
        dump: None,
    };
    let mut positional = 0;
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--tuning" => {
                let path = iter.next().ok_or("--tuning needs a path")?;
                args.tuning = Some(PathBuf::from(path));
            }
            "--dump" => {
                let path = iter.next().ok_or("--dump needs a path")?;
                args.dump = Some(PathBuf::from(path));
            }
            _ => {
                let value: u64 = arg
                    .parse()
                    .map_err(|_| format!("unexpected argument: {arg}"))?;
                match positional {
                    0 => args.seed = value,
                    1 => args.max_ticks = value,
                    _ => return Err("too many positional arguments".into()),
                }
                positional += 1;
            }
        }
    }
    Ok(args)
}

/// Track the most threatening ball with the paddle (demo autopilot)
fn chase_ball_input(state: &GameState) -> TickInput {
    let target = state
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .or_else(|| state.balls.first());

    let Some(target) = target else {
        return TickInput::default();
    };
    let paddle_x = state.paddle.rect.center().x;
    let mut input = TickInput::default();
    if target.pos.x < paddle_x - 4.0 {
        input.move_left = true;
    } else if target.pos.x > paddle_x + 4.0 {
        input.move_right = true;
    }
    input
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("usage: brickfall [seed] [max-ticks] [--tuning <path>] [--dump <path>]");
            return ExitCode::FAILURE;
        }
    };

    let tuning = match &args.tuning {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };

    let mut state = GameState::new(args.seed, tuning);
    if let Err(err) = build_level(&mut state) {
        log::error!("level build failed: {err}");
        return ExitCode::FAILURE;
    }
    log::info!("run seed {}", args.seed);

    let mut ticks: u64 = 0;
    while state.phase == GamePhase::Playing && ticks < args.max_ticks {
        let input = chase_ball_input(&state);
        tick(&mut state, &input, SIM_DT);
        ticks += 1;
        if ticks % 1200 == 0 {
            log::info!(
                "t={}s bricks={} lives={} balls={}",
                ticks / 120,
                state.tally.remaining(),
                state.lives.remaining(),
                state.balls.len()
            );
        }
    }

    match state.phase {
        GamePhase::Won => log::info!("cleared the level in {} ticks", state.time_ticks),
        GamePhase::Lost => log::info!("defeated after {} ticks", state.time_ticks),
        GamePhase::Playing => log::info!(
            "stopping after {ticks} ticks with {} bricks left",
            state.tally.remaining()
        ),
    }

    if let Some(path) = &args.dump {
        match serde_json::to_string_pretty(&state) {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    log::error!("state dump failed: {err}");
                } else {
                    log::info!("state dumped to {}", path.display());
                }
            }
            Err(err) => log::error!("state dump failed: {err}"),
        }
    }

    ExitCode::SUCCESS
}
