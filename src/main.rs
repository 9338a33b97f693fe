//! Glide Run entry point
//!
//! Headless driver: loads tuning, runs the fixed-step loop with a simple
//! autopilot standing in for the player's taps, and keeps the best distance
//! on disk.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;

    use glide_run::consts::{MAX_SUBSTEPS, SIM_DT};
    use glide_run::persistence::JsonFileStore;
    use glide_run::sim::{
        EntityKind, PlayerMode, Presenter, Run, RunEvent, RunState, TickInput, frame, tick,
    };
    use glide_run::{RunStats, TemplateCatalog, Tuning};

    /// Presentation frame rate of the headless loop
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Launch once the sweep is this high
    const LAUNCH_AT: f32 = 0.85;
    /// How far ahead the autopilot looks for hazards
    const LOOKAHEAD: f32 = 4.0;
    /// Stop ghosting when the budget gets this low
    const MIN_BUDGET: f32 = 0.75;

    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Tuning overrides (JSON)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Level generation seed
        #[arg(long, default_value_t = 0x5EED)]
        seed: u64,

        /// Simulated seconds to play
        #[arg(long, value_name = "SECONDS", default_value_t = 60.0)]
        seconds: f32,

        /// Best distance file
        #[arg(long, value_name = "PATH", default_value = "glide_run_best.json")]
        best_file: PathBuf,
    }

    /// Logs the game-over panel instead of drawing it
    struct LogPresenter;

    impl Presenter for LogPresenter {
        fn show_game_over_panel(&mut self, can_revive: bool, distance: f32, best: f32) {
            log::info!(
                "GAME OVER  distance {:.1}  best {:.1}  revive: {}",
                distance,
                best,
                if can_revive { "available" } else { "used" }
            );
        }

        fn hide_panel(&mut self) {
            log::debug!("Panel hidden");
        }
    }

    /// Decide this frame's taps from the current run
    fn autopilot(run: &Run) -> TickInput {
        match run.state() {
            RunState::Ready => TickInput {
                tap: run.launch_power01().unwrap_or(1.0) >= LAUNCH_AT,
                ..Default::default()
            },
            RunState::Flying => {
                let pos = run.body().pos;
                let danger_ahead = run.world().iter().any(|e| {
                    let is_danger = match &e.kind {
                        EntityKind::Hazard => true,
                        EntityKind::Object { kind } => kind.is_hazard(),
                        EntityKind::Chunk { .. } => false,
                    };
                    is_danger && e.pos.x > pos.x - 1.0 && e.pos.x < pos.x + LOOKAHEAD
                });
                let want_ghost = danger_ahead && run.gauge().time_left() > MIN_BUDGET;
                let tap = match run.mode() {
                    PlayerMode::Interactive => want_ghost,
                    PlayerMode::Passthrough => !want_ghost,
                    PlayerMode::Invulnerable => false,
                };
                TickInput {
                    tap,
                    ..Default::default()
                }
            }
            RunState::GameOver => TickInput {
                revive: run.can_revive(),
                retry: !run.can_revive(),
                ..Default::default()
            },
        }
    }

    pub fn main() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();
        log::info!("Glide Run (headless) starting, seed {:#x}", args.seed);

        let tuning = match &args.config {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        tuning.validate()?;

        let stats = RunStats::with_store(Box::new(JsonFileStore::new(&args.best_file)));
        let mut run = Run::new(tuning, TemplateCatalog::builtin(), args.seed)
            .with_stats(stats)
            .with_presenter(Box::new(LogPresenter));

        let mut accumulator = 0.0f32;
        let mut elapsed = 0.0f32;
        let mut attempts = 1u32;

        while elapsed < args.seconds {
            frame(&mut run, FRAME_DT);
            accumulator += FRAME_DT;
            elapsed += FRAME_DT;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                // One-shot commands go to the first substep only
                let input = if substeps == 0 {
                    autopilot(&run)
                } else {
                    TickInput::default()
                };
                tick(&mut run, &input, SIM_DT);
                accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in run.drain_events() {
                match event {
                    RunEvent::StateChanged {
                        new: RunState::Ready,
                        prev: RunState::GameOver,
                    } => attempts += 1,
                    RunEvent::Sound(_) => {}
                    other => log::debug!("{:?}", other),
                }
            }
        }

        // The clock may run out mid-flight
        run.commit_stats();
        log::info!(
            "Played {:.0}s over {} attempt(s), last distance {:.1}, best {:.1}",
            elapsed,
            attempts,
            run.stats().current_distance(),
            run.stats().best_distance()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on the web; the host page drives it
}
