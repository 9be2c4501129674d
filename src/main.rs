//! Sky Circuits - headless runner
//!
//! Drives the engine at a fixed 60 Hz frame rate with the autopilot flapping,
//! optionally streams events as JSON lines, and prints the final snapshot.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use sky_circuits::consts::SIM_DT;
    use sky_circuits::persistence::{FileStore, KeyValueStore, MemoryStore};
    use sky_circuits::sim::{Mode, SyncDebug};
    use sky_circuits::{Engine, Tuning};

    #[derive(Parser, Debug)]
    #[command(name = "sky-circuits", about = "Run a headless Sky Circuits session")]
    struct Args {
        /// Spawn RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Simulated seconds before stopping (a game over stops earlier)
        #[arg(long, default_value_t = 60.0)]
        seconds: f32,
        /// JSON tuning overrides
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// JSON file holding the high score and telemetry (memory only if omitted)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Beat phase override: a phase like `0.0`, `{"phase":0.25}` or `{"seed":"abc"}`
        #[arg(long)]
        sync_debug: Option<String>,
        #[arg(long, default_value_t = 960.0)]
        width: f32,
        #[arg(long, default_value_t = 540.0)]
        height: f32,
        /// Print every drained event as a JSON line
        #[arg(long)]
        events: bool,
        /// Start the run but never flap
        #[arg(long)]
        no_autopilot: bool,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        Tuning::from_json(&text).with_context(|| format!("loading tuning from {}", path.display()))
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        let tuning = load_tuning(args.tuning.as_ref())?;
        let store: Box<dyn KeyValueStore> = match &args.store {
            Some(path) => Box::new(FileStore::new(path)),
            None => Box::new(MemoryStore::default()),
        };
        let mut engine = Engine::new(tuning, args.seed, store)?;
        engine.resize_world(args.width, args.height, 1.0);

        if let Some(payload) = &args.sync_debug {
            match SyncDebug::parse(payload) {
                Some(debug) => engine.set_sync_debug(debug),
                None => log::warn!("Ignoring sync debug payload {:?}", payload),
            }
        }
        if args.no_autopilot {
            engine.start_game();
        } else {
            engine.set_autopilot(true);
        }

        let frames = (args.seconds.max(0.0) / SIM_DT).ceil() as u32;
        log::info!("Sky Circuits (native) running {} frames", frames);
        for _ in 0..frames {
            engine.frame(SIM_DT);
            for event in engine.drain_events() {
                if args.events {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            if engine.state().mode == Mode::GameOver {
                break;
            }
        }

        println!("{}", engine.snapshot().to_json()?);
        let telemetry = engine.telemetry();
        log::info!(
            "Runs started {}, completed {}, average {:.1}s",
            telemetry.run_starts,
            telemetry.completed_runs,
            telemetry.avg_run_duration_sec
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive `Engine` directly through the library
}
