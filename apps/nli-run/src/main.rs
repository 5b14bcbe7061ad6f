//! nli-run: run a lung infection simulation from a TOML configuration.
//!
//! ```text
//! nli-run --config config/default.toml --target-time 48 --output out/run1
//! ```
//!
//! Everything a run writes lands under the output directory: the resolved
//! configuration (`config.toml`), a per-tick population summary
//! (`summary.csv`) and whatever the enabled output modules produce.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use nli_config::SimulationConfig;
use nli_output::{SummaryObserver, register_output_modules};
use nli_schedule::Step;
use nli_sim::{Progress, RunStatus, SimBuilder, SimError, SimObserver, SimState};

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "nli-run", version, about = "Innate immune response to a fungal lung infection")]
struct Args {
    /// Simulation configuration (TOML).
    #[arg(long, short)]
    config: PathBuf,

    /// Simulated time to run to; overrides `[simulation] target_time`.
    #[arg(long)]
    target_time: Option<f64>,

    /// Root directory for every file the run writes.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Master seed; overrides `[simulation] seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short)]
    verbose: bool,
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Writes the tick summary and logs progress every tenth of the run.
struct RunObserver {
    summary:     SummaryObserver,
    next_report: f64,
    ticks:       u64,
}

impl RunObserver {
    fn new(summary: SummaryObserver) -> Self {
        Self { summary, next_report: 0.1, ticks: 0 }
    }
}

impl SimObserver for RunObserver {
    fn on_status(&mut self, state: &SimState, status: RunStatus, progress: Progress) {
        match status {
            RunStatus::Initialize => info!(
                "initialized: {} fungi, {} macrophages, {} epithelial cells",
                state.fungi.len(),
                state.macrophages.len(),
                state.epithelium.len()
            ),
            RunStatus::Step if progress.fraction() + 1e-9 >= self.next_report => {
                info!(
                    "t={:.2}/{:.2} ({:.0}%): {} fungi, {} macrophages, {} neutrophils",
                    progress.current,
                    progress.total,
                    progress.fraction() * 100.0,
                    state.fungi.len(),
                    state.macrophages.len(),
                    state.neutrophils.len()
                );
                while self.next_report <= progress.fraction() + 1e-9 {
                    self.next_report += 0.1;
                }
            }
            RunStatus::Step => {}
            RunStatus::Finalize => info!("finalized at t={:.2}", state.clock.time),
        }
        self.summary.on_status(state, status, progress);
    }

    fn on_tick_end(&mut self, step: &Step, state: &SimState) {
        self.ticks += 1;
        self.summary.on_tick_end(step, state);
    }

    fn on_error(&mut self, error: &SimError) {
        warn!("continuing after: {error}");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // 1. Configuration, with command-line overrides applied.
    let mut config = SimulationConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(t) = args.target_time {
        config.simulation.target_time = Some(t);
    }
    let root = match &args.output {
        Some(dir) => {
            config.set_output_root(dir);
            dir.clone()
        }
        None => PathBuf::from("output"),
    };
    config.validate().with_context(|| format!("invalid configuration {}", args.config.display()))?;

    let [nx, ny, nz] = [config.simulation.nx, config.simulation.ny, config.simulation.nz];
    info!(
        "{nx}×{ny}×{nz} voxels, seed {}, modules [{}]",
        config.simulation.seed,
        config.simulation.modules.join(", ")
    );

    // 2. Record exactly what ran.
    fs::create_dir_all(&root).with_context(|| format!("creating {}", root.display()))?;
    let resolved = config.to_toml_string().context("serializing resolved configuration")?;
    fs::write(root.join("config.toml"), resolved).context("writing resolved configuration")?;

    // 3. Build.
    let mut sim = register_output_modules(SimBuilder::new(config))
        .build()
        .context("building simulation")?;
    let summary = SummaryObserver::create(&root.join("summary.csv")).context("creating summary.csv")?;
    let mut obs = RunObserver::new(summary);

    // 4. Run.
    let t0 = Instant::now();
    let run = sim.run(&mut obs).context("simulation failed")?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.summary.take_error() {
        warn!("summary.csv: {e}");
    }

    // 5. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks          : {} ({} observed)", run.ticks, obs.ticks);
    println!("  simulated time : {:.3}", run.time);
    println!("  output errors  : {}", run.output_errors);
    println!("  fungi          : {}", sim.state().fungi.len());
    println!("  macrophages    : {}", sim.state().macrophages.len());
    println!("  neutrophils    : {}", sim.state().neutrophils.len());
    println!("  epithelium     : {}", sim.state().epithelium.len());
    println!("  written to     : {}", root.display());

    Ok(())
}
