use spacetx::{ScenarioConfig, Scenario};
use spacetx::{bench_tick, bench_tick_curve, bench_visibility};

use clap::Parser;
use anyhow::{Context, Result};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "demo.yaml")]
    file_name: String,

    /// Run the timing benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,

    /// With --bench, print the tick cost curve as CSV
    #[arg(long)]
    curve: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.bench {
        if args.curve {
            bench_tick_curve()?;
        } else {
            bench_tick()?;
            bench_visibility()?;
        }
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario parameters")?;
    let summary = scenario.run();

    tracing::info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        entities = summary.entities,
        captured = summary.captured,
        evicted = summary.evicted,
        world_rescales = summary.world_rescales,
        world_radius = summary.world_radius,
        total_mass = summary.total_mass,
        visible = summary.visible_from_overview,
        events = summary.events,
        file = %args.file_name,
        "run summary"
    );

    Ok(())
}
