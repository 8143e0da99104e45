use acsim::{Scenario, ScenarioConfig};
use acsim::{bench_solver_curve, bench_solvers};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Charged particles in electromagnetic fields")]
struct Args {
    /// Scenario file; looked up under `scenarios/` when not found as given
    #[arg(short, long, default_value = "cyclotron.yaml")]
    file: PathBuf,

    /// Record the first particle's trajectory to this binary file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Benchmark the solvers instead of running a scenario
    #[arg(long)]
    bench: bool,

    /// With --bench, print the convergence curve as CSV
    #[arg(long, requires = "bench")]
    curve: bool,
}

fn resolve(file: &Path) -> PathBuf {
    if file.is_absolute() || file.exists() {
        return file.to_path_buf();
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
}

// load here to keep main clean
fn load_scenario_from_yaml(file: &Path) -> Result<ScenarioConfig> {
    let config_path = resolve(file);
    let file = File::open(&config_path)
        .with_context(|| format!("cannot open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("invalid scenario {}", config_path.display()))?;
    info!("loaded {}", config_path.display());

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.bench {
        return if args.curve { bench_solver_curve() } else { bench_solvers() };
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;
    let report = scenario.run(args.output.as_deref())?;

    for (i, particle) in report.particles.iter().enumerate() {
        println!("particle {i} ({} orbits)\n{particle}\n", report.orbits[i]);
    }
    if let Some(bunch) = &report.bunch {
        println!(
            "bunch of {}\nmean position: {}\nmean velocity: {}\ntotal energy:  {}",
            bunch.len(),
            bunch.mean_position(),
            bunch.mean_velocity(),
            bunch.total_energy()
        );
    }
    if let Some(path) = &args.output {
        println!("{} records written to {}", report.records, path.display());
    }

    Ok(())
}
