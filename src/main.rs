use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pathomove_core::metrics::init_logging;
use pathomove_core::{SimConfig, Simulation};
use pathomove_io::export::write_landscape;
use pathomove_io::{generate_run_id, write_json_file, CsvExporter, OutputLayout};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a landscape and write its item coordinates
    Landscape {
        #[arg(long, default_value_t = 450)]
        items: i32,
        #[arg(long, default_value_t = 60.0)]
        size: f32,
        #[arg(long, default_value_t = 60)]
        clusters: i32,
        #[arg(long, default_value_t = 1.0)]
        spread: f32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(short, long, default_value = "data")]
        output: PathBuf,
    },
    /// Run a simulation and export traits, networks and the landscape
    Run {
        /// Config file path; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = "data")]
        output: PathBuf,
        /// Also write per-generation summaries as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Print the default configuration as TOML
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SimConfig::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    match args.command {
        Command::Landscape {
            items,
            size,
            clusters,
            spread,
            seed,
            output,
        } => {
            let records = pathomove_lib::get_test_landscape(items, size, clusters, spread, seed)?;
            let layout = OutputLayout::new(output);
            layout.prepare()?;
            let run_id = generate_run_id(&mut rand::thread_rng());
            let dispersal = pathomove_lib::widen(spread);
            layout.append_lookup(&run_id, clusters.max(0) as usize, dispersal)?;
            let path = layout.landscape_path(&run_id);
            write_landscape(&path, &records)?;
            tracing::info!(items = records.len(), path = %path.display(), "Landscape written");
        }
        Command::Run {
            config,
            output,
            summary,
        } => {
            let config = load_config(config.as_ref())?;
            let mut exporter =
                CsvExporter::create(OutputLayout::new(output), &config, &mut rand::thread_rng())?;
            let run = Simulation::new(config)?.run_with(&mut exporter)?;
            if let Some(path) = summary {
                write_json_file(&run.summaries, &path)?;
            }
            tracing::info!(run_id = exporter.run_id(), "Run exported");
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&SimConfig::default())?);
        }
    }
    Ok(())
}
