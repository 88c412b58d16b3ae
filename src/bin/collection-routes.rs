//! Command-line front end: load zones and distances, optimize, report.

use clap::Parser;
use collection_routes::config::Config;
use collection_routes::problem::Problem;
use collection_routes::utils::{format_front, save_result};
use collection_routes::ParetoOptimizer;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "collection-routes", version, about = "Pareto-optimal waste collection routes")]
struct Args {
    /// Zones CSV (id,name,latitude,longitude,volume_kg,priority,penalty_min)
    #[arg(long, requires = "distances", conflicts_with = "problem")]
    zones: Option<PathBuf>,

    /// Distances CSV (origin,destination,distance_km,time_min)
    #[arg(long, requires = "zones")]
    distances: Option<PathBuf>,

    /// JSON file with `zones` and `distances` arrays
    #[arg(long, required_unless_present = "zones")]
    problem: Option<PathBuf>,

    /// JSON file with optimizer settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    population: Option<usize>,

    #[arg(long)]
    generations: Option<usize>,

    #[arg(long)]
    mutation: Option<f64>,

    #[arg(long)]
    crossover: Option<f64>,

    /// Return to the first zone at the end of the route
    #[arg(long)]
    closed_tour: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds, checked between generations
    #[arg(long)]
    time_limit_secs: Option<u64>,

    /// Write the result as JSON
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Log every generation
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_reader::<_, Config>(BufReader::new(File::open(path)?))?,
            None => Config::new(),
        };

        if let Some(size) = self.population {
            config = config.with_population_size(size);
        }
        if let Some(generations) = self.generations {
            config = config.with_generations(generations);
        }
        if let Some(rate) = self.mutation {
            config = config.with_mutation_rate(rate);
        }
        if let Some(rate) = self.crossover {
            config = config.with_crossover_rate(rate);
        }
        if self.closed_tour {
            config = config.with_closed_tour(true);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(secs) = self.time_limit_secs {
            config = config.with_time_limit(Duration::from_secs(secs));
        }

        Ok(config)
    }

    fn problem(&self) -> Result<Problem, Box<dyn std::error::Error>> {
        let problem = match (&self.problem, &self.zones, &self.distances) {
            (Some(path), _, _) => Problem::from_json_file(path)?,
            (None, Some(zones), Some(distances)) => Problem::from_csv_files(zones, distances)?,
            _ => return Err("either --problem or both --zones and --distances are required".into()),
        };
        Ok(problem)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = args.config()?;
    let problem = args.problem()?;
    info!(
        "loaded {} zones and {} distance edges",
        problem.zone_count(),
        problem.edges.len()
    );

    let mut optimizer = ParetoOptimizer::new(problem, config)?;
    let result = optimizer.run()?;

    print!("{}", format_front(&result));

    if let Some(path) = &args.output {
        info!("saving result to {}", path.display());
        save_result(&result, path)?;
    }

    Ok(())
}
