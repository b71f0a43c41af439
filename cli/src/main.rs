//! arbor CLI - Command-line interface for arbor
//!
//! Loads a tree file and runs the solver, the fixed-strategy propagator or
//! the policy simulator on it.

use anyhow::{Context, Result};
use arbor_engine::{
    evaluate, play, sim, sim_decisions_parallel, solve, DecisionTree, SimConfig, Strategy,
};
use arbor_tree::{load, render, save, TreeSpec};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Decision tree solver and policy simulator", long_about = None)]
struct Cli {
    /// Log resolver passes and simulation batches
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the tree with parents and probabilities")]
    Show {
        #[arg(required = true)]
        file: PathBuf,
    },
    #[command(about = "Find the optimal strategy and its value")]
    Solve {
        #[arg(required = true)]
        file: PathBuf,
    },
    #[command(about = "Evaluate every node under a fixed strategy", alias = "calc")]
    Value {
        #[arg(required = true)]
        file: PathBuf,
        /// Decision choices as node:child pairs, e.g. 0:1,3:5
        #[arg(short, long, required = true)]
        strategy: String,
    },
    #[command(about = "Print what happens under a strategy (optimal if omitted)")]
    Path {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(short, long)]
        strategy: Option<String>,
    },
    #[command(about = "Play the tree once")]
    Play {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    #[command(about = "Monte-Carlo estimate of a strategy's value")]
    Sim {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long, default_value_t = SimConfig::default().trials)]
        trials: u64,
        /// Raw outcomes to print before the summary
        #[arg(long, default_value_t = 20)]
        samples: usize,
        #[arg(long, default_value_t = SimConfig::default().batch)]
        batch: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    #[command(about = "Build a tree from a JSON specification and save it")]
    Import {
        #[arg(required = true)]
        json: PathBuf,
        #[arg(required = true)]
        out: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // Only fails when a logger is already installed
    let _ = simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}

fn open(file: &Path) -> Result<DecisionTree> {
    load(file).with_context(|| format!("failed to load {}", file.display()))
}

/// Parse a strategy given on the command line, or solve for the optimal one.
fn strategy_for(tree: &DecisionTree, text: Option<&str>) -> Result<Strategy> {
    match text {
        Some(text) => {
            let strategy = Strategy::parse(tree, text).context("invalid --strategy")?;
            strategy.check(tree).context("invalid --strategy")?;
            Ok(strategy)
        }
        None => Ok(solve(tree).context("failed to solve tree")?.strategy),
    }
}

fn seed_or_random(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    log::info!("seed {}", seed);
    seed
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Show { file } => {
            let tree = open(&file)?;
            print!("{}", render::show(&tree));
        }
        Command::Solve { file } => {
            let tree = open(&file)?;
            let solution = solve(&tree).context("failed to solve tree")?;
            print!("{}", render::show_values(&tree, &solution.evaluation));
            println!();
            print!("{}", render::show_strategy(&tree, &solution.strategy));
            println!();
            println!("Strategy: {}", solution.strategy);
            println!("Value:    {}", solution.value());
        }
        Command::Value { file, strategy } => {
            let tree = open(&file)?;
            let strategy = strategy_for(&tree, Some(&strategy))?;
            let evaluation = evaluate(&strategy, &tree).context("failed to evaluate strategy")?;
            print!("{}", render::show_values(&tree, &evaluation));
            println!("Value: {}", evaluation.root_value());
        }
        Command::Path { file, strategy } => {
            let tree = open(&file)?;
            let strategy = strategy_for(&tree, strategy.as_deref())?;
            print!("{}", render::path(&tree, &strategy)?);
        }
        Command::Play {
            file,
            strategy,
            seed,
        } => {
            let tree = open(&file)?;
            let strategy = strategy_for(&tree, strategy.as_deref())?;
            let mut rng = SmallRng::seed_from_u64(seed_or_random(seed));
            let outcome = play(&strategy, &tree, 0, &mut rng)?;
            println!("{} ({}) pays {}", outcome.name, outcome.node, outcome.payoff);
        }
        Command::Sim {
            file,
            strategy,
            trials,
            samples,
            batch,
            seed,
        } => {
            let tree = open(&file)?;
            let strategy = strategy_for(&tree, strategy.as_deref())?;
            let seed = seed_or_random(seed);

            let mut rng = SmallRng::seed_from_u64(seed);
            for outcome in sim(&strategy, &tree, samples, &mut rng)? {
                println!("{:>12} {}", outcome.payoff, outcome.name);
            }

            let config = SimConfig {
                trials,
                batch,
                seed,
            };
            let report = sim_decisions_parallel(&config, &tree, &strategy)
                .context("simulation failed")?;
            let analytic = evaluate(&strategy, &tree)?.root_value();

            println!();
            for id in tree.terminals() {
                let node = &tree.nodes[id as usize];
                println!(
                    "{:>12} {:>8.4} {}",
                    report.payoffs[id as usize],
                    report.frequency(id),
                    node.name
                );
            }
            println!();
            println!("Trials:    {}", report.trials);
            println!("Empirical: {:.6} (se {:.6})", report.expected_value, report.standard_error());
            println!("Analytic:  {:.6}", analytic);
        }
        Command::Import { json, out } => {
            let text = std::fs::read_to_string(&json)
                .with_context(|| format!("failed to read {}", json.display()))?;
            let tree = TreeSpec::from_json(&text)?
                .build()
                .with_context(|| format!("{} is not a valid tree", json.display()))?;
            save(&out, &tree).with_context(|| format!("failed to save {}", out.display()))?;
            println!("{} nodes written to {}", tree.len(), out.display());
        }
    }
    Ok(())
}
