//! Command-line driver.
//!
//! Thin wrapper over [`SelectionEngine`]: each invocation loads the corpus,
//! builds one generation, and runs a single command. Long-lived callers
//! should embed the library and hold the engine across queries instead.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::engine::SelectionEngine;
use crate::error::Result;
use crate::resolve::Decision;

#[derive(Debug, Parser)]
#[command(name = "skillsel", version, about = "Rank and select skill documents for a task query")]
pub struct Cli {
    /// Machine-readable JSON output on stdout.
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Explicit config file path.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skill corpus directory.
    #[arg(long, global = true, env = "SKILLSEL_CORPUS", default_value = "skills")]
    pub corpus: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank skills for a task description and print the decision.
    Query {
        /// The task description; multiple words are joined.
        text: Vec<String>,
        /// Show at most this many candidates.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Load and index the corpus, reporting what a rebuild would publish.
    Rebuild,
    /// Print engine statistics for the current corpus.
    Stats,
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = crate::config::Config::load(cli.config.as_deref())?;
    let engine = SelectionEngine::with_corpus(config, &cli.corpus)?;

    match &cli.command {
        Commands::Query { text, limit } => run_query(cli, &engine, &text.join(" "), *limit),
        Commands::Rebuild => run_rebuild(cli, &engine),
        Commands::Stats => run_stats(cli, &engine),
    }
}

fn run_query(cli: &Cli, engine: &SelectionEngine, text: &str, limit: usize) -> Result<()> {
    let mut response = engine.select(text)?;
    response.candidates.truncate(limit);

    if cli.robot {
        println!("{}", serde_json::to_string(&response).unwrap_or_default());
        return Ok(());
    }

    match &response.decision {
        Decision::AutoSelect(skill_id) => {
            println!("{} {}", "selected:".green().bold(), skill_id.bold());
        }
        Decision::Shortlist(ids) => {
            println!(
                "{} {}",
                "ambiguous, shortlist:".yellow().bold(),
                ids.join(", ")
            );
        }
        Decision::NoMatch => println!("{}", "no matching skill".red()),
    }

    for (rank, candidate) in response.candidates.iter().enumerate() {
        let fields = candidate
            .matched_fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:>3}. {:<24} {:>7.3}  [{}]",
            rank + 1,
            candidate.skill_id,
            candidate.score,
            fields.dimmed()
        );
        if cli.verbose > 0 {
            for line in &candidate.rationale {
                println!("       {}", line.dimmed());
            }
        }
    }
    println!("{}", format!("({} ms)", response.took_ms).dimmed());
    Ok(())
}

fn run_rebuild(cli: &Cli, engine: &SelectionEngine) -> Result<()> {
    // `with_corpus` already built generation 1; run one more to exercise
    // the swap path and report it.
    let report = engine.rebuild(&cli.corpus)?;
    if cli.robot {
        println!("{}", serde_json::to_string(&report).unwrap_or_default());
    } else {
        println!(
            "{} generation {} ({} records, {} terms, {} ms)",
            "indexed:".green().bold(),
            report.generation,
            report.records,
            report.distinct_terms,
            report.took_ms
        );
    }
    Ok(())
}

fn run_stats(cli: &Cli, engine: &SelectionEngine) -> Result<()> {
    let stats = engine.stats();
    if cli.robot {
        println!("{}", serde_json::to_string(&stats).unwrap_or_default());
    } else {
        println!("generation:     {}", stats.generation.unwrap_or(0));
        println!("records:        {}", stats.records);
        println!("distinct terms: {}", stats.distinct_terms);
        println!(
            "cache:          {} hits / {} misses",
            stats.cache_hits, stats.cache_misses
        );
    }
    Ok(())
}
