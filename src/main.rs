//! Deal Engine CLI
//!
//! Command-line interface for analyzing rental property deals

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use property_deal_engine::{
    deal::{load_deals, read_deals_unchecked, DealParameters},
    enrich,
    scenario::{ScenarioSetKind, ScenarioTable},
    Amortization, DealAnalyzer, EngineConfig, EnrichedAnalysis, ScenarioMetrics, ScenarioRunner,
    ScenarioSet, SummaryNarrator,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Rental property deal analysis
#[derive(Parser)]
#[command(name = "deal-engine", version, about = "Rental property deal analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON engine config; its fields override DEAL_* environment variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one deal and print the result as JSON
    Analyze {
        /// Deal parameters JSON file
        #[arg(long)]
        deal: PathBuf,

        /// Attach a text summary
        #[arg(long)]
        narrative: bool,
    },
    /// Analyze every deal in a CSV file in parallel
    Batch {
        /// Deals CSV file
        #[arg(long)]
        input: PathBuf,

        /// Summary CSV to write
        #[arg(long, default_value = "deal_analysis_output.csv")]
        output: PathBuf,

        /// Reject the whole file if any deal is out of range
        #[arg(long)]
        strict: bool,
    },
    /// Print a scenario comparison table for one deal
    Scenarios {
        /// Deal parameters JSON file
        #[arg(long)]
        deal: PathBuf,

        /// Scenario parameterization: literal or multiplicative
        #[arg(long, default_value = "literal")]
        set: ScenarioSetKind,
    },
}

/// One row of batch output
#[derive(Debug, Serialize)]
struct BatchRow {
    deal_id: String,
    irr: Option<f64>,
    irr_converged: Option<bool>,
    npv: Option<f64>,
    cap_rate: Option<f64>,
    cash_on_cash_return: Option<f64>,
    payback_period_years: Option<f64>,
    risk_score: Option<u8>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let analyzer = DealAnalyzer::new(config);

    match cli.command {
        Commands::Analyze { deal, narrative } => run_analyze(&analyzer, &deal, narrative),
        Commands::Batch { input, output, strict } => run_batch(&analyzer, &input, &output, strict),
        Commands::Scenarios { deal, set } => run_scenarios(&analyzer, &deal, set),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let env_config = EngineConfig::from_env();
    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            env_config
                .overlay_json(&contents)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => env_config,
    };
    config.validate()?;
    log::debug!("engine config: {:?}", config);
    Ok(config)
}

fn read_deal(path: &Path) -> Result<DealParameters> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read deal {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse deal {}", path.display()))
}

fn run_analyze(analyzer: &DealAnalyzer, path: &Path, narrative: bool) -> Result<()> {
    let deal = read_deal(path)?;
    let result = analyzer.analyze(&deal)?;

    let output = if narrative {
        enrich(result, &SummaryNarrator)
    } else {
        EnrichedAnalysis::from(result)
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_batch(analyzer: &DealAnalyzer, input: &Path, output: &Path, strict: bool) -> Result<()> {
    let start = Instant::now();
    let deals = if strict {
        load_deals(input).with_context(|| format!("failed to load {}", input.display()))?
    } else {
        let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
        read_deals_unchecked(file)?
    };
    log::info!("loaded {} deals in {:?}", deals.len(), start.elapsed());

    let rows: Vec<BatchRow> = deals
        .par_iter()
        .map(|record| match analyzer.analyze(&record.params) {
            Ok(result) => BatchRow {
                deal_id: record.deal_id.clone(),
                irr: Some(result.irr),
                irr_converged: Some(result.irr_converged),
                npv: Some(result.npv),
                cap_rate: Some(result.cap_rate),
                cash_on_cash_return: Some(result.cash_on_cash_return),
                payback_period_years: Some(result.payback_period_years),
                risk_score: Some(result.risk_score),
                error: None,
            },
            Err(e) => {
                log::warn!("deal {} failed: {}", record.deal_id, e);
                BatchRow {
                    deal_id: record.deal_id.clone(),
                    irr: None,
                    irr_converged: None,
                    npv: None,
                    cap_rate: None,
                    cash_on_cash_return: None,
                    payback_period_years: None,
                    risk_score: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    println!(
        "Analyzed {} deals ({} failed) in {:?}, written to {}",
        rows.len(),
        failed,
        start.elapsed(),
        output.display()
    );
    Ok(())
}

fn run_scenarios(analyzer: &DealAnalyzer, path: &Path, kind: ScenarioSetKind) -> Result<()> {
    let deal = read_deal(path)?;
    deal.validate()?;

    let loan = Amortization::for_deal(&deal)?;
    let runner = ScenarioRunner::new(analyzer.config().clone());
    let table: ScenarioTable<ScenarioMetrics> = runner.compare(&deal, &loan, &ScenarioSet::of_kind(kind))?;

    println!("{:?} scenarios", kind);
    println!(
        "{:<12} {:>9} {:>14} {:>9} {:>9} {:>9} {:>5}",
        "Scenario", "IRR %", "NPV", "Cap %", "CoC %", "Payback", "Risk"
    );
    println!("{}", "-".repeat(74));
    for (name, m) in table.iter() {
        println!(
            "{:<12} {:>9.2} {:>14.2} {:>9.2} {:>9.2} {:>9.2} {:>5}",
            name.as_str(),
            m.irr,
            m.npv,
            m.cap_rate,
            m.cash_on_cash_return,
            m.payback_period_years,
            m.risk_score
        );
    }
    Ok(())
}
