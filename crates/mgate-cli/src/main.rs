//! mgate entry point.
//!
//! This file is intentionally thin: it sets up tracing, loads the config,
//! wires the store, and runs one evaluate (or evaluate-then-promote) cycle.
//! All decision logic lives in mgate-promotion.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use mgate_config::{config_hash, load_config, GateConfig};
use mgate_promotion::{
    write_evaluation_report_json, DataIngestionArtifact, EvaluationReport, ModelEvaluation,
    ModelEvaluationArtifact, ModelEvaluationConfig, ModelPusher, ModelPusherArtifact,
    ModelPusherConfig, ModelTrainerArtifact, REPORT_SCHEMA_VERSION,
};
use mgate_store::open_store;

#[derive(Parser)]
#[command(name = "mgate")]
#[command(about = "Model promotion gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the candidate against the production baseline and write a report.
    Evaluate {
        /// Gate config (yaml or json)
        #[arg(long)]
        config: PathBuf,

        /// Report output directory (overrides config `report_dir`)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Evaluate, then copy the candidate into the production slot on acceptance.
    Promote {
        /// Gate config (yaml or json)
        #[arg(long)]
        config: PathBuf,

        /// Report output directory (overrides config `report_dir`)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compute the canonical config hash + print it
    ConfigHash {
        /// Gate config (yaml or json)
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Evaluate { config, out } => run_cycle(&config, out, false),
        Commands::Promote { config, out } => run_cycle(&config, out, true),
        Commands::ConfigHash { config } => {
            let cfg = load_config(&config)?;
            println!("{}", config_hash(&cfg)?);
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn run_cycle(config_path: &Path, out: Option<PathBuf>, promote: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let hash = config_hash(&config)?;
    info!(config = %config_path.display(), hash = %hash, "loaded gate config");

    let store = open_store(&config.store);

    let evaluation = ModelEvaluation::new(
        store.as_ref(),
        ModelEvaluationConfig {
            production_model_key: config.model.production_key.clone(),
        },
        DataIngestionArtifact {
            test_csv: config.data.test_csv.clone(),
        },
        ModelTrainerArtifact {
            trained_model_key: config.model.candidate_key.clone(),
            trained_f1: config.model.trained_f1,
        },
    );

    let result = evaluation.evaluate().context("evaluation cycle failed")?;
    let artifact = ModelEvaluationArtifact::from_result(
        &result,
        config.model.candidate_key.clone(),
        config.model.production_key.clone(),
    );

    let pushed = if promote && artifact.is_accepted {
        Some(push_accepted(&config, store.as_ref(), &artifact)?)
    } else {
        if promote {
            info!("candidate rejected, skipping push");
        }
        None
    };

    let report = EvaluationReport {
        schema_version: REPORT_SCHEMA_VERSION,
        run_id: Uuid::new_v4(),
        created_at_utc: Utc::now(),
        config_hash: hash,
        result,
        artifact,
        pushed,
    };

    let out_dir = out
        .or_else(|| config.report_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let report_path = write_evaluation_report_json(&out_dir, &report)
        .with_context(|| format!("write report to '{}'", out_dir.display()))?;

    let verdict = if report.result.accepted { "ACCEPTED" } else { "REJECTED" };
    println!(
        "{verdict} candidate_f1={:.6} production_f1={} delta={:.6}",
        report.result.candidate_f1,
        report
            .result
            .production_f1
            .map(|v| format!("{v:.6}"))
            .unwrap_or_else(|| "none".to_string()),
        report.result.delta,
    );
    if let Some(p) = &report.pushed {
        println!("PROMOTED -> {}", p.saved_model_path);
    }
    println!("report: {}", report_path.display());
    Ok(())
}

fn push_accepted(
    config: &GateConfig,
    store: &dyn mgate_store::ObjectStore,
    artifact: &ModelEvaluationArtifact,
) -> Result<ModelPusherArtifact> {
    let Some(production_key) = config.model.production_key.clone() else {
        bail!("promote requires model.production_key in the config");
    };
    let pusher = ModelPusher::new(store, ModelPusherConfig {
        production_model_key: production_key,
    });
    pusher
        .initiate(artifact)
        .context("push to production slot failed")
}
