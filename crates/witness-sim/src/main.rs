//! Witness demo binary.
//!
//! Loads `witness-config.yaml`, builds a small sandbox world, runs one
//! scripted round through the action pipeline, then submits whatever
//! reactions the round provoked. Every result and every observer's
//! perception count is logged.

mod error;
mod scenario;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use witness_core::{ActionPipeline, BatchMode, LoggingConfig, WitnessConfig, process_batch};
use witness_types::ActionResult;

use crate::error::SimError;
use crate::scenario::{AlarmHook, courtyard};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "WITNESS_CONFIG";

/// Config file looked up in the working directory when `WITNESS_CONFIG` is
/// unset.
const DEFAULT_CONFIG_PATH: &str = "witness-config.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration (logging settings live there too).
    let (config, source) = load_config()?;

    // 2. Initialize tracing.
    init_tracing(&config.logging);
    match &source {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => warn!("no config file found, using defaults"),
    }
    info!(
        batch_mode = ?config.pipeline.batch_mode,
        seed = ?config.pipeline.seed,
        die = config.roll.die_sides,
        "witness-sim starting"
    );

    // 3. Build the world and the pipeline.
    let scenario = courtyard()?;
    let pipeline = Arc::new(
        ActionPipeline::from_config(scenario.host.clone(), &config)
            .map_err(SimError::from)?
            .with_reaction_hook(Arc::new(AlarmHook::new([scenario.cast.guard]))),
    );

    // 4. Run the scripted round.
    let results = process_batch(
        &pipeline,
        scenario.intents,
        config.pipeline.batch_mode,
        config.pipeline.seed,
    )
    .await
    .map_err(SimError::from)?;
    log_results("round", &results);

    // 5. Submit the reactions it provoked, in order.
    let reactions: Vec<_> = results
        .iter()
        .flat_map(|result| result.reactions.iter().cloned())
        .collect();
    if !reactions.is_empty() {
        let follow_up = process_batch(
            &pipeline,
            reactions,
            BatchMode::Sequential,
            config.pipeline.seed,
        )
        .await
        .map_err(SimError::from)?;
        log_results("reactions", &follow_up);
    }

    // 6. Report what everyone noticed.
    for (name, id) in scenario.cast.roster() {
        let perceived = pipeline.perceived_by(id);
        info!(
            observer = name,
            events = perceived.len(),
            last_target = ?pipeline.last_target(id),
            "perception summary"
        );
    }

    info!("witness-sim finished");
    Ok(())
}

/// Read the config named by `WITNESS_CONFIG`, else `witness-config.yaml`
/// when present, else defaults.
///
/// An explicit `WITNESS_CONFIG` that points nowhere is an error; a missing
/// default file is not.
fn load_config() -> Result<(WitnessConfig, Option<PathBuf>), SimError> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if path.exists() {
        let config = WitnessConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }
    match explicit {
        Some(path) => Err(SimError::MissingConfig { path }),
        None => Ok((WitnessConfig::default(), None)),
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn log_results(batch: &str, results: &[ActionResult]) {
    for result in results {
        info!(
            batch,
            intent = %result.intent,
            success = result.success,
            observers = result.observers.len(),
            reactions = result.reactions.len(),
            roll = ?result.roll.as_ref().map(|roll| roll.total),
            failure = ?result.failure_reason(),
            "{}",
            result.summary
        );
    }
}
