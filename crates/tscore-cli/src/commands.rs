use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use tscore_core::{ParameterResolver, SqlPlusRunner, TemporalScorer};
use tscore_ingest::{parse_config, read_id_file};

use crate::cli::{Cli, redacted_args};
use crate::output::Destination;
use crate::prompt::TerminalPrompt;

/// Run one scoring job from start to finish.
pub fn run(args: &Cli) -> Result<()> {
    info!(
        "Run identifier (host/pid): {}",
        run_identifier(host_name().as_deref(), std::process::id())
    );
    if let Ok(cwd) = std::env::current_dir() {
        info!("Current working directory: {}", cwd.display());
    }
    info!(
        "Invoked with arguments: {:?}",
        redacted_args(std::env::args_os().skip(1))
    );

    let mut resolver = ParameterResolver::new();
    if let Some(path) = &args.parameters {
        let parsed = parse_config(path)
            .with_context(|| format!("read parameters file {}", path.display()))?;
        resolver = resolver.merge_config(parsed.settings);
    }

    info!("Loading drug IDs from file: {}", args.drug_ids_file.display());
    let drug_ids = read_id_file(&args.drug_ids_file).context("read drug IDs")?;
    info!("Loading condition IDs from file: {}", args.cond_ids_file.display());
    let cond_ids = read_id_file(&args.cond_ids_file).context("read condition IDs")?;

    let params = resolver
        .apply_overrides(&args.overrides())
        .resolve(&mut TerminalPrompt)
        .context("resolve parameters")?;
    let destination = Destination::choose(args.output.as_deref(), &params);
    let sink = destination.open()?;

    let runner = SqlPlusRunner::new(&args.sqlplus).with_timeout(args.timeout.map(Duration::from_secs));
    let scorer = TemporalScorer::new(runner);
    let mut run = scorer
        .compute_scores(&drug_ids, &cond_ids, &params)
        .context("compute temporal scores")?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let output = run
            .script_output
            .output_text()
            .context("read SQL*Plus output")?;
        debug!("SQL*Plus output:\n{output}");
    }

    info!(destination = %destination, "Writing report");
    sink.write(&mut run.report, args.precision)?;
    info!("Done");
    Ok(())
}

/// Host name from the environment, where shells and Windows put it.
fn host_name() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .find_map(|var| std::env::var(var).ok().filter(|name| !name.is_empty()))
}

/// `host/pid`, identifying this run in logs shared between machines.
pub(crate) fn run_identifier(host: Option<&str>, pid: u32) -> String {
    format!("{}/{pid}", host.unwrap_or("unknown"))
}
