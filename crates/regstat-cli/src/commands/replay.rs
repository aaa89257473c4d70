//! Replay command: apply a saved notification payload.
//!
//! Every store write is an idempotent upsert, so payloads the listener missed
//! (or already processed) can be applied again safely.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use regstat_server::DispatchSummary;

use super::WorkflowArgs;

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Notification envelope files, processed in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub output: String,

    #[command(flatten)]
    pub workflow: WorkflowArgs,
}

/// Execute the replay command.
pub async fn execute(args: ReplayArgs) -> Result<()> {
    let (dispatcher, _store) = args.workflow.dispatcher().await?;

    let mut total = DispatchSummary::default();
    for file in &args.files {
        let body = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let summary = dispatcher
            .process_payload(&body)
            .await
            .with_context(|| format!("Failed to process {}", file.display()))?;

        if args.output != "json" {
            print_summary(&file.display().to_string(), &summary);
        }
        total.handled += summary.handled;
        total.skipped += summary.skipped;
        total.failed += summary.failed;
    }

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&total)?);
    } else if args.files.len() > 1 {
        print_summary("total", &total);
    }

    if total.failed > 0 {
        anyhow::bail!("{} event(s) failed", total.failed);
    }
    Ok(())
}

fn print_summary(label: &str, summary: &DispatchSummary) {
    println!(
        "{label}: {} events, {} recorded, {} skipped, {} failed",
        summary.total(),
        summary.handled,
        summary.skipped,
        summary.failed
    );
}
