// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Uploader command line tool
//!
//! Signs in to Garmin Connect with credentials from the environment and
//! uploads activity files or lists the account's activities.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use garmin_uploader::{
    config::Config, time_utils::format_rfc3339, ActivityUploader, Session, UploadOutcome,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "garmin-uploader")]
#[command(about = "Upload activity files to Garmin Connect")]
struct Cli {
    /// Emit JSON log lines
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload TCX, FIT or GPX files
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Name given to each newly created activity
        #[arg(long)]
        name: Option<String>,
    },
    /// List all activities on the account
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "garmin-uploader failed");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let (username, password) = config.credentials()?;
    let (username, password) = (username.to_string(), password.to_string());

    let mut session = Session::new(config).context("Failed to create session")?;
    let identity = session
        .try_sign_in(&username, &password)
        .context("Sign in failed")?;
    tracing::info!(
        user_id = identity.user_id,
        user_name = %identity.user_name,
        "Signed in"
    );

    let uploader = ActivityUploader::new(&session);
    match command {
        Command::Upload { files, name } => upload(&uploader, &files, name.as_deref()),
        Command::List => list(&uploader),
    }
}

fn upload(
    uploader: &ActivityUploader<'_>,
    files: &[PathBuf],
    name: Option<&str>,
) -> anyhow::Result<()> {
    let mut failed = 0usize;

    for file in files {
        let outcome = match uploader.upload_file(file) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(path = %file.display(), error = %e, "Skipping file");
                failed += 1;
                continue;
            }
        };

        match &outcome {
            UploadOutcome::Success { activity_id } => {
                if let Some(name) = name {
                    if let Err(e) = uploader.rename_activity(*activity_id, name) {
                        tracing::error!(activity_id, error = %e, "Failed to name activity");
                        println!("FAIL\t{}\t{}", file.display(), e);
                        failed += 1;
                        continue;
                    }
                }
                println!(
                    "{}\t{}\t{}",
                    outcome.label(),
                    file.display(),
                    uploader.activity_url(*activity_id)
                );
            }
            UploadOutcome::Duplicate { activity_id } => {
                println!(
                    "{}\t{}\t{}",
                    outcome.label(),
                    file.display(),
                    uploader.activity_url(*activity_id)
                );
            }
            UploadOutcome::Failure { reason } => {
                println!("{}\t{}\t{}", outcome.label(), file.display(), reason);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} uploads failed", failed, files.len());
    }
    Ok(())
}

fn list(uploader: &ActivityUploader<'_>) -> anyhow::Result<()> {
    let activities = uploader
        .list_activities()
        .context("Failed to list activities")?;
    tracing::info!(count = activities.len(), "Activities fetched");

    for activity in &activities {
        println!(
            "{}\t{}\t{}\t{:.2} km\t{:.0} s\t{}",
            activity.id(),
            format_rfc3339(activity.begin()),
            activity.activity_type(),
            activity.distance_km(),
            activity.duration_secs(),
            activity.name()
        );
    }
    Ok(())
}

/// Initialize logging to stderr, as JSON when requested.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("garmin_uploader=debug,info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
