use crate::modules::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use validator::Validate;

#[derive(Debug, Args)]
pub struct SolutionArgs {
    /// Identifier of a past contest
    contest_id: String,
    /// Link to the solution or editorial
    url: String,
}

#[derive(Debug, Validate)]
struct SolutionInput {
    #[validate(url)]
    url: String,
}

pub async fn run(args: SolutionArgs, config: &Config) -> Result<()> {
    let url = args.url.trim();
    if url.is_empty() {
        tracing::info!("Empty solution url given, nothing to save.");
        return Ok(());
    }

    SolutionInput {
        url: url.to_string(),
    }
    .validate()
    .with_context(|| {
        let message = format!("`{}` is not a valid url", url);
        tracing::error!(message);
        message
    })?;

    let mut board = config.board()?;
    board.refresh().await;

    match board.save_solution(&args.contest_id, url).await {
        Ok(Some(contest)) => println!("Solution URL updated: {}", contest.name),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to update solution URL: {:?}", e);
            return Err(anyhow::anyhow!(e));
        }
    }

    Ok(())
}
