use crate::modules::config::Config;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct BookmarkArgs {
    /// Identifier of the contest to bookmark or unbookmark
    contest_id: String,
}

pub async fn run(args: BookmarkArgs, config: &Config) -> Result<()> {
    let mut board = config.board()?;
    board.refresh().await;

    match board.toggle_bookmark(&args.contest_id).await {
        Ok(contest) if contest.is_bookmarked => println!("Contest bookmarked: {}", contest.name),
        Ok(contest) => println!("Bookmark removed: {}", contest.name),
        Err(e) => {
            tracing::error!("Failed to update bookmark: {:?}", e);
            return Err(anyhow::anyhow!(e));
        }
    }

    Ok(())
}
