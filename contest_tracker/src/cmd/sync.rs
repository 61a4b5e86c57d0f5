use crate::modules::config::Config;
use anyhow::Result;
use clap::Args;

const DEFAULT_SYNC_MESSAGE: &str = "Contests synchronized successfully";

#[derive(Debug, Args)]
pub struct SyncArgs {}

pub async fn run(_args: SyncArgs, config: &Config) -> Result<()> {
    let board = config.board()?;

    let response = match board.sync().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to synchronize contests: {:?}", e);
            return Err(anyhow::anyhow!(e));
        }
    };

    if response.message.is_empty() {
        println!("{}", DEFAULT_SYNC_MESSAGE);
    } else {
        println!("{}", response.message);
    }

    Ok(())
}
