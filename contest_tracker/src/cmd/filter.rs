use crate::{
    cmd::TargetPlatform,
    modules::{config::Config, render::render_preferences},
};
use anyhow::Result;
use clap::{Args, Subcommand};
use contest_tracker_libs::{ContestApi, ContestBoard, Platform};

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[command(subcommand)]
    action: Option<FilterAction>,
}

#[derive(Debug, Subcommand)]
enum FilterAction {
    /// Print the current filter
    Show,
    /// Select or deselect a platform
    Toggle {
        #[arg(value_enum)]
        platform: TargetPlatform,
    },
    /// Deselect every platform
    Clear,
    /// Select every platform
    All,
    /// Switch between all contests and bookmarked contests only
    Bookmarked,
}

/// Applies `action` to the board. Platform changes refetch both lists, the
/// other actions stay local. Returns whether the lists were refetched.
async fn apply<A: ContestApi>(board: &mut ContestBoard<A>, action: FilterAction) -> bool {
    match action {
        FilterAction::Show => false,
        FilterAction::Bookmarked => {
            board.toggle_bookmarked();
            false
        }
        FilterAction::Toggle { platform } => {
            board.toggle_platform(Platform::from(platform)).await;
            true
        }
        FilterAction::Clear => {
            board.clear_platforms().await;
            true
        }
        FilterAction::All => {
            board.select_all_platforms().await;
            true
        }
    }
}

pub async fn run(args: FilterArgs, config: &Config) -> Result<()> {
    let mut board = config.board()?;
    let refetched = apply(&mut board, args.action.unwrap_or(FilterAction::Show)).await;

    println!("{}", render_preferences(board.preferences()));
    if refetched {
        println!(
            "{} upcoming and {} past contests visible.",
            board.visible_upcoming().len(),
            board.visible_past().len()
        );
    }

    Ok(())
}
