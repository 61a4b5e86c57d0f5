use crate::{
    cmd::TargetTab,
    modules::{
        config::Config,
        render::{render_list, Tab},
    },
};
use anyhow::Result;
use chrono::{Local, Utc};
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(value_enum, default_value = "upcoming")]
    tab: TargetTab,
}

pub async fn run(args: ListArgs, config: &Config) -> Result<()> {
    let mut board = config.board()?;
    board.refresh().await;

    let tab = Tab::from(args.tab);
    let contests = match tab {
        Tab::Upcoming => board.visible_upcoming(),
        Tab::Past => board.visible_past(),
    };
    println!("{}", render_list(&contests, tab, Utc::now(), &Local));

    Ok(())
}
