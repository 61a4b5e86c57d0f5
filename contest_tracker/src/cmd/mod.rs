pub mod bookmark;
pub mod filter;
pub mod list;
pub mod solution;
pub mod sync;
pub mod watch;

use crate::modules::render::Tab;
use clap::ValueEnum;
use contest_tracker_libs::Platform;

#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum TargetPlatform {
    Codeforces,
    Codechef,
    Leetcode,
}

impl From<TargetPlatform> for Platform {
    fn from(platform: TargetPlatform) -> Self {
        match platform {
            TargetPlatform::Codeforces => Platform::Codeforces,
            TargetPlatform::Codechef => Platform::Codechef,
            TargetPlatform::Leetcode => Platform::Leetcode,
        }
    }
}

#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum TargetTab {
    Upcoming,
    Past,
}

impl From<TargetTab> for Tab {
    fn from(tab: TargetTab) -> Self {
        match tab {
            TargetTab::Upcoming => Tab::Upcoming,
            TargetTab::Past => Tab::Past,
        }
    }
}
