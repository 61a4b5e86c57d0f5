use crate::modules::{config::Config, render::NO_UPCOMING};
use anyhow::Result;
use clap::Args;
use contest_tracker_libs::{Clock, Contest, CountdownState, CountdownTimer, SystemClock};
use std::{collections::HashMap, sync::Arc};
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_stream::{wrappers::WatchStream, StreamExt, StreamMap};

/// How often the board is asked whether its lists went stale.
const STALE_CHECK_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Watch only the first N visible upcoming contests
    #[arg(long)]
    limit: Option<usize>,
    /// Refetch the contest lists after this many minutes
    #[arg(long, default_value_t = 5)]
    refresh_minutes: u64,
}

/// Running countdowns keyed by contest id.
struct Countdowns {
    clock: Arc<dyn Clock>,
    timers: HashMap<String, CountdownTimer>,
    names: HashMap<String, String>,
    states: StreamMap<String, WatchStream<CountdownState>>,
}

impl Countdowns {
    fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            timers: HashMap::new(),
            names: HashMap::new(),
            states: StreamMap::new(),
        }
    }

    /// Spawns timers for contests not watched yet and drops timers of
    /// contests that are gone. Returns how many were added and removed.
    fn reconcile(&mut self, contests: Vec<Contest>) -> (usize, usize) {
        let names: HashMap<String, String> = contests
            .iter()
            .map(|contest| (contest.id.clone(), contest.name.clone()))
            .collect();

        let gone: Vec<String> = self
            .timers
            .keys()
            .filter(|id| !names.contains_key(*id))
            .cloned()
            .collect();
        for id in &gone {
            self.timers.remove(id);
            self.states.remove(id);
        }

        let mut added = 0;
        for contest in contests {
            if self.timers.contains_key(&contest.id) {
                continue;
            }
            let timer = CountdownTimer::spawn(contest.start_time, self.clock.clone());
            self.states
                .insert(contest.id.clone(), WatchStream::new(timer.subscribe()));
            self.timers.insert(contest.id, timer);
            added += 1;
        }

        self.names = names;
        (added, gone.len())
    }

    fn name<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

fn visible(contests: Vec<Contest>, limit: Option<usize>) -> Vec<Contest> {
    match limit {
        Some(limit) => contests.into_iter().take(limit).collect(),
        None => contests,
    }
}

pub async fn run(args: WatchArgs, config: &Config) -> Result<()> {
    let mut board = config
        .board()?
        .with_stale_after(Duration::from_secs(args.refresh_minutes * 60));
    board.refresh().await;

    let mut countdowns = Countdowns::new(Arc::new(SystemClock));
    countdowns.reconcile(visible(board.visible_upcoming(), args.limit));
    if countdowns.is_empty() {
        println!("{}", NO_UPCOMING);
    }
    tracing::info!("Watching {} contests.", countdowns.timers.len());

    let mut stale_check = time::interval_at(
        time::Instant::now() + STALE_CHECK_PERIOD,
        STALE_CHECK_PERIOD,
    );
    stale_check.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some((id, state)) = countdowns.states.next(), if !countdowns.states.is_empty() => {
                println!("{}: {}", countdowns.name(&id), state);
            }
            _ = stale_check.tick() => {
                if board.refresh_if_stale().await {
                    let (added, removed) =
                        countdowns.reconcile(visible(board.visible_upcoming(), args.limit));
                    tracing::info!(
                        "Contest lists refreshed, {} countdowns added and {} removed.",
                        added,
                        removed
                    );
                }
            }
            _ = &mut shutdown => break,
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stop watching.");
}
