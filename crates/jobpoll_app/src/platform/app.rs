use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use jobpoll_core::{
    update, AppState, AppViewModel, CalculationStatus, Msg, PageCursor, SearchQuery, StatusFilter,
};
use jobpoll_logging::{poll_debug, LogDestination};
use log::LevelFilter;

use super::config;
use super::effects::EffectRunner;
use super::render;

const EVENT_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(
    name = "jobpoll",
    version,
    about = "Run contact searches and broadcast recipient counts against the platform API"
)]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, default_value = "jobpoll.ron")]
    config: PathBuf,
    /// Overrides `base_url` from the configuration file.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    log: LogTarget,
    #[arg(long, default_value = "jobpoll.log")]
    log_file: PathBuf,
    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogTarget {
    Terminal,
    File,
    Both,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search the contacts of a list.
    Search {
        #[arg(long)]
        list: String,
        #[arg(long, default_value = "")]
        term: String,
        /// all, active, unsubscribed, complained, bounced or soft.
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
        /// Page after this row key.
        #[arg(long, conflicts_with = "before")]
        after: Option<String>,
        /// Page before this row key.
        #[arg(long)]
        before: Option<String>,
    },
    /// Count the recipients of a broadcast after suppression.
    Calculate {
        #[arg(long)]
        broadcast: String,
    },
}

impl Command {
    fn initial_msg(&self) -> Msg {
        match self {
            Command::Search {
                list,
                term,
                filter,
                after,
                before,
            } => {
                let cursor = match (after, before) {
                    (Some(key), _) => Some(PageCursor::After(key.clone())),
                    (None, Some(key)) => Some(PageCursor::Before(key.clone())),
                    (None, None) => None,
                };
                Msg::QuerySubmitted {
                    list_id: list.clone(),
                    query: SearchQuery::new(term.clone(), *filter).with_cursor(cursor),
                }
            }
            Command::Calculate { broadcast } => Msg::CalculateRequested {
                broadcast_id: broadcast.clone(),
            },
        }
    }
}

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let destination = match cli.log {
        LogTarget::Terminal => LogDestination::Terminal,
        LogTarget::File => LogDestination::File,
        LogTarget::Both => LogDestination::Both,
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    jobpoll_logging::initialize(destination, level, &cli.log_file);

    let app_config = config::load(&cli.config)?;
    let settings = app_config
        .engine_settings(cli.base_url.as_deref())
        .context("invalid engine settings")?;
    let runner = EffectRunner::new(&settings).context("failed to start engine")?;

    let mut state = dispatch(AppState::new(), cli.command.initial_msg(), &runner);
    while is_waiting(&state.view()) {
        if let Some(event) = runner.next_event(EVENT_WAIT) {
            poll_debug!("engine event {:?}", event);
            state = dispatch(state, event.into_msg(), &runner);
        } else if !runner.is_running() {
            bail!("engine stopped before the job finished");
        }
    }

    let view = state.view();
    dispatch(state, Msg::ViewDisposed, &runner);

    println!("{}", report(&cli.command, &view)?);
    Ok(())
}

/// Rendered result, or the failure notice as the error.
fn report(command: &Command, view: &AppViewModel) -> anyhow::Result<String> {
    if let Some(notice) = &view.notice {
        bail!("{notice}");
    }
    Ok(match command {
        Command::Search { .. } => render::render_search(&view.search),
        Command::Calculate { .. } => render::render_calculation(&view.calculation),
    })
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.enqueue(effects);
    state
}

fn is_waiting(view: &AppViewModel) -> bool {
    view.search.is_loading() || view.calculation.status == CalculationStatus::Calculating
}
