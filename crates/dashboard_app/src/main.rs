mod commands;
mod config;
mod effects;
mod render;

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use dashboard_core::{update, AppState, Msg};
use dashboard_logging::dash_info;

use crate::commands::{parse_line, UserCommand, HELP_TEXT};
use crate::config::AppConfig;
use crate::effects::EffectRunner;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_args(
        std::env::args().skip(1),
        std::env::var("DASHBOARD_API_URL").ok(),
    )
    .map_err(|message| anyhow::anyhow!(message))?;
    init_logging(config.verbose)?;
    dash_info!("dashboard starting against {}", config.api_url);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.engine_config(), msg_tx.clone())?;
    let line_rx = spawn_stdin_reader();

    let mut state = AppState::new();
    let (next, effects) = update(state, Msg::RefreshRequested);
    state = next;
    runner.enqueue(effects);

    println!("document dashboard ({})", config.api_url);
    println!("type 'help' for commands");

    'outer: loop {
        let mut idle = true;

        while let Ok(line) = line_rx.try_recv() {
            idle = false;
            let Some(parsed) = parse_line(&line) else {
                continue;
            };
            let command = match parsed {
                Ok(command) => command,
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            };
            match command {
                UserCommand::Quit => break 'outer,
                UserCommand::Help => println!("{HELP_TEXT}"),
                UserCommand::List => render::render(&state.view()),
                other => {
                    if let Some(msg) = command_to_msg(&state, other) {
                        let (next, effects) = update(std::mem::take(&mut state), msg);
                        state = next;
                        runner.enqueue(effects);
                    }
                }
            }
        }

        while let Ok(msg) = msg_rx.try_recv() {
            idle = false;
            let (next, effects) = update(std::mem::take(&mut state), msg);
            state = next;
            runner.enqueue(effects);
        }

        if state.consume_dirty() {
            render::render(&state.view());
        }
        if idle {
            thread::sleep(Duration::from_millis(20));
        }
    }

    runner.shutdown();
    dash_info!("dashboard stopped");
    Ok(())
}

/// Translate a parsed command into a core message, resolving list indexes
/// against the current view.
fn command_to_msg(state: &AppState, command: UserCommand) -> Option<Msg> {
    match command {
        UserCommand::Refresh => Some(Msg::RefreshRequested),
        UserCommand::Open(index) => {
            let view = state.view();
            match view.documents.get(index - 1) {
                Some(row) => Some(Msg::DocumentSelected {
                    job_id: row.job_id.clone(),
                }),
                None => {
                    println!("no document #{index}");
                    None
                }
            }
        }
        UserCommand::Close => Some(Msg::SelectionCleared),
        UserCommand::Upload(path) => {
            let filename = std::path::Path::new(&path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.clone());
            Some(Msg::UploadRequested {
                filename,
                source: path,
            })
        }
        UserCommand::Ask(text) => {
            let Some(job_id) = state.active_job() else {
                println!("open a document first");
                return None;
            };
            Some(Msg::QuestionSubmitted {
                job_id: job_id.to_string(),
                text,
            })
        }
        UserCommand::Retry => {
            let Some(job_id) = state.active_job() else {
                println!("open a document first");
                return None;
            };
            Some(Msg::RetryProcessingRequested {
                job_id: job_id.to_string(),
            })
        }
        UserCommand::Chain(sentence_hash) => Some(Msg::SentenceChainRequested { sentence_hash }),
        UserCommand::Back => Some(Msg::SentenceChainDismissed),
        UserCommand::Dismiss => Some(Msg::NotificationDismissed),
        UserCommand::List | UserCommand::Help | UserCommand::Quit => None,
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simplelog::CombinedLogger::init(vec![simplelog::WriteLogger::new(
        level,
        simplelog::Config::default(),
        std::fs::File::create("dashboard.log")?,
    )])?;
    Ok(())
}
