mod app;
mod config;
mod error;
mod event;
mod fetch;
mod github;
mod message;
mod ratelimit;
mod tui;
mod types;
mod ui;

use std::fs::OpenOptions;
use std::panic;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::App;
use crate::config::{Config, GitHubConfig, LogConfig};
use crate::error::Result;
use crate::message::{Command, Message};
use crate::tui::{EventHandler, Tui, Turn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::load();
    init_logging(&config.log);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(config).await;
    let restored = tui::restore();

    match result.and(restored.map_err(Into::into)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "program failed");
            eprintln!("Error running program: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to a file; the terminal belongs to the UI. No file, no logging.
fn init_logging(log: &LogConfig) {
    let file = log.file_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });
    let Some(file) = file else {
        return;
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
}

async fn run(config: Config) -> Result<()> {
    let mut app = App::new(config.ui.table_height);
    let mut terminal = tui::init(app.table.outer_height() + ui::FOOTER_HEIGHT)?;

    // Completed commands report back through this channel
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
    let github = Arc::new(config.github);
    let mut events = EventHandler::new(config.ui.tick_rate(), config.ui.render_rate());

    execute(app.init(), &mut terminal, &msg_tx, &github)?;

    loop {
        let msg = match tui::next_turn(&mut events, &mut msg_rx).await {
            Turn::Update(msg) => msg,
            Turn::Draw => {
                terminal.draw(|frame| ui::render(frame, &app))?;
                continue;
            }
            Turn::Stop => break,
        };

        tracing::trace!(?msg, "update");
        if let Some(cmd) = app.update(msg) {
            execute(cmd, &mut terminal, &msg_tx, &github)?;
        }

        if app.should_quit {
            break;
        }
    }

    // Leave the final frame on screen
    terminal.draw(|frame| ui::render(frame, &app))?;
    Ok(())
}

fn execute(
    cmd: Command,
    terminal: &mut Tui,
    msg_tx: &mpsc::UnboundedSender<Message>,
    github: &Arc<GitHubConfig>,
) -> Result<()> {
    match cmd {
        Command::FetchIssues => {
            let tx = msg_tx.clone();
            let github = Arc::clone(github);
            tokio::spawn(async move {
                let msg = fetch::run(&github).await;
                tx.send(msg).ok();
            });
        }
        Command::Print(line) => tui::print_above(terminal, &line)?,
    }
    Ok(())
}
