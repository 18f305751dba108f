use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{Event as CrosstermEvent, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use ratatui::{Terminal, TerminalOptions, Viewport};
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::event::Event;
use crate::message::Message;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode with an inline viewport of `height` lines below the prompt, so
/// printed lines can scroll past above it.
pub fn init(height: u16) -> io::Result<Tui> {
    enable_raw_mode()?;
    Terminal::with_options(
        CrosstermBackend::new(io::stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(height),
        },
    )
}

pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), cursor::Show)?;
    println!();
    Ok(())
}

/// Insert a line into the scrollback above the viewport.
pub fn print_above(terminal: &mut Tui, text: &str) -> io::Result<()> {
    let line = Line::raw(text.to_string());
    terminal.insert_before(1, |buf| {
        Paragraph::new(line).render(buf.area, buf);
    })
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(read_events(tx, cancel.clone(), tick_rate, render_rate));
        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// What the driver does with its next input
#[derive(Debug, PartialEq, Eq)]
pub enum Turn {
    Update(Message),
    Draw,
    /// Terminal input is gone; nothing can reach the app any more.
    Stop,
}

/// Wait for the next terminal event or completed-command message.
///
/// `messages` stays open for as long as the driver holds its sender, so only
/// the end of terminal input stops the loop from here.
pub async fn next_turn(
    events: &mut EventHandler,
    messages: &mut mpsc::UnboundedReceiver<Message>,
) -> Turn {
    tokio::select! {
        event = events.next() => match event {
            Some(event) => event.into_message().map_or(Turn::Draw, Turn::Update),
            None => {
                tracing::info!("terminal input closed");
                Turn::Stop
            }
        },
        Some(msg) = messages.recv() => Turn::Update(msg),
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn read_events(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    render_rate: Duration,
) {
    let mut reader = EventStream::new();
    let mut ticks = interval(tick_rate);
    let mut renders = interval(render_rate);

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = renders.tick() => Event::Render,
            maybe = reader.next() => match maybe {
                Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                    Event::Key(key)
                }
                // resizes are picked up by the next draw
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "failed to read terminal event");
                    continue;
                }
                None => break,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}
