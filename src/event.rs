use crossterm::event::KeyEvent;

use crate::message::Message;

#[derive(Debug, Clone)]
pub enum Event {
    Tick,
    Render,
    Key(KeyEvent),
}

impl Event {
    /// The message this event delivers to the state machine. Render events
    /// are handled by the driver and never reach it.
    pub fn into_message(self) -> Option<Message> {
        match self {
            Event::Tick => Some(Message::Tick),
            Event::Key(key) => Some(Message::Key(key)),
            Event::Render => None,
        }
    }
}
