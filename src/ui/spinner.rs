use ratatui::style::{Color, Style};
use ratatui::text::Span;

const DOT_FRAMES: [&str; 8] = ["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "];

/// Braille dot spinner, advanced one frame per tick.
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % DOT_FRAMES.len();
    }

    pub fn glyph(&self) -> &'static str {
        DOT_FRAMES[self.frame]
    }

    pub fn view(&self) -> Span<'static> {
        Span::styled(self.glyph(), Style::default().fg(Color::Indexed(205)))
    }
}
