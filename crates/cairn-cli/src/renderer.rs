//! Terminal rendering of the markdown produced by the display layer.
//!
//! Rich output goes through a termimad skin; `--no-color` prints the
//! markdown unchanged, which is also what the CLI tests assert against.

use std::fmt::Display;

use termimad::{crossterm::style::Color, MadSkin};

/// Renders markdown either through termimad or as plain text.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Prints any displayable model or result wrapper.
    pub fn render(&self, value: &impl Display) {
        self.render_markdown(&value.to_string());
    }

    pub fn render_markdown(&self, markdown: &str) {
        if !self.rich_enabled {
            print!("{markdown}");
            return;
        }
        for line in markdown.lines() {
            // Headers keep their hashes so nesting stays visible.
            if line.starts_with('#') {
                println!("\x1b[36m{line}\x1b[0m");
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
