//! Terminal output utilities
//!
//! Colors are a property of the [`Printer`] value rather than global state:
//! `--no-color` builds a printer with colors off and that printer is handed
//! to every command.

use console::{Style, StyledObject};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Styled status output for commands
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    colors: bool,
}

impl Printer {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    /// Colors on unless disabled or stdout is not a terminal
    pub fn from_flag(no_color: bool) -> Self {
        Self::new(!no_color && console::colors_enabled())
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    fn paint<D>(&self, style: Style, value: D) -> StyledObject<D> {
        style.force_styling(self.colors).apply_to(value)
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{}: {}", self.paint(Style::new().red().bold(), "error"), message);
    }

    /// Print a warning message to stderr
    pub fn warning(&self, message: &str) {
        eprintln!("{}: {}", self.paint(Style::new().yellow().bold(), "warning"), message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{}: {}", self.paint(Style::new().green().bold(), "success"), message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}: {}", self.paint(Style::new().blue().bold(), "info"), message);
    }

    /// Highlighted step header, e.g. "Applying clang-format..."
    pub fn step(&self, message: &str) {
        println!("{}", self.paint(Style::new().reverse(), message));
    }

    /// Step header followed by a green "Done"
    pub fn step_done(&self, message: &str) {
        println!(
            "{} {}",
            self.paint(Style::new().reverse(), message),
            self.paint(Style::new().green(), "Done")
        );
    }

    /// A path or command rendered in the accent color
    pub fn accent(&self, text: &str) -> String {
        self.paint(Style::new().cyan(), text).to_string()
    }

    /// Create a progress bar with a known length; hidden when not a terminal
    pub fn progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
        let template = if self.colors {
            "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
        } else {
            "{msg} [{bar:40}] {pos}/{len} ({eta})"
        };
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message(message.to_string());
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_printer_has_no_escapes() {
        let printer = Printer::new(false);
        assert_eq!(printer.accent("cmake"), "cmake");
    }

    #[test]
    fn test_colored_printer_emits_escapes() {
        let printer = Printer::new(true);
        assert!(printer.accent("cmake").contains("\u{1b}["));
    }
}
