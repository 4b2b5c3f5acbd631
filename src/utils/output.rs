use colored::*;

use crate::messages::{Lang, Message};

pub struct OutputStyle;

impl OutputStyle {
    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn info(text: &str) -> ColoredString {
        text.blue()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn title(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn header_separator() -> String {
        "═".repeat(50)
    }

    pub fn print_header(title: &str) {
        println!("{}", Self::title(title));
        println!("{}", Self::header_separator());
    }

    pub fn print_field(label: &str, value: &str) {
        println!("{:>22}: {}", Self::label(label), value);
    }
}

/// Prints workflow milestones in the operator's language.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    lang: Lang,
}

impl Notifier {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn text(&self, message: Message) -> &'static str {
        message.text(self.lang)
    }

    pub fn info(&self, message: Message) {
        println!("{}", OutputStyle::info(self.text(message)));
    }

    pub fn success(&self, message: Message) {
        println!("✅ {}", OutputStyle::success(self.text(message)));
    }

    pub fn warn(&self, message: Message) {
        println!("⚠️  {}", OutputStyle::warning(self.text(message)));
    }

    pub fn error(&self, message: Message) {
        eprintln!("❌ {}", OutputStyle::error(self.text(message)));
    }

    /// `<subject> <message>`, e.g. `src/app.js Uploaded`.
    pub fn subject(&self, subject: &str, message: Message) {
        println!("{} {}", OutputStyle::muted(subject), self.text(message));
    }
}
