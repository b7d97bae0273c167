use colored::*;
use console::Term;
use std::fmt::Display;

/// Terminal output for people. Diagnostics go through `log` instead.
/// Green (46, 204, 113) is the brand color, amber (241, 196, 15) marks remote URLs.
pub struct Logger;

impl Logger {
    /// Prints an info message with a bullet point.
    pub fn info<T: Display>(msg: T) {
        println!("{} {}", "•".truecolor(46, 204, 113).bold(), msg);
    }

    pub fn success<T: Display>(msg: T) {
        println!("{} {}", "✔".green().bold(), msg);
    }

    /// Errors go to stderr so piping `endget list` stays clean.
    pub fn error<T: Display>(msg: T) {
        eprintln!("{} {}", "✖".red().bold(), msg);
    }

    /// Warnings go to stderr too. Use sparingly or people stop reading them.
    pub fn warn<T: Display>(msg: T) {
        eprintln!("{} {}", "⚠".yellow().bold(), msg);
    }

    /// Section header, underlined. Skipped when stdout is not a terminal.
    pub fn header<T: Display>(msg: T) {
        if !Term::stdout().is_term() {
            return;
        }
        println!("\n{}", msg.to_string().truecolor(46, 204, 113).bold().underline());
    }

    /// "command description", command in brand color and description dimmed.
    pub fn command<T: Display>(cmd: &str, msg: T) {
        println!(
            "{} {}",
            cmd.truecolor(46, 204, 113).bold(),
            msg.to_string().dimmed()
        );
    }

    pub fn highlight<T: Display>(msg: T) -> String {
        msg.to_string().truecolor(46, 204, 113).bold().to_string()
    }

    /// Remote URLs get their own color so it is obvious where code comes from.
    pub fn remote<T: Display>(msg: T) -> String {
        msg.to_string().truecolor(241, 196, 15).to_string()
    }

    pub fn dim<T: Display>(msg: T) -> String {
        msg.to_string().dimmed().to_string()
    }
}
