use std::env;
use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputStyle {
    Plain,
    Rich,
}

pub fn current_output_style() -> OutputStyle {
    let no_color = env::var_os("BITFORGE_NO_COLOR").is_some() || env::var_os("NO_COLOR").is_some();
    if !no_color && std::io::stdout().is_terminal() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub fn print_status(style: OutputStyle, status: &str, message: &str) {
    println!("{}", render_status_line(style, status, message));
}

pub fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("{status}: {message}"),
        OutputStyle::Rich => {
            format!("{} {message}", colorize(status_style(status), status))
        }
    }
}

pub fn print_warning(style: OutputStyle, message: &str) {
    eprintln!("{}", warning_line(style, message));
}

pub(crate) fn warning_line(style: OutputStyle, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("warning: {message}"),
        OutputStyle::Rich => {
            format!("{} {message}", colorize(status_style("warning"), "warning:"))
        }
    }
}

pub fn print_error(err: &anyhow::Error) {
    let style = current_output_style();
    let prefix = match style {
        OutputStyle::Plain => "error:".to_string(),
        OutputStyle::Rich => colorize(status_style("error"), "error:"),
    };
    eprintln!("{prefix} {err:#}");
}

/// Byte progress for one package download. Plain mode stays silent while
/// streaming and prints nothing until the surrounding flow reports the
/// outcome.
pub struct DownloadProgress {
    bar: Option<ProgressBar>,
}

impl DownloadProgress {
    pub fn start(style: OutputStyle, label: &str) -> Self {
        let bar = if style == OutputStyle::Rich {
            let bar = ProgressBar::new(1);
            if let Ok(template) = ProgressStyle::with_template(
                "{msg:<20} [{bar:24.cyan/blue}] {bytes:>9}/{total_bytes:9}",
            ) {
                bar.set_style(template.progress_chars("=>-"));
            }
            bar.set_message(label.to_string());
            Some(bar)
        } else {
            None
        };
        Self { bar }
    }

    /// `total` is 0 while the server has not declared a content length.
    pub fn update(&self, done: u64, total: u64) {
        let Some(bar) = &self.bar else {
            return;
        };
        bar.set_length(total.max(done).max(1));
        bar.set_position(done);
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "error" => AnsiColor::BrightRed,
        "warning" => AnsiColor::BrightYellow,
        "installed" | "uninstalled" | "fixed" | "ok" => AnsiColor::BrightGreen,
        _ => AnsiColor::BrightBlue,
    };
    Style::new().fg_color(Some(color.into())).effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
