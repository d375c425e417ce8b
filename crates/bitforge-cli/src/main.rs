mod dispatch;
mod flows;
mod provider_http;
mod render;

#[cfg(test)]
mod tests;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bitforge_core::PackageError;
use clap::Parser;

fn main() -> ExitCode {
    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = Arc::clone(&interrupt);
        // the download loop polls the flag between chunks
        if let Err(err) = ctrlc::set_handler(move || interrupt.store(true, Ordering::SeqCst)) {
            let style = render::current_output_style();
            render::print_warning(style, &format!("Ctrl-C handling is unavailable: {err}"));
        }
    }

    let cli = dispatch::Cli::parse();
    match dispatch::run_cli(cli, &interrupt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render::print_error(&err);
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<PackageError>())
                .map(PackageError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}
