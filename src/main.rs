use std::process::ExitCode;

use argus::ui::output;

/// Exit status for an interrupted command (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    match argus::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            if argus::cli::is_interrupted(&err) {
                ExitCode::from(EXIT_INTERRUPTED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
