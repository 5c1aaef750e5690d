//! `AppRun`: resolve the invocation and hand over to the bundled tool.

use std::process::ExitCode;

fn main() -> ExitCode {
    apprun_cli::logging::init();

    let err = match apprun_cli::host_plan() {
        Ok(plan) => plan.launch(),
        Err(e) => e,
    };
    eprintln!("apprun: error: {err}");
    ExitCode::from(err.exit_code())
}
