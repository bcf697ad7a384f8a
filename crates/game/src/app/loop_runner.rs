use std::process::ExitCode;

use engine::run_app;
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.paths, app.factory, app.initial_scene) {
        error!(error = %err, "app_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
