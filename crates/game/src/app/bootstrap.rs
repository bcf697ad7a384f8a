use engine::{resolve_app_paths, AppPaths, LoopConfig, SceneFactory, SceneKey, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;
use super::tuning::{load_tuning, TuningError, TuningSource};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) factory: SceneFactory,
    pub(crate) initial_scene: SceneKey,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Lane Shine Startup ===");

    let paths = resolve_app_paths()?;
    let (tuning, source) = load_tuning(&paths)?;
    match &source {
        TuningSource::Defaults => info!("tuning_defaults"),
        TuningSource::File(path) => info!(path = %path.display(), "tuning_loaded"),
    }

    Ok(AppWiring {
        config: LoopConfig::default(),
        paths,
        factory: gameplay::build_scene_factory(tuning),
        initial_scene: SceneKey::Title,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
