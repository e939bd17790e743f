use std::process::ExitCode;

use engine::{run_app, LoopConfig, Scene, SpatialConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use super::gameplay;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene_a: Box<dyn Scene>,
    pub(crate) scene_b: Box<dyn Scene>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "farmstead_startup");

    let (scene_a, scene_b) = gameplay::build_scene_pair();
    let config = LoopConfig {
        spatial: SpatialConfig::from_env(),
        ..LoopConfig::default()
    };

    AppWiring {
        config,
        scene_a,
        scene_b,
    }
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.scene_a, app.scene_b) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
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
