use pie_core::{resolve_app_paths, AppPaths, StartupError};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) paths: AppPaths,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== Piehouse Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        stages_dir = %paths.stages_dir.display(),
        "app_paths_resolved"
    );
    Ok(AppWiring { paths })
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
