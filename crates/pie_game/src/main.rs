use std::io;
use std::process::ExitCode;

use pie_core::RunStateStore;
use tracing::{error, info};

mod app;

use app::bootstrap;
use app::driver;
use app::flow::GameFlow;
use app::save::SaveFileStorage;

fn main() -> ExitCode {
    let wiring = match bootstrap::build_app() {
        Ok(wiring) => wiring,
        Err(error) => {
            error!(error = %error, "startup_failed");
            return ExitCode::from(1);
        }
    };

    let storage = SaveFileStorage::in_cache_dir(&wiring.paths.cache_dir);
    info!(save = %storage.path().display(), "save_slot_ready");
    let store = RunStateStore::open(storage);
    let mut flow = GameFlow::new(store, wiring.paths.stages_dir.clone());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(error) = driver::run_driver(&mut flow, stdin.lock(), &mut stdout) {
        error!(error = %error, "driver_io_failed");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
