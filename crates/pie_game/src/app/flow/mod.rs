use std::path::PathBuf;

use pie_core::{
    evaluate, CarriedPie, Ending, RunStateStore, SpokenLine, StageData, StageError, StateStorage,
    LAST_STAGE_ID,
};
use tracing::{debug, info};

include!("types.rs");
include!("kitchen.rs");
include!("hall.rs");
include!("game.rs");
