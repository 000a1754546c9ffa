use std::io;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::pie::CarriedPie;

pub const FIRST_STAGE_ID: u8 = 1;
pub const LAST_STAGE_ID: u8 = 7;

/// Cumulative delivery evaluation counts for the active run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStats {
    pub good: u32,
    pub bad: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ending {
    Good,
    Normal,
    Bad,
}

impl Ending {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Normal => "normal",
            Self::Bad => "bad",
        }
    }
}

impl RunStats {
    /// Ending classification, a pure function of the accumulated counts:
    /// no deliveries -> normal, flawless -> good, winless -> bad, mixed ->
    /// normal.
    pub fn ending(self) -> Ending {
        if self.good == 0 && self.bad == 0 {
            return Ending::Normal;
        }
        if self.bad == 0 {
            return Ending::Good;
        }
        if self.good == 0 {
            return Ending::Bad;
        }
        Ending::Normal
    }
}

/// Cross-stage progress for the single active run. One record, one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunState {
    pub stage_id: u8,
    pub stats: RunStats,
    pub carried_pie: Option<CarriedPie>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            stage_id: FIRST_STAGE_ID,
            stats: RunStats::default(),
            carried_pie: None,
        }
    }
}

impl RunState {
    /// Clamp persisted values back into the valid stage span. Together with
    /// the serde defaults this is the single normalization point: every
    /// record handed to business logic already satisfies the invariants.
    fn normalized(mut self) -> Self {
        let clamped = self.stage_id.clamp(FIRST_STAGE_ID, LAST_STAGE_ID);
        if clamped != self.stage_id {
            debug!(
                stage_id = self.stage_id,
                clamped, "run_state_stage_id_out_of_range_clamped"
            );
            self.stage_id = clamped;
        }
        self
    }
}

/// Storage port for the single keyed run record. The record is an opaque
/// serialized blob; the store layer owns its encoding.
pub trait StateStorage {
    fn load(&self) -> Option<String>;
    fn store(&mut self, raw: &str) -> io::Result<()>;
}

/// In-memory storage slot, used by tests and anywhere persistence across
/// processes is not wanted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Option<String>,
}

impl MemoryStorage {
    pub fn preloaded(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
        }
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.slot.clone()
    }

    fn store(&mut self, raw: &str) -> io::Result<()> {
        self.slot = Some(raw.to_string());
        Ok(())
    }
}

/// Single source of truth for run progress.
///
/// The persisted record is read and normalized exactly once when the store
/// opens; every mutating operation updates the cached record and writes it
/// through. A failed write is logged and never interrupts gameplay, so
/// later reads still observe the update within the session.
#[derive(Debug)]
pub struct RunStateStore<S: StateStorage> {
    storage: S,
    state: RunState,
}

impl<S: StateStorage> RunStateStore<S> {
    /// A missing or unparseable record silently falls back to the default
    /// state: stage 1, zero stats, no carried pie.
    pub fn open(storage: S) -> Self {
        let state = match storage.load() {
            Some(raw) => match serde_json::from_str::<RunState>(&raw) {
                Ok(state) => state.normalized(),
                Err(error) => {
                    warn!(error = %error, "run_state_unparseable_using_defaults");
                    RunState::default()
                }
            },
            None => RunState::default(),
        };
        Self { storage, state }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Wholesale replacement of the persisted record.
    pub fn set_state(&mut self, state: RunState) {
        self.state = state.normalized();
        self.persist();
    }

    pub fn reset_run(&mut self) {
        self.set_state(RunState::default());
    }

    pub fn set_carried_pie(&mut self, pie: CarriedPie) {
        self.state.carried_pie = Some(pie);
        self.persist();
    }

    /// Removes the carried pie, leaving stage and stats untouched.
    pub fn clear_carried_pie(&mut self) {
        self.state.carried_pie = None;
        self.persist();
    }

    pub fn record_evaluation(&mut self, ok: bool) {
        if ok {
            self.state.stats.good = self.state.stats.good.saturating_add(1);
        } else {
            self.state.stats.bad = self.state.stats.bad.saturating_add(1);
        }
        self.persist();
    }

    /// Advance to the next stage, clamped at the terminal stage. Calling
    /// this at the ceiling is a no-op returning the ceiling.
    pub fn advance_stage(&mut self) -> u8 {
        let next = self
            .state
            .stage_id
            .saturating_add(1)
            .min(LAST_STAGE_ID);
        if next != self.state.stage_id {
            self.state.stage_id = next;
            self.persist();
        }
        self.state.stage_id
    }

    pub fn compute_ending(&self) -> Ending {
        self.state.stats.ending()
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.state) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(error = %error, "run_state_encode_failed_keeping_in_memory");
                return;
            }
        };
        if let Err(error) = self.storage.store(&raw) {
            warn!(error = %error, "run_state_write_failed_keeping_in_memory");
        }
    }
}
