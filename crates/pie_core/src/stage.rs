use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dialogue::DialogueGraph;
use crate::order::OrderRule;
use crate::run_state::{FIRST_STAGE_ID, LAST_STAGE_ID};

/// One line of speech with optional speaker and sprite-state tags for the
/// presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLine {
    #[serde(default)]
    pub speaker: Option<String>,
    pub text: String,
    #[serde(default)]
    pub sprite: Option<String>,
}

/// UI placement hint carried in stage documents. Not interpreted by the
/// core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub order: OrderRule,
    pub success_line: SpokenLine,
    pub fail_line: SpokenLine,
    #[serde(default)]
    pub pre_dialogue: Vec<SpokenLine>,
    #[serde(default)]
    pub dialogue: Option<DialogueGraph>,
}

/// One stage document, loaded once per hall visit and immutable for its
/// duration. Every field is either required or defaulted here; nothing
/// downstream patches holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageData {
    pub id: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub counter_anchor: Option<Anchor>,
    #[serde(default)]
    pub door_anchor: Option<Anchor>,
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub epilogue: Vec<SpokenLine>,
}

impl StageData {
    /// The customer whose order gates the stage. Validation guarantees at
    /// least one customer, so indexing cannot fail on a loaded stage.
    pub fn lead_customer(&self) -> &Customer {
        &self.customers[0]
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage {id} not found at {path}")]
    NotFound { id: u8, path: PathBuf },
    #[error("failed to read stage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse stage file {path} at {json_path}: {message}")]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("invalid stage file {path}: {message}")]
    Validation { path: PathBuf, message: String },
}

pub fn stage_file_path(stages_dir: &Path, id: u8) -> PathBuf {
    stages_dir.join(format!("stage_{id}.json"))
}

/// Load and validate the document for one stage. A missing file is fatal
/// for entering that stage; there is no retry and no fallback stage.
pub fn load_stage(stages_dir: &Path, id: u8) -> Result<StageData, StageError> {
    let path = stage_file_path(stages_dir, id);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(StageError::NotFound { id, path });
        }
        Err(source) => return Err(StageError::Io { path, source }),
    };
    let stage = parse_stage_json(&raw, &path)?;
    validate_stage(&stage, id, &path)?;
    debug!(stage_id = stage.id, path = %path.display(), "stage_document_loaded");
    Ok(stage)
}

fn parse_stage_json(raw: &str, path: &Path) -> Result<StageData, StageError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, StageData>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        let source = error.into_inner();
        StageError::Parse {
            path: path.to_path_buf(),
            json_path: if json_path.is_empty() || json_path == "." {
                "document root".to_string()
            } else {
                json_path
            },
            message: source.to_string(),
        }
    })
}

fn validate_stage(stage: &StageData, requested_id: u8, path: &Path) -> Result<(), StageError> {
    let validation = |message: String| StageError::Validation {
        path: path.to_path_buf(),
        message,
    };

    if !(FIRST_STAGE_ID..=LAST_STAGE_ID).contains(&stage.id) {
        return Err(validation(format!(
            "stage id {} outside {FIRST_STAGE_ID}..={LAST_STAGE_ID}",
            stage.id
        )));
    }
    if stage.id != requested_id {
        return Err(validation(format!(
            "expected stage id {requested_id}, got {}",
            stage.id
        )));
    }
    if stage.customers.is_empty() {
        return Err(validation("stage has no customers".to_string()));
    }
    for (index, customer) in stage.customers.iter().enumerate() {
        if let Some(dialogue) = &customer.dialogue {
            dialogue
                .validate()
                .map_err(|message| validation(format!("customers[{index}].dialogue: {message}")))?;
        }
    }
    Ok(())
}
