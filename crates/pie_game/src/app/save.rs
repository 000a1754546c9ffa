use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pie_core::StateStorage;
use tracing::debug;

const SAVE_FILE_NAME: &str = "run_state.save.json";

/// Single-slot save storage over one JSON file in the cache directory.
/// Unreadable content behaves as an absent record; the run-state store
/// substitutes defaults on top, so nothing here ever reaches the player.
#[derive(Debug)]
pub(crate) struct SaveFileStorage {
    path: PathBuf,
}

impl SaveFileStorage {
    pub(crate) fn in_cache_dir(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join("saves").join(SAVE_FILE_NAME),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for SaveFileStorage {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Some(raw),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                debug!(
                    path = %self.path.display(),
                    error = %error,
                    "save_read_failed_treated_as_absent"
                );
                None
            }
        }
    }

    fn store(&mut self, raw: &str) -> io::Result<()> {
        write_text_atomic(&self.path, raw)
    }
}

/// Write via a sibling temp file and rename so a crash mid-write cannot
/// leave a truncated save behind.
fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;

    match fs::remove_file(path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(error);
        }
    }
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(SAVE_FILE_NAME);
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}
