use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::task::Task;

#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let tasks_path = data_dir.join("tasks.json");

        info!(
            data_dir = %data_dir.display(),
            tasks = %tasks_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            tasks_path,
        })
    }

    /// Loads the full task snapshot. An absent or unparsable file yields an
    /// empty collection rather than an error.
    #[tracing::instrument(skip(self))]
    pub fn load_tasks(&self) -> Vec<Task> {
        let raw = match fs::read_to_string(&self.tasks_path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(
                    file = %self.tasks_path.display(),
                    error = %err,
                    "snapshot not readable; starting empty"
                );
                return Vec::new();
            }
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<Task>>(trimmed) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "loaded task snapshot");
                tasks
            }
            Err(err) => {
                warn!(
                    file = %self.tasks_path.display(),
                    error = %err,
                    "snapshot unparsable; starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Writes the full collection as one JSON array, atomically replacing the
    /// previous snapshot.
    #[tracing::instrument(skip(self, tasks))]
    pub fn save_tasks(&self, tasks: &[Task]) -> anyhow::Result<()> {
        debug!(
            file = %self.tasks_path.display(),
            count = tasks.len(),
            "saving snapshot atomically"
        );

        let dir = self
            .tasks_path
            .parent()
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        let serialized = serde_json::to_string(tasks)?;
        writeln!(temp, "{serialized}")?;
        temp.flush()?;

        temp.persist(&self.tasks_path).map_err(|err| {
            anyhow!("failed to persist {}: {}", self.tasks_path.display(), err)
        })?;

        Ok(())
    }

    pub fn next_id(&self, tasks: &[Task]) -> u64 {
        tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }
}
