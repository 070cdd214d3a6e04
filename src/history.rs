use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::app_dirs::AppDirs;

/// One completed run, as written to the history log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub finished_at: DateTime<Local>,
    pub questions: usize,
    pub wrong_attempts: u32,
    pub skips: u32,
    pub elapsed_secs: f64,
}

impl RunRecord {
    /// "3 minutes ago"-style rendering of the finish time
    pub fn finished_ago(&self) -> String {
        let elapsed = Local::now()
            .signed_duration_since(self.finished_at)
            .to_std()
            .unwrap_or_default();
        HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
    }
}

/// Append-only CSV log of completed runs
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::history_path().unwrap_or_else(|| PathBuf::from("mathdash_history.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &RunRecord) -> csv::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Emit the header only when the log is new
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// All recorded runs, oldest first. Missing or unreadable files read as
    /// an empty history; damaged rows are dropped.
    pub fn load(&self) -> Vec<RunRecord> {
        let reader = match csv::Reader::from_path(&self.path) {
            Ok(reader) => reader,
            Err(_) => return Vec::new(),
        };
        reader
            .into_deserialize()
            .filter_map(|row| row.ok())
            .collect()
    }

    pub fn last_run(&self) -> Option<RunRecord> {
        self.load().into_iter().last()
    }

    pub fn best_run(&self) -> Option<RunRecord> {
        self.load()
            .into_iter()
            .sorted_by(|a, b| {
                a.elapsed_secs
                    .partial_cmp(&b.elapsed_secs)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .next()
    }
}
