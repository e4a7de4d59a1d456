//! Per-run file loggers.
//!
//! Each run writes two independent log streams: a progress log and a
//! result log, at paths derived from the model-selection tag. Setup
//! deletes any pre-existing file at those paths (best-effort), so a rerun
//! starts from empty logs. These streams are plain file writers and never
//! feed the tracing registry.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::ModelSelection;

/// A timestamped line-oriented file logger.
pub struct RunLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RunLog {
    /// Create a logger at `path`, removing any previous file first.
    fn create(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Best-effort cleanup of a previous run's log.
        let _ = std::fs::remove_file(&path);

        let file = File::create(&path)
            .map_err(|e| anyhow::anyhow!("failed to create log file {}: {e}", path.display()))?;
        Ok(RunLog {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Append one timestamped line and flush it to disk.
    pub fn log(&mut self, message: &str) -> anyhow::Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(self.writer, "{timestamp}:\t{message}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create the run and result loggers for a model selection.
///
/// Paths are `<dir>/<core>_run.log` and `<dir>/<core>_res.log`. Calling
/// this twice leaves only the second call's content on disk.
pub fn setup_loggers(dir: &Path, selection: &ModelSelection) -> anyhow::Result<(RunLog, RunLog)> {
    let core = selection.core_path();
    let run_path = dir.join(format!("{core}_run.log"));
    let res_path = dir.join(format!("{core}_res.log"));

    let run_log = RunLog::create(run_path)?;
    let res_log = RunLog::create(res_path)?;

    tracing::info!(
        run = %run_log.path().display(),
        res = %res_log.path().display(),
        "Log files ready"
    );

    Ok((run_log, res_log))
}
