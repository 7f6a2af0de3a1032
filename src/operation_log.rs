use anyhow::Result;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::NetworkProfile;

const OPERATION_LOG_FILE: &str = "operation_log.txt";

/// Directory where app data is stored (same as settings)
pub fn app_data_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join("scroll-wallet"),
        None => PathBuf::from("."),
    }
}

/// Append-only record of finished transfers and network switches.
#[derive(Debug, Clone)]
pub struct OperationLog {
    path: PathBuf,
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::at(app_data_dir().join(OPERATION_LOG_FILE))
    }
}

impl OperationLog {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a structured entry describing a completed operation.
    pub fn append(
        &self,
        operation: &str,
        network: NetworkProfile,
        details: impl AsRef<str>,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(
            file,
            "[{}] chain_id={} network={} operation={}",
            Utc::now().to_rfc3339(),
            network.chain_id(),
            network.as_str(),
            operation
        )?;

        let body = details.as_ref();
        if body.trim().is_empty() {
            writeln!(file, "  (no additional details)")?;
        } else {
            for line in body.lines() {
                if line.trim().is_empty() {
                    writeln!(file)?;
                } else {
                    writeln!(file, "  {}", line)?;
                }
            }
        }

        writeln!(file)?;
        Ok(())
    }

    /// Read the entire log, empty if nothing was written yet
    pub fn read(&self) -> Result<String> {
        if self.path.exists() {
            Ok(fs::read_to_string(&self.path)?)
        } else {
            Ok(String::new())
        }
    }
}
