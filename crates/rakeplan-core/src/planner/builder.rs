//! Builder for creating and configuring Planner instances.

use std::path::{Path, PathBuf};

use super::Planner;
use crate::error::{PlannerError, Result};

/// Builder for creating and configuring Planner instances.
#[derive(Debug, Clone, Default)]
pub struct PlannerBuilder {
    database_path: Option<PathBuf>,
    exports_dir: Option<PathBuf>,
}

impl PlannerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/rakeplan/rakeplan.db` or
    /// `~/.local/share/rakeplan/rakeplan.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the directory that receives lock exports.
    ///
    /// Defaults to an `exports` directory next to the database file.
    pub fn with_exports_dir<P: AsRef<Path>>(mut self, dir: Option<P>) -> Self {
        if let Some(dir) = dir {
            self.exports_dir = Some(dir.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the configured planner instance.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileSystem` if a directory cannot be created
    /// Returns `PlannerError::Database` if database initialization fails
    pub async fn build(self) -> Result<Planner> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };
        let data_dir = db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let exports_dir = self.exports_dir.unwrap_or_else(|| data_dir.join("exports"));

        for dir in [&data_dir, &exports_dir] {
            if dir.as_os_str().is_empty() {
                continue;
            }
            std::fs::create_dir_all(dir).map_err(|e| PlannerError::FileSystem {
                path: dir.clone(),
                source: e,
            })?;
        }

        let planner = Planner::new(db_path, exports_dir);
        // Opening once up front surfaces schema errors at startup
        planner.with_db(|_| Ok(())).await?;
        log::debug!("planner ready at {}", planner.db_path.display());

        Ok(planner)
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("rakeplan")
            .place_data_file("rakeplan.db")
            .map_err(|e| PlannerError::XdgDirectory(e.to_string()))
    }
}
