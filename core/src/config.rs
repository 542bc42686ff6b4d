use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::{GeneratorKind, SolverKind};

const CONFIG_DIR: &str = "pathviz";
const CONFIG_FILE: &str = "config.toml";

fn default_rows() -> usize {
    21
}

fn default_columns() -> usize {
    21
}

fn default_step_interval_ms() -> u64 {
    35
}

fn default_request_timeout_ms() -> u64 {
    800
}

fn default_server_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_solver() -> SolverKind {
    SolverKind::Bfs
}

fn default_generator() -> GeneratorKind {
    GeneratorKind::Backtracker
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// User-facing configuration. Every field has a default, so a partial (or
/// absent) config file is fine.
///
/// Odd grid dimensions are recommended when pairing with a maze generator
/// that assumes odd parity; the defaults follow that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Delay between two animation steps, in milliseconds.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// Deadline for one remote invocation, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// `host:port` of the solver service.
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
    #[serde(default = "default_solver")]
    pub solver: SolverKind,
    #[serde(default = "default_generator")]
    pub generator: GeneratorKind,
}

impl Default for VizConfig {
    fn default() -> Self {
        VizConfig {
            rows: default_rows(),
            columns: default_columns(),
            step_interval_ms: default_step_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            server_addr: default_server_addr(),
            solver: default_solver(),
            generator: default_generator(),
        }
    }
}

impl VizConfig {
    /// The step interval as a duration, clamped so offsets stay strictly
    /// increasing even for a zeroed config value.
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    /// Platform config file location (`<config-dir>/pathviz/config.toml`),
    /// if a config directory exists at all.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the default config file when present, falling back to defaults
    /// when the file (or the whole config dir) does not exist. A file that
    /// exists but fails to parse is a real error.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: VizConfig = toml::from_str("rows = 9\nsolver = \"DFS\"").unwrap();
        assert_eq!(cfg.rows, 9);
        assert_eq!(cfg.columns, default_columns());
        assert_eq!(cfg.solver, SolverKind::Dfs);
        assert_eq!(cfg.generator, GeneratorKind::Backtracker);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg: VizConfig = toml::from_str("step_interval_ms = 0").unwrap();
        assert_eq!(cfg.step_interval(), Duration::from_millis(1));
    }

    #[test]
    fn load_from_reads_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "columns = 31\nserver_addr = \"10.0.0.2:9000\"").unwrap();
        let cfg = VizConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.columns, 31);
        assert_eq!(cfg.server_addr, "10.0.0.2:9000");
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rows = \"many\"").unwrap();
        assert!(matches!(
            VizConfig::load_from(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
