//! File/env discovery for `CortexConfig` (parsing location is a server concern;
//! the schema itself lives in `cortex-core::config`).

use std::path::{Path, PathBuf};

use cortex_core::CortexConfig;
use directories::ProjectDirs;

/// Resolution order: `--config <path>`, then `CORTEX_CONFIG` env var, then the
/// platform config dir (`cortex/config.toml`), then built-in defaults.
pub fn load(cli_path: Option<&Path>) -> anyhow::Result<CortexConfig> {
    let candidate = cli_path
        .map(|p| p.to_path_buf())
        .or_else(|| std::env::var_os("CORTEX_CONFIG").map(PathBuf::from));

    let path = match candidate {
        Some(p) => Some(p),
        None => default_config_path(),
    };

    let Some(path) = path else {
        tracing::info!("no config file found, using built-in defaults");
        return Ok(CortexConfig::default());
    };

    match std::fs::read_to_string(&path) {
        Ok(raw) => {
            let cfg = CortexConfig::from_toml(&raw)?;
            tracing::info!(path = %path.display(), "loaded configuration");
            Ok(cfg)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found, using built-in defaults");
            Ok(CortexConfig::default())
        }
        Err(err) => Err(err.into()),
    }
}

fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("dev", "cortex", "cortex")?;
    Some(dirs.config_dir().join("config.toml"))
}

pub fn default_db_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("dev", "cortex", "cortex")?;
    Some(dirs.data_dir().join("cortex.db"))
}
