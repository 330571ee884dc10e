use std::path::{Path, PathBuf};

use brandkit::config::BrandkitConfig;
use brandkit::signal::EnvSignal;
use brandkit::{Error, Result};

pub mod plan;
pub mod run;
pub mod tasks;

/// Everything a command needs: the loaded configuration, the project root
/// the pipeline operates on, and the one-shot environment snapshot.
pub(crate) struct Context {
    pub config: BrandkitConfig,
    pub root: PathBuf,
    pub signal: EnvSignal,
}

pub(crate) fn load_context(config_path: Option<&str>) -> Result<Context> {
    let root = std::env::current_dir().map_err(|e| {
        Error::internal_io(e.to_string(), Some("resolve working directory".to_string()))
    })?;

    let config = match config_path {
        Some(path) => BrandkitConfig::load_from(Path::new(path))?,
        None => BrandkitConfig::load(&root)?,
    };

    Ok(Context {
        config,
        root,
        signal: EnvSignal::capture(),
    })
}
