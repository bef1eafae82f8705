use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::prosody::AnalysisSettings;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub settings: AnalysisSettings,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_override(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(custom) => {
                let file = canonicalize_file(&custom)?;
                let settings = AnalysisSettings::from_json_file(&file)
                    .with_context(|| format!("failed to load analysis settings from {:?}", file))?;
                Ok(Self {
                    settings,
                    source: Some(file),
                })
            }
            None => Ok(Self::default()),
        }
    }
}

fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve settings file at {:?}", path))?;
    if canonical.is_file() {
        Ok(canonical)
    } else {
        Err(anyhow!("settings path {:?} is not a file", canonical))
    }
}
