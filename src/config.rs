use directories::ProjectDirs;
use gridmark_core::GridConfig;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Load the grid config from `config_file`, or from the user's config dir.
///
/// Never fails: problems are returned as warnings and the defaults are
/// used. A missing user config is not a problem; a missing explicit one is.
pub fn load_config(config_file: Option<&PathBuf>) -> (GridConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (GridConfig::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (GridConfig::default(), warnings);
    }

    let config = match read_config(&path) {
        Ok(config) => {
            log::info!("loaded config from {}", path.display());
            config
        }
        Err(warning) => {
            warnings.push(warning);
            GridConfig::default()
        }
    };
    (config, warnings)
}

fn read_config(path: &Path) -> Result<GridConfig, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str::<GridConfig>(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridmark")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
