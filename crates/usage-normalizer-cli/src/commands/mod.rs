pub mod config;
pub mod normalize;
pub mod period;

use std::path::Path;

use usage_normalizer_core::NormalizerConfig;

/// Load the config from `path` if given, else from the default location.
pub fn load_config(path: Option<&Path>) -> Result<NormalizerConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => NormalizerConfig::load_from(path)?,
        None => NormalizerConfig::load()?,
    };
    tracing::debug!(path = ?path, cutoff_day = ?config.billing.cutoff_day, "loaded config");
    Ok(config)
}

/// Save to `path` if given, else to the default location.
pub fn save_config(config: &NormalizerConfig, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}
