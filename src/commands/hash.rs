use anyhow::Result;

use otelstack::presentation::UiContext;
use otelstack::{Config, ConfigChangeDetector};

use crate::ui::json::emit;

/// Print the digest the upload trigger and `CONFIG_FILE_HASH` are derived from
pub fn cmd_hash(config: &Config, ui: &UiContext) -> Result<()> {
    let path = config.collector_config_path();
    let digest = ConfigChangeDetector::digest(&path)?;

    if ui.json {
        emit(serde_json::json!({
            "event": "hash",
            "path": path.display().to_string(),
            "hash": digest.as_str(),
        }))?;
    } else {
        println!("{}  {}", digest, path.display());
    }
    Ok(())
}
