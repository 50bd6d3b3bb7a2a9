//! Render settings shared by the static and interactive backends.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cosmetic constants for both renderers.
///
/// Loaded from JSON; every field falls back to its default so partial files
/// are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    // Static Nyquist figure
    pub axis_label_size: u32,
    pub tick_label_size: u32,
    pub offset_text_size: u32,
    pub tick_count: usize,
    pub grid_alpha: f64,
    pub image_width: u32,
    pub image_height: u32,

    // Interactive chart
    pub panel_size: u32,
    pub selected_point_size: u32,
    pub point_size: u32,
    pub scale_padding: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            axis_label_size: 20,
            tick_label_size: 14,
            offset_text_size: 18,
            tick_count: 5,
            grid_alpha: 0.5,
            image_width: 800,
            image_height: 800,
            panel_size: 400,
            selected_point_size: 80,
            point_size: 30,
            scale_padding: 5,
        }
    }
}

impl RenderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::debug!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Height of each Bode panel for a given panel size.
    pub fn bode_height(&self, size: u32) -> f64 {
        size as f64 / 2.0 - 25.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{"tick_count": 7}"#).unwrap();
        assert_eq!(config.tick_count, 7);
        assert_eq!(config.panel_size, 400);
        assert_eq!(config.axis_label_size, 20);
    }

    #[test]
    fn test_bode_height() {
        assert_eq!(RenderConfig::default().bode_height(400), 175.0);
    }
}
