//! World configuration.

use rgb_aoi::AoiBounds;
use serde::Deserialize;

/// Tunables for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Bounds used by [`World::configure_default_aoi`](crate::World::configure_default_aoi).
    pub aoi_min_x: f32,
    pub aoi_max_x: f32,
    pub aoi_min_y: f32,
    pub aoi_max_y: f32,
    /// Neighbor radius used by the default AOI.
    pub aoi_radius: f32,
    /// Verbose containment tracing.
    pub debug_spaces: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            aoi_min_x: -1000.0,
            aoi_max_x: 1000.0,
            aoi_min_y: -1000.0,
            aoi_max_y: 1000.0,
            aoi_radius: 100.0,
            debug_spaces: false,
        }
    }
}

impl WorldConfig {
    /// Defaults overlaid with `RGB_SPACE_DEBUG` and `RGB_SPACE_AOI_RADIUS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overlay environment variables on top of `self`.
    ///
    /// Unparsable values are ignored.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Some(debug) = std::env::var("RGB_SPACE_DEBUG")
            .ok()
            .and_then(|v| parse_flag(&v))
        {
            self.debug_spaces = debug;
        }

        if let Some(radius) = std::env::var("RGB_SPACE_AOI_RADIUS")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|r| r.is_finite() && *r > 0.0)
        {
            self.aoi_radius = radius;
        }

        self
    }

    /// The default AOI bounding rectangle.
    #[must_use]
    pub const fn aoi_bounds(&self) -> AoiBounds {
        AoiBounds::new(self.aoi_min_x, self.aoi_max_x, self.aoi_min_y, self.aoi_max_y)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();

        assert_eq!(
            config.aoi_bounds(),
            AoiBounds::new(-1000.0, 1000.0, -1000.0, 1000.0)
        );
        assert_eq!(config.aoi_radius, 100.0);
        assert!(!config.debug_spaces);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "aoi_radius": 50.0, "debug_spaces": true }"#).unwrap();

        assert_eq!(config.aoi_radius, 50.0);
        assert!(config.debug_spaces);
        assert_eq!(config.aoi_min_x, -1000.0);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
