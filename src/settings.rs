//! Binder Settings
//!
//! Everything a binder reads from its configuration: the point count and the
//! five host property names it publishes to. Settings deserialize from JSON
//! with per-field defaults, so a partial document is valid.
//!
//! ```rust,ignore
//! let settings = BinderSettings::from_json_str(r#"{ "point_count": 64 }"#)?;
//! assert_eq!(settings.names.position_map, "PositionMap");
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{BakeError, Result};

pub const DEFAULT_POINT_COUNT: usize = 256;

/// Host property names a binder publishes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingNames {
    pub point_count: String,
    pub position_map: String,
    pub rotation_map: String,
    pub bounds_center: String,
    pub bounds_size: String,
}

impl Default for BindingNames {
    fn default() -> Self {
        Self {
            point_count: "PointCount".to_string(),
            position_map: "PositionMap".to_string(),
            rotation_map: "RotationMap".to_string(),
            bounds_center: "BoundsCenter".to_string(),
            bounds_size: "BoundsSize".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderSettings {
    /// Number of samples baked along the curve. Must be at least 2.
    pub point_count: usize,
    pub names: BindingNames,
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            point_count: DEFAULT_POINT_COUNT,
            names: BindingNames::default(),
        }
    }
}

impl BinderSettings {
    #[must_use]
    pub fn with_point_count(point_count: usize) -> Self {
        Self {
            point_count,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the settings on their own, without a host.
    pub fn validate(&self) -> Result<()> {
        if self.point_count < 2 {
            return Err(BakeError::PointCountTooSmall {
                point_count: self.point_count,
            });
        }
        Ok(())
    }
}
