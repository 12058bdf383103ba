use serde::{Deserialize, Serialize};

use crate::contract::ValidationError;

pub const DEFAULT_ROW_CAPACITY: u32 = 5;
pub const DEFAULT_ITEM_SPACING: f64 = -15.0;
pub const DEFAULT_ROW_SPACING: f64 = -10.0;
pub const DEFAULT_TAG_HEIGHT: f64 = 0.5;

/// Grid geometry. Earlier fleets used 10 per row with positive spacing, so
/// none of this is fixed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub row_capacity: u32,
    /// Step along x between neighbours in a row.
    pub item_spacing: f64,
    /// Step along z per completed row.
    pub row_spacing: f64,
    /// Height of a tag above its vehicle body.
    pub tag_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_capacity: DEFAULT_ROW_CAPACITY,
            item_spacing: DEFAULT_ITEM_SPACING,
            row_spacing: DEFAULT_ROW_SPACING,
            tag_height: DEFAULT_TAG_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NamingConfig {
    pub fleet_name: String,
    pub vehicle_prefix: String,
    pub workspace_id: String,
    pub model_file: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            fleet_name: "FleetEV".to_string(),
            vehicle_prefix: "vin".to_string(),
            workspace_id: "twin".to_string(),
            model_file: "truck.glb".to_string(),
        }
    }
}

impl NamingConfig {
    pub fn vehicle_name(&self, vehicle_number: u64) -> String {
        format!("{}{vehicle_number}", self.vehicle_prefix)
    }

    pub fn entity_path(&self, entity_id: &str) -> String {
        format!("{}/{entity_id}", self.fleet_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub layout: LayoutConfig,
    pub naming: NamingConfig,
}

impl SceneConfig {
    /// Parses a possibly partial JSON config; missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ValidationError> {
        let config: SceneConfig = serde_json::from_str(text)
            .map_err(|error| ValidationError::new(format!("Malformed scene config: {error}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let layout = &self.layout;
        if layout.row_capacity == 0 {
            return Err(ValidationError::new(
                "row_capacity must be a positive integer",
            ));
        }
        for (name, value) in [
            ("item_spacing", layout.item_spacing),
            ("row_spacing", layout.row_spacing),
            ("tag_height", layout.tag_height),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::new(format!("{name} must be finite")));
            }
        }

        let naming = &self.naming;
        for (name, value) in [
            ("fleet_name", &naming.fleet_name),
            ("vehicle_prefix", &naming.vehicle_prefix),
            ("workspace_id", &naming.workspace_id),
            ("model_file", &naming.model_file),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::new(format!("{name} cannot be empty")));
            }
        }
        if naming.fleet_name.contains('/') || naming.vehicle_prefix.contains('/') {
            return Err(ValidationError::new(
                "fleet_name and vehicle_prefix cannot contain '/'",
            ));
        }

        Ok(())
    }
}
