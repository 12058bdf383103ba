use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const SCENE_SPEC_VERSION: &str = "1.0";
pub const SCENE_DOCUMENT_VERSION: &str = "1";
pub const SCENE_UNIT: &str = "meters";
pub const ENVIRONMENT_PRESET: &str = "neutral";

pub const EV_COMPONENT_TYPE_ID: &str = "com.user.evtwindata";
pub const EV_COMPONENT_NAME: &str = "evdata";
pub const FAULT_PROPERTY_NAME: &str = "HasActiveDTC";
pub const FAULT_EXPRESSION_VARIABLE: &str = "hasActiveDTC";

pub const SHADER_RULE_NAME: &str = "DTCShaderRule";
pub const ICON_RULE_NAME: &str = "DTCIconRule";
pub const NEUTRAL_COLOR_TARGET: &str = "iottwinmaker.common.color:#0144f9";
pub const ALERT_COLOR_TARGET: &str = "iottwinmaker.common.color:#d13212";
pub const ERROR_ICON_TARGET: &str = "iottwinmaker.common.icon:Error";
pub const INFO_ICON_TARGET: &str = "iottwinmaker.common.icon:Info";

pub const SELECTED_ENTITY_VARIABLE: &str = "sel_entity";
pub const SELECTED_COMPONENT_VARIABLE: &str = "sel_comp";

/// Which scene variant to render.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[serde(rename = "FLEET_VIEW")]
    Fleet,
    #[serde(rename = "INSPECTION_VIEW")]
    Inspection,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Fleet, ViewMode::Inspection];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fleet => "FLEET_VIEW",
            Self::Inspection => "INSPECTION_VIEW",
        }
    }

    /// Scene identifier used when the document is registered in a workspace.
    pub fn scene_id(self) -> &'static str {
        match self {
            Self::Fleet => "evfleetview",
            Self::Inspection => "inspectionview",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SceneRequest {
    pub view_mode: ViewMode,
    pub vehicle_count: u32,
    pub vehicle_base_number: u32,
    pub asset_bucket_uri: String,
}

impl SceneRequest {
    pub fn new(
        view_mode: ViewMode,
        vehicle_count: u32,
        vehicle_base_number: u32,
        asset_bucket_uri: impl Into<String>,
    ) -> Self {
        Self {
            view_mode,
            vehicle_count,
            vehicle_base_number,
            asset_bucket_uri: asset_bucket_uri.into(),
        }
    }

    /// Vehicle numbers in ascending order, `[base, base + count)`.
    pub fn vehicle_numbers(&self) -> std::ops::Range<u64> {
        let start = u64::from(self.vehicle_base_number);
        start..start + u64::from(self.vehicle_count)
    }

    pub fn with_view_mode(&self, view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// `${name}` form resolved by the viewer against its data binding template.
pub fn template_placeholder(variable: &str) -> String {
    format!("${{{variable}}}")
}

pub fn is_template_placeholder(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}')
}

pub fn content_fingerprint(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}
