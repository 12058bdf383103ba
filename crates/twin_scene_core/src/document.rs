//! Scene document data model.
//!
//! Field names and nesting follow the scene-description JSON read by the
//! 3D viewer, so every rename here is part of the wire contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contract::ValidationError;

pub type Vec3 = [f64; 3];
pub type NodeIndex = usize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub spec_version: String,
    pub version: String,
    pub unit: String,
    pub properties: SceneProperties,
    pub nodes: Vec<SceneNode>,
    pub root_node_indexes: Vec<NodeIndex>,
    #[serde(default)]
    pub cameras: Vec<Value>,
    pub rules: BTreeMap<String, RuleSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SceneProperties {
    pub environment_preset: String,
    pub data_binding_config: DataBindingConfig,
}

/// Maps binding fields (`entityId`, `componentName`) to template variables
/// and gives each variable a default value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataBindingConfig {
    pub field_mapping: BTreeMap<String, Vec<String>>,
    pub template: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    #[serde(default)]
    pub transform_constraint: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<NodeIndex>,
    #[serde(default)]
    pub components: Vec<SceneComponent>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl SceneNode {
    pub fn at(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            transform: Transform::at(position),
            transform_constraint: Map::new(),
            children: Vec::new(),
            components: Vec::new(),
            properties: Map::new(),
        }
    }

    pub fn binding_contexts(&self) -> impl Iterator<Item = &DataBindingContext> {
        self.components
            .iter()
            .filter_map(SceneComponent::value_data_binding)
            .map(|binding| &binding.data_binding_context)
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.components
            .iter()
            .filter_map(SceneComponent::rule_based_map_id)
    }

    pub fn has_model(&self) -> bool {
        self.components
            .iter()
            .any(|component| matches!(component, SceneComponent::ModelRef(_)))
    }

    pub fn has_tag(&self) -> bool {
        self.components
            .iter()
            .any(|component| matches!(component, SceneComponent::Tag(_)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SceneComponent {
    ModelRef(ModelRef),
    ModelShader(ModelShader),
    Tag(TagComponent),
}

impl SceneComponent {
    pub fn value_data_binding(&self) -> Option<&ValueDataBinding> {
        match self {
            Self::ModelRef(_) => None,
            Self::ModelShader(shader) => Some(&shader.value_data_binding),
            Self::Tag(tag) => Some(&tag.value_data_binding),
        }
    }

    pub fn rule_based_map_id(&self) -> Option<&str> {
        match self {
            Self::ModelRef(_) => None,
            Self::ModelShader(shader) => Some(&shader.rule_based_map_id),
            Self::Tag(tag) => Some(&tag.rule_based_map_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelRef {
    pub uri: String,
    pub model_type: String,
    pub unit_of_measure: String,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelShader {
    pub value_data_binding: ValueDataBinding,
    pub rule_based_map_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagComponent {
    pub icon: String,
    pub value_data_binding: ValueDataBinding,
    pub rule_based_map_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValueDataBinding {
    pub data_binding_context: DataBindingContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataBindingContext {
    pub entity_id: String,
    pub component_name: String,
    pub property_name: String,
    pub entity_path: String,
}

/// Ordered statements; the viewer applies the first one whose expression holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSet {
    pub statements: Vec<RuleStatement>,
}

impl RuleSet {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            statements: pairs
                .iter()
                .map(|(expression, target)| RuleStatement {
                    expression: (*expression).to_string(),
                    target: (*target).to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleStatement {
    pub expression: String,
    pub target: String,
}

impl SceneDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Checks the structural invariants the viewer relies on: child and root
    /// indexes point at existing nodes, children come after their parent, no
    /// node has two parents or is both a root and a child, and every
    /// referenced rule exists.
    pub fn check_integrity(&self) -> Result<(), ValidationError> {
        let node_count = self.nodes.len();
        let mut parent_of: Vec<Option<NodeIndex>> = vec![None; node_count];

        for (index, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child >= node_count {
                    return Err(ValidationError::new(format!(
                        "node {index} references missing child {child}"
                    )));
                }
                if child <= index {
                    return Err(ValidationError::new(format!(
                        "child {child} was inserted before its parent {index}"
                    )));
                }
                if let Some(previous) = parent_of[child].replace(index) {
                    return Err(ValidationError::new(format!(
                        "node {child} has two parents ({previous} and {index})"
                    )));
                }
            }

            for rule_id in node.rule_ids() {
                if !self.rules.contains_key(rule_id) {
                    return Err(ValidationError::new(format!(
                        "node {index} references unknown rule '{rule_id}'"
                    )));
                }
            }
        }

        for &root in &self.root_node_indexes {
            if root >= node_count {
                return Err(ValidationError::new(format!(
                    "root index {root} is out of range"
                )));
            }
            if parent_of[root].is_some() {
                return Err(ValidationError::new(format!(
                    "root index {root} is also a child node"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> ValueDataBinding {
        ValueDataBinding {
            data_binding_context: DataBindingContext {
                entity_id: "vin1".to_string(),
                component_name: "com.user.evtwindata".to_string(),
                property_name: "HasActiveDTC".to_string(),
                entity_path: "FleetEV/vin1".to_string(),
            },
        }
    }

    fn single_node_document() -> SceneDocument {
        let mut node = SceneNode::at("vin1", [0.0, 0.0, 0.0]);
        node.components.push(SceneComponent::ModelShader(ModelShader {
            value_data_binding: binding(),
            rule_based_map_id: "DTCShaderRule".to_string(),
        }));
        SceneDocument {
            spec_version: "1.0".to_string(),
            version: "1".to_string(),
            unit: "meters".to_string(),
            properties: SceneProperties {
                environment_preset: "neutral".to_string(),
                data_binding_config: DataBindingConfig::default(),
            },
            nodes: vec![node],
            root_node_indexes: vec![0],
            cameras: Vec::new(),
            rules: BTreeMap::from([(
                "DTCShaderRule".to_string(),
                RuleSet::from_pairs(&[("hasActiveDTC == 1", "iottwinmaker.common.color:#d13212")]),
            )]),
        }
    }

    #[test]
    fn components_serialize_with_type_tag() {
        let component = SceneComponent::ModelRef(ModelRef {
            uri: "s3://bucket/truck.glb".to_string(),
            model_type: "GLB".to_string(),
            unit_of_measure: "meters".to_string(),
            cast_shadow: false,
            receive_shadow: false,
        });
        let value = serde_json::to_value(&component).expect("serialize");
        assert_eq!(value["type"], "ModelRef");
        assert_eq!(value["modelType"], "GLB");
        assert_eq!(value["castShadow"], false);
    }

    #[test]
    fn shader_binding_uses_viewer_field_names() {
        let shader = SceneComponent::ModelShader(ModelShader {
            value_data_binding: binding(),
            rule_based_map_id: "DTCShaderRule".to_string(),
        });
        let value = serde_json::to_value(&shader).expect("serialize");
        assert_eq!(value["ruleBasedMapId"], "DTCShaderRule");
        assert_eq!(
            value["valueDataBinding"]["dataBindingContext"]["entityPath"],
            "FleetEV/vin1"
        );
    }

    #[test]
    fn document_uses_camel_case_root_keys() {
        let value = serde_json::to_value(single_node_document()).expect("serialize");
        assert_eq!(value["specVersion"], "1.0");
        assert_eq!(value["rootNodeIndexes"], serde_json::json!([0]));
        assert_eq!(value["nodes"][0]["transformConstraint"], serde_json::json!({}));
        assert_eq!(value["cameras"], serde_json::json!([]));
    }

    #[test]
    fn integrity_rejects_unknown_rule() {
        let mut document = single_node_document();
        document.rules.clear();
        let error = document.check_integrity().expect_err("missing rule");
        assert!(error.message().contains("unknown rule"));
    }

    #[test]
    fn integrity_rejects_dangling_child() {
        let mut document = single_node_document();
        document.nodes[0].children.push(4);
        let error = document.check_integrity().expect_err("dangling child");
        assert_eq!(error.message(), "node 0 references missing child 4");
    }

    #[test]
    fn integrity_rejects_root_that_is_also_child() {
        let mut document = single_node_document();
        document.nodes.push(SceneNode::at("tag", [0.0, 0.5, 0.0]));
        document.nodes[0].children.push(1);
        document.root_node_indexes.push(1);
        assert!(document.check_integrity().is_err());
    }
}
