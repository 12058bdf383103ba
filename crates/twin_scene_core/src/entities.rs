//! Entity registrations that back the scene's data bindings.
//!
//! The scene refers to entities only by id and path. These definitions are
//! handed to the workspace control plane, so names produced here must match
//! the ones the builder writes into `dataBindingContext`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::builder::EntityKind;
use crate::config::{NamingConfig, SceneConfig};
use crate::contract::{
    is_template_placeholder, SceneRequest, EV_COMPONENT_NAME, EV_COMPONENT_TYPE_ID,
};
use crate::document::{NodeIndex, SceneDocument};

pub const PARAMETERS_COMPONENT_TYPE_ID: &str = "com.amazon.iottwinmaker.parameters";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub entity_id: String,
    pub entity_name: String,
    pub workspace_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_entity_id: Option<String>,
    pub components: BTreeMap<String, EntityComponent>,
}

impl EntityDefinition {
    pub fn has_component_type(&self, component_type_id: &str) -> bool {
        self.components
            .values()
            .any(|component| component.component_type_id == component_type_id)
    }

    /// Path as the viewer spells it: `parent/child`, or just the id for roots.
    pub fn entity_path(&self) -> String {
        match &self.parent_entity_id {
            Some(parent) => format!("{parent}/{}", self.entity_id),
            None => self.entity_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityComponent {
    pub component_name: String,
    pub component_type_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyRequest {
    pub value: DataValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub string_value: String,
}

pub fn entity_definition(kind: EntityKind, name: &str, naming: &NamingConfig) -> EntityDefinition {
    match kind {
        EntityKind::Car => EntityDefinition {
            entity_id: name.to_string(),
            entity_name: name.to_string(),
            workspace_id: naming.workspace_id.clone(),
            description: "Car".to_string(),
            parent_entity_id: Some(naming.fleet_name.clone()),
            components: BTreeMap::from([(
                "EVDataComp".to_string(),
                EntityComponent {
                    component_name: EV_COMPONENT_NAME.to_string(),
                    component_type_id: EV_COMPONENT_TYPE_ID.to_string(),
                    properties: BTreeMap::from([(
                        "vehicleName".to_string(),
                        PropertyRequest {
                            value: DataValue {
                                string_value: name.to_string(),
                            },
                        },
                    )]),
                },
            )]),
        },
        EntityKind::Fleet => EntityDefinition {
            entity_id: name.to_string(),
            entity_name: name.to_string(),
            workspace_id: naming.workspace_id.clone(),
            description: "Fleet".to_string(),
            parent_entity_id: None,
            components: BTreeMap::from([(
                "parameters".to_string(),
                EntityComponent {
                    component_name: "Attributes".to_string(),
                    component_type_id: PARAMETERS_COMPONENT_TYPE_ID.to_string(),
                    properties: BTreeMap::new(),
                },
            )]),
        },
    }
}

/// Returns `None` (after logging) for anything other than `CAR` or `FLEET`;
/// callers should not wire dependants to a skipped entity.
pub fn entity_definition_by_type(
    entity_type: &str,
    name: &str,
    naming: &NamingConfig,
) -> Option<EntityDefinition> {
    match entity_type.parse::<EntityKind>() {
        Ok(kind) => Some(entity_definition(kind, name, naming)),
        Err(error) => {
            tracing::warn!(entity_type, entity_name = name, error = %error, "skipping entity");
            None
        }
    }
}

/// Fleet entity first, then one car per vehicle number, named as in the scene.
pub fn fleet_entity_plan(config: &SceneConfig, request: &SceneRequest) -> Vec<EntityDefinition> {
    let naming = &config.naming;
    let mut plan = Vec::with_capacity(1 + request.vehicle_count as usize);
    plan.push(entity_definition(
        EntityKind::Fleet,
        &naming.fleet_name,
        naming,
    ));
    plan.extend(request.vehicle_numbers().map(|number| {
        entity_definition(EntityKind::Car, &naming.vehicle_name(number), naming)
    }));
    plan
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingMismatch {
    #[error("node {node} binds to entity '{entity_id}' which is not registered")]
    UnknownEntity { node: NodeIndex, entity_id: String },
    #[error("node {node} binds to component type '{component_type}' missing on entity '{entity_id}'")]
    MissingComponent {
        node: NodeIndex,
        entity_id: String,
        component_type: String,
    },
    #[error("node {node} binds to path '{bound_path}' but entity '{entity_id}' lives at '{entity_path}'")]
    PathMismatch {
        node: NodeIndex,
        entity_id: String,
        bound_path: String,
        entity_path: String,
    },
}

/// Checks every concrete binding in `document` against `plan`. Template
/// placeholders are resolved by the viewer at runtime and are skipped.
pub fn verify_bindings(
    document: &SceneDocument,
    plan: &[EntityDefinition],
) -> Result<(), BindingMismatch> {
    let by_id: BTreeMap<&str, &EntityDefinition> = plan
        .iter()
        .map(|entity| (entity.entity_id.as_str(), entity))
        .collect();

    for (node, scene_node) in document.nodes.iter().enumerate() {
        for context in scene_node.binding_contexts() {
            if is_template_placeholder(&context.entity_id) {
                continue;
            }
            let Some(entity) = by_id.get(context.entity_id.as_str()) else {
                return Err(BindingMismatch::UnknownEntity {
                    node,
                    entity_id: context.entity_id.clone(),
                });
            };
            if !entity.has_component_type(&context.component_name) {
                return Err(BindingMismatch::MissingComponent {
                    node,
                    entity_id: context.entity_id.clone(),
                    component_type: context.component_name.clone(),
                });
            }
            let entity_path = entity.entity_path();
            if context.entity_path != entity_path {
                return Err(BindingMismatch::PathMismatch {
                    node,
                    entity_id: context.entity_id.clone(),
                    bound_path: context.entity_path.clone(),
                    entity_path,
                });
            }
        }
    }

    Ok(())
}
