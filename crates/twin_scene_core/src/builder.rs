use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::config::SceneConfig;
use crate::contract::{
    template_placeholder, SceneRequest, ViewMode, ALERT_COLOR_TARGET, ENVIRONMENT_PRESET,
    ERROR_ICON_TARGET, EV_COMPONENT_TYPE_ID, FAULT_EXPRESSION_VARIABLE, FAULT_PROPERTY_NAME,
    ICON_RULE_NAME, INFO_ICON_TARGET, NEUTRAL_COLOR_TARGET, SCENE_DOCUMENT_VERSION,
    SCENE_SPEC_VERSION, SCENE_UNIT, SELECTED_COMPONENT_VARIABLE, SELECTED_ENTITY_VARIABLE,
    SHADER_RULE_NAME,
};
use crate::document::{
    DataBindingConfig, DataBindingContext, ModelRef, ModelShader, NodeIndex, RuleSet,
    SceneComponent, SceneDocument, SceneNode, SceneProperties, TagComponent, ValueDataBinding,
};
use crate::layout::{grid_position, tag_position};
use crate::storage_keys::model_asset_uri;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Car,
    Fleet,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Fleet => "FLEET",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type '{0}'")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CAR" => Ok(Self::Car),
            "FLEET" => Ok(Self::Fleet),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// Why the builder refused to place a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("vehicle {number} is outside the requested range [{first}, {end})")]
    OutOfRange { number: u64, first: u64, end: u64 },
    #[error("vehicle {number} is already in the scene")]
    AlreadyPlaced { number: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEntity {
    Fleet,
    Vehicle { number: u64 },
}

impl SceneEntity {
    pub fn new(kind: EntityKind, vehicle_number: u64) -> Self {
        match kind {
            EntityKind::Car => Self::Vehicle {
                number: vehicle_number,
            },
            EntityKind::Fleet => Self::Fleet,
        }
    }
}

/// Accumulates nodes for one scene document.
///
/// `finish` consumes the builder, so a builder can never leak node state into
/// a second document.
#[derive(Debug)]
pub struct SceneBuilder<'a> {
    config: &'a SceneConfig,
    request: &'a SceneRequest,
    nodes: Vec<SceneNode>,
    root_node_indexes: Vec<NodeIndex>,
    next_index: NodeIndex,
    fleet_index: Option<NodeIndex>,
    placed_vehicles: BTreeSet<u64>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(config: &'a SceneConfig, request: &'a SceneRequest) -> Self {
        let planned = match request.view_mode {
            ViewMode::Fleet => 1 + 2 * request.vehicle_count as usize,
            ViewMode::Inspection => request.vehicle_count as usize,
        };
        Self {
            config,
            request,
            nodes: Vec::with_capacity(planned),
            root_node_indexes: Vec::new(),
            next_index: 0,
            fleet_index: None,
            placed_vehicles: BTreeSet::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.next_index
    }

    /// Adds the fleet root (once) or one vehicle.
    ///
    /// Vehicles must lie in the request's `[base, base + count)` range and may
    /// only be placed once; a refused vehicle leaves the node list untouched.
    pub fn add_entity(&mut self, entity: SceneEntity) -> Result<NodeIndex, PlacementError> {
        match entity {
            SceneEntity::Fleet => Ok(self.add_fleet()),
            SceneEntity::Vehicle { number } => {
                self.check_placement(number)?;
                Ok(self.add_vehicle(number))
            }
        }
    }

    /// Name-typed entry point for callers that carry entity types as strings.
    /// Unknown types and refused vehicles are reported and skipped; the node
    /// list is untouched.
    pub fn add_entity_by_type(
        &mut self,
        entity_type: &str,
        vehicle_number: u64,
    ) -> Option<NodeIndex> {
        let kind = match entity_type.parse::<EntityKind>() {
            Ok(kind) => kind,
            Err(error) => {
                tracing::warn!(
                    entity_type,
                    vehicle_number,
                    error = %error,
                    "skipping scene node"
                );
                return None;
            }
        };
        match self.add_entity(SceneEntity::new(kind, vehicle_number)) {
            Ok(index) => Some(index),
            Err(error) => {
                tracing::warn!(
                    entity_type,
                    vehicle_number,
                    error = %error,
                    "skipping scene node"
                );
                None
            }
        }
    }

    pub fn finish(self) -> SceneDocument {
        debug_assert_eq!(self.nodes.len(), self.next_index);

        // Empty when no vehicle was requested, so the default never names an
        // unregistered entity.
        let default_entity = self
            .request
            .vehicle_numbers()
            .next()
            .map(|number| self.config.naming.vehicle_name(number))
            .unwrap_or_default();
        let data_binding_config = DataBindingConfig {
            field_mapping: BTreeMap::from([
                (
                    "entityId".to_string(),
                    vec![SELECTED_ENTITY_VARIABLE.to_string()],
                ),
                (
                    "componentName".to_string(),
                    vec![SELECTED_COMPONENT_VARIABLE.to_string()],
                ),
            ]),
            template: BTreeMap::from([
                (SELECTED_ENTITY_VARIABLE.to_string(), default_entity),
                (
                    SELECTED_COMPONENT_VARIABLE.to_string(),
                    EV_COMPONENT_TYPE_ID.to_string(),
                ),
            ]),
        };

        SceneDocument {
            spec_version: SCENE_SPEC_VERSION.to_string(),
            version: SCENE_DOCUMENT_VERSION.to_string(),
            unit: SCENE_UNIT.to_string(),
            properties: SceneProperties {
                environment_preset: ENVIRONMENT_PRESET.to_string(),
                data_binding_config,
            },
            nodes: self.nodes,
            root_node_indexes: self.root_node_indexes,
            cameras: Vec::new(),
            rules: fault_rules(),
        }
    }

    fn add_fleet(&mut self) -> NodeIndex {
        if let Some(index) = self.fleet_index {
            return index;
        }
        let node = SceneNode::at(self.config.naming.fleet_name.clone(), [0.0, 0.0, 0.0]);
        let index = self.push(node);
        self.root_node_indexes.push(index);
        self.fleet_index = Some(index);
        index
    }

    fn check_placement(&self, number: u64) -> Result<(), PlacementError> {
        let range = self.request.vehicle_numbers();
        if !range.contains(&number) {
            return Err(PlacementError::OutOfRange {
                number,
                first: range.start,
                end: range.end,
            });
        }
        if self.placed_vehicles.contains(&number) {
            return Err(PlacementError::AlreadyPlaced { number });
        }
        Ok(())
    }

    fn add_vehicle(&mut self, number: u64) -> NodeIndex {
        self.placed_vehicles.insert(number);
        let (config, request) = (self.config, self.request);
        let layout = &config.layout;
        let naming = &config.naming;
        let position = grid_position(layout, number, u64::from(request.vehicle_base_number));

        let (name, binding) = match request.view_mode {
            ViewMode::Fleet => {
                let entity_id = naming.vehicle_name(number);
                let binding = fault_binding(&entity_id, &naming.entity_path(&entity_id));
                (entity_id, binding)
            }
            ViewMode::Inspection => {
                let placeholder = template_placeholder(SELECTED_ENTITY_VARIABLE);
                let binding = fault_binding(&placeholder, &naming.entity_path(&placeholder));
                (placeholder, binding)
            }
        };

        let mut body = SceneNode::at(name.clone(), position);
        body.components.push(SceneComponent::ModelRef(ModelRef {
            uri: model_asset_uri(&request.asset_bucket_uri, &naming.model_file),
            model_type: "GLB".to_string(),
            unit_of_measure: SCENE_UNIT.to_string(),
            cast_shadow: false,
            receive_shadow: false,
        }));
        body.components.push(SceneComponent::ModelShader(ModelShader {
            value_data_binding: binding.clone(),
            rule_based_map_id: SHADER_RULE_NAME.to_string(),
        }));

        let body_index = self.push(body);
        self.root_node_indexes.push(body_index);

        if request.view_mode == ViewMode::Fleet {
            let mut tag = SceneNode::at(format!("{name}-tag"), tag_position(layout, position));
            tag.components.push(SceneComponent::Tag(TagComponent {
                icon: INFO_ICON_TARGET.to_string(),
                value_data_binding: binding,
                rule_based_map_id: ICON_RULE_NAME.to_string(),
            }));
            let tag_index = self.push(tag);
            self.nodes[body_index].children.push(tag_index);
        }

        body_index
    }

    fn push(&mut self, node: SceneNode) -> NodeIndex {
        let index = self.next_index;
        self.nodes.push(node);
        self.next_index += 1;
        index
    }
}

/// Builds one complete scene: the fleet root (fleet view only), then one
/// vehicle per number in `[base, base + count)`.
pub fn build_scene(config: &SceneConfig, request: &SceneRequest) -> SceneDocument {
    let mut builder = SceneBuilder::new(config, request);
    if request.view_mode == ViewMode::Fleet {
        builder.add_fleet();
    }
    request
        .vehicle_numbers()
        .fold(builder, |mut builder, number| {
            builder.add_vehicle(number);
            builder
        })
        .finish()
}

fn fault_binding(entity_id: &str, entity_path: &str) -> ValueDataBinding {
    ValueDataBinding {
        data_binding_context: DataBindingContext {
            entity_id: entity_id.to_string(),
            component_name: EV_COMPONENT_TYPE_ID.to_string(),
            property_name: FAULT_PROPERTY_NAME.to_string(),
            entity_path: entity_path.to_string(),
        },
    }
}

fn fault_rules() -> BTreeMap<String, RuleSet> {
    let healthy = format!("{FAULT_EXPRESSION_VARIABLE} == 0");
    let faulted = format!("{FAULT_EXPRESSION_VARIABLE} == 1");
    BTreeMap::from([
        (
            SHADER_RULE_NAME.to_string(),
            RuleSet::from_pairs(&[
                (healthy.as_str(), NEUTRAL_COLOR_TARGET),
                (faulted.as_str(), ALERT_COLOR_TARGET),
            ]),
        ),
        (
            ICON_RULE_NAME.to_string(),
            RuleSet::from_pairs(&[
                (faulted.as_str(), ERROR_ICON_TARGET),
                (healthy.as_str(), INFO_ICON_TARGET),
            ]),
        ),
    ])
}
