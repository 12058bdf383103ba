#![allow(dead_code)]

use twin_scene_core::document::SceneNode;
use twin_scene_core::{build_scene, SceneConfig, SceneDocument, SceneRequest, ViewMode};

pub const TEST_BUCKET_URI: &str = "s3://twinfleet-test-bucket";

pub fn fleet_scene(vehicle_count: u32, vehicle_base_number: u32) -> SceneDocument {
    scene(ViewMode::Fleet, vehicle_count, vehicle_base_number)
}

pub fn inspection_scene(vehicle_count: u32, vehicle_base_number: u32) -> SceneDocument {
    scene(ViewMode::Inspection, vehicle_count, vehicle_base_number)
}

pub fn scene(view_mode: ViewMode, vehicle_count: u32, vehicle_base_number: u32) -> SceneDocument {
    let request = SceneRequest::new(
        view_mode,
        vehicle_count,
        vehicle_base_number,
        TEST_BUCKET_URI,
    );
    build_scene(&SceneConfig::default(), &request)
}

/// Vehicle bodies are the nodes that carry a model.
pub fn vehicle_nodes(document: &SceneDocument) -> Vec<&SceneNode> {
    document.nodes.iter().filter(|node| node.has_model()).collect()
}

pub fn tag_nodes(document: &SceneDocument) -> Vec<&SceneNode> {
    document.nodes.iter().filter(|node| node.has_tag()).collect()
}

pub fn node_named<'a>(document: &'a SceneDocument, name: &str) -> &'a SceneNode {
    document
        .nodes
        .iter()
        .find(|node| node.name == name)
        .unwrap_or_else(|| panic!("node '{name}' should exist"))
}
