use std::fs;

use twin_scene_core::{SceneConfig, SceneDocument};
use twin_scene_deploy::adapters::object_store::LocalDirectoryStore;
use twin_scene_deploy::handlers::publish::{publish_scenes, PublishConfig, PublishManifest};

fn publish_config(vehicle_count: u32) -> PublishConfig {
    PublishConfig {
        bucket_uri: "s3://twinfleet-bucket".to_string(),
        prefix: String::new(),
        vehicle_count,
        vehicle_base_number: 100,
        published_at: "2026-10-19T12:00:00+00:00".to_string(),
    }
}

#[test]
fn publishes_scene_files_to_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = LocalDirectoryStore::new(dir.path());

    publish_scenes(&SceneConfig::default(), &publish_config(7), &store).expect("publish");

    let fleet_json =
        fs::read_to_string(dir.path().join("scene/evfleet.json")).expect("fleet scene written");
    let fleet = SceneDocument::from_json(&fleet_json).expect("fleet scene parses");
    assert_eq!(fleet.nodes.len(), 15);
    fleet.check_integrity().expect("fleet scene consistent");

    let inspection_json = fs::read_to_string(dir.path().join("scene/inspectionview.json"))
        .expect("inspection scene written");
    let inspection = SceneDocument::from_json(&inspection_json).expect("inspection parses");
    assert_eq!(inspection.nodes.len(), 1);
    assert_eq!(inspection.nodes[0].name, "${sel_entity}");
    assert_eq!(inspection.root_node_indexes, vec![0]);
    inspection
        .check_integrity()
        .expect("inspection scene consistent");
}

#[test]
fn republishing_produces_identical_scene_bytes() {
    let first_dir = tempfile::tempdir().expect("tempdir");
    let second_dir = tempfile::tempdir().expect("tempdir");

    for dir in [&first_dir, &second_dir] {
        let store = LocalDirectoryStore::new(dir.path());
        publish_scenes(&SceneConfig::default(), &publish_config(7), &store).expect("publish");
    }

    for key in ["scene/evfleet.json", "scene/inspectionview.json"] {
        let first = fs::read(first_dir.path().join(key)).expect("first");
        let second = fs::read(second_dir.path().join(key)).expect("second");
        assert_eq!(first, second, "{key} should be deterministic");
    }
}

#[test]
fn manifest_records_registrations_for_each_view() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = LocalDirectoryStore::new(dir.path());
    let mut scene_config = SceneConfig::default();
    scene_config.naming.workspace_id = "fleet-twin".to_string();

    publish_scenes(&scene_config, &publish_config(2), &store).expect("publish");

    let manifest: PublishManifest = serde_json::from_slice(
        &fs::read(dir.path().join("scene/manifest.json")).expect("manifest written"),
    )
    .expect("manifest parses");
    let scene_ids: Vec<_> = manifest
        .scenes
        .iter()
        .map(|scene| scene.scene_id.as_str())
        .collect();
    assert_eq!(scene_ids, vec!["evfleetview", "inspectionview"]);
    assert!(manifest
        .scenes
        .iter()
        .all(|scene| scene.workspace_id == "fleet-twin"));
    assert_eq!(manifest.entities.len(), 3);
}
