use std::time::Instant;

use serde::{Deserialize, Serialize};
use twin_scene_core::contract::content_fingerprint;
use twin_scene_core::entities::{
    fleet_entity_plan, verify_bindings, BindingMismatch, EntityDefinition,
};
use twin_scene_core::storage_keys::{content_location, manifest_object_key, scene_object_key};
use twin_scene_core::{build_scene, SceneConfig, SceneRequest, ValidationError, ViewMode};

use crate::adapters::object_store::SceneStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub bucket_uri: String,
    pub prefix: String,
    pub vehicle_count: u32,
    pub vehicle_base_number: u32,
    pub published_at: String,
}

/// What the scene registration collaborator needs to create one scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SceneRegistration {
    pub scene_id: String,
    pub workspace_id: String,
    pub view_mode: ViewMode,
    pub object_key: String,
    pub content_location: String,
    pub sha256: String,
    pub node_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishManifest {
    pub published_at: String,
    pub vehicle_count: u32,
    pub vehicle_base_number: u32,
    pub scenes: Vec<SceneRegistration>,
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub manifest_key: String,
    pub scenes: Vec<SceneRegistration>,
    pub entity_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid scene configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
    #[error("{view_mode} scene is inconsistent: {source}")]
    InconsistentScene {
        view_mode: ViewMode,
        #[source]
        source: ValidationError,
    },
    #[error("scene bindings do not match the entity plan: {0}")]
    Bindings(#[from] BindingMismatch),
    #[error("failed to serialize {what}: {source}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to store '{key}': {message}")]
    Store { key: String, message: String },
}

/// Builds the fleet and inspection scenes, writes them to `store`, then
/// writes a manifest with scene registrations and the entity plan.
pub fn publish_scenes(
    scene_config: &SceneConfig,
    config: &PublishConfig,
    store: &impl SceneStore,
) -> Result<PublishReport, PublishError> {
    let started_at = Instant::now();
    tracing::info!(
        vehicle_count = config.vehicle_count,
        vehicle_base_number = config.vehicle_base_number,
        bucket_uri = %config.bucket_uri,
        "scene publish started"
    );

    match write_scenes(scene_config, config, store) {
        Ok(report) => {
            tracing::info!(
                scenes = report.scenes.len(),
                entities = report.entity_count,
                manifest_key = %report.manifest_key,
                duration_ms = started_at.elapsed().as_millis() as u64,
                "scene publish completed"
            );
            Ok(report)
        }
        Err(error) => {
            tracing::error!(
                duration_ms = started_at.elapsed().as_millis() as u64,
                error = %error,
                "scene publish failed"
            );
            Err(error)
        }
    }
}

fn write_scenes(
    scene_config: &SceneConfig,
    config: &PublishConfig,
    store: &impl SceneStore,
) -> Result<PublishReport, PublishError> {
    scene_config.validate()?;

    let base_request = SceneRequest::new(
        ViewMode::Fleet,
        config.vehicle_count,
        config.vehicle_base_number,
        config.bucket_uri.clone(),
    );
    let entities = fleet_entity_plan(scene_config, &base_request);

    let mut scenes = Vec::with_capacity(ViewMode::ALL.len());
    for view_mode in ViewMode::ALL {
        let mut request = base_request.with_view_mode(view_mode);
        // The inspection scene holds one templated vehicle.
        if view_mode == ViewMode::Inspection {
            request.vehicle_count = request.vehicle_count.min(1);
        }
        let document = build_scene(scene_config, &request);
        document
            .check_integrity()
            .map_err(|source| PublishError::InconsistentScene { view_mode, source })?;
        verify_bindings(&document, &entities)?;

        let body = document
            .to_json()
            .map_err(|source| PublishError::Serialization {
                what: "scene document",
                source,
            })?;
        let object_key = scene_object_key(&config.prefix, view_mode);
        write(store, &object_key, body.as_bytes())?;

        let registration = SceneRegistration {
            scene_id: view_mode.scene_id().to_string(),
            workspace_id: scene_config.naming.workspace_id.clone(),
            view_mode,
            content_location: content_location(&config.bucket_uri, &object_key),
            object_key,
            sha256: content_fingerprint(body.as_bytes()),
            node_count: document.nodes.len(),
        };
        tracing::info!(
            scene_id = %registration.scene_id,
            object_key = %registration.object_key,
            nodes = registration.node_count,
            "scene written"
        );
        scenes.push(registration);
    }

    let manifest = PublishManifest {
        published_at: config.published_at.clone(),
        vehicle_count: config.vehicle_count,
        vehicle_base_number: config.vehicle_base_number,
        scenes,
        entities,
    };
    let manifest_body =
        serde_json::to_vec_pretty(&manifest).map_err(|source| PublishError::Serialization {
            what: "publish manifest",
            source,
        })?;
    let manifest_key = manifest_object_key(&config.prefix);
    write(store, &manifest_key, &manifest_body)?;

    Ok(PublishReport {
        manifest_key,
        entity_count: manifest.entities.len(),
        scenes: manifest.scenes,
    })
}

fn write(store: &impl SceneStore, key: &str, body: &[u8]) -> Result<(), PublishError> {
    store
        .write_object(key, body)
        .map_err(|message| PublishError::Store {
            key: key.to_string(),
            message,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use twin_scene_core::SceneDocument;

    use super::*;

    struct RecordingStore {
        objects: Mutex<BTreeMap<String, Vec<u8>>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                objects: Mutex::new(BTreeMap::new()),
            }
        }

        fn keys(&self) -> Vec<String> {
            self.objects
                .lock()
                .expect("poisoned mutex")
                .keys()
                .cloned()
                .collect()
        }

        fn object(&self, key: &str) -> Vec<u8> {
            self.objects
                .lock()
                .expect("poisoned mutex")
                .get(key)
                .cloned()
                .unwrap_or_else(|| panic!("object '{key}' should exist"))
        }
    }

    impl SceneStore for RecordingStore {
        fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
            self.objects
                .lock()
                .expect("poisoned mutex")
                .insert(key.to_string(), body.to_vec());
            Ok(())
        }
    }

    struct FailingStore;

    impl SceneStore for FailingStore {
        fn write_object(&self, _key: &str, _body: &[u8]) -> Result<(), String> {
            Err("bucket unavailable".to_string())
        }
    }

    fn publish_config() -> PublishConfig {
        PublishConfig {
            bucket_uri: "s3://twinfleet-bucket".to_string(),
            prefix: String::new(),
            vehicle_count: 3,
            vehicle_base_number: 100,
            published_at: "2026-10-19T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn writes_both_scenes_and_manifest() {
        let store = RecordingStore::new();
        let report =
            publish_scenes(&SceneConfig::default(), &publish_config(), &store).expect("publish");

        assert_eq!(
            store.keys(),
            vec![
                "scene/evfleet.json".to_string(),
                "scene/inspectionview.json".to_string(),
                "scene/manifest.json".to_string(),
            ]
        );
        assert_eq!(report.manifest_key, "scene/manifest.json");
        assert_eq!(report.entity_count, 4);
        assert_eq!(report.scenes[0].node_count, 7);
        assert_eq!(report.scenes[1].node_count, 1);
    }

    #[test]
    fn inspection_scene_holds_one_templated_vehicle() {
        let store = RecordingStore::new();
        let mut config = publish_config();
        config.vehicle_count = 12;
        publish_scenes(&SceneConfig::default(), &config, &store).expect("publish");

        let document: SceneDocument =
            serde_json::from_slice(&store.object("scene/inspectionview.json"))
                .expect("scene should parse");
        assert_eq!(document.nodes.len(), 1);
        assert_eq!(document.nodes[0].name, "${sel_entity}");
        assert_eq!(document.nodes[0].transform.position, [0.0, 0.0, 0.0]);
        assert_eq!(document.root_node_indexes, vec![0]);
    }

    #[test]
    fn empty_fleet_publishes_empty_inspection_scene() {
        let store = RecordingStore::new();
        let mut config = publish_config();
        config.vehicle_count = 0;
        let report = publish_scenes(&SceneConfig::default(), &config, &store).expect("publish");

        assert_eq!(report.scenes[0].node_count, 1);
        assert_eq!(report.scenes[1].node_count, 0);
        assert_eq!(report.entity_count, 1);
    }

    #[test]
    fn registration_fingerprint_matches_written_body() {
        let store = RecordingStore::new();
        let report =
            publish_scenes(&SceneConfig::default(), &publish_config(), &store).expect("publish");

        let fleet = &report.scenes[0];
        let body = store.object(&fleet.object_key);
        assert_eq!(fleet.sha256, content_fingerprint(&body));
        assert_eq!(
            fleet.content_location,
            "s3://twinfleet-bucket/scene/evfleet.json"
        );
        assert_eq!(fleet.scene_id, "evfleetview");

        let document: SceneDocument =
            serde_json::from_slice(&body).expect("scene should parse");
        assert_eq!(document.root_node_indexes, vec![0, 1, 3, 5]);
    }

    #[test]
    fn manifest_lists_entities_in_scene_order() {
        let store = RecordingStore::new();
        publish_scenes(&SceneConfig::default(), &publish_config(), &store).expect("publish");

        let manifest: PublishManifest =
            serde_json::from_slice(&store.object("scene/manifest.json")).expect("manifest");
        let ids: Vec<_> = manifest
            .entities
            .iter()
            .map(|entity| entity.entity_id.as_str())
            .collect();
        assert_eq!(ids, vec!["FleetEV", "vin100", "vin101", "vin102"]);
        assert_eq!(manifest.published_at, "2026-10-19T00:00:00+00:00");
    }

    #[test]
    fn rejects_invalid_layout_before_writing() {
        let store = RecordingStore::new();
        let mut scene_config = SceneConfig::default();
        scene_config.layout.row_capacity = 0;

        let error = publish_scenes(&scene_config, &publish_config(), &store)
            .expect_err("invalid config should fail");
        assert!(matches!(error, PublishError::InvalidConfig(_)));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn surfaces_store_failures_with_key() {
        let error = publish_scenes(&SceneConfig::default(), &publish_config(), &FailingStore)
            .expect_err("store failure should propagate");
        assert_eq!(
            error.to_string(),
            "failed to store 'scene/evfleet.json': bucket unavailable"
        );
    }

    #[test]
    fn applies_prefix_to_every_key() {
        let store = RecordingStore::new();
        let mut config = publish_config();
        config.prefix = "twinfleet/".to_string();
        publish_scenes(&SceneConfig::default(), &config, &store).expect("publish");

        assert!(store.keys().iter().all(|key| key.starts_with("twinfleet/scene/")));
    }
}
