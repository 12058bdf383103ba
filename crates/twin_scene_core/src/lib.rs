//! Scene generation primitives for the fleet digital twin.
//!
//! This crate owns the deterministic scene graph layout, the scene document
//! wire model, and the entity plan that backs its data bindings. It performs
//! no I/O and has no AWS dependencies; publishing lives in
//! `twin_scene_deploy`.

pub mod builder;
pub mod config;
pub mod contract;
pub mod document;
pub mod entities;
pub mod layout;
pub mod storage_keys;

pub use builder::{
    build_scene, EntityKind, PlacementError, SceneBuilder, SceneEntity, UnknownEntityKind,
};
pub use config::{LayoutConfig, NamingConfig, SceneConfig};
pub use contract::{SceneRequest, ValidationError, ViewMode};
pub use document::SceneDocument;
