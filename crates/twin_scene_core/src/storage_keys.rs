use crate::contract::ViewMode;

const SCENE_DIRECTORY: &str = "scene";

fn scene_object_name(view_mode: ViewMode) -> &'static str {
    match view_mode {
        ViewMode::Fleet => "evfleet.json",
        ViewMode::Inspection => "inspectionview.json",
    }
}

fn join_prefix(base_prefix: &str, key: &str) -> String {
    let trimmed = base_prefix.trim_matches('/');
    if trimmed.is_empty() {
        key.to_string()
    } else {
        format!("{trimmed}/{key}")
    }
}

pub fn scene_object_key(base_prefix: &str, view_mode: ViewMode) -> String {
    join_prefix(
        base_prefix,
        &format!("{SCENE_DIRECTORY}/{}", scene_object_name(view_mode)),
    )
}

pub fn manifest_object_key(base_prefix: &str) -> String {
    join_prefix(base_prefix, &format!("{SCENE_DIRECTORY}/manifest.json"))
}

/// Concatenated verbatim; a malformed bucket URI yields a malformed asset URI.
pub fn model_asset_uri(bucket_uri: &str, model_file: &str) -> String {
    format!("{bucket_uri}/{model_file}")
}

pub fn content_location(bucket_uri: &str, object_key: &str) -> String {
    format!("{bucket_uri}/{object_key}")
}
