//! Publishing adapters for generated scenes.
//!
//! This crate owns the I/O around `twin_scene_core`: writing scene documents
//! and their manifest to a store (local directory or S3) and the command-line
//! entry point that drives it.

pub mod adapters;
pub mod handlers;
