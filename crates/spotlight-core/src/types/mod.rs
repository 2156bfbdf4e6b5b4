//! Core type definitions used across the SpotLight workspace.

pub mod id;

pub use id::*;
