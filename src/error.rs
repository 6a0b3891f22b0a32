//! Error types for the fallible edges of the crate: level assets, textures
//! and viewer configuration. Rendering itself never fails.

use std::path::PathBuf;

use thiserror::Error;

use crate::world::SegmentId;

/// Problems building a texel table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture size {width}x{height} is empty")]
    EmptySize { width: usize, height: usize },

    #[error("texture size {width}x{height} exceeds the maximum edge length")]
    TooLarge { width: usize, height: usize },

    #[error("expected {expected} texels, got {actual}")]
    TexelCount { expected: usize, actual: usize },

    #[error("pattern parameter `{0}` must be positive")]
    ZeroPatternParameter(&'static str),
}

/// Everything that can go wrong turning a level description into a scene.
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid level description: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("texture `{name}`: {source}")]
    Texture {
        name: String,
        #[source]
        source: TextureError,
    },

    #[error("duplicate texture name `{0}`")]
    DuplicateTexture(String),

    #[error("unknown texture `{0}`")]
    UnknownTexture(String),

    #[error("wall {index} has non-finite coordinates")]
    NonFiniteWall { index: usize },

    #[error("wall {index} has coincident endpoints")]
    DegenerateWall { index: usize },

    #[error("wall {index}: {field} = {value} is outside [0, 1]")]
    FractionOutOfRange {
        index: usize,
        field: &'static str,
        value: f32,
    },

    #[error("cell {segment_id} needs at least 3 points, got {count}")]
    CellTooSmall { segment_id: SegmentId, count: usize },

    #[error("segment {segment_id} does not form a closed outline")]
    OpenOutline { segment_id: SegmentId },

    #[error("invalid player pose: {0}")]
    InvalidPose(&'static str),

    #[error("sprite {index} has a non-finite position")]
    InvalidSprite { index: usize },
}

/// Viewer configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(&'static str),
}
