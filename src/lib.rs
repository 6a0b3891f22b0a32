//! Pseudo-3D segment raycaster.
//!
//! The world is a flat list of wall segments grouped into cells by segment
//! id. Each screen column casts one ray, orders the walls it crosses, and
//! paints wall faces, floors and ceilings front to back into a shrinking
//! window, then blends billboard sprites into whatever stayed visible.
//!
//! ```no_run
//! use segcast::{Scene, render_frame};
//!
//! let scene = Scene::load("level.toml")?;
//! let fb = render_frame(&scene.level, &scene.textures, &scene.pose, &scene.sprites, 320, 240);
//! assert_eq!(fb.pixels().len(), 320 * 240);
//! # Ok::<(), segcast::LevelError>(())
//! ```

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod level;
pub mod renderer;
pub mod scaler;
pub mod span;
pub mod sprites;
pub mod texture;
pub mod visibility;
pub mod world;

pub use camera::PlayerPose;
pub use config::ViewerConfig;
pub use error::{ConfigError, LevelError, TextureError};
pub use framebuffer::Framebuffer;
pub use geometry::{Segment, Vec2};
pub use level::Scene;
pub use renderer::{Renderer, render_frame};
pub use texture::{Texture, TextureBank, TextureId};
pub use world::{Level, SegmentId, Sprite, WallSegment};

/// Built-in level used when the viewer is started without one.
pub const DEMO_LEVEL: &str = include_str!("../assets/demo.toml");
