//! Short physics and math animation clips in portrait 9:16: a double pendulum, the Lorenz
//! attractor and trigonometry challenges, rendered frame by frame and encoded to MP4 or GIF.

pub mod challenge;
pub mod config;
pub mod error;
pub mod frame;
pub mod logic;
pub mod math;
pub mod pipeline;
pub mod render;
pub mod scenes;
pub mod video;

pub use config::{ClipSettings, Config, LorenzParams, OutputFormat, PendulumParams};
pub use error::{ClipError, Result};
pub use render::Scene;
