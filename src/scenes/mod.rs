// src/scenes/mod.rs
// One module per clip.

mod lorenz;
mod pendulum;
mod trig;

pub use lorenz::{lorenz_frame, LorenzFrame, LorenzScene};
pub use pendulum::PendulumScene;
pub use trig::{challenge_frame, ChallengeFrame, TrigScene};
