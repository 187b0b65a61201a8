// src/logic.rs
// Fixed-step integration and trajectory construction.
// Every step returns a fresh state; nothing is updated in place once stored.
// Step size is fixed for the whole clip and there is no error control: the footage depends on
// the exact numerics, so keep them stable.
// Two layouts come out of here: `integrate` ties samples to video frames (k steps per frame),
// `integrate_samples` just produces a fixed number of samples (the Lorenz path).

use crate::error::{ClipError, Result};
use crate::math::VectorField;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper limit on frames in one clip (about nine hours at 30 fps).
pub const MAX_FRAMES: usize = 1_000_000;
/// Upper limit on stored samples in one trajectory.
pub const MAX_SAMPLES: usize = 20_000_000;

/// Explicit integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// s + f(s)·dt
    Euler,
    /// Classic four-stage Runge-Kutta.
    #[default]
    Rk4,
}

/// Element-wise `a + k·b`.
fn axpy<const N: usize>(a: &[f64; N], k: f64, b: &[f64; N]) -> [f64; N] {
    let mut out = *a; // Copy; the input state stays untouched.
    for (o, &bi) in out.iter_mut().zip(b.iter()) {
        *o += k * bi; // One component at a time.
    }
    out
}

/// Single Euler step.
pub fn euler_step<const N: usize, F: VectorField<N>>(field: &F, state: &[f64; N], dt: f64) -> [f64; N] {
    axpy(state, dt, &field.derivative(state)) // s + f(s)·dt
}

/// Single RK4 step: y + (dt/6)(k1 + 2k2 + 2k3 + k4).
pub fn rk4_step<const N: usize, F: VectorField<N>>(field: &F, state: &[f64; N], dt: f64) -> [f64; N] {
    let k1 = field.derivative(state); // Slope at the start.
    let k2 = field.derivative(&axpy(state, 0.5 * dt, &k1)); // Midpoint, using k1.
    let k3 = field.derivative(&axpy(state, 0.5 * dt, &k2)); // Midpoint again, using k2.
    let k4 = field.derivative(&axpy(state, dt, &k3)); // End of the step, using k3.
    let mut next = *state;
    for i in 0..N {
        // Weighted average of the four slopes.
        next[i] += (dt / 6.0) * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    next
}

impl Method {
    /// Advances `state` by `dt`. A negative `dt` runs the system backwards.
    pub fn step<const N: usize, F: VectorField<N>>(self, field: &F, state: &[f64; N], dt: f64) -> [f64; N] {
        match self {
            Method::Euler => euler_step(field, state, dt),
            Method::Rk4 => rk4_step(field, state, dt),
        }
    }
}

/// Number of video frames for a clip: duration × frame rate, rounded.
pub fn frame_count(duration_s: f64, fps: u32) -> Result<usize> {
    if !(duration_s.is_finite() && duration_s > 0.0) {
        return Err(ClipError::Config(format!(
            "duration must be a positive number of seconds, got {duration_s}"
        )));
    }
    if fps == 0 {
        return Err(ClipError::Config("frame rate must be at least 1 fps".into()));
    }
    let exact = (duration_s * f64::from(fps)).round();
    // Checked in floating point, before the cast can saturate.
    if exact > MAX_FRAMES as f64 {
        return Err(ClipError::Config(format!(
            "{duration_s}s at {fps} fps exceeds the {MAX_FRAMES}-frame limit"
        )));
    }
    let frames = exact as usize;
    if frames == 0 {
        return Err(ClipError::Config(format!(
            "{duration_s}s at {fps} fps yields no frames"
        )));
    }
    Ok(frames)
}

/// Per-axis (min, max) over `samples`, skipping non-finite values.
/// An axis with no finite value at all gets (0, 0).
pub fn bounds<const N: usize>(samples: &[[f64; N]]) -> [(f64, f64); N] {
    let mut out = [(f64::INFINITY, f64::NEG_INFINITY); N]; // Empty ranges to start.
    for s in samples {
        for (b, &v) in out.iter_mut().zip(s.iter()) {
            // A diverged run must not blow the plot limits up to infinity.
            if v.is_finite() {
                b.0 = b.0.min(v);
                b.1 = b.1.max(v);
            }
        }
    }
    for b in out.iter_mut() {
        if b.0 > b.1 {
            *b = (0.0, 0.0); // Still empty: nothing finite on this axis.
        }
    }
    out
}

/// Every integration sample of a clip plus the sampling layout that maps them onto frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<const N: usize> {
    samples: Vec<[f64; N]>,
    frames: usize,
    steps_per_frame: usize,
}

impl<const N: usize> Trajectory<N> {
    /// Frame count; fixed before integration begins.
    pub fn len(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// All samples; sample 0 is the initial state.
    pub fn samples(&self) -> &[[f64; N]] {
        &self.samples
    }

    /// Sample index shown on frame `frame`.
    pub fn sample_index(&self, frame: usize) -> usize {
        frame * self.steps_per_frame
    }

    /// State shown on frame `frame`.
    pub fn frame(&self, frame: usize) -> &[f64; N] {
        &self.samples[self.sample_index(frame)]
    }

    /// Per-frame states, in order.
    pub fn frames(&self) -> impl Iterator<Item = &[f64; N]> + '_ {
        self.samples.iter().step_by(self.steps_per_frame)
    }

    pub fn bounds(&self) -> [(f64, f64); N] {
        bounds(&self.samples)
    }
}

/// Integrates `count - 1` fixed steps of size `dt` from `initial`, returning `count` samples.
pub fn integrate_samples<const N: usize, F: VectorField<N>>(
    field: &F,
    method: Method,
    initial: [f64; N],
    dt: f64,
    count: usize,
) -> Result<Vec<[f64; N]>> {
    if !(dt.is_finite() && dt != 0.0) {
        return Err(ClipError::Config(format!("step size must be non-zero, got {dt}")));
    }
    if count == 0 || count > MAX_SAMPLES {
        return Err(ClipError::Config(format!(
            "sample count must be between 1 and {MAX_SAMPLES}, got {count}"
        )));
    }

    let mut samples = Vec::with_capacity(count); // Exact size is known up front.
    let mut state = initial;
    samples.push(state); // Sample 0 is the initial condition.
    for _ in 1..count {
        state = method.step(field, &state, dt); // New state from the previous one.
        samples.push(state);
    }
    Ok(samples)
}

/// Integrates `frames × steps_per_frame` fixed steps of size `dt` from `initial`.
pub fn integrate<const N: usize, F: VectorField<N>>(
    field: &F,
    method: Method,
    initial: [f64; N],
    dt: f64,
    frames: usize,
    steps_per_frame: usize,
) -> Result<Trajectory<N>> {
    if steps_per_frame == 0 {
        return Err(ClipError::Config("steps_per_frame must be at least 1".into()));
    }
    if frames == 0 {
        return Err(ClipError::Config("a trajectory needs at least one frame".into()));
    }
    // Both factors come from user input; refuse instead of wrapping.
    let total = frames.checked_mul(steps_per_frame).ok_or_else(|| {
        ClipError::Config(format!("{frames} frames × {steps_per_frame} steps overflows"))
    })?;

    let samples = integrate_samples(field, method, initial, dt, total)?;
    debug!(frames, steps_per_frame, samples = samples.len(), ?method, "integrated trajectory");
    Ok(Trajectory {
        samples,
        frames,
        steps_per_frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{DoublePendulum, Lorenz};

    /// ds/dt = -s, exact solution e^{-t}.
    struct Decay;

    impl VectorField<1> for Decay {
        fn derivative(&self, state: &[f64; 1]) -> [f64; 1] {
            [-state[0]]
        }
    }

    #[test]
    fn euler_step_is_state_plus_slope() {
        assert_eq!(euler_step(&Decay, &[1.0], 0.1), [0.9]);
    }

    #[test]
    fn rk4_tracks_exponential_decay() {
        let mut s = [1.0];
        for _ in 0..100 {
            s = rk4_step(&Decay, &s, 0.01);
        }
        assert!((s[0] - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn rk4_beats_euler_on_decay() {
        let mut e = [1.0];
        let mut r = [1.0];
        for _ in 0..10 {
            e = Method::Euler.step(&Decay, &e, 0.1);
            r = Method::Rk4.step(&Decay, &r, 0.1);
        }
        let exact = (-1.0f64).exp();
        assert!((r[0] - exact).abs() < (e[0] - exact).abs());
    }

    #[test]
    fn frame_count_examples() {
        assert_eq!(frame_count(30.0, 30).unwrap(), 900);
        assert_eq!(frame_count(15.0, 30).unwrap(), 450);
        assert_eq!(frame_count(2.5, 24).unwrap(), 60);
        assert_eq!(frame_count(10.0, 60).unwrap(), 600);
    }

    #[test]
    fn frame_count_rejects_degenerate_input() {
        assert!(frame_count(0.0, 30).is_err());
        assert!(frame_count(-1.0, 30).is_err());
        assert!(frame_count(f64::NAN, 30).is_err());
        assert!(frame_count(10.0, 0).is_err());
        assert!(frame_count(0.001, 30).is_err());
    }

    #[test]
    fn frame_count_rejects_absurd_durations() {
        assert!(matches!(frame_count(1e20, 30), Err(ClipError::Config(_))));
        assert!(matches!(frame_count(f64::MAX, u32::MAX), Err(ClipError::Config(_))));
    }

    #[test]
    fn oversized_layouts_are_config_errors() {
        let p = DoublePendulum::default();
        assert!(matches!(
            integrate(&p, Method::Rk4, [0.0; 4], 0.01, usize::MAX, 2),
            Err(ClipError::Config(_))
        ));
        assert!(matches!(
            integrate(&p, Method::Rk4, [0.0; 4], 0.01, MAX_FRAMES, 1000),
            Err(ClipError::Config(_))
        ));
        assert!(integrate_samples(&p, Method::Rk4, [0.0; 4], 0.01, MAX_SAMPLES + 1).is_err());
    }

    #[test]
    fn trajectory_layout() {
        let t = integrate(&Lorenz::default(), Method::Rk4, [0.1, 0.0, 0.0], 0.01, 20, 4).unwrap();
        assert_eq!(t.len(), 20);
        assert_eq!(t.samples().len(), 80);
        assert_eq!(t.frame(0), &[0.1, 0.0, 0.0]);
        assert_eq!(t.frame(3), &t.samples()[12]);
        assert_eq!(t.frames().count(), 20);
    }

    #[test]
    fn sample_count_is_independent_of_frames() {
        let s = integrate_samples(&Lorenz::default(), Method::Euler, [0.1, 0.0, 0.0], 0.01, 8000).unwrap();
        assert_eq!(s.len(), 8000);
        assert_eq!(s[0], [0.1, 0.0, 0.0]);
        // First Euler step: x' = σ(y − x) = -1.
        assert!((s[1][0] - 0.09).abs() < 1e-15);
    }

    #[test]
    fn integrate_rejects_zero_step() {
        assert!(integrate(&DoublePendulum::default(), Method::Rk4, [0.0; 4], 0.0, 10, 1).is_err());
        assert!(integrate(&DoublePendulum::default(), Method::Rk4, [0.0; 4], 0.01, 10, 0).is_err());
    }

    #[test]
    fn bounds_cover_samples() {
        let t = integrate(&Decay, Method::Euler, [2.0], 0.5, 3, 1).unwrap();
        // 2.0, 1.0, 0.5
        assert_eq!(t.bounds(), [(0.5, 2.0)]);
    }

    #[test]
    fn bounds_skip_non_finite() {
        let b = bounds(&[[1.0, f64::NAN], [f64::INFINITY, f64::NAN], [-3.0, f64::NAN]]);
        assert_eq!(b, [(-3.0, 1.0), (0.0, 0.0)]);
    }
}
