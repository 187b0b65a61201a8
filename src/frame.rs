// src/frame.rs
// Per-frame rendering parameters. Everything here is a pure function of the frame index and the
// trajectory layout, so any frame can be rendered on its own (stills, tests).

use crate::logic::Trajectory;
use plotters::style::RGBColor;
use std::ops::Range;

/// What the renderer needs to know about one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub index: usize,
    pub total: usize,
    /// index / total, in [0, 1).
    pub progress: f64,
    /// Sample index of the state shown on this frame.
    pub head: usize,
    /// Samples drawn as the trailing path, ending at `head` inclusive.
    pub trail: Range<usize>,
}

impl FrameSpec {
    /// Frame `index` of `trajectory`, keeping at most `window` samples of history behind the head.
    pub fn new<const N: usize>(index: usize, trajectory: &Trajectory<N>, window: Option<usize>) -> Self {
        let head = trajectory.sample_index(index);
        Self {
            index,
            total: trajectory.len(),
            progress: progress(index, trajectory.len()),
            head,
            trail: trail_window(head, window),
        }
    }
}

/// Normalized position of `index` in a clip of `total` frames.
pub fn progress(index: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        index as f64 / total as f64
    }
}

/// Index range of the trail ending at `head`. Clamps at the start of the trajectory, never wraps.
pub fn trail_window(head: usize, window: Option<usize>) -> Range<usize> {
    let start = match window {
        Some(w) => head.saturating_sub(w),
        None => 0,
    };
    start..head + 1
}

/// Linear ramp from 0 at `start` to 1 at `end`, clamped.
pub fn ramp(x: f64, start: f64, end: f64) -> f64 {
    if end <= start {
        return if x >= end { 1.0 } else { 0.0 };
    }
    ((x - start) / (end - start)).clamp(0.0, 1.0)
}

/// Opacity that fades in over [in_start, in_end] and out over [out_start, out_end].
pub fn fade_window(x: f64, in_start: f64, in_end: f64, out_start: f64, out_end: f64) -> f64 {
    ramp(x, in_start, in_end) * (1.0 - ramp(x, out_start, out_end))
}

/// Piecewise-linear color gradient over evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<RGBColor>,
}

impl Gradient {
    pub fn new(stops: Vec<RGBColor>) -> Self {
        Self { stops }
    }

    /// Purple to bright cyan.
    pub fn aurora() -> Self {
        Self::new(vec![
            RGBColor(153, 0, 153),
            RGBColor(102, 0, 204),
            RGBColor(0, 128, 255),
            RGBColor(0, 204, 255),
            RGBColor(0, 255, 255),
        ])
    }

    /// Color at `t` in [0, 1]; out-of-range values clamp to the end stops.
    pub fn sample(&self, t: f64) -> RGBColor {
        match self.stops.len() {
            0 => RGBColor(255, 255, 255),
            1 => self.stops[0],
            n => {
                let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
                let pos = t * (n - 1) as f64;
                let i = (pos.floor() as usize).min(n - 2);
                let f = pos - i as f64;
                lerp_color(self.stops[i], self.stops[i + 1], f)
            }
        }
    }

    /// Color for frame `index` of `total`.
    pub fn at_frame(&self, index: usize, total: usize) -> RGBColor {
        self.sample(progress(index, total))
    }
}

fn lerp_color(a: RGBColor, b: RGBColor, f: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * f).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{integrate, Method};
    use crate::math::Lorenz;
    use proptest::prelude::*;

    #[test]
    fn trail_clamps_at_start() {
        assert_eq!(trail_window(0, Some(50)), 0..1);
        assert_eq!(trail_window(10, Some(50)), 0..11);
        assert_eq!(trail_window(100, Some(50)), 50..101);
        assert_eq!(trail_window(100, None), 0..101);
    }

    #[test]
    fn frame_follows_trajectory_layout() {
        let t = integrate(&Lorenz::default(), Method::Rk4, [0.1, 0.0, 0.0], 0.01, 10, 5).unwrap();
        let spec = FrameSpec::new(4, &t, Some(7));
        assert_eq!(spec.head, 20);
        assert_eq!(spec.trail, 13..21);
        assert_eq!(spec.total, 10);
        assert!((spec.progress - 0.4).abs() < 1e-12);
    }

    #[test]
    fn ramps_and_fades() {
        assert_eq!(ramp(0.05, 0.0, 0.1), 0.5);
        assert_eq!(ramp(-1.0, 0.0, 0.1), 0.0);
        assert_eq!(ramp(2.0, 0.0, 0.1), 1.0);
        assert_eq!(fade_window(0.5, 0.2, 0.3, 0.9, 1.0), 1.0);
        assert!((fade_window(0.95, 0.2, 0.3, 0.9, 1.0) - 0.5).abs() < 1e-9);
        assert_eq!(fade_window(0.1, 0.2, 0.3, 0.9, 1.0), 0.0);
    }

    #[test]
    fn gradient_endpoints() {
        let g = Gradient::aurora();
        assert_eq!(g.sample(0.0), RGBColor(153, 0, 153));
        assert_eq!(g.sample(1.0), RGBColor(0, 255, 255));
        assert_eq!(g.sample(7.0), RGBColor(0, 255, 255));
        assert_eq!(g.sample(0.5), RGBColor(0, 128, 255));
    }

    proptest! {
        #[test]
        fn trail_never_exceeds_window(head in 0usize..10_000, window in 0usize..500) {
            let r = trail_window(head, Some(window));
            prop_assert!(r.end == head + 1);
            prop_assert!(r.len() <= window + 1);
            prop_assert!(r.start <= head);
        }

        #[test]
        fn gradient_is_deterministic_per_frame(index in 0usize..900) {
            let g = Gradient::aurora();
            prop_assert_eq!(g.at_frame(index, 900), g.at_frame(index, 900));
        }

        #[test]
        fn blue_channel_rises_with_progress(a in 0usize..900, b in 0usize..900) {
            // Blue is non-decreasing along the aurora stops.
            let g = Gradient::aurora();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(g.at_frame(lo, 900).2 <= g.at_frame(hi, 900).2);
        }
    }
}
