// src/scenes/pendulum.rs
// Double pendulum swinging from large initial angles, with a fading trace behind the lower bob.

use crate::config::{ClipSettings, PendulumParams};
use crate::error::Result;
use crate::frame::{ramp, FrameSpec};
use crate::logic::{integrate, Trajectory};
use crate::render::{caption, check_index, fit_equal_aspect, font_px, open_area, watermark, Scene};
use plotters::prelude::*;
use tracing::{debug, info};

/// Trace color.
const TRACE: RGBColor = CYAN;
/// Number of alpha bands the trace is split into.
const TRACE_BANDS: usize = 48;

pub struct PendulumScene {
    clip: ClipSettings,
    params: PendulumParams,
    trajectory: Trajectory<4>,
}

impl PendulumScene {
    pub fn new(params: PendulumParams, clip: ClipSettings) -> Result<Self> {
        clip.validate()?;
        params.validate()?;

        let frames = clip.frames()?;
        let dt = 1.0 / (f64::from(clip.fps) * params.steps_per_frame as f64);
        let trajectory = integrate(
            &params.system,
            params.method,
            params.initial_state(),
            dt,
            frames,
            params.steps_per_frame,
        )?;

        let system = params.system;
        let e0 = system.energy(&trajectory.samples()[0]);
        let e1 = trajectory.samples().last().map_or(e0, |s| system.energy(s));
        info!(frames, dt, method = ?params.method, "double pendulum integrated");
        debug!(initial_energy = e0, final_energy = e1, "energy drift {:.3e} J", e1 - e0);

        Ok(Self {
            clip,
            params,
            trajectory,
        })
    }

    pub fn trajectory(&self) -> &Trajectory<4> {
        &self.trajectory
    }

    /// Frame parameters; the trail is measured in integration samples.
    pub fn frame_spec(&self, index: usize) -> FrameSpec {
        FrameSpec::new(index, &self.trajectory, self.params.trail)
    }

    /// Lower-bob positions along the trail of `spec`.
    pub fn trace(&self, spec: &FrameSpec) -> Vec<(f64, f64)> {
        let system = self.params.system;
        self.trajectory.samples()[spec.trail.clone()]
            .iter()
            .map(|s| system.positions(s).1)
            .collect()
    }
}

impl Scene for PendulumScene {
    fn stem(&self) -> &str {
        "double_pendulum"
    }

    fn size(&self) -> (u32, u32) {
        (self.clip.width, self.clip.height())
    }

    fn frame_count(&self) -> usize {
        self.trajectory.len()
    }

    fn render_frame(&self, index: usize, buffer: &mut [u8]) -> Result<()> {
        check_index(index, self.frame_count())?;
        let (w, h) = self.size();
        let root = open_area(buffer, (w, h))?;
        let spec = self.frame_spec(index);
        let system = self.params.system;

        let lim = system.reach() + 0.2;
        let (xr, yr) = fit_equal_aspect((-lim, lim), (-lim, lim), (w, h));
        let mut chart = ChartBuilder::on(&root).build_cartesian_2d(xr, yr)?;

        // Older parts of the trace are fainter.
        let trace = self.trace(&spec);
        if trace.len() > 1 {
            let band = trace.len().div_ceil(TRACE_BANDS).max(1);
            let bands = trace.len().div_ceil(band);
            for (k, start) in (0..trace.len() - 1).step_by(band).enumerate() {
                let end = (start + band + 1).min(trace.len());
                let alpha = 0.15 + 0.85 * (k + 1) as f64 / bands as f64;
                chart.draw_series(std::iter::once(PathElement::new(
                    trace[start..end].to_vec(),
                    TRACE.mix(alpha).stroke_width(1),
                )))?;
            }
        }

        let state = self.trajectory.frame(index);
        let (p1, p2) = system.positions(state);
        let rod = (w / 180).max(1);
        let bob = (w / 54).max(2) as i32;

        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), p1, p2],
            WHITE.stroke_width(rod),
        )))?;
        chart.draw_series(std::iter::once(Circle::new((0.0, 0.0), bob / 3, WHITE.mix(0.6).filled())))?;
        chart.draw_series([p1, p2].into_iter().map(|p| Circle::new(p, bob, WHITE.filled())))?;

        if self.clip.captions {
            let fade = ramp(spec.progress, 0.0, 0.05) * (1.0 - ramp(spec.progress, 0.95, 1.0));
            caption(
                &root,
                "Double Pendulum",
                ((w / 2) as i32, (h as f64 * 0.08) as i32),
                font_px(w, 30.0),
                WHITE,
                fade,
            )?;
            watermark(&root, &self.clip.watermark, fade * 0.7)?;
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_clip() -> ClipSettings {
        ClipSettings {
            duration_s: 1.0,
            fps: 10,
            width: 36,
            captions: false,
            ..ClipSettings::default()
        }
    }

    #[test]
    fn trajectory_matches_clip_length() {
        let scene = PendulumScene::new(PendulumParams::default(), tiny_clip()).unwrap();
        assert_eq!(scene.frame_count(), 10);
        assert_eq!(scene.trajectory().samples().len(), 100);
    }

    #[test]
    fn trace_is_clamped_at_start() {
        let params = PendulumParams {
            trail: Some(25),
            ..PendulumParams::default()
        };
        let scene = PendulumScene::new(params, tiny_clip()).unwrap();
        assert_eq!(scene.trace(&scene.frame_spec(0)).len(), 1);
        assert_eq!(scene.trace(&scene.frame_spec(2)).len(), 21);
        assert_eq!(scene.trace(&scene.frame_spec(5)).len(), 26);
    }

    #[test]
    fn renders_something_on_black() {
        let scene = PendulumScene::new(PendulumParams::default(), tiny_clip()).unwrap();
        let (w, h) = scene.size();
        let mut buf = vec![0u8; (w * h * 3) as usize];
        scene.render_frame(3, &mut buf).unwrap();
        assert!(buf.iter().any(|&b| b > 0));
    }
}
