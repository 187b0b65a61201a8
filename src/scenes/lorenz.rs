// src/scenes/lorenz.rs
// Lorenz attractor drawn in 3D: a short intro, the path revealed while the camera orbits,
// then a fade-out on the finished attractor.

use crate::config::{ClipSettings, LorenzParams};
use crate::error::Result;
use crate::frame::{fade_window, progress, ramp, Gradient};
use crate::logic::{bounds, integrate_samples};
use crate::render::{caption, check_index, font_px, open_area, watermark, Scene};
use plotters::prelude::*;
use tracing::info;

/// Padding around the attractor's bounding box, in state units.
const PADDING: f64 = 2.0;
const INTRO_END: f64 = 0.05;
const OUTRO_START: f64 = 0.95;

/// Phase-dependent drawing parameters for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LorenzFrame {
    /// Number of leading samples drawn as the path.
    pub reveal: usize,
    /// Sample under the moving marker.
    pub marker: usize,
    pub color: RGBColor,
    pub path_alpha: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
    /// Title, equations and watermark.
    pub text_alpha: f64,
    pub subtitle_alpha: f64,
}

/// Drawing parameters at `progress` for a path of `samples` points.
pub fn lorenz_frame(progress: f64, samples: usize, gradient: &Gradient) -> LorenzFrame {
    let last = samples.saturating_sub(1);
    if progress < INTRO_END {
        LorenzFrame {
            reveal: 0,
            marker: 0,
            color: gradient.sample(0.0),
            path_alpha: 1.0,
            pitch_deg: 20.0,
            yaw_deg: 30.0,
            text_alpha: ramp(progress, 0.0, INTRO_END),
            subtitle_alpha: 0.0,
        }
    } else if progress < OUTRO_START {
        let main = (progress - INTRO_END) / (OUTRO_START - INTRO_END);
        let reveal = ((main * samples as f64) as usize).clamp(1, last.max(1));
        LorenzFrame {
            reveal,
            marker: reveal - 1,
            color: gradient.sample(main),
            path_alpha: 1.0,
            pitch_deg: 20.0 + 10.0 * (main * 6.0).sin(),
            yaw_deg: 30.0 + 180.0 * main,
            text_alpha: 1.0,
            subtitle_alpha: fade_window(main, 0.3, 0.5, 0.6, 0.7),
        }
    } else {
        let fade = 1.0 - ramp(progress, OUTRO_START, 1.0);
        LorenzFrame {
            reveal: samples,
            marker: last,
            color: gradient.sample(1.0),
            path_alpha: fade,
            pitch_deg: 30.0,
            yaw_deg: 210.0,
            text_alpha: fade,
            subtitle_alpha: 0.0,
        }
    }
}

fn coefficient(v: f64) -> String {
    if (v - 8.0 / 3.0).abs() < 1e-12 {
        "8/3".to_string()
    } else if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round())
    } else {
        format!("{v:.3}")
    }
}

pub struct LorenzScene {
    clip: ClipSettings,
    params: LorenzParams,
    frames: usize,
    /// The whole path; frames reveal a growing prefix of it.
    samples: Vec<[f64; 3]>,
    gradient: Gradient,
    /// Padded (min, max) per axis.
    limits: [(f64, f64); 3],
}

impl LorenzScene {
    pub fn new(params: LorenzParams, clip: ClipSettings) -> Result<Self> {
        clip.validate()?;
        params.validate()?;

        let frames = clip.frames()?;
        let samples = integrate_samples(&params.system, params.method, params.initial, params.dt, params.samples)?;
        let limits = bounds(&samples).map(|(lo, hi)| (lo - PADDING, hi + PADDING));
        info!(
            frames,
            samples = samples.len(),
            dt = params.dt,
            method = ?params.method,
            "lorenz attractor integrated"
        );

        Ok(Self {
            clip,
            params,
            frames,
            samples,
            gradient: Gradient::aurora(),
            limits,
        })
    }

    /// Every point of the path, sample 0 first.
    pub fn samples(&self) -> &[[f64; 3]] {
        &self.samples
    }

    pub fn frame_params(&self, index: usize) -> LorenzFrame {
        lorenz_frame(progress(index, self.frames), self.samples.len(), &self.gradient)
    }

    fn equations(&self) -> [String; 3] {
        let s = &self.params.system;
        [
            format!("dx/dt = {}(y − x)", coefficient(s.sigma)),
            format!("dy/dt = x({} − z) − y", coefficient(s.rho)),
            format!("dz/dt = xy − {}z", coefficient(s.beta)),
        ]
    }
}

impl Scene for LorenzScene {
    fn stem(&self) -> &str {
        "lorenz_attractor"
    }

    fn size(&self) -> (u32, u32) {
        (self.clip.width, self.clip.height())
    }

    fn frame_count(&self) -> usize {
        self.frames
    }

    fn render_frame(&self, index: usize, buffer: &mut [u8]) -> Result<()> {
        check_index(index, self.frame_count())?;
        let (w, h) = self.size();
        let root = open_area(buffer, (w, h))?;
        let f = self.frame_params(index);
        let samples = &self.samples;

        let plot = root.margin(
            (h as f64 * 0.12) as i32,
            (h as f64 * 0.18) as i32,
            0,
            0,
        );
        let [xl, yl, zl] = self.limits;
        // Lorenz z is drawn as the vertical axis.
        let mut chart = ChartBuilder::on(&plot).build_cartesian_3d(xl.0..xl.1, zl.0..zl.1, yl.0..yl.1)?;
        chart.with_projection(|mut pb| {
            pb.pitch = f.pitch_deg.to_radians();
            pb.yaw = f.yaw_deg.to_radians();
            pb.scale = 0.9;
            pb.into_matrix()
        });

        if f.reveal >= 2 && f.path_alpha > 0.0 {
            chart.draw_series(LineSeries::new(
                samples[..f.reveal].iter().map(|s| (s[0], s[2], s[1])),
                f.color.mix(f.path_alpha).stroke_width(2),
            ))?;
        }
        if let Some(s) = samples.get(f.marker) {
            if f.path_alpha > 0.0 {
                let r = (w / 90).max(2) as i32;
                chart.draw_series(std::iter::once(Circle::new(
                    (s[0], s[2], s[1]),
                    r,
                    WHITE.mix(f.path_alpha).filled(),
                )))?;
            }
        }

        if self.clip.captions {
            let cx = (w / 2) as i32;
            let y = |frac: f64| (h as f64 * frac) as i32;
            caption(&root, "Lorenz Attractor", (cx, y(0.05)), font_px(w, 30.0), WHITE, f.text_alpha)?;
            caption(
                &root,
                "Chaos Theory Visualization",
                (cx, y(0.10)),
                font_px(w, 20.0),
                WHITE,
                f.subtitle_alpha,
            )?;
            for (i, line) in self.equations().iter().enumerate() {
                caption(
                    &root,
                    line,
                    (cx, y(0.85 + 0.035 * i as f64)),
                    font_px(w, 18.0),
                    WHITE,
                    f.text_alpha,
                )?;
            }
            watermark(&root, &self.clip.watermark, f.text_alpha * 0.7)?;
        }

        root.present()?;
        Ok(())
    }
}
