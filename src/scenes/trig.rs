// src/scenes/trig.rs
// Trigonometry and geometry challenges: the figure draws itself in, the viewer gets time to
// think, then the answer is revealed. Single-problem levels run once over the whole clip; the
// triangle set cycles through its problems in fixed-length segments.
// No simulation; every frame is a function of its index alone.

use crate::challenge::{Challenge, ChallengeLevel, Figure, StrokeKind};
use crate::config::ClipSettings;
use crate::error::Result;
use crate::frame::{fade_window, progress, ramp};
use crate::render::{caption, check_index, fit_equal_aspect, font_px, open_area, watermark, Scene};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

type FigureChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const ACCENT: RGBColor = RGBColor(255, 0, 255);
const GIVEN: RGBColor = RGBColor(170, 170, 255);
const UNKNOWN: RGBColor = RGBColor(255, 68, 68);
const GUIDE: RGBColor = RGBColor(110, 110, 110);

/// Answer placeholder gives way to the solution after this point.
const REVEAL_AT: f64 = 0.8;

/// Opacities and draw-in state for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeFrame {
    pub title_alpha: f64,
    pub question_alpha: f64,
    /// Fraction of the figure drawn so far.
    pub draw_in: f64,
    pub label_alpha: f64,
    pub revealed: bool,
    pub answer_alpha: f64,
}

pub fn challenge_frame(p: f64) -> ChallengeFrame {
    ChallengeFrame {
        title_alpha: fade_window(p, 0.0, 0.1, 0.9, 1.0),
        question_alpha: fade_window(p, 0.2, 0.3, 0.9, 1.0),
        draw_in: ramp(p, 0.1, 0.5),
        label_alpha: ramp(p, 0.3, 0.4),
        revealed: p >= REVEAL_AT,
        answer_alpha: ramp(p, 0.3, 0.4) * (1.0 - ramp(p, 0.95, 1.0)),
    }
}

/// Share of stroke `k` (of `n`, arcs included) that is visible at `draw_in`.
fn stroke_share(draw_in: f64, k: usize, n: usize) -> f64 {
    (draw_in * n as f64 - k as f64).clamp(0.0, 1.0)
}

/// Text centered on a point in figure coordinates.
fn figure_label(
    chart: &mut FigureChart<'_, '_>,
    text: &str,
    at: (f64, f64),
    size: f64,
    color: RGBColor,
    alpha: f64,
) -> Result<()> {
    let fill = color.mix(alpha.min(1.0));
    let style = TextStyle::from(("sans-serif", size).into_font())
        .color(&fill)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(std::iter::once(Text::new(text.to_string(), at, style)))?;
    Ok(())
}

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Frame state for a problem in a cycling set: the figure is up from the start of each
/// problem, its arcs sweep in over the first half and the answer shows for the last fifth.
pub fn cycle_frame(p: f64) -> ChallengeFrame {
    ChallengeFrame {
        title_alpha: 1.0,
        question_alpha: 1.0,
        draw_in: ramp(p, 0.0, 0.5),
        label_alpha: 1.0,
        revealed: p > REVEAL_AT,
        answer_alpha: 1.0,
    }
}

pub struct TrigScene {
    clip: ClipSettings,
    level: ChallengeLevel,
    problems: Vec<(Challenge, Figure)>,
    stem: String,
    frames: usize,
    /// Frames each problem stays on screen.
    segment: usize,
}

impl TrigScene {
    pub fn new(level: ChallengeLevel, clip: ClipSettings) -> Result<Self> {
        clip.validate()?;
        let problems = Challenge::problems(level)
            .into_iter()
            .map(|c| c.validate().map(|()| (c, c.figure())))
            .collect::<Result<Vec<_>>>()?;
        let frames = clip.frames()?;
        let segment = match level.problem_seconds() {
            Some(s) => (clip.fps as usize * s as usize).clamp(1, frames),
            None => frames,
        };
        Ok(Self {
            stem: level.stem(),
            clip,
            level,
            problems,
            frames,
            segment,
        })
    }

    pub fn challenges(&self) -> impl Iterator<Item = &Challenge> + '_ {
        self.problems.iter().map(|(c, _)| c)
    }

    /// Problem shown on frame `index` and the progress through that problem.
    pub fn problem_at(&self, index: usize) -> (usize, f64) {
        let slot = index / self.segment;
        (slot % self.problems.len(), progress(index % self.segment, self.segment))
    }

    fn frame_state(&self, p: f64) -> ChallengeFrame {
        match self.level.problem_seconds() {
            Some(_) => cycle_frame(p),
            None => challenge_frame(p),
        }
    }

    /// Text in the answer box on frame `index`.
    pub fn answer_text(&self, index: usize) -> String {
        let (k, p) = self.problem_at(index);
        if self.frame_state(p).revealed {
            self.problems[k].0.answer()
        } else {
            "x = ?".to_string()
        }
    }
}

impl Scene for TrigScene {
    fn stem(&self) -> &str {
        &self.stem
    }

    fn size(&self) -> (u32, u32) {
        (self.clip.width, self.clip.height())
    }

    fn frame_count(&self) -> usize {
        self.frames
    }

    fn render_frame(&self, index: usize, buffer: &mut [u8]) -> Result<()> {
        check_index(index, self.frames)?;
        let (w, h) = self.size();
        let root = open_area(buffer, (w, h))?;
        let (k, p) = self.problem_at(index);
        let (challenge, figure) = &self.problems[k];
        let f = self.frame_state(p);
        let cx = (w / 2) as i32;
        let y = |frac: f64| (h as f64 * frac) as i32;

        // Figure occupies the middle band of the frame.
        let plot = root.margin(y(0.30), y(0.25), (w / 20) as i32, (w / 20) as i32);
        let ((x0, x1), (y0, y1)) = figure.bounds();
        let (xr, yr) = fit_equal_aspect((x0, x1), (y0, y1), plot.dim_in_pixel());
        let mut chart = ChartBuilder::on(&plot).build_cartesian_2d(xr, yr)?;

        let n = figure.strokes.len() + figure.arcs.len();
        let width_px = (w / 180).max(1);
        for (k, stroke) in figure.strokes.iter().enumerate() {
            let share = stroke_share(f.draw_in, k, n);
            if share <= 0.0 {
                continue;
            }
            let style = match stroke.kind {
                StrokeKind::Ground => GUIDE.stroke_width(width_px),
                StrokeKind::Structure => WHITE.stroke_width(width_px * 2),
                StrokeKind::Sight => RGBColor(255, 255, 0).stroke_width(width_px),
                StrokeKind::Guide => GUIDE.mix(0.8).stroke_width(width_px),
            };
            chart.draw_series(std::iter::once(PathElement::new(
                vec![stroke.from, lerp(stroke.from, stroke.to, share)],
                style,
            )))?;
        }

        let label_px = font_px(w, 18.0);

        let offset = figure.strokes.len();
        for (k, (arc, text)) in figure.arcs.iter().enumerate() {
            let share = stroke_share(f.draw_in, offset + k, n);
            if share <= 0.0 {
                continue;
            }
            chart.draw_series(std::iter::once(PathElement::new(
                arc.points(share, 24),
                ACCENT.stroke_width(width_px),
            )))?;
            if f.label_alpha > 0.0 && !text.is_empty() {
                figure_label(&mut chart, text, arc.label_anchor(), label_px, ACCENT, f.label_alpha)?;
            }
        }

        if f.label_alpha > 0.0 {
            for label in &figure.labels {
                figure_label(&mut chart, &label.text, label.at, label_px, GIVEN, f.label_alpha)?;
            }
            figure_label(&mut chart, "x", figure.unknown, label_px * 1.3, UNKNOWN, f.label_alpha)?;
        }

        if self.clip.captions {
            caption(&root, challenge.title(), (cx, y(0.06)), font_px(w, 30.0), WHITE, f.title_alpha)?;
            for (i, line) in challenge.statement().iter().enumerate() {
                caption(
                    &root,
                    line,
                    (cx, y(0.12 + 0.035 * i as f64)),
                    font_px(w, 17.0),
                    GIVEN,
                    f.title_alpha,
                )?;
            }
            caption(&root, "Can you find x?", (cx, y(0.25)), font_px(w, 24.0), WHITE, f.question_alpha)?;

            // Answer box.
            if f.answer_alpha > 0.0 {
                let (bw, bh) = ((w as f64 * 0.6) as i32, y(0.06));
                let top = y(0.80);
                let fill = RGBColor(34, 34, 34).mix(f.answer_alpha);
                let edge = WHITE.mix(f.answer_alpha);
                root.draw(&Rectangle::new([(cx - bw / 2, top), (cx + bw / 2, top + bh)], fill.filled()))?;
                root.draw(&Rectangle::new([(cx - bw / 2, top), (cx + bw / 2, top + bh)], edge.stroke_width(1)))?;
                let color = if f.revealed { RGBColor(0, 255, 128) } else { WHITE };
                caption(&root, &self.answer_text(index), (cx, top + bh / 2), font_px(w, 22.0), color, f.answer_alpha)?;
            }
            watermark(&root, &format!("@{}", self.clip.watermark), f.title_alpha * 0.7)?;
        }

        root.present()?;
        Ok(())
    }
}
