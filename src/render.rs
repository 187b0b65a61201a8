// src/render.rs
// Canvas plumbing shared by the scenes: every frame is drawn by plotters straight into an RGB24
// buffer (BitMapBackend::with_buffer), which the video stage then consumes as-is.

use crate::error::{ClipError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

/// Root drawing area over a frame buffer.
pub type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Background of every clip.
pub const BACKGROUND: RGBColor = BLACK;

/// Something that can be rendered frame by frame into a clip.
pub trait Scene {
    /// Output file stem, e.g. `double_pendulum`.
    fn stem(&self) -> &str;

    /// Frame size in pixels (width, height).
    fn size(&self) -> (u32, u32);

    /// Number of frames in the clip.
    fn frame_count(&self) -> usize;

    /// Draws frame `index` into `buffer` (RGB24, row-major, `width × height × 3` bytes).
    fn render_frame(&self, index: usize, buffer: &mut [u8]) -> Result<()>;
}

/// Rejects frame indices past the end of a clip.
pub fn check_index(index: usize, total: usize) -> Result<()> {
    if index < total {
        Ok(())
    } else {
        Err(ClipError::Config(format!("frame {index} is out of range for a {total}-frame clip")))
    }
}

/// Wraps `buffer` in a drawing area cleared to the background color.
pub fn open_area(buffer: &mut [u8], (width, height): (u32, u32)) -> Result<Area<'_>> {
    let expected = width as usize * height as usize * 3;
    if buffer.len() != expected {
        return Err(ClipError::Render(format!(
            "frame buffer holds {} bytes, {width}x{height} needs {expected}",
            buffer.len()
        )));
    }
    let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
    root.fill(&BACKGROUND)?;
    Ok(root)
}

/// Expands the data box so one unit spans the same number of pixels on both axes.
/// The box stays centered; the shorter side grows.
pub fn fit_equal_aspect(
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
    (width, height): (u32, u32),
) -> (Range<f64>, Range<f64>) {
    let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
    let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    let mut span_x = (x1 - x0).abs().max(f64::EPSILON);
    let mut span_y = (y1 - y0).abs().max(f64::EPSILON);
    if span_x / span_y < w / h {
        span_x = span_y * w / h;
    } else {
        span_y = span_x * h / w;
    }
    (
        cx - span_x / 2.0..cx + span_x / 2.0,
        cy - span_y / 2.0..cy + span_y / 2.0,
    )
}

/// Font size scaled to the frame width; `em` is the size at a 540 px wide frame.
pub fn font_px(width: u32, em: f64) -> f64 {
    em * f64::from(width) / 540.0
}

/// Centered text at a pixel position; skipped entirely when fully transparent.
pub fn caption(
    area: &Area<'_>,
    text: &str,
    at: (i32, i32),
    size: f64,
    color: RGBColor,
    alpha: f64,
) -> Result<()> {
    if alpha <= 0.0 || text.is_empty() {
        return Ok(());
    }
    let fill = color.mix(alpha.min(1.0));
    let style = TextStyle::from(("sans-serif", size).into_font())
        .color(&fill)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(text.to_string(), at, style))?;
    Ok(())
}

/// Watermark in the lower-right corner.
pub fn watermark(area: &Area<'_>, text: &str, alpha: f64) -> Result<()> {
    if alpha <= 0.0 || text.is_empty() {
        return Ok(());
    }
    let (w, h) = area.dim_in_pixel();
    let size = font_px(w, 16.0);
    let fill = WHITE.mix(alpha.min(1.0));
    let style = TextStyle::from(("sans-serif", size).into_font())
        .color(&fill)
        .pos(Pos::new(HPos::Right, VPos::Bottom));
    let at = ((w as f64 * 0.95) as i32, (h as f64 * 0.97) as i32);
    area.draw(&Text::new(text.to_string(), at, style))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_aspect_grows_the_short_side() {
        // 2 x 2 box into a 9:16 frame: x stays, y grows.
        let (x, y) = fit_equal_aspect((-1.0, 1.0), (-1.0, 1.0), (90, 160));
        assert!((x.start + 1.0).abs() < 1e-12 && (x.end - 1.0).abs() < 1e-12);
        let span_y = y.end - y.start;
        assert!((span_y - 2.0 * 160.0 / 90.0).abs() < 1e-12);
        assert!((y.start + y.end).abs() < 1e-12);
    }

    #[test]
    fn equal_aspect_wide_box() {
        let (x, y) = fit_equal_aspect((0.0, 10.0), (0.0, 100.0), (100, 100));
        assert!((x.end - x.start - 100.0).abs() < 1e-12);
        assert!((y.end - y.start - 100.0).abs() < 1e-12);
        assert!(((x.start + x.end) / 2.0 - 5.0).abs() < 1e-12);
    }

    #[test]
    fn open_area_checks_buffer_size() {
        let mut small = vec![0u8; 10];
        assert!(open_area(&mut small, (4, 4)).is_err());
    }

    #[test]
    fn open_area_clears_to_black() {
        let mut buf = vec![200u8; 4 * 4 * 3];
        {
            let root = open_area(&mut buf, (4, 4)).unwrap();
            root.present().unwrap();
        }
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn index_bounds() {
        assert!(check_index(0, 1).is_ok());
        assert!(check_index(1, 1).is_err());
    }

    #[test]
    fn font_scales_with_width() {
        assert_eq!(font_px(540, 20.0), 20.0);
        assert_eq!(font_px(1080, 20.0), 40.0);
    }
}
