// src/pipeline.rs
// Drives a scene through a frame sink: one reusable RGB24 buffer, frames in order.

use crate::config::ClipSettings;
use crate::error::{ClipError, Result};
use crate::render::Scene;
use crate::video::open_sink;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Renders every frame of `scene` into `output_dir/<stem>.<ext>` and returns the written path.
///
/// The extension is whatever the sink ended up producing, so an MP4 request that fell back to
/// GIF returns a `.gif` path.
pub fn render_clip(scene: &dyn Scene, clip: &ClipSettings, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let (width, height) = scene.size();
    let total = scene.frame_count();
    let (mut sink, format) = open_sink(clip, output_dir, scene.stem())?;
    info!(clip = scene.stem(), frames = total, width, height, ?format, "rendering");

    let started = Instant::now();
    let report_every = (clip.fps as usize * 5).max(1);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    for index in 0..total {
        scene.render_frame(index, &mut buffer)?;
        sink.write_frame(&buffer)?;
        if (index + 1) % report_every == 0 {
            info!(clip = scene.stem(), "frame {}/{}", index + 1, total);
        }
    }

    let path = sink.finish()?;
    let bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    info!(
        path = %path.display(),
        bytes,
        elapsed_s = started.elapsed().as_secs_f64(),
        "clip written"
    );
    Ok(path)
}

/// File name for a single exported frame.
pub fn still_name(stem: &str, index: usize) -> String {
    format!("{stem}_frame_{index:06}.png")
}

/// Renders frame `index` of `scene` to a PNG at `path`.
pub fn render_still(scene: &dyn Scene, index: usize, path: &Path) -> Result<()> {
    let (width, height) = scene.size();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    scene.render_frame(index, &mut buffer)?;
    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| ClipError::Render("frame buffer does not match frame size".into()))?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    image.save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), frame = index, "still written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_names_are_zero_padded() {
        assert_eq!(still_name("lorenz_attractor", 42), "lorenz_attractor_frame_000042.png");
    }
}
