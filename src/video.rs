// src/video.rs
// Frame sinks. MP4 goes through an `ffmpeg` child process fed raw RGB24 frames on stdin;
// GIF is encoded in-process with the `image` crate.

use crate::config::{ClipSettings, OutputFormat};
use crate::error::{ClipError, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::rc::Rc;
use tracing::{debug, warn};

/// Consumes frames in order and produces one file.
pub trait FrameSink {
    /// Appends one RGB24 frame.
    fn write_frame(&mut self, rgb: &[u8]) -> Result<()>;

    /// Flushes and closes the output, returning its path.
    fn finish(self: Box<Self>) -> Result<PathBuf>;
}

/// Frame geometry and timing shared by the writers.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub artist: String,
}

impl VideoSpec {
    pub fn from_clip(clip: &ClipSettings) -> Self {
        Self {
            width: clip.width,
            height: clip.height(),
            fps: clip.fps,
            bitrate_kbps: clip.bitrate_kbps,
            artist: clip.watermark.clone(),
        }
    }

    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    fn check_frame(&self, rgb: &[u8]) -> Result<()> {
        if rgb.len() == self.frame_bytes() {
            Ok(())
        } else {
            Err(ClipError::Render(format!(
                "frame has {} bytes, expected {} for {}x{}",
                rgb.len(),
                self.frame_bytes(),
                self.width,
                self.height
            )))
        }
    }
}

/// Pipes frames into an external H.264 encoder.
pub struct FfmpegWriter {
    program: String,
    spec: VideoSpec,
    path: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegWriter {
    /// Starts `program` writing to `path`. Fails with `EncoderUnavailable` when it cannot be run.
    pub fn spawn(program: &str, spec: VideoSpec, path: &Path) -> Result<Self> {
        let mut child = Command::new(program)
            .args(["-y", "-loglevel", "error"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &format!("{}x{}", spec.width, spec.height)])
            .args(["-r", &spec.fps.to_string()])
            .args(["-i", "-"])
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .args(["-b:v", &format!("{}k", spec.bitrate_kbps)])
            .args(["-metadata", &format!("artist={}", spec.artist)])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => ClipError::EncoderUnavailable {
                    program: program.to_string(),
                },
                _ => ClipError::Io(e),
            })?;
        let stdin = child.stdin.take();
        debug!(program, path = %path.display(), "encoder started");

        Ok(Self {
            program: program.to_string(),
            spec,
            path: path.to_path_buf(),
            child,
            stdin,
        })
    }

    /// Reaps the child after its input pipe broke, reporting how it exited.
    fn encoder_failure(&mut self, err: io::Error) -> ClipError {
        self.stdin = None;
        match self.child.wait() {
            Ok(status) if !status.success() => ClipError::EncoderFailed {
                program: self.program.clone(),
                status,
            },
            Ok(_) => ClipError::Io(err),
            Err(wait_err) => ClipError::Io(wait_err),
        }
    }
}

impl FrameSink for FfmpegWriter {
    fn write_frame(&mut self, rgb: &[u8]) -> Result<()> {
        self.spec.check_frame(rgb)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ClipError::Io(io::Error::new(ErrorKind::BrokenPipe, "encoder input closed")));
        };
        if let Err(e) = stdin.write_all(rgb) {
            return Err(self.encoder_failure(e));
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<PathBuf> {
        // Closing stdin signals end of stream.
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            return Err(ClipError::EncoderFailed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(self.path.clone())
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        // Abandoned mid-stream: don't leave the encoder running.
        if self.stdin.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// In-memory byte sink shared with the GIF encoder. The encoder writes its trailer when it
/// drops, so the bytes are collected here and written to disk by `GifWriter::finish`, where
/// an I/O failure can still be reported.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Animated GIF, looping forever.
pub struct GifWriter {
    spec: VideoSpec,
    path: PathBuf,
    file: File,
    bytes: SharedBuffer,
    encoder: GifEncoder<SharedBuffer>,
    delay: Delay,
}

impl GifWriter {
    /// Opens `path` right away so an unwritable location fails before any frame is rendered.
    pub fn create(spec: VideoSpec, path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        let bytes = SharedBuffer::default();
        let mut encoder = GifEncoder::new_with_speed(bytes.clone(), 10);
        encoder.set_repeat(Repeat::Infinite)?;
        let delay = Delay::from_numer_denom_ms(1000, spec.fps.max(1));
        Ok(Self {
            spec,
            path: path.to_path_buf(),
            file,
            bytes,
            encoder,
            delay,
        })
    }
}

impl FrameSink for GifWriter {
    fn write_frame(&mut self, rgb: &[u8]) -> Result<()> {
        self.spec.check_frame(rgb)?;
        let image = RgbImage::from_raw(self.spec.width, self.spec.height, rgb.to_vec())
            .ok_or_else(|| ClipError::Render("frame buffer does not match frame size".into()))?;
        let rgba = DynamicImage::ImageRgb8(image).into_rgba8();
        self.encoder.encode_frame(Frame::from_parts(rgba, 0, 0, self.delay))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        let Self {
            path,
            mut file,
            bytes,
            encoder,
            ..
        } = *self;
        // Dropping the encoder appends the trailer to `bytes`.
        drop(encoder);
        let data = bytes.0.take();
        file.write_all(&data)?;
        file.flush()?;
        debug!(path = %path.display(), bytes = data.len(), "gif written");
        Ok(path)
    }
}

/// Output path for `stem` in `dir` with the extension of `format`.
pub fn output_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Opens the sink the settings ask for. An MP4 request falls back to GIF when the encoder is
/// missing and `gif_fallback` is on; otherwise `EncoderUnavailable` is returned.
pub fn open_sink(clip: &ClipSettings, dir: &Path, stem: &str) -> Result<(Box<dyn FrameSink>, OutputFormat)> {
    let spec = VideoSpec::from_clip(clip);
    match clip.format {
        OutputFormat::Gif => {
            let path = output_path(dir, stem, OutputFormat::Gif);
            Ok((Box::new(GifWriter::create(spec, &path)?), OutputFormat::Gif))
        }
        OutputFormat::Mp4 => {
            let path = output_path(dir, stem, OutputFormat::Mp4);
            match FfmpegWriter::spawn(&clip.encoder, spec.clone(), &path) {
                Ok(writer) => Ok((Box::new(writer), OutputFormat::Mp4)),
                Err(ClipError::EncoderUnavailable { program }) if clip.gif_fallback => {
                    warn!(program, "encoder not found, writing GIF instead");
                    let path = output_path(dir, stem, OutputFormat::Gif);
                    Ok((Box::new(GifWriter::create(spec, &path)?), OutputFormat::Gif))
                }
                Err(e) => Err(e),
            }
        }
    }
}
