use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use motion_clips::challenge::ChallengeLevel;
use motion_clips::config::{ClipSettings, LorenzParams, OutputFormat, PendulumParams};
use motion_clips::pipeline::{render_clip, render_still, still_name};
use motion_clips::scenes::{LorenzScene, PendulumScene, TrigScene};
use motion_clips::{ClipError, Scene};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tempfile::tempdir;

fn tiny_clip(format: OutputFormat) -> ClipSettings {
    ClipSettings {
        duration_s: 1.0,
        fps: 10,
        width: 36,
        format,
        captions: false,
        ..ClipSettings::default()
    }
}

fn gif_frames(path: &Path) -> usize {
    let decoder = GifDecoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    decoder.into_frames().collect_frames().unwrap().len()
}

#[test]
fn pendulum_gif_has_one_frame_per_trajectory_frame() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("out");
    let clip = tiny_clip(OutputFormat::Gif);
    let scene = PendulumScene::new(PendulumParams::default(), clip.clone()).unwrap();

    let path = render_clip(&scene, &clip, &dir).unwrap();

    assert_eq!(path, dir.join("double_pendulum.gif"));
    assert!(fs::read(&path).unwrap().starts_with(b"GIF89a"));
    assert_eq!(gif_frames(&path), scene.trajectory().len());
}

#[test]
fn missing_encoder_falls_back_to_gif() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("out");
    let clip = ClipSettings {
        encoder: "motion-clips-no-such-encoder".into(),
        ..tiny_clip(OutputFormat::Mp4)
    };
    let params = LorenzParams {
        samples: 400,
        ..LorenzParams::default()
    };
    let scene = LorenzScene::new(params, clip.clone()).unwrap();

    let path = render_clip(&scene, &clip, &dir).unwrap();

    assert_eq!(path, dir.join("lorenz_attractor.gif"));
    assert_eq!(gif_frames(&path), 10);
}

#[test]
fn missing_encoder_without_fallback_fails() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("out");
    let clip = ClipSettings {
        encoder: "motion-clips-no-such-encoder".into(),
        gif_fallback: false,
        ..tiny_clip(OutputFormat::Mp4)
    };
    let scene = PendulumScene::new(PendulumParams::default(), clip.clone()).unwrap();

    let err = render_clip(&scene, &clip, &dir).unwrap_err();
    assert!(matches!(err, ClipError::EncoderUnavailable { ref program } if program == "motion-clips-no-such-encoder"));
    assert!(!dir.join("double_pendulum.mp4").exists());
}

#[test]
fn still_is_a_portrait_png() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("out");
    let clip = tiny_clip(OutputFormat::Gif);
    let scene = LorenzScene::new(LorenzParams::default(), clip).unwrap();
    let path = dir.join(still_name(scene.stem(), 7));

    render_still(&scene, 7, &path).unwrap();

    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (36, 64));
    assert!(path.ends_with("lorenz_attractor_frame_000007.png"));
}

#[test]
fn still_past_the_end_is_rejected() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("out");
    let clip = tiny_clip(OutputFormat::Gif);
    let scene = PendulumScene::new(PendulumParams::default(), clip).unwrap();
    let err = render_still(&scene, 10, &dir.join("x.png")).unwrap_err();
    assert!(matches!(err, ClipError::Config(_)));
}

#[test]
fn triangle_challenge_renders_to_gif() {
    let tmp = tempdir().unwrap();
    let clip = ClipSettings {
        duration_s: 2.0,
        fps: 5,
        width: 90,
        format: OutputFormat::Gif,
        ..ClipSettings::default()
    };
    let scene = TrigScene::new(ChallengeLevel::Triangle, clip.clone()).unwrap();

    let path = render_clip(&scene, &clip, tmp.path()).unwrap();

    assert_eq!(path, tmp.path().join("triangle_angle_challenge.gif"));
    assert_eq!(gif_frames(&path), 10);
}
