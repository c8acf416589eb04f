use std::sync::Arc;

use super::*;
use crate::assets::{FontAsset, Resource, SceneAssets};
use crate::environment::{Environment, EnvironmentPreset};
use crate::scene::{SceneConfig, SceneRoot};

const FONT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts");

fn font(file: &str) -> FontAsset {
    let bytes = std::fs::read(format!("{FONT_DIR}/{file}")).unwrap();
    FontAsset::from_bytes(format!("fonts/{file}"), bytes).unwrap()
}

fn ready_assets() -> SceneAssets {
    SceneAssets {
        light_font: Resource::Ready(font("DejaVuSans-ExtraLight.ttf")),
        medium_font: Resource::Ready(font("DejaVuSans.ttf")),
        environment: Resource::Ready(Arc::new(Environment::preset(EnvironmentPreset::Warehouse))),
    }
}

fn small_root() -> SceneRoot {
    let mut cfg = SceneConfig {
        width: 160,
        height: 90,
        ..SceneConfig::default()
    };
    cfg.bubble.width_segments = 32;
    cfg.bubble.height_segments = 24;
    SceneRoot::new(&cfg).unwrap()
}

fn render(renderer: &mut CpuRenderer, root: &SceneRoot, overlay: bool) -> FrameRGBA {
    let composed = root.compose(&ready_assets()).unwrap();
    renderer
        .render(&FrameRequest {
            composed: &composed,
            canvas: root.viewport().canvas,
            background: root.config().background,
            overlay: overlay.then(|| root.overlay()),
        })
        .unwrap()
}

#[test]
fn suspended_frames_show_only_the_clear_color() {
    let settings = RenderSettings {
        tone_mapping: ToneMapping::None,
        ..RenderSettings::default()
    };
    let mut r = CpuRenderer::new(settings, std::env::temp_dir()).unwrap();
    let frame = r
        .render(&FrameRequest {
            composed: &Composed::Suspended,
            canvas: Canvas::new(8, 4).unwrap(),
            background: Color::rgba(1.0, 0.0, 0.0, 1.0),
            overlay: None,
        })
        .unwrap();
    assert!(frame.data.chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
}

#[test]
fn ready_scene_draws_text_and_bubble_over_the_clear_color() {
    let root = small_root();
    let mut r = CpuRenderer::new(RenderSettings::default(), std::env::temp_dir()).unwrap();
    let frame = render(&mut r, &root, false);
    assert_eq!((frame.width, frame.height), (160, 90));
    assert!(frame.data.chunks_exact(4).all(|p| p[3] == 255));

    for (x, y) in [(0, 0), (159, 0), (0, 89), (159, 89)] {
        assert_eq!(frame.pixel(x, y), Some([0, 0, 0, 255]));
    }
    let lit = frame.data.chunks_exact(4).filter(|p| p[0] > 0).count();
    assert!(lit > 100, "only {lit} lit pixels");
}

#[test]
fn output_is_deterministic_across_band_heights() {
    let root = small_root();
    let mut a = CpuRenderer::new(RenderSettings::default(), std::env::temp_dir()).unwrap();
    let mut b = CpuRenderer::new(
        RenderSettings {
            band_rows: 5,
            ..RenderSettings::default()
        },
        std::env::temp_dir(),
    )
    .unwrap();
    let fa = render(&mut a, &root, false);
    assert_eq!(fa, render(&mut b, &root, false));
    assert_eq!(fa, render(&mut a, &root, false));
}

#[test]
fn bubble_moves_the_image_as_it_drifts() {
    let mut root = small_root();
    let mut r = CpuRenderer::new(RenderSettings::default(), std::env::temp_dir()).unwrap();
    let before = render(&mut r, &root, false);
    root.tick(2.0).unwrap();
    let after = render(&mut r, &root, false);
    assert_ne!(before, after);
}

#[test]
fn overlay_caption_is_composited_near_the_bottom() {
    let root = small_root();
    let mut r = CpuRenderer::new(RenderSettings::default(), std::env::temp_dir()).unwrap();
    let plain = render(&mut r, &root, false);
    let with_overlay = render(&mut r, &root, true);

    let row_sum = |f: &FrameRGBA, y: u32| -> u32 {
        (0..f.width).map(|x| u32::from(f.pixel(x, y).unwrap()[0])).sum()
    };
    let caption_rows = 76..86;
    let plain_sum: u32 = caption_rows.clone().map(|y| row_sum(&plain, y)).sum();
    let overlay_sum: u32 = caption_rows.map(|y| row_sum(&with_overlay, y)).sum();
    assert!(overlay_sum > plain_sum);
}
