use std::io::Cursor;

use super::*;
use crate::environment::EnvironmentPreset;

const FONT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "bubble_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn requests(light: &str, medium: &str) -> AssetRequests {
    AssetRequests {
        light_font: light.to_owned(),
        medium_font: medium.to_owned(),
        environment: EnvironmentSource::Preset(EnvironmentPreset::Warehouse),
    }
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.ttf").unwrap(), "a/b.ttf");
    assert_eq!(normalize_rel_path("a\\b.ttf").unwrap(), "a/b.ttf");
    assert_eq!(normalize_rel_path("./fonts//x.ttf").unwrap(), "fonts/x.ttf");
    assert!(normalize_rel_path("../x.ttf").is_err());
    assert!(normalize_rel_path("/abs.ttf").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn resource_accessors() {
    let r: Resource<u8> = Resource::Pending;
    assert!(r.is_pending() && !r.is_ready() && r.ready().is_none());
    let r = Resource::Ready(7u8);
    assert_eq!(r.ready(), Some(&7));
    let r: Resource<u8> = Resource::Failed(Arc::new(BubbleError::asset("gone")));
    assert!(!r.is_pending() && !r.is_ready());
}

#[test]
fn preset_environment_is_ready_before_polling() {
    let loader = AssetLoader::spawn(FONT_DIR, &requests("fonts/none.ttf", "fonts/none.ttf"));
    assert!(loader.assets().environment.is_ready());
}

#[test]
fn loads_fonts_from_root() {
    let mut loader = AssetLoader::spawn(
        FONT_DIR,
        &requests("fonts/DejaVuSans-ExtraLight.ttf", "fonts/DejaVuSans.ttf"),
    );
    let assets = loader.wait();
    assert!(assets.is_settled());
    assert!(assets.first_failure().is_none());
    let light = assets.light_font.ready().unwrap();
    let medium = assets.medium_font.ready().unwrap();
    assert!(light.family.contains("DejaVu"));
    assert!(light.weight < medium.weight);
    assert!(loader.is_settled());
    assert!(!loader.poll());
}

#[test]
fn missing_font_fails_without_blocking_others() {
    let mut loader = AssetLoader::spawn(
        FONT_DIR,
        &requests("fonts/DejaVuSans.ttf", "fonts/IBMPlexSans-Medium.ttf"),
    );
    let assets = loader.wait();
    assert!(assets.light_font.is_ready());
    let (slot, err) = assets.first_failure().unwrap();
    assert_eq!(slot, "medium_font");
    assert!(matches!(err.as_ref(), BubbleError::Asset(_)));
}

#[test]
fn traversal_is_rejected_as_failure() {
    let mut loader = AssetLoader::spawn(FONT_DIR, &requests("../Cargo.toml", "fonts/DejaVuSans.ttf"));
    let assets = loader.wait();
    let Resource::Failed(err) = &assets.light_font else {
        panic!("expected failure");
    };
    assert!(matches!(err.as_ref(), BubbleError::Validation(_)));
}

#[test]
fn non_font_bytes_fail() {
    assert!(FontAsset::from_bytes("x.ttf", b"not a font".to_vec()).is_err());
}

#[test]
fn environment_file_loads_asynchronously() {
    let tmp = temp_dir("env_file");
    std::fs::create_dir_all(tmp.join("env")).unwrap();
    let img = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(tmp.join("env/room.png"), &buf).unwrap();

    let mut req = requests("a.ttf", "b.ttf");
    req.environment = EnvironmentSource::File("env/room.png".to_owned());
    let mut loader = AssetLoader::spawn(&tmp, &req);
    let assets = loader.wait();
    let env = assets.environment.ready().unwrap();
    assert!(matches!(env.as_ref(), Environment::Equirect(_)));

    std::fs::remove_dir_all(&tmp).ok();
}
