//! Image-based lighting sources for reflections.
//!
//! Named presets are procedural radiance fields (sky gradient plus soft area lights) so the crate
//! ships without HDR files. An equirectangular image can be supplied instead.

use std::f32::consts::{PI, TAU};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Vec3;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::foundation::math::srgb_u8_to_linear;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentPreset {
    Apartment,
    City,
    Dawn,
    Forest,
    Lobby,
    Night,
    Park,
    Studio,
    Sunset,
    Warehouse,
}

impl EnvironmentPreset {
    pub const ALL: [Self; 10] = [
        Self::Apartment,
        Self::City,
        Self::Dawn,
        Self::Forest,
        Self::Lobby,
        Self::Night,
        Self::Park,
        Self::Studio,
        Self::Sunset,
        Self::Warehouse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::City => "city",
            Self::Dawn => "dawn",
            Self::Forest => "forest",
            Self::Lobby => "lobby",
            Self::Night => "night",
            Self::Park => "park",
            Self::Studio => "studio",
            Self::Sunset => "sunset",
            Self::Warehouse => "warehouse",
        }
    }
}

impl FromStr for EnvironmentPreset {
    type Err = BubbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BubbleError::validation(format!("unknown environment preset '{s}'")))
    }
}

/// Where the environment comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum EnvironmentSource {
    Preset(EnvironmentPreset),
    /// Equirectangular image, relative to the assets root.
    File(String),
}

impl Default for EnvironmentSource {
    fn default() -> Self {
        Self::Preset(EnvironmentPreset::Warehouse)
    }
}

/// Soft circular emitter on the sky sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaLight {
    pub direction: Vec3,
    /// Angular radius in radians.
    pub radius: f32,
    pub color: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProceduralEnv {
    pub zenith: Vec3,
    pub horizon: Vec3,
    pub ground: Vec3,
    pub lights: Vec<AreaLight>,
}

impl ProceduralEnv {
    fn radiance(&self, dir: Vec3, roughness: f32) -> Vec3 {
        let y = dir.y.clamp(-1.0, 1.0);
        let base = if y >= 0.0 {
            self.horizon.lerp(self.zenith, y.powf(0.6))
        } else {
            self.horizon.lerp(self.ground, (-y).powf(0.4))
        };

        // Rough surfaces see a wider, dimmer lobe of each light.
        let spread = 1.0 + roughness.clamp(0.0, 1.0) * 8.0;
        let mut out = base;
        for light in &self.lights {
            let cos = dir.dot(light.direction).clamp(-1.0, 1.0);
            let angle = cos.acos();
            let r = light.radius * spread;
            if angle < r * 1.5 {
                let edge = 1.0 - smoothstep(r * 0.7, r * 1.5, angle);
                out += light.color * edge / (spread * spread);
            }
        }
        out
    }
}

/// Decoded equirectangular radiance map, linear RGB.
#[derive(Clone, Debug, PartialEq)]
pub struct EquirectMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<Vec3>,
}

impl EquirectMap {
    /// Decode an image file's bytes. Radiance formats stay linear, 8-bit formats are treated as sRGB.
    pub fn decode(bytes: &[u8]) -> BubbleResult<Self> {
        let format = image::guess_format(bytes)
            .map_err(|e| BubbleError::asset(format!("unrecognized environment image: {e}")))?;
        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| BubbleError::asset(format!("decode environment image: {e}")))?;
        let linear_source = matches!(format, image::ImageFormat::Hdr | image::ImageFormat::OpenExr);

        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(BubbleError::asset("environment image is empty"));
        }
        let texels = if linear_source {
            img.to_rgb32f()
                .pixels()
                .map(|p| Vec3::new(p[0], p[1], p[2]))
                .collect()
        } else {
            img.to_rgb8()
                .pixels()
                .map(|p| {
                    Vec3::new(
                        srgb_u8_to_linear(p[0]),
                        srgb_u8_to_linear(p[1]),
                        srgb_u8_to_linear(p[2]),
                    )
                })
                .collect()
        };
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    fn texel(&self, x: i64, y: i64) -> Vec3 {
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        let x = x.rem_euclid(w);
        let y = y.clamp(0, h - 1);
        self.texels[(y * w + x) as usize]
    }

    fn radiance(&self, dir: Vec3) -> Vec3 {
        let u = dir.z.atan2(dir.x) / TAU + 0.5;
        let v = dir.y.clamp(-1.0, 1.0).acos() / PI;
        let fx = u * self.width as f32 - 0.5;
        let fy = v * self.height as f32 - 0.5;
        let (x0, y0) = (fx.floor(), fy.floor());
        let (tx, ty) = (fx - x0, fy - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), tx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }
}

/// Radiance lookup by world direction.
#[derive(Clone, Debug, PartialEq)]
pub enum Environment {
    Procedural(ProceduralEnv),
    Equirect(EquirectMap),
}

impl Environment {
    pub fn preset(preset: EnvironmentPreset) -> Self {
        Self::Procedural(preset_env(preset))
    }

    /// Incoming radiance along `dir`; `roughness` widens highlights of procedural lights.
    pub fn radiance(&self, dir: Vec3, roughness: f32) -> Vec3 {
        let dir = dir.normalize_or_zero();
        match self {
            Self::Procedural(env) => env.radiance(dir, roughness),
            Self::Equirect(map) => map.radiance(dir),
        }
    }
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn dir_from_angles(azimuth_deg: f32, elevation_deg: f32) -> Vec3 {
    let (az, el) = (azimuth_deg.to_radians(), elevation_deg.to_radians());
    Vec3::new(el.cos() * az.sin(), el.sin(), el.cos() * az.cos())
}

fn light(azimuth_deg: f32, elevation_deg: f32, radius_deg: f32, color: [f32; 3]) -> AreaLight {
    AreaLight {
        direction: dir_from_angles(azimuth_deg, elevation_deg),
        radius: radius_deg.to_radians(),
        color: Vec3::from_array(color),
    }
}

fn preset_env(preset: EnvironmentPreset) -> ProceduralEnv {
    let v = Vec3::from_array;
    match preset {
        EnvironmentPreset::Warehouse => ProceduralEnv {
            zenith: v([0.16, 0.15, 0.14]),
            horizon: v([0.30, 0.28, 0.25]),
            ground: v([0.05, 0.045, 0.04]),
            lights: vec![
                // Rows of ceiling strip lights.
                light(-40.0, 62.0, 6.0, [6.0, 5.8, 5.4]),
                light(0.0, 70.0, 6.0, [6.0, 5.8, 5.4]),
                light(40.0, 62.0, 6.0, [6.0, 5.8, 5.4]),
                light(140.0, 62.0, 6.0, [6.0, 5.8, 5.4]),
                light(180.0, 70.0, 6.0, [6.0, 5.8, 5.4]),
                light(220.0, 62.0, 6.0, [6.0, 5.8, 5.4]),
                // Loading-bay opening.
                light(90.0, 8.0, 14.0, [2.4, 2.6, 3.0]),
            ],
        },
        EnvironmentPreset::Studio => ProceduralEnv {
            zenith: v([0.08, 0.08, 0.08]),
            horizon: v([0.12, 0.12, 0.12]),
            ground: v([0.03, 0.03, 0.03]),
            lights: vec![
                light(-45.0, 30.0, 18.0, [5.0, 5.0, 5.0]),
                light(60.0, 20.0, 12.0, [2.5, 2.5, 2.5]),
                light(180.0, 45.0, 20.0, [3.0, 3.0, 3.0]),
            ],
        },
        EnvironmentPreset::Apartment => ProceduralEnv {
            zenith: v([0.35, 0.32, 0.28]),
            horizon: v([0.45, 0.40, 0.33]),
            ground: v([0.12, 0.09, 0.07]),
            lights: vec![light(30.0, 15.0, 16.0, [4.0, 3.8, 3.4])],
        },
        EnvironmentPreset::City => ProceduralEnv {
            zenith: v([0.40, 0.50, 0.65]),
            horizon: v([0.55, 0.55, 0.55]),
            ground: v([0.10, 0.10, 0.11]),
            lights: vec![light(-120.0, 35.0, 3.0, [12.0, 11.0, 9.5])],
        },
        EnvironmentPreset::Dawn => ProceduralEnv {
            zenith: v([0.20, 0.25, 0.45]),
            horizon: v([0.85, 0.55, 0.40]),
            ground: v([0.08, 0.06, 0.06]),
            lights: vec![light(100.0, 4.0, 4.0, [10.0, 6.0, 3.5])],
        },
        EnvironmentPreset::Forest => ProceduralEnv {
            zenith: v([0.30, 0.40, 0.30]),
            horizon: v([0.25, 0.32, 0.20]),
            ground: v([0.06, 0.08, 0.04]),
            lights: vec![light(20.0, 60.0, 5.0, [5.0, 5.5, 4.0])],
        },
        EnvironmentPreset::Lobby => ProceduralEnv {
            zenith: v([0.40, 0.36, 0.30]),
            horizon: v([0.50, 0.45, 0.38]),
            ground: v([0.20, 0.17, 0.14]),
            lights: vec![
                light(0.0, 80.0, 10.0, [5.0, 4.6, 4.0]),
                light(180.0, 10.0, 20.0, [2.0, 2.2, 2.6]),
            ],
        },
        EnvironmentPreset::Night => ProceduralEnv {
            zenith: v([0.005, 0.008, 0.02]),
            horizon: v([0.03, 0.035, 0.06]),
            ground: v([0.01, 0.01, 0.012]),
            lights: vec![light(-60.0, 40.0, 1.5, [3.0, 3.2, 3.6])],
        },
        EnvironmentPreset::Park => ProceduralEnv {
            zenith: v([0.35, 0.55, 0.90]),
            horizon: v([0.70, 0.78, 0.85]),
            ground: v([0.10, 0.14, 0.06]),
            lights: vec![light(45.0, 50.0, 2.5, [20.0, 19.0, 17.0])],
        },
        EnvironmentPreset::Sunset => ProceduralEnv {
            zenith: v([0.15, 0.18, 0.35]),
            horizon: v([0.95, 0.50, 0.25]),
            ground: v([0.07, 0.04, 0.03]),
            lights: vec![light(-90.0, 3.0, 3.0, [18.0, 8.0, 3.0])],
        },
    }
}

#[cfg(test)]
#[path = "../tests/unit/environment.rs"]
mod tests;
