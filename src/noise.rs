use serde::{Deserialize, Serialize};

use crate::foundation::core::DVec3;
use crate::foundation::math::Rng64;

/// Noise field used by the displacement layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Gradient noise, continuous with continuous first derivative.
    #[default]
    Perlin,
    /// Trilinearly interpolated lattice values; cheaper and blockier.
    Value,
}

/// Seeded 3D lattice noise. Output is roughly in `[-1, 1]`.
#[derive(Clone, Debug)]
pub struct Noise3 {
    kind: NoiseKind,
    perm: [u8; 512],
}

impl Noise3 {
    pub fn new(kind: NoiseKind, seed: u64) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut rng = Rng64::new(seed);
        for i in (1..table.len()).rev() {
            let j = rng.next_below(i as u64 + 1) as usize;
            table.swap(i, j);
        }
        let perm = std::array::from_fn(|i| table[i & 255]);
        Self { kind, perm }
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn sample(&self, p: DVec3) -> f64 {
        match self.kind {
            NoiseKind::Perlin => self.perlin(p),
            NoiseKind::Value => self.value(p),
        }
    }

    fn hash(&self, x: i64, y: i64, z: i64) -> u8 {
        let p = &self.perm;
        let x = (x & 255) as usize;
        let y = (y & 255) as usize;
        let z = (z & 255) as usize;
        p[p[p[x] as usize + y] as usize + z]
    }

    fn perlin(&self, p: DVec3) -> f64 {
        let cell = p.floor();
        let (xi, yi, zi) = (cell.x as i64, cell.y as i64, cell.z as i64);
        let f = p - cell;
        let (u, v, w) = (fade(f.x), fade(f.y), fade(f.z));

        let g = |dx: i64, dy: i64, dz: i64| {
            let h = self.hash(xi + dx, yi + dy, zi + dz);
            grad(h, f.x - dx as f64, f.y - dy as f64, f.z - dz as f64)
        };

        let x00 = lerp(u, g(0, 0, 0), g(1, 0, 0));
        let x10 = lerp(u, g(0, 1, 0), g(1, 1, 0));
        let x01 = lerp(u, g(0, 0, 1), g(1, 0, 1));
        let x11 = lerp(u, g(0, 1, 1), g(1, 1, 1));
        lerp(w, lerp(v, x00, x10), lerp(v, x01, x11))
    }

    fn value(&self, p: DVec3) -> f64 {
        let cell = p.floor();
        let (xi, yi, zi) = (cell.x as i64, cell.y as i64, cell.z as i64);
        let f = p - cell;
        let (u, v, w) = (fade(f.x), fade(f.y), fade(f.z));

        let c = |dx: i64, dy: i64, dz: i64| {
            f64::from(self.hash(xi + dx, yi + dy, zi + dz)) / 127.5 - 1.0
        };

        let x00 = lerp(u, c(0, 0, 0), c(1, 0, 0));
        let x10 = lerp(u, c(0, 1, 0), c(1, 1, 0));
        let x01 = lerp(u, c(0, 0, 1), c(1, 0, 1));
        let x11 = lerp(u, c(0, 1, 1), c(1, 1, 1));
        lerp(w, lerp(v, x00, x10), lerp(v, x01, x11))
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    // 12 cube-edge directions (plus 4 repeats) selected by the low 4 bits.
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
#[path = "../tests/unit/noise.rs"]
mod tests;
