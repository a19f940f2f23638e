//! Seeded noise fields.
//!
//! Every function here is pure: identical coordinates, seed and parameters
//! always produce the identical value. Chunk regeneration after an unload
//! depends on that, so nothing in this module may read ambient state.
//!
//! - `value_noise`: integer-lattice hash, bilinear smoothstep interpolation
//! - `fbm`: amplitude-weighted mean of `octaves` value-noise layers
//! - `Fbm`: a prebuilt field that can swap the value basis for Perlin gradients
//! - `SeededRandom`: mulberry32 stream for placement rolls without spatial coherence

use ::noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Seed stride between successive fBM octaves
const OCTAVE_SEED_STRIDE: u32 = 1013;

/// FNV offset basis, mixed with the seed before hashing lattice points
const HASH_BASIS: u32 = 0x811C_9DC5;

const HASH_MIX: u32 = 0x045D_9F3B;

/// 2^32, maps a u32 hash onto [0, 1)
const U32_RANGE: f64 = 4_294_967_296.0;

/// Largest f64 strictly below 1.0
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Parameters of an fBM field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub seed: u32,
    pub octaves: u32,
    pub lacunarity: f64,
    pub gain: f64,
    pub frequency: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 1337,
            octaves: 5,
            lacunarity: 2.0,
            gain: 0.5,
            frequency: 0.01,
        }
    }
}

impl NoiseParams {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    fn octave_seed(&self, octave: u32) -> u32 {
        self.seed.wrapping_add(octave.wrapping_mul(OCTAVE_SEED_STRIDE))
    }
}

fn xorshift32(mut x: u32) -> u32 {
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

/// Seed-mixed integer hash of a lattice point
pub fn lattice_hash(x: i32, y: i32, seed: u32) -> u32 {
    let (x, y) = (x as u32, y as u32);
    let mut h = HASH_BASIS ^ seed;
    h ^= (x & 0xFFFF).wrapping_add((x >> 16).wrapping_mul(HASH_MIX));
    h = xorshift32(h);
    h ^= (y & 0xFFFF).wrapping_add((y >> 16).wrapping_mul(HASH_MIX));
    xorshift32(h)
}

/// Lattice hash mapped onto [0, 1)
pub fn hash2d(x: i32, y: i32, seed: u32) -> f64 {
    f64::from(lattice_hash(x, y, seed)) / U32_RANGE
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Bilinear value noise over the integer lattice, in [0, 1)
pub fn value_noise(x: f64, y: f64, seed: u32) -> f64 {
    let (x, y) = (finite_or_zero(x), finite_or_zero(y));
    let (xf, yf) = (x.floor(), y.floor());
    let (xi, yi) = (xf as i32, yf as i32);

    let v00 = hash2d(xi, yi, seed);
    let v10 = hash2d(xi.wrapping_add(1), yi, seed);
    let v01 = hash2d(xi, yi.wrapping_add(1), seed);
    let v11 = hash2d(xi.wrapping_add(1), yi.wrapping_add(1), seed);

    let u = smoothstep((x - xf).clamp(0.0, 1.0));
    let v = smoothstep((y - yf).clamp(0.0, 1.0));

    let top = lerp(v00, v10, u);
    let bottom = lerp(v01, v11, u);
    lerp(top, bottom, v).min(BELOW_ONE)
}

/// Fractal Brownian motion over value noise.
///
/// The result is the amplitude-weighted mean of the octaves, so it stays in
/// [0, 1) no matter how many octaves are layered.
pub fn fbm(x: f64, y: f64, params: &NoiseParams) -> f64 {
    layered(params, |octave, fx, fy| {
        value_noise(x * fx, y * fy, params.octave_seed(octave))
    })
}

fn layered(params: &NoiseParams, mut sample: impl FnMut(u32, f64, f64) -> f64) -> f64 {
    let mut amp = 1.0;
    let mut freq = params.frequency;
    let mut sum = 0.0;
    let mut amp_sum = 0.0;

    for octave in 0..params.octaves.max(1) {
        sum += sample(octave, freq, freq) * amp;
        amp_sum += amp;
        amp *= params.gain;
        freq *= params.lacunarity;
    }

    if amp_sum > 0.0 {
        (sum / amp_sum).clamp(0.0, BELOW_ONE)
    } else {
        0.0
    }
}

/// Primitive layered by an `Fbm` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseBasis {
    /// Integer-lattice value noise (`value_noise`)
    #[default]
    Value,
    /// Perlin gradient noise remapped onto [0, 1)
    Gradient,
}

/// A prebuilt fBM field.
///
/// The gradient basis needs one permutation table per octave, so those are
/// built once here instead of per sample.
#[derive(Clone)]
pub struct Fbm {
    params: NoiseParams,
    gradients: Vec<Perlin>,
}

impl std::fmt::Debug for Fbm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fbm")
            .field("params", &self.params)
            .field("basis", &self.basis())
            .finish()
    }
}

impl Fbm {
    pub fn new(params: NoiseParams, basis: NoiseBasis) -> Self {
        let gradients = match basis {
            NoiseBasis::Value => Vec::new(),
            NoiseBasis::Gradient => (0..params.octaves.max(1))
                .map(|octave| Perlin::new(params.octave_seed(octave)))
                .collect(),
        };
        Self { params, gradients }
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    pub fn basis(&self) -> NoiseBasis {
        if self.gradients.is_empty() {
            NoiseBasis::Value
        } else {
            NoiseBasis::Gradient
        }
    }

    /// Sample the field, in [0, 1)
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        if self.gradients.is_empty() {
            return fbm(x, y, &self.params);
        }
        let (x, y) = (finite_or_zero(x), finite_or_zero(y));
        layered(&self.params, |octave, fx, fy| {
            let raw = self.gradients[octave as usize].get([x * fx, y * fy]);
            (raw * 0.5 + 0.5).clamp(0.0, BELOW_ONE)
        })
    }
}

/// mulberry32 stream for placement decisions that need no spatial coherence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in [0, 1)
    pub fn next(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let t = self.state;
        let mut r = (t ^ (t >> 15)).wrapping_mul(1 | t);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(61 | r));
        f64::from(r ^ (r >> 14)) / U32_RANGE
    }

    /// Uniform float in [min, max)
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next()
    }

    /// Uniform integer in [min, max] (both inclusive)
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        let span = f64::from(max) - f64::from(min) + 1.0;
        (f64::from(min) + span * self.next()).floor() as i32
    }
}
