//! # DCT Perceptual Transform
//!
//! Turns a decoded image into a 64-bit [`Fingerprint`] that stays stable
//! under resizing, recompression and small edits.
//!
//! ## Pipeline
//!
//! 1. Luminance: `Y = 16 + (66R + 129G + 25B + 128) / 256` for colour images,
//!    the grey channel as-is otherwise
//! 2. 7×7 box filter with clamped borders
//! 3. Nearest-neighbour resize to 32×32
//! 4. 2D DCT-II (rows, then columns)
//! 5. The 8×8 block of low frequencies at rows/columns 1..=8, skipping the DC
//!    row and column
//! 6. Bit `i` (LSB first, row-major) is set when coefficient `i` exceeds the
//!    median of the 64 coefficients
//!
//! Skipping the DC row and column means every kept coefficient carries the
//! same normalisation factor, so the unnormalised DCT from `rustdct` yields
//! the same bits as an orthonormal one.
//!
//! ## Hamming Distance Interpretation
//!
//! - 0-3: Nearly identical images (same image with minor modifications)
//! - 4-10: Similar images (same subject with moderate differences)
//! - >10: Different images

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma};
use once_cell::sync::Lazy;
use rustdct::{DctPlanner, TransformType2And3};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;

/// Side of the square the image is reduced to before the DCT
const DCT_SIZE: usize = 32;

/// Side of the low-frequency block that becomes the fingerprint
const HASH_SIZE: usize = 8;

/// Half-width of the 7×7 smoothing window
const FILTER_RADIUS: usize = 3;

static DCT_PLAN: Lazy<Arc<dyn TransformType2And3<f64>>> =
    Lazy::new(|| DctPlanner::new().plan_dct2(DCT_SIZE));

/// A procedure that maps an image file to a fingerprint.
///
/// Implementations may fail with any [`Error`] or even panic; the
/// [`HashComputer`](crate::processing::HashComputer) contains both.
pub trait PerceptualTransform: Send + Sync {
    /// Compute the fingerprint of the image stored at `path`
    fn hash_file(&self, path: &Path) -> Result<Fingerprint>;

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}

/// DCT-based perceptual hash backed by `image` and `rustdct`
#[derive(Debug, Clone, Copy, Default)]
pub struct DctTransform;

impl DctTransform {
    pub fn new() -> Self {
        Self
    }
}

impl PerceptualTransform for DctTransform {
    fn hash_file(&self, path: &Path) -> Result<Fingerprint> {
        let img = image::open(path).map_err(|e| Error::transform(path, e.to_string()))?;
        dct_phash(&img).map_err(|reason| Error::transform(path, reason))
    }

    fn name(&self) -> &'static str {
        "dct"
    }
}

/// Calculate the DCT perceptual hash of an image in memory
pub fn dct_phash(img: &DynamicImage) -> core::result::Result<Fingerprint, String> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(format!("image has no pixels ({}x{})", width, height));
    }

    let mut plane = luminance(img);
    box_filter(&mut plane, width as usize, height as usize, FILTER_RADIUS);
    let mut grid = reduce(plane, width, height)?;

    dct_2d(&mut grid, DCT_SIZE);

    // After the column pass the grid is transposed: index = u * N + v, where
    // u is the horizontal and v the vertical frequency
    let mut coeffs = [0.0f64; HASH_SIZE * HASH_SIZE];
    for v in 0..HASH_SIZE {
        for u in 0..HASH_SIZE {
            coeffs[v * HASH_SIZE + u] = grid[(u + 1) * DCT_SIZE + (v + 1)];
        }
    }

    let median = median(&coeffs);

    let mut hash: u64 = 0;
    for (bit_pos, &c) in coeffs.iter().enumerate() {
        if c > median {
            hash |= 1u64 << bit_pos;
        }
    }

    Ok(Fingerprint(hash))
}

/// Luma plane of the image, row-major
fn luminance(img: &DynamicImage) -> Vec<f32> {
    if img.color().has_color() {
        img.to_rgb8()
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                16.0 + (66.0 * r as f32 + 129.0 * g as f32 + 25.0 * b as f32 + 128.0) / 256.0
            })
            .collect()
    } else {
        img.to_luma8().pixels().map(|p| p.0[0] as f32).collect()
    }
}

/// In-place box filter of side `2 * radius + 1`, separable, borders clamped.
///
/// Output is the window sum divided by `window * 255`, so 8-bit input lands
/// in `0.0..=1.0`. A uniform scale leaves the hash bits unchanged.
fn box_filter(plane: &mut [f32], width: usize, height: usize, radius: usize) {
    let clamp = |i: isize, len: usize| i.clamp(0, len as isize - 1) as usize;
    let r = radius as isize;
    let window = (2 * radius + 1) as f32;
    let scale = 1.0 / (window * window * 255.0);

    let mut horizontal = vec![0.0f32; plane.len()];
    for y in 0..height {
        let row = &plane[y * width..(y + 1) * width];
        for x in 0..width {
            horizontal[y * width + x] = (-r..=r)
                .map(|dx| row[clamp(x as isize + dx, width)])
                .sum::<f32>();
        }
    }

    for y in 0..height {
        for x in 0..width {
            plane[y * width + x] = (-r..=r)
                .map(|dy| horizontal[clamp(y as isize + dy, height) * width + x])
                .sum::<f32>()
                * scale;
        }
    }
}

/// Nearest-neighbour reduction of the smoothed plane to `DCT_SIZE`²
fn reduce(plane: Vec<f32>, width: u32, height: u32) -> core::result::Result<Vec<f64>, String> {
    let smoothed = ImageBuffer::<Luma<f32>, _>::from_raw(width, height, plane)
        .ok_or_else(|| format!("luma plane does not match {}x{}", width, height))?;

    let small = imageops::resize(
        &smoothed,
        DCT_SIZE as u32,
        DCT_SIZE as u32,
        FilterType::Nearest,
    );
    Ok(small.into_raw().into_iter().map(f64::from).collect())
}

/// In-place 2D DCT-II of a square grid. The result is left transposed.
fn dct_2d(grid: &mut [f64], size: usize) {
    let plan = &*DCT_PLAN;

    for row in grid.chunks_exact_mut(size) {
        plan.process_dct2(row);
    }
    transpose(grid, size);
    for column in grid.chunks_exact_mut(size) {
        plan.process_dct2(column);
    }
}

fn transpose(grid: &mut [f64], size: usize) {
    for y in 0..size {
        for x in (y + 1)..size {
            grid.swap(y * size + x, x * size + y);
        }
    }
}

/// Median of an even-length set: mean of the two middle values
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
