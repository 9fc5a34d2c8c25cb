//! Controlled images and image variants for integration tests.
#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Route library logs to the test harness output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Off-centre soft blob; drawn relative to the canvas so every size looks alike
pub fn blob_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let dx = x as f64 / width as f64 - 0.3;
        let dy = y as f64 / height as f64 - 0.6;
        let level = (255.0 * (-(dx * dx) / 0.02 - (dy * dy) / 0.05).exp()) as u8;
        Rgb([level, level / 2, 255 - level])
    }))
}

/// Diagonal stripes, visually unrelated to [`blob_image`]
pub fn stripes_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if ((x + y) / 16) % 2 == 0 {
            Rgb([240, 240, 240])
        } else {
            Rgb([20, 20, 20])
        }
    }))
}

/// A file with an image extension but no image inside
pub fn create_dummy_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"DUMMY IMAGE DATA").unwrap();
    path
}

/// Writes controlled variants of a base image into an output directory
pub struct ImageVariant {
    base: DynamicImage,
    output_dir: PathBuf,
}

impl ImageVariant {
    pub fn new<P: AsRef<Path>>(base: DynamicImage, output_dir: P) -> Self {
        Self {
            base,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// The base image, saved under `name` (format from the extension)
    pub fn identical(&self, name: &str) -> PathBuf {
        self.save(&self.base, name)
    }

    /// The base image scaled by `factor`
    pub fn resized(&self, name: &str, factor: f32) -> PathBuf {
        let width = ((self.base.width() as f32) * factor).round() as u32;
        let height = ((self.base.height() as f32) * factor).round() as u32;
        let img = self
            .base
            .resize_exact(width, height, image::imageops::FilterType::Triangle);
        self.save(&img, name)
    }

    /// The base image with every channel raised by `amount`
    pub fn brightened(&self, name: &str, amount: i32) -> PathBuf {
        self.save(&self.base.brighten(amount), name)
    }

    fn save(&self, img: &DynamicImage, name: &str) -> PathBuf {
        let path = self.output_dir.join(name);
        img.to_rgb8().save(&path).unwrap();
        path
    }
}
