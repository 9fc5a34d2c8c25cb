use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Off-centre soft blob; the drawing is relative to the canvas size
pub fn blob_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let dx = x as f64 / width as f64 - 0.3;
        let dy = y as f64 / height as f64 - 0.6;
        let level = (255.0 * (-(dx * dx) / 0.02 - (dy * dy) / 0.05).exp()) as u8;
        Rgb([level, level / 2, 255 - level])
    })
}

/// Diagonal stripes, visually unrelated to [`blob_image`]
pub fn stripes_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if ((x + y) / 16) % 2 == 0 {
            Rgb([240, 240, 240])
        } else {
            Rgb([20, 20, 20])
        }
    })
}

/// Save `img` as `name` inside `dir`, format chosen by extension
pub fn write_image(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// A file with an image extension but no image inside
pub fn write_dummy_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"DUMMY IMAGE DATA").unwrap();
    path
}
