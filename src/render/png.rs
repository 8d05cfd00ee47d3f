//! PNG input and output backed by the `image` crate.

use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use image::imageops::replace;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{SprigError, Result};

use super::{Composer, ImageInspector, Placement};

/// Image inspection and composition using the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageBackend;

impl ImageBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageInspector for ImageBackend {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        if !path.is_file() {
            return Err(SprigError::MissingSource {
                path: path.to_path_buf(),
            });
        }

        image::image_dimensions(path).map_err(|e| SprigError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read image: {}", e),
        })
    }
}

impl Composer for ImageBackend {
    fn compose(&self, placements: &[Placement<'_>], canvas: (u32, u32)) -> Result<Vec<u8>> {
        let (width, height) = canvas;
        let mut img = RgbaImage::new(width, height);

        for placement in placements {
            if !placement.path.is_file() {
                return Err(SprigError::MissingSource {
                    path: placement.path.to_path_buf(),
                });
            }

            let source = image::open(placement.path)
                .map_err(|e| SprigError::Io {
                    path: placement.path.to_path_buf(),
                    message: format!("Failed to read image: {}", e),
                })?
                .to_rgba8();

            replace(&mut img, &source, placement.x as i64, placement.y as i64);
        }

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| SprigError::Io {
                path: "<memory>".into(),
                message: format!("Failed to encode PNG: {}", e),
            })?;

        Ok(bytes)
    }
}

/// Write encoded PNG bytes to `path`, creating parent directories as needed.
pub fn write_png(bytes: &[u8], path: &Path) -> Result<()> {
    let not_writable = |e: io::Error| SprigError::TargetNotWritable {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(not_writable)?;
    }

    fs::write(path, bytes).map_err(not_writable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn solid(path: &Path, width: u32, height: u32, colour: [u8; 4]) {
        RgbaImage::from_pixel(width, height, Rgba(colour))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.png");
        solid(&path, 7, 3, [0, 0, 0, 255]);

        assert_eq!(ImageBackend.dimensions(&path).unwrap(), (7, 3));
    }

    #[test]
    fn test_dimensions_missing_file() {
        let dir = tempdir().unwrap();
        let err = ImageBackend
            .dimensions(&dir.path().join("nope.png"))
            .unwrap_err();

        assert!(matches!(err, SprigError::MissingSource { .. }));
    }

    #[test]
    fn test_compose_places_sources() {
        let dir = tempdir().unwrap();
        let red = dir.path().join("red.png");
        let blue = dir.path().join("blue.png");
        solid(&red, 2, 2, [255, 0, 0, 255]);
        solid(&blue, 4, 2, [0, 0, 255, 255]);

        let placements = [
            Placement {
                path: &red,
                x: 0,
                y: 0,
            },
            Placement {
                path: &blue,
                x: 0,
                y: 3,
            },
        ];

        let bytes = ImageBackend.compose(&placements, (4, 5)).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();

        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 5);
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 0).0, [0, 0, 0, 0]); // right of red
        assert_eq!(img.get_pixel(0, 2).0, [0, 0, 0, 0]); // padding row
        assert_eq!(img.get_pixel(3, 4).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_compose_missing_source() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.png");
        let placements = [Placement {
            path: &missing,
            x: 0,
            y: 0,
        }];

        let err = ImageBackend.compose(&placements, (1, 1)).unwrap_err();
        assert!(matches!(err, SprigError::MissingSource { .. }));
    }

    #[test]
    fn test_write_png_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("public/images/fry.png");

        write_png(b"not really a png", &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"not really a png");
    }

    #[test]
    fn test_write_png_unwritable_target() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file in the way").unwrap();

        let err = write_png(b"x", &blocker.join("fry.png")).unwrap_err();
        assert!(matches!(err, SprigError::TargetNotWritable { .. }));
    }
}
