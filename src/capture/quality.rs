//! Cheap photo quality gate.
//!
//! Decodes a downsampled copy of the photo and averages the brightness of a
//! fixed number of evenly spaced pixels. Photos darker than the threshold,
//! or that cannot be decoded at all, are rejected before an identification
//! call is spent on them. This is a heuristic, not a quality model.

use std::fmt;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};

/// Why a photo was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    TooDark { brightness: f32 },
    Undecodable(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooDark { .. } => write!(f, "too dark"),
            Self::Undecodable(reason) => write!(f, "could not decode image: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QualityVerdict {
    Accepted { brightness: f32 },
    Rejected(RejectReason),
}

impl QualityVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Brightness-based accept/reject check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageQualityGate {
    /// Longest edge of the downsampled copy
    pub thumbnail_size: u32,
    /// Number of evenly spaced pixels to average
    pub sample_points: usize,
    /// Average brightness (0-255) below which a photo is too dark
    pub min_brightness: f32,
}

impl Default for ImageQualityGate {
    fn default() -> Self {
        Self {
            thumbnail_size: 256,
            sample_points: 100,
            min_brightness: 10.0,
        }
    }
}

impl ImageQualityGate {
    /// Decode the photo at `path` on the blocking pool and assess it.
    pub async fn assess_path(&self, path: &Path) -> QualityVerdict {
        let gate = *self;
        let path: PathBuf = path.to_path_buf();

        let decoded = tokio::task::spawn_blocking(move || {
            decode(&path).map(|img| img.thumbnail(gate.thumbnail_size, gate.thumbnail_size))
        })
        .await;

        match decoded {
            Ok(Ok(thumbnail)) => self.assess_image(&thumbnail),
            Ok(Err(reason)) => QualityVerdict::Rejected(RejectReason::Undecodable(reason)),
            Err(join_err) => {
                QualityVerdict::Rejected(RejectReason::Undecodable(join_err.to_string()))
            }
        }
    }

    /// Assess an already decoded image.
    pub fn assess_image(&self, image: &DynamicImage) -> QualityVerdict {
        let Some(brightness) = average_brightness(image, self.sample_points) else {
            return QualityVerdict::Rejected(RejectReason::Undecodable(
                "image has no pixels".to_string(),
            ));
        };

        tracing::debug!("Sampled brightness {:.1}", brightness);

        if brightness < self.min_brightness {
            QualityVerdict::Rejected(RejectReason::TooDark { brightness })
        } else {
            QualityVerdict::Accepted { brightness }
        }
    }
}

/// Decode by sniffing the content; capture copies always carry a `.jpg` name.
fn decode(path: &Path) -> Result<DynamicImage, String> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())
}

/// Mean of (R+G+B)/3 over `samples` evenly spaced pixels.
///
/// Returns `None` for empty images.
pub fn average_brightness(image: &DynamicImage, samples: usize) -> Option<f32> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let total = width as usize * height as usize;
    if total == 0 || samples == 0 {
        return None;
    }

    let sum: f32 = (0..samples)
        .map(|i| {
            let index = i * total / samples;
            let x = (index % width as usize) as u32;
            let y = (index / width as usize) as u32;
            let [r, g, b] = rgb.get_pixel(x, y).0;
            (r as f32 + g as f32 + b as f32) / 3.0
        })
        .sum();

    Some(sum / samples as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn uniform(width: u32, height: u32, level: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([level, level, level]),
        ))
    }

    #[test]
    fn test_all_black_is_too_dark() {
        let verdict = ImageQualityGate::default().assess_image(&uniform(64, 48, 0));
        assert_eq!(
            verdict,
            QualityVerdict::Rejected(RejectReason::TooDark { brightness: 0.0 })
        );
    }

    #[test]
    fn test_mid_gray_is_accepted() {
        let verdict = ImageQualityGate::default().assess_image(&uniform(64, 48, 128));
        assert_eq!(verdict, QualityVerdict::Accepted { brightness: 128.0 });
    }

    #[test]
    fn test_threshold_boundary() {
        let gate = ImageQualityGate::default();
        assert!(!gate.assess_image(&uniform(10, 10, 9)).is_accepted());
        assert!(gate.assess_image(&uniform(10, 10, 10)).is_accepted());
    }

    #[test]
    fn test_brightness_averages_channels() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([30, 60, 90])));
        assert_eq!(average_brightness(&image, 100), Some(60.0));
    }

    #[test]
    fn test_empty_image_has_no_brightness() {
        assert_eq!(average_brightness(&uniform(0, 0, 0), 100), None);
    }

    #[test]
    fn test_reject_reasons_are_distinct() {
        let dark = RejectReason::TooDark { brightness: 2.0 };
        let broken = RejectReason::Undecodable("bad header".to_string());
        assert_eq!(dark.to_string(), "too dark");
        assert!(broken.to_string().contains("bad header"));
        assert_ne!(dark.to_string(), broken.to_string());
    }

    #[tokio::test]
    async fn test_assess_path_decodes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        uniform(320, 240, 120).save(&path).unwrap();

        let verdict = ImageQualityGate::default().assess_path(&path).await;
        assert_eq!(verdict, QualityVerdict::Accepted { brightness: 120.0 });
    }

    #[tokio::test]
    async fn test_png_copied_under_jpg_name_is_accepted() {
        use crate::capture::{FileSource, PhotoSource};

        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("cover.png");
        uniform(64, 64, 128).save(&original).unwrap();

        let captured = FileSource::new(&original)
            .with_capture_dir(dir.path().join("captures"))
            .capture()
            .await
            .unwrap();
        assert!(captured.path().to_string_lossy().ends_with(".jpg"));

        let verdict = ImageQualityGate::default().assess_path(captured.path()).await;
        assert_eq!(verdict, QualityVerdict::Accepted { brightness: 128.0 });
    }

    #[tokio::test]
    async fn test_file_without_extension_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("cover.png");
        uniform(32, 32, 90).save(&png).unwrap();
        let bare = dir.path().join("cover");
        std::fs::rename(&png, &bare).unwrap();

        let verdict = ImageQualityGate::default().assess_path(&bare).await;
        assert_eq!(verdict, QualityVerdict::Accepted { brightness: 90.0 });
    }

    #[tokio::test]
    async fn test_assess_path_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let verdict = ImageQualityGate::default().assess_path(&path).await;
        assert!(matches!(
            verdict,
            QualityVerdict::Rejected(RejectReason::Undecodable(_))
        ));
    }

    #[tokio::test]
    async fn test_assess_path_missing_file_is_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let verdict = ImageQualityGate::default()
            .assess_path(&dir.path().join("gone.jpg"))
            .await;
        assert!(matches!(
            verdict,
            QualityVerdict::Rejected(RejectReason::Undecodable(_))
        ));
    }
}
