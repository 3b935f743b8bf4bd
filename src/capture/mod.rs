//! Photo capture and pre-identification checks.
//!
//! A capture produces exactly one outcome: a [`CapturedPhoto`] handle or a
//! [`CaptureError`]. The photo then goes through two cheap checks before any
//! identification call is spent on it:
//!
//! - [`readiness`] - waits until the backing file has stopped growing
//! - [`quality`] - rejects photos that are too dark or cannot be decoded
//!
//! The camera itself is an external collaborator reached through the
//! [`PhotoSource`] trait.

pub mod quality;
pub mod readiness;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use quality::{ImageQualityGate, QualityVerdict, RejectReason};
pub use readiness::{FileReadinessWaiter, ReadinessPolicy, ReadinessState};

/// A photo taken at shutter press.
///
/// Owned by exactly one pipeline run; it is consumed once identification
/// has produced a result or the run aborts. A photo the source wrote itself
/// is deleted when the handle is dropped. Photos used in place are left
/// alone.
#[derive(Debug, PartialEq, Eq)]
pub struct CapturedPhoto {
    path: PathBuf,
    captured_at: DateTime<Utc>,
    owned: bool,
}

impl CapturedPhoto {
    /// A photo that belongs to someone else and must survive the run.
    pub fn new(path: impl Into<PathBuf>, captured_at: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            captured_at,
            owned: false,
        }
    }

    /// A copy written by the source, discarded with the handle.
    pub fn owned(path: impl Into<PathBuf>, captured_at: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            captured_at,
            owned: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shutter-press time.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }
}

impl Drop for CapturedPhoto {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Discarded capture {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not discard capture {:?}: {}", self.path, e),
        }
    }
}

/// Camera-level failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("capture failed: {0}")]
    Camera(String),

    #[error("capture failed: could not save photo to {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

/// Anything that can take a photo and hand back where it was written.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn capture(&self) -> Result<CapturedPhoto, CaptureError>;
}

/// Build the file name for a capture taken at `at`.
pub fn capture_file_name(at: DateTime<Utc>) -> String {
    format!("vinyl_{}.jpg", at.timestamp_millis())
}

/// A photo source backed by an existing image file.
///
/// Each capture copies the file into the capture directory under a fresh
/// `vinyl_<millis>.jpg` name, the way a camera would drop a new frame.
/// When no capture directory is set the file is used in place.
pub struct FileSource {
    original: PathBuf,
    capture_dir: Option<PathBuf>,
}

impl FileSource {
    pub fn new(original: impl Into<PathBuf>) -> Self {
        Self {
            original: original.into(),
            capture_dir: None,
        }
    }

    pub fn with_capture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl PhotoSource for FileSource {
    async fn capture(&self) -> Result<CapturedPhoto, CaptureError> {
        let now = Utc::now();

        if !tokio::fs::try_exists(&self.original)
            .await
            .unwrap_or(false)
        {
            return Err(CaptureError::Camera(format!(
                "no image at {}",
                self.original.display()
            )));
        }

        let Some(ref dir) = self.capture_dir else {
            return Ok(CapturedPhoto::new(self.original.clone(), now));
        };

        let target = dir.join(capture_file_name(now));
        let save_err = |e: std::io::Error| CaptureError::Save {
            path: target.clone(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(dir).await.map_err(save_err)?;
        // Own the target before copying so a partial copy is cleaned up too
        let photo = CapturedPhoto::owned(target.clone(), now);
        tokio::fs::copy(&self.original, &target)
            .await
            .map_err(save_err)?;

        tracing::debug!("Captured {:?} -> {:?}", self.original, target);
        Ok(photo)
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;

    /// Photo source that always returns the same outcome.
    pub struct MockPhotoSource {
        pub outcome: Result<PathBuf, CaptureError>,
    }

    impl MockPhotoSource {
        pub fn at(path: impl Into<PathBuf>) -> Self {
            Self {
                outcome: Ok(path.into()),
            }
        }

        pub fn failing(reason: &str) -> Self {
            Self {
                outcome: Err(CaptureError::Camera(reason.to_string())),
            }
        }
    }

    #[async_trait]
    impl PhotoSource for MockPhotoSource {
        async fn capture(&self) -> Result<CapturedPhoto, CaptureError> {
            self.outcome
                .clone()
                .map(|path| CapturedPhoto::new(path, Utc::now()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_capture_file_name_uses_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(capture_file_name(at), "vinyl_1700000000123.jpg");
    }

    #[tokio::test]
    async fn test_file_source_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("cover.jpg");
        std::fs::write(&photo, b"jpeg bytes").unwrap();

        let captured = FileSource::new(&photo).capture().await.unwrap();
        assert_eq!(captured.path(), photo.as_path());
    }

    #[tokio::test]
    async fn test_file_source_copies_into_capture_dir() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("cover.jpg");
        std::fs::write(&photo, b"jpeg bytes").unwrap();
        let captures = dir.path().join("captures");

        let captured = FileSource::new(&photo)
            .with_capture_dir(&captures)
            .capture()
            .await
            .unwrap();

        assert!(captured.path().starts_with(&captures));
        let name = captured.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("vinyl_") && name.ends_with(".jpg"));
        assert_eq!(std::fs::read(captured.path()).unwrap(), b"jpeg bytes");
        assert!(captured.is_owned());
    }

    #[tokio::test]
    async fn test_dropping_copy_discards_it_but_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("cover.jpg");
        std::fs::write(&photo, b"jpeg bytes").unwrap();
        let captures = dir.path().join("captures");
        let source = FileSource::new(&photo).with_capture_dir(&captures);

        for _ in 0..3 {
            let captured = source.capture().await.unwrap();
            assert!(captured.path().exists());
            drop(captured);
        }

        assert_eq!(std::fs::read_dir(&captures).unwrap().count(), 0);
        assert!(photo.exists());
    }

    #[tokio::test]
    async fn test_dropping_in_place_photo_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("cover.jpg");
        std::fs::write(&photo, b"jpeg bytes").unwrap();

        let captured = FileSource::new(&photo).capture().await.unwrap();
        assert!(!captured.is_owned());
        drop(captured);

        assert!(photo.exists());
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_camera_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSource::new(dir.path().join("nope.jpg")).capture().await;
        let err = result.unwrap_err();
        assert!(matches!(err, CaptureError::Camera(_)));
        assert!(err.to_string().starts_with("capture failed"));
    }
}
