//! Waits for a freshly captured photo to finish being written.
//!
//! Cameras save asynchronously, so the file may exist before its contents
//! are complete. The waiter samples the file's size on a bounded retry
//! policy and declares it stable once two consecutive samples, separated by
//! the settle delay, report the same size at or above a minimum threshold.
//!
//! The decision logic lives in [`ReadinessTracker`], a pure state machine
//! fed with [`FileSample`]s. [`FileReadinessWaiter`] drives it with an
//! injected [`FileProbe`] and [`Pacer`], so tests can replay scripted size
//! sequences without sleeping.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::CapturedPhoto;

/// Bounded retry policy for readiness polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Delay between samples while the file is missing or too small
    pub interval: Duration,
    /// Maximum number of samples before giving up
    pub max_attempts: u32,
    /// Delay between two samples that must agree for the file to be stable
    pub settle_delay: Duration,
    /// Smallest size considered a complete photo
    pub min_size: u64,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: 10,
            settle_delay: Duration::from_millis(200),
            min_size: 1000,
        }
    }
}

/// One observation of a file's backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSample {
    pub exists: bool,
    pub readable: bool,
    pub size: u64,
}

impl FileSample {
    pub fn missing() -> Self {
        Self {
            exists: false,
            readable: false,
            size: 0,
        }
    }

    pub fn readable(size: u64) -> Self {
        Self {
            exists: true,
            readable: true,
            size,
        }
    }

    /// Size of the file if it is usable at all under `min_size`.
    fn qualifying_size(&self, min_size: u64) -> Option<u64> {
        (self.exists && self.readable && self.size >= min_size).then_some(self.size)
    }
}

/// Outcome of readiness polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Pending,
    Stable { size: u64 },
    TimedOut { attempts: u32 },
}

/// Pure readiness decision logic.
#[derive(Debug, Clone)]
pub struct ReadinessTracker {
    policy: ReadinessPolicy,
    attempts: u32,
    last_size: Option<u64>,
    state: ReadinessState,
}

impl ReadinessTracker {
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            last_size: None,
            state: ReadinessState::Pending,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Feed the next sample. Terminal states are sticky.
    pub fn observe(&mut self, sample: FileSample) -> ReadinessState {
        if self.state != ReadinessState::Pending {
            return self.state;
        }

        self.attempts += 1;
        let current = sample.qualifying_size(self.policy.min_size);

        if let (Some(size), Some(previous)) = (current, self.last_size)
            && size == previous
        {
            self.state = ReadinessState::Stable { size };
            return self.state;
        }

        self.last_size = current;
        if self.attempts >= self.policy.max_attempts {
            self.state = ReadinessState::TimedOut {
                attempts: self.attempts,
            };
        }
        self.state
    }

    /// How long to wait before the next sample.
    ///
    /// A qualifying sample starts a stability window, so the next sample
    /// comes after the settle delay; otherwise the regular interval applies.
    pub fn next_delay(&self) -> Duration {
        if self.last_size.is_some() {
            self.policy.settle_delay
        } else {
            self.policy.interval
        }
    }
}

/// Source of [`FileSample`]s.
#[async_trait]
pub trait FileProbe: Send + Sync {
    async fn sample(&self, path: &Path) -> FileSample;
}

/// Sleeps between samples.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Probe backed by filesystem metadata.
pub struct FsProbe;

#[async_trait]
impl FileProbe for FsProbe {
    async fn sample(&self, path: &Path) -> FileSample {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return FileSample::missing();
        };

        FileSample {
            exists: true,
            readable: tokio::fs::File::open(path).await.is_ok(),
            size: metadata.len(),
        }
    }
}

/// Pacer backed by the tokio timer.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polls a photo until it is fully written or the policy is exhausted.
#[derive(Clone)]
pub struct FileReadinessWaiter {
    policy: ReadinessPolicy,
    probe: Arc<dyn FileProbe>,
    pacer: Arc<dyn Pacer>,
}

impl FileReadinessWaiter {
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self::with_parts(policy, Arc::new(FsProbe), Arc::new(TokioPacer))
    }

    pub fn with_parts(
        policy: ReadinessPolicy,
        probe: Arc<dyn FileProbe>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            policy,
            probe,
            pacer,
        }
    }

    pub fn policy(&self) -> &ReadinessPolicy {
        &self.policy
    }

    /// Wait for `photo` to become stable.
    ///
    /// Never returns [`ReadinessState::Pending`].
    pub async fn wait(&self, photo: &CapturedPhoto) -> ReadinessState {
        let mut tracker = ReadinessTracker::new(self.policy);

        loop {
            let sample = self.probe.sample(photo.path()).await;
            let state = tracker.observe(sample);
            tracing::debug!(
                attempt = tracker.attempts(),
                size = sample.size,
                exists = sample.exists,
                "Readiness sample for {:?}: {:?}",
                photo.path(),
                state
            );

            match state {
                ReadinessState::Pending => self.pacer.pause(tracker.next_delay()).await,
                done => return done,
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::{RecordingPacer, ScriptedProbe};
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn run_tracker(policy: ReadinessPolicy, sizes: &[u64]) -> ReadinessState {
        let mut tracker = ReadinessTracker::new(policy);
        for &size in sizes {
            if tracker.observe(FileSample::readable(size)) != ReadinessState::Pending {
                break;
            }
        }
        tracker.state()
    }

    #[test]
    fn test_two_equal_samples_are_stable() {
        let state = run_tracker(ReadinessPolicy::default(), &[5000, 5000]);
        assert_eq!(state, ReadinessState::Stable { size: 5000 });
    }

    #[test]
    fn test_equal_samples_below_threshold_never_stable() {
        let state = run_tracker(ReadinessPolicy::default(), &[500; 10]);
        assert_eq!(state, ReadinessState::TimedOut { attempts: 10 });
    }

    #[test]
    fn test_missing_sample_breaks_the_window() {
        let mut tracker = ReadinessTracker::new(ReadinessPolicy::default());
        tracker.observe(FileSample::readable(2000));
        tracker.observe(FileSample::missing());
        assert_eq!(
            tracker.observe(FileSample::readable(2000)),
            ReadinessState::Pending
        );
        assert_eq!(
            tracker.observe(FileSample::readable(2000)),
            ReadinessState::Stable { size: 2000 }
        );
    }

    #[test]
    fn test_unreadable_file_does_not_qualify() {
        let mut tracker = ReadinessTracker::new(ReadinessPolicy::default());
        let locked = FileSample {
            exists: true,
            readable: false,
            size: 4000,
        };
        tracker.observe(locked);
        assert_eq!(tracker.observe(locked), ReadinessState::Pending);
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let policy = ReadinessPolicy {
            max_attempts: 1,
            ..Default::default()
        };
        let mut tracker = ReadinessTracker::new(policy);
        assert_eq!(
            tracker.observe(FileSample::readable(10)),
            ReadinessState::TimedOut { attempts: 1 }
        );
        assert_eq!(
            tracker.observe(FileSample::readable(10)),
            ReadinessState::TimedOut { attempts: 1 }
        );
    }

    #[test]
    fn test_next_delay_switches_to_settle_after_qualifying_sample() {
        let policy = ReadinessPolicy::default();
        let mut tracker = ReadinessTracker::new(policy);
        assert_eq!(tracker.next_delay(), policy.interval);
        tracker.observe(FileSample::readable(10));
        assert_eq!(tracker.next_delay(), policy.interval);
        tracker.observe(FileSample::readable(3000));
        assert_eq!(tracker.next_delay(), policy.settle_delay);
    }

    #[tokio::test]
    async fn test_waiter_stabilizes_on_third_sample() {
        let pacer = Arc::new(RecordingPacer::default());
        let waiter = FileReadinessWaiter::with_parts(
            ReadinessPolicy::default(),
            Arc::new(ScriptedProbe::sizes(&[20_000, 50_000, 50_000])),
            pacer.clone(),
        );
        let photo = CapturedPhoto::new("/captures/vinyl_1.jpg", Utc::now());

        let state = waiter.wait(&photo).await;

        assert_eq!(state, ReadinessState::Stable { size: 50_000 });
        let settle = ReadinessPolicy::default().settle_delay;
        assert_eq!(*pacer.pauses.lock(), vec![settle, settle]);
    }

    #[tokio::test]
    async fn test_waiter_times_out_on_missing_file() {
        let pacer = Arc::new(RecordingPacer::default());
        let waiter = FileReadinessWaiter::with_parts(
            ReadinessPolicy::default(),
            Arc::new(ScriptedProbe::new(vec![FileSample::missing()])),
            pacer.clone(),
        );
        let photo = CapturedPhoto::new("/captures/missing.jpg", Utc::now());

        let state = waiter.wait(&photo).await;

        assert_eq!(state, ReadinessState::TimedOut { attempts: 10 });
        // No pause after the final attempt
        assert_eq!(pacer.pauses.lock().len(), 9);
    }

    #[tokio::test]
    async fn test_fs_probe_reads_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, vec![0u8; 1234]).unwrap();

        assert_eq!(FsProbe.sample(&path).await, FileSample::readable(1234));
        assert_eq!(
            FsProbe.sample(&dir.path().join("absent.jpg")).await,
            FileSample::missing()
        );
    }

    proptest! {
        #[test]
        fn prop_strictly_increasing_sizes_never_stable(
            start in 0u64..100_000,
            steps in prop::collection::vec(1u64..10_000, 1..30),
        ) {
            let policy = ReadinessPolicy { max_attempts: 64, ..Default::default() };
            let mut sizes = vec![start];
            for step in steps {
                let next = sizes[sizes.len() - 1] + step;
                sizes.push(next);
            }
            let state = run_tracker(policy, &sizes);
            let stable = matches!(state, ReadinessState::Stable { .. });
            prop_assert!(!stable, "growing file reported stable: {:?}", state);
        }

        #[test]
        fn prop_stable_iff_consecutive_equal_sizes_over_threshold(
            sizes in prop::collection::vec(prop::sample::select(vec![0u64, 999, 1000, 4096, 50_000]), 0..10),
        ) {
            let policy = ReadinessPolicy::default();
            let expected = sizes
                .windows(2)
                .find(|w| w[0] == w[1] && w[0] >= policy.min_size)
                .map(|w| w[1]);

            let state = run_tracker(policy, &sizes);

            match expected {
                Some(size) => prop_assert_eq!(state, ReadinessState::Stable { size }),
                None => {
                    let stable = matches!(state, ReadinessState::Stable { .. });
                    prop_assert!(!stable, "unexpected stable state: {:?}", state);
                }
            }
            // Replaying the same sequence gives the same answer
            prop_assert_eq!(state, run_tracker(policy, &sizes));
        }
    }
}
