//! Capture device abstraction.
//!
//! A scan session owns exactly one device for the lifetime of a run. Real
//! cameras live outside this crate; the implementations here cover tests and
//! scanning a fixed sequence of still images.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, Rgb};
use tracing::info;

use super::ScanError;

/// A source of frames for the scan loop.
#[async_trait]
pub trait CaptureDevice: Send + 'static {
    /// Opens the device. Called once per run, before the first capture.
    fn open(&mut self) -> Result<(), ScanError>;

    /// Waits for the next frame.
    ///
    /// [`ScanError::Exhausted`] ends the run; any other error counts as a miss.
    async fn capture(&mut self) -> Result<DynamicImage, ScanError>;

    fn is_open(&self) -> bool;

    /// Releases the device. Called once per run, after the last capture.
    fn release(&mut self);
}

/// Call counters shared between a [`MockCamera`] and its observer.
#[derive(Debug, Default)]
pub struct CameraStats {
    opens: AtomicUsize,
    captures: AtomicUsize,
    releases: AtomicUsize,
}

impl CameraStats {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Fake camera that cycles through a fixed set of frames.
#[derive(Debug)]
pub struct MockCamera {
    frames: Vec<DynamicImage>,
    sequence: usize,
    open: bool,
    stats: Arc<CameraStats>,
}

impl MockCamera {
    /// Camera returning `frames` in a loop; blank frames if empty.
    pub fn new(frames: Vec<DynamicImage>) -> Self {
        Self {
            frames,
            sequence: 0,
            open: false,
            stats: Arc::new(CameraStats::default()),
        }
    }

    /// Handle to the call counters, valid after the camera moves into a session.
    pub fn stats(&self) -> Arc<CameraStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CaptureDevice for MockCamera {
    fn open(&mut self) -> Result<(), ScanError> {
        self.open = true;
        self.sequence = 0;
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        info!("MockCamera opened");
        Ok(())
    }

    async fn capture(&mut self) -> Result<DynamicImage, ScanError> {
        if !self.open {
            return Err(ScanError::NotOpen);
        }
        self.stats.captures.fetch_add(1, Ordering::SeqCst);

        let frame = match self.frames.len() {
            0 => DynamicImage::ImageRgb8(ImageBuffer::from_pixel(32, 32, Rgb([255, 255, 255]))),
            n => self.frames[self.sequence % n].clone(),
        };
        self.sequence += 1;
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn release(&mut self) {
        self.open = false;
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
        info!("MockCamera released");
    }
}

/// Finite sequence of still images, such as frames saved from a video.
#[derive(Debug)]
pub struct ImageSequence {
    frames: Vec<DynamicImage>,
    position: usize,
    open: bool,
}

impl ImageSequence {
    pub fn new(frames: Vec<DynamicImage>) -> Self {
        Self {
            frames,
            position: 0,
            open: false,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl CaptureDevice for ImageSequence {
    fn open(&mut self) -> Result<(), ScanError> {
        if self.frames.is_empty() {
            return Err(ScanError::OpenFailed("no frames to scan".to_string()));
        }
        self.open = true;
        self.position = 0;
        Ok(())
    }

    async fn capture(&mut self) -> Result<DynamicImage, ScanError> {
        if !self.open {
            return Err(ScanError::NotOpen);
        }
        let frame = self
            .frames
            .get(self.position)
            .cloned()
            .ok_or(ScanError::Exhausted)?;
        self.position += 1;
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn release(&mut self) {
        self.open = false;
    }
}
