//! Scan session state machine.
//!
//! One tokio task per run owns the capture device and hands it back through
//! its `JoinHandle` when it ends. Attempts are strictly sequential: the next
//! frame is captured only after the previous detection has answered and the
//! backoff delay has elapsed. Cancellation is checked first at every
//! suspension point, so once [`ScanSession::stop`] returns no further attempt
//! is submitted and no timer is left running. A detector running on the
//! blocking pool (see [`super::QrDetector`]) may still finish its current
//! frame; that result is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Backoff, CaptureDevice, Detection, Detector, ScanError};
use crate::config::ScanConfig;

/// Buffered detections per run before the loop waits for the receiver.
pub const DETECTION_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Never started.
    Idle,
    /// A run was started and has not been stopped. The run itself may have
    /// ended on its own (device exhausted or hidden data found).
    Capturing,
    /// Stopped; the device is released and back in the session.
    Stopped,
}

struct ActiveRun<C> {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<C>,
}

/// Owns a capture device and a detector and runs the scan loop.
pub struct ScanSession<C: CaptureDevice, D: Detector> {
    device: Option<C>,
    detector: Arc<D>,
    config: ScanConfig,
    state: ScanState,
    run: Option<ActiveRun<C>>,
    attempts: Arc<AtomicU64>,
}

impl<C: CaptureDevice, D: Detector> ScanSession<C, D> {
    pub fn new(device: C, detector: D, config: ScanConfig) -> Result<Self, ScanError> {
        config
            .validate()
            .map_err(|e| ScanError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            device: Some(device),
            detector: Arc::new(detector),
            config,
            state: ScanState::Idle,
            run: None,
            attempts: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Detection attempts submitted during the current or last run.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// True when no run is active or the active run has ended by itself.
    pub fn is_finished(&self) -> bool {
        self.run
            .as_ref()
            .map_or(true, |run| run.handle.is_finished())
    }

    /// Opens the device and starts a run, stopping any active run first.
    ///
    /// Detections arrive on the returned channel, which closes when the run
    /// ends.
    pub async fn start(&mut self) -> Result<mpsc::Receiver<Detection>, ScanError> {
        if self.run.is_some() {
            debug!("scan session already running, stopping previous run");
            self.stop().await?;
        }

        let mut device = self.device.take().ok_or(ScanError::DeviceUnavailable)?;
        if let Err(e) = device.open() {
            self.device = Some(device);
            return Err(e);
        }

        let (detections, receiver) = mpsc::channel(DETECTION_CHANNEL_CAPACITY);
        let (cancel, cancelled) = oneshot::channel();
        self.attempts = Arc::new(AtomicU64::new(0));

        let scan_loop = ScanLoop {
            detector: Arc::clone(&self.detector),
            backoff: Backoff::from_config(&self.config),
            stop_on_detect: self.config.stop_on_detect,
            attempts: Arc::clone(&self.attempts),
            detections,
        };
        let handle = tokio::spawn(scan_loop.run(device, cancelled));

        self.run = Some(ActiveRun { cancel, handle });
        self.state = ScanState::Capturing;
        info!(
            base_interval_ms = self.config.base_interval_ms,
            max_interval_ms = self.config.max_interval_ms,
            "scan session started"
        );
        Ok(receiver)
    }

    /// Cancels the run, waits for it to release the device, and takes the
    /// device back. Does nothing if no run is active.
    pub async fn stop(&mut self) -> Result<(), ScanError> {
        let Some(run) = self.run.take() else {
            return Ok(());
        };

        // Fails only if the run already ended by itself
        let _ = run.cancel.send(());
        let joined = run.handle.await;
        self.state = ScanState::Stopped;

        let device = joined.map_err(|e| ScanError::TaskFailed(e.to_string()))?;
        self.device = Some(device);
        info!(attempts = self.attempts(), "scan session stopped");
        Ok(())
    }
}

impl<C: CaptureDevice, D: Detector> Drop for ScanSession<C, D> {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            let _ = run.cancel.send(());
        }
    }
}

struct ScanLoop<D> {
    detector: Arc<D>,
    backoff: Backoff,
    stop_on_detect: bool,
    attempts: Arc<AtomicU64>,
    detections: mpsc::Sender<Detection>,
}

impl<D: Detector> ScanLoop<D> {
    async fn run<C: CaptureDevice>(mut self, mut device: C, mut cancelled: oneshot::Receiver<()>) -> C {
        loop {
            let captured = tokio::select! {
                biased;
                _ = &mut cancelled => break,
                frame = device.capture() => frame,
            };

            let delay = match captured {
                Err(ScanError::Exhausted) => {
                    debug!("capture device has no more frames");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "capture failed");
                    self.backoff.on_miss()
                }
                Ok(frame) => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let result = tokio::select! {
                        biased;
                        _ = &mut cancelled => break,
                        result = self.detector.detect(frame) => result,
                    };

                    match result {
                        Ok(Some(detection)) => {
                            let hidden = detection.has_hidden_data();
                            debug!(attempt, hidden, "code detected");

                            let sent = tokio::select! {
                                biased;
                                _ = &mut cancelled => break,
                                sent = self.detections.send(detection) => sent,
                            };
                            if sent.is_err() {
                                debug!("detection receiver dropped");
                                break;
                            }
                            if hidden && self.stop_on_detect {
                                info!(attempt, "hidden data found, ending scan");
                                break;
                            }
                            self.backoff.on_hit()
                        }
                        Ok(None) => self.backoff.on_miss(),
                        Err(e) => {
                            warn!(attempt, error = %e, "detection failed");
                            self.backoff.on_miss()
                        }
                    }
                }
            };

            tokio::select! {
                biased;
                _ = &mut cancelled => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        device.release();
        device
    }
}
