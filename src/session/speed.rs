//! Rate pacing for both directions of a session.
//!
//! Outbound sends rendezvous with a pacing loop: `out` hands the loop a
//! ticket and waits for the reply; the loop answers immediately, then
//! sleeps long enough to hold the configured rate before taking the next
//! ticket. Inbound admission is a non-blocking per-second bucket.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeedError {
    /// The per-second budget for the current direction is exhausted.
    #[error("throttling error")]
    Throttled,

    /// The wait was cancelled.
    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Paces outbound requests and polices the inbound rate.
#[async_trait]
pub trait SpeedController: Send + Sync {
    /// Block until one outbound request may be sent.
    async fn out(&self, cancel: &CancellationToken) -> Result<(), SpeedError>;

    /// Non-blocking inbound admission check for the current second.
    fn inbound_admit(&self) -> Result<(), SpeedError>;

    /// Update both limits; takes effect on the next window.
    fn set_rps_limits(&self, in_rps: u32, out_rps: u32);

    /// Drive the outbound pacing loop until cancelled.
    async fn run(&self, cancel: CancellationToken);
}

/// Outbound pacing algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingAlgorithm {
    /// Deficit-paced: keeps a running lag account so the emitted rate
    /// converges to the limit over any window of a second or more.
    Robust,
    /// Bucket-reset: counts sends in the current calendar second and
    /// sleeps to the next boundary once the budget is spent.
    Risky,
}

type Ticket = oneshot::Sender<()>;

#[derive(Debug)]
pub struct DefaultSpeedController {
    in_rps_limit: AtomicU32,
    out_rps_limit: AtomicU32,
    out_interval_nanos: AtomicU64,
    in_second: AtomicI64,
    in_count: AtomicU32,
    tickets_tx: mpsc::Sender<Ticket>,
    tickets_rx: StdMutex<Option<mpsc::Receiver<Ticket>>>,
    algorithm: PacingAlgorithm,
}

impl DefaultSpeedController {
    pub fn new(algorithm: PacingAlgorithm) -> DefaultSpeedController {
        let (tickets_tx, tickets_rx) = mpsc::channel(1);
        DefaultSpeedController {
            in_rps_limit: AtomicU32::new(1),
            out_rps_limit: AtomicU32::new(1),
            out_interval_nanos: AtomicU64::new(interval_nanos(1)),
            in_second: AtomicI64::new(0),
            in_count: AtomicU32::new(0),
            tickets_tx,
            tickets_rx: StdMutex::new(Some(tickets_rx)),
            algorithm,
        }
    }

    async fn robust_loop(&self, mut tickets: mpsc::Receiver<Ticket>, cancel: CancellationToken) {
        let mut lag: i64 = 0;
        let mut last_sent: Option<Instant> = None;

        loop {
            let ticket = tokio::select! {
                ticket = tickets.recv() => match ticket {
                    Some(ticket) => ticket,
                    None => return,
                },
                _ = cancel.cancelled() => return,
            };
            let _ = ticket.send(());

            let ideal = self.out_interval_nanos.load(Ordering::Relaxed) as i64;
            let now = Instant::now();

            // a gap in demand resets the deficit accounting
            if last_sent.map_or(true, |prev| now - prev > Duration::from_secs(1)) {
                lag = 0;
            }
            last_sent = Some(now);

            let interval = ideal - lag;
            if interval > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_nanos(interval as u64)) => {
                        lag += now.elapsed().as_nanos() as i64 - ideal;
                    }
                    _ = cancel.cancelled() => return,
                }
            } else {
                lag -= ideal;
            }
        }
    }

    async fn risky_loop(&self, mut tickets: mpsc::Receiver<Ticket>, cancel: CancellationToken) {
        let mut second = unix_seconds();
        let mut sent: u32 = 0;

        loop {
            let ticket = tokio::select! {
                ticket = tickets.recv() => match ticket {
                    Some(ticket) => ticket,
                    None => return,
                },
                _ = cancel.cancelled() => return,
            };
            let _ = ticket.send(());

            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            let current = now.as_secs() as i64;
            if current != second {
                second = current;
                sent = 1;
            } else {
                sent += 1;
            }

            if sent >= self.out_rps_limit.load(Ordering::Relaxed) {
                let to_boundary =
                    Duration::from_nanos(1_000_000_000 - u64::from(now.subsec_nanos()));
                tokio::select! {
                    _ = tokio::time::sleep(to_boundary) => {}
                    _ = cancel.cancelled() => return,
                }
            }
        }
    }
}

#[async_trait]
impl SpeedController for DefaultSpeedController {
    async fn out(&self, cancel: &CancellationToken) -> Result<(), SpeedError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        tokio::select! {
            sent = self.tickets_tx.send(reply_tx) => {
                sent.map_err(|_| SpeedError::Other("pacing loop is gone".to_owned()))?;
            }
            _ = cancel.cancelled() => return Err(SpeedError::Cancelled),
        }

        tokio::select! {
            reply = reply_rx => reply.map_err(|_| SpeedError::Cancelled),
            _ = cancel.cancelled() => Err(SpeedError::Cancelled),
        }
    }

    fn inbound_admit(&self) -> Result<(), SpeedError> {
        let second = unix_seconds();
        let count = if self.in_second.swap(second, Ordering::Relaxed) != second {
            self.in_count.store(1, Ordering::Relaxed);
            1
        } else {
            self.in_count.fetch_add(1, Ordering::Relaxed) + 1
        };

        if count > self.in_rps_limit.load(Ordering::Relaxed) {
            Err(SpeedError::Throttled)
        } else {
            Ok(())
        }
    }

    fn set_rps_limits(&self, in_rps: u32, out_rps: u32) {
        self.in_rps_limit.store(in_rps, Ordering::Relaxed);
        self.out_rps_limit.store(out_rps, Ordering::Relaxed);
        self.out_interval_nanos
            .store(interval_nanos(out_rps), Ordering::Relaxed);
    }

    async fn run(&self, cancel: CancellationToken) {
        let tickets = self
            .tickets_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match tickets {
            Some(tickets) => match self.algorithm {
                PacingAlgorithm::Robust => self.robust_loop(tickets, cancel).await,
                PacingAlgorithm::Risky => self.risky_loop(tickets, cancel).await,
            },
            // the loop is already owned by another caller
            None => cancel.cancelled().await,
        }
    }
}

fn interval_nanos(out_rps: u32) -> u64 {
    1_000_000_000 / u64::from(out_rps.max(1))
}

fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
