//! Session configuration.
//!
//! Applications hand the session a plain [`SessionConfig`]; internally the
//! values live in atomics so `set_config` takes effect on the next
//! iteration of whichever pump consults them, without any locking.

use super::event::Severity;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Max inbound requests admitted per second.
    pub in_rps_limit: u32,
    /// Target outbound send rate.
    pub out_rps_limit: u32,
    /// Max simultaneous in-flight requests, per direction.
    pub window_limit: u32,
    /// Minimum pause after a throttled response before the next outbound
    /// send completes.
    pub throttle_pause_sec: u32,
    /// Upper bound on automatic re-sends caused by throttled responses.
    pub throttle_retries_max: u32,
    /// Per-request response timeout.
    pub req_timeout_sec: u32,
    pub enquire_link_enabled: bool,
    pub enquire_link_interval_sec: u64,
    /// Close the stream when no bytes arrive for this long.
    pub silence_timeout_sec: u64,
    /// Minimum severity emitted on the event stream.
    pub log_severity: Severity,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            in_rps_limit: 1,
            out_rps_limit: 1,
            window_limit: 1,
            throttle_pause_sec: 1,
            throttle_retries_max: 3,
            req_timeout_sec: 2,
            enquire_link_enabled: false,
            enquire_link_interval_sec: 15,
            silence_timeout_sec: 60,
            log_severity: Severity::Info,
        }
    }
}

/// Atomic view of the configuration shared by the session tasks.
#[derive(Debug)]
pub(crate) struct LiveConfig {
    in_rps_limit: AtomicU32,
    out_rps_limit: AtomicU32,
    window_limit: AtomicU32,
    throttle_pause_sec: AtomicU32,
    throttle_retries_max: AtomicU32,
    req_timeout_sec: AtomicU32,
    enquire_link_enabled: AtomicBool,
    enquire_link_interval_sec: AtomicU64,
    silence_timeout_sec: AtomicU64,
    log_severity: AtomicU8,
}

impl LiveConfig {
    pub fn new(cfg: &SessionConfig) -> LiveConfig {
        LiveConfig {
            in_rps_limit: AtomicU32::new(cfg.in_rps_limit),
            out_rps_limit: AtomicU32::new(cfg.out_rps_limit),
            window_limit: AtomicU32::new(cfg.window_limit),
            throttle_pause_sec: AtomicU32::new(cfg.throttle_pause_sec),
            throttle_retries_max: AtomicU32::new(cfg.throttle_retries_max),
            req_timeout_sec: AtomicU32::new(cfg.req_timeout_sec),
            enquire_link_enabled: AtomicBool::new(cfg.enquire_link_enabled),
            enquire_link_interval_sec: AtomicU64::new(cfg.enquire_link_interval_sec),
            silence_timeout_sec: AtomicU64::new(cfg.silence_timeout_sec),
            log_severity: AtomicU8::new(cfg.log_severity.into()),
        }
    }

    /// Store every field. Returns the previous window limit so the caller
    /// can resize the window gate.
    pub fn store(&self, cfg: &SessionConfig) -> u32 {
        self.in_rps_limit.store(cfg.in_rps_limit, Ordering::Relaxed);
        self.out_rps_limit.store(cfg.out_rps_limit, Ordering::Relaxed);
        let previous_window = self.window_limit.swap(cfg.window_limit, Ordering::Relaxed);
        self.throttle_pause_sec
            .store(cfg.throttle_pause_sec, Ordering::Relaxed);
        self.throttle_retries_max
            .store(cfg.throttle_retries_max, Ordering::Relaxed);
        self.req_timeout_sec
            .store(cfg.req_timeout_sec, Ordering::Relaxed);
        self.enquire_link_enabled
            .store(cfg.enquire_link_enabled, Ordering::Relaxed);
        self.enquire_link_interval_sec
            .store(cfg.enquire_link_interval_sec, Ordering::Relaxed);
        self.silence_timeout_sec
            .store(cfg.silence_timeout_sec, Ordering::Relaxed);
        self.log_severity
            .store(cfg.log_severity.into(), Ordering::Relaxed);
        previous_window
    }

    pub fn snapshot(&self) -> SessionConfig {
        SessionConfig {
            in_rps_limit: self.in_rps_limit.load(Ordering::Relaxed),
            out_rps_limit: self.out_rps_limit.load(Ordering::Relaxed),
            window_limit: self.window_limit.load(Ordering::Relaxed),
            throttle_pause_sec: self.throttle_pause_sec.load(Ordering::Relaxed),
            throttle_retries_max: self.throttle_retries_max.load(Ordering::Relaxed),
            req_timeout_sec: self.req_timeout_sec.load(Ordering::Relaxed),
            enquire_link_enabled: self.enquire_link_enabled.load(Ordering::Relaxed),
            enquire_link_interval_sec: self.enquire_link_interval_sec.load(Ordering::Relaxed),
            silence_timeout_sec: self.silence_timeout_sec.load(Ordering::Relaxed),
            log_severity: self.log_severity.load(Ordering::Relaxed).into(),
        }
    }

    pub fn window_limit(&self) -> u32 {
        self.window_limit.load(Ordering::Relaxed)
    }

    pub fn throttle_retries_max(&self) -> u32 {
        self.throttle_retries_max.load(Ordering::Relaxed)
    }

    pub fn throttle_pause(&self) -> Duration {
        Duration::from_secs(u64::from(self.throttle_pause_sec.load(Ordering::Relaxed)))
    }

    pub fn req_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.req_timeout_sec.load(Ordering::Relaxed)))
    }

    pub fn enquire_link_enabled(&self) -> bool {
        self.enquire_link_enabled.load(Ordering::Relaxed)
    }

    pub fn enquire_link_interval(&self) -> Duration {
        Duration::from_secs(self.enquire_link_interval_sec.load(Ordering::Relaxed))
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_secs(self.silence_timeout_sec.load(Ordering::Relaxed))
    }

    pub fn log_severity(&self) -> Severity {
        self.log_severity.load(Ordering::Relaxed).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.in_rps_limit, 1);
        assert_eq!(cfg.out_rps_limit, 1);
        assert_eq!(cfg.window_limit, 1);
        assert_eq!(cfg.throttle_pause_sec, 1);
        assert_eq!(cfg.throttle_retries_max, 3);
        assert_eq!(cfg.req_timeout_sec, 2);
        assert!(!cfg.enquire_link_enabled);
        assert_eq!(cfg.enquire_link_interval_sec, 15);
        assert_eq!(cfg.silence_timeout_sec, 60);
        assert_eq!(cfg.log_severity, Severity::Info);
    }

    #[test]
    fn store_round_trips_and_reports_old_window() {
        let live = LiveConfig::new(&SessionConfig::default());
        let updated = SessionConfig {
            in_rps_limit: 100,
            out_rps_limit: 50,
            window_limit: 8,
            throttle_pause_sec: 2,
            throttle_retries_max: 5,
            req_timeout_sec: 10,
            enquire_link_enabled: true,
            enquire_link_interval_sec: 30,
            silence_timeout_sec: 120,
            log_severity: Severity::Debug,
        };
        assert_eq!(live.store(&updated), 1);
        assert_eq!(live.snapshot(), updated);
        assert_eq!(live.window_limit(), 8);
        assert_eq!(live.req_timeout(), Duration::from_secs(10));
    }
}
