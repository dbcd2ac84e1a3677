//! Trading-Hours Guard (C3): decides whether the initiator session is allowed
//! to log on, and schedules resumption after a broker-signalled "not a trading
//! day" override.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct TradingHoursConfig {
    pub trading_start_hour: u32,
    pub trading_end_hour: u32,
    pub non_trading_resume_hour: u32,
    pub trading_zone: Tz,
}

impl Default for TradingHoursConfig {
    fn default() -> Self {
        Self {
            trading_start_hour: 4,
            trading_end_hour: 20,
            non_trading_resume_hour: 6,
            trading_zone: chrono_tz::America::New_York,
        }
    }
}

/// Fires once when a scheduled resume instant is reached.
pub type ResumeSignal = mpsc::Sender<()>;

#[derive(Clone)]
pub struct TradingHoursGuard {
    config: TradingHoursConfig,
    next_allowed_logon: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl TradingHoursGuard {
    pub fn new(config: TradingHoursConfig) -> Self {
        Self { config, next_allowed_logon: Arc::new(RwLock::new(None)) }
    }

    /// `isConnectionAllowed()`: true iff `now >= nextAllowedLogon` and the hour
    /// (in the configured zone) falls in `[start, end)`.
    pub fn is_connection_allowed(&self) -> bool {
        self.is_connection_allowed_at(Utc::now())
    }

    pub fn is_connection_allowed_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(next_allowed) = *self.next_allowed_logon.read() {
            if now < next_allowed {
                return false;
            }
        }
        let local = now.with_timezone(&self.config.trading_zone);
        let hour = local.hour();
        hour >= self.config.trading_start_hour && hour < self.config.trading_end_hour
    }

    /// `getNextAllowedLogon()`.
    pub fn next_allowed_logon(&self) -> Option<DateTime<Utc>> {
        *self.next_allowed_logon.read()
    }

    /// `markNotTradingDay(reason)`: sets the override to tomorrow at
    /// `non_trading_resume_hour` in the configured zone.
    pub fn mark_not_trading_day(&self, reason: &str) {
        self.mark_not_trading_day_at(Utc::now(), reason);
    }

    pub fn mark_not_trading_day_at(&self, now: DateTime<Utc>, reason: &str) {
        let local_now = now.with_timezone(&self.config.trading_zone);
        let tomorrow = local_now.date_naive().succ_opt().unwrap_or(local_now.date_naive());
        let resume_naive = tomorrow.and_hms_opt(self.config.non_trading_resume_hour, 0, 0).unwrap();
        let resume_local = self
            .config
            .trading_zone
            .from_local_datetime(&resume_naive)
            .single()
            .unwrap_or_else(|| self.config.trading_zone.from_utc_datetime(&resume_naive));

        tracing::warn!(reason, resume_at = %resume_local, "trading paused: not a trading day");
        *self.next_allowed_logon.write() = Some(resume_local.with_timezone(&Utc));
    }

    /// `scheduleResume(callback)`: spawns a single timer task that clears the
    /// override and notifies `resume_tx` once the scheduled instant arrives.
    /// A no-op if there is no override set (nothing to schedule) or if the
    /// receiver has already been dropped (process shutting down).
    pub fn schedule_resume(&self, resume_tx: ResumeSignal) {
        let Some(resume_at) = self.next_allowed_logon() else { return };
        let guard = self.clone();
        tokio::spawn(async move {
            let now = Utc::now();
            if resume_at > now {
                let wait = (resume_at - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
            }
            *guard.next_allowed_logon.write() = None;
            let _ = resume_tx.send(()).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn guard() -> TradingHoursGuard {
        TradingHoursGuard::new(TradingHoursConfig::default())
    }

    #[test]
    fn disallowed_outside_trading_window() {
        let g = guard();
        // 2026-01-02 is a Friday; 02:00 America/New_York is before the 04:00 start.
        let too_early = chrono_tz::America::New_York
            .with_ymd_and_hms(2026, 1, 2, 2, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert!(!g.is_connection_allowed_at(too_early));

        let too_late = chrono_tz::America::New_York
            .with_ymd_and_hms(2026, 1, 2, 21, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert!(!g.is_connection_allowed_at(too_late));
    }

    #[test]
    fn allowed_inside_trading_window() {
        let g = guard();
        let mid_day = chrono_tz::America::New_York
            .with_ymd_and_hms(2026, 1, 2, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert!(g.is_connection_allowed_at(mid_day));
    }

    #[test]
    fn exactly_at_next_allowed_logon_is_allowed() {
        let g = guard();
        let now = chrono_tz::America::New_York
            .with_ymd_and_hms(2026, 1, 2, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        *g.next_allowed_logon.write() = Some(now);
        assert!(g.is_connection_allowed_at(now));
    }

    #[test]
    fn mark_not_trading_day_sets_resume_for_next_calendar_day() {
        let g = guard();
        let now = chrono_tz::America::New_York
            .with_ymd_and_hms(2026, 1, 2, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        g.mark_not_trading_day_at(now, "Not trade day");

        let next = g.next_allowed_logon().unwrap();
        let next_local = next.with_timezone(&chrono_tz::America::New_York);
        assert_eq!(next_local.hour(), 6);
        assert_eq!(next_local.date_naive(), now.with_timezone(&chrono_tz::America::New_York).date_naive().succ_opt().unwrap());
        assert!(!g.is_connection_allowed_at(now));
    }

    #[tokio::test]
    async fn schedule_resume_is_noop_without_override() {
        let g = guard();
        let (tx, mut rx) = mpsc::channel(1);
        g.schedule_resume(tx);
        assert!(rx.try_recv().is_err());
    }
}
