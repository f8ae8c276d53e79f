use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use common::intervals::hour_key;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Why the loop woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Time for the regular fetch.
    Data,
    /// Wall clock refresh.
    Clock,
    /// The display hour changed, fetch out of cycle.
    HourRollover,
    /// Redraw the animated chart.
    Frame,
}

/// Merges the independent timers into one stream of ticks, so every state
/// change happens on the caller's task.
pub struct Scheduler {
    data: Interval,
    clock: Interval,
    frame: Option<Interval>,
    timezone: Tz,
    last_hour: Option<(i32, u32, u32)>,
    pending_rollover: bool,
}

impl Scheduler {
    /// Must be called inside a tokio runtime. Without a `frame` period no
    /// `Tick::Frame` is ever produced.
    pub fn new(data: Duration, clock: Duration, frame: Option<Duration>, timezone: Tz) -> Self {
        let mut data = interval(data);
        data.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut clock = interval(clock);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let frame = frame.map(|period| {
            let mut frame = interval(period);
            frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
            frame
        });

        Scheduler {
            data,
            clock,
            frame,
            timezone,
            last_hour: None,
            pending_rollover: false,
        }
    }

    /// Records the hour `now` falls in. True when it differs from the hour
    /// seen on the previous call; the first call only primes the state.
    pub fn observe_hour(&mut self, now: DateTime<Utc>) -> bool {
        let key = hour_key(&now.with_timezone(&self.timezone));
        let changed = self.last_hour.is_some_and(|last| last != key);
        self.last_hour = Some(key);
        changed
    }

    /// Waits for the next tick. A clock tick that crosses an hour boundary is
    /// followed immediately by `Tick::HourRollover`.
    pub async fn next(&mut self) -> Tick {
        if self.pending_rollover {
            self.pending_rollover = false;
            return Tick::HourRollover;
        }

        let tick = tokio::select! {
            biased;
            _ = self.clock.tick() => Tick::Clock,
            _ = self.data.tick() => Tick::Data,
            _ = frame_tick(&mut self.frame) => Tick::Frame,
        };

        if tick == Tick::Clock && self.observe_hour(Utc::now()) {
            self.pending_rollover = true;
        }
        tick
    }
}

async fn frame_tick(frame: &mut Option<Interval>) {
    match frame {
        Some(frame) => {
            frame.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
    }

    #[tokio::test]
    async fn test_observe_hour() {
        let mut scheduler = Scheduler::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
            None,
            chrono_tz::Asia::Bangkok,
        );

        assert!(!scheduler.observe_hour(at(9, 59, 58)));
        assert!(!scheduler.observe_hour(at(9, 59, 59)));
        assert!(scheduler.observe_hour(at(10, 0, 0)));
        assert!(!scheduler.observe_hour(at(10, 0, 1)));
    }

    #[tokio::test]
    async fn test_observe_hour_half_hour_zone() {
        let mut scheduler = Scheduler::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
            None,
            chrono_tz::Asia::Kolkata,
        );

        assert!(!scheduler.observe_hour(at(9, 59, 0)));
        assert!(!scheduler.observe_hour(at(10, 0, 0)));
        assert!(scheduler.observe_hour(at(10, 30, 0)));
    }

    #[tokio::test]
    async fn test_first_ticks() {
        let mut scheduler = Scheduler::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
            None,
            chrono_tz::Asia::Bangkok,
        );

        // Both intervals fire immediately, clock first.
        assert_eq!(scheduler.next().await, Tick::Clock);
        assert_eq!(scheduler.next().await, Tick::Data);
    }

    #[tokio::test]
    async fn test_frames_only_when_enabled() {
        let mut scheduler = Scheduler::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
            Some(Duration::from_millis(5)),
            chrono_tz::Asia::Bangkok,
        );

        let mut ticks = Vec::new();
        for _ in 0..5 {
            ticks.push(scheduler.next().await);
        }

        assert_eq!(&ticks[..2], &[Tick::Clock, Tick::Data]);
        assert!(ticks[2..].iter().all(|tick| *tick == Tick::Frame));
    }

    #[tokio::test]
    async fn test_pending_rollover_is_emitted_next() {
        let mut scheduler = Scheduler::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
            None,
            chrono_tz::Asia::Bangkok,
        );
        scheduler.pending_rollover = true;

        assert_eq!(scheduler.next().await, Tick::HourRollover);
        assert_eq!(scheduler.next().await, Tick::Clock);
    }
}
