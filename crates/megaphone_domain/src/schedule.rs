use chrono::{DateTime, Duration, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Decides from display history whether a megaphone may be shown at `now`.
///
/// Implementations must be pure: the same arguments always give the same answer.
/// `last_seen` is `None` when the megaphone has never been shown.
pub trait MegaphoneSchedule: Send + Sync {
    fn should_display(
        &self,
        seen_count: u32,
        last_seen: Option<DateTime<Utc>>,
        first_visible: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool;
}

/// Always on, or always off. Disabled feature flags map to `ForeverSchedule(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeverSchedule(pub bool);

impl MegaphoneSchedule for ForeverSchedule {
    fn should_display(
        &self,
        _seen_count: u32,
        _last_seen: Option<DateTime<Utc>>,
        _first_visible: DateTime<Utc>,
        _now: DateTime<Utc>,
    ) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringSchedule {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_count: Option<u32>,
}

impl RecurringSchedule {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            max_count: None,
        }
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }
}

impl MegaphoneSchedule for RecurringSchedule {
    fn should_display(
        &self,
        seen_count: u32,
        last_seen: Option<DateTime<Utc>>,
        first_visible: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.max_count.is_some_and(|max| seen_count >= max) {
            return false;
        }
        match last_seen {
            None => now - first_visible >= self.initial_delay,
            Some(seen_at) => now - seen_at >= self.interval,
        }
    }
}

/// Two-stage rollout for PIN migration: a snoozable reminder after a short
/// grace period, escalating to a full-screen flow once `fullscreen_after`
/// has passed since the megaphone first became visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinsForAllSchedule {
    pub grace_period: Duration,
    pub fullscreen_after: Duration,
    pub fullscreen_enabled: bool,
}

impl PinsForAllSchedule {
    pub fn new(grace_period: Duration, fullscreen_after: Duration) -> Self {
        Self {
            grace_period,
            fullscreen_after,
            fullscreen_enabled: true,
        }
    }

    pub fn with_fullscreen(mut self, enabled: bool) -> Self {
        self.fullscreen_enabled = enabled;
        self
    }

    pub fn should_display_fullscreen(
        &self,
        first_visible: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        self.fullscreen_enabled && now - first_visible >= self.fullscreen_after
    }

    /// Whole days left before the full-screen flow, rounded up. Zero at and past the deadline.
    pub fn days_remaining(&self, first_visible: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        let remaining = self.fullscreen_after - (now - first_visible);
        let millis = remaining.num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

impl MegaphoneSchedule for PinsForAllSchedule {
    fn should_display(
        &self,
        _seen_count: u32,
        _last_seen: Option<DateTime<Utc>>,
        first_visible: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        now - first_visible >= self.grace_period
    }
}

/// The closed set of schedules a catalog entry can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Forever(ForeverSchedule),
    Recurring(RecurringSchedule),
    PinsForAll(PinsForAllSchedule),
}

impl Schedule {
    pub fn forever(enabled: bool) -> Self {
        Schedule::Forever(ForeverSchedule(enabled))
    }

    fn as_dyn(&self) -> &dyn MegaphoneSchedule {
        match self {
            Schedule::Forever(schedule) => schedule,
            Schedule::Recurring(schedule) => schedule,
            Schedule::PinsForAll(schedule) => schedule,
        }
    }
}

impl MegaphoneSchedule for Schedule {
    fn should_display(
        &self,
        seen_count: u32,
        last_seen: Option<DateTime<Utc>>,
        first_visible: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        self.as_dyn()
            .should_display(seen_count, last_seen, first_visible, now)
    }
}

impl From<RecurringSchedule> for Schedule {
    fn from(schedule: RecurringSchedule) -> Self {
        Schedule::Recurring(schedule)
    }
}

impl From<PinsForAllSchedule> for Schedule {
    fn from(schedule: PinsForAllSchedule) -> Self {
        Schedule::PinsForAll(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 2, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn forever_ignores_history() {
        let start = at(0);
        assert!(ForeverSchedule(true).should_display(0, None, start, start));
        assert!(ForeverSchedule(true).should_display(99, Some(at(5)), start, at(6)));
        assert!(!ForeverSchedule(false).should_display(0, None, start, at(23)));
    }

    #[test]
    fn recurring_waits_for_initial_delay() {
        let schedule = RecurringSchedule::new(Duration::hours(4), Duration::hours(6));
        let first_visible = at(0);
        assert!(!schedule.should_display(0, None, first_visible, first_visible));
        assert!(!schedule.should_display(0, None, first_visible, at(3)));
        assert!(schedule.should_display(0, None, first_visible, at(4)));
    }

    #[test]
    fn recurring_respects_interval_after_display() {
        let schedule = RecurringSchedule::new(Duration::hours(4), Duration::hours(6));
        let first_visible = at(0);
        let seen_at = at(4);
        assert!(!schedule.should_display(1, Some(seen_at), first_visible, seen_at));
        assert!(!schedule.should_display(1, Some(seen_at), first_visible, at(9)));
        assert!(schedule.should_display(1, Some(seen_at), first_visible, at(10)));
    }

    #[test]
    fn recurring_stops_at_max_count() {
        let schedule =
            RecurringSchedule::new(Duration::zero(), Duration::hours(1)).with_max_count(2);
        let first_visible = at(0);
        assert!(schedule.should_display(1, Some(at(1)), first_visible, at(3)));
        assert!(!schedule.should_display(2, Some(at(1)), first_visible, at(3)));
        assert!(!schedule.should_display(7, Some(at(1)), first_visible, at(23)));
    }

    #[test]
    fn pins_schedule_opens_after_grace_period() {
        let schedule = PinsForAllSchedule::new(Duration::hours(2), Duration::days(8));
        let first_visible = at(0);
        assert!(!schedule.should_display(0, None, first_visible, first_visible));
        assert!(!schedule.should_display(0, None, first_visible, at(1)));
        assert!(schedule.should_display(0, None, first_visible, at(2)));
        assert!(!schedule.should_display_fullscreen(first_visible, at(2)));
    }

    #[test]
    fn pins_schedule_escalates_to_fullscreen() {
        let schedule = PinsForAllSchedule::new(Duration::hours(2), Duration::days(8));
        let first_visible = at(0);
        let deadline = first_visible + Duration::days(8);
        assert!(!schedule.should_display_fullscreen(first_visible, deadline - Duration::seconds(1)));
        assert!(schedule.should_display_fullscreen(first_visible, deadline));
        assert!(schedule.should_display(3, Some(deadline), first_visible, deadline));

        let flagged_off = schedule.with_fullscreen(false);
        assert!(!flagged_off.should_display_fullscreen(first_visible, deadline + Duration::days(30)));
    }

    #[test]
    fn days_remaining_rounds_up_and_never_goes_negative() {
        let schedule = PinsForAllSchedule::new(Duration::hours(2), Duration::days(8));
        let first_visible = at(0);
        assert_eq!(schedule.days_remaining(first_visible, first_visible), 8);
        assert_eq!(schedule.days_remaining(first_visible, at(1)), 8);
        assert_eq!(
            schedule.days_remaining(first_visible, first_visible + Duration::days(7)),
            1
        );
        assert_eq!(
            schedule.days_remaining(
                first_visible,
                first_visible + Duration::days(8) - Duration::milliseconds(1)
            ),
            1
        );
        assert_eq!(
            schedule.days_remaining(first_visible, first_visible + Duration::days(8)),
            0
        );
        assert_eq!(
            schedule.days_remaining(first_visible, first_visible + Duration::days(20)),
            0
        );
    }

    #[test]
    fn schedule_enum_delegates() {
        let first_visible = at(0);
        assert!(!Schedule::forever(false).should_display(0, None, first_visible, at(1)));
        let recurring: Schedule =
            RecurringSchedule::new(Duration::hours(1), Duration::hours(1)).into();
        assert!(recurring.should_display(0, None, first_visible, at(1)));
    }
}
