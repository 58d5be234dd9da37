//! Time components: a daily time-of-day trigger and a weekday gate.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, Weekday};

use crate::engine::{Condition, FireSignal, FiringContext, Trigger};
use crate::registry::PropertyBag;

/// Half-width of the window around the target time, in seconds. Ticks
/// arrive on a coarse heartbeat, so the window must cover the gap
/// between two ticks.
const FIRE_WINDOW_SECONDS: i64 = 75;

/// Fires once per day when a heartbeat lands near the target time.
#[derive(Debug, Default)]
pub struct TimeTrigger {
    time: Option<NaiveTime>,
    signal: Option<FireSignal>,
    last_emission: Option<NaiveDate>,
}

impl TimeTrigger {
    /// Create a trigger for a target time; `None` never fires.
    #[must_use]
    pub fn new(time: Option<NaiveTime>) -> Self {
        Self {
            time,
            signal: None,
            last_emission: None,
        }
    }
}

impl Trigger for TimeTrigger {
    fn arm(&mut self, signal: FireSignal) {
        self.signal = Some(signal);
    }

    fn disarm(&mut self) {
        self.signal = None;
    }

    fn tick(&mut self, now: DateTime<Local>) {
        let Some(target) = self.time else {
            return;
        };
        let Some(signal) = &self.signal else {
            return;
        };
        let delta = (now.time() - target).num_seconds().abs();
        let today = now.date_naive();
        if delta <= FIRE_WINDOW_SECONDS && self.last_emission != Some(today) {
            // Once per day, even if several ticks land in the window.
            self.last_emission = Some(today);
            signal.fire();
        }
    }
}

/// Passes on the checked weekdays only.
#[derive(Debug, Default)]
pub struct WeekdayCondition {
    on_monday: bool,
    on_tuesday: bool,
    on_wednesday: bool,
    on_thursday: bool,
    on_friday: bool,
    on_saturday: bool,
    on_sunday: bool,
}

impl WeekdayCondition {
    /// Build from decoded document properties; unset days default off.
    #[must_use]
    pub fn from_bag(bag: &PropertyBag) -> Self {
        Self {
            on_monday: bag.bool_or("onMonday", false),
            on_tuesday: bag.bool_or("onTuesday", false),
            on_wednesday: bag.bool_or("onWednesday", false),
            on_thursday: bag.bool_or("onThursday", false),
            on_friday: bag.bool_or("onFriday", false),
            on_saturday: bag.bool_or("onSaturday", false),
            on_sunday: bag.bool_or("onSunday", false),
        }
    }

    const fn allows(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.on_monday,
            Weekday::Tue => self.on_tuesday,
            Weekday::Wed => self.on_wednesday,
            Weekday::Thu => self.on_thursday,
            Weekday::Fri => self.on_friday,
            Weekday::Sat => self.on_saturday,
            Weekday::Sun => self.on_sunday,
        }
    }
}

impl Condition for WeekdayCondition {
    fn is_valid(&self, context: &FiringContext) -> bool {
        self.allows(context.fired_at.weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    use chrono::TimeZone;

    use crate::registry::PropertyValue;

    fn at(hour: u32, minute: u32, day: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 8, day, hour, minute, 0)
            .single()
            .expect("valid test datetime")
    }

    fn target(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid test time")
    }

    #[test]
    fn test_time_trigger_fires_in_window_once_per_day() {
        let (sender, receiver) = channel();
        let mut trigger = TimeTrigger::new(Some(target(8, 30)));
        trigger.arm(FireSignal::new("rule_00000".to_string(), 1, sender));

        // Outside the window: nothing.
        trigger.tick(at(8, 0, 6));
        assert!(receiver.try_recv().is_err());

        // Inside the window: fires.
        trigger.tick(at(8, 30, 6));
        assert!(receiver.try_recv().is_ok());

        // Later ticks in the same window fire only once per day.
        trigger.tick(at(8, 31, 6));
        assert!(receiver.try_recv().is_err());

        // Next day: fires again.
        trigger.tick(at(8, 30, 7));
        assert!(receiver.try_recv().is_ok());
    }

    #[test]
    fn test_time_trigger_without_target_never_fires() {
        let (sender, receiver) = channel();
        let mut trigger = TimeTrigger::new(None);
        trigger.arm(FireSignal::new("rule_00000".to_string(), 1, sender));
        trigger.tick(at(8, 30, 6));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_time_trigger_disarmed_is_silent() {
        let (sender, receiver) = channel();
        let mut trigger = TimeTrigger::new(Some(target(8, 30)));
        trigger.arm(FireSignal::new("rule_00000".to_string(), 1, sender));
        trigger.disarm();
        trigger.tick(at(8, 30, 6));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_weekday_condition() {
        let mut bag = PropertyBag::new();
        bag.insert("onThursday", PropertyValue::Bool(true));
        let condition = WeekdayCondition::from_bag(&bag);

        // 2026-08-06 is a Thursday, 2026-08-07 a Friday.
        let thursday = FiringContext::at("r", at(9, 0, 6));
        let friday = FiringContext::at("r", at(9, 0, 7));
        assert!(condition.is_valid(&thursday));
        assert!(!condition.is_valid(&friday));
    }
}
