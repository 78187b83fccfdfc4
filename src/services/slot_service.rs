use crate::models::application::ProposedSlot;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};

/// Time-of-day at which a slot may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTime {
    pub hour: u32,
    pub minute: u32,
}

/// Produces candidate interview times. Pure: the reference time is injected
/// by the caller, read once per batch.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    pub day_count: usize,
    pub slots_per_day: Vec<SlotTime>,
    pub business_days_only: bool,
    pub duration_minutes: i64,
}

impl Default for SlotGenerator {
    fn default() -> Self {
        Self {
            day_count: 5,
            slots_per_day: vec![
                SlotTime { hour: 10, minute: 0 },
                SlotTime { hour: 14, minute: 0 },
                SlotTime { hour: 16, minute: 0 },
            ],
            business_days_only: true,
            duration_minutes: 60,
        }
    }
}

impl SlotGenerator {
    /// Walks forward one day at a time starting the day after
    /// `starting_from`, emitting one slot per configured time-of-day on each
    /// qualifying day, until `day_count` qualifying days are consumed.
    pub fn generate(&self, starting_from: DateTime<Utc>) -> Vec<ProposedSlot> {
        let mut slots = Vec::with_capacity(self.day_count * self.slots_per_day.len());
        let mut day = starting_from.date_naive() + Duration::days(1);
        let mut days_consumed = 0;

        while days_consumed < self.day_count {
            let is_business_day = !matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
            if !self.business_days_only || is_business_day {
                for t in &self.slots_per_day {
                    let time = NaiveTime::from_hms_opt(t.hour, t.minute, 0)
                        .unwrap_or(NaiveTime::MIN);
                    let start = Utc.from_utc_datetime(&day.and_time(time));
                    slots.push(ProposedSlot {
                        start,
                        duration_minutes: self.duration_minutes,
                    });
                }
                days_consumed += 1;
            }
            day += Duration::days(1);
        }

        slots
    }
}
