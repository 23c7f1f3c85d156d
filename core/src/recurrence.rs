//! Expansion of recurring event definitions into dated occurrences.
//!
//! A recurring definition emits an occurrence on its own start date and then
//! every step (1, 7 or 14 days, or one calendar month) until the running date
//! passes the rule's end date. Recurring output is clipped to the query
//! window; a one-off event always yields its single occurrence and leaves
//! date filtering to the caller.
//!
//! [`Occurrences`] is a lazy iterator that owns nothing but a cursor, so it is
//! cheap to clone and a clone restarts from the same position.

use crate::types::{EventDefinition, EventOccurrence, Frequency, RecurrenceRule};
use chrono::{Days, Months, NaiveDate};

/// Hard stop for definitions whose end date escaped creation-time validation.
const MAX_STEPS: u32 = 400;

/// Inclusive calendar window `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    /// First date in the window
    pub start: NaiveDate,
    /// Last date in the window
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` lies inside the window
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Date of the `n`th occurrence (0 = start) for `frequency`.
///
/// Monthly steps add whole months to the start date, clamping to the end of
/// shorter months, so a rule starting on the 31st never drifts.
#[must_use]
pub fn nth_date(start: NaiveDate, frequency: Frequency, n: u32) -> Option<NaiveDate> {
    let n = u64::from(n);
    match frequency {
        Frequency::Daily => start.checked_add_days(Days::new(n)),
        Frequency::Weekly => start.checked_add_days(Days::new(n * 7)),
        Frequency::Biweekly => start.checked_add_days(Days::new(n * 14)),
        Frequency::Monthly => start.checked_add_months(Months::new(u32::try_from(n).ok()?)),
    }
}

/// Iterate the occurrences of `event` inside `window`.
#[must_use]
pub const fn expand(event: &EventDefinition, window: DateWindow) -> Occurrences<'_> {
    Occurrences {
        event,
        window,
        step: 0,
        finished: false,
    }
}

/// Lazy occurrence sequence produced by [`expand`].
#[derive(Clone, Debug)]
pub struct Occurrences<'a> {
    event: &'a EventDefinition,
    window: DateWindow,
    step: u32,
    finished: bool,
}

impl Occurrences<'_> {
    fn next_recurring(&mut self, rule: RecurrenceRule) -> Option<NaiveDate> {
        while self.step <= MAX_STEPS {
            let date = nth_date(self.event.date, rule.frequency, self.step)?;
            self.step += 1;

            if date > rule.end_date || date > self.window.end {
                return None;
            }
            if date >= self.window.start {
                return Some(date);
            }
        }
        None
    }
}

impl Iterator for Occurrences<'_> {
    type Item = EventOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let date = match self.event.recurrence {
            None => {
                self.finished = true;
                Some(self.event.date)
            }
            Some(rule) => self.next_recurring(rule),
        };

        match date {
            Some(date) => Some(self.event.occurrence_on(date)),
            None => {
                self.finished = true;
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{EventId, EventStatus, OccurrenceId, UserId};
    use chrono::{NaiveTime, Utc};
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(date: NaiveDate, recurrence: Option<RecurrenceRule>) -> EventDefinition {
        EventDefinition {
            id: EventId::new(),
            organizer_id: UserId::new(),
            title: "Run club".into(),
            description: String::new(),
            category: "sports".into(),
            date,
            time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            location: None,
            location_name: None,
            capacity: None,
            recurrence,
            status: EventStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn rule(frequency: Frequency, end_date: NaiveDate) -> Option<RecurrenceRule> {
        Some(RecurrenceRule {
            frequency,
            end_date,
        })
    }

    fn dates(event: &EventDefinition, window: DateWindow) -> Vec<NaiveDate> {
        expand(event, window).map(|o| o.date).collect()
    }

    #[test]
    fn weekly_rule_stops_at_last_monday_before_end_date() {
        let ev = event(ymd(2024, 1, 1), rule(Frequency::Weekly, ymd(2024, 2, 28)));
        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 3, 31));

        let got = dates(&ev, window);

        let expected: Vec<_> = [1, 8, 15, 22, 29]
            .iter()
            .map(|d| ymd(2024, 1, *d))
            .chain([5, 12, 19, 26].iter().map(|d| ymd(2024, 2, *d)))
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn occurrences_carry_composite_ids_and_parent_fields() {
        let ev = event(ymd(2024, 1, 1), rule(Frequency::Daily, ymd(2024, 1, 3)));
        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 31));

        let occurrences: Vec<_> = expand(&ev, window).collect();

        assert_eq!(occurrences.len(), 3);
        assert_eq!(
            occurrences[1].id,
            OccurrenceId::recurring(ev.id, ymd(2024, 1, 2))
        );
        assert_eq!(occurrences[1].id.to_string(), format!("{}_2024-01-02", ev.id));
        assert!(occurrences.iter().all(|o| o.event_id == ev.id && o.time == ev.time));
    }

    #[test]
    fn daily_rule_over_two_months_is_bounded() {
        let ev = event(ymd(2024, 3, 1), rule(Frequency::Daily, ymd(2024, 5, 1)));
        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 12, 31));

        assert_eq!(dates(&ev, window).len(), 62);
    }

    #[test]
    fn biweekly_steps_fourteen_days() {
        let ev = event(ymd(2024, 1, 1), rule(Frequency::Biweekly, ymd(2024, 2, 29)));
        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 12, 31));

        assert_eq!(
            dates(&ev, window),
            vec![ymd(2024, 1, 1), ymd(2024, 1, 15), ymd(2024, 1, 29), ymd(2024, 2, 12), ymd(2024, 2, 26)]
        );
    }

    #[test]
    fn monthly_rule_clamps_to_month_end_without_drifting() {
        let ev = event(ymd(2024, 1, 31), rule(Frequency::Monthly, ymd(2024, 3, 31)));
        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 12, 31));

        assert_eq!(
            dates(&ev, window),
            vec![ymd(2024, 1, 31), ymd(2024, 2, 29), ymd(2024, 3, 31)]
        );
    }

    #[test]
    fn recurring_output_is_clipped_to_window() {
        let ev = event(ymd(2024, 1, 1), rule(Frequency::Daily, ymd(2024, 2, 29)));
        let window = DateWindow::new(ymd(2024, 1, 10), ymd(2024, 1, 12));

        assert_eq!(
            dates(&ev, window),
            vec![ymd(2024, 1, 10), ymd(2024, 1, 11), ymd(2024, 1, 12)]
        );
    }

    #[test]
    fn one_off_event_yields_single_unclipped_occurrence() {
        let ev = event(ymd(2023, 6, 1), None);
        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 31));

        let occurrences: Vec<_> = expand(&ev, window).collect();

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].id, OccurrenceId::single(ev.id));
        assert_eq!(occurrences[0].date, ymd(2023, 6, 1));
    }

    #[test]
    fn clone_restarts_from_the_same_position() {
        let ev = event(ymd(2024, 1, 1), rule(Frequency::Weekly, ymd(2024, 2, 28)));
        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 3, 31));

        let mut iter = expand(&ev, window);
        iter.next();
        let replay = iter.clone();

        let rest: Vec<_> = iter.map(|o| o.date).collect();
        let replayed: Vec<_> = replay.map(|o| o.date).collect();
        assert_eq!(rest, replayed);
        assert_eq!(rest.len(), 8);
    }

    proptest! {
        #[test]
        fn occurrences_stay_inside_rule_and_window(
            start_offset in 0u64..365,
            span in 0u64..62,
            freq in prop_oneof![
                Just(Frequency::Daily),
                Just(Frequency::Weekly),
                Just(Frequency::Biweekly),
                Just(Frequency::Monthly),
            ],
            window_from in 0u64..400,
            window_len in 0u64..120,
        ) {
            let base = ymd(2024, 1, 1);
            let start = base + Days::new(start_offset);
            let end = start + Days::new(span);
            let window = DateWindow::new(base + Days::new(window_from), base + Days::new(window_from + window_len));
            let ev = event(start, rule(freq, end));

            let got = dates(&ev, window);

            prop_assert!(got.len() <= 63);
            prop_assert!(got.windows(2).all(|w| w[0] < w[1]));
            for d in got {
                prop_assert!(d >= start && d <= end);
                prop_assert!(window.contains(d));
            }
        }
    }
}
