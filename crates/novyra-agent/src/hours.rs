// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weekly business-hours schedule in a fixed UTC offset.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc, Weekday};
use novyra_config::model::{parse_clock_time, BusinessHoursConfig};
use novyra_core::error::NovyraError;

/// Opening window for one day. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    open: NaiveTime,
    close: NaiveTime,
}

impl Window {
    fn contains(&self, t: NaiveTime) -> bool {
        self.open <= t && t <= self.close
    }
}

#[derive(Debug, Clone)]
pub struct BusinessSchedule {
    offset: FixedOffset,
    label: String,
    default_window: Window,
    closed: Vec<Weekday>,
    overrides: HashMap<Weekday, Window>,
}

impl BusinessSchedule {
    pub fn from_config(config: &BusinessHoursConfig) -> Result<Self, NovyraError> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            NovyraError::Config(format!(
                "business_hours.utc_offset_minutes {} is out of range",
                config.utc_offset_minutes
            ))
        })?;

        let closed = config
            .closed_days
            .iter()
            .map(|d| parse_weekday(d))
            .collect::<Result<Vec<_>, _>>()?;

        let mut overrides = HashMap::new();
        for ov in &config.overrides {
            overrides.insert(parse_weekday(&ov.day)?, window(&ov.open_time, &ov.close_time)?);
        }

        Ok(Self {
            offset,
            label: config.timezone_label.clone(),
            default_window: window(&config.open_time, &config.close_time)?,
            closed,
            overrides,
        })
    }

    fn window_for(&self, day: Weekday) -> Option<Window> {
        if self.closed.contains(&day) {
            return None;
        }
        Some(self.overrides.get(&day).copied().unwrap_or(self.default_window))
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.offset);
        self.window_for(local.weekday())
            .is_some_and(|w| w.contains(local.time()))
    }

    /// Customer-facing "we're closed" text, or `None` while open.
    pub fn closed_message(&self, now: DateTime<Utc>) -> Option<String> {
        self.closed_headline(now).map(|headline| {
            format!("{headline}\n\n📧 Our agents will reach out to you via email as soon as we're open. Please leave your message and we'll get back to you during business hours!")
        })
    }

    /// First paragraph of [`closed_message`](Self::closed_message): the
    /// weekly hours and when the business next opens.
    pub fn closed_headline(&self, now: DateTime<Utc>) -> Option<String> {
        let local = now.with_timezone(&self.offset);
        let today = self.window_for(local.weekday());

        let reopening = match today {
            Some(w) if w.contains(local.time()) => return None,
            Some(w) if local.time() < w.open => {
                format!(" We'll be open at {} today.", format_time(w.open))
            }
            _ => self.next_opening(local.weekday()),
        };

        Some(format!(
            "⏰ We're currently closed. Our business hours are {}.{reopening}",
            self.summary()
        ))
    }

    fn next_opening(&self, today: Weekday) -> String {
        let mut day = today.succ();
        for step in 1..=7 {
            if let Some(w) = self.window_for(day) {
                let when = if step == 1 {
                    "tomorrow".to_string()
                } else {
                    format!("on {}", weekday_name(day))
                };
                return format!(" We'll be open {when} at {}.", format_time(w.open));
            }
            day = day.succ();
        }
        String::new()
    }

    /// e.g. "Monday to Saturday, 9:00 AM to 6:00 PM (WAT)".
    pub fn summary(&self) -> String {
        let open_days: Vec<Weekday> = WEEK
            .iter()
            .copied()
            .filter(|d| !self.closed.contains(d))
            .collect();

        let days = match open_days.as_slice() {
            [] => return "currently by appointment only".to_string(),
            [only] => weekday_name(*only).to_string(),
            [first, .., last]
                if open_days.len() == last.num_days_from_monday() as usize
                    - first.num_days_from_monday() as usize
                    + 1 =>
            {
                format!("{} to {}", weekday_name(*first), weekday_name(*last))
            }
            days => days
                .iter()
                .map(|d| weekday_name(*d))
                .collect::<Vec<_>>()
                .join(", "),
        };

        format!(
            "{days}, {} to {} ({})",
            format_time(self.default_window.open),
            format_time(self.default_window.close),
            self.label
        )
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn parse_weekday(day: &str) -> Result<Weekday, NovyraError> {
    day.trim()
        .parse()
        .map_err(|_| NovyraError::Config(format!("unknown weekday `{day}`")))
}

fn window(open: &str, close: &str) -> Result<Window, NovyraError> {
    Ok(Window {
        open: clock_time(open)?,
        close: clock_time(close)?,
    })
}

fn clock_time(value: &str) -> Result<NaiveTime, NovyraError> {
    parse_clock_time(value)
        .and_then(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
        .ok_or_else(|| NovyraError::Config(format!("`{value}` is not a valid HH:MM time")))
}

fn format_time(t: NaiveTime) -> String {
    t.format("%-I:%M %p").to_string()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
