//! Per-day lookup for the calendar view.
//!
//! The view marks each day by what it holds for the user: scheduled sessions
//! win over open availability, and a day shared by more than one role wins
//! over a single-role day.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    models::{availability::{AvailabilitySlot, hhmm}, role::Role},
    scheduling::projector::{Horizon, project_dates},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Available,
    Scheduled,
}

/// A tagged date set, e.g. "available-tutoring" or "scheduled-mentoring".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category {
    pub role: Role,
    pub occupancy: Occupancy,
}

impl Category {
    pub fn available(role: Role) -> Self {
        Self { role, occupancy: Occupancy::Available }
    }

    pub fn scheduled(role: Role) -> Self {
        Self { role, occupancy: Occupancy::Scheduled }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Available(BTreeSet<Role>),
    Scheduled(BTreeSet<Role>),
}

impl CellState {
    pub fn is_combined(&self) -> bool {
        match self {
            CellState::Empty => false,
            CellState::Available(roles) | CellState::Scheduled(roles) => roles.len() > 1,
        }
    }

    /// Display priority; higher wins.
    pub fn rank(&self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Available(_) if self.is_combined() => 2,
            CellState::Available(_) => 1,
            CellState::Scheduled(_) if self.is_combined() => 4,
            CellState::Scheduled(_) => 3,
        }
    }

    /// Style key for the renderer, e.g. `scheduled-tutoring` or `available-combined`.
    pub fn label(&self) -> String {
        let (prefix, roles) = match self {
            CellState::Empty => return "empty".to_string(),
            CellState::Available(roles) => ("available", roles),
            CellState::Scheduled(roles) => ("scheduled", roles),
        };
        match roles.iter().next() {
            Some(role) if roles.len() == 1 => format!("{prefix}-{role}"),
            _ => format!("{prefix}-combined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub title: String,
    pub kind: Role,
}

/// What a click on a calendar day hands back to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySelection {
    pub date: NaiveDate,
    pub cell: CellState,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Default)]
struct DayMarks {
    available: BTreeSet<Role>,
    scheduled: BTreeSet<Role>,
}

#[derive(Debug, Default)]
pub struct CalendarIndex {
    days: HashMap<NaiveDate, DayMarks>,
    events: BTreeMap<NaiveDate, Vec<CalendarEvent>>,
}

impl CalendarIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark<I>(&mut self, category: Category, dates: I)
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        for date in dates {
            let marks = self.days.entry(date).or_default();
            match category.occupancy {
                Occupancy::Available => marks.available.insert(category.role),
                Occupancy::Scheduled => marks.scheduled.insert(category.role),
            };
        }
    }

    /// Marks every projected date of each slot as available for the slot's role.
    pub fn mark_availability(&mut self, slots: &[AvailabilitySlot], today: NaiveDate, horizon: Horizon) {
        for slot in slots {
            self.mark(Category::available(slot.role), project_dates(slot, today, horizon));
        }
    }

    pub fn add_event(&mut self, event: CalendarEvent) {
        let day = self.events.entry(event.date).or_default();
        let position = day.partition_point(|existing| existing.time <= event.time);
        day.insert(position, event);
    }

    pub fn cell(&self, date: NaiveDate) -> CellState {
        match self.days.get(&date) {
            Some(marks) if !marks.scheduled.is_empty() => CellState::Scheduled(marks.scheduled.clone()),
            Some(marks) if !marks.available.is_empty() => CellState::Available(marks.available.clone()),
            _ => CellState::Empty,
        }
    }

    /// Events on `date`, ordered by time.
    pub fn events_on(&self, date: NaiveDate) -> &[CalendarEvent] {
        self.events.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn select(&self, date: NaiveDate) -> DaySelection {
        DaySelection {
            date,
            cell: self.cell(date),
            events: self.events_on(date).to_vec(),
        }
    }
}

/// Week rows for a month, Sunday first. Days outside the month are `None`.
pub fn month_grid(year: i32, month: u32) -> Option<Vec<[Option<NaiveDate>; 7]>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut day = first;
    while day < next_month {
        let column = day.weekday().num_days_from_sunday() as usize;
        week[column] = Some(day);
        if column == 6 {
            weeks.push(week);
            week = [None; 7];
        }
        day += Duration::days(1);
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }
    Some(weeks)
}
