//! The calendar screen and its controller.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BlackbookResult;
use crate::model::{EventLike, EventTypeBo, SingleEventBo, single_event_bo};
use crate::navigation::{Redirects, View, ViewChangeEvent};
use crate::service::SingleEventService;

pub const CALENDAR_VIEW: &str = "calendar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalendarViewMode {
    Month,
    Week,
}

impl fmt::Display for CalendarViewMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CalendarViewMode::Month => write!(f, "MONTH"),
            CalendarViewMode::Week => write!(f, "WEEK"),
        }
    }
}

impl FromStr for CalendarViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONTH" => Ok(CalendarViewMode::Month),
            "WEEK" => Ok(CalendarViewMode::Week),
            other => Err(format!("unknown calendar view mode '{other}'")),
        }
    }
}

impl CalendarViewMode {
    /// First and last day shown for a calendar opened on `day`. Weeks
    /// start on Monday.
    pub fn range(self, day: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            CalendarViewMode::Week => {
                let monday = day - Days::new(u64::from(day.weekday().num_days_from_monday()));
                (monday, monday + Days::new(6))
            }
            CalendarViewMode::Month => {
                let first = day.with_day(1).unwrap_or(day);
                let last = first
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(first);
                (first, last)
            }
        }
    }
}

/// The navigation state showing `mode` around `date`, relative to the
/// calendar view itself.
pub fn calendar_state(mode: CalendarViewMode, date: DateTime<Utc>) -> String {
    format!(
        "../{CALENDAR_VIEW}&view={mode}&date={}",
        date.timestamp_millis()
    )
}

pub struct CalendarController {
    events: Arc<SingleEventService>,
    lookback_days: u32,
}

impl CalendarController {
    pub fn new(events: Arc<SingleEventService>, lookback_days: u32) -> Self {
        CalendarController {
            events,
            lookback_days,
        }
    }

    /// Events between `from` and `to`, starting the search a few days
    /// early so events running over midnight are not missed.
    pub fn events(&self, from: NaiveDate, to: NaiveDate) -> BlackbookResult<Vec<SingleEventBo>> {
        let from = from - Days::new(u64::from(self.lookback_days));
        self.events.find_between(from, to)
    }

    /// An unsaved event of `event_type` spanning `start..end`.
    pub fn new_event(
        &self,
        event_type: Option<EventTypeBo>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> BlackbookResult<SingleEventBo> {
        let mut event = single_event_bo(|e| e.parent = event_type);
        event.set_start(start);
        event.set_end(end)?;
        Ok(event)
    }

    pub fn save(&self, event: &SingleEventBo) -> BlackbookResult<SingleEventBo> {
        self.events.save(event)
    }

    /// Move the event so it starts at `start`, keeping its length.
    pub fn move_start(
        &self,
        event: &mut SingleEventBo,
        start: NaiveDateTime,
    ) -> BlackbookResult<SingleEventBo> {
        event.set_start(start);
        self.events.save(event)
    }

    pub fn move_end(&self, event: &mut SingleEventBo, end: NaiveDateTime) -> BlackbookResult<SingleEventBo> {
        event.set_end(end)?;
        self.events.save(event)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub id: String,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl From<&SingleEventBo> for CalendarItem {
    fn from(event: &SingleEventBo) -> Self {
        CalendarItem {
            id: event.id.clone(),
            caption: event.title().map(str::to_string),
            description: event.comment().map(str::to_string),
            start: event.start(),
            end: event.end(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarScreen {
    pub mode: Option<CalendarViewMode>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub items: Vec<CalendarItem>,
    /// Why `items` could not be loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shows the month or week given by its `view` and `date` (epoch
/// milliseconds) parameters.
pub struct CalendarView {
    controller: CalendarController,
    screen: CalendarScreen,
}

impl CalendarView {
    pub fn new(controller: CalendarController) -> Self {
        CalendarView {
            controller,
            screen: CalendarScreen::default(),
        }
    }

    pub fn screen(&self) -> &CalendarScreen {
        &self.screen
    }

    fn requested(event: &ViewChangeEvent) -> Option<(CalendarViewMode, NaiveDate)> {
        let parameters = event.parameter_map();
        let millis: i64 = parameters.get("date")?.parse().ok()?;
        let mode = parameters.get("view")?.parse().ok()?;
        let date = DateTime::from_timestamp_millis(millis)?.date_naive();
        Some((mode, date))
    }

    fn show(&mut self, mode: CalendarViewMode, date: NaiveDate) -> BlackbookResult<()> {
        let (from, to) = mode.range(date);
        let events = self.controller.events(from, to)?;
        self.screen = CalendarScreen {
            mode: Some(mode),
            from: Some(from),
            to: Some(to),
            items: events.iter().map(CalendarItem::from).collect(),
            error: None,
        };
        Ok(())
    }
}

impl View for CalendarView {
    fn enter(&mut self, event: &ViewChangeEvent, redirects: &mut Redirects) {
        let Some((mode, date)) = Self::requested(event) else {
            debug!(parameters = %event.parameters, "calendar opened without a valid range");
            redirects.navigate_to(calendar_state(CalendarViewMode::Month, Utc::now()));
            return;
        };

        if let Err(e) = self.show(mode, date) {
            warn!(error = %e, "could not load calendar events");
            let (from, to) = mode.range(date);
            self.screen = CalendarScreen {
                mode: Some(mode),
                from: Some(from),
                to: Some(to),
                items: Vec::new(),
                error: Some(e.to_string()),
            };
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(&self.screen).unwrap_or_default()
    }
}
