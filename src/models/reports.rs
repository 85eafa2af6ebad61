use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, SerializeSeq, Serializer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportRange {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    #[default]
    ThisMonth,
    LastMonth,
    ThisQuarter,
    LastQuarter,
    ThisYear,
    LastYear,
    Other,
}

impl ReportRange {
    pub const ALL: [ReportRange; 11] = [
        ReportRange::Today,
        ReportRange::Yesterday,
        ReportRange::ThisWeek,
        ReportRange::LastWeek,
        ReportRange::ThisMonth,
        ReportRange::LastMonth,
        ReportRange::ThisQuarter,
        ReportRange::LastQuarter,
        ReportRange::ThisYear,
        ReportRange::LastYear,
        ReportRange::Other,
    ];

    /// Unknown keys fall back to the current month.
    pub fn parse(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|range| range.key() == key)
            .unwrap_or_default()
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "this_week",
            Self::LastWeek => "last_week",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::ThisQuarter => "this_quarter",
            Self::LastQuarter => "last_quarter",
            Self::ThisYear => "this_year",
            Self::LastYear => "last_year",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::LastWeek => "Last Week",
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::ThisQuarter => "This Quarter",
            Self::LastQuarter => "Last Quarter",
            Self::ThisYear => "This Year",
            Self::LastYear => "Last Year",
            Self::Other => "Custom",
        }
    }

    /// Single-day ranges plot one point per registration instead of daily totals.
    pub fn is_single_day(&self) -> bool {
        matches!(self, Self::Today | Self::Yesterday)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportDates {
    pub range: ReportRange,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportDates {
    /// Resolves a range relative to `today`. Custom ranges use `from`/`to`,
    /// defaulting to the start of the month and `today`.
    pub fn resolve(
        range: ReportRange,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Option<Self> {
        let month_start = today.with_day(1)?;
        let week_start = today.checked_sub_days(Days::new(
            today.weekday().num_days_from_monday() as u64,
        ))?;
        let quarter_start =
            NaiveDate::from_ymd_opt(today.year(), (today.month0() / 3) * 3 + 1, 1)?;

        let (start, end) = match range {
            ReportRange::Today => (today, today),
            ReportRange::Yesterday => {
                let yesterday = today.pred_opt()?;
                (yesterday, yesterday)
            }
            ReportRange::ThisWeek => (week_start, week_start.checked_add_days(Days::new(6))?),
            ReportRange::LastWeek => {
                (week_start.checked_sub_days(Days::new(7))?, week_start.pred_opt()?)
            }
            ReportRange::ThisMonth => (month_start, last_day(month_start, 1)?),
            ReportRange::LastMonth => (
                month_start.checked_sub_months(Months::new(1))?,
                month_start.pred_opt()?,
            ),
            ReportRange::ThisQuarter => (quarter_start, last_day(quarter_start, 3)?),
            ReportRange::LastQuarter => (
                quarter_start.checked_sub_months(Months::new(3))?,
                quarter_start.pred_opt()?,
            ),
            ReportRange::ThisYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year(), 12, 31)?,
            ),
            ReportRange::LastYear => (
                NaiveDate::from_ymd_opt(today.year() - 1, 1, 1)?,
                NaiveDate::from_ymd_opt(today.year() - 1, 12, 31)?,
            ),
            ReportRange::Other => {
                let start = from.unwrap_or(month_start);
                let end = to.unwrap_or(today);
                if start <= end {
                    (start, end)
                } else {
                    (end, start)
                }
            }
        };

        Some(Self { range, start, end })
    }

    pub fn window_start(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    pub fn window_end(&self) -> Option<NaiveDateTime> {
        NaiveTime::from_hms_opt(23, 59, 59).map(|time| self.end.and_time(time))
    }
}

fn last_day(first: NaiveDate, months: u32) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(months))?.pred_opt()
}

/// A chart point in the `[timestamp_ms]` / `[timestamp_ms, count]` shape
/// consumed by the admin charts. Markers pin the axis to the report window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphPoint {
    Marker(i64),
    Count(i64, u64),
}

impl GraphPoint {
    pub fn timestamp_ms(&self) -> i64 {
        match self {
            Self::Marker(ts) | Self::Count(ts, _) => *ts,
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Marker(_) => None,
            Self::Count(_, count) => Some(*count),
        }
    }
}

impl Serialize for GraphPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Marker(ts) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(ts)?;
                seq.end()
            }
            Self::Count(ts, count) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(ts)?;
                seq.serialize_element(count)?;
                seq.end()
            }
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct RegistrationsGraph {
    pub label: String,
    pub dates: ReportWindow,
    pub points: Vec<GraphPoint>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct ReportWindow {
    pub range: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RegistrationsGraph {
    pub fn total(&self) -> u64 {
        self.points.iter().filter_map(GraphPoint::count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolve(range: ReportRange, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let dates = ReportDates::resolve(range, None, None, today).unwrap();
        (dates.start, dates.end)
    }

    #[test]
    fn test_parse_defaults_to_this_month() {
        assert_eq!(ReportRange::parse("yesterday"), ReportRange::Yesterday);
        assert_eq!(ReportRange::parse("last_quarter"), ReportRange::LastQuarter);
        assert_eq!(ReportRange::parse("bogus"), ReportRange::ThisMonth);
    }

    #[test]
    fn test_resolve_ranges() {
        // A Friday.
        let today = date(2026, 10, 16);

        assert_eq!(resolve(ReportRange::Today, today), (today, today));
        assert_eq!(
            resolve(ReportRange::Yesterday, today),
            (date(2026, 10, 15), date(2026, 10, 15))
        );
        assert_eq!(
            resolve(ReportRange::ThisWeek, today),
            (date(2026, 10, 12), date(2026, 10, 18))
        );
        assert_eq!(
            resolve(ReportRange::LastWeek, today),
            (date(2026, 10, 5), date(2026, 10, 11))
        );
        assert_eq!(
            resolve(ReportRange::ThisMonth, today),
            (date(2026, 10, 1), date(2026, 10, 31))
        );
        assert_eq!(
            resolve(ReportRange::LastMonth, today),
            (date(2026, 9, 1), date(2026, 9, 30))
        );
        assert_eq!(
            resolve(ReportRange::ThisQuarter, today),
            (date(2026, 10, 1), date(2026, 12, 31))
        );
        assert_eq!(
            resolve(ReportRange::LastQuarter, today),
            (date(2026, 7, 1), date(2026, 9, 30))
        );
        assert_eq!(
            resolve(ReportRange::LastYear, today),
            (date(2025, 1, 1), date(2025, 12, 31))
        );
    }

    #[test]
    fn test_custom_range_swaps_reversed_bounds() {
        let dates = ReportDates::resolve(
            ReportRange::Other,
            Some(date(2026, 3, 10)),
            Some(date(2026, 3, 1)),
            date(2026, 10, 16),
        )
        .unwrap();

        assert_eq!(dates.start, date(2026, 3, 1));
        assert_eq!(dates.end, date(2026, 3, 10));
    }

    #[test]
    fn test_window_covers_whole_days() {
        let dates = ReportDates::resolve(ReportRange::Today, None, None, date(2026, 2, 28)).unwrap();

        assert_eq!(dates.window_start().to_string(), "2026-02-28 00:00:00");
        assert_eq!(dates.window_end().unwrap().to_string(), "2026-02-28 23:59:59");
    }

    #[test]
    fn test_graph_point_serializes_as_arrays() {
        let points = vec![GraphPoint::Marker(1000), GraphPoint::Count(2000, 3)];
        assert_eq!(serde_json::to_string(&points).unwrap(), "[[1000],[2000,3]]");
    }
}
