use askama::Template;
use serde_json::json;

use super::links::REGISTRATIONS_PATH;
use crate::models::reports::{RegistrationsGraph, ReportRange};

#[derive(Clone, Debug, PartialEq)]
pub struct RangeOption {
    pub key: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "registrations.html")]
pub struct RegistrationsTemplate {
    pub label: String,
    pub ranges: Vec<RangeOption>,
    pub custom: bool,
    pub filter_from: String,
    pub filter_to: String,
    pub total: u64,
    pub action: &'static str,
    /// `[{"label": ..., "data": [[ts], [ts, n], ...]}]`, embedded in a script tag.
    pub series: String,
}

impl RegistrationsTemplate {
    pub fn new(graph: &RegistrationsGraph) -> Result<Self, serde_json::Error> {
        let current = ReportRange::parse(graph.dates.range);
        let series = serde_json::to_string(&json!([{
            "label": graph.label,
            "data": graph.points,
        }]))?;

        Ok(Self {
            label: graph.label.clone(),
            ranges: ReportRange::ALL
                .into_iter()
                .map(|range| RangeOption {
                    key: range.key(),
                    label: range.label(),
                    selected: range == current,
                })
                .collect(),
            custom: current == ReportRange::Other,
            filter_from: graph.dates.start.format("%Y-%m-%d").to_string(),
            filter_to: graph.dates.end.format("%Y-%m-%d").to_string(),
            total: graph.total(),
            action: REGISTRATIONS_PATH,
            // Keep the payload inert inside <script>.
            series: series.replace('<', "\\u003c"),
        })
    }
}
