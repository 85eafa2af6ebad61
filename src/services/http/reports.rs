use axum::{
    extract::{Query, State},
    response::Response,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::{call, error_page, render, AppState};
use crate::models::reports::{ReportDates, ReportRange};
use crate::services::reports::ReportRequest;
use crate::services::ServiceError;
use crate::views::registrations::RegistrationsTemplate;

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub range: Option<String>,
    pub filter_from: Option<String>,
    pub filter_to: Option<String>,
}

impl ReportParams {
    pub fn dates(&self, today: NaiveDate) -> Option<ReportDates> {
        let range = ReportRange::parse(self.range.as_deref().unwrap_or_default());

        ReportDates::resolve(
            range,
            parse_date(self.filter_from.as_deref()),
            parse_date(self.filter_to.as_deref()),
            today,
        )
    }
}

/// `YYYY-MM-DD`, anything else is treated as missing.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
}

pub async fn registrations_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Response {
    let Some(dates) = params.dates(Utc::now().date_naive()) else {
        return error_page(ServiceError::InvalidInput(
            "Could not resolve the report date range.".to_string(),
        ));
    };

    let graph = match call(&state.report_channel, |response| {
        ReportRequest::Registrations { dates, response }
    })
    .await
    {
        Ok(graph) => graph,
        Err(e) => return error_page(e),
    };

    match RegistrationsTemplate::new(&graph) {
        Ok(template) => render(template),
        Err(e) => error_page(ServiceError::Internal(format!(
            "Failed to serialize graph data: {}",
            e
        ))),
    }
}
