use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::affiliates::{Affiliate, AffiliateQuery};
use crate::models::reports::{GraphPoint, RegistrationsGraph, ReportDates, ReportWindow};
use crate::repositories::AffiliateRepository;

pub const REGISTRATIONS_LABEL: &str = "Affiliate Registrations";

pub enum ReportRequest {
    Registrations {
        dates: ReportDates,
        response: oneshot::Sender<Result<RegistrationsGraph, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct ReportRequestHandler {
    affiliates: Arc<dyn AffiliateRepository>,
}

impl ReportRequestHandler {
    pub fn new(affiliates: Arc<dyn AffiliateRepository>) -> Self {
        Self { affiliates }
    }

    pub async fn registrations_graph(
        &self,
        dates: &ReportDates,
    ) -> Result<RegistrationsGraph, ServiceError> {
        let start = dates.window_start();
        let end = dates.window_end().ok_or_else(|| {
            ServiceError::Internal(format!("Invalid report end date: {}.", dates.end))
        })?;

        let affiliates = self
            .affiliates
            .get_affiliates(&AffiliateQuery {
                registered_after: Some(start),
                registered_before: Some(end),
            })
            .await
            .map_err(|e| ServiceError::Repository("Affiliates".to_string(), e.to_string()))?;

        log::debug!(
            "Plotting {} registrations between {} and {}.",
            affiliates.len(),
            start,
            end
        );

        Ok(RegistrationsGraph {
            label: REGISTRATIONS_LABEL.to_string(),
            dates: ReportWindow {
                range: dates.range.key(),
                start: dates.start,
                end: dates.end,
            },
            points: registration_points(
                &affiliates,
                dates.range.is_single_day(),
                start.and_utc().timestamp_millis(),
                end.and_utc().timestamp_millis(),
            ),
        })
    }
}

/// Builds the series for a window: a start marker, the data points, and an end
/// marker. Single-day windows get one point per registration; longer windows
/// get one point per calendar day holding that day's total.
pub fn registration_points(
    affiliates: &[Affiliate],
    single_day: bool,
    start_ms: i64,
    end_ms: i64,
) -> Vec<GraphPoint> {
    let mut points = vec![GraphPoint::Marker(start_ms)];

    if single_day {
        points.extend(
            affiliates
                .iter()
                .map(|a| GraphPoint::Count(a.date_registered.and_utc().timestamp_millis(), 1)),
        );
    } else {
        let mut days = BTreeMap::new();
        for affiliate in affiliates {
            *days.entry(affiliate.date_registered.date()).or_insert(0u64) += 1;
        }

        points.extend(days.into_iter().map(|(day, count)| {
            GraphPoint::Count(day.and_time(NaiveTime::MIN).and_utc().timestamp_millis(), count)
        }));
    }

    points.push(GraphPoint::Marker(end_ms));
    points
}

#[async_trait]
impl RequestHandler<ReportRequest> for ReportRequestHandler {
    async fn handle_request(&self, request: ReportRequest) {
        match request {
            ReportRequest::Registrations { dates, response } => {
                let graph = self.registrations_graph(&dates).await;
                let _ = response.send(graph);
            }
        }
    }
}

pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Service<ReportRequest, ReportRequestHandler> for ReportService {}
