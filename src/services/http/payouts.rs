use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::{call, error_page, render, sanitize_key, AppState};
use crate::models::payouts::{PayoutOrderBy, SortOrder};
use crate::services::payouts::{PayoutListRequest, PayoutRequest};
use crate::services::screen_options::ScreenOptionsRequest;
use crate::services::ServiceError;
use crate::views::links::PAYOUTS_PATH;
use crate::views::payout::PayoutTemplate;
use crate::views::payouts::PayoutsTemplate;

/// Query string of the payouts admin page. Every field is optional and
/// taken as text so malformed values degrade instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PayoutsParams {
    pub action: Option<String>,
    pub action2: Option<String>,
    pub status: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
    pub paged: Option<String>,
    pub payout_id: Option<String>,
}

impl PayoutsParams {
    /// The bottom bulk selector wins over the top one; `-1` means "no action".
    pub fn current_action(&self) -> Option<String> {
        [&self.action2, &self.action]
            .into_iter()
            .flatten()
            .map(|action| sanitize_key(action))
            .find(|action| !action.is_empty() && action != "-1")
    }

    pub fn payout_id(&self) -> Option<i64> {
        self.payout_id
            .as_deref()
            .and_then(|id| id.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
    }

    pub fn list_request(&self, per_page: u64) -> PayoutListRequest {
        PayoutListRequest {
            status: self.status.as_deref().map(sanitize_key).unwrap_or_default(),
            orderby: PayoutOrderBy::parse(&sanitize_key(self.orderby.as_deref().unwrap_or(""))),
            order: SortOrder::parse(self.order.as_deref().unwrap_or("")),
            page: self
                .paged
                .as_deref()
                .and_then(|paged| paged.trim().parse::<u64>().ok())
                .unwrap_or(1)
                .max(1),
            per_page,
        }
    }
}

pub async fn payouts_page(
    State(state): State<AppState>,
    Query(params): Query<PayoutsParams>,
) -> Response {
    match params.current_action().as_deref() {
        Some("view_payout") => payout_details(&state, params.payout_id()).await,
        Some("retry_payment") => match params.payout_id() {
            Some(payout_id) => retry_payment(&state, &params, payout_id).await,
            // The bulk form posts `payout_id[]`, which is accepted and ignored.
            None => payouts_list(&state, &params, None).await,
        },
        _ => payouts_list(&state, &params, None).await,
    }
}

async fn payouts_list(state: &AppState, params: &PayoutsParams, notice: Option<String>) -> Response {
    let user_id = state.admin_user_id;
    let per_page = match call(&state.screen_options_channel, |response| {
        ScreenOptionsRequest::GetPerPage { user_id, response }
    })
    .await
    {
        Ok(per_page) => per_page,
        Err(e) => return error_page(e),
    };

    let request = params.list_request(per_page);
    let page = match call(&state.payout_channel, |response| PayoutRequest::ListPage {
        request: request.clone(),
        response,
    })
    .await
    {
        Ok(page) => page,
        Err(e) => return error_page(e),
    };

    render(PayoutsTemplate::new(&page, &request, &state.format, notice))
}

async fn payout_details(state: &AppState, payout_id: Option<i64>) -> Response {
    let Some(payout_id) = payout_id else {
        return error_page(ServiceError::NotFound(
            "A valid payout ID is required.".to_string(),
        ));
    };

    match call(&state.payout_channel, |response| PayoutRequest::GetDetails {
        payout_id,
        response,
    })
    .await
    {
        Ok(details) => render(PayoutTemplate::new(&details, &state.format)),
        Err(e) => error_page(e),
    }
}

async fn retry_payment(state: &AppState, params: &PayoutsParams, payout_id: i64) -> Response {
    let result = call(&state.payout_channel, |response| PayoutRequest::RetryPayment {
        payout_id,
        response,
    })
    .await;

    let notice = match result {
        Ok(payout) => format!(
            "Payout #{} has been retried. New status: {}.",
            payout.payout_id, payout.status
        ),
        Err(ServiceError::NotFound(message)) => {
            return error_page(ServiceError::NotFound(message))
        }
        Err(ServiceError::InvalidInput(message)) => message,
        Err(e) => {
            log::warn!("Retrying payout {} failed: {}", payout_id, e);
            format!("Payout #{} could not be retried.", payout_id)
        }
    };

    payouts_list(state, params, Some(notice)).await
}

#[derive(Debug, Deserialize)]
pub struct ScreenOptionsForm {
    pub option: String,
    pub value: String,
}

pub async fn save_screen_options(
    State(state): State<AppState>,
    Form(form): Form<ScreenOptionsForm>,
) -> Response {
    let user_id = state.admin_user_id;

    match call(&state.screen_options_channel, |response| ScreenOptionsRequest::Save {
        user_id,
        option: form.option,
        value: form.value,
        response,
    })
    .await
    {
        Ok(_) => Redirect::to(PAYOUTS_PATH).into_response(),
        Err(e) => error_page(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use super::*;
    use crate::repositories::memory::{self, MemoryStore};
    use crate::services::http::tests::test_server;

    fn params(pairs: &[(&str, &str)]) -> PayoutsParams {
        let mut params = PayoutsParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "action" => params.action = value,
                "action2" => params.action2 = value,
                "status" => params.status = value,
                "orderby" => params.orderby = value,
                "order" => params.order = value,
                "paged" => params.paged = value,
                "payout_id" => params.payout_id = value,
                _ => {}
            }
        }
        params
    }

    async fn store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_payouts(vec![
                    memory::payout(1, 1, 100, "paid"),
                    memory::payout(2, 2, 250, "failed"),
                    memory::payout(3, 1, 75, "paid"),
                ])
                .await
                .with_affiliates(vec![memory::affiliate(
                    1,
                    "Ada",
                    memory::datetime(2026, 1, 5, 10, 0),
                )])
                .await
                .with_gateway_status("paid")
                .await,
        )
    }

    #[test]
    fn test_action_resolution() {
        assert_eq!(
            params(&[("action", "view_payout"), ("action2", "retry_payment")]).current_action(),
            Some("retry_payment".to_string())
        );
        assert_eq!(
            params(&[("action", "view_payout"), ("action2", "-1")]).current_action(),
            Some("view_payout".to_string())
        );
        assert_eq!(params(&[("action", "-1"), ("action2", "-1")]).current_action(), None);
        assert_eq!(params(&[]).current_action(), None);
    }

    #[test]
    fn test_list_request_defaults() {
        let request = params(&[("paged", "0"), ("orderby", "bogus")]).list_request(30);
        assert_eq!(request.page, 1);
        assert_eq!(request.orderby, PayoutOrderBy::PayoutId);
        assert_eq!(request.order, SortOrder::Desc);

        let request = params(&[("paged", "3"), ("orderby", "amount"), ("order", "ASC")])
            .list_request(10);
        assert_eq!(request.page, 3);
        assert_eq!(request.orderby, PayoutOrderBy::Amount);
        assert_eq!(request.order, SortOrder::Asc);
    }

    #[tokio::test]
    async fn test_list_renders_counts_and_rows() {
        let server = test_server(store().await);

        let response = server.get("/admin/payouts").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("All <span class=\"count\">(3)</span>"));
        assert!(html.contains("Paid <span class=\"count\">(2)</span>"));
        assert!(html.contains("Failed <span class=\"count\">(1)</span>"));
        assert!(html.contains("$250.00"));
        assert!(html.contains("Ada"));
        assert!(html.contains("(user deleted)"));
    }

    #[tokio::test]
    async fn test_list_respects_saved_page_size() {
        let server = test_server(store().await);

        server
            .post("/admin/screen-options")
            .form(&[("option", "affwp_edit_payouts_per_page"), ("value", "2")])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let html = server.get("/admin/payouts").await.text();
        assert!(html.contains("1 of 2"));
        assert!(html.contains("value=\"2\""));
    }

    #[tokio::test]
    async fn test_screen_options_rejects_bad_value() {
        let server = test_server(store().await);

        server
            .post("/admin/screen-options")
            .form(&[("option", "affwp_edit_payouts_per_page"), ("value", "0")])
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_list_message() {
        let server = test_server(Arc::new(MemoryStore::new()));

        let html = server.get("/admin/payouts").await.text();

        assert!(html.contains("No payouts found."));
    }

    #[tokio::test]
    async fn test_view_payout_and_missing_payout() {
        let server = test_server(store().await);

        let response = server
            .get("/admin/payouts")
            .add_query_param("action", "view_payout")
            .add_query_param("payout_id", "1")
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("Payout: #1"));

        server
            .get("/admin/payouts")
            .add_query_param("action", "view_payout")
            .add_query_param("payout_id", "99")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        server
            .get("/admin/payouts")
            .add_query_param("action", "view_payout")
            .add_query_param("payout_id", "abc")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_retry_payment_row_action() {
        let store = store().await;
        let server = test_server(store.clone());

        let response = server
            .get("/admin/payouts")
            .add_query_param("action", "retry_payment")
            .add_query_param("payout_id", "2")
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Payout #2 has been retried."));
        assert_eq!(store.retried().await, vec![2]);
        assert_eq!(store.payouts().await[1].status, "paid");
    }

    #[tokio::test]
    async fn test_retry_payment_of_paid_payout_shows_notice() {
        let store = store().await;
        let server = test_server(store.clone());

        let response = server
            .get("/admin/payouts")
            .add_query_param("action", "retry_payment")
            .add_query_param("payout_id", "1")
            .await;

        response.assert_status_ok();
        assert!(response
            .text()
            .contains("Payout #1 has not failed and cannot be retried."));
        assert!(store.retried().await.is_empty());
        assert_eq!(store.payouts().await[0].status, "paid");
    }

    #[tokio::test]
    async fn test_page_beyond_range_renders_empty_list() {
        let server = test_server(store().await);

        let response = server
            .get("/admin/payouts")
            .add_query_param("paged", "18446744073709551615")
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("No payouts found."));
    }

    #[tokio::test]
    async fn test_bulk_retry_is_a_no_op() {
        let store = store().await;
        let server = test_server(store.clone());

        let response = server
            .get("/admin/payouts")
            .add_query_param("action", "-1")
            .add_query_param("action2", "retry_payment")
            .add_query_param("payout_id[]", "2")
            .await;

        response.assert_status_ok();
        assert!(store.retried().await.is_empty());
    }
}
