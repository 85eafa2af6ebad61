use askama::Template;

use super::format::DisplayFormat;
use super::links::{self, PAYOUTS_PATH, SCREEN_OPTIONS_PATH};
use super::{referral_links, AffiliateLink, Link};
use crate::models::payouts::{PayoutOrderBy, PayoutStatus, SortOrder};
use crate::services::payouts::{PayoutListRequest, PayoutPage, PayoutRow};
use crate::services::screen_options::{self, ScreenOption, PAYOUTS_SCREEN_ID};

pub const NO_ITEMS_MESSAGE: &str = "No payouts found.";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulkAction {
    pub key: &'static str,
    pub label: &'static str,
}

/// Bulk actions offered above and below the table. Submitting them does nothing yet.
pub const BULK_ACTIONS: [BulkAction; 1] = [BulkAction {
    key: "retry_payment",
    label: "Retry Payment",
}];

#[derive(Clone, Debug, PartialEq)]
pub struct StatusView {
    pub key: &'static str,
    pub label: &'static str,
    pub count: u64,
    pub url: String,
    pub current: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnHeader {
    pub key: &'static str,
    pub label: &'static str,
    /// Present on sortable columns.
    pub url: Option<String>,
    /// `asc`/`desc` on the column currently sorted.
    pub sorted: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PayoutRowView {
    pub payout_id: i64,
    pub amount: String,
    pub affiliate: Option<AffiliateLink>,
    pub referrals: Vec<Link>,
    pub payout_method: String,
    pub status: String,
    pub status_label: String,
    pub date: String,
    pub actions: Vec<Link>,
}

impl PayoutRowView {
    pub fn new(row: &PayoutRow, format: &DisplayFormat) -> Self {
        let payout = &row.payout;

        Self {
            payout_id: payout.payout_id,
            amount: format.currency(payout.amount),
            affiliate: row.affiliate.as_ref().map(AffiliateLink::from_summary),
            referrals: referral_links(&payout.referrals),
            payout_method: payout.payout_method.clone(),
            status: payout.status.to_ascii_lowercase(),
            status_label: PayoutStatus::label(&payout.status),
            date: format.date(payout.date),
            actions: row_actions(row),
        }
    }
}

/// "View" always, "Retry Payment" only for failed payouts.
pub fn row_actions(row: &PayoutRow) -> Vec<Link> {
    let payout_id = row.payout.payout_id;
    let mut actions = vec![Link {
        url: links::view_payout_url(payout_id),
        label: "View".to_string(),
    }];

    if row.payout.is_failed() {
        actions.push(Link {
            url: links::retry_payout_url(payout_id),
            label: "Retry Payment".to_string(),
        });
    }

    actions
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pagination {
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub first: Option<String>,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

#[derive(Template)]
#[template(path = "payouts.html")]
pub struct PayoutsTemplate {
    pub notice: Option<String>,
    pub views: Vec<StatusView>,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<PayoutRowView>,
    pub bulk_actions: Vec<BulkAction>,
    pub pagination: Pagination,
    pub no_items: &'static str,
    pub screen_options_url: &'static str,
    pub screen_option: Option<ScreenOption>,
    pub per_page: u64,
    pub status: String,
    pub orderby: &'static str,
    pub order: String,
}

impl PayoutsTemplate {
    pub fn new(
        page: &PayoutPage,
        request: &PayoutListRequest,
        format: &DisplayFormat,
        notice: Option<String>,
    ) -> Self {
        Self {
            notice,
            views: status_views(page, request),
            columns: column_headers(request),
            rows: page
                .rows
                .iter()
                .map(|row| PayoutRowView::new(row, format))
                .collect(),
            bulk_actions: BULK_ACTIONS.to_vec(),
            pagination: pagination(page, request),
            no_items: NO_ITEMS_MESSAGE,
            screen_options_url: SCREEN_OPTIONS_PATH,
            screen_option: screen_options::register(PAYOUTS_SCREEN_ID),
            per_page: page.per_page,
            status: request.status.clone(),
            orderby: request.orderby.key(),
            order: request.order.to_string(),
        }
    }
}

pub fn status_views(page: &PayoutPage, request: &PayoutListRequest) -> Vec<StatusView> {
    let current = request.status_filter().map(str::to_ascii_lowercase);

    [
        ("all", "All", page.counts.total),
        (PayoutStatus::PAID, "Paid", page.counts.paid),
        (PayoutStatus::FAILED, "Failed", page.counts.failed),
    ]
    .into_iter()
    .map(|(key, label, count)| {
        let url = if key == "all" {
            PAYOUTS_PATH.to_string()
        } else {
            links::admin_url(PAYOUTS_PATH, &[("status", key.to_string())])
        };

        StatusView {
            key,
            label,
            count,
            url,
            current: match &current {
                Some(status) => status == key,
                None => key == "all",
            },
        }
    })
    .collect()
}

pub fn column_headers(request: &PayoutListRequest) -> Vec<ColumnHeader> {
    let sortable = |key: &'static str, label: &'static str, orderby: PayoutOrderBy| {
        let active = request.orderby == orderby;
        // First click sorts ascending, clicking the active column flips it.
        let order = if active {
            request.order.reversed()
        } else {
            SortOrder::Asc
        };

        ColumnHeader {
            key,
            label,
            url: Some(links::admin_url(
                PAYOUTS_PATH,
                &[
                    ("status", request.status.clone()),
                    ("orderby", orderby.key().to_string()),
                    ("order", order.to_string()),
                ],
            )),
            sorted: active.then(|| request.order.to_string()),
        }
    };
    let fixed = |key: &'static str, label: &'static str| ColumnHeader {
        key,
        label,
        url: None,
        sorted: None,
    };

    vec![
        sortable("payout_id", "Payout ID", PayoutOrderBy::PayoutId),
        sortable("amount", "Amount", PayoutOrderBy::Amount),
        sortable("affiliate", "Affiliate", PayoutOrderBy::Affiliate),
        fixed("referrals", "Referrals"),
        sortable("payout_method", "Payout Method", PayoutOrderBy::PayoutMethod),
        sortable("status", "Status", PayoutOrderBy::Status),
        sortable("date", "Date", PayoutOrderBy::Date),
        fixed("actions", "Actions"),
    ]
}

pub fn pagination(page: &PayoutPage, request: &PayoutListRequest) -> Pagination {
    let page_url = |paged: u64| {
        links::admin_url(
            PAYOUTS_PATH,
            &[
                ("status", request.status.clone()),
                ("orderby", request.orderby.key().to_string()),
                ("order", request.order.to_string()),
                ("paged", paged.to_string()),
            ],
        )
    };
    let has_previous = page.page > 1;
    let has_next = page.page < page.total_pages;

    Pagination {
        page: page.page,
        total_pages: page.total_pages.max(1),
        total_items: page.total_items,
        first: has_previous.then(|| page_url(1)),
        previous: has_previous.then(|| page_url(page.page - 1)),
        next: has_next.then(|| page_url(page.page + 1)),
        last: has_next.then(|| page_url(page.total_pages)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payouts::PayoutCounts;
    use crate::repositories::memory;
    use crate::services::payouts::AffiliateSummary;
    use crate::settings::Currency;

    fn format() -> DisplayFormat {
        DisplayFormat::new(Currency::default(), "%B %-d, %Y".to_string())
    }

    fn request(status: &str, orderby: PayoutOrderBy, order: SortOrder) -> PayoutListRequest {
        PayoutListRequest {
            status: status.to_string(),
            orderby,
            order,
            page: 1,
            per_page: 30,
        }
    }

    fn page(rows: Vec<PayoutRow>, page: u64, total_pages: u64) -> PayoutPage {
        PayoutPage {
            rows,
            counts: PayoutCounts::new(4, 2),
            total_items: 6,
            total_pages,
            page,
            per_page: 30,
        }
    }

    fn row(status: &str, affiliate: Option<&str>) -> PayoutRow {
        PayoutRow {
            payout: memory::payout(7, 3, 1250, status),
            affiliate: affiliate.map(|name| AffiliateSummary {
                affiliate_id: 3,
                name: name.to_string(),
            }),
        }
    }

    #[test]
    fn test_retry_action_only_for_failed() {
        let labels = |status: &str| -> Vec<String> {
            row_actions(&row(status, None))
                .into_iter()
                .map(|link| link.label)
                .collect()
        };

        assert_eq!(labels("failed"), vec!["View", "Retry Payment"]);
        assert_eq!(labels("FAILED"), vec!["View", "Retry Payment"]);
        assert_eq!(labels("paid"), vec!["View"]);
        assert_eq!(labels("pending"), vec!["View"]);
    }

    #[test]
    fn test_row_cells() {
        let view = PayoutRowView::new(&row("processing", Some("Ada")), &format());

        assert_eq!(view.amount, "$1,250.00");
        assert_eq!(view.status_label, "Processing");
        assert_eq!(view.referrals.len(), 2);
        assert_eq!(view.referrals[0].label, "70");
        assert_eq!(view.affiliate.unwrap().name, "Ada");
    }

    #[test]
    fn test_status_views_mark_current() {
        let views = status_views(
            &page(vec![], 1, 1),
            &request("", PayoutOrderBy::PayoutId, SortOrder::Desc),
        );
        let counts: Vec<u64> = views.iter().map(|v| v.count).collect();
        assert_eq!(counts, vec![6, 4, 2]);
        assert!(views[0].current);

        let views = status_views(
            &page(vec![], 1, 1),
            &request("failed", PayoutOrderBy::PayoutId, SortOrder::Desc),
        );
        assert!(!views[0].current);
        assert!(views[2].current);
        assert_eq!(views[2].url, "/admin/payouts?status=failed");
    }

    #[test]
    fn test_sort_links_toggle_active_column() {
        let columns = column_headers(&request("paid", PayoutOrderBy::Amount, SortOrder::Asc));

        let amount = columns.iter().find(|c| c.key == "amount").unwrap();
        assert_eq!(amount.sorted.as_deref(), Some("asc"));
        assert_eq!(
            amount.url.as_deref(),
            Some("/admin/payouts?status=paid&orderby=amount&order=desc")
        );

        let date = columns.iter().find(|c| c.key == "date").unwrap();
        assert!(date.sorted.is_none());
        assert!(date.url.as_deref().unwrap().ends_with("order=asc"));

        assert!(columns.iter().find(|c| c.key == "referrals").unwrap().url.is_none());
    }

    #[test]
    fn test_pagination_links() {
        let request = request("", PayoutOrderBy::PayoutId, SortOrder::Desc);

        let first = pagination(&page(vec![], 1, 3), &request);
        assert!(first.previous.is_none());
        assert!(first.next.as_deref().unwrap().ends_with("paged=2"));

        let last = pagination(&page(vec![], 3, 3), &request);
        assert!(last.next.is_none());
        assert!(last.first.as_deref().unwrap().ends_with("paged=1"));
    }

    #[test]
    fn test_render_empty_and_filled() {
        let request = request("", PayoutOrderBy::PayoutId, SortOrder::Desc);

        let empty = PayoutsTemplate::new(&page(vec![], 1, 0), &request, &format(), None)
            .render()
            .unwrap();
        assert!(empty.contains(NO_ITEMS_MESSAGE));
        assert!(empty.contains("All <span class=\"count\">(6)</span>"));

        let filled = PayoutsTemplate::new(
            &page(vec![row("failed", None)], 1, 1),
            &request,
            &format(),
            Some("Payout #7 retried.".to_string()),
        )
        .render()
        .unwrap();
        assert!(!filled.contains(NO_ITEMS_MESSAGE));
        assert!(filled.contains("(user deleted)"));
        assert!(filled.contains("Retry Payment"));
        assert!(filled.contains("Payout #7 retried."));
        assert!(filled.contains("$1,250.00"));
    }
}
