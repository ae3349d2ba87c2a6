use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use super::format::{format_money, format_timestamp};
use crate::clients::OrderClient;
use crate::context::AdminContext;
use crate::domain::{order_total, Money, Order, OrderStatus};
use crate::order_actor::{OrderError, OrderQuery, SortOrder};

/// One line of the order table.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub id: String,
    pub code: String,
    pub customer: String,
    pub total: Money,
    pub status: String,
    pub status_label: &'static str,
    pub created_at: Option<DateTime<Utc>>,
    pub payment_tag: &'static str,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            code: order.display_code(),
            customer: order.customer_name().to_string(),
            total: order_total(order),
            status: order.status.clone(),
            status_label: order.status_label(),
            created_at: order.created_at,
            payment_tag: order.payment_method.tag(),
        }
    }
}

/// Order list screen: filter, sort and the rows from the last successful fetch.
pub struct OrderListView {
    client: OrderClient,
    ctx: AdminContext,
    query: OrderQuery,
    rows: Vec<OrderRow>,
}

impl OrderListView {
    pub fn new(client: OrderClient, ctx: AdminContext) -> Self {
        Self {
            client,
            ctx,
            query: OrderQuery::default(),
            rows: Vec::new(),
        }
    }

    pub fn set_status_filter(&mut self, status: Option<OrderStatus>) {
        self.query.status = status;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.sort = sort;
    }

    pub fn query(&self) -> &OrderQuery {
        &self.query
    }

    pub fn rows(&self) -> &[OrderRow] {
        &self.rows
    }

    /// Re-fetches the list. On failure the previous rows stay and the operator is alerted.
    #[instrument(skip(self), fields(query = ?self.query))]
    pub async fn refresh(&mut self) -> Result<&[OrderRow], OrderError> {
        if !self.ctx.session().is_authenticated() {
            self.ctx.alert_error("You are not signed in.");
            return Err(OrderError::Unauthenticated);
        }
        match self.client.list_orders(self.query.clone()).await {
            Ok(orders) => {
                self.rows = orders.iter().map(OrderRow::from).collect();
                Ok(&self.rows)
            }
            Err(e) => {
                warn!(error = %e, "Could not load orders");
                self.ctx.alert_error("Could not load orders.");
                Err(e)
            }
        }
    }

    pub fn render(&self, currency: &str) -> String {
        if self.rows.is_empty() {
            return "No orders.\n".to_string();
        }
        let mut out = format!(
            "{:<14} {:<24} {:>18} {:<22} {:<17} {}\n",
            "CODE", "CUSTOMER", "TOTAL", "STATUS", "CREATED", "PAYMENT"
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{:<14} {:<24} {:>18} {:<22} {:<17} {}\n",
                row.code,
                row.customer,
                format_money(row.total, currency),
                row.status_label,
                format_timestamp(row.created_at),
                row.payment_tag
            ));
        }
        out
    }
}
