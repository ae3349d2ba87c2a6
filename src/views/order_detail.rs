use tracing::{instrument, warn};

use super::format::{format_money, format_timestamp};
use crate::clients::OrderClient;
use crate::context::{AdminContext, Route};
use crate::domain::{order_total, LineItem, Money, Order, OrderStatus};
use crate::order_actor::OrderError;

/// One product line of the detail screen.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRow {
    pub name: String,
    pub variants: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub amount: Money,
}

impl From<&LineItem> for LineRow {
    fn from(item: &LineItem) -> Self {
        let variants: Vec<String> = [
            item.size.as_deref().map(|size| format!("Size: {}", size)),
            item.color.as_deref().map(|color| format!("Color: {}", color)),
        ]
        .into_iter()
        .flatten()
        .collect();
        Self {
            name: item.display_name().to_string(),
            variants: (!variants.is_empty()).then(|| variants.join(", ")),
            unit_price: item.price,
            quantity: item.quantity,
            amount: item.line_total(),
        }
    }
}

/// Money section of the detail screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<LineRow>,
    pub item_count: usize,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            lines: order.items().iter().map(LineRow::from).collect(),
            item_count: order.items().len(),
            subtotal: order.subtotal(),
            shipping_fee: order.shipping_fee(),
            total: order_total(order),
        }
    }
}

/// Order detail screen for one order id.
///
/// Failed loads send the operator back to the order list. Failed changes leave
/// the displayed order as it was.
pub struct OrderDetailView {
    client: OrderClient,
    ctx: AdminContext,
    order_id: String,
    order: Option<Order>,
    selected: String,
}

impl OrderDetailView {
    pub fn new(client: OrderClient, ctx: AdminContext, order_id: impl Into<String>) -> Self {
        Self {
            client,
            ctx,
            order_id: order_id.into(),
            order: None,
            selected: String::new(),
        }
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    #[instrument(skip(self), fields(order_id = %self.order_id))]
    pub async fn load(&mut self) -> Result<&Order, OrderError> {
        if !self.ctx.session().is_authenticated() {
            self.ctx.alert_error("You are not signed in.");
            return Err(OrderError::Unauthenticated);
        }
        match self.client.get_order(self.order_id.clone()).await {
            Ok(order) => {
                self.selected.clear();
                Ok(&*self.order.insert(order))
            }
            Err(e) => {
                warn!(error = %e, "Could not load order");
                self.order = None;
                let message = match e {
                    OrderError::NotFound(_) => "Order not found.",
                    _ => "Could not load the order.",
                };
                self.ctx.alert_error(message);
                self.ctx.navigate(Route::OrderList);
                Err(e)
            }
        }
    }

    /// Next statuses with their labels, for the status picker.
    pub fn status_options(&self) -> Vec<(OrderStatus, &'static str)> {
        self.order
            .as_ref()
            .map(|order| {
                self.client
                    .status_options(order)
                    .into_iter()
                    .map(|status| (status, status.label()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn select_status(&mut self, status: impl Into<String>) {
        self.selected = status.into();
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Whether the submit control is enabled: something picked and different from the current status.
    pub fn can_submit(&self) -> bool {
        let selected = self.selected.trim();
        match &self.order {
            Some(order) => !selected.is_empty() && selected != order.status,
            None => false,
        }
    }

    /// Submits the selected status through the generic update.
    #[instrument(skip(self), fields(order_id = %self.order_id, selected = %self.selected))]
    pub async fn submit_status(&mut self) -> Result<&Order, OrderError> {
        let order = self
            .order
            .as_ref()
            .ok_or_else(|| OrderError::NotFound(self.order_id.clone()))?;
        match self.client.update_status(order, &self.selected).await {
            Ok(updated) => {
                self.selected.clear();
                self.ctx.alert_info("Status updated.");
                self.ctx.statistics_changed();
                Ok(&*self.order.insert(updated))
            }
            Err(e @ OrderError::Validation(_)) => Err(e),
            Err(e) => {
                self.alert_change_failure(&e, "Status update failed.");
                Err(e)
            }
        }
    }

    /// Quick action for pending orders. Returns `Ok(false)` if the operator declines.
    #[instrument(skip(self), fields(order_id = %self.order_id))]
    pub async fn confirm_order(&mut self) -> Result<bool, OrderError> {
        let order = self
            .order
            .as_ref()
            .ok_or_else(|| OrderError::NotFound(self.order_id.clone()))?;
        let Some(confirmed) = self.ctx.confirm("Confirm this order?") else {
            return Ok(false);
        };
        match self.client.confirm_order(order, confirmed).await {
            Ok(updated) => {
                self.order = Some(updated);
                self.ctx.alert_info("Order confirmed.");
                self.ctx.statistics_changed();
                Ok(true)
            }
            Err(e @ OrderError::Validation(_)) => Err(e),
            Err(e) => {
                self.alert_change_failure(&e, "Confirming the order failed.");
                Err(e)
            }
        }
    }

    /// Cancels the order after an explicit confirmation. Returns `Ok(false)` if the operator declines.
    #[instrument(skip(self), fields(order_id = %self.order_id))]
    pub async fn cancel(&mut self) -> Result<bool, OrderError> {
        let Some(confirmed) = self
            .ctx
            .confirm("Cancel this order? This cannot be undone.")
        else {
            return Ok(false);
        };
        match self.client.cancel_order(self.order_id.clone(), confirmed).await {
            Ok(updated) => {
                self.order = Some(updated);
                self.ctx.statistics_changed();
                self.ctx.alert_info("Order cancelled.");
                Ok(true)
            }
            Err(e) => {
                self.alert_change_failure(&e, "Cancelling the order failed.");
                Err(e)
            }
        }
    }

    fn alert_change_failure(&self, err: &OrderError, message: &str) {
        warn!(error = %err, "Change not applied");
        match err {
            OrderError::Busy(_) => self.ctx.alert_info("Another change is still in progress."),
            _ => self.ctx.alert_error(message),
        }
    }

    pub fn summary(&self) -> Option<OrderSummary> {
        self.order.as_ref().map(OrderSummary::from)
    }

    pub fn render(&self, currency: &str) -> Option<String> {
        let order = self.order.as_ref()?;
        let summary = OrderSummary::from(order);
        let mut out = String::new();

        out.push_str(&format!("Order      {}\n", order.display_code()));
        match &order.customer {
            Some(customer) => out.push_str(&format!(
                "Customer   {} ({})\n",
                order.customer_name(),
                customer.email.as_deref().unwrap_or("-")
            )),
            None => out.push_str(&format!("Customer   {}\n", order.customer_name())),
        }
        out.push_str(&format!("Created    {}\n", format_timestamp(order.created_at)));
        out.push_str(&format!("Status     {}\n", order.status_label()));
        out.push_str(&format!("Payment    {}\n", order.payment_method.describe()));

        if let Some(address) = &order.address {
            out.push_str("\nShip to\n");
            out.push_str(&format!("  {} ({})\n", address.full_name, address.phone_number));
            out.push_str(&format!("  {}\n", address.one_line()));
        }

        out.push_str("\nItems\n");
        for line in &summary.lines {
            out.push_str(&format!(
                "  {:<32} {:>16} x{:<4} {:>18}\n",
                line.name,
                format_money(line.unit_price, currency),
                line.quantity,
                format_money(line.amount, currency)
            ));
            if let Some(variants) = &line.variants {
                out.push_str(&format!("    {}\n", variants));
            }
        }

        out.push_str(&format!(
            "\nSubtotal ({} items) {:>20}\n",
            summary.item_count,
            format_money(summary.subtotal, currency)
        ));
        out.push_str(&format!("Shipping {:>30}\n", format_money(summary.shipping_fee, currency)));
        out.push_str(&format!("Total    {:>30}\n", format_money(summary.total, currency)));

        let options = self.status_options();
        if !options.is_empty() {
            out.push_str("\nNext status\n");
            for (status, label) in options {
                out.push_str(&format!("  {:<18} {}\n", status.as_str(), label));
            }
        }
        Some(out)
    }
}
