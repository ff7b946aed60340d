use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Possible lifecycle states of a generated order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Order has been delivered and invoiced.
    Completed,
    /// Order is currently being delivered.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Order has been received but not scheduled yet.
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "Completed",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Pending => "Pending",
        }
    }

    /// Only completed orders carry invoice details.
    pub fn is_invoiced(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Completed
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown order status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status `{0}`")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Completed" => Ok(OrderStatus::Completed),
            "In Progress" => Ok(OrderStatus::InProgress),
            "Pending" => Ok(OrderStatus::Pending),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// Domain representation of a fuel delivery order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    /// Unique order number, e.g. `ORD-202403-0007`.
    pub number: String,
    pub customer_code: String,
    pub customer_name: String,
    /// Delivery sequence of the customer the order ships to.
    pub sequence_id: u32,
    pub sequence_description: String,
    /// Whether the customer requires a purchase order reference.
    pub po_required: bool,
    pub po_number: Option<String>,
    pub date: NaiveDate,
    pub status: OrderStatus,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    /// Bill of lading reference.
    pub bol: String,
    /// Line items, numbered from 1.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of all line totals in cents.
    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(|item| item.total_cents).sum()
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// A single product line of an order with its derived financial fields.
///
/// The derived fields are recomputed by every builder method so that
/// `total = unit_price * quantity + charges + special_charges + total_taxes - exempt_taxes`
/// always holds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderItem {
    pub line: u32,
    pub product_code: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    /// Delivered quantity in the product's unit of measure (gallons).
    pub quantity: u32,
    /// Name of the standard charge applied to the line, if any.
    pub charge_item: Option<String>,
    pub charges_cents: Option<i64>,
    pub special_charges_cents: Option<i64>,
    pub total_taxes_cents: i64,
    pub exempt_taxes_cents: i64,
    pub total_cents: i64,
    pub total_cost_cents: i64,
    /// `(total - total_cost) / quantity` in dollars, rounded to three decimals.
    pub margin_per_gallon: f64,
}

impl OrderItem {
    /// Build a line item without charges, taxes or cost.
    pub fn new(
        line: u32,
        product_code: impl Into<String>,
        product_name: impl Into<String>,
        unit_price_cents: i64,
        quantity: u32,
    ) -> Self {
        let mut item = Self {
            line,
            product_code: product_code.into(),
            product_name: product_name.into(),
            unit_price_cents,
            quantity,
            charge_item: None,
            charges_cents: None,
            special_charges_cents: None,
            total_taxes_cents: 0,
            exempt_taxes_cents: 0,
            total_cents: 0,
            total_cost_cents: 0,
            margin_per_gallon: 0.0,
        };
        item.recalculate();
        item
    }

    /// Attach a named standard charge.
    pub fn with_charge(mut self, charge_item: impl Into<String>, charges_cents: i64) -> Self {
        self.charge_item = Some(charge_item.into());
        self.charges_cents = Some(charges_cents);
        self.recalculate();
        self
    }

    pub fn with_special_charges(mut self, special_charges_cents: i64) -> Self {
        self.special_charges_cents = Some(special_charges_cents);
        self.recalculate();
        self
    }

    /// Set the taxes charged and the exempted share of them.
    pub fn with_taxes(mut self, total_taxes_cents: i64, exempt_taxes_cents: i64) -> Self {
        self.total_taxes_cents = total_taxes_cents;
        self.exempt_taxes_cents = exempt_taxes_cents;
        self.recalculate();
        self
    }

    pub fn with_total_cost(mut self, total_cost_cents: i64) -> Self {
        self.total_cost_cents = total_cost_cents;
        self.recalculate();
        self
    }

    /// Unit price times quantity in cents.
    pub fn extended_price_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }

    /// Whether the stored total and margin match the pricing identity.
    pub fn totals_consistent(&self) -> bool {
        self.total_cents == self.expected_total_cents()
            && (self.margin_per_gallon - self.expected_margin()).abs() < 1e-9
    }

    fn expected_total_cents(&self) -> i64 {
        self.extended_price_cents()
            + self.charges_cents.unwrap_or(0)
            + self.special_charges_cents.unwrap_or(0)
            + self.total_taxes_cents
            - self.exempt_taxes_cents
    }

    fn expected_margin(&self) -> f64 {
        if self.quantity == 0 {
            return 0.0;
        }
        let margin_cents = (self.total_cents - self.total_cost_cents) as f64;
        let per_gallon = margin_cents / 100.0 / f64::from(self.quantity);
        (per_gallon * 1000.0).round() / 1000.0
    }

    fn recalculate(&mut self) {
        self.total_cents = self.expected_total_cents();
        self.margin_per_gallon = self.expected_margin();
    }
}
