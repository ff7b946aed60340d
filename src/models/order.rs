use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::order::{Order as DomainOrder, OrderItem as DomainOrderItem, OrderStatus};
use crate::models::{
    RowError, RowResult, format_cents, format_date, format_flag, non_empty, parse_cents,
    parse_date, parse_flag, parse_optional_cents, parse_optional_date, required,
};

/// Row of an orders file: one line item with its order-level columns repeated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRow {
    #[serde(rename = "CustomerID")]
    pub customer_code: String,
    #[serde(rename = "CustomerName")]
    pub customer_name: String,
    #[serde(rename = "Order#")]
    pub order_number: String,
    #[serde(rename = "Line")]
    pub line: u32,
    #[serde(rename = "Seq")]
    pub sequence_id: u32,
    #[serde(rename = "Seq Desc")]
    pub sequence_description: String,
    #[serde(rename = "PO #")]
    pub po_number: String,
    #[serde(rename = "PO Req")]
    pub po_required: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Invoice#")]
    pub invoice_number: String,
    #[serde(rename = "Invoice Date")]
    pub invoice_date: String,
    #[serde(rename = "BOL")]
    pub bol: String,
    #[serde(rename = "Product Code")]
    pub product_code: String,
    #[serde(rename = "Product")]
    pub product_name: String,
    #[serde(rename = "Unit Price")]
    pub unit_price: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Charge Item")]
    pub charge_item: String,
    #[serde(rename = "Charges")]
    pub charges: String,
    #[serde(rename = "Special Charges")]
    pub special_charges: String,
    #[serde(rename = "Total Taxes")]
    pub total_taxes: String,
    #[serde(rename = "Total")]
    pub total: String,
    #[serde(rename = "Exempt Taxes")]
    pub exempt_taxes: String,
    #[serde(rename = "Total Cost")]
    pub total_cost: String,
    #[serde(rename = "Margin Per Gallon")]
    pub margin_per_gallon: f64,
}

impl OrderRow {
    fn new(order: &DomainOrder, item: &DomainOrderItem) -> Self {
        Self {
            customer_code: order.customer_code.clone(),
            customer_name: order.customer_name.clone(),
            order_number: order.number.clone(),
            line: item.line,
            sequence_id: order.sequence_id,
            sequence_description: order.sequence_description.clone(),
            po_number: order.po_number.clone().unwrap_or_default(),
            po_required: format_flag(order.po_required, "Yes", "No"),
            date: format_date(order.date),
            status: order.status.to_string(),
            invoice_number: order.invoice_number.clone().unwrap_or_default(),
            invoice_date: order.invoice_date.map(format_date).unwrap_or_default(),
            bol: order.bol.clone(),
            product_code: item.product_code.clone(),
            product_name: item.product_name.clone(),
            unit_price: format_cents(item.unit_price_cents),
            quantity: item.quantity,
            charge_item: item.charge_item.clone().unwrap_or_default(),
            charges: item.charges_cents.map(format_cents).unwrap_or_default(),
            special_charges: item
                .special_charges_cents
                .map(format_cents)
                .unwrap_or_default(),
            total_taxes: format_cents(item.total_taxes_cents),
            total: format_cents(item.total_cents),
            exempt_taxes: format_cents(item.exempt_taxes_cents),
            total_cost: format_cents(item.total_cost_cents),
            margin_per_gallon: item.margin_per_gallon,
        }
    }

    /// Order-level columns, used to check that rows of one order agree.
    fn header_key(&self) -> [&str; 10] {
        [
            self.customer_code.as_str(),
            self.customer_name.as_str(),
            self.sequence_description.as_str(),
            self.po_number.as_str(),
            self.po_required.as_str(),
            self.date.as_str(),
            self.status.as_str(),
            self.invoice_number.as_str(),
            self.invoice_date.as_str(),
            self.bol.as_str(),
        ]
    }

    fn into_order_header(self) -> RowResult<DomainOrder> {
        Ok(DomainOrder {
            number: required("Order#", self.order_number)?,
            customer_code: required("CustomerID", self.customer_code)?,
            customer_name: self.customer_name,
            sequence_id: self.sequence_id,
            sequence_description: self.sequence_description,
            po_required: parse_flag("PO Req", &self.po_required, "Yes", "No")?,
            po_number: non_empty(self.po_number),
            date: parse_date("Date", &self.date)?,
            status: self.status.parse::<OrderStatus>()?,
            invoice_number: non_empty(self.invoice_number),
            invoice_date: parse_optional_date("Invoice Date", &self.invoice_date)?,
            bol: self.bol,
            items: Vec::new(),
        })
    }

    fn to_item(&self) -> RowResult<DomainOrderItem> {
        Ok(DomainOrderItem {
            line: self.line,
            product_code: required("Product Code", self.product_code.clone())?,
            product_name: self.product_name.clone(),
            unit_price_cents: parse_cents("Unit Price", &self.unit_price)?,
            quantity: self.quantity,
            charge_item: non_empty(self.charge_item.clone()),
            charges_cents: parse_optional_cents("Charges", &self.charges)?,
            special_charges_cents: parse_optional_cents("Special Charges", &self.special_charges)?,
            total_taxes_cents: parse_cents("Total Taxes", &self.total_taxes)?,
            exempt_taxes_cents: parse_cents("Exempt Taxes", &self.exempt_taxes)?,
            total_cents: parse_cents("Total", &self.total)?,
            total_cost_cents: parse_cents("Total Cost", &self.total_cost)?,
            margin_per_gallon: self.margin_per_gallon,
        })
    }
}

/// Flatten orders into one row per line item.
pub fn rows_from_orders(orders: &[DomainOrder]) -> Vec<OrderRow> {
    orders
        .iter()
        .flat_map(|order| order.items.iter().map(move |item| OrderRow::new(order, item)))
        .collect()
}

/// Group rows back into orders, keeping the order in which numbers first appear.
///
/// On failure the error carries the zero-based index of the offending row.
pub fn orders_from_rows(rows: Vec<OrderRow>) -> Result<Vec<DomainOrder>, (usize, RowError)> {
    let mut orders: Vec<DomainOrder> = Vec::new();
    let mut first_rows: Vec<OrderRow> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, row) in rows.into_iter().enumerate() {
        let item = row.to_item().map_err(|err| (index, err))?;

        match positions.get(&row.order_number) {
            Some(&position) => {
                if first_rows[position].header_key() != row.header_key()
                    || first_rows[position].sequence_id != row.sequence_id
                {
                    return Err((
                        index,
                        RowError::ConflictingOrderRows {
                            number: row.order_number,
                        },
                    ));
                }
                orders[position].items.push(item);
            }
            None => {
                let mut order = row.clone().into_order_header().map_err(|err| (index, err))?;
                order.items.push(item);
                positions.insert(order.number.clone(), orders.len());
                orders.push(order);
                first_rows.push(row);
            }
        }
    }

    Ok(orders)
}
