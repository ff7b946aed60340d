use rand::Rng;
use serde::{Deserialize, Serialize};

/// Domain representation of a petroleum product offered to customers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Product {
    /// Unique product code, e.g. `REG001`.
    pub code: String,
    /// Human-readable name of the product.
    pub name: String,
    /// Short abbreviation printed on tickets.
    pub abbrev: String,
    /// Product group, for example `Fuel`.
    pub group: String,
    pub cycle_code: String,
    /// Delivery method, for example `Direct`.
    pub method: String,
    pub account_group: String,
    pub tax_profile: String,
    pub tax_group: String,
    pub packaging: String,
    /// Unit the quantity and unit price refer to.
    pub unit_of_measure: String,
    /// Whether the product can currently be sold.
    pub is_active: bool,
    /// Whether the product is stocked in inventory.
    pub is_stocked: bool,
    pub upc_code: String,
    /// Lowest unit price in cents drawn for order items.
    pub min_price_cents: i64,
    /// Highest unit price in cents drawn for order items.
    pub max_price_cents: i64,
}

impl Product {
    /// Build an active, stocked bulk product with the supplied identity and price range.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        min_price_cents: i64,
        max_price_cents: i64,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            abbrev: String::new(),
            group: "Fuel".to_string(),
            cycle_code: String::new(),
            method: "Direct".to_string(),
            account_group: String::new(),
            tax_profile: String::new(),
            tax_group: String::new(),
            packaging: "Bulk".to_string(),
            unit_of_measure: "Gallon".to_string(),
            is_active: true,
            is_stocked: true,
            upc_code: String::new(),
            min_price_cents: min_price_cents.min(max_price_cents),
            max_price_cents: max_price_cents.max(min_price_cents),
        }
    }

    /// Attach a UPC code to the product.
    pub fn with_upc_code(mut self, upc_code: impl Into<String>) -> Self {
        self.upc_code = upc_code.into();
        self
    }

    /// Draw a unit price in cents from the product's configured range.
    pub fn random_price_cents<G: Rng + ?Sized>(&self, rng: &mut G) -> i64 {
        let low = self.min_price_cents.min(self.max_price_cents);
        let high = self.max_price_cents.max(self.min_price_cents);
        rng.gen_range(low..=high)
    }
}
