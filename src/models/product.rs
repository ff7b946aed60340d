use serde::{Deserialize, Serialize};

use crate::domain::product::Product as DomainProduct;
use crate::models::{RowError, format_cents, format_flag, parse_cents, parse_flag, required};

/// Row of `products.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    #[serde(rename = "Product Code")]
    pub code: String,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "Abbrev", default)]
    pub abbrev: String,
    #[serde(rename = "Product Group", default)]
    pub group: String,
    #[serde(rename = "CycleCode", default)]
    pub cycle_code: String,
    #[serde(rename = "Method", default)]
    pub method: String,
    #[serde(rename = "Account Group", default)]
    pub account_group: String,
    #[serde(rename = "Tax Profile", default)]
    pub tax_profile: String,
    #[serde(rename = "Tax Group", default)]
    pub tax_group: String,
    #[serde(rename = "Packaging", default)]
    pub packaging: String,
    #[serde(rename = "Unit of Measure", default)]
    pub unit_of_measure: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Stocked")]
    pub stocked: String,
    #[serde(rename = "UPC Code", default)]
    pub upc_code: String,
    #[serde(rename = "Min Price")]
    pub min_price: String,
    #[serde(rename = "Max Price")]
    pub max_price: String,
}

impl From<&DomainProduct> for ProductRow {
    fn from(value: &DomainProduct) -> Self {
        Self {
            code: value.code.clone(),
            name: value.name.clone(),
            abbrev: value.abbrev.clone(),
            group: value.group.clone(),
            cycle_code: value.cycle_code.clone(),
            method: value.method.clone(),
            account_group: value.account_group.clone(),
            tax_profile: value.tax_profile.clone(),
            tax_group: value.tax_group.clone(),
            packaging: value.packaging.clone(),
            unit_of_measure: value.unit_of_measure.clone(),
            status: format_flag(value.is_active, "Active", "Inactive"),
            stocked: format_flag(value.is_stocked, "Yes", "No"),
            upc_code: value.upc_code.clone(),
            min_price: format_cents(value.min_price_cents),
            max_price: format_cents(value.max_price_cents),
        }
    }
}

impl TryFrom<ProductRow> for DomainProduct {
    type Error = RowError;

    fn try_from(value: ProductRow) -> Result<Self, Self::Error> {
        let min_price_cents = parse_cents("Min Price", &value.min_price)?;
        let max_price_cents = parse_cents("Max Price", &value.max_price)?;
        if min_price_cents > max_price_cents {
            return Err(RowError::InvalidAmount {
                field: "Min Price",
                value: value.min_price,
            });
        }

        Ok(Self {
            code: required("Product Code", value.code)?,
            name: required("ProductName", value.name)?,
            abbrev: value.abbrev,
            group: value.group,
            cycle_code: value.cycle_code,
            method: value.method,
            account_group: value.account_group,
            tax_profile: value.tax_profile,
            tax_group: value.tax_group,
            packaging: value.packaging,
            unit_of_measure: value.unit_of_measure,
            is_active: parse_flag("Status", &value.status, "Active", "Inactive")?,
            is_stocked: parse_flag("Stocked", &value.stocked, "Yes", "No")?,
            upc_code: value.upc_code,
            min_price_cents,
            max_price_cents,
        })
    }
}
