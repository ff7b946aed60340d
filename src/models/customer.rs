use serde::{Deserialize, Serialize};

use crate::domain::customer::{Customer as DomainCustomer, CustomerSequence as DomainSequence};
use crate::models::{RowError, required};

/// Row of `customers.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRow {
    #[serde(rename = "CustomerID")]
    pub code: String,
    #[serde(rename = "CustomerName")]
    pub name: String,
    #[serde(rename = "Address", default)]
    pub address: String,
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Zip", default)]
    pub zip_code: String,
    #[serde(rename = "ContactName", default)]
    pub contact_name: String,
    #[serde(rename = "Phone", default)]
    pub phone: String,
    #[serde(rename = "Email", default)]
    pub email: String,
}

/// Row of `customer_sequences.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRow {
    #[serde(rename = "CustomerID")]
    pub customer_code: String,
    #[serde(rename = "SequenceID")]
    pub sequence_id: u32,
    #[serde(rename = "SequenceDesc", default)]
    pub description: String,
}

impl From<&DomainCustomer> for CustomerRow {
    fn from(value: &DomainCustomer) -> Self {
        Self {
            code: value.code.clone(),
            name: value.name.clone(),
            address: value.address.clone(),
            city: value.city.clone(),
            state: value.state.clone(),
            zip_code: value.zip_code.clone(),
            contact_name: value.contact_name.clone(),
            phone: value.phone.clone(),
            email: value.email.clone(),
        }
    }
}

/// Converts the customer without sequences; those are joined from their own file.
impl TryFrom<CustomerRow> for DomainCustomer {
    type Error = RowError;

    fn try_from(value: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            code: required("CustomerID", value.code)?,
            name: required("CustomerName", value.name)?,
            address: value.address,
            city: value.city,
            state: value.state,
            zip_code: value.zip_code,
            contact_name: value.contact_name,
            phone: value.phone,
            email: value.email,
            sequences: Vec::new(),
        })
    }
}

impl From<&DomainSequence> for SequenceRow {
    fn from(value: &DomainSequence) -> Self {
        Self {
            customer_code: value.customer_code.clone(),
            sequence_id: value.sequence_id,
            description: value.description.clone(),
        }
    }
}

impl TryFrom<SequenceRow> for DomainSequence {
    type Error = RowError;

    fn try_from(value: SequenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            customer_code: required("CustomerID", value.customer_code)?,
            sequence_id: value.sequence_id,
            description: value.description,
        })
    }
}
