use serde::{Deserialize, Serialize};

/// Domain representation of a customer buying fuel deliveries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    /// Unique customer code, e.g. `CUST0001`.
    pub code: String,
    /// Company name printed on orders.
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    /// Delivery locations belonging to the customer.
    pub sequences: Vec<CustomerSequence>,
}

/// Delivery (ship-to) location of a customer, keyed by customer code and sequence id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerSequence {
    pub customer_code: String,
    /// Sequence number, unique per customer and starting at 1.
    pub sequence_id: u32,
    /// Free-form label such as `Tank 2`.
    pub description: String,
}

impl Customer {
    /// Build a customer with no contact details and no sequences yet.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            contact_name: String::new(),
            phone: String::new(),
            email: String::new(),
            sequences: Vec::new(),
        }
    }

    /// Append a delivery sequence, numbered after the existing ones.
    pub fn add_sequence(&mut self, description: impl Into<String>) -> &CustomerSequence {
        let sequence_id = self
            .sequences
            .iter()
            .map(|seq| seq.sequence_id)
            .max()
            .unwrap_or(0)
            + 1;
        self.sequences.push(CustomerSequence {
            customer_code: self.code.clone(),
            sequence_id,
            description: description.into(),
        });
        &self.sequences[self.sequences.len() - 1]
    }

    pub fn has_sequences(&self) -> bool {
        !self.sequences.is_empty()
    }

    pub fn sequence(&self, sequence_id: u32) -> Option<&CustomerSequence> {
        self.sequences
            .iter()
            .find(|seq| seq.sequence_id == sequence_id)
    }
}

/// Numeric suffix of a code such as `CUST0042`, if it carries `prefix`.
pub fn code_serial(code: &str, prefix: &str) -> Option<u32> {
    code.strip_prefix(prefix)?.parse().ok()
}
