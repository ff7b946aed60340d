pub mod customer;
pub mod order;
pub mod period;
pub mod product;

/// How existing reference data (products, customers, sequences) is treated by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceMode {
    /// Synthesize a fresh set and overwrite the stored files.
    RegenerateAll,
    /// Load stored records and only synthesize what is missing.
    #[default]
    ReuseExisting,
}

impl ReferenceMode {
    pub fn from_force_new(force_new: bool) -> Self {
        if force_new {
            ReferenceMode::RegenerateAll
        } else {
            ReferenceMode::ReuseExisting
        }
    }
}
