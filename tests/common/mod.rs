//! Helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fuel_orders_gen::domain::customer::Customer;
use fuel_orders_gen::domain::order::{Order, OrderItem, OrderStatus};
use fuel_orders_gen::domain::product::Product;
use fuel_orders_gen::repository::CsvRepository;
use tempfile::TempDir;

/// Temporary data directory used in integration tests, removed on drop.
pub struct TestDataDir {
    dir: TempDir,
}

impl TestDataDir {
    pub fn new() -> Self {
        TestDataDir {
            dir: TempDir::new().expect("Failed to create temporary data directory."),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repository(&self) -> CsvRepository {
        CsvRepository::new(self.dir.path())
    }

    /// Write `content` to `relative` below the data directory.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory.");
        }
        std::fs::write(&path, content).expect("Failed to write test file.");
        path
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn product(code: &str, name: &str) -> Product {
    Product::new(code, name, 289, 412).with_upc_code("012345678905")
}

pub fn customer(code: &str, sequences: &[&str]) -> Customer {
    let mut customer = Customer::new(code, format!("{code} Fuel Co"));
    customer.city = "Tulsa".to_string();
    customer.state = "OK".to_string();
    customer.zip_code = "74103".to_string();
    for description in sequences {
        customer.add_sequence(*description);
    }
    customer
}

/// A completed two-line order dated `day`.
pub fn order(number: &str, customer: &Customer, day: NaiveDate) -> Order {
    let sequence = &customer.sequences[0];
    Order {
        number: number.to_string(),
        customer_code: customer.code.clone(),
        customer_name: customer.name.clone(),
        sequence_id: sequence.sequence_id,
        sequence_description: sequence.description.clone(),
        po_required: true,
        po_number: Some(number.replace("ORD", "PO")),
        date: day,
        status: OrderStatus::Completed,
        invoice_number: Some(number.replace("ORD", "INV")),
        invoice_date: day.succ_opt(),
        bol: number.replace("ORD", "BOL"),
        items: vec![
            OrderItem::new(1, "REG001", "Regular Gasoline", 325, 1000)
                .with_charge("Pump Fee", 4500)
                .with_special_charges(1234)
                .with_taxes(2275, 500)
                .with_total_cost(276_250),
            OrderItem::new(2, "DSL001", "Diesel", 389, 450)
                .with_taxes(1400, 0)
                .with_total_cost(148_787),
        ],
    }
}
