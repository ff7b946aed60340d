use std::path::PathBuf;

use fuel_orders_gen::domain::period::YearMonth;
use fuel_orders_gen::repository::{
    CustomerReader, CustomerWriter, OrderFile, OrderReader, OrderWriter, ProductReader,
    ProductWriter, RepositoryError,
};

mod common;

use common::{TestDataDir, customer, date, order, product};

#[test]
fn test_missing_files_read_as_empty() {
    let data = TestDataDir::new();
    let repo = data.repository();

    assert!(repo.list_products().unwrap().is_empty());
    assert!(repo.list_customers().unwrap().is_empty());
    let march = YearMonth::new(2024, 3).unwrap();
    assert!(repo.list_orders(&OrderFile::Monthly(march)).unwrap().is_empty());
}

#[test]
fn test_product_repository_round_trip_and_append() {
    let data = TestDataDir::new();
    let repo = data.repository();
    let regular = product("REG001", "Regular Gasoline");
    let diesel = product("DSL001", "Diesel");

    assert_eq!(repo.replace_products(&[regular.clone(), diesel.clone()]).unwrap(), 2);
    assert!(repo.products_file().exists());
    assert_eq!(repo.list_products().unwrap(), vec![regular.clone(), diesel.clone()]);

    let kerosene = product("KRS001", "Kerosene");
    assert_eq!(repo.append_products(&[diesel.clone(), kerosene.clone()]).unwrap(), 1);
    assert_eq!(
        repo.list_products().unwrap(),
        vec![regular.clone(), diesel.clone(), kerosene]
    );

    let content = std::fs::read_to_string(repo.products_file()).unwrap();
    assert_eq!(content.matches("Product Code").count(), 1);
    assert!(content.contains("2.89"));

    assert_eq!(repo.replace_products(&[diesel.clone()]).unwrap(), 1);
    assert_eq!(repo.list_products().unwrap(), vec![diesel]);
}

#[test]
fn test_customer_repository_joins_sequences() {
    let data = TestDataDir::new();
    let repo = data.repository();
    let first = customer("CUST0001", &["Tank 1", "Station 2"]);
    let second = customer("CUST0002", &["Warehouse 1"]);

    assert_eq!(repo.replace_customers(&[first.clone(), second.clone()]).unwrap(), 2);
    assert!(repo.sequences_file().exists());

    let stored = repo.list_customers().unwrap();
    assert_eq!(stored, vec![first.clone(), second.clone()]);
    assert_eq!(stored[0].sequences.len(), 2);
    assert_eq!(stored[0].sequences[1].sequence_id, 2);

    let third = customer("CUST0003", &["Facility 1"]);
    assert_eq!(repo.append_customers(&[second, third.clone()]).unwrap(), 1);
    let stored = repo.list_customers().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[2], third);
}

#[test]
fn test_customer_repository_skips_orphan_sequences() {
    let data = TestDataDir::new();
    let repo = data.repository();
    data.write_file(
        "csv_data/customers/customers.csv",
        "CustomerID,CustomerName,Address,City,State,Zip,ContactName,Phone,Email\n\
         CUST0001,Acme Fuel,1 Main St,Tulsa,OK,74103,Jo Doe,555-0100,jo@example.com\n\
         CUST0002,Quiet Corp,,,,,,,\n",
    );
    data.write_file(
        "csv_data/customers/customer_sequences.csv",
        "CustomerID,SequenceID,SequenceDesc\n\
         CUST0001,1,Tank 1\n\
         CUST0001,1,Tank 1 again\n\
         CUST0009,1,Nowhere 1\n",
    );

    let stored = repo.list_customers().unwrap();

    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].sequences.len(), 1);
    assert_eq!(stored[0].sequences[0].description, "Tank 1");
    assert!(stored[1].sequences.is_empty());
}

#[test]
fn test_product_repository_skips_duplicate_codes() {
    let data = TestDataDir::new();
    let repo = data.repository();
    data.write_file(
        "csv_data/products/products.csv",
        "Product Code,ProductName,Status,Stocked,Min Price,Max Price\n\
         REG001,Regular Gasoline,Active,Yes,2.50,3.50\n\
         REG001,Regular Gasoline copy,Active,Yes,2.60,3.60\n\
         DSL001,Diesel,Active,Yes,2.90,3.90\n",
    );

    let stored = repo.list_products().unwrap();

    let codes: Vec<&str> = stored.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["REG001", "DSL001"]);
    assert_eq!(stored[0].name, "Regular Gasoline");
}

#[test]
fn test_order_repository_round_trip() {
    let data = TestDataDir::new();
    let repo = data.repository();
    let buyer = customer("CUST0001", &["Tank 1"]);
    let march = YearMonth::new(2024, 3).unwrap();
    let file = OrderFile::Monthly(march);
    let first = order("ORD-202403-0001", &buyer, date(2024, 3, 4));
    let second = order("ORD-202403-0002", &buyer, date(2024, 3, 18));

    assert_eq!(repo.append_orders(&file, &[first.clone()]).unwrap(), 1);
    assert_eq!(
        repo.append_orders(&file, &[first.clone(), second.clone()]).unwrap(),
        1
    );

    let path = repo.order_file_path(&file);
    assert!(path.ends_with("csv_data/orders/orders_2024_03.csv"));
    let content = std::fs::read_to_string(&path).unwrap();
    // One header plus one row per line item.
    assert_eq!(content.lines().count(), 5);
    assert!(content.contains("03/04/2024"));
    assert!(content.contains("Margin Per Gallon"));

    let stored = repo.list_orders(&file).unwrap();
    assert_eq!(stored, vec![first.clone(), second]);
    assert!(stored.iter().flat_map(|o| &o.items).all(|i| i.totals_consistent()));

    assert_eq!(repo.replace_orders(&file, &[first.clone()]).unwrap(), 1);
    assert_eq!(repo.list_orders(&file).unwrap(), vec![first]);
}

#[test]
fn test_custom_order_file_is_created_with_parents() {
    let data = TestDataDir::new();
    let repo = data.repository();
    let buyer = customer("CUST0001", &["Tank 1"]);
    let target = data.path().join("exports").join("q1.csv");
    let file = OrderFile::Custom(target.clone());

    let written = repo
        .replace_orders(&file, &[order("ORD-202403-0001", &buyer, date(2024, 3, 1))])
        .unwrap();

    assert_eq!(written, 1);
    assert_eq!(repo.order_file_path(&file), target);
    assert!(target.exists());
}

#[test]
fn test_malformed_product_reports_path_and_line() {
    let data = TestDataDir::new();
    let repo = data.repository();
    data.write_file(
        "csv_data/products/products.csv",
        "Product Code,ProductName,Status,Stocked,Min Price,Max Price\n\
         REG001,Regular Gasoline,Active,Yes,2.50,3.50\n\
         PRM001,Premium Gasoline,Active,Yes,cheap,3.90\n",
    );

    let err = repo
        .list_products()
        .expect_err("expected malformed price to fail");

    match err {
        RepositoryError::InvalidRecord { path, row, .. } => {
            assert_eq!(path, repo.products_file());
            assert_eq!(row, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_order_file_fails() {
    let data = TestDataDir::new();
    let repo = data.repository();
    let path: PathBuf = data.write_file("broken.csv", "Order#,Line\n\"unterminated,1\n");

    let result = repo.list_orders(&OrderFile::Custom(path));

    assert!(result.is_err());
}
