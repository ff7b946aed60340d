use std::collections::HashSet;

use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{DEFAULT_NUM_CUSTOMERS, DEFAULT_NUM_PRODUCTS, GeneratorConfig, ProductTemplate};
use crate::domain::ReferenceMode;
use crate::domain::customer::{Customer, code_serial};
use crate::domain::product::Product;
use crate::repository::{CustomerReader, CustomerWriter, ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

/// How much reference data a run needs and whether stored data may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRequest {
    pub products: usize,
    pub customers: usize,
    pub mode: ReferenceMode,
}

impl Default for ReferenceRequest {
    fn default() -> Self {
        Self {
            products: DEFAULT_NUM_PRODUCTS,
            customers: DEFAULT_NUM_CUSTOMERS,
            mode: ReferenceMode::ReuseExisting,
        }
    }
}

/// Products and customers available to the order generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub products: Vec<Product>,
    /// Customers that have at least one delivery sequence.
    pub customers: Vec<Customer>,
}

/// Load or synthesize products and customers according to `request`.
pub fn prepare_reference_data<R, G>(
    repo: &R,
    config: &GeneratorConfig,
    rng: &mut G,
    request: &ReferenceRequest,
) -> ServiceResult<ReferenceData>
where
    R: ProductReader + ProductWriter + CustomerReader + CustomerWriter + ?Sized,
    G: Rng + ?Sized,
{
    let products = prepare_products(repo, config, rng, request.products, request.mode)?;
    let customers = prepare_customers(repo, config, rng, request.customers, request.mode)?;

    Ok(ReferenceData {
        products,
        customers,
    })
}

/// Produce the product set, persisting whatever had to be synthesized.
pub fn prepare_products<R, G>(
    repo: &R,
    config: &GeneratorConfig,
    rng: &mut G,
    count: usize,
    mode: ReferenceMode,
) -> ServiceResult<Vec<Product>>
where
    R: ProductReader + ProductWriter + ?Sized,
    G: Rng + ?Sized,
{
    let products = match mode {
        ReferenceMode::RegenerateAll => {
            log::info!("Creating {count} new products");
            let products = synthesize_products(config, rng, count, &HashSet::new());
            repo.replace_products(&products)?;
            products
        }
        ReferenceMode::ReuseExisting => {
            let mut products = repo.list_products()?;
            if products.len() < count {
                let taken: HashSet<String> =
                    products.iter().map(|product| product.code.clone()).collect();
                let extra = synthesize_products(config, rng, count - products.len(), &taken);
                let written = repo.append_products(&extra)?;
                log::info!(
                    "Added {written} products to {} existing ones",
                    products.len()
                );
                products.extend(extra);
            } else {
                log::info!("Reusing {} existing products", products.len());
            }
            products
        }
    };

    if products.is_empty() {
        return Err(ServiceError::NoProducts);
    }

    Ok(products)
}

/// Produce the customer set, persisting whatever had to be synthesized.
///
/// Stored customers without any delivery sequence are skipped.
pub fn prepare_customers<R, G>(
    repo: &R,
    config: &GeneratorConfig,
    rng: &mut G,
    count: usize,
    mode: ReferenceMode,
) -> ServiceResult<Vec<Customer>>
where
    R: CustomerReader + CustomerWriter + ?Sized,
    G: Rng + ?Sized,
{
    let customers = match mode {
        ReferenceMode::RegenerateAll => {
            log::info!("Creating {count} new customers");
            let customers = synthesize_customers(config, rng, count, &HashSet::new());
            repo.replace_customers(&customers)?;
            customers
        }
        ReferenceMode::ReuseExisting => {
            let stored = repo.list_customers()?;
            let taken: HashSet<String> =
                stored.iter().map(|customer| customer.code.clone()).collect();

            let (mut customers, unusable): (Vec<Customer>, Vec<Customer>) =
                stored.into_iter().partition(Customer::has_sequences);
            for customer in &unusable {
                log::warn!("Skipping customer {} without delivery sequences", customer.code);
            }

            if customers.len() < count {
                let extra = synthesize_customers(config, rng, count - customers.len(), &taken);
                let written = repo.append_customers(&extra)?;
                log::info!(
                    "Added {written} customers to {} existing ones",
                    customers.len()
                );
                customers.extend(extra);
            } else {
                log::info!("Reusing {} existing customers", customers.len());
            }
            customers
        }
    };

    if customers.is_empty() {
        return Err(ServiceError::NoCustomers);
    }

    Ok(customers)
}

/// Synthesize `count` products whose codes avoid `taken` and each other.
///
/// Codes cycle through the catalogue with a growing serial: `REG001`, `PRM001`,
/// ..., then `REG002`. Later serials carry a ` #n` name suffix.
pub fn synthesize_products<G>(
    config: &GeneratorConfig,
    rng: &mut G,
    count: usize,
    taken: &HashSet<String>,
) -> Vec<Product>
where
    G: Rng + ?Sized,
{
    let mut products = Vec::with_capacity(count);
    if config.catalogue.is_empty() {
        return products;
    }

    let mut taken = taken.clone();
    let mut index = 0usize;
    while products.len() < count {
        let template = &config.catalogue[index % config.catalogue.len()];
        let serial = index / config.catalogue.len() + 1;
        index += 1;

        let code = format!("{}{:03}", template.abbrev, serial);
        if !taken.insert(code.clone()) {
            continue;
        }
        products.push(product_from_template(config, rng, template, code, serial));
    }

    products
}

fn product_from_template<G>(
    config: &GeneratorConfig,
    rng: &mut G,
    template: &ProductTemplate,
    code: String,
    serial: usize,
) -> Product
where
    G: Rng + ?Sized,
{
    let name = if serial == 1 {
        template.name.clone()
    } else {
        format!("{} #{serial}", template.name)
    };
    let min_price = rng.gen_range(config.min_price_cents.low..=config.min_price_cents.high);
    let max_price = rng.gen_range(config.max_price_cents.low..=config.max_price_cents.high);
    let upc_code: String = (0..12)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();

    let mut product = Product::new(code, name, min_price, max_price).with_upc_code(upc_code);
    product.abbrev = template.abbrev.clone();
    product.group = template.group.clone();
    product.cycle_code = template.cycle_code.clone();
    product.method = template.method.clone();
    product.account_group = template.account_group.clone();
    product.tax_profile = template.tax_profile.clone();
    product.tax_group = template.tax_group.clone();
    product.packaging = template.packaging.clone();
    product.unit_of_measure = template.unit_of_measure.clone();
    product
}

/// Synthesize `count` customers with codes numbered after the highest one in `taken`.
pub fn synthesize_customers<G>(
    config: &GeneratorConfig,
    rng: &mut G,
    count: usize,
    taken: &HashSet<String>,
) -> Vec<Customer>
where
    G: Rng + ?Sized,
{
    let prefix = config.customer_code_prefix.as_str();
    let mut serial = taken
        .iter()
        .filter_map(|code| code_serial(code, prefix))
        .max()
        .unwrap_or(0);

    let mut customers = Vec::with_capacity(count);
    while customers.len() < count {
        serial += 1;
        let code = format!("{prefix}{serial:04}");
        if taken.contains(&code) {
            continue;
        }
        customers.push(fake_customer(config, rng, code));
    }

    customers
}

fn fake_customer<G>(config: &GeneratorConfig, rng: &mut G, code: String) -> Customer
where
    G: Rng + ?Sized,
{
    let mut customer = Customer::new(code, CompanyName().fake_with_rng::<String, _>(rng));
    let building: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    customer.address = format!("{building} {street}");
    customer.city = CityName().fake_with_rng(rng);
    customer.state = StateAbbr().fake_with_rng(rng);
    customer.zip_code = ZipCode().fake_with_rng(rng);
    customer.contact_name = Name().fake_with_rng(rng);
    customer.phone = PhoneNumber().fake_with_rng(rng);
    customer.email = SafeEmail().fake_with_rng(rng);

    let sequence_count = rng.gen_range(1..=config.max_sequences_per_customer.max(1));
    for number in 1..=sequence_count {
        let label = config
            .sequence_labels
            .choose(rng)
            .map(String::as_str)
            .unwrap_or("Location");
        customer.add_sequence(format!("{label} {number}"));
    }

    customer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerSequence;
    use crate::repository::RepositoryResult;
    use crate::repository::mock::{
        MockCustomerReader, MockCustomerWriter, MockProductReader, MockProductWriter,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct FakeRepo {
        product_reader: MockProductReader,
        product_writer: MockProductWriter,
        customer_reader: MockCustomerReader,
        customer_writer: MockCustomerWriter,
    }

    impl FakeRepo {
        fn new() -> Self {
            Self {
                product_reader: MockProductReader::new(),
                product_writer: MockProductWriter::new(),
                customer_reader: MockCustomerReader::new(),
                customer_writer: MockCustomerWriter::new(),
            }
        }
    }

    impl ProductReader for FakeRepo {
        fn list_products(&self) -> RepositoryResult<Vec<Product>> {
            self.product_reader.list_products()
        }
    }

    impl ProductWriter for FakeRepo {
        fn replace_products(&self, products: &[Product]) -> RepositoryResult<usize> {
            self.product_writer.replace_products(products)
        }

        fn append_products(&self, products: &[Product]) -> RepositoryResult<usize> {
            self.product_writer.append_products(products)
        }
    }

    impl CustomerReader for FakeRepo {
        fn list_customers(&self) -> RepositoryResult<Vec<Customer>> {
            self.customer_reader.list_customers()
        }
    }

    impl CustomerWriter for FakeRepo {
        fn replace_customers(&self, customers: &[Customer]) -> RepositoryResult<usize> {
            self.customer_writer.replace_customers(customers)
        }

        fn append_customers(&self, customers: &[Customer]) -> RepositoryResult<usize> {
            self.customer_writer.append_customers(customers)
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    fn stored_customer(code: &str, sequences: u32) -> Customer {
        let mut customer = Customer::new(code, format!("{code} Holdings"));
        for number in 1..=sequences {
            customer.sequences.push(CustomerSequence {
                customer_code: code.to_string(),
                sequence_id: number,
                description: format!("Tank {number}"),
            });
        }
        customer
    }

    #[test]
    fn synthesized_product_codes_cycle_catalogue() {
        let config = GeneratorConfig::default();

        let products = synthesize_products(&config, &mut rng(), 12, &HashSet::new());

        let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes[0], "REG001");
        assert_eq!(codes[9], "AVG001");
        assert_eq!(codes[10], "REG002");
        assert_eq!(products[10].name, "Regular Gasoline #2");
        assert_eq!(codes.iter().collect::<HashSet<_>>().len(), 12);

        for product in &products {
            assert!((250..=320).contains(&product.min_price_cents));
            assert!((350..=450).contains(&product.max_price_cents));
            assert_eq!(product.upc_code.len(), 12);
        }
    }

    #[test]
    fn synthesized_products_skip_taken_codes() {
        let config = GeneratorConfig::default();
        let taken: HashSet<String> = ["REG001".to_string(), "PRM001".to_string()].into();

        let products = synthesize_products(&config, &mut rng(), 10, &taken);

        assert_eq!(products.len(), 10);
        assert!(products.iter().all(|p| !taken.contains(&p.code)));
        assert_eq!(products.last().map(|p| p.code.as_str()), Some("PRM002"));
    }

    #[test]
    fn synthesized_customers_continue_numbering() {
        let config = GeneratorConfig::default();
        let taken: HashSet<String> = ["CUST0003".to_string(), "LEGACY".to_string()].into();

        let customers = synthesize_customers(&config, &mut rng(), 3, &taken);

        let codes: Vec<&str> = customers.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["CUST0004", "CUST0005", "CUST0006"]);
        for customer in &customers {
            assert!((1..=5).contains(&customer.sequences.len()));
            assert!(!customer.name.is_empty());
            assert!(customer.sequences.iter().all(|s| s.customer_code == customer.code));
        }
    }

    #[test]
    fn regenerate_overwrites_products() {
        let mut repo = FakeRepo::new();
        repo.product_reader.expect_list_products().never();
        repo.product_writer
            .expect_replace_products()
            .times(1)
            .withf(|products| products.len() == 8)
            .returning(|products| Ok(products.len()));

        let products = prepare_products(
            &repo,
            &GeneratorConfig::default(),
            &mut rng(),
            8,
            ReferenceMode::RegenerateAll,
        )
        .expect("expected success");

        assert_eq!(products.len(), 8);
    }

    #[test]
    fn reuse_keeps_stored_products_without_writing() {
        let mut repo = FakeRepo::new();
        let stored: Vec<Product> = (1..=5)
            .map(|n| Product::new(format!("XYZ{n:03}"), "Stored", 300, 400))
            .collect();
        let returned = stored.clone();
        repo.product_reader
            .expect_list_products()
            .times(1)
            .returning(move || Ok(returned.clone()));
        repo.product_writer.expect_append_products().never();
        repo.product_writer.expect_replace_products().never();

        let products = prepare_products(
            &repo,
            &GeneratorConfig::default(),
            &mut rng(),
            3,
            ReferenceMode::ReuseExisting,
        )
        .expect("expected success");

        assert_eq!(products, stored);
    }

    #[test]
    fn reuse_tops_up_missing_products() {
        let mut repo = FakeRepo::new();
        repo.product_reader.expect_list_products().times(1).returning(|| {
            Ok(vec![
                Product::new("REG001", "Regular Gasoline", 300, 400),
                Product::new("PRM001", "Premium Gasoline", 300, 400),
            ])
        });
        repo.product_writer
            .expect_append_products()
            .times(1)
            .withf(|extra| {
                extra.len() == 3 && extra.iter().all(|p| p.code != "REG001" && p.code != "PRM001")
            })
            .returning(|extra| Ok(extra.len()));

        let products = prepare_products(
            &repo,
            &GeneratorConfig::default(),
            &mut rng(),
            5,
            ReferenceMode::ReuseExisting,
        )
        .expect("expected success");

        let codes: HashSet<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(products.len(), 5);
        assert_eq!(codes.len(), 5);
    }

    #[test]
    fn reuse_skips_customers_without_sequences() {
        let mut repo = FakeRepo::new();
        repo.customer_reader.expect_list_customers().times(1).returning(|| {
            Ok(vec![
                stored_customer("CUST0001", 2),
                stored_customer("CUST0002", 0),
            ])
        });
        repo.customer_writer
            .expect_append_customers()
            .times(1)
            .withf(|extra| extra.len() == 1 && extra[0].code == "CUST0003")
            .returning(|extra| Ok(extra.len()));

        let customers = prepare_customers(
            &repo,
            &GeneratorConfig::default(),
            &mut rng(),
            2,
            ReferenceMode::ReuseExisting,
        )
        .expect("expected success");

        let codes: Vec<&str> = customers.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["CUST0001", "CUST0003"]);
    }

    #[test]
    fn empty_request_is_an_error() {
        let mut repo = FakeRepo::new();
        repo.product_reader
            .expect_list_products()
            .returning(|| Ok(Vec::new()));
        repo.product_writer.expect_append_products().returning(|_| Ok(0));

        let result = prepare_products(
            &repo,
            &GeneratorConfig::default(),
            &mut rng(),
            0,
            ReferenceMode::ReuseExisting,
        );

        assert!(matches!(result, Err(ServiceError::NoProducts)));
    }
}
