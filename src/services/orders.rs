use chrono::NaiveDate;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use crate::config::GeneratorConfig;
use crate::domain::customer::Customer;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::period::{DateWindow, YearMonth};
use crate::domain::product::Product;
use crate::services::reference_data::ReferenceData;
use crate::services::{ServiceError, ServiceResult};

const STATUSES: [OrderStatus; 3] = [
    OrderStatus::Completed,
    OrderStatus::InProgress,
    OrderStatus::Pending,
];

/// A batch of orders to generate inside one date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBatch {
    pub window: DateWindow,
    pub count: usize,
    /// Middle part of the order number, `YYYYMM` of the period.
    pub prefix: String,
    /// Serial of the first order in the batch.
    pub first_index: usize,
}

impl OrderBatch {
    /// Batch covering a calendar month, numbered from 1.
    pub fn month(month: YearMonth, count: usize) -> Self {
        Self {
            window: DateWindow::month(month),
            count,
            prefix: month.code(),
            first_index: 1,
        }
    }

    /// Batch covering an arbitrary window; numbers use the month of its last day.
    pub fn window(window: DateWindow, count: usize) -> Self {
        Self {
            window,
            count,
            prefix: YearMonth::of(window.end).code(),
            first_index: 1,
        }
    }

    pub fn starting_at(mut self, first_index: usize) -> Self {
        self.first_index = first_index.max(1);
        self
    }
}

/// Serial following the highest `ORD-{prefix}-NNNN` number in `existing`.
pub fn next_order_index(existing: &[Order], prefix: &str) -> usize {
    let marker = format!("ORD-{prefix}-");
    existing
        .iter()
        .filter_map(|order| order.number.strip_prefix(&marker)?.parse::<usize>().ok())
        .max()
        .map_or(1, |last| last + 1)
}

/// Generate the orders of `batch` from the prepared reference data.
///
/// Orders are dated inside the batch window and numbered in date order.
/// Inactive products and customers without delivery sequences are never used.
/// `config` is expected to be validated.
pub fn generate_orders<G>(
    config: &GeneratorConfig,
    rng: &mut G,
    reference: &ReferenceData,
    batch: &OrderBatch,
) -> ServiceResult<Vec<Order>>
where
    G: Rng + ?Sized,
{
    let products: Vec<&Product> = reference
        .products
        .iter()
        .filter(|product| product.is_active)
        .collect();
    if products.is_empty() {
        return Err(ServiceError::NoProducts);
    }

    let customers: Vec<&Customer> = reference
        .customers
        .iter()
        .filter(|customer| customer.has_sequences())
        .collect();
    if customers.is_empty() {
        return Err(ServiceError::NoCustomers);
    }

    let weights = config.status_weights;
    let statuses = WeightedIndex::new([weights.completed, weights.in_progress, weights.pending])
        .map_err(|err| ServiceError::InvalidConfig(format!("status_weights: {err}")))?;

    let mut dates: Vec<NaiveDate> = (0..batch.count)
        .map(|_| batch.window.random_date(rng))
        .collect();
    dates.sort_unstable();

    let mut orders = Vec::with_capacity(batch.count);
    for (offset, date) in dates.into_iter().enumerate() {
        let reference = format!("{}-{:04}", batch.prefix, batch.first_index + offset);
        let customer = customers[rng.gen_range(0..customers.len())];
        let sequence = &customer.sequences[rng.gen_range(0..customer.sequences.len())];

        let po_required = rng.gen_bool(config.po_required_probability);
        let status = STATUSES[statuses.sample(rng)];
        let (invoice_number, invoice_date) = if status.is_invoiced() {
            let invoiced_on = date
                .succ_opt()
                .filter(|next| batch.window.contains(*next))
                .unwrap_or(date);
            (Some(format!("INV-{reference}")), Some(invoiced_on))
        } else {
            (None, None)
        };

        let line_count = rng.gen_range(1..=config.max_line_items.min(products.len()));
        let chosen: Vec<&Product> = products
            .choose_multiple(rng, line_count)
            .copied()
            .collect();
        let items = chosen
            .into_iter()
            .zip(1u32..)
            .map(|(product, line)| price_item(config, rng, line, product))
            .collect();

        orders.push(Order {
            number: format!("ORD-{reference}"),
            customer_code: customer.code.clone(),
            customer_name: customer.name.clone(),
            sequence_id: sequence.sequence_id,
            sequence_description: sequence.description.clone(),
            po_required,
            po_number: po_required.then(|| format!("PO-{reference}")),
            date,
            status,
            invoice_number,
            invoice_date,
            bol: format!("BOL-{reference}"),
            items,
        });
    }

    Ok(orders)
}

fn price_item<G>(config: &GeneratorConfig, rng: &mut G, line: u32, product: &Product) -> OrderItem
where
    G: Rng + ?Sized,
{
    let range = config.quantity;
    let quantity = rng.gen_range(range.min.div_ceil(range.step)..=range.max / range.step) * range.step;
    let mut item = OrderItem::new(
        line,
        &product.code,
        &product.name,
        product.random_price_cents(rng),
        quantity,
    );

    if !config.standard_charges.is_empty() && rng.gen_bool(config.charge_probability) {
        let charge = &config.standard_charges[rng.gen_range(0..config.standard_charges.len())];
        item = item.with_charge(&charge.name, charge.amount_cents);
        if rng.gen_bool(config.special_charge_probability) {
            let special = config.special_charge_cents;
            item = item.with_special_charges(rng.gen_range(special.low..=special.high));
        }
    }

    let extended = item.extended_price_cents() as f64;
    let rate = rng.gen_range(config.tax_rate.low..=config.tax_rate.high);
    let total_taxes = (extended * rate).round() as i64;
    let max_exempt = (total_taxes as f64 * config.max_exempt_share).round() as i64;
    let exempt_taxes = rng.gen_range(0..=max_exempt);
    let total_cost = (extended * config.cost_ratio).round() as i64;

    item.with_taxes(total_taxes, exempt_taxes)
        .with_total_cost(total_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reference_data::{synthesize_customers, synthesize_products};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn reference(rng: &mut StdRng, products: usize, customers: usize) -> ReferenceData {
        let config = GeneratorConfig::default();
        ReferenceData {
            products: synthesize_products(&config, rng, products, &HashSet::new()),
            customers: synthesize_customers(&config, rng, customers, &HashSet::new()),
        }
    }

    fn march() -> YearMonth {
        YearMonth::new(2024, 3).expect("valid month")
    }

    #[test]
    fn generates_a_month_of_consistent_orders() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = GeneratorConfig::default();
        let data = reference(&mut rng, 8, 5);

        let orders = generate_orders(&config, &mut rng, &data, &OrderBatch::month(march(), 10))
            .expect("expected orders");

        assert_eq!(orders.len(), 10);
        assert_eq!(orders[0].number, "ORD-202403-0001");
        assert_eq!(orders[9].number, "ORD-202403-0010");

        let numbers: HashSet<&str> = orders.iter().map(|o| o.number.as_str()).collect();
        assert_eq!(numbers.len(), 10);
        let invoices: Vec<&str> = orders
            .iter()
            .filter_map(|o| o.invoice_number.as_deref())
            .collect();
        assert_eq!(invoices.iter().collect::<HashSet<_>>().len(), invoices.len());

        let window = DateWindow::month(march());
        for pair in orders.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }
        for order in &orders {
            assert!(window.contains(order.date));
            assert!((1..=3).contains(&order.items.len()));
            assert_eq!(order.po_required, order.po_number.is_some());
            assert_eq!(order.status.is_invoiced(), order.invoice_date.is_some());
            if let Some(invoiced_on) = order.invoice_date {
                assert!(window.contains(invoiced_on));
                assert!(invoiced_on >= order.date);
            }

            let customer = data
                .customers
                .iter()
                .find(|c| c.code == order.customer_code)
                .expect("known customer");
            assert!(customer.sequence(order.sequence_id).is_some());

            let codes: HashSet<&str> = order.items.iter().map(|i| i.product_code.as_str()).collect();
            assert_eq!(codes.len(), order.items.len());
            for (item, line) in order.items.iter().zip(1u32..) {
                assert_eq!(item.line, line);
                assert!(item.totals_consistent());
                assert_eq!(item.quantity % 10, 0);
                assert!((200..=3500).contains(&item.quantity));
                assert!(item.exempt_taxes_cents <= item.total_taxes_cents);
                let product = data
                    .products
                    .iter()
                    .find(|p| p.code == item.product_code)
                    .expect("known product");
                assert!(
                    (product.min_price_cents..=product.max_price_cents)
                        .contains(&item.unit_price_cents)
                );
            }
        }
    }

    #[test]
    fn same_seed_gives_same_orders() {
        let config = GeneratorConfig::default();
        let run = || {
            let mut rng = StdRng::seed_from_u64(99);
            let data = reference(&mut rng, 4, 3);
            generate_orders(&config, &mut rng, &data, &OrderBatch::month(march(), 5))
                .expect("expected orders")
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn numbering_continues_from_first_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = GeneratorConfig::default();
        let data = reference(&mut rng, 2, 2);
        let batch = OrderBatch::month(march(), 3).starting_at(11);

        let orders = generate_orders(&config, &mut rng, &data, &batch).expect("expected orders");

        let numbers: Vec<&str> = orders.iter().map(|o| o.number.as_str()).collect();
        assert_eq!(
            numbers,
            vec!["ORD-202403-0011", "ORD-202403-0012", "ORD-202403-0013"]
        );
        assert_eq!(next_order_index(&orders, "202403"), 14);
        assert_eq!(next_order_index(&orders, "202404"), 1);
    }

    #[test]
    fn single_product_limits_line_items() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = GeneratorConfig::default();
        let data = reference(&mut rng, 1, 2);

        let orders = generate_orders(&config, &mut rng, &data, &OrderBatch::month(march(), 20))
            .expect("expected orders");

        assert!(orders.iter().all(|o| o.items.len() == 1));
    }

    #[test]
    fn window_batch_uses_end_month_prefix() {
        let end = NaiveDate::from_ymd_opt(2024, 5, 10).expect("valid date");
        let batch = OrderBatch::window(DateWindow::trailing_days(end, 90), 4);

        assert_eq!(batch.prefix, "202405");
        assert_eq!(batch.first_index, 1);
    }

    #[test]
    fn zero_orders_is_empty() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = GeneratorConfig::default();
        let data = reference(&mut rng, 2, 2);

        let orders = generate_orders(&config, &mut rng, &data, &OrderBatch::month(march(), 0))
            .expect("expected orders");

        assert!(orders.is_empty());
    }

    #[test]
    fn customers_without_sequences_are_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = GeneratorConfig::default();
        let mut data = reference(&mut rng, 2, 2);
        for customer in &mut data.customers {
            customer.sequences.clear();
        }

        let result = generate_orders(&config, &mut rng, &data, &OrderBatch::month(march(), 1));

        assert!(matches!(result, Err(ServiceError::NoCustomers)));
    }
}
