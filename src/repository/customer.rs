use std::collections::{HashMap, HashSet};

use crate::{
    domain::customer::{Customer as DomainCustomer, CustomerSequence as DomainSequence},
    models::customer::{CustomerRow, SequenceRow},
    repository::{
        CsvRepository, CustomerReader, CustomerWriter, RepositoryResult,
        files::{WriteMode, convert_records, read_records, write_records},
    },
};

impl CustomerReader for CsvRepository {
    fn list_customers(&self) -> RepositoryResult<Vec<DomainCustomer>> {
        let customers_path = self.customers_file();
        let sequences_path = self.sequences_file();

        let customer_rows = read_records::<CustomerRow>(&customers_path)?;
        let loaded: Vec<DomainCustomer> = convert_records(&customers_path, customer_rows)?;

        let mut customers: Vec<DomainCustomer> = Vec::with_capacity(loaded.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for customer in loaded {
            if positions.contains_key(&customer.code) {
                log::warn!(
                    "Ignoring duplicate customer {} in {}",
                    customer.code,
                    customers_path.display()
                );
                continue;
            }
            positions.insert(customer.code.clone(), customers.len());
            customers.push(customer);
        }

        let sequence_rows = read_records::<SequenceRow>(&sequences_path)?;
        let sequences: Vec<DomainSequence> = convert_records(&sequences_path, sequence_rows)?;

        for sequence in sequences {
            let Some(&position) = positions.get(&sequence.customer_code) else {
                log::warn!(
                    "Ignoring sequence {} of unknown customer {}",
                    sequence.sequence_id,
                    sequence.customer_code
                );
                continue;
            };

            let customer = &mut customers[position];
            if customer.sequence(sequence.sequence_id).is_some() {
                log::warn!(
                    "Ignoring duplicate sequence {} of customer {}",
                    sequence.sequence_id,
                    sequence.customer_code
                );
                continue;
            }
            customer.sequences.push(sequence);
        }

        Ok(customers)
    }
}

impl CustomerWriter for CsvRepository {
    fn replace_customers(&self, customers: &[DomainCustomer]) -> RepositoryResult<usize> {
        let mut seen = HashSet::new();
        let unique: Vec<&DomainCustomer> = customers
            .iter()
            .filter(|customer| seen.insert(customer.code.clone()))
            .collect();

        let customer_rows: Vec<CustomerRow> =
            unique.iter().map(|customer| CustomerRow::from(*customer)).collect();
        let sequence_rows: Vec<SequenceRow> = unique
            .iter()
            .flat_map(|customer| customer.sequences.iter().map(SequenceRow::from))
            .collect();

        let written = write_records(&self.customers_file(), &customer_rows, WriteMode::Replace)?;
        write_records(&self.sequences_file(), &sequence_rows, WriteMode::Replace)?;
        Ok(written)
    }

    fn append_customers(&self, customers: &[DomainCustomer]) -> RepositoryResult<usize> {
        let customers_path = self.customers_file();
        let sequences_path = self.sequences_file();

        let mut known_customers: HashSet<String> = read_records::<CustomerRow>(&customers_path)?
            .into_iter()
            .map(|row| row.code)
            .collect();
        let mut known_sequences: HashSet<(String, u32)> =
            read_records::<SequenceRow>(&sequences_path)?
                .into_iter()
                .map(|row| (row.customer_code, row.sequence_id))
                .collect();

        let customer_rows: Vec<CustomerRow> = customers
            .iter()
            .filter(|customer| known_customers.insert(customer.code.clone()))
            .map(CustomerRow::from)
            .collect();
        let sequence_rows: Vec<SequenceRow> = customers
            .iter()
            .flat_map(|customer| customer.sequences.iter())
            .filter(|seq| known_sequences.insert((seq.customer_code.clone(), seq.sequence_id)))
            .map(SequenceRow::from)
            .collect();

        let written = if customer_rows.is_empty() {
            0
        } else {
            write_records(&customers_path, &customer_rows, WriteMode::Append)?
        };
        if !sequence_rows.is_empty() {
            write_records(&sequences_path, &sequence_rows, WriteMode::Append)?;
        }

        Ok(written)
    }
}
