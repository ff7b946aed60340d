use std::collections::HashSet;

use crate::{
    domain::order::Order as DomainOrder,
    models::order::{OrderRow, orders_from_rows, rows_from_orders},
    repository::{
        CsvRepository, OrderFile, OrderReader, OrderWriter, RepositoryResult,
        files::{WriteMode, invalid_record, read_records, write_records},
    },
};

impl OrderReader for CsvRepository {
    fn list_orders(&self, file: &OrderFile) -> RepositoryResult<Vec<DomainOrder>> {
        let path = self.order_file_path(file);
        let rows = read_records::<OrderRow>(&path)?;
        orders_from_rows(rows).map_err(|(index, source)| invalid_record(&path, index, source))
    }
}

impl OrderWriter for CsvRepository {
    fn append_orders(&self, file: &OrderFile, orders: &[DomainOrder]) -> RepositoryResult<usize> {
        let path = self.order_file_path(file);
        let mut known: HashSet<String> = self
            .list_orders(file)?
            .into_iter()
            .map(|order| order.number)
            .collect();

        let fresh: Vec<DomainOrder> = orders
            .iter()
            .filter(|order| known.insert(order.number.clone()))
            .cloned()
            .collect();

        let skipped = orders.len() - fresh.len();
        if skipped > 0 {
            log::warn!(
                "Skipped {skipped} orders already present in {}",
                path.display()
            );
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        write_records(&path, &rows_from_orders(&fresh), WriteMode::Append)?;
        Ok(fresh.len())
    }

    fn replace_orders(&self, file: &OrderFile, orders: &[DomainOrder]) -> RepositoryResult<usize> {
        let mut seen = HashSet::new();
        let unique: Vec<DomainOrder> = orders
            .iter()
            .filter(|order| seen.insert(order.number.clone()))
            .cloned()
            .collect();

        write_records(
            &self.order_file_path(file),
            &rows_from_orders(&unique),
            WriteMode::Replace,
        )?;
        Ok(unique.len())
    }
}
