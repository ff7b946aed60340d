use std::collections::HashSet;

use crate::{
    domain::product::Product as DomainProduct,
    models::product::ProductRow,
    repository::{
        CsvRepository, ProductReader, ProductWriter, RepositoryResult,
        files::{WriteMode, convert_records, read_records, write_records},
    },
};

impl ProductReader for CsvRepository {
    fn list_products(&self) -> RepositoryResult<Vec<DomainProduct>> {
        let path = self.products_file();
        let rows = read_records::<ProductRow>(&path)?;
        let loaded: Vec<DomainProduct> = convert_records(&path, rows)?;

        let mut seen = HashSet::new();
        let mut products = Vec::with_capacity(loaded.len());
        for product in loaded {
            if !seen.insert(product.code.clone()) {
                log::warn!(
                    "Ignoring duplicate product {} in {}",
                    product.code,
                    path.display()
                );
                continue;
            }
            products.push(product);
        }

        Ok(products)
    }
}

impl ProductWriter for CsvRepository {
    fn replace_products(&self, products: &[DomainProduct]) -> RepositoryResult<usize> {
        let mut seen = HashSet::new();
        let rows: Vec<ProductRow> = products
            .iter()
            .filter(|product| seen.insert(product.code.clone()))
            .map(ProductRow::from)
            .collect();

        write_records(&self.products_file(), &rows, WriteMode::Replace)
    }

    fn append_products(&self, products: &[DomainProduct]) -> RepositoryResult<usize> {
        let path = self.products_file();
        let mut seen: HashSet<String> = read_records::<ProductRow>(&path)?
            .into_iter()
            .map(|row| row.code)
            .collect();

        let rows: Vec<ProductRow> = products
            .iter()
            .filter(|product| seen.insert(product.code.clone()))
            .map(ProductRow::from)
            .collect();

        let skipped = products.len() - rows.len();
        if skipped > 0 {
            log::warn!("Skipped {skipped} products already present in {}", path.display());
        }
        if rows.is_empty() {
            return Ok(0);
        }

        write_records(&path, &rows, WriteMode::Append)
    }
}
