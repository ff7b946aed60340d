use mockall::mock;

use super::{
    CustomerReader, CustomerWriter, OrderFile, OrderReader, OrderWriter, ProductReader,
    ProductWriter, RepositoryResult,
};
use crate::domain::{customer::Customer, order::Order, product::Product};

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn replace_products(&self, products: &[Product]) -> RepositoryResult<usize>;
        fn append_products(&self, products: &[Product]) -> RepositoryResult<usize>;
    }
}

mock! {
    pub CustomerReader {}

    impl CustomerReader for CustomerReader {
        fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;
    }
}

mock! {
    pub CustomerWriter {}

    impl CustomerWriter for CustomerWriter {
        fn replace_customers(&self, customers: &[Customer]) -> RepositoryResult<usize>;
        fn append_customers(&self, customers: &[Customer]) -> RepositoryResult<usize>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn list_orders(&self, file: &OrderFile) -> RepositoryResult<Vec<Order>>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn append_orders(&self, file: &OrderFile, orders: &[Order]) -> RepositoryResult<usize>;
        fn replace_orders(&self, file: &OrderFile, orders: &[Order]) -> RepositoryResult<usize>;
    }
}
