pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_customers_table;
mod m20240301_000002_create_categories_table;
mod m20240301_000003_create_products_table;
mod m20240301_000004_create_orders_table;
mod m20240301_000005_create_order_details_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customers_table::Migration),
            Box::new(m20240301_000002_create_categories_table::Migration),
            Box::new(m20240301_000003_create_products_table::Migration),
            Box::new(m20240301_000004_create_orders_table::Migration),
            Box::new(m20240301_000005_create_order_details_table::Migration),
        ]
    }
}
