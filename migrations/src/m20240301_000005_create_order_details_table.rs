use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderDetails::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderDetails::OrderId).uuid().not_null())
                    .col(ColumnDef::new(OrderDetails::ProductId).uuid().not_null())
                    .col(ColumnDef::new(OrderDetails::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(OrderDetails::Price)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderDetails::OrderDate)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_details_order_id")
                            .from(OrderDetails::Table, OrderDetails::OrderId)
                            .to(
                                super::m20240301_000004_create_orders_table::Orders::Table,
                                super::m20240301_000004_create_orders_table::Orders::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_details_product_id")
                            .from(OrderDetails::Table, OrderDetails::ProductId)
                            .to(
                                super::m20240301_000003_create_products_table::Products::Table,
                                super::m20240301_000003_create_products_table::Products::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One line item per (order, product): repeat scans accumulate on the row.
        manager
            .create_index(
                Index::create()
                    .name("idx_order_details_order_product")
                    .table(OrderDetails::Table)
                    .col(OrderDetails::OrderId)
                    .col(OrderDetails::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderDetails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OrderDetails {
    Table,
    Id,
    OrderId,
    ProductId,
    Quantity,
    Price,
    OrderDate,
}
