use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Products::Brand).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Products::ItemNumber)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Products::Price)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    // Unique in practice, but deliberately not constrained: the bulk
                    // importer always inserts and the create path checks first.
                    .col(ColumnDef::new(Products::Barcode).string_len(30).not_null())
                    .col(
                        ColumnDef::new(Products::QuantityInStock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                    .col(
                        ColumnDef::new(Products::UnitSize)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Products::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Products::Discount)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(
                                super::m20240301_000002_create_categories_table::Categories::Table,
                                super::m20240301_000002_create_categories_table::Categories::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_barcode")
                    .table(Products::Table)
                    .col(Products::Barcode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_name")
                    .table(Products::Table)
                    .col(Products::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Name,
    Brand,
    ItemNumber,
    Price,
    Barcode,
    QuantityInStock,
    CategoryId,
    UnitSize,
    Description,
    Discount,
}
