use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_products_table::Migration),
            Box::new(m20240601_000002_create_suppliers_table::Migration),
            Box::new(m20240601_000003_create_inbound_records_table::Migration),
            Box::new(m20240601_000004_create_outbound_records_table::Migration),
            Box::new(m20240615_000005_unique_active_product_name_brand::Migration),
        ]
    }
}

mod m20240601_000001_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Columns mirror entities::product::Model
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Brand).string().not_null())
                        .col(ColumnDef::new(Products::Category).string().not_null())
                        .col(
                            ColumnDef::new(Products::Unit)
                                .string_len(16)
                                .not_null()
                                .default("个"),
                        )
                        .col(ColumnDef::new(Products::Barcode).string().null())
                        .col(
                            ColumnDef::new(Products::PurchasePrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::RetailPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::InputPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::CurrentStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::StockAlert).integer().null())
                        .col(
                            ColumnDef::new(Products::Status)
                                .string_len(32)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_name_brand")
                        .table(Products::Table)
                        .col(Products::Name)
                        .col(Products::Brand)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_category")
                        .table(Products::Table)
                        .col(Products::Category)
                        .if_not_exists()
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
    enum Products {
        Table,
        Id,
        Name,
        Brand,
        Category,
        Unit,
        Barcode,
        PurchasePrice,
        RetailPrice,
        InputPrice,
        CurrentStock,
        StockAlert,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000002_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Suppliers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Suppliers::Name).string().not_null().unique_key())
                        .col(ColumnDef::new(Suppliers::Contact).string().null())
                        .col(ColumnDef::new(Suppliers::Phone).string_len(32).null())
                        .col(ColumnDef::new(Suppliers::Address).string().null())
                        .col(
                            ColumnDef::new(Suppliers::PaymentMethod)
                                .string_len(32)
                                .not_null()
                                .default("cash"),
                        )
                        .col(
                            ColumnDef::new(Suppliers::Status)
                                .string_len(32)
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(Suppliers::Notes).text().null())
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Contact,
        Phone,
        Address,
        PaymentMethod,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_inbound_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_inbound_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InboundRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InboundRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InboundRecords::ProductId).uuid().not_null())
                        .col(ColumnDef::new(InboundRecords::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(InboundRecords::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(InboundRecords::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundRecords::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundRecords::InboundDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InboundRecords::Notes).text().null())
                        .col(
                            ColumnDef::new(InboundRecords::Status)
                                .string_len(32)
                                .not_null()
                                .default("completed"),
                        )
                        .col(
                            ColumnDef::new(InboundRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inbound_records_product")
                                .from(InboundRecords::Table, InboundRecords::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inbound_records_supplier")
                                .from(InboundRecords::Table, InboundRecords::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inbound_records_product")
                        .table(InboundRecords::Table)
                        .col(InboundRecords::ProductId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inbound_records_supplier")
                        .table(InboundRecords::Table)
                        .col(InboundRecords::SupplierId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inbound_records_date")
                        .table(InboundRecords::Table)
                        .col(InboundRecords::InboundDate)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InboundRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InboundRecords {
        Table,
        Id,
        ProductId,
        SupplierId,
        Quantity,
        UnitPrice,
        TotalAmount,
        InboundDate,
        Notes,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
    }
}

mod m20240601_000004_create_outbound_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_outbound_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OutboundRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboundRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboundRecords::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OutboundRecords::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OutboundRecords::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundRecords::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundRecords::OutboundDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundRecords::OutboundType)
                                .string_len(32)
                                .not_null()
                                .default("sale"),
                        )
                        .col(ColumnDef::new(OutboundRecords::Remark).text().null())
                        .col(
                            ColumnDef::new(OutboundRecords::Status)
                                .string_len(32)
                                .not_null()
                                .default("completed"),
                        )
                        .col(
                            ColumnDef::new(OutboundRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_outbound_records_product")
                                .from(OutboundRecords::Table, OutboundRecords::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_outbound_records_product")
                        .table(OutboundRecords::Table)
                        .col(OutboundRecords::ProductId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_outbound_records_date_type")
                        .table(OutboundRecords::Table)
                        .col(OutboundRecords::OutboundDate)
                        .col(OutboundRecords::OutboundType)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OutboundRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OutboundRecords {
        Table,
        Id,
        ProductId,
        Quantity,
        UnitPrice,
        TotalAmount,
        OutboundDate,
        OutboundType,
        Remark,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }
}

mod m20240615_000005_unique_active_product_name_brand {
    use sea_orm_migration::prelude::*;
    use sea_orm_migration::sea_orm::ConnectionTrait;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240615_000005_unique_active_product_name_brand"
        }
    }

    // Partial index: inactive products may share a name and brand with an active one.
    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS uq_products_active_name_brand \
                     ON products (name, brand) WHERE status = 'active'",
                )
                .await?;
            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .get_connection()
                .execute_unprepared("DROP INDEX IF EXISTS uq_products_active_name_brand")
                .await?;
            Ok(())
        }
    }
}
