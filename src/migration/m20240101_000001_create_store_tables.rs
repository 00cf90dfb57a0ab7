use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite cannot add a foreign key to an existing table, but it accepts one
        // pointing at a table that does not exist yet.
        let inline_featured_fk = manager.get_database_backend() == DatabaseBackend::Sqlite;

        manager
            .create_table(
                Table::create()
                    .table(Promotions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Promotions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Promotions::Description).string_len(255).not_null())
                    .col(ColumnDef::new(Promotions::Discount).double().not_null())
                    .to_owned(),
            )
            .await?;

        let mut collections = Table::create()
            .table(Collections::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Collections::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Collections::Title).string_len(255).not_null())
            .col(ColumnDef::new(Collections::FeaturedProductId).integer().null())
            .to_owned();
        if inline_featured_fk {
            collections.foreign_key(&mut featured_product_fk());
        }
        manager.create_table(collections).await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Products::Slug).string_len(255).not_null())
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(
                        ColumnDef::new(Products::UnitPrice)
                            .decimal_len(6, 2)
                            .not_null()
                            .check(Expr::col(Products::UnitPrice).gte(1)),
                    )
                    .col(
                        ColumnDef::new(Products::Inventory)
                            .integer()
                            .not_null()
                            .check(Expr::col(Products::Inventory).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Products::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::CollectionId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_collection")
                            .from(Products::Table, Products::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        if !inline_featured_fk {
            manager.create_foreign_key(featured_product_fk()).await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_products_slug")
                    .table(Products::Table)
                    .col(Products::Slug)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductPromotions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductPromotions::ProductId).integer().not_null())
                    .col(ColumnDef::new(ProductPromotions::PromotionId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ProductPromotions::ProductId)
                            .col(ProductPromotions::PromotionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_promotions_product")
                            .from(ProductPromotions::Table, ProductPromotions::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_promotions_promotion")
                            .from(ProductPromotions::Table, ProductPromotions::PromotionId)
                            .to(Promotions::Table, Promotions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::FirstName).string_len(255).not_null())
                    .col(ColumnDef::new(Customers::LastName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Customers::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customers::Phone).string_len(255).not_null())
                    .col(ColumnDef::new(Customers::BirthDate).date().null())
                    .col(
                        ColumnDef::new(Customers::Membership)
                            .string_len(1)
                            .not_null()
                            .default("B")
                            .check(Expr::col(Customers::Membership).is_in(["G", "S", "B"])),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::CustomerId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addresses::Street).string_len(255).not_null())
                    .col(ColumnDef::new(Addresses::City).string_len(255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_addresses_customer")
                            .from(Addresses::Table, Addresses::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Orders::PlacedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::PaymentStatus)
                            .string_len(1)
                            .not_null()
                            .default("P")
                            .check(Expr::col(Orders::PaymentStatus).is_in(["C", "P", "F"])),
                    )
                    .col(ColumnDef::new(Orders::CustomerId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                    .col(
                        ColumnDef::new(OrderItems::Quantity)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(OrderItems::Quantity).gte(1)),
                    )
                    .col(ColumnDef::new(OrderItems::UnitPrice).decimal_len(6, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_product")
                            .from(OrderItems::Table, OrderItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Carts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Carts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CartItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CartItems::CartId).integer().not_null())
                    .col(ColumnDef::new(CartItems::ProductId).integer().not_null())
                    .col(
                        ColumnDef::new(CartItems::Quantity)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(CartItems::Quantity).gte(1)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_cart")
                            .from(CartItems::Table, CartItems::CartId)
                            .to(Carts::Table, Carts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_product")
                            .from(CartItems::Table, CartItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Sqlite {
            manager
                .drop_foreign_key(
                    ForeignKey::drop()
                        .name("fk_collections_featured_product")
                        .table(Collections::Table)
                        .to_owned(),
                )
                .await?;
        }
        for table in [
            CartItems::Table.into_iden(),
            Carts::Table.into_iden(),
            OrderItems::Table.into_iden(),
            Orders::Table.into_iden(),
            Addresses::Table.into_iden(),
            Customers::Table.into_iden(),
            ProductPromotions::Table.into_iden(),
            Products::Table.into_iden(),
            Collections::Table.into_iden(),
            Promotions::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn featured_product_fk() -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name("fk_collections_featured_product")
        .from(Collections::Table, Collections::FeaturedProductId)
        .to(Products::Table, Products::Id)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

#[derive(DeriveIden)]
enum Promotions {
    Table,
    Id,
    Description,
    Discount,
}

#[derive(DeriveIden)]
enum Collections {
    Table,
    Id,
    Title,
    FeaturedProductId,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Title,
    Slug,
    Description,
    UnitPrice,
    Inventory,
    LastUpdate,
    CollectionId,
}

#[derive(DeriveIden)]
enum ProductPromotions {
    Table,
    ProductId,
    PromotionId,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    BirthDate,
    Membership,
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    CustomerId,
    Street,
    City,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    PlacedAt,
    PaymentStatus,
    CustomerId,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    Quantity,
    UnitPrice,
}

#[derive(DeriveIden)]
enum Carts {
    Table,
    Id,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CartItems {
    Table,
    Id,
    CartId,
    ProductId,
    Quantity,
}
