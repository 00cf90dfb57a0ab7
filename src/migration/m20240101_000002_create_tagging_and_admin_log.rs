use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tags::Label).string_len(255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaggedItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaggedItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaggedItems::TagId).integer().not_null())
                    .col(ColumnDef::new(TaggedItems::EntityKind).string_len(32).not_null())
                    .col(ColumnDef::new(TaggedItems::ObjectId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tagged_items_tag")
                            .from(TaggedItems::Table, TaggedItems::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tagged_items_object")
                    .table(TaggedItems::Table)
                    .col(TaggedItems::EntityKind)
                    .col(TaggedItems::ObjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_tagged_items_tag_object")
                    .table(TaggedItems::Table)
                    .col(TaggedItems::TagId)
                    .col(TaggedItems::EntityKind)
                    .col(TaggedItems::ObjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminLogEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminLogEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdminLogEntries::ActionTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdminLogEntries::ActionFlag)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdminLogEntries::EntityKind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminLogEntries::ObjectId).integer().null())
                    .col(
                        ColumnDef::new(AdminLogEntries::ObjectRepr)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminLogEntries::ChangeMessage).text().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminLogEntries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaggedItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Label,
}

#[derive(DeriveIden)]
enum TaggedItems {
    Table,
    Id,
    TagId,
    EntityKind,
    ObjectId,
}

#[derive(DeriveIden)]
enum AdminLogEntries {
    Table,
    Id,
    ActionTime,
    ActionFlag,
    EntityKind,
    ObjectId,
    ObjectRepr,
    ChangeMessage,
}
