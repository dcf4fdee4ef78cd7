use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Institutions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Institutions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Institutions::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Institutions::Description).text().not_null())
                    .col(
                        ColumnDef::new(Institutions::Type)
                            .string_len(50)
                            .not_null()
                            .default("foundation"),
                    )
                    .col(
                        ColumnDef::new(Institutions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Institutions::Table)
                    .col(Institutions::Type)
                    .name("idx_institutions_type")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InstitutionCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstitutionCategories::InstitutionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstitutionCategories::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(InstitutionCategories::InstitutionId)
                            .col(InstitutionCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                InstitutionCategories::Table,
                                InstitutionCategories::InstitutionId,
                            )
                            .to(Institutions::Table, Institutions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                InstitutionCategories::Table,
                                InstitutionCategories::CategoryId,
                            )
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstitutionCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Institutions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Institutions {
    Table,
    Id,
    Name,
    Description,
    Type,
    CreatedAt,
}

#[derive(Iden)]
enum InstitutionCategories {
    Table,
    InstitutionId,
    CategoryId,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}
