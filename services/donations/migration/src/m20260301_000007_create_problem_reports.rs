use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProblemReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProblemReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProblemReports::UserId).uuid())
                    .col(
                        ColumnDef::new(ProblemReports::Subject)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProblemReports::Description).text().not_null())
                    .col(
                        ColumnDef::new(ProblemReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProblemReports::Table, ProblemReports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProblemReports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ProblemReports {
    Table,
    Id,
    UserId,
    Subject,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
