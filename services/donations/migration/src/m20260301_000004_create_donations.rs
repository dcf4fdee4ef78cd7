use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::Quantity).integer().not_null())
                    .col(ColumnDef::new(Donations::InstitutionId).integer().not_null())
                    .col(ColumnDef::new(Donations::Address).string_len(255).not_null())
                    .col(ColumnDef::new(Donations::City).string_len(255).not_null())
                    .col(ColumnDef::new(Donations::ZipCode).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Donations::PhoneNumber)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Donations::PickUpDate).date().not_null())
                    .col(ColumnDef::new(Donations::PickUpTime).time().not_null())
                    .col(ColumnDef::new(Donations::PickUpComment).text())
                    .col(ColumnDef::new(Donations::UserId).uuid())
                    .col(
                        ColumnDef::new(Donations::IsTakenByUser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Donations::IsTakenByCourier)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Donations::CourierId).uuid())
                    .col(
                        ColumnDef::new(Donations::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Donations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Donations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Donations::Quantity).gte(1))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Donations::Table, Donations::InstitutionId)
                            .to(Institutions::Table, Institutions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Donations::Table, Donations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Donations::Table, Donations::CourierId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Donations::Table)
                    .col(Donations::PickUpDate)
                    .col(Donations::PickUpTime)
                    .name("idx_donations_pick_up")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Donations::Table)
                    .col(Donations::UserId)
                    .name("idx_donations_user_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DonationCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DonationCategories::DonationId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DonationCategories::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DonationCategories::DonationId)
                            .col(DonationCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DonationCategories::Table, DonationCategories::DonationId)
                            .to(Donations::Table, Donations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DonationCategories::Table, DonationCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DonationCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Donations {
    Table,
    Id,
    Quantity,
    InstitutionId,
    Address,
    City,
    ZipCode,
    PhoneNumber,
    PickUpDate,
    PickUpTime,
    PickUpComment,
    UserId,
    IsTakenByUser,
    IsTakenByCourier,
    CourierId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DonationCategories {
    Table,
    DonationId,
    CategoryId,
}

#[derive(Iden)]
enum Institutions {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
