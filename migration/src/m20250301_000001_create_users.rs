use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Mobile,
    FirstName,
    LastName,
    Email,
    Verified,
    DeviceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// The unique constraint on `mobile` doubles as its lookup index.
fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Users::Mobile)
                .string_len(32)
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Users::FirstName).string_len(100).not_null().default(""))
        .col(ColumnDef::new(Users::LastName).string_len(100).not_null().default(""))
        .col(ColumnDef::new(Users::Email).string_len(255).not_null().default(""))
        .col(
            ColumnDef::new(Users::Verified)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(Users::DeviceId).string_len(255).not_null().default(""))
        .col(
            ColumnDef::new(Users::CreatedAt)
                .timestamp_with_time_zone()
                .default(Expr::cust("NOW()"))
                .null(),
        )
        .col(
            ColumnDef::new(Users::UpdatedAt)
                .timestamp_with_time_zone()
                .default(Expr::cust("NOW()"))
                .null(),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(users_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}
