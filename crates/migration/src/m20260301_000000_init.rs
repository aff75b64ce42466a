//! Initial schema.
//!
//! - `users`: owners of every other row, keyed by the identity provider id
//! - `incomes` / `expenses`: money in and out, with a frequency and a date
//! - `categories`: budget envelopes with a share of the monthly income
//! - `monthly_budget_plans`: planned items per category and month
//! - `savings_goals` / `emergency_funds`: savings tracking

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Currency,
    CreatedAt,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    UserId,
    Source,
    AmountMinor,
    Frequency,
    Date,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    Description,
    AmountMinor,
    CategoryId,
    Frequency,
    Date,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    NameNorm,
    Color,
    BudgetPercent,
    Position,
}

#[derive(Iden)]
enum MonthlyBudgetPlans {
    Table,
    UserId,
    MonthKey,
    Plan,
    GrandTotalMinor,
    UpdatedAt,
}

#[derive(Iden)]
enum SavingsGoals {
    Table,
    Id,
    UserId,
    Name,
    GoalMinor,
    SavedMinor,
    Achieved,
    TargetDate,
    MonthlyCommitmentMinor,
    CreatedAt,
}

#[derive(Iden)]
enum EmergencyFunds {
    Table,
    UserId,
    GoalMinor,
    CurrentMinor,
}

fn user_fk(name: &str, table: impl IntoIden + 'static, column: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Incomes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Incomes::UserId).string().not_null())
                    .col(ColumnDef::new(Incomes::Source).string().not_null())
                    .col(ColumnDef::new(Incomes::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Incomes::Frequency).string())
                    .col(ColumnDef::new(Incomes::Date).string())
                    .col(
                        ColumnDef::new(Incomes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk-incomes-user_id",
                        Incomes::Table,
                        Incomes::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Color).string().not_null())
                    .col(
                        ColumnDef::new(Categories::BudgetPercent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Categories::Position).big_integer().not_null())
                    .foreign_key(&mut user_fk(
                        "fk-categories-user_id",
                        Categories::Table,
                        Categories::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // `category_id` is a loose reference: deleting a category keeps its
        // expenses, which then count as uncategorized.
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string())
                    .col(ColumnDef::new(Expenses::Frequency).string())
                    .col(ColumnDef::new(Expenses::Date).string())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk-expenses-user_id",
                        Expenses::Table,
                        Expenses::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-category_id")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MonthlyBudgetPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthlyBudgetPlans::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MonthlyBudgetPlans::MonthKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MonthlyBudgetPlans::Plan).text().not_null())
                    .col(
                        ColumnDef::new(MonthlyBudgetPlans::GrandTotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MonthlyBudgetPlans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MonthlyBudgetPlans::UserId)
                            .col(MonthlyBudgetPlans::MonthKey),
                    )
                    .foreign_key(&mut user_fk(
                        "fk-monthly_budget_plans-user_id",
                        MonthlyBudgetPlans::Table,
                        MonthlyBudgetPlans::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavingsGoals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsGoals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingsGoals::UserId).string().not_null())
                    .col(ColumnDef::new(SavingsGoals::Name).string().not_null())
                    .col(ColumnDef::new(SavingsGoals::GoalMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(SavingsGoals::SavedMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::Achieved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SavingsGoals::TargetDate).string())
                    .col(
                        ColumnDef::new(SavingsGoals::MonthlyCommitmentMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk-savings_goals-user_id",
                        SavingsGoals::Table,
                        SavingsGoals::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmergencyFunds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmergencyFunds::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmergencyFunds::GoalMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EmergencyFunds::CurrentMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(&mut user_fk(
                        "fk-emergency_funds-user_id",
                        EmergencyFunds::Table,
                        EmergencyFunds::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse order of creation.
        manager
            .drop_table(Table::drop().table(EmergencyFunds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonthlyBudgetPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
