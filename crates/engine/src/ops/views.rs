//! Read models combining several tables for one screen.

use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Money, MonthKey, MonthlySummary, PlannedItem, ResultEngine, summarize_month,
};

use super::{Engine, current_month, with_tx};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub currency: Currency,
    pub summary: MonthlySummary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerCategory {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub budget_percent: u8,
    /// Budget allowed by the category percentage.
    pub rule_limit: Money,
    pub planned_total: Money,
    pub spent: Money,
    pub items: Vec<PlannedItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPlanner {
    pub month: MonthKey,
    pub currency: Currency,
    pub monthly_income: Money,
    pub categories: Vec<PlannerCategory>,
    pub grand_total: Money,
}

impl Engine {
    /// Monthly summary of the user, current month by default.
    pub async fn dashboard(
        &self,
        user_id: &str,
        month: Option<MonthKey>,
    ) -> ResultEngine<Dashboard> {
        let month = month.unwrap_or_else(current_month);
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let income = Self::load_income(&db_tx, user_id).await?;
            let expenses = Self::load_expenses(&db_tx, user_id).await?;
            let categories = Self::load_categories(&db_tx, user_id).await?;

            let summary = summarize_month(&income, &expenses, &categories, month);
            for warning in &summary.warnings {
                tracing::debug!("user {user_id}, {month}: {warning:?}");
            }
            Ok(Dashboard {
                currency: user.currency,
                summary,
            })
        })
    }

    /// Saved plan of the month next to each category's limit and spend.
    pub async fn budget_planner(
        &self,
        user_id: &str,
        month: Option<MonthKey>,
    ) -> ResultEngine<BudgetPlanner> {
        let month = month.unwrap_or_else(current_month);
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let income = Self::load_income(&db_tx, user_id).await?;
            let expenses = Self::load_expenses(&db_tx, user_id).await?;
            let categories = Self::load_categories(&db_tx, user_id).await?;
            let mut plan = self.load_plan(&db_tx, user_id, month).await?;

            let summary = summarize_month(&income, &expenses, &categories, month);
            let planner_categories = summary
                .categories
                .into_iter()
                .map(|status| {
                    let planned = plan
                        .categories
                        .remove(&status.category_id)
                        .unwrap_or_default();
                    PlannerCategory {
                        category_id: status.category_id,
                        name: status.name,
                        color: status.color,
                        budget_percent: status.budget_percent,
                        rule_limit: status.budget_amount,
                        planned_total: planned.total,
                        spent: status.spent,
                        items: planned.items,
                    }
                })
                .collect::<Vec<_>>();

            Ok(BudgetPlanner {
                month,
                currency: user.currency,
                monthly_income: summary.total_income,
                grand_total: planner_categories.iter().map(|c| c.planned_total).sum(),
                categories: planner_categories,
            })
        })
    }
}
