use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*, sea_query::OnConflict,
};

use crate::{MonthKey, MonthlyBudgetPlan, PlanItemDraft, ResultEngine, budget_plans};

use super::{Engine, with_tx};

impl Engine {
    /// The saved plan for `month`, or an empty one per category.
    pub async fn monthly_budget_plan(
        &self,
        user_id: &str,
        month: MonthKey,
    ) -> ResultEngine<MonthlyBudgetPlan> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.load_plan(&db_tx, user_id, month).await
        })
    }

    /// Replace the plan of `month` with the rows in `drafts`.
    pub async fn save_monthly_budget_plan(
        &self,
        user_id: &str,
        month: MonthKey,
        drafts: Vec<PlanItemDraft>,
    ) -> ResultEngine<MonthlyBudgetPlan> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let category_ids: Vec<_> = Self::load_categories(&db_tx, user_id)
                .await?
                .into_iter()
                .map(|category| category.id)
                .collect();
            let plan = MonthlyBudgetPlan::from_items(&category_ids, drafts);

            let active = budget_plans::ActiveModel {
                user_id: ActiveValue::Set(user_id.trim().to_string()),
                month_key: ActiveValue::Set(month.to_string()),
                plan: ActiveValue::Set(serde_json::to_string(&plan)?),
                grand_total_minor: ActiveValue::Set(plan.grand_total.minor()),
                updated_at: ActiveValue::Set(Utc::now()),
            };
            budget_plans::Entity::insert(active)
                .on_conflict(
                    OnConflict::columns([
                        budget_plans::Column::UserId,
                        budget_plans::Column::MonthKey,
                    ])
                    .update_columns([
                        budget_plans::Column::Plan,
                        budget_plans::Column::GrandTotalMinor,
                        budget_plans::Column::UpdatedAt,
                    ])
                    .to_owned(),
                )
                .exec_without_returning(&db_tx)
                .await?;

            tracing::debug!(
                "user {user_id}: saved plan for {month}, total {}",
                plan.grand_total
            );
            Ok(plan)
        })
    }

    pub(super) async fn load_plan(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        month: MonthKey,
    ) -> ResultEngine<MonthlyBudgetPlan> {
        let user_id = user_id.trim();
        let mut plan = match budget_plans::Entity::find_by_id((user_id.to_string(), month.to_string()))
            .one(db_tx)
            .await?
        {
            Some(model) => serde_json::from_str(&model.plan).unwrap_or_else(|err| {
                tracing::warn!("user {user_id}: unreadable plan for {month}: {err}");
                MonthlyBudgetPlan::default()
            }),
            None => MonthlyBudgetPlan::default(),
        };

        // Categories created after the plan was saved still get an entry.
        for category in Self::load_categories(db_tx, user_id).await? {
            plan.categories.entry(category.id).or_default();
        }
        Ok(plan)
    }
}
