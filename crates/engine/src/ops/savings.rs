use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CommitmentFormula, EmergencyFund, EngineError, Money, ResultEngine, SavingsGoal,
    emergency_funds, monthly_projection, monthly_savings_commitment, savings_goals,
    suggested_emergency_goal,
    util::{normalize_required_name, require_amount},
};

use super::{Engine, current_month, today, with_tx};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSavingsGoal {
    pub name: String,
    pub goal: Money,
    pub target_date: Option<NaiveDate>,
    /// Overrides the engine-wide formula for this goal.
    pub formula: Option<CommitmentFormula>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavingsOverview {
    pub goals: Vec<SavingsGoal>,
    pub total_saved: Money,
    pub emergency_fund: EmergencyFund,
    pub emergency_progress_percent: f64,
    /// Three months of the current projected income.
    pub suggested_emergency_goal: Money,
}

impl Engine {
    /// Savings goals of the user, newest first.
    pub async fn list_savings_goals(&self, user_id: &str) -> ResultEngine<Vec<SavingsGoal>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            Self::load_savings_goals(&db_tx, user_id).await
        })
    }

    pub async fn savings_overview(&self, user_id: &str) -> ResultEngine<SavingsOverview> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let goals = Self::load_savings_goals(&db_tx, user_id).await?;
            let emergency_fund = Self::load_emergency_fund(&db_tx, user_id).await?;
            let income = Self::load_income(&db_tx, user_id).await?;
            let monthly_income = monthly_projection(&income, current_month()).total;

            Ok(SavingsOverview {
                total_saved: goals.iter().map(|goal| goal.saved).sum(),
                goals,
                emergency_progress_percent: emergency_fund.progress_percent(),
                emergency_fund,
                suggested_emergency_goal: suggested_emergency_goal(monthly_income),
            })
        })
    }

    /// Create a goal. With a target date the suggested monthly deposit is
    /// computed right away.
    pub async fn add_savings_goal(
        &self,
        user_id: &str,
        new: NewSavingsGoal,
    ) -> ResultEngine<SavingsGoal> {
        let name = normalize_required_name(&new.name, "savings goal")?;
        let formula = new.formula.unwrap_or(self.commitment_formula);
        let commitment = new.target_date.map_or(Money::ZERO, |target| {
            monthly_savings_commitment(new.goal, Money::ZERO, target, today(), formula)
        });
        let goal = SavingsGoal::new(name, new.goal, new.target_date, commitment)?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let mut active: savings_goals::ActiveModel = (&goal).into();
            active.user_id = ActiveValue::Set(user_id.trim().to_string());
            active.insert(&db_tx).await?;
            Ok(goal)
        })
    }

    /// Register a deposit towards a goal.
    pub async fn pay_savings_goal(
        &self,
        user_id: &str,
        goal_id: Uuid,
        amount: Money,
    ) -> ResultEngine<SavingsGoal> {
        with_tx!(self, |db_tx| {
            let model = savings_goals::Entity::find_by_id(goal_id.to_string())
                .filter(savings_goals::Column::UserId.eq(user_id.trim()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("savings goal not exists".to_string()))?;
            let mut goal = SavingsGoal::try_from(model)?;
            let was_achieved = goal.achieved;
            goal.record_payment(amount)?;

            savings_goals::ActiveModel {
                id: ActiveValue::Unchanged(goal.id.to_string()),
                saved_minor: ActiveValue::Set(goal.saved.minor()),
                achieved: ActiveValue::Set(goal.achieved),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            if goal.achieved && !was_achieved {
                tracing::info!("user {user_id}: savings goal {} achieved", goal.id);
            }
            Ok(goal)
        })
    }

    pub async fn delete_savings_goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = savings_goals::Entity::delete_many()
                .filter(savings_goals::Column::Id.eq(goal_id.to_string()))
                .filter(savings_goals::Column::UserId.eq(user_id.trim()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(
                    "savings goal not exists".to_string(),
                ));
            }
            Ok(())
        })
    }

    pub async fn emergency_fund(&self, user_id: &str) -> ResultEngine<EmergencyFund> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            Self::load_emergency_fund(&db_tx, user_id).await
        })
    }

    /// Update the goal and/or the current amount of the emergency fund.
    pub async fn update_emergency_fund(
        &self,
        user_id: &str,
        goal: Option<Money>,
        current: Option<Money>,
    ) -> ResultEngine<EmergencyFund> {
        for amount in goal.iter().chain(current.iter()) {
            require_amount(*amount, "emergency fund amount")?;
        }
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let mut fund = Self::load_emergency_fund(&db_tx, user_id).await?;
            fund.goal = goal.unwrap_or(fund.goal);
            fund.current = current.unwrap_or(fund.current);

            let active = emergency_funds::ActiveModel {
                user_id: ActiveValue::Set(user_id.trim().to_string()),
                goal_minor: ActiveValue::Set(fund.goal.minor()),
                current_minor: ActiveValue::Set(fund.current.minor()),
            };
            emergency_funds::Entity::insert(active)
                .on_conflict(
                    OnConflict::column(emergency_funds::Column::UserId)
                        .update_columns([
                            emergency_funds::Column::GoalMinor,
                            emergency_funds::Column::CurrentMinor,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&db_tx)
                .await?;
            Ok(fund)
        })
    }

    async fn load_savings_goals(
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<SavingsGoal>> {
        let models = savings_goals::Entity::find()
            .filter(savings_goals::Column::UserId.eq(user_id.trim()))
            .order_by_desc(savings_goals::Column::CreatedAt)
            .all(db_tx)
            .await?;
        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                SavingsGoal::try_from(model)
                    .inspect_err(|err| tracing::warn!("skipping savings goal {id}: {err}"))
                    .ok()
            })
            .collect())
    }

    async fn load_emergency_fund(
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<EmergencyFund> {
        Ok(emergency_funds::Entity::find_by_id(user_id.trim().to_string())
            .one(db_tx)
            .await?
            .map(EmergencyFund::from)
            .unwrap_or_default())
    }
}
