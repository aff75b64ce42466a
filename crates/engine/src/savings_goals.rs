//! Savings goals.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine,
    util::{format_date, parse_stored_date, parse_uuid, require_amount},
};

/// Something the user is saving towards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub goal: Money,
    pub saved: Money,
    pub achieved: bool,
    pub target_date: Option<NaiveDate>,
    /// Suggested monthly deposit, zero when the user did not ask for one.
    pub monthly_commitment: Money,
    pub created_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn new(
        name: String,
        goal: Money,
        target_date: Option<NaiveDate>,
        monthly_commitment: Money,
    ) -> ResultEngine<Self> {
        if !goal.is_positive() {
            return Err(EngineError::InvalidAmount(
                "goal amount must be > 0".to_string(),
            ));
        }
        require_amount(goal, "goal amount")?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            goal,
            saved: Money::ZERO,
            achieved: false,
            target_date,
            monthly_commitment,
            created_at: Utc::now(),
        })
    }

    /// Registers a deposit. The goal is achieved once `saved >= goal`.
    pub fn record_payment(&mut self, amount: Money) -> ResultEngine<()> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        let saved = self
            .saved
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        require_amount(saved, "saved amount")?;
        self.saved = saved;
        self.achieved = self.saved >= self.goal;
        Ok(())
    }

    /// Amount still missing, never negative.
    pub fn outstanding(&self) -> Money {
        if self.saved >= self.goal {
            Money::ZERO
        } else {
            self.goal - self.saved
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub goal_minor: i64,
    pub saved_minor: i64,
    pub achieved: bool,
    pub target_date: Option<String>,
    pub monthly_commitment_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsGoal> for ActiveModel {
    fn from(goal: &SavingsGoal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id.to_string()),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(goal.name.clone()),
            goal_minor: ActiveValue::Set(goal.goal.minor()),
            saved_minor: ActiveValue::Set(goal.saved.minor()),
            achieved: ActiveValue::Set(goal.achieved),
            target_date: ActiveValue::Set(goal.target_date.map(format_date)),
            monthly_commitment_minor: ActiveValue::Set(goal.monthly_commitment.minor()),
            created_at: ActiveValue::Set(goal.created_at),
        }
    }
}

impl TryFrom<Model> for SavingsGoal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        require_amount(Money::new(model.goal_minor), "goal amount")?;
        require_amount(Money::new(model.saved_minor), "saved amount")?;
        Ok(Self {
            id: parse_uuid(&model.id, "savings goal")?,
            target_date: parse_stored_date(model.target_date.as_deref(), &model.id),
            name: model.name,
            goal: Money::new(model.goal_minor),
            saved: Money::new(model.saved_minor),
            achieved: model.achieved,
            monthly_commitment: Money::new(model.monthly_commitment_minor),
            created_at: model.created_at,
        })
    }
}
