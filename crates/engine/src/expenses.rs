//! Expense records.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Frequency, Money, ResultEngine,
    income::stored_frequency,
    util::{format_date, parse_stored_date, parse_uuid, require_amount},
};

/// Money going out, optionally attached to a budget category.
///
/// `category_id` may point to a category that no longer exists; such expenses
/// are reported as uncategorized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: Money,
    pub category_id: Option<Uuid>,
    pub frequency: Frequency,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        description: String,
        amount: Money,
        category_id: Option<Uuid>,
        frequency: Frequency,
        date: Option<NaiveDate>,
    ) -> ResultEngine<Self> {
        require_amount(amount, "expense amount")?;
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount,
            category_id,
            frequency,
            date,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub category_id: Option<String>,
    pub frequency: Option<String>,
    pub date: Option<String>,
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

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            user_id: ActiveValue::NotSet,
            description: ActiveValue::Set(expense.description.clone()),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            category_id: ActiveValue::Set(expense.category_id.map(|id| id.to_string())),
            frequency: ActiveValue::Set(Some(expense.frequency.as_str().to_string())),
            date: ActiveValue::Set(expense.date.map(format_date)),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        require_amount(Money::new(model.amount_minor), "expense amount")?;
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            category_id: stored_category(model.category_id.as_deref(), &model.id),
            frequency: stored_frequency(model.frequency.as_deref(), &model.id),
            date: parse_stored_date(model.date.as_deref(), &model.id),
            description: model.description,
            amount: Money::new(model.amount_minor),
            created_at: model.created_at,
        })
    }
}

/// An unreadable category reference leaves the expense uncategorized.
fn stored_category(value: Option<&str>, record_id: &str) -> Option<Uuid> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            tracing::warn!("record {record_id}: ignoring category id {raw:?}: {err}");
            None
        }
    }
}
