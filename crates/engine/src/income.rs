//! Income records.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Frequency, Money, ResultEngine,
    util::{format_date, parse_stored_date, parse_uuid, require_amount},
};

/// Money coming in: a salary, a side job, a one-off sale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub source: String,
    pub amount: Money,
    pub frequency: Frequency,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Income {
    pub fn new(
        source: String,
        amount: Money,
        frequency: Frequency,
        date: Option<NaiveDate>,
    ) -> ResultEngine<Self> {
        require_amount(amount, "income amount")?;
        Ok(Self {
            id: Uuid::new_v4(),
            source,
            amount,
            frequency,
            date,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub source: String,
    pub amount_minor: i64,
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

impl From<&Income> for ActiveModel {
    fn from(income: &Income) -> Self {
        Self {
            id: ActiveValue::Set(income.id.to_string()),
            user_id: ActiveValue::NotSet,
            source: ActiveValue::Set(income.source.clone()),
            amount_minor: ActiveValue::Set(income.amount.minor()),
            frequency: ActiveValue::Set(Some(income.frequency.as_str().to_string())),
            date: ActiveValue::Set(income.date.map(format_date)),
            created_at: ActiveValue::Set(income.created_at),
        }
    }
}

impl TryFrom<Model> for Income {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        require_amount(Money::new(model.amount_minor), "income amount")?;
        Ok(Self {
            id: parse_uuid(&model.id, "income")?,
            frequency: stored_frequency(model.frequency.as_deref(), &model.id),
            date: parse_stored_date(model.date.as_deref(), &model.id),
            source: model.source,
            amount: Money::new(model.amount_minor),
            created_at: model.created_at,
        })
    }
}

/// Missing or unknown stored frequencies count as one-off.
pub(crate) fn stored_frequency(value: Option<&str>, record_id: &str) -> Frequency {
    match value.map(Frequency::try_from) {
        None => Frequency::OneOff,
        Some(Ok(frequency)) => frequency,
        Some(Err(err)) => {
            tracing::warn!("record {record_id}: {err}, treating as one-off");
            Frequency::OneOff
        }
    }
}
