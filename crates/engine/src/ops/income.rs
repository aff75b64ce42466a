use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Frequency, Income, Money, ResultEngine, income,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIncome {
    pub source: String,
    pub amount: Money,
    pub frequency: Frequency,
    pub date: Option<NaiveDate>,
}

impl Engine {
    /// Income records of the user, newest first.
    pub async fn list_income(&self, user_id: &str) -> ResultEngine<Vec<Income>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            Self::load_income(&db_tx, user_id).await
        })
    }

    pub async fn add_income(&self, user_id: &str, new: NewIncome) -> ResultEngine<Income> {
        let source = normalize_required_name(&new.source, "income source")?;
        let income = Income::new(source, new.amount, new.frequency, new.date)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let mut active: income::ActiveModel = (&income).into();
            active.user_id = ActiveValue::Set(user_id.trim().to_string());
            active.insert(&db_tx).await?;
            tracing::debug!("user {user_id}: added income {}", income.id);
            Ok(income)
        })
    }

    pub async fn delete_income(&self, user_id: &str, income_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = income::Entity::delete_many()
                .filter(income::Column::Id.eq(income_id.to_string()))
                .filter(income::Column::UserId.eq(user_id.trim()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("income not exists".to_string()));
            }
            Ok(())
        })
    }

    pub(super) async fn load_income(
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Income>> {
        let models = income::Entity::find()
            .filter(income::Column::UserId.eq(user_id.trim()))
            .order_by_desc(income::Column::CreatedAt)
            .all(db_tx)
            .await?;
        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                Income::try_from(model)
                    .inspect_err(|err| tracing::warn!("skipping income {id}: {err}"))
                    .ok()
            })
            .collect())
    }
}
