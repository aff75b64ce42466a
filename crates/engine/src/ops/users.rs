use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*, sea_query::OnConflict,
};

use crate::{
    Category, Currency, DEFAULT_CATEGORIES, EngineError, ResultEngine, User, categories,
    emergency_funds, users, util::normalize_category_key,
};

use super::{Engine, with_tx};

impl Engine {
    /// Return the user, creating it on first sight.
    ///
    /// A new user gets the default currency, the 50/30/20 categories and an
    /// empty emergency fund.
    pub async fn ensure_user(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.require_user(&db_tx, user_id).await)
    }

    pub async fn set_currency(&self, user_id: &str, code: &str) -> ResultEngine<User> {
        let currency = Currency::try_from(code)?;
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let active = users::ActiveModel {
                id: ActiveValue::Unchanged(user.id.clone()),
                currency: ActiveValue::Set(currency.code().to_string()),
                created_at: ActiveValue::NotSet,
            };
            active.update(&db_tx).await?;
            Ok(User { currency, ..user })
        })
    }

    pub(super) async fn require_user(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<User> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(EngineError::InvalidId("user id must not be empty".to_string()));
        }
        if let Some(model) = users::Entity::find_by_id(user_id.to_string())
            .one(db_tx)
            .await?
        {
            return Ok(model.into());
        }

        let model = users::Model {
            id: user_id.to_string(),
            currency: Currency::DEFAULT_CODE.to_string(),
            created_at: Utc::now(),
        };
        let inserted = users::Entity::insert(users::ActiveModel::from(model.clone()))
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        if inserted == 0 {
            // Created concurrently, seeding belongs to the winner.
            let existing = users::Entity::find_by_id(user_id.to_string())
                .one(db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            return Ok(existing.into());
        }

        Self::seed_user(db_tx, user_id).await?;
        tracing::info!("created user {user_id}");
        Ok(model.into())
    }

    async fn seed_user(db_tx: &DatabaseTransaction, user_id: &str) -> ResultEngine<()> {
        for (position, (name, color, percent)) in DEFAULT_CATEGORIES.into_iter().enumerate() {
            let category = Category::new(name.to_string(), color.to_string(), percent);
            let mut active: categories::ActiveModel = (&category).into();
            active.user_id = ActiveValue::Set(user_id.to_string());
            active.name_norm = ActiveValue::Set(normalize_category_key(name)?);
            active.position = ActiveValue::Set(position as i64);
            active.insert(db_tx).await?;
        }

        emergency_funds::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            goal_minor: ActiveValue::Set(0),
            current_minor: ActiveValue::Set(0),
        }
        .insert(db_tx)
        .await?;
        Ok(())
    }
}
