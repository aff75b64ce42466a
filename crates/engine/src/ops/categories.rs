use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    BudgetWarning, Category, EngineError, ResultEngine, categories, check_percent_total,
    util::{normalize_category_key, normalize_color, normalize_required_name},
};

use super::{Engine, with_tx};

fn require_percent(percent: u8) -> ResultEngine<u8> {
    if percent > 100 {
        return Err(EngineError::InvalidPercent(format!(
            "{percent} is not between 0 and 100"
        )));
    }
    Ok(percent)
}

impl Engine {
    /// Categories of the user in creation order.
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            Self::load_categories(&db_tx, user_id).await
        })
    }

    pub async fn category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await
        })
    }

    /// Add a category. Names are unique per user, ignoring case and accents.
    pub async fn create_category(
        &self,
        user_id: &str,
        name: &str,
        color: &str,
        budget_percent: u8,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_category_key(&name)?;
        let color = normalize_color(color)?;
        let budget_percent = require_percent(budget_percent)?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let user_id = user_id.trim();

            let exists = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let last_position: Option<i64> = categories::Entity::find()
                .select_only()
                .column_as(categories::Column::Position.max(), "max_position")
                .filter(categories::Column::UserId.eq(user_id))
                .into_tuple::<Option<i64>>()
                .one(&db_tx)
                .await?
                .flatten();

            let category = Category::new(name, color, budget_percent);
            let mut active: categories::ActiveModel = (&category).into();
            active.user_id = ActiveValue::Set(user_id.to_string());
            active.name_norm = ActiveValue::Set(name_norm);
            active.position = ActiveValue::Set(last_position.map_or(0, |p| p + 1));
            active.insert(&db_tx).await?;
            Ok(category)
        })
    }

    /// Set the budget percentage of several categories at once.
    ///
    /// Totals different from 100 are accepted; the returned warning tells the
    /// caller about it.
    pub async fn update_category_percents(
        &self,
        user_id: &str,
        percents: &HashMap<Uuid, u8>,
    ) -> ResultEngine<Option<BudgetWarning>> {
        for percent in percents.values() {
            require_percent(*percent)?;
        }
        with_tx!(self, |db_tx| {
            for (category_id, percent) in percents {
                self.require_category(&db_tx, user_id, *category_id).await?;
                categories::ActiveModel {
                    id: ActiveValue::Unchanged(category_id.to_string()),
                    budget_percent: ActiveValue::Set(i32::from(*percent)),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }

            let categories = Self::load_categories(&db_tx, user_id).await?;
            let warning = check_percent_total(&categories);
            if let Some(BudgetWarning::PercentTotalMismatch { total }) = &warning {
                tracing::info!("user {user_id}: category percentages add up to {total}");
            }
            Ok(warning)
        })
    }

    pub(super) async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::UserId.eq(user_id.trim()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        Category::try_from(model)
    }

    pub(super) async fn load_categories(
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.trim()))
            .order_by_asc(categories::Column::Position)
            .all(db_tx)
            .await?;
        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                Category::try_from(model)
                    .inspect_err(|err| tracing::warn!("skipping category {id}: {err}"))
                    .ok()
            })
            .collect())
    }
}
