use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, Frequency, Money, ResultEngine, expenses,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpense {
    pub description: String,
    pub amount: Money,
    pub category_id: Option<Uuid>,
    pub frequency: Frequency,
    pub date: Option<NaiveDate>,
}

impl Engine {
    /// Expenses of the user by date, newest first. Undated ones go last.
    pub async fn list_expenses(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            Self::load_expenses(&db_tx, user_id).await
        })
    }

    /// Expenses attached to one category of the user.
    pub async fn list_category_expenses(
        &self,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;
            let expenses = Self::load_expenses(&db_tx, user_id).await?;
            Ok(expenses
                .into_iter()
                .filter(|expense| expense.category_id == Some(category_id))
                .collect())
        })
    }

    /// Store a new expense. A `category_id` must belong to the user.
    pub async fn add_expense(&self, user_id: &str, new: NewExpense) -> ResultEngine<Expense> {
        let description = normalize_required_name(&new.description, "expense description")?;
        let expense = Expense::new(
            description,
            new.amount,
            new.category_id,
            new.frequency,
            new.date,
        )?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            if let Some(category_id) = expense.category_id {
                self.require_category(&db_tx, user_id, category_id).await?;
            }
            let mut active: expenses::ActiveModel = (&expense).into();
            active.user_id = ActiveValue::Set(user_id.trim().to_string());
            active.insert(&db_tx).await?;
            tracing::debug!("user {user_id}: added expense {}", expense.id);
            Ok(expense)
        })
    }

    pub async fn delete_expense(&self, user_id: &str, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = expenses::Entity::delete_many()
                .filter(expenses::Column::Id.eq(expense_id.to_string()))
                .filter(expenses::Column::UserId.eq(user_id.trim()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }
            Ok(())
        })
    }

    pub(super) async fn load_expenses(
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id.trim()))
            .order_by_desc(expenses::Column::CreatedAt)
            .all(db_tx)
            .await?;
        let mut expenses: Vec<Expense> = models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                Expense::try_from(model)
                    .inspect_err(|err| tracing::warn!("skipping expense {id}: {err}"))
                    .ok()
            })
            .collect();
        // `None` sorts below any date, so undated rows end up last. Ties keep
        // the creation order.
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }
}
