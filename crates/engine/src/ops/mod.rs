use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;

use crate::{CommitmentFormula, MonthKey, ResultEngine};

mod categories;
mod expenses;
mod income;
mod plans;
mod savings;
mod users;
mod views;

pub use expenses::NewExpense;
pub use income::NewIncome;
pub use savings::{NewSavingsGoal, SavingsOverview};
pub use views::{BudgetPlanner, Dashboard, PlannerCategory};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    commitment_formula: CommitmentFormula,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Month used when the caller does not pick one.
fn current_month() -> MonthKey {
    MonthKey::of(today())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    commitment_formula: CommitmentFormula,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How suggested monthly deposits of savings goals are computed.
    pub fn commitment_formula(mut self, formula: CommitmentFormula) -> EngineBuilder {
        self.commitment_formula = formula;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            commitment_formula: self.commitment_formula,
        })
    }
}
