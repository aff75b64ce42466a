pub use budget::{
    BudgetWarning, CategorySummary, MonthlyRecord, MonthlySummary, Projection,
    build_category_summary, check_percent_total, monthly_equivalent, monthly_projection,
    summarize_month,
};
pub use categories::{Category, DEFAULT_CATEGORIES, UNCATEGORIZED_COLOR, UNCATEGORIZED_NAME};
pub use currency::Currency;
pub use emergency_funds::EmergencyFund;
pub use error::EngineError;
pub use expenses::Expense;
pub use frequency::Frequency;
pub use income::Income;
pub use money::Money;
pub use month::MonthKey;
pub use ops::{
    BudgetPlanner, Dashboard, Engine, EngineBuilder, NewExpense, NewIncome, NewSavingsGoal,
    PlannerCategory, SavingsOverview,
};
pub use plan::{CategoryPlan, MonthlyBudgetPlan, PlanItemDraft, PlannedItem};
pub use profile::{DecisionTree, Prediction, ProfileClassifier, ProfileFeatures, ProfileModel};
pub use savings::{CommitmentFormula, monthly_savings_commitment, suggested_emergency_goal};
pub use savings_goals::SavingsGoal;
pub use users::User;

mod budget;
mod budget_plans;
mod categories;
mod currency;
mod emergency_funds;
mod error;
mod expenses;
mod frequency;
mod income;
mod money;
mod month;
mod ops;
mod plan;
mod profile;
mod savings;
mod savings_goals;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
