use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a record repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    #[serde(alias = "ocasional")]
    OneOff,
    #[serde(alias = "quincenal")]
    Biweekly,
    #[serde(alias = "mensual")]
    Monthly,
    #[serde(alias = "anual")]
    Annual,
}

/// `?month=YYYY-MM`, current month when absent.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

pub mod income {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub source: String,
        pub amount_minor: i64,
        #[serde(default)]
        pub frequency: Frequency,
        /// Required for one-off income to show up in a month.
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: Uuid,
        pub source: String,
        pub amount_minor: i64,
        pub frequency: Frequency,
        pub date: Option<NaiveDate>,
        /// Contribution to the current month, 0 for an undated one-off.
        pub monthly_value_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeListResponse {
        pub income: Vec<IncomeView>,
        /// Projected income of the current month.
        pub monthly_total_minor: i64,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        #[serde(default)]
        pub frequency: Frequency,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        /// "Uncategorized" when the category is missing or gone.
        pub category_name: String,
        pub category_color: String,
        pub frequency: Frequency,
        pub date: Option<NaiveDate>,
    }

    /// Expenses by date, newest first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
        /// Projected spend of the listed expenses in the current month.
        pub monthly_total_minor: i64,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub color: String,
        #[serde(default)]
        pub budget_percent: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub color: String,
        pub budget_percent: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
        pub warning: Option<super::budget::BudgetWarning>,
    }

    /// Category with its expenses.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDetail {
        pub category: CategoryView,
        pub expenses: Vec<super::expense::ExpenseView>,
    }

    /// New percentage per category id.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryRulesUpdate {
        pub percents: HashMap<Uuid, u8>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryRulesResponse {
        pub categories: Vec<CategoryView>,
        pub warning: Option<super::budget::BudgetWarning>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum BudgetWarning {
        PercentTotalMismatch { total: u32 },
        MissingDate { record_id: Uuid },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySummaryView {
        pub category_id: Uuid,
        pub name: String,
        pub color: String,
        pub budget_percent: u8,
        pub budget_minor: i64,
        pub spent_minor: i64,
        /// Negative when overspent.
        pub remaining_minor: i64,
        pub utilization_percent: f64,
        /// Clamped to 100, for progress bars.
        pub utilization_capped: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub month: String,
        pub currency: String,
        pub total_income_minor: i64,
        pub total_expenses_minor: i64,
        pub total_budgeted_minor: i64,
        pub uncategorized_spent_minor: i64,
        pub categories: Vec<CategorySummaryView>,
        pub warnings: Vec<BudgetWarning>,
    }

    /// Parallel series for the budget vs. spend chart.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartsResponse {
        pub month: String,
        pub labels: Vec<String>,
        pub colors: Vec<String>,
        pub budget_minor: Vec<i64>,
        pub spent_minor: Vec<i64>,
    }
}

pub mod planner {
    use super::*;

    /// A planner row as typed. Invalid rows are dropped on save.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanItemNew {
        pub category_id: Uuid,
        pub name: String,
        /// Decimal amount, `"1500.50"` or `"1500,50"`.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlannerSave {
        pub items: Vec<PlanItemNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlannedItemView {
        pub name: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlannerCategoryView {
        pub category_id: Uuid,
        pub name: String,
        pub color: String,
        pub budget_percent: u8,
        pub rule_limit_minor: i64,
        pub planned_total_minor: i64,
        pub spent_minor: i64,
        pub items: Vec<PlannedItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlannerResponse {
        pub month: String,
        pub currency: String,
        pub monthly_income_minor: i64,
        pub grand_total_minor: i64,
        pub categories: Vec<PlannerCategoryView>,
    }
}

pub mod savings {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CommitmentFormula {
        FullGoal,
        Outstanding,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsGoalNew {
        pub name: String,
        pub goal_minor: i64,
        pub target_date: Option<NaiveDate>,
        /// Overrides the server default.
        pub formula: Option<CommitmentFormula>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsPayment {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsGoalView {
        pub id: Uuid,
        pub name: String,
        pub goal_minor: i64,
        pub saved_minor: i64,
        pub achieved: bool,
        pub target_date: Option<NaiveDate>,
        pub monthly_commitment_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmergencyFundView {
        pub goal_minor: i64,
        pub current_minor: i64,
        pub progress_percent: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmergencyFundUpdate {
        pub goal_minor: Option<i64>,
        pub current_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsResponse {
        pub goals: Vec<SavingsGoalView>,
        pub total_saved_minor: i64,
        pub emergency_fund: EmergencyFundView,
        pub suggested_emergency_goal_minor: i64,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyUpdate {
        /// ISO 4217 code, e.g. `"MXN"`.
        pub currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub currency: String,
    }
}

pub mod profile {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ProfileRequest {
        pub age: String,
        pub sex: String,
        pub nationality: String,
        pub income_bracket: String,
        pub investment_knowledge: String,
        pub employment_status: String,
    }

    /// `{"profile": "..."}`, or `{"unavailable": true}` without a model.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum ProfileResponse {
        Profile { profile: String },
        Unavailable { unavailable: bool },
    }
}
