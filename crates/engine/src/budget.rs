//! Monthly budget aggregation.
//!
//! Every function here is pure: callers load the user's records, pick a
//! reference month and get back totals and per-category budget status.
//!
//! ## Projection rule
//!
//! Recurring records (monthly, biweekly, annual) are amortized into a monthly
//! run rate no matter which day they were recorded on. One-off records count
//! with their full amount, but only in the month their `date` falls in.
//!
//! The result mixes a projected run rate with actual one-off spend, so it
//! answers "what does this month look like" rather than giving a cash-basis
//! total. Dashboards, the planner and the charts all rely on this exact mix.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, Expense, Frequency, Income, Money, MonthKey};

/// A record that can be projected onto a month.
pub trait MonthlyRecord {
    fn record_id(&self) -> Uuid;
    fn amount(&self) -> Money;
    fn frequency(&self) -> Frequency;
    fn date(&self) -> Option<NaiveDate>;
}

impl MonthlyRecord for Income {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn frequency(&self) -> Frequency {
        self.frequency
    }

    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl MonthlyRecord for Expense {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn frequency(&self) -> Frequency {
        self.frequency
    }

    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// Non-fatal conditions found while aggregating.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BudgetWarning {
    /// Category percentages do not add up to 100.
    PercentTotalMismatch { total: u32 },
    /// A one-off record without a usable date was left out of the month.
    MissingDate { record_id: Uuid },
}

/// Contribution of a single record to `month`.
///
/// Returns `None` for a one-off record without a date: it cannot be placed
/// in any month and is skipped.
pub fn monthly_equivalent<R: MonthlyRecord>(record: &R, month: MonthKey) -> Option<Money> {
    let frequency = record.frequency();
    if let Some(rate) = frequency.monthly_rate(record.amount()) {
        return Some(rate);
    }
    match record.date() {
        Some(date) if month.contains(date) => Some(record.amount()),
        Some(_) => Some(Money::ZERO),
        None => {
            tracing::warn!(
                "one-off record {} has no usable date, skipping it",
                record.record_id()
            );
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub total: Money,
    pub warnings: Vec<BudgetWarning>,
}

/// Sum of the monthly equivalents of `records`.
pub fn monthly_projection<'a, R, I>(records: I, month: MonthKey) -> Projection
where
    R: MonthlyRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut projection = Projection::default();
    for record in records {
        match monthly_equivalent(record, month) {
            Some(amount) => projection.total += amount,
            None => projection.warnings.push(BudgetWarning::MissingDate {
                record_id: record.record_id(),
            }),
        }
    }
    projection
}

/// Budget status of one category for a month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub budget_percent: u8,
    pub budget_amount: Money,
    pub spent: Money,
    /// Negative when the category is overspent.
    pub remaining: Money,
    /// True ratio, may exceed 100.
    pub utilization_percent: f64,
    /// `utilization_percent` clamped to 100, for progress bars.
    pub utilization_capped: f64,
}

/// Per-category budget, spend and utilization, in the order of `categories`.
///
/// Expenses whose `category_id` matches no category do not count towards
/// any of them.
pub fn build_category_summary(
    categories: &[Category],
    monthly_income_total: Money,
    expenses: &[Expense],
    month: MonthKey,
) -> Vec<CategorySummary> {
    categories
        .iter()
        .map(|category| {
            let budget_amount = monthly_income_total.percent(category.budget_percent);
            let spent: Money = expenses
                .iter()
                .filter(|expense| expense.category_id == Some(category.id))
                .filter_map(|expense| monthly_equivalent(expense, month))
                .sum();
            let utilization_percent = spent.ratio_percent(budget_amount);

            CategorySummary {
                category_id: category.id,
                name: category.name.clone(),
                color: category.color.clone(),
                budget_percent: category.budget_percent,
                budget_amount,
                spent,
                remaining: budget_amount - spent,
                utilization_percent,
                utilization_capped: utilization_percent.min(100.0),
            }
        })
        .collect()
}

/// Warns when the percentages of `categories` do not add up to 100.
pub fn check_percent_total(categories: &[Category]) -> Option<BudgetWarning> {
    let total: u32 = categories
        .iter()
        .map(|category| u32::from(category.budget_percent))
        .sum();
    (total != 100).then_some(BudgetWarning::PercentTotalMismatch { total })
}

/// Everything the dashboard shows for a month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub total_income: Money,
    pub total_expenses: Money,
    /// Budgets are allocated from the whole monthly income.
    pub total_budgeted: Money,
    pub categories: Vec<CategorySummary>,
    /// Spend of expenses without a (still existing) category.
    pub uncategorized_spent: Money,
    pub warnings: Vec<BudgetWarning>,
}

pub fn summarize_month(
    income: &[Income],
    expenses: &[Expense],
    categories: &[Category],
    month: MonthKey,
) -> MonthlySummary {
    let income_projection = monthly_projection(income, month);
    let expense_projection = monthly_projection(expenses, month);
    let summaries = build_category_summary(categories, income_projection.total, expenses, month);

    let known: HashSet<Uuid> = categories.iter().map(|category| category.id).collect();
    let uncategorized_spent = expenses
        .iter()
        .filter(|expense| !expense.category_id.is_some_and(|id| known.contains(&id)))
        .filter_map(|expense| monthly_equivalent(expense, month))
        .sum();

    let mut warnings = Vec::new();
    warnings.extend(check_percent_total(categories));
    warnings.extend(income_projection.warnings);
    warnings.extend(expense_projection.warnings);

    MonthlySummary {
        month,
        total_income: income_projection.total,
        total_expenses: expense_projection.total,
        total_budgeted: income_projection.total,
        categories: summaries,
        uncategorized_spent,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn month() -> MonthKey {
        MonthKey::new(2025, 8).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn income(amount: i64, frequency: Frequency, date: Option<NaiveDate>) -> Income {
        Income {
            id: Uuid::new_v4(),
            source: "Salary".to_string(),
            amount: Money::new(amount),
            frequency,
            date,
            created_at: Utc::now(),
        }
    }

    fn expense(
        amount: i64,
        category_id: Option<Uuid>,
        frequency: Frequency,
        date: Option<NaiveDate>,
    ) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            description: "Groceries".to_string(),
            amount: Money::new(amount),
            category_id,
            frequency,
            date,
            created_at: Utc::now(),
        }
    }

    fn category(name: &str, percent: u8) -> Category {
        Category::new(name.to_string(), "#3b82f6".to_string(), percent)
    }

    fn fifty_thirty_twenty() -> Vec<Category> {
        vec![
            category("Needs", 50),
            category("Wants", 30),
            category("Savings", 20),
        ]
    }

    #[test]
    fn monthly_records_ignore_reference_month() {
        let salary = income(2_500_000, Frequency::Monthly, date(2020, 1, 1));
        for m in 1..=12 {
            let key = MonthKey::new(2025, m).unwrap();
            assert_eq!(monthly_equivalent(&salary, key), Some(Money::new(2_500_000)));
        }
        let undated = income(1_000, Frequency::Monthly, None);
        assert_eq!(monthly_equivalent(&undated, month()), Some(Money::new(1_000)));
    }

    #[test]
    fn biweekly_is_26_over_12() {
        let pay = income(100_000, Frequency::Biweekly, None);
        assert_eq!(monthly_equivalent(&pay, month()), Some(Money::new(216_667)));
    }

    #[test]
    fn annual_is_one_twelfth() {
        let bonus = income(120_000, Frequency::Annual, date(2024, 12, 20));
        assert_eq!(monthly_equivalent(&bonus, month()), Some(Money::new(10_000)));
    }

    #[test]
    fn one_off_counts_only_inside_its_month() {
        let inside = expense(150_000, None, Frequency::OneOff, date(2025, 8, 5));
        let other_month = expense(150_000, None, Frequency::OneOff, date(2025, 7, 31));
        let other_year = expense(150_000, None, Frequency::OneOff, date(2024, 8, 5));

        assert_eq!(monthly_equivalent(&inside, month()), Some(Money::new(150_000)));
        assert_eq!(monthly_equivalent(&other_month, month()), Some(Money::ZERO));
        assert_eq!(monthly_equivalent(&other_year, month()), Some(Money::ZERO));
    }

    #[test]
    fn undated_one_off_is_skipped_and_reported() {
        let undated = income(50_000, Frequency::OneOff, None);
        let salary = income(100_000, Frequency::Monthly, None);
        let projection = monthly_projection(&[undated.clone(), salary], month());

        assert_eq!(projection.total, Money::new(100_000));
        assert_eq!(
            projection.warnings,
            vec![BudgetWarning::MissingDate {
                record_id: undated.id
            }]
        );
    }

    #[test]
    fn zero_income_gives_zero_budgets_and_utilization() {
        let categories = fifty_thirty_twenty();
        let expenses = vec![expense(
            10_000,
            Some(categories[0].id),
            Frequency::Monthly,
            None,
        )];
        let summary = build_category_summary(&categories, Money::ZERO, &expenses, month());

        for entry in &summary {
            assert_eq!(entry.budget_amount, Money::ZERO);
            assert_eq!(entry.utilization_percent, 0.0);
            assert_eq!(entry.utilization_capped, 0.0);
        }
        assert_eq!(summary[0].spent, Money::new(10_000));
        assert_eq!(summary[0].remaining, Money::new(-10_000));
    }

    #[test]
    fn overspend_is_surfaced_not_clamped() {
        let needs = category("Needs", 100);
        let expenses = vec![expense(
            150_000,
            Some(needs.id),
            Frequency::OneOff,
            date(2025, 8, 10),
        )];
        let summary = build_category_summary(&[needs], Money::new(100_000), &expenses, month());

        assert_eq!(summary[0].budget_amount, Money::new(100_000));
        assert_eq!(summary[0].spent, Money::new(150_000));
        assert_eq!(summary[0].remaining, Money::new(-50_000));
        assert_eq!(summary[0].utilization_percent, 150.0);
        assert_eq!(summary[0].utilization_capped, 100.0);
    }

    #[test]
    fn fifty_thirty_twenty_end_to_end() {
        let categories = fifty_thirty_twenty();
        let income = vec![income(2_500_000, Frequency::Monthly, date(2025, 8, 1))];
        let expenses = vec![expense(
            600_000,
            Some(categories[0].id),
            Frequency::Monthly,
            date(2025, 8, 3),
        )];

        let summary = summarize_month(&income, &expenses, &categories, month());
        assert_eq!(summary.total_income, Money::new(2_500_000));
        assert_eq!(summary.total_expenses, Money::new(600_000));
        assert_eq!(summary.total_budgeted, Money::new(2_500_000));
        assert!(summary.warnings.is_empty());

        let needs = &summary.categories[0];
        assert_eq!(needs.name, "Needs");
        assert_eq!(needs.budget_amount, Money::new(1_250_000));
        assert_eq!(needs.spent, Money::new(600_000));
        assert_eq!(needs.remaining, Money::new(650_000));
        assert_eq!(needs.utilization_percent, 48.0);

        let wants = &summary.categories[1];
        assert_eq!(wants.budget_amount, Money::new(750_000));
        assert_eq!(wants.spent, Money::ZERO);
        assert_eq!(wants.remaining, Money::new(750_000));
        assert_eq!(wants.utilization_percent, 0.0);

        let savings = &summary.categories[2];
        assert_eq!(savings.budget_amount, Money::new(500_000));
        assert_eq!(savings.spent, Money::ZERO);
        assert_eq!(savings.remaining, Money::new(500_000));
        assert_eq!(savings.utilization_percent, 0.0);
    }

    #[test]
    fn spent_sums_individual_equivalents() {
        let needs = category("Needs", 100);
        let expenses = vec![
            expense(100_000, Some(needs.id), Frequency::Biweekly, None),
            expense(100_000, Some(needs.id), Frequency::Biweekly, None),
            expense(1_200, Some(needs.id), Frequency::Annual, None),
        ];
        let summary = build_category_summary(&[needs], Money::new(1_000_000), &expenses, month());
        // 216_667 + 216_667 + 100, each rounded on its own.
        assert_eq!(summary[0].spent, Money::new(433_434));
    }

    #[test]
    fn dangling_category_reference_is_uncategorized() {
        let categories = fifty_thirty_twenty();
        let income = vec![income(1_000_000, Frequency::Monthly, None)];
        let expenses = vec![
            expense(20_000, Some(Uuid::new_v4()), Frequency::Monthly, None),
            expense(5_000, None, Frequency::OneOff, date(2025, 8, 2)),
            expense(7_000, None, Frequency::OneOff, None),
        ];

        let summary = summarize_month(&income, &expenses, &categories, month());
        assert!(summary.categories.iter().all(|c| c.spent == Money::ZERO));
        assert_eq!(summary.uncategorized_spent, Money::new(25_000));
        assert_eq!(summary.total_expenses, Money::new(25_000));
        assert_eq!(
            summary.warnings,
            vec![BudgetWarning::MissingDate {
                record_id: expenses[2].id
            }]
        );
    }

    #[test]
    fn output_follows_category_order() {
        let categories = vec![
            category("Zeta", 10),
            category("Alpha", 40),
            category("Mid", 50),
        ];
        let summary = build_category_summary(&categories, Money::new(100), &[], month());
        let names: Vec<_> = summary.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn percent_total_mismatch_is_a_warning() {
        assert_eq!(check_percent_total(&fifty_thirty_twenty()), None);
        let lopsided = vec![category("Needs", 60), category("Wants", 30)];
        assert_eq!(
            check_percent_total(&lopsided),
            Some(BudgetWarning::PercentTotalMismatch { total: 90 })
        );

        let income = vec![income(100_000, Frequency::Monthly, None)];
        let summary = summarize_month(&income, &[], &lopsided, month());
        assert_eq!(summary.categories[0].budget_amount, Money::new(60_000));
        assert_eq!(
            summary.warnings,
            vec![BudgetWarning::PercentTotalMismatch { total: 90 }]
        );
    }

    #[test]
    fn summary_is_idempotent() {
        let categories = fifty_thirty_twenty();
        let expenses = vec![
            expense(123_456, Some(categories[1].id), Frequency::Biweekly, None),
            expense(9_999, Some(categories[2].id), Frequency::OneOff, date(2025, 8, 9)),
        ];
        let first = build_category_summary(&categories, Money::new(987_654), &expenses, month());
        let second = build_category_summary(&categories, Money::new(987_654), &expenses, month());
        assert_eq!(first, second);
    }
}
