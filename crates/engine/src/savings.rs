//! Savings commitment calculation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Money, MonthKey};

/// How the suggested monthly deposit of a goal is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentFormula {
    /// Spread the whole goal over the remaining months, ignoring what was
    /// already saved.
    #[default]
    FullGoal,
    /// Spread only what is still missing.
    Outstanding,
}

/// Suggested monthly deposit to reach `goal` by `target`.
///
/// Months are counted on the calendar: from August to February is 6, no
/// matter the day. When the target month is the current one or already
/// passed, the whole goal is due now.
pub fn monthly_savings_commitment(
    goal: Money,
    saved: Money,
    target: NaiveDate,
    now: NaiveDate,
    formula: CommitmentFormula,
) -> Money {
    let months_remaining = MonthKey::of(now).months_until(MonthKey::of(target));
    if months_remaining <= 0 {
        return goal;
    }
    let base = match formula {
        CommitmentFormula::FullGoal => goal,
        CommitmentFormula::Outstanding if saved >= goal => Money::ZERO,
        CommitmentFormula::Outstanding => goal - saved,
    };
    base.scale(1, months_remaining)
}

/// Three months of projected income.
pub fn suggested_emergency_goal(monthly_income: Money) -> Money {
    monthly_income.scale(3, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn six_months_ahead() {
        let now = date(2025, 8, 20);
        let target = date(2026, 2, 1);

        assert_eq!(
            monthly_savings_commitment(
                Money::new(1_200_000),
                Money::new(200_000),
                target,
                now,
                CommitmentFormula::FullGoal
            ),
            Money::new(200_000)
        );
        assert_eq!(
            monthly_savings_commitment(
                Money::new(1_200_000),
                Money::new(200_000),
                target,
                now,
                CommitmentFormula::Outstanding
            ),
            Money::new(166_667)
        );
    }

    #[test]
    fn past_or_current_target_requires_full_goal() {
        let now = date(2025, 8, 20);
        for target in [date(2025, 8, 31), date(2025, 3, 1), date(2020, 1, 1)] {
            for formula in [CommitmentFormula::FullGoal, CommitmentFormula::Outstanding] {
                assert_eq!(
                    monthly_savings_commitment(
                        Money::new(50_000),
                        Money::new(10_000),
                        target,
                        now,
                        formula
                    ),
                    Money::new(50_000)
                );
            }
        }
    }

    #[test]
    fn outstanding_never_goes_negative() {
        let commitment = monthly_savings_commitment(
            Money::new(10_000),
            Money::new(15_000),
            date(2026, 1, 1),
            date(2025, 1, 1),
            CommitmentFormula::Outstanding,
        );
        assert_eq!(commitment, Money::ZERO);
    }

    #[test]
    fn formula_names() {
        assert_eq!(
            serde_json::to_string(&CommitmentFormula::FullGoal).unwrap(),
            "\"full_goal\""
        );
        let parsed: CommitmentFormula = serde_json::from_str("\"outstanding\"").unwrap();
        assert_eq!(parsed, CommitmentFormula::Outstanding);
        assert_eq!(CommitmentFormula::default(), CommitmentFormula::FullGoal);
    }

    #[test]
    fn emergency_goal_is_three_months() {
        assert_eq!(
            suggested_emergency_goal(Money::new(2_500_000)),
            Money::new(7_500_000)
        );
    }
}
