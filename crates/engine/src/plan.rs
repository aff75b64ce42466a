//! Detailed monthly budget plans.
//!
//! A plan lists, per category, the items the user expects to pay in a month.
//! Saving a plan replaces the previous one for the same month wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedItem {
    pub name: String,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPlan {
    pub items: Vec<PlannedItem>,
    pub total: Money,
}

/// Raw planner row as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItemDraft {
    pub category_id: Uuid,
    pub name: String,
    pub amount: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBudgetPlan {
    pub categories: BTreeMap<Uuid, CategoryPlan>,
    pub grand_total: Money,
}

impl MonthlyBudgetPlan {
    /// Builds a plan from planner rows.
    ///
    /// Every id in `category_ids` gets an entry, even when empty. Rows with a
    /// blank name, a blank or unparseable amount, an amount outside
    /// `0..=Money::MAX_RECORD` or an unknown category are dropped.
    pub fn from_items(
        category_ids: &[Uuid],
        drafts: impl IntoIterator<Item = PlanItemDraft>,
    ) -> Self {
        let mut categories: BTreeMap<Uuid, CategoryPlan> = category_ids
            .iter()
            .map(|id| (*id, CategoryPlan::default()))
            .collect();

        for draft in drafts {
            let name = draft.name.trim();
            if name.is_empty() {
                continue;
            }
            let Ok(amount) = draft.amount.parse::<Money>() else {
                continue;
            };
            if amount.is_negative() || amount > Money::MAX_RECORD {
                continue;
            }
            let Some(plan) = categories.get_mut(&draft.category_id) else {
                tracing::debug!("dropping plan item for unknown category {}", draft.category_id);
                continue;
            };
            plan.items.push(PlannedItem {
                name: name.to_string(),
                amount,
            });
            plan.total += amount;
        }

        let grand_total = categories.values().map(|plan| plan.total).sum();
        Self {
            categories,
            grand_total,
        }
    }

    pub fn category(&self, id: &Uuid) -> Option<&CategoryPlan> {
        self.categories.get(id)
    }
}
