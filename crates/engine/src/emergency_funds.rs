//! The emergency fund, one per user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Money;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyFund {
    pub goal: Money,
    pub current: Money,
}

impl EmergencyFund {
    /// Progress towards the goal in percent, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        self.current.ratio_percent(self.goal).min(100.0)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "emergency_funds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub goal_minor: i64,
    pub current_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EmergencyFund {
    fn from(model: Model) -> Self {
        Self {
            goal: Money::new(model.goal_minor),
            current: Money::new(model.current_minor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_capped() {
        let fund = EmergencyFund {
            goal: Money::new(150_000),
            current: Money::new(75_000),
        };
        assert_eq!(fund.progress_percent(), 50.0);

        let over = EmergencyFund {
            goal: Money::new(100),
            current: Money::new(300),
        };
        assert_eq!(over.progress_percent(), 100.0);
        assert_eq!(EmergencyFund::default().progress_percent(), 0.0);
    }
}
