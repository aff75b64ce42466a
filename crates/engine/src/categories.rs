//! Budget categories (envelopes) per user.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// Categories seeded for every new user: the 50/30/20 rule.
pub const DEFAULT_CATEGORIES: [(&str, &str, u8); 3] = [
    ("Necesidades", "#3b82f6", 50),
    ("Deseos", "#8b5cf6", 30),
    ("Ahorro e Inversión", "#10b981", 20),
];

/// Label shown for expenses without an existing category.
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
pub const UNCATEGORIZED_COLOR: &str = "#6b7280";

/// A named budget envelope that receives `budget_percent`% of the monthly
/// income.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub budget_percent: u8,
}

impl Category {
    pub fn new(name: String, color: String, budget_percent: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            color,
            budget_percent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
    pub color: String,
    pub budget_percent: i32,
    /// Creation order; listings are sorted by it.
    pub position: i64,
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

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(category.name.clone()),
            name_norm: ActiveValue::NotSet,
            color: ActiveValue::Set(category.color.clone()),
            budget_percent: ActiveValue::Set(i32::from(category.budget_percent)),
            position: ActiveValue::NotSet,
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let budget_percent = u8::try_from(model.budget_percent.clamp(0, 100)).unwrap_or(0);
        if i32::from(budget_percent) != model.budget_percent {
            tracing::warn!(
                "category {}: stored percentage {} clamped to {budget_percent}",
                model.id,
                model.budget_percent
            );
        }
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            name: model.name,
            color: model.color,
            budget_percent,
        })
    }
}
