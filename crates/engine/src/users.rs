//! Users table.
//!
//! Users are identified by the opaque id the identity provider hands to the
//! server; the engine never sees credentials.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Currency;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        let currency = Currency::try_from(model.currency.as_str()).unwrap_or_else(|err| {
            tracing::warn!("user {}: {err}, falling back to default", model.id);
            Currency::default()
        });
        Self {
            id: model.id,
            currency,
            created_at: model.created_at,
        }
    }
}
