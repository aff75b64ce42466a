//! Recurrence cadence of income and expense records.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

/// How often an income or expense repeats.
///
/// The legacy Spanish keys (`ocasional`, `quincenal`, `mensual`, `anual`) are
/// accepted wherever a frequency is parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneOff => "one_off",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Monthly run rate of a recurring amount.
    ///
    /// Returns `None` for [`Frequency::OneOff`], whose contribution depends on
    /// the record date instead.
    pub fn monthly_rate(self, amount: Money) -> Option<Money> {
        match self {
            Self::OneOff => None,
            Self::Monthly => Some(amount),
            Self::Biweekly => Some(amount.scale(26, 12)),
            Self::Annual => Some(amount.scale(1, 12)),
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "one_off" | "one-off" | "ocasional" => Ok(Self::OneOff),
            "biweekly" | "quincenal" => Ok(Self::Biweekly),
            "monthly" | "mensual" => Ok(Self::Monthly),
            "annual" | "anual" => Ok(Self::Annual),
            other => Err(EngineError::InvalidFrequency(other.to_string())),
        }
    }
}
