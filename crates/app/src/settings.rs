//! Application settings, read from `settings.toml` and overridden by
//! `BILLETERA__SECTION__KEY` environment variables.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use engine::CommitmentFormula;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Default, Deserialize)]
pub struct Savings {
    #[serde(default)]
    pub commitment_formula: CommitmentFormula,
}

#[derive(Debug, Default, Deserialize)]
pub struct Classifier {
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub savings: Savings,
    #[serde(default)]
    pub classifier: Classifier,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("BILLETERA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn full_file() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "billetera.db" }

            [savings]
            commitment_formula = "outstanding"

            [classifier]
            model_path = "models/profile.json"
            "#,
        );

        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "billetera.db"));
        assert_eq!(
            settings.savings.commitment_formula,
            CommitmentFormula::Outstanding
        );
        assert_eq!(
            settings.classifier.model_path,
            Some(PathBuf::from("models/profile.json"))
        );
    }

    #[test]
    fn sections_are_optional() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );

        assert_eq!(settings.app.level, "info");
        assert!(matches!(
            settings.server.map(|server| server.database),
            Some(Database::Memory)
        ));
        assert_eq!(
            settings.savings.commitment_formula,
            CommitmentFormula::FullGoal
        );
        assert!(settings.classifier.model_path.is_none());
    }
}
