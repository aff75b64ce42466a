//! Investor profile classifier.
//!
//! The model is trained offline and exported as JSON: the ordered feature
//! names, a label encoder (list of known values) per categorical feature,
//! the output classes and a forest of decision trees. Each leaf holds a
//! weight per class; the forest averages them and picks the best class.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Answers collected by the onboarding questionnaire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFeatures {
    pub age: String,
    pub sex: String,
    pub nationality: String,
    pub income_bracket: String,
    pub investment_knowledge: String,
    pub employment_status: String,
}

impl ProfileFeatures {
    fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "age" => &self.age,
            "sex" => &self.sex,
            "nationality" => &self.nationality,
            "income_bracket" => &self.income_bracket,
            "investment_knowledge" => &self.investment_knowledge,
            "employment_status" => &self.employment_status,
            _ => return None,
        };
        Some(value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    Profile(String),
    /// No model is loaded.
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Samples with `x[feature] <= threshold` go `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: Vec<f64> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Node 0 is the root.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn leaf(&self, row: &[f64]) -> Option<&[f64]> {
        let mut index = 0;
        // A well formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index)? {
                TreeNode::Leaf { value } => return Some(value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(0.0);
                    index = if x <= *threshold { *left } else { *right };
                }
            }
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileModel {
    pub features: Vec<String>,
    #[serde(default)]
    pub encoders: HashMap<String, Vec<String>>,
    pub classes: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl ProfileModel {
    pub fn from_json(raw: &str) -> ResultEngine<Self> {
        let model: Self = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> ResultEngine<()> {
        let invalid = |msg: String| Err(EngineError::Serialization(msg));
        if self.classes.is_empty() {
            return invalid("model has no classes".to_string());
        }
        if self.trees.is_empty() {
            return invalid("model has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return invalid(format!("tree {t} is empty"));
            }
            for node in &tree.nodes {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.features.len()
                            || *left >= tree.nodes.len()
                            || *right >= tree.nodes.len()
                        {
                            return invalid(format!("tree {t} has an out of range split"));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.classes.len() {
                            return invalid(format!(
                                "tree {t} has a leaf with {} weights, expected {}",
                                value.len(),
                                self.classes.len()
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Feature vector in model order.
    ///
    /// Unknown categorical values encode as 0, numeric values that do not
    /// parse become 0.
    fn encode(&self, features: &ProfileFeatures) -> Vec<f64> {
        self.features
            .iter()
            .map(|name| {
                let raw = features.get(name).unwrap_or_default().trim();
                match self.encoders.get(name) {
                    Some(known) => known.iter().position(|v| v == raw).unwrap_or(0) as f64,
                    None => raw.parse::<f64>().ok().filter(|x| x.is_finite()).unwrap_or(0.0),
                }
            })
            .collect()
    }

    pub fn predict(&self, features: &ProfileFeatures) -> Option<&str> {
        let row = self.encode(features);
        let mut totals = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let Some(leaf) = tree.leaf(&row) else {
                tracing::warn!("profile tree did not reach a leaf, skipping it");
                continue;
            };
            let weight: f64 = leaf.iter().sum();
            if weight <= 0.0 {
                continue;
            }
            for (total, w) in totals.iter_mut().zip(leaf) {
                *total += w / weight;
            }
        }
        // First class wins ties.
        let (best, _) = totals
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |(best, max), (i, &v)| {
                if v > max { (i, v) } else { (best, max) }
            });
        self.classes.get(best).map(String::as_str)
    }
}

/// Holds the loaded model, if any. Cheap to share behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct ProfileClassifier {
    model: Option<ProfileModel>,
}

impl ProfileClassifier {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_model(model: ProfileModel) -> Self {
        Self { model: Some(model) }
    }

    /// Loads the model at `path`. Any failure leaves the classifier
    /// unavailable.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("no profile model configured, predictions disabled");
            return Self::unavailable();
        };
        let model = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Serialization(err.to_string()))
            .and_then(|raw| ProfileModel::from_json(&raw));
        match model {
            Ok(model) => {
                tracing::info!(
                    "loaded profile model from {} ({} trees)",
                    path.display(),
                    model.trees.len()
                );
                Self::from_model(model)
            }
            Err(err) => {
                tracing::warn!("cannot load profile model {}: {err}", path.display());
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict_profile(&self, features: &ProfileFeatures) -> Prediction {
        match self.model.as_ref().and_then(|model| model.predict(features)) {
            Some(label) => Prediction::Profile(label.to_string()),
            None => Prediction::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "features": ["age", "income_bracket", "investment_knowledge"],
        "encoders": {
            "income_bracket": ["high", "low", "medium"],
            "investment_knowledge": ["advanced", "basic", "none"]
        },
        "classes": ["aggressive", "conservative", "moderate"],
        "trees": [
            {"nodes": [
                {"feature": 0, "threshold": 35.0, "left": 1, "right": 2},
                {"value": [3.0, 0.0, 1.0]},
                {"value": [0.0, 4.0, 0.0]}
            ]},
            {"nodes": [
                {"feature": 2, "threshold": 0.5, "left": 1, "right": 2},
                {"value": [1.0, 0.0, 0.0]},
                {"value": [0.0, 1.0, 1.0]}
            ]}
        ]
    }"#;

    fn classifier() -> ProfileClassifier {
        ProfileClassifier::from_model(ProfileModel::from_json(MODEL).unwrap())
    }

    fn features(age: &str, knowledge: &str) -> ProfileFeatures {
        ProfileFeatures {
            age: age.to_string(),
            income_bracket: "medium".to_string(),
            investment_knowledge: knowledge.to_string(),
            ..ProfileFeatures::default()
        }
    }

    #[test]
    fn forest_vote() {
        let classifier = classifier();
        assert_eq!(
            classifier.predict_profile(&features("25", "advanced")),
            Prediction::Profile("aggressive".to_string())
        );
        assert_eq!(
            classifier.predict_profile(&features("60", "none")),
            Prediction::Profile("conservative".to_string())
        );
    }

    #[test]
    fn unknown_values_encode_as_zero() {
        let classifier = classifier();
        // "expert" is unknown and maps to "advanced"; garbage age maps to 0.
        assert_eq!(
            classifier.predict_profile(&features("twenty", "expert")),
            Prediction::Profile("aggressive".to_string())
        );
    }

    #[test]
    fn missing_model_is_unavailable() {
        let missing = ProfileClassifier::load(Some(Path::new("/nonexistent/profile.json")));
        assert!(!missing.is_available());
        assert_eq!(
            missing.predict_profile(&features("30", "basic")),
            Prediction::Unavailable
        );
        assert!(!ProfileClassifier::load(None).is_available());
    }

    #[test]
    fn malformed_models_are_rejected() {
        assert!(ProfileModel::from_json("{").is_err());
        let bad_leaf = MODEL.replace("[3.0, 0.0, 1.0]", "[3.0, 0.0]");
        assert!(ProfileModel::from_json(&bad_leaf).is_err());
        let bad_child = MODEL.replace("\"left\": 1, \"right\": 2}", "\"left\": 9, \"right\": 2}");
        assert!(ProfileModel::from_json(&bad_child).is_err());
    }

    #[test]
    fn prediction_json_shape() {
        let json = serde_json::to_value(Prediction::Profile("moderate".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"profile": "moderate"}));
        let json = serde_json::to_value(Prediction::Unavailable).unwrap();
        assert_eq!(json, serde_json::json!("unavailable"));
    }
}
