//! Audience evaluators deciding which people a fragment applies to.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// A person whose layout fragments are being selected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub username: String,

    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

impl Person {
    pub fn new(username: impl Into<String>) -> Self {
        Person {
            username: username.into(),
            attributes: HashMap::new(),
        }
    }

    /// Add a value to a (multi-valued) attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn attribute_values(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }
}

/// A compiled regular expression that must match a whole attribute value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributePattern(Regex);

impl AttributePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        // Anchor so that the whole value has to match
        Regex::new(&format!("^(?:{pattern})$")).map(AttributePattern)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    /// The pattern as configured, without the anchoring group
    pub fn as_str(&self) -> &str {
        let anchored = self.0.as_str();
        anchored
            .strip_prefix("^(?:")
            .and_then(|s| s.strip_suffix(")$"))
            .unwrap_or(anchored)
    }
}

impl TryFrom<String> for AttributePattern {
    type Error = regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        AttributePattern::new(&pattern)
    }
}

impl From<AttributePattern> for String {
    fn from(pattern: AttributePattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl PartialEq for AttributePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A single audience predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluator {
    /// Person has the attribute, optionally with exactly this value
    Attribute {
        name: String,
        #[serde(default)]
        value: Option<String>,
    },

    /// Some value of the attribute matches the pattern in full
    AttributeMatches {
        name: String,
        pattern: AttributePattern,
    },

    /// Applies to every person
    Everyone,
}

impl Evaluator {
    pub fn applies_to(&self, person: &Person) -> bool {
        match self {
            Evaluator::Attribute { name, value } => {
                let Some(values) = person.attribute_values(name) else {
                    debug!(user = %person.username, attribute = %name, "attribute not present");
                    return false;
                };
                match value {
                    None => true,
                    Some(expected) => values.iter().any(|v| v == expected),
                }
            }
            Evaluator::AttributeMatches { name, pattern } => person
                .attribute_values(name)
                .is_some_and(|values| values.iter().any(|v| pattern.is_match(v))),
            Evaluator::Everyone => true,
        }
    }
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluator::Attribute { name, value: None } => write!(f, "has attribute {name}"),
            Evaluator::Attribute {
                name,
                value: Some(value),
            } => write!(f, "{name} = {value}"),
            Evaluator::AttributeMatches { name, pattern } => {
                write!(f, "{name} matches /{}/", pattern.as_str())
            }
            Evaluator::Everyone => write!(f, "everyone"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> Person {
        Person::new("jdoe")
            .with_attribute("department", "sales")
            .with_attribute("department", "support")
            .with_attribute("title", "Regional Manager")
    }

    #[test]
    fn test_attribute_presence() {
        let evaluator = Evaluator::Attribute {
            name: "department".into(),
            value: None,
        };
        assert!(evaluator.applies_to(&staff()));
        assert!(!evaluator.applies_to(&Person::new("guest")));
    }

    #[test]
    fn test_attribute_value_any_of_many() {
        let evaluator = Evaluator::Attribute {
            name: "department".into(),
            value: Some("support".into()),
        };
        assert!(evaluator.applies_to(&staff()));

        let other = Evaluator::Attribute {
            name: "department".into(),
            value: Some("Support".into()),
        };
        assert!(!other.applies_to(&staff()));
    }

    #[test]
    fn test_pattern_must_match_whole_value() {
        let partial = Evaluator::AttributeMatches {
            name: "title".into(),
            pattern: AttributePattern::new("Manager").unwrap(),
        };
        assert!(!partial.applies_to(&staff()));

        let full = Evaluator::AttributeMatches {
            name: "title".into(),
            pattern: AttributePattern::new("(?i).*manager").unwrap(),
        };
        assert!(full.applies_to(&staff()));
    }

    #[test]
    fn test_evaluators_from_yaml() {
        let yaml = r#"
- attribute: { name: department, value: sales }
- attribute_matches: { name: title, pattern: ".*Manager" }
- everyone
"#;
        let evaluators: Vec<Evaluator> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(evaluators.len(), 3);
        assert_eq!(evaluators[1].to_string(), "title matches /.*Manager/");
        assert_eq!(evaluators[2], Evaluator::Everyone);
        assert!(evaluators.iter().all(|e| e.applies_to(&staff())));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let yaml = "- attribute_matches: { name: title, pattern: \"(\" }";
        assert!(serde_yaml::from_str::<Vec<Evaluator>>(yaml).is_err());
    }
}
