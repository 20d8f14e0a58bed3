// Subject / unit / exercise records as stored in the content document

use serde::{Deserialize, Deserializer, Serialize};

/// A subject (e.g. 算数, 理科) with its ordered units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Subject {
    /// Name shown to students, falling back to the id.
    pub fn display_name(&self) -> &str {
        display_or_id(self.name.as_deref(), &self.id)
    }
}

/// A single unit of study inside a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Target grade; authored as either a string ("小学5年") or a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub grade: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    /// HTML fragment
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Unit {
    pub fn display_name(&self) -> &str {
        display_or_id(self.name.as_deref(), &self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

fn display_or_id<'a>(name: Option<&'a str>, id: &'a str) -> &'a str {
    match name {
        Some(n) if !n.is_empty() => n,
        _ => id,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_accepts_numeric_grade() {
        let unit: Unit = serde_json::from_str(r#"{"id":"u1","grade":5}"#).unwrap();
        assert_eq!(unit.grade.as_deref(), Some("5"));
        assert!(unit.goals.is_empty());
        assert!(unit.exercises.is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let subject: Subject = serde_json::from_str(r#"{"id":"math"}"#).unwrap();
        assert_eq!(subject.display_name(), "math");

        let subject: Subject = serde_json::from_str(r#"{"id":"math","name":"算数"}"#).unwrap();
        assert_eq!(subject.display_name(), "算数");
    }
}
