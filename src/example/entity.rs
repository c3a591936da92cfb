//! Example entity, request payload and API representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `example_entity` table.
#[derive(Debug, Clone, FromRow)]
pub struct ExampleEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<i32>,
    pub enabled: bool,
    pub created_on: DateTime<Utc>,
    pub modified_on: Option<DateTime<Utc>>,
}

/// Body of create and update requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExampleRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ExampleRequest {
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("title must not be empty".to_string());
        }
        if title.chars().count() > 255 {
            return Err("title must be at most 255 characters".to_string());
        }
        if matches!(self.status, Some(s) if s < 0) {
            return Err("status must not be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExampleAttributes {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<i32>,
    pub enabled: bool,
    pub created_on: DateTime<Utc>,
    pub modified_on: Option<DateTime<Utc>>,
}

/// Resource object returned by the API.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExampleResource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: Uuid,
    pub attributes: ExampleAttributes,
}

impl From<ExampleEntity> for ExampleResource {
    fn from(e: ExampleEntity) -> Self {
        Self {
            kind: "example",
            id: e.id,
            attributes: ExampleAttributes {
                title: e.title,
                description: e.description,
                status: e.status,
                enabled: e.enabled,
                created_on: e.created_on,
                modified_on: e.modified_on,
            },
        }
    }
}

/// One page of entities plus the total row count.
#[derive(Debug, Clone)]
pub struct ExamplePage {
    pub items: Vec<ExampleEntity>,
    pub limit: u32,
    pub offset: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_validation() {
        let mut req: ExampleRequest = serde_json::from_str(r#"{"title": "hello"}"#).unwrap();
        assert!(req.enabled);
        assert!(req.validate().is_ok());

        req.title = "   ".into();
        assert_eq!(req.validate().unwrap_err(), "title must not be empty");

        req.title = "ok".into();
        req.status = Some(-1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn resource_serializes_with_type_tag() {
        let entity = ExampleEntity {
            id: Uuid::nil(),
            title: "t".into(),
            description: None,
            status: Some(1),
            enabled: true,
            created_on: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            modified_on: None,
        };
        let value = serde_json::to_value(ExampleResource::from(entity)).unwrap();
        assert_eq!(value["type"], "example");
        assert_eq!(value["attributes"]["title"], "t");
        assert_eq!(value["attributes"]["status"], 1);
    }
}
