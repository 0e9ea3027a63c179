use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

use super::model::{normalize_tags, MemorialChanges, NewMemorial, Tag};

/// Body of `POST /memorials`. Fields stay optional so missing ones become a 400, not a 422.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemorialRequest {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub deed: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of `PUT /memorials/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemorialRequest {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deed: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

impl DeletedResponse {
    pub fn new() -> Self {
        Self {
            message: "Memorial deleted successfully".into(),
        }
    }
}

impl Default for DeletedResponse {
    fn default() -> Self {
        Self::new()
    }
}

// Distinguishes `"deed": null` (Some(None)) from a missing key (None).
fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

fn is_blank(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Parses raw tag strings, reporting every unknown value at once.
pub fn parse_tags(raw: Vec<String>) -> Result<Vec<Tag>, ApiError> {
    let mut tags = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();
    for value in raw {
        match value.parse::<Tag>() {
            Ok(tag) => tags.push(tag),
            Err(bad) => invalid.push(bad),
        }
    }
    if !invalid.is_empty() {
        return Err(ApiError::InvalidTags(invalid));
    }
    Ok(normalize_tags(tags))
}

impl CreateMemorialRequest {
    pub fn validate(self) -> Result<NewMemorial, ApiError> {
        if is_blank(&self.title) || is_blank(&self.name) || is_blank(&self.description) {
            return Err(ApiError::Validation(
                "Title, name, and description are required".into(),
            ));
        }
        let tags = match self.tags {
            Some(raw) => parse_tags(raw)?,
            None => Vec::new(),
        };
        Ok(NewMemorial {
            title: self.title.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            deed: self.deed,
            tags,
        })
    }
}

impl UpdateMemorialRequest {
    pub fn validate(self) -> Result<MemorialChanges, ApiError> {
        for (field, value) in [
            ("title", &self.title),
            ("name", &self.name),
            ("description", &self.description),
        ] {
            if value.is_some() && is_blank(value) {
                return Err(ApiError::Validation(format!("{field} must not be empty")));
            }
        }
        let tags = self.tags.map(parse_tags).transpose()?;
        Ok(MemorialChanges {
            title: self.title,
            name: self.name,
            description: self.description,
            deed: self.deed,
            tags,
        })
    }
}
