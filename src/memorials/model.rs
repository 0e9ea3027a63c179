use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Category a memorial can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Founder,
    Leader,
    Contributor,
    Innovator,
    Mentor,
    Volunteer,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::Founder,
        Tag::Leader,
        Tag::Contributor,
        Tag::Innovator,
        Tag::Mentor,
        Tag::Volunteer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Founder => "founder",
            Tag::Leader => "leader",
            Tag::Contributor => "contributor",
            Tag::Innovator => "innovator",
            Tag::Mentor => "mentor",
            Tag::Volunteer => "volunteer",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Collapses duplicates and puts tags in their canonical order.
pub fn normalize_tags(mut tags: Vec<Tag>) -> Vec<Tag> {
    tags.sort();
    tags.dedup();
    tags
}

/// A persisted memorial record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memorial {
    pub id: i64,
    pub title: String,
    pub name: String,
    pub description: String,
    pub deed: Option<String>,
    pub tags: Vec<Tag>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated input for a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemorial {
    pub title: String,
    pub name: String,
    pub description: String,
    pub deed: Option<String>,
    pub tags: Vec<Tag>,
}

/// Validated partial update. `None` leaves the field as it is; `deed: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorialChanges {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub deed: Option<Option<String>>,
    pub tags: Option<Vec<Tag>>,
}

impl MemorialChanges {
    /// Applies the changes in place; timestamps are the caller's business.
    pub fn apply_to(self, memorial: &mut Memorial) {
        if let Some(title) = self.title {
            memorial.title = title;
        }
        if let Some(name) = self.name {
            memorial.name = name;
        }
        if let Some(description) = self.description {
            memorial.description = description;
        }
        if let Some(deed) = self.deed {
            memorial.deed = deed;
        }
        if let Some(tags) = self.tags {
            memorial.tags = normalize_tags(tags);
        }
    }
}

/// Row shape of the `memorials` table.
#[derive(Debug, Clone, FromRow)]
pub struct MemorialRow {
    pub id: i64,
    pub title: String,
    pub name: String,
    pub description: String,
    pub deed: Option<String>,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<MemorialRow> for Memorial {
    type Error = anyhow::Error;

    fn try_from(r: MemorialRow) -> Result<Self, Self::Error> {
        let tags = r
            .tags
            .iter()
            .map(|t| t.parse::<Tag>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|bad| anyhow::anyhow!("memorial {} has unknown tag {:?}", r.id, bad))?;
        Ok(Self {
            id: r.id,
            title: r.title,
            name: r.name,
            description: r.description,
            deed: r.deed,
            tags: normalize_tags(tags),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub(crate) fn tags_to_strings(tags: &[Tag]) -> Vec<String> {
    tags.iter().map(|t| t.as_str().to_string()).collect()
}
