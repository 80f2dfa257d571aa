//! Post, project and experience records as the site consumes them.
//!
//! Store documents are loose JSON objects: any field may be missing or null.
//! Decoding resolves every field to a concrete value here so nothing past the
//! store boundary has to deal with partial records.

use serde::{Deserialize, Deserializer, Serialize};

use crate::block::Block;
use crate::parser;

pub const DEFAULT_CATEGORY: &str = "General";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_title() -> String {
    "Untitled".to_string()
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|category| !category.is_empty())
        .unwrap_or_else(default_category))
}

fn null_as_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|title| !title.is_empty())
        .unwrap_or_else(default_title))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default = "default_title", deserialize_with = "null_as_title")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    /// Raw body text, `None` when the field is unset in the store.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_image: String,
    #[serde(default = "default_category", deserialize_with = "null_as_category")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_published: bool,
    /// ISO-8601 timestamp, `None` for drafts.
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Post {
    pub fn blocks(&self) -> Vec<Block> {
        parser::parse_field(self.content.as_deref())
    }

    pub fn read_time_minutes(&self, words_per_minute: u32) -> u32 {
        read_time_minutes(self.content.as_deref().unwrap_or_default(), words_per_minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Completed,
    InProgress,
    Planned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(default = "default_category", deserialize_with = "null_as_category")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProjectStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub live_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub github_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_published: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Project {
    pub fn blocks(&self) -> Vec<Block> {
        parser::parse_field(self.long_description.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub start_date: Option<String>,
    /// `None` for the current position.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_current: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_logo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Experience {
    /// Flagged current, or no end date recorded.
    pub fn is_ongoing(&self) -> bool {
        self.is_current || self.end_date.is_none()
    }

    pub fn date_range(&self) -> String {
        let start = self.start_date.as_deref().unwrap_or("?");
        match self.end_date.as_deref() {
            Some(end) if !self.is_current => format!("{start} - {end}"),
            _ => format!("{start} - Present"),
        }
    }
}

/// Estimated minutes to read `text`, rounded up, never less than one.
pub fn read_time_minutes(text: &str, words_per_minute: u32) -> u32 {
    let words = text.split_whitespace().count() as u32;
    let rate = words_per_minute.max(1);
    words.div_ceil(rate).max(1)
}

pub fn read_time_label(minutes: u32) -> String {
    format!("{minutes} min read")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn sparse_post_gets_defaults() {
        let post: Post = serde_json::from_value(json!({ "slug": "hello" })).unwrap();
        assert_eq!(post.title, "Untitled");
        assert_eq!(post.category, "General");
        assert_eq!(post.excerpt, "");
        assert!(post.tags.is_empty());
        assert!(!post.is_published);
        assert_eq!(post.content, None);
        assert!(post.blocks().is_empty());
    }

    #[test]
    fn null_fields_get_defaults() {
        let post: Post = serde_json::from_value(json!({
            "slug": "hello",
            "title": null,
            "category": null,
            "tags": null,
            "isPublished": null,
            "publishedAt": null,
        }))
        .unwrap();
        assert_eq!(post.title, "Untitled");
        assert_eq!(post.category, "General");
        assert!(post.tags.is_empty());
        assert_eq!(post.published_at, None);
    }

    #[test]
    fn post_body_parses_into_blocks() {
        let post: Post = serde_json::from_value(json!({
            "slug": "hello",
            "content": "## Intro\n\nBody text.",
        }))
        .unwrap();
        assert_eq!(post.blocks().len(), 2);
    }

    #[test]
    fn project_status_and_defaults() {
        let project: Project = serde_json::from_value(json!({
            "slug": "homelab",
            "title": "Homelab",
            "status": "in-progress",
            "technologies": ["Proxmox", "WireGuard"],
            "longDescription": "- one\n- two",
        }))
        .unwrap();
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.category, "General");
        assert!(!project.featured);
        assert_eq!(
            project.blocks(),
            vec![Block::UnorderedList {
                items: vec!["one".to_string(), "two".to_string()]
            }]
        );
    }

    #[test]
    fn missing_status_is_completed() {
        let project: Project = serde_json::from_value(json!({ "slug": "x" })).unwrap();
        assert_eq!(project.status, ProjectStatus::Completed);
    }

    #[test]
    fn sparse_experience_gets_defaults() {
        let experience: Experience = serde_json::from_value(json!({
            "company": "Acme",
            "position": "SysAdmin",
            "startDate": "2021-06-01",
            "endDate": null,
            "responsibilities": null,
        }))
        .unwrap();
        assert!(!experience.is_current);
        assert!(experience.responsibilities.is_empty());
        assert!(experience.technologies.is_empty());
        assert_eq!(experience.company_logo, "");
        assert_eq!(experience.company_url, "");
        assert!(experience.is_ongoing());
        assert_eq!(experience.date_range(), "2021-06-01 - Present");
    }

    #[test]
    fn ended_experience() {
        let experience: Experience = serde_json::from_value(json!({
            "startDate": "2019-01-01",
            "endDate": "2021-05-31",
        }))
        .unwrap();
        assert!(!experience.is_ongoing());
        assert_eq!(experience.date_range(), "2019-01-01 - 2021-05-31");

        let flagged = Experience {
            is_current: true,
            ..experience
        };
        assert!(flagged.is_ongoing());
        assert_eq!(flagged.date_range(), "2019-01-01 - Present");
    }

    #[rstest]
    #[case(0, 200, 1)]
    #[case(3, 200, 1)]
    #[case(200, 200, 1)]
    #[case(201, 200, 2)]
    #[case(500, 250, 2)]
    fn read_time(#[case] words: usize, #[case] rate: u32, #[case] minutes: u32) {
        let text = "word ".repeat(words);
        assert_eq!(read_time_minutes(&text, rate), minutes);
    }

    #[test]
    fn zero_rate_does_not_divide_by_zero() {
        assert_eq!(read_time_minutes("a b c", 0), 3);
    }

    #[test]
    fn label() {
        assert_eq!(read_time_label(4), "4 min read");
    }
}
