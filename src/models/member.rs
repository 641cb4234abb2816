//! Member record model as persisted in the roster document.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Base URL used to derive `github_profile` from `github_username`.
pub const GITHUB_BASE_URL: &str = "https://github.com/";

/// One project listed under a member's portfolio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub project_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

impl PortfolioEntry {
    /// True when every field is empty after trimming.
    pub fn is_blank(&self) -> bool {
        [&self.project_title, &self.period, &self.role, &self.description]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}

/// A team member's profile and portfolio.
///
/// Reading is lenient: missing fields take their empty value and a bare
/// string in `role`/`major` is split on commas. `null` reads as empty.
/// Keys this struct does not know about are kept in `extra` so they survive
/// a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub english_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub intro: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github_username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github_profile: String,
    #[serde(deserialize_with = "null_as_default")]
    pub portfolio_link: String,
    #[serde(deserialize_with = "null_as_default")]
    pub portfolio_file: String,
    #[serde(deserialize_with = "string_or_seq")]
    pub role: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    pub major: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub portfolio: Vec<PortfolioEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    /// Derive the GitHub profile URL for a username; empty for an empty username.
    pub fn github_profile_for(username: &str) -> String {
        let username = username.trim();
        if username.is_empty() {
            String::new()
        } else {
            format!("{}{}", GITHUB_BASE_URL, username)
        }
    }
}

/// Contact-page projection of a member.
#[derive(Debug, Clone, Serialize)]
pub struct ContactCard {
    pub id: String,
    pub name: String,
    pub english_name: String,
    pub phone: String,
    pub email: String,
    pub github_username: String,
}

impl From<&Member> for ContactCard {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            english_name: member.english_name.clone(),
            phone: member.phone.clone(),
            email: member.email.clone(),
            github_username: member.github_username.clone(),
        }
    }
}

/// Split a comma-separated string into trimmed, non-empty items.
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read `null` as the type's empty value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrSeq {
    One(String),
    Many(Vec<String>),
}

fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrSeq>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrSeq::One(raw)) => split_comma_list(&raw),
        Some(StringOrSeq::Many(items)) => items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let member: Member = serde_json::from_value(json!({ "name": "Kim" })).unwrap();
        assert_eq!(member.name, "Kim");
        assert!(member.id.is_empty());
        assert!(member.role.is_empty());
        assert!(member.portfolio.is_empty());
    }

    #[test]
    fn test_legacy_string_role_is_normalized() {
        let member: Member = serde_json::from_value(json!({
            "role": "Backend, Design ,",
            "major": ["Computer Science"]
        }))
        .unwrap();
        assert_eq!(member.role, vec!["Backend", "Design"]);
        assert_eq!(member.major, vec!["Computer Science"]);

        let out = serde_json::to_value(&member).unwrap();
        assert_eq!(out["role"], json!(["Backend", "Design"]));
    }

    #[test]
    fn test_null_role_reads_as_empty() {
        let member: Member = serde_json::from_value(json!({ "role": null })).unwrap();
        assert!(member.role.is_empty());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let member: Member = serde_json::from_value(json!({
            "id": "a1",
            "phone": null,
            "portfolio": null,
            "major": ["CS"]
        }))
        .unwrap();
        assert_eq!(member.id, "a1");
        assert_eq!(member.phone, "");
        assert!(member.portfolio.is_empty());
        assert_eq!(member.major, vec!["CS"]);

        let entry: PortfolioEntry =
            serde_json::from_value(json!({ "project_title": "Roster", "period": null }))
                .unwrap();
        assert_eq!(entry.period, "");
    }

    #[test]
    fn test_unknown_keys_survive() {
        let member: Member =
            serde_json::from_value(json!({ "id": "a1", "nickname": "kay" })).unwrap();
        assert_eq!(member.extra["nickname"], "kay");

        let out = serde_json::to_value(&member).unwrap();
        assert_eq!(out["nickname"], "kay");
    }

    #[test]
    fn test_empty_id_is_not_written() {
        let out = serde_json::to_value(Member::default()).unwrap();
        assert!(out.get("id").is_none());
    }

    #[test]
    fn test_github_profile_for() {
        assert_eq!(
            Member::github_profile_for("octocat"),
            "https://github.com/octocat"
        );
        assert_eq!(Member::github_profile_for("  "), "");
    }

    #[test]
    fn test_portfolio_entry_blank() {
        assert!(PortfolioEntry::default().is_blank());
        let entry = PortfolioEntry {
            description: " y ".into(),
            ..Default::default()
        };
        assert!(!entry.is_blank());
    }
}
