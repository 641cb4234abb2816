//! Normalized member form submission.
//!
//! Browsers submit the member form as flat `(name, value)` pairs. This module
//! turns those pairs into a [`MemberForm`] once, so the service never has to
//! guess at field shapes.

use std::collections::HashMap;

use super::{split_comma_list, PortfolioEntry};

/// Form field names accepted by the member form.
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const ENGLISH_NAME: &str = "english_name";
    pub const INTRO: &str = "intro";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
    pub const GITHUB_USERNAME: &str = "github_username";
    pub const PORTFOLIO_LINK: &str = "portfolio_link";
    pub const ROLE: &str = "role";
    pub const ROLE_TEXT: &str = "role_text";
    pub const MAJOR: &str = "major";
    pub const MAJOR_TEXT: &str = "major_text";
    pub const PROJECT_TITLE: &str = "project_title";
    pub const PERIOD: &str = "period";
    pub const PORTFOLIO_ROLE: &str = "portfolio_role";
    pub const DESCRIPTION: &str = "description";
    pub const PORTFOLIO_FILE: &str = "portfolio_file";
    pub const REMOVE_PORTFOLIO_FILE: &str = "remove_portfolio_file";
}

/// A multi-valued field with a comma-separated single-string fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiValue {
    /// Repeated values (checkboxes, multi-select).
    pub values: Vec<String>,
    /// Comma-separated free text.
    pub text: Option<String>,
}

impl MultiValue {
    /// Resolve to a normalized sequence.
    ///
    /// Repeated values win; otherwise the comma-separated text is split.
    /// Returns `None` when both are empty, meaning "keep the stored value".
    pub fn resolve(&self) -> Option<Vec<String>> {
        let values: Vec<String> = self
            .values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        if !values.is_empty() {
            return Some(values);
        }

        let parsed = self
            .text
            .as_deref()
            .map(split_comma_list)
            .unwrap_or_default();
        if parsed.is_empty() {
            None
        } else {
            Some(parsed)
        }
    }
}

/// An uploaded portfolio attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A parsed create/update submission.
#[derive(Debug, Clone, Default)]
pub struct MemberForm {
    /// Target member for an update; `None` means create.
    pub id: Option<String>,
    pub name: String,
    pub english_name: String,
    pub intro: String,
    pub phone: String,
    pub email: String,
    pub github_username: String,
    pub portfolio_link: String,
    pub role: MultiValue,
    pub major: MultiValue,
    pub project_titles: Vec<String>,
    pub periods: Vec<String>,
    pub portfolio_roles: Vec<String>,
    pub descriptions: Vec<String>,
    pub attachment: Option<Attachment>,
    pub remove_file: bool,
}

impl MemberForm {
    /// Build a form from submitted pairs. For single-valued fields the first
    /// occurrence wins; unknown names are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = MemberForm::default();
        let mut scalars: HashMap<String, String> = HashMap::new();

        for (name, value) in pairs {
            match name.as_str() {
                fields::ROLE => form.role.values.push(value),
                fields::MAJOR => form.major.values.push(value),
                fields::PROJECT_TITLE => form.project_titles.push(value),
                fields::PERIOD => form.periods.push(value),
                fields::PORTFOLIO_ROLE => form.portfolio_roles.push(value),
                fields::DESCRIPTION => form.descriptions.push(value),
                _ => {
                    scalars.entry(name).or_insert(value);
                }
            }
        }

        let mut take = |key: &str| scalars.remove(key).unwrap_or_default();

        form.id = Some(take(fields::ID).trim().to_string()).filter(|id| !id.is_empty());
        form.name = take(fields::NAME);
        form.english_name = take(fields::ENGLISH_NAME);
        form.intro = take(fields::INTRO);
        form.phone = take(fields::PHONE);
        form.email = take(fields::EMAIL);
        form.github_username = take(fields::GITHUB_USERNAME);
        form.portfolio_link = take(fields::PORTFOLIO_LINK);
        form.role.text = Some(take(fields::ROLE_TEXT)).filter(|t| !t.trim().is_empty());
        form.major.text = Some(take(fields::MAJOR_TEXT)).filter(|t| !t.trim().is_empty());
        form.remove_file = is_truthy(&take(fields::REMOVE_PORTFOLIO_FILE));

        form
    }

    /// Zip the four portfolio columns into entries.
    ///
    /// Columns are zipped up to the longest one, short columns pad with "",
    /// values are trimmed and entries left completely empty are dropped.
    pub fn portfolio_entries(&self) -> Vec<PortfolioEntry> {
        let len = [
            self.project_titles.len(),
            self.periods.len(),
            self.portfolio_roles.len(),
            self.descriptions.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        let cell = |column: &[String], i: usize| {
            column
                .get(i)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        (0..len)
            .map(|i| PortfolioEntry {
                project_title: cell(&self.project_titles, i),
                period: cell(&self.periods, i),
                role: cell(&self.portfolio_roles, i),
                description: cell(&self.descriptions, i),
            })
            .filter(|entry| !entry.is_blank())
            .collect()
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
