use serde::{Deserialize, Serialize};

/// UI colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// An entry of the shared category-type taxonomy.
///
/// `id` is the slug of `label` (lower-case, whitespace runs → `-`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryType {
    pub id: String,
    pub label: String,
}

impl CategoryType {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The taxonomy a fresh session starts with.
pub fn default_category_types() -> Vec<CategoryType> {
    vec![
        CategoryType::new("savings", "Savings"),
        CategoryType::new("investment", "Investment"),
        CategoryType::new("insurance", "Insurance"),
        CategoryType::new("emergency", "Emergency"),
        CategoryType::new("other", "Other"),
    ]
}

/// Client-side session context: everything the browser build used to keep
/// in local storage. Passed explicitly, saved through
/// [`crate::storage::manager::SessionStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token from the last successful login
    pub token: Option<String>,

    pub theme: Theme,

    pub category_types: Vec<CategoryType>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token: None,
            theme: Theme::default(),
            category_types: default_category_types(),
        }
    }
}

impl Session {
    /// Re-seed the taxonomy with the defaults when it is empty.
    /// Returns `true` if anything changed.
    pub fn ensure_category_types(&mut self) -> bool {
        if self.category_types.is_empty() {
            self.category_types = default_category_types();
            true
        } else {
            false
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
