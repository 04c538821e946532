use serde::{Deserialize, Serialize};

use super::category::Category;
use super::lenient;

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

/// A user's profile together with their savings categories, as returned by
/// the savings endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSavings {
    #[serde(deserialize_with = "lenient::i64_id")]
    pub id: i64,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub first_name: String,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub middle_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub last_name: String,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub occupation: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub email: String,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub monthly_salary: Option<f64>,

    #[serde(default, deserialize_with = "lenient::vec_skip_invalid")]
    pub roles: Vec<String>,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub deposited_amount_subtotal: Option<f64>,

    /// Entries without a usable id are dropped.
    #[serde(default, deserialize_with = "lenient::vec_skip_invalid")]
    pub categories: Vec<Category>,
}

impl UserSavings {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    pub fn category(&self, category_id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.category_id == category_id)
    }
}

/// Payload for creating a user (admin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub occupation: String,
    pub email: String,
    pub password: String,
    pub monthly_salary: f64,
    pub role: String,
}

/// Payload for updating a profile. `role` and `password` are only sent by
/// the admin screen; a blank password leaves it unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub occupation: String,
    pub email: String,
    pub monthly_salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    /// Drop a whitespace-only password so the server keeps the old one.
    pub fn normalized(mut self) -> Self {
        if self.password.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.password = None;
        }
        self
    }
}
