use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::models::lenient;
use crate::models::user::ROLE_ADMIN;

/// Identity carried in the login token's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default, deserialize_with = "lenient::i64_opt")]
    pub id: Option<i64>,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Two-letter avatar initials, `"U"` when the names are empty.
    pub fn initials(&self) -> String {
        let initials: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|n| n.chars().next())
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

/// Decode the payload segment of a JWT.
///
/// The signature is NOT verified; the server does that on every request.
/// Returns `None` for anything that is not a three-part token with a JSON
/// payload.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let parts: Vec<&str> = token.split('.').collect();
    let [_header, payload, _signature] = parts.as_slice() else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}
