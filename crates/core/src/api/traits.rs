use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::transaction::Transaction;
use crate::models::user::{NewUser, UserSavings, UserUpdate};

use super::dto::{CategoryRequest, DepositRequest, PasswordChange, WithdrawRequest};

/// The savings backend, as seen by the client core.
///
/// [`super::rest::RestClient`] talks HTTP; tests plug in an in-memory
/// implementation. Every call except `login` takes the bearer token from the
/// caller's session, so implementations hold no user state.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String, CoreError>;

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), CoreError>;

    /// Every user's profile and categories (the client picks its own).
    async fn all_savings(&self, token: &str) -> Result<Vec<UserSavings>, CoreError>;

    async fn user_savings(&self, token: &str, user_id: i64) -> Result<UserSavings, CoreError>;

    async fn create_user(&self, token: &str, user: &NewUser) -> Result<(), CoreError>;

    async fn update_user(&self, token: &str, user_id: i64, update: &UserUpdate) -> Result<(), CoreError>;

    async fn delete_user(&self, token: &str, user_id: i64) -> Result<(), CoreError>;

    async fn deposit(&self, token: &str, category_id: i64, request: &DepositRequest) -> Result<(), CoreError>;

    async fn withdraw(&self, token: &str, user_id: i64, request: &WithdrawRequest) -> Result<(), CoreError>;

    async fn create_category(&self, token: &str, user_id: i64, request: &CategoryRequest) -> Result<(), CoreError>;

    async fn update_category(
        &self,
        token: &str,
        user_id: i64,
        category_id: i64,
        request: &CategoryRequest,
    ) -> Result<(), CoreError>;

    async fn delete_category(&self, token: &str, user_id: i64, category_id: i64) -> Result<(), CoreError>;

    /// In server order; the dashboard's recent list takes the head of it.
    async fn transaction_history(&self, token: &str, user_id: i64) -> Result<Vec<Transaction>, CoreError>;
}
