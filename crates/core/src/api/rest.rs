use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::transaction::Transaction;
use crate::models::user::{NewUser, UserSavings, UserUpdate};

use super::dto::{
    envelope_data, envelope_list, extract_error, extract_token, CategoryRequest, DepositRequest,
    LoginRequest, PasswordChange, WithdrawRequest,
};
use super::traits::WalletApi;

const API_PREFIX: &str = "/rest/v1";

/// HTTP implementation of [`WalletApi`].
///
/// - bearer auth on every call but login
/// - JSON bodies; empty or non-JSON success bodies are treated as the backend
///   still starting up ([`CoreError::EmptyResponse`])
/// - 401/403 map to [`CoreError::Unauthorized`] / [`CoreError::Forbidden`]
///   except on login, where the server's message is surfaced as-is
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{API_PREFIX}{path}", self.base_url);
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send, then return the parsed JSON body of a successful response.
    async fn execute(
        &self,
        builder: RequestBuilder,
        fallback: &str,
        is_login: bool,
    ) -> Result<Value, CoreError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Option<Value> = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        tracing::debug!(status = status.as_u16(), has_body = body.is_some(), "api response");

        if !status.is_success() {
            if !is_login {
                match status.as_u16() {
                    401 => return Err(CoreError::Unauthorized),
                    403 => return Err(CoreError::Forbidden),
                    _ => {}
                }
            }
            let message = extract_error(body.as_ref()).unwrap_or_else(|| fallback.to_string());
            tracing::warn!(status = status.as_u16(), %message, "api request failed");
            return Err(CoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        body.ok_or(CoreError::EmptyResponse)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, CoreError> {
        let body = self.execute(builder, fallback, false).await?;
        envelope_data(body)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<Vec<T>, CoreError> {
        let body = self.execute(builder, fallback, false).await?;
        envelope_list(body)
    }

    async fn submit<B: Serialize + ?Sized>(
        &self,
        builder: RequestBuilder,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<(), CoreError> {
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };
        self.execute(builder, fallback, false).await.map(|_| ())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl WalletApi for RestClient {
    async fn login(&self, email: &str, password: &str) -> Result<String, CoreError> {
        tracing::info!(email, "logging in");
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let builder = self.request(Method::POST, "/auth/login", None).json(&payload);
        let body = self
            .execute(builder, "Login failed. Please try again.", true)
            .await?;
        extract_token(&body).ok_or_else(|| CoreError::Api {
            status: 200,
            message: "Login response did not contain a token".into(),
        })
    }

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), CoreError> {
        let builder = self.request(Method::PUT, "/auth/change-password", Some(token));
        self.submit(builder, Some(change), "Failed to change password.").await
    }

    async fn all_savings(&self, token: &str) -> Result<Vec<UserSavings>, CoreError> {
        let builder = self.request(Method::GET, "/savings", Some(token));
        self.fetch_list(builder, "Failed to fetch savings.").await
    }

    async fn user_savings(&self, token: &str, user_id: i64) -> Result<UserSavings, CoreError> {
        let builder = self.request(Method::GET, &format!("/savings/user/{user_id}"), Some(token));
        self.fetch(builder, "Failed to fetch user savings.").await
    }

    async fn create_user(&self, token: &str, user: &NewUser) -> Result<(), CoreError> {
        let builder = self.request(Method::POST, "/savings", Some(token));
        self.submit(builder, Some(user), "Failed to create user.").await
    }

    async fn update_user(&self, token: &str, user_id: i64, update: &UserUpdate) -> Result<(), CoreError> {
        let builder = self.request(Method::PUT, &format!("/savings/user/{user_id}"), Some(token));
        self.submit(builder, Some(update), "Failed to update user.").await
    }

    async fn delete_user(&self, token: &str, user_id: i64) -> Result<(), CoreError> {
        let builder = self.request(Method::DELETE, &format!("/savings/user/{user_id}"), Some(token));
        self.submit::<Value>(builder, None, "Failed to delete user.").await
    }

    async fn deposit(&self, token: &str, category_id: i64, request: &DepositRequest) -> Result<(), CoreError> {
        let builder = self.request(
            Method::POST,
            &format!("/category/{category_id}/deposit"),
            Some(token),
        );
        self.submit(builder, Some(request), "Deposit failed.").await
    }

    async fn withdraw(&self, token: &str, user_id: i64, request: &WithdrawRequest) -> Result<(), CoreError> {
        let builder = self.request(
            Method::POST,
            &format!("/category/user/{user_id}/withdraw"),
            Some(token),
        );
        self.submit(builder, Some(request), "Withdrawal failed.").await
    }

    async fn create_category(&self, token: &str, user_id: i64, request: &CategoryRequest) -> Result<(), CoreError> {
        let builder = self.request(
            Method::POST,
            &format!("/category/savings/userid/{user_id}"),
            Some(token),
        );
        self.submit(builder, Some(request), "Failed to create category.").await
    }

    async fn update_category(
        &self,
        token: &str,
        user_id: i64,
        category_id: i64,
        request: &CategoryRequest,
    ) -> Result<(), CoreError> {
        let builder = self
            .request(Method::PUT, &format!("/category/user/{user_id}"), Some(token))
            .query(&[("categoryId", category_id)]);
        self.submit(builder, Some(request), "Failed to update category.").await
    }

    async fn delete_category(&self, token: &str, user_id: i64, category_id: i64) -> Result<(), CoreError> {
        let builder = self.request(
            Method::DELETE,
            &format!("/category/user/{user_id}/category/{category_id}"),
            Some(token),
        );
        self.submit::<Value>(builder, None, "Failed to delete category.").await
    }

    async fn transaction_history(&self, token: &str, user_id: i64) -> Result<Vec<Transaction>, CoreError> {
        let builder = self.request(
            Method::GET,
            &format!("/category/user/{user_id}/transactions"),
            Some(token),
        );
        self.fetch_list(builder, "Failed to fetch transactions.").await
    }
}
