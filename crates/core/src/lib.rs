pub mod api;
pub mod config;
pub mod errors;
pub mod format;
pub mod models;
pub mod services;
pub mod storage;
pub mod token;

use api::dto::{CategoryRequest, DepositRequest, PasswordChange, WithdrawRequest};
use api::traits::WalletApi;
use chrono::{DateTime, Utc};
use config::ClientConfig;
use format::DisplayFormat;
use models::{
    category::Category,
    report::{AllocationSlice, DashboardSummary, DeadlineStatus, DepositDateOption, GoalProgress, TrendPoint},
    session::{CategoryType, Session, Theme},
    transaction::Transaction,
    user::{NewUser, UserSavings, UserUpdate},
};
use services::{
    export_service::{CategoryJoin, ExportService},
    filter_service::{FilterService, TransactionFilter},
    goal_service::GoalService,
    summary_service::SummaryService,
    taxonomy_service::TaxonomyService,
    trend_service::TrendService,
};
use storage::manager::SessionStore;
use token::{decode_claims, Claims};

use errors::CoreError;

/// The data most recently fetched for the signed-in user. Replaced whole by
/// [`SavingsWallet::refresh`], never patched.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub savings: Option<UserSavings>,
    pub transactions: Vec<Transaction>,
}

impl Snapshot {
    pub fn categories(&self) -> &[Category] {
        self.savings
            .as_ref()
            .map(|s| s.categories.as_slice())
            .unwrap_or_default()
    }
}

/// Main entry point for the savings wallet client core.
/// Holds the session, the latest snapshot, and all services needed to
/// derive views from it.
#[must_use]
pub struct SavingsWallet {
    config: ClientConfig,
    format: DisplayFormat,
    session: Session,
    api: Box<dyn WalletApi>,
    snapshot: Snapshot,
    trend_service: TrendService,
    goal_service: GoalService,
    filter_service: FilterService,
    export_service: ExportService,
    summary_service: SummaryService,
    taxonomy_service: TaxonomyService,
    /// Tracks whether the session changed since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for SavingsWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavingsWallet")
            .field("api_base_url", &self.config.api_base_url)
            .field("signed_in", &self.session.is_signed_in())
            .field("theme", &self.session.theme)
            .field("transactions", &self.snapshot.transactions.len())
            .field("categories", &self.snapshot.categories().len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl SavingsWallet {
    /// Build a wallet around an existing session. Fails only when the
    /// configured timezone is unknown.
    pub fn new(config: ClientConfig, mut session: Session, api: Box<dyn WalletApi>) -> Result<Self, CoreError> {
        let format = config.display_format()?;
        let dirty = session.ensure_category_types();
        Ok(Self {
            config,
            format,
            session,
            api,
            snapshot: Snapshot::default(),
            trend_service: TrendService::new(),
            goal_service: GoalService::new(),
            filter_service: FilterService::new(),
            export_service: ExportService::new(),
            summary_service: SummaryService::new(),
            taxonomy_service: TaxonomyService::new(),
            dirty,
        })
    }

    /// Restore a wallet from an encrypted session blob.
    pub fn load_session_from_bytes(
        config: ClientConfig,
        encrypted: &[u8],
        passphrase: &str,
        api: Box<dyn WalletApi>,
    ) -> Result<Self, CoreError> {
        let session = SessionStore::load_from_bytes(encrypted, passphrase)?;
        Self::new(config, session, api)
    }

    /// Save the session to encrypted bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_session_to_bytes(&mut self, passphrase: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = SessionStore::save_to_bytes(&self.session, passphrase)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Restore from a session file; a missing file starts a fresh session
    /// (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_session_from_file(
        config: ClientConfig,
        path: &str,
        passphrase: &str,
        api: Box<dyn WalletApi>,
    ) -> Result<Self, CoreError> {
        let session = SessionStore::load_or_default(path, passphrase)?;
        Self::new(config, session, api)
    }

    /// Save the session to an encrypted file (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_session_to_file(&mut self, path: &str, passphrase: &str) -> Result<(), CoreError> {
        SessionStore::save_to_file(&self.session, path, passphrase)?;
        self.dirty = false;
        Ok(())
    }

    /// Whether the session changed since the last save or load.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn display_format(&self) -> &DisplayFormat {
        &self.format
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    // ── Authentication ──────────────────────────────────────────────

    /// Sign in and keep the token. A token whose payload cannot be read is
    /// rejected rather than stored.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Claims, CoreError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CoreError::ValidationError(
                "Email and password are required.".into(),
            ));
        }

        let token = self.api.login(email, password).await?;
        let claims = decode_claims(&token).ok_or_else(|| CoreError::Api {
            status: 200,
            message: "Received an unreadable login token".into(),
        })?;

        tracing::info!(user_id = ?claims.id, admin = claims.is_admin(), "signed in");
        self.session.token = Some(token);
        self.snapshot = Snapshot::default();
        self.dirty = true;
        Ok(claims)
    }

    /// Forget the token and the fetched data. Theme and category types stay.
    pub fn logout(&mut self) {
        if self.session.token.take().is_some() {
            self.dirty = true;
        }
        self.snapshot = Snapshot::default();
        tracing::info!("signed out");
    }

    pub fn current_user(&self) -> Option<Claims> {
        self.session.token.as_deref().and_then(decode_claims)
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|c| c.is_admin())
    }

    /// Change the signed-in user's password. New and confirmation must match.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), CoreError> {
        if change.new_password.is_empty() {
            return Err(CoreError::ValidationError("New password is required.".into()));
        }
        if change.new_password != change.confirm_password {
            return Err(CoreError::ValidationError(
                "New password and confirmation do not match.".into(),
            ));
        }
        let token = self.token()?;
        self.api.change_password(token, change).await
    }

    // ── Theme ───────────────────────────────────────────────────────

    pub fn theme(&self) -> Theme {
        self.session.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.session.theme != theme {
            self.session.theme = theme;
            self.dirty = true;
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.session.theme.toggled());
        self.session.theme
    }

    // ── Data ────────────────────────────────────────────────────────

    /// Fetch the user's savings and transaction history. The snapshot is
    /// replaced only when both fetches succeed.
    pub async fn refresh(&mut self) -> Result<&Snapshot, CoreError> {
        let token = self.token()?;
        let user_id = self.user_id()?;

        let savings = self
            .api
            .all_savings(token)
            .await?
            .into_iter()
            .find(|u| u.id == user_id);
        let transactions = self.api.transaction_history(token, user_id).await?;

        tracing::debug!(
            user_id,
            found = savings.is_some(),
            transactions = transactions.len(),
            "snapshot refreshed"
        );
        self.snapshot = Snapshot {
            savings,
            transactions,
        };
        Ok(&self.snapshot)
    }

    pub async fn deposit(&mut self, category_id: i64, amount: f64, note: &str) -> Result<(), CoreError> {
        validate_amount(amount)?;
        let user_id = self.user_id()?;
        let request = DepositRequest {
            user_id,
            amount,
            note: note.trim().to_string(),
        };
        self.api.deposit(self.token()?, category_id, &request).await?;
        tracing::info!(category_id, amount, "deposit recorded");
        self.refresh().await.map(|_| ())
    }

    /// Withdraw against the deposits made on `date` (`"YYYY-MM-DD"`, one of
    /// [`Self::deposit_dates`]).
    pub async fn withdraw(
        &mut self,
        category_id: i64,
        amount: f64,
        date: &str,
        note: &str,
    ) -> Result<(), CoreError> {
        validate_amount(amount)?;
        let date = date.trim();
        if date.is_empty() {
            return Err(CoreError::ValidationError(
                "Select the deposit date to withdraw from.".into(),
            ));
        }
        let user_id = self.user_id()?;
        let request = WithdrawRequest {
            category: category_id,
            withdraw_amount: amount,
            date: date.to_string(),
            note: note.trim().to_string(),
        };
        self.api.withdraw(self.token()?, user_id, &request).await?;
        tracing::info!(category_id, amount, date, "withdrawal recorded");
        self.refresh().await.map(|_| ())
    }

    pub async fn create_category(&mut self, request: &CategoryRequest) -> Result<(), CoreError> {
        validate_category(request)?;
        let user_id = self.user_id()?;
        self.api.create_category(self.token()?, user_id, request).await?;
        self.refresh().await.map(|_| ())
    }

    pub async fn update_category(&mut self, category_id: i64, request: &CategoryRequest) -> Result<(), CoreError> {
        validate_category(request)?;
        self.category(category_id)?;
        let user_id = self.user_id()?;
        self.api
            .update_category(self.token()?, user_id, category_id, request)
            .await?;
        self.refresh().await.map(|_| ())
    }

    pub async fn delete_category(&mut self, category_id: i64) -> Result<(), CoreError> {
        self.category(category_id)?;
        let user_id = self.user_id()?;
        self.api
            .delete_category(self.token()?, user_id, category_id)
            .await?;
        self.refresh().await.map(|_| ())
    }

    /// Update the signed-in user's own profile. Role and password are not
    /// sent from here.
    pub async fn update_profile(&mut self, update: UserUpdate) -> Result<(), CoreError> {
        let update = UserUpdate {
            role: None,
            password: None,
            ..update
        };
        let user_id = self.user_id()?;
        self.api.update_user(self.token()?, user_id, &update).await?;
        self.refresh().await.map(|_| ())
    }

    // ── Views ───────────────────────────────────────────────────────

    pub fn categories(&self) -> &[Category] {
        self.snapshot.categories()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.snapshot.transactions
    }

    pub fn trend(&self) -> Vec<TrendPoint> {
        self.trend_service.monthly_trend(&self.snapshot.transactions)
    }

    pub fn allocation(&self) -> Vec<AllocationSlice> {
        self.goal_service.allocation(self.categories())
    }

    pub fn goal_progress(&self, category_id: i64) -> Result<GoalProgress, CoreError> {
        Ok(self.goal_service.progress(self.category(category_id)?))
    }

    pub fn deadline_status(&self, category_id: i64, now: DateTime<Utc>) -> Result<Option<DeadlineStatus>, CoreError> {
        Ok(self.goal_service.deadline_status(self.category(category_id)?, now))
    }

    pub fn filtered_transactions(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        self.filter_service
            .filter(&self.snapshot.transactions, filter, &self.format)
    }

    pub fn category_options(&self) -> Vec<String> {
        self.filter_service.category_options(&self.snapshot.transactions)
    }

    /// CSV bytes of the filtered history, `None` when the filter matches
    /// nothing.
    pub fn export_csv(&self, filter: &TransactionFilter, join: CategoryJoin) -> Result<Option<Vec<u8>>, CoreError> {
        let rows = self.filtered_transactions(filter);
        let csv = self
            .export_service
            .to_csv(&rows, self.categories(), &self.format, join)?;
        if csv.is_none() {
            tracing::debug!("nothing to export");
        }
        Ok(csv)
    }

    pub fn summary(&self) -> DashboardSummary {
        self.summary_service
            .summary(self.snapshot.savings.as_ref(), &self.snapshot.transactions)
    }

    pub fn recent_transactions(&self) -> &[Transaction] {
        self.summary_service
            .recent(&self.snapshot.transactions, self.config.recent_limit)
    }

    pub fn deposit_dates(&self, category_id: i64) -> Vec<DepositDateOption> {
        self.summary_service
            .deposit_dates(&self.snapshot.transactions, category_id)
    }

    // ── Administration ──────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<UserSavings>, CoreError> {
        self.require_admin()?;
        self.api.all_savings(self.token()?).await
    }

    /// One user's profile and categories.
    pub async fn user(&self, user_id: i64) -> Result<UserSavings, CoreError> {
        self.require_admin()?;
        self.api.user_savings(self.token()?, user_id).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<(), CoreError> {
        self.require_admin()?;
        if user.email.trim().is_empty() || user.password.is_empty() {
            return Err(CoreError::ValidationError(
                "Email and password are required.".into(),
            ));
        }
        self.api.create_user(self.token()?, user).await?;
        tracing::info!(email = %user.email, "user created");
        Ok(())
    }

    /// Admin edit of any user; a blank password leaves it unchanged.
    pub async fn update_user(&self, user_id: i64, update: UserUpdate) -> Result<(), CoreError> {
        self.require_admin()?;
        self.api
            .update_user(self.token()?, user_id, &update.normalized())
            .await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), CoreError> {
        self.require_admin()?;
        self.api.delete_user(self.token()?, user_id).await?;
        tracing::info!(user_id, "user deleted");
        Ok(())
    }

    /// Category types offered when creating a category. Readable by anyone.
    pub fn category_types(&self) -> &[CategoryType] {
        &self.session.category_types
    }

    /// Returns the new entry, its id slugged from the label.
    pub fn add_category_type(&mut self, label: &str) -> Result<CategoryType, CoreError> {
        self.require_admin()?;
        let types = self.taxonomy_service.add(&self.session.category_types, label)?;
        let added = CategoryType::new(self.taxonomy_service.slug(label.trim()), label.trim());
        self.replace_category_types(types);
        Ok(added)
    }

    pub fn rename_category_type(&mut self, id: &str, label: &str) -> Result<(), CoreError> {
        self.require_admin()?;
        let types = self
            .taxonomy_service
            .rename(&self.session.category_types, id, label)?;
        self.replace_category_types(types);
        Ok(())
    }

    pub fn remove_category_type(&mut self, id: &str) -> Result<(), CoreError> {
        self.require_admin()?;
        let types = self.taxonomy_service.remove(&self.session.category_types, id);
        self.replace_category_types(types);
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn token(&self) -> Result<&str, CoreError> {
        self.session
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(CoreError::Unauthorized)
    }

    fn user_id(&self) -> Result<i64, CoreError> {
        self.current_user()
            .and_then(|c| c.id)
            .ok_or(CoreError::Unauthorized)
    }

    fn require_admin(&self) -> Result<(), CoreError> {
        self.token()?;
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden)
        }
    }

    fn category(&self, category_id: i64) -> Result<&Category, CoreError> {
        self.categories()
            .iter()
            .find(|c| c.category_id == category_id)
            .ok_or(CoreError::CategoryNotFound(category_id))
    }

    fn replace_category_types(&mut self, types: Vec<CategoryType>) {
        if types != self.session.category_types {
            self.session.category_types = types;
            self.dirty = true;
        }
        if self.session.ensure_category_types() {
            tracing::debug!("category types reseeded with defaults");
            self.dirty = true;
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CoreError::ValidationError(
            "Amount must be greater than zero.".into(),
        ))
    }
}

fn validate_category(request: &CategoryRequest) -> Result<(), CoreError> {
    if request.name.trim().is_empty() {
        return Err(CoreError::ValidationError("Category name is required.".into()));
    }
    if !request.amount.is_finite() || request.amount < 0.0 {
        return Err(CoreError::ValidationError(
            "Goal amount cannot be negative.".into(),
        ));
    }
    Ok(())
}
