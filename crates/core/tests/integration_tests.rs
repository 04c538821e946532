// ═══════════════════════════════════════════════════════════════════
// Integration Tests — SavingsWallet facade over an in-memory backend
// ═══════════════════════════════════════════════════════════════════

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

use savings_wallet_core::api::dto::{CategoryRequest, DepositRequest, PasswordChange, WithdrawRequest};
use savings_wallet_core::api::traits::WalletApi;
use savings_wallet_core::config::ClientConfig;
use savings_wallet_core::errors::CoreError;
use savings_wallet_core::models::report::DeadlineStatus;
use savings_wallet_core::models::session::{default_category_types, Session, Theme};
use savings_wallet_core::models::transaction::{Transaction, TransactionType};
use savings_wallet_core::models::user::{NewUser, UserSavings, UserUpdate, ROLE_ADMIN, ROLE_USER};
use savings_wallet_core::services::export_service::CategoryJoin;
use savings_wallet_core::services::filter_service::TransactionFilter;
use savings_wallet_core::SavingsWallet;

// ═══════════════════════════════════════════════════════════════════
// Mock backend
// ═══════════════════════════════════════════════════════════════════

const USER_ID: i64 = 5;
const ADMIN_ID: i64 = 1;

fn token_for(id: i64, role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
    let payload = json!({
        "id": id,
        "email": format!("user{id}@example.com"),
        "firstName": "Ana",
        "lastName": "Reyes",
        "roles": [role],
    });
    format!("{header}.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
}

#[derive(Default)]
struct MockState {
    users: Vec<UserSavings>,
    transactions: Vec<Transaction>,
    deposits: Vec<(i64, DepositRequest)>,
    withdrawals: Vec<(i64, WithdrawRequest)>,
    categories_created: Vec<CategoryRequest>,
    user_updates: Vec<(i64, UserUpdate)>,
    users_created: Vec<NewUser>,
    password_changes: usize,
    fail_history: bool,
    calls: usize,
}

#[derive(Clone)]
struct MockWalletApi {
    state: Arc<Mutex<MockState>>,
}

impl MockWalletApi {
    fn new() -> Self {
        let user: UserSavings = serde_json::from_value(json!({
            "id": USER_ID,
            "firstName": "Ana",
            "lastName": "Reyes",
            "email": "ana@example.com",
            "roles": [ROLE_USER],
            "depositedAmountSubtotal": 800,
            "categories": [
                { "category_id": 1, "name": "Trip", "amount": 1000, "savingsCurrentAmount": 600,
                  "type": "savings", "goalDeadline": "2025-03-05" },
                { "category_id": 3, "name": "Emergency Fund", "amount": 0, "savingsCurrentAmount": 0 }
            ]
        }))
        .unwrap();
        let admin: UserSavings = serde_json::from_value(json!({
            "id": ADMIN_ID,
            "firstName": "Root",
            "lastName": "Admin",
            "roles": [ROLE_ADMIN],
        }))
        .unwrap();

        let state = MockState {
            users: vec![admin, user],
            transactions: vec![
                Transaction::deposit("Trip", 500.0, "2024-01-05T10:00:00").with_category_id(1),
                Transaction::withdrawal("Trip", 200.0, "2024-01-20T10:00:00").with_category_id(1),
                Transaction::deposit("Trip", 300.0, "2024-02-01T10:00:00").with_category_id(1),
            ],
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl WalletApi for MockWalletApi {
    async fn login(&self, email: &str, password: &str) -> Result<String, CoreError> {
        self.state().calls += 1;
        match (email, password) {
            (_, p) if p != "secret" => Err(CoreError::Api {
                status: 401,
                message: "Invalid email or password".into(),
            }),
            ("admin@example.com", _) => Ok(token_for(ADMIN_ID, ROLE_ADMIN)),
            ("broken@example.com", _) => Ok("not-a-jwt".into()),
            _ => Ok(token_for(USER_ID, ROLE_USER)),
        }
    }

    async fn change_password(&self, _token: &str, _change: &PasswordChange) -> Result<(), CoreError> {
        self.state().password_changes += 1;
        Ok(())
    }

    async fn all_savings(&self, _token: &str) -> Result<Vec<UserSavings>, CoreError> {
        let mut state = self.state();
        state.calls += 1;
        Ok(state.users.clone())
    }

    async fn user_savings(&self, _token: &str, user_id: i64) -> Result<UserSavings, CoreError> {
        self.state()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(CoreError::Api {
                status: 404,
                message: "User not found".into(),
            })
    }

    async fn create_user(&self, _token: &str, user: &NewUser) -> Result<(), CoreError> {
        self.state().users_created.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, _token: &str, user_id: i64, update: &UserUpdate) -> Result<(), CoreError> {
        self.state().user_updates.push((user_id, update.clone()));
        Ok(())
    }

    async fn delete_user(&self, _token: &str, user_id: i64) -> Result<(), CoreError> {
        self.state().users.retain(|u| u.id != user_id);
        Ok(())
    }

    async fn deposit(&self, _token: &str, category_id: i64, request: &DepositRequest) -> Result<(), CoreError> {
        let mut state = self.state();
        state.deposits.push((category_id, request.clone()));
        state.transactions.insert(
            0,
            Transaction::deposit("Trip", request.amount, "2024-03-01T09:00:00")
                .with_category_id(category_id),
        );
        Ok(())
    }

    async fn withdraw(&self, _token: &str, user_id: i64, request: &WithdrawRequest) -> Result<(), CoreError> {
        self.state().withdrawals.push((user_id, request.clone()));
        Ok(())
    }

    async fn create_category(&self, _token: &str, _user_id: i64, request: &CategoryRequest) -> Result<(), CoreError> {
        self.state().categories_created.push(request.clone());
        Ok(())
    }

    async fn update_category(
        &self,
        _token: &str,
        _user_id: i64,
        _category_id: i64,
        _request: &CategoryRequest,
    ) -> Result<(), CoreError> {
        Ok(())
    }

    async fn delete_category(&self, _token: &str, _user_id: i64, _category_id: i64) -> Result<(), CoreError> {
        Ok(())
    }

    async fn transaction_history(&self, _token: &str, _user_id: i64) -> Result<Vec<Transaction>, CoreError> {
        let mut state = self.state();
        state.calls += 1;
        if state.fail_history {
            return Err(CoreError::Network("connection reset".into()));
        }
        Ok(state.transactions.clone())
    }
}

fn wallet(api: &MockWalletApi) -> SavingsWallet {
    SavingsWallet::new(ClientConfig::default(), Session::default(), Box::new(api.clone())).unwrap()
}

async fn signed_in(api: &MockWalletApi, email: &str) -> SavingsWallet {
    let mut w = wallet(api);
    w.login(email, "secret").await.unwrap();
    w.refresh().await.unwrap();
    w
}

// ═══════════════════════════════════════════════════════════════════
// Authentication
// ═══════════════════════════════════════════════════════════════════

mod authentication {
    use super::*;

    #[tokio::test]
    async fn login_stores_token_and_claims() {
        let api = MockWalletApi::new();
        let mut w = wallet(&api);
        let claims = w.login("ana@example.com", "secret").await.unwrap();

        assert_eq!(claims.id, Some(USER_ID));
        assert!(w.session().is_signed_in());
        assert!(!w.is_admin());
        assert_eq!(w.current_user().unwrap().initials(), "AR");
        assert!(w.has_unsaved_changes());
    }

    #[tokio::test]
    async fn bad_password_surfaces_server_message() {
        let api = MockWalletApi::new();
        let mut w = wallet(&api);
        let err = w.login("ana@example.com", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!w.session().is_signed_in());
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_the_server() {
        let api = MockWalletApi::new();
        let mut w = wallet(&api);
        let err = w.login("   ", "secret").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(api.state().calls, 0);
    }

    #[tokio::test]
    async fn unreadable_token_is_not_stored() {
        let api = MockWalletApi::new();
        let mut w = wallet(&api);
        assert!(w.login("broken@example.com", "secret").await.is_err());
        assert!(!w.session().is_signed_in());
    }

    #[tokio::test]
    async fn calls_before_login_are_unauthorized() {
        let api = MockWalletApi::new();
        let mut w = wallet(&api);
        assert!(matches!(w.refresh().await, Err(CoreError::Unauthorized)));
        assert!(matches!(w.deposit(1, 10.0, "").await, Err(CoreError::Unauthorized)));
        assert!(matches!(w.list_users().await, Err(CoreError::Unauthorized)));
    }

    #[tokio::test]
    async fn logout_keeps_theme_and_taxonomy() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;
        w.set_theme(Theme::Light);

        w.logout();

        assert!(!w.session().is_signed_in());
        assert!(w.transactions().is_empty());
        assert!(w.categories().is_empty());
        assert_eq!(w.theme(), Theme::Light);
        assert_eq!(w.category_types().len(), 5);
    }

    #[tokio::test]
    async fn change_password_requires_matching_confirmation() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "ana@example.com").await;

        let mismatch = PasswordChange {
            current_password: "secret".into(),
            new_password: "n3w".into(),
            confirm_password: "new".into(),
        };
        assert!(matches!(
            w.change_password(&mismatch).await,
            Err(CoreError::ValidationError(_))
        ));

        let ok = PasswordChange {
            confirm_password: "n3w".into(),
            ..mismatch
        };
        w.change_password(&ok).await.unwrap();
        assert_eq!(api.state().password_changes, 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Snapshot & views
// ═══════════════════════════════════════════════════════════════════

mod views {
    use super::*;

    #[tokio::test]
    async fn refresh_picks_own_user() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "ana@example.com").await;

        let savings = w.snapshot().savings.as_ref().unwrap();
        assert_eq!(savings.id, USER_ID);
        assert_eq!(w.categories().len(), 2);
        assert_eq!(w.transactions().len(), 3);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;

        api.state().fail_history = true;
        api.state().transactions.clear();
        assert!(matches!(w.refresh().await, Err(CoreError::Network(_))));
        assert_eq!(w.transactions().len(), 3);
        assert!(w.snapshot().savings.is_some());
    }

    #[tokio::test]
    async fn trend_allocation_and_summary() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "ana@example.com").await;

        let trend = w.trend();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].label, "Jan 24");
        assert_eq!(trend[0].deposits_total, 500.0);
        assert_eq!(trend[0].withdrawals_total, 200.0);

        let allocation = w.allocation();
        assert_eq!(allocation.len(), 1);
        assert_eq!(allocation[0].name, "Trip");

        let summary = w.summary();
        assert_eq!(summary.total_goal_amount, 1000.0);
        assert_eq!(summary.total_deposited, 800.0);
        assert_eq!(summary.total_withdrawn, 200.0);
        assert_eq!(summary.category_count, 2);
    }

    #[tokio::test]
    async fn goal_progress_and_deadline() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "ana@example.com").await;

        let progress = w.goal_progress(1).unwrap();
        assert_eq!(progress.percent, 60.0);
        assert_eq!(progress.remaining, 400.0);

        let now = Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();
        assert!(matches!(
            w.deadline_status(1, now).unwrap(),
            Some(DeadlineStatus::DueToday { .. })
        ));
        assert_eq!(w.deadline_status(3, now).unwrap(), None);
        assert!(matches!(w.goal_progress(99), Err(CoreError::CategoryNotFound(99))));
    }

    #[tokio::test]
    async fn recent_is_limited_by_config() {
        let api = MockWalletApi::new();
        let config = ClientConfig {
            recent_limit: 2,
            ..ClientConfig::default()
        };
        let mut w = SavingsWallet::new(config, Session::default(), Box::new(api.clone())).unwrap();
        w.login("ana@example.com", "secret").await.unwrap();
        w.refresh().await.unwrap();
        assert_eq!(w.recent_transactions().len(), 2);
    }

    #[tokio::test]
    async fn filter_options_and_export() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "ana@example.com").await;

        assert_eq!(w.category_options(), ["Trip"]);

        let deposits = TransactionFilter::default().with_kind(TransactionType::Deposit);
        assert_eq!(w.filtered_transactions(&deposits).len(), 2);

        let csv = w.export_csv(&deposits, CategoryJoin::ByName).unwrap().unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("\"Deposit\",\"Trip\",\"+500.00\""));
        assert!(text.contains("\"1,000.00\",\"600.00\",\"400.00\",\"60\",\"No\""));

        let nothing = TransactionFilter::default().with_query("no such thing");
        assert_eq!(w.export_csv(&nothing, CategoryJoin::ByName).unwrap(), None);
    }

    #[tokio::test]
    async fn deposit_dates_for_withdrawal() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "ana@example.com").await;

        let dates = w.deposit_dates(1);
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].date, "2024-01-05");
        assert_eq!(dates[1].label, "February 01, 2024");
        assert!(w.deposit_dates(3).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mutations
// ═══════════════════════════════════════════════════════════════════

mod mutations {
    use super::*;

    #[tokio::test]
    async fn deposit_rejects_non_positive_amounts() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;

        for amount in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                w.deposit(1, amount, "").await,
                Err(CoreError::ValidationError(_))
            ));
        }
        assert!(api.state().deposits.is_empty());
    }

    #[tokio::test]
    async fn deposit_sends_user_and_refreshes() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;

        w.deposit(1, 250.0, "  bonus ").await.unwrap();

        let (category_id, request) = api.state().deposits[0].clone();
        assert_eq!(category_id, 1);
        assert_eq!(request.user_id, USER_ID);
        assert_eq!(request.amount, 250.0);
        assert_eq!(request.note, "bonus");
        assert_eq!(w.transactions().len(), 4);
        assert_eq!(w.transactions()[0].value(), 250.0);
    }

    #[tokio::test]
    async fn withdraw_needs_a_deposit_date() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;

        assert!(matches!(
            w.withdraw(1, 50.0, " ", "").await,
            Err(CoreError::ValidationError(_))
        ));

        w.withdraw(1, 50.0, "2024-01-05", "souvenirs").await.unwrap();
        let (user_id, request) = api.state().withdrawals[0].clone();
        assert_eq!(user_id, USER_ID);
        assert_eq!(request.category, 1);
        assert_eq!(request.withdraw_amount, 50.0);
        assert_eq!(request.date, "2024-01-05");
    }

    #[tokio::test]
    async fn create_category_validates_name() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;

        let mut request = CategoryRequest {
            name: "  ".into(),
            amount: 1500.0,
            category_type: "savings".into(),
            goal_deadline: NaiveDate::from_ymd_opt(2026, 12, 31),
        };
        assert!(matches!(
            w.create_category(&request).await,
            Err(CoreError::ValidationError(_))
        ));

        request.name = "Wedding".into();
        w.create_category(&request).await.unwrap();
        assert_eq!(api.state().categories_created.len(), 1);
    }

    #[tokio::test]
    async fn unknown_category_cannot_be_changed() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;
        assert!(matches!(
            w.delete_category(42).await,
            Err(CoreError::CategoryNotFound(42))
        ));
    }

    #[tokio::test]
    async fn profile_update_never_sends_role_or_password() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;

        let update = UserUpdate {
            first_name: "Ana".into(),
            role: Some(ROLE_ADMIN.into()),
            password: Some("sneaky".into()),
            ..UserUpdate::default()
        };
        w.update_profile(update).await.unwrap();

        let (user_id, sent) = api.state().user_updates[0].clone();
        assert_eq!(user_id, USER_ID);
        assert_eq!(sent.role, None);
        assert_eq!(sent.password, None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Administration
// ═══════════════════════════════════════════════════════════════════

mod administration {
    use super::*;

    #[tokio::test]
    async fn regular_user_is_forbidden() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;

        assert!(matches!(w.list_users().await, Err(CoreError::Forbidden)));
        assert!(matches!(w.delete_user(ADMIN_ID).await, Err(CoreError::Forbidden)));
        assert!(matches!(w.add_category_type("Travel"), Err(CoreError::Forbidden)));
        assert_eq!(w.category_types().len(), 5);
    }

    #[tokio::test]
    async fn admin_manages_users() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "admin@example.com").await;
        assert!(w.is_admin());

        assert_eq!(w.list_users().await.unwrap().len(), 2);

        let update = UserUpdate {
            role: Some(ROLE_USER.into()),
            password: Some("   ".into()),
            ..UserUpdate::default()
        };
        w.update_user(USER_ID, update).await.unwrap();
        let (_, sent) = api.state().user_updates[0].clone();
        assert_eq!(sent.role.as_deref(), Some(ROLE_USER));
        assert_eq!(sent.password, None);

        w.delete_user(USER_ID).await.unwrap();
        assert_eq!(w.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn admin_create_user_requires_credentials() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "admin@example.com").await;

        let user = NewUser {
            first_name: "Ben".into(),
            middle_name: String::new(),
            last_name: "Cruz".into(),
            occupation: "Nurse".into(),
            email: String::new(),
            password: "pw".into(),
            monthly_salary: 30_000.0,
            role: ROLE_USER.into(),
        };
        assert!(matches!(
            w.create_user(&user).await,
            Err(CoreError::ValidationError(_))
        ));

        let user = NewUser {
            email: "ben@example.com".into(),
            ..user
        };
        w.create_user(&user).await.unwrap();
        assert_eq!(api.state().users_created.len(), 1);
    }

    #[tokio::test]
    async fn admin_edits_taxonomy() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "admin@example.com").await;
        w.save_session_to_bytes("pass").unwrap();
        assert!(!w.has_unsaved_changes());

        let added = w.add_category_type("Travel Fund").unwrap();
        assert_eq!(added.id, "travel-fund");
        assert!(w.has_unsaved_changes());

        assert!(matches!(
            w.add_category_type("travel   fund"),
            Err(CoreError::DuplicateCategoryType(_))
        ));

        w.rename_category_type("travel-fund", "Vacation").unwrap();
        assert!(w.category_types().iter().any(|t| t.id == "vacation"));

        w.remove_category_type("vacation").unwrap();
        assert_eq!(w.category_types().len(), 5);
    }

    #[tokio::test]
    async fn removing_every_type_restores_defaults() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "admin@example.com").await;
        w.add_category_type("Travel Fund").unwrap();

        for id in ["savings", "investment", "insurance", "emergency", "other", "travel-fund"] {
            w.remove_category_type(id).unwrap();
        }

        assert_eq!(w.category_types(), default_category_types().as_slice());
        assert!(w.has_unsaved_changes());
    }

    #[tokio::test]
    async fn admin_looks_up_one_user() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "admin@example.com").await;

        let user = w.user(USER_ID).await.unwrap();
        assert_eq!(user.full_name(), "Ana Reyes");
        assert_eq!(user.categories.len(), 2);
        assert!(matches!(w.user(404).await, Err(CoreError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn user_lookup_is_admin_only() {
        let api = MockWalletApi::new();
        let w = signed_in(&api, "ana@example.com").await;
        assert!(matches!(w.user(ADMIN_ID).await, Err(CoreError::Forbidden)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Session persistence
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[tokio::test]
    async fn theme_survives_save_and_load() {
        let api = MockWalletApi::new();
        let mut w = signed_in(&api, "ana@example.com").await;
        assert_eq!(w.toggle_theme(), Theme::Light);

        let bytes = w.save_session_to_bytes("pass").unwrap();
        assert!(!w.has_unsaved_changes());

        let restored =
            SavingsWallet::load_session_from_bytes(ClientConfig::default(), &bytes, "pass", Box::new(api.clone()))
                .unwrap();
        assert_eq!(restored.theme(), Theme::Light);
        assert!(restored.session().is_signed_in());
        assert_eq!(restored.current_user().unwrap().id, Some(USER_ID));
        assert!(!restored.has_unsaved_changes());
    }

    #[tokio::test]
    async fn session_file_first_run() {
        let api = MockWalletApi::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.swsn");
        let path = path.to_str().unwrap();

        let mut w =
            SavingsWallet::load_session_from_file(ClientConfig::default(), path, "pass", Box::new(api.clone()))
                .unwrap();
        assert!(!w.session().is_signed_in());

        w.set_theme(Theme::Light);
        w.save_session_to_file(path, "pass").unwrap();

        let again =
            SavingsWallet::load_session_from_file(ClientConfig::default(), path, "pass", Box::new(api.clone()))
                .unwrap();
        assert_eq!(again.theme(), Theme::Light);
    }

    #[test]
    fn bad_timezone_config_fails_construction() {
        let api = MockWalletApi::new();
        let config = ClientConfig {
            display_timezone: "Nowhere/Special".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            SavingsWallet::new(config, Session::default(), Box::new(api)),
            Err(CoreError::Config(_))
        ));
    }
}
