//! Application state management for the admin dashboard.
//!
//! This module contains the core `App` struct that manages all application
//! state, including UI state, cached data, the session manager, and
//! background task coordination.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::auth::{AuthError, CredentialStore, FileSessionStore, Navigation, SessionManager};
use crate::cache::{CacheAges, CacheManager};
use crate::config::Config;
use crate::models::{LovItem, LovItemDraft, LovType, UserRecap, UserSortColumn};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh produces a handful of messages; 16 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for catalog form text fields.
const MAX_FORM_FIELD_LENGTH: usize = 120;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Users,
    Items,
}

impl Tab {
    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Users => Tab::Items,
            Tab::Items => Tab::Users,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    EditingItem,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Catalog form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemFormFocus {
    Name,
    Type,
    Photo,
}

/// Whether another character fits in the email field.
pub fn can_add_email_char(current: &str) -> bool {
    current.len() < MAX_EMAIL_LENGTH
}

/// Whether another character fits in the password field.
pub fn can_add_password_char(current: &str) -> bool {
    current.len() < MAX_PASSWORD_LENGTH
}

/// Whether another character fits in a catalog form field.
pub fn can_add_form_char(current: &str) -> bool {
    current.len() < MAX_FORM_FIELD_LENGTH
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background refresh tasks.
///
/// These variants are sent through an MPSC channel from spawned fetch tasks
/// back to the main application loop, which is the only mutator of app state.
enum RefreshResult {
    /// User recapitulations fetched successfully
    Users(Vec<UserRecap>),
    /// Catalog items fetched successfully
    LovItems(Vec<LovItem>),
    /// A catalog create/update/delete completed (message for the status bar)
    MutationDone(String),
    /// An error occurred during a background task
    Error(String),
    /// Signal that all refresh tasks have completed
    RefreshComplete,
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionManager<FileSessionStore>,
    pub api: ApiClient,
    pub cache: CacheManager,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub search_query: String,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Users tab state
    pub user_selection: usize,
    pub expanded_user: Option<i64>,
    pub user_sort_column: UserSortColumn,
    pub user_sort_ascending: bool,

    // Items tab state
    pub item_selection: usize,
    pub item_form: LovItemDraft,
    pub item_form_focus: ItemFormFocus,
    pub item_form_photo_input: String,
    pub item_form_error: Option<String>,
    pub editing_item_id: Option<i64>,
    pub delete_target: Option<i64>,
    pub mutation_in_progress: bool,

    // Cached data
    pub users: Vec<UserRecap>,
    pub lov_items: Vec<LovItem>,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
    pending_lov_refresh: bool,

    // Status message
    pub status_message: Option<String>,

    // Cache ages for status bar
    pub cache_ages: CacheAges,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let store = FileSessionStore::new(cache_dir.join("session"))?;
        let session = SessionManager::new(store);
        debug!(authenticated = session.is_authenticated(), "Session loaded");

        let mut api = ApiClient::new(config.base_url())?;

        // If we have a valid session, set the token on the API client
        if session.is_authenticated() {
            if let Some(token) = session.token() {
                api.set_token(token);
                debug!("Token set on API client");
            }
        }

        let cache = CacheManager::new(cache_dir)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Pre-fill credentials from env vars, config, or keychain
        let login_email = std::env::var("SAYUR_ADMIN_EMAIL")
            .ok()
            .or_else(|| session.email())
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();

        let login_password = std::env::var("SAYUR_ADMIN_PASSWORD")
            .ok()
            .or_else(|| {
                if !login_email.is_empty() && CredentialStore::has_credentials(&login_email) {
                    CredentialStore::get_password(&login_email).ok()
                } else {
                    None
                }
            })
            .unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,
            cache,

            state: AppState::Normal,
            current_tab: Tab::Users,
            search_query: String::new(),

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            user_selection: 0,
            expanded_user: None,
            user_sort_column: UserSortColumn::Name,
            user_sort_ascending: true,

            item_selection: 0,
            item_form: LovItemDraft::default(),
            item_form_focus: ItemFormFocus::Name,
            item_form_photo_input: String::new(),
            item_form_error: None,
            editing_item_id: None,
            delete_target: None,
            mutation_in_progress: false,

            users: Vec::new(),
            lov_items: Vec::new(),

            refresh_rx: rx,
            refresh_tx: tx,
            pending_lov_refresh: false,

            status_message: None,
            cache_ages: Default::default(),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check if the admin has a valid, unexpired session
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let email = self.login_email.clone();
        let password = self.login_password.clone();
        self.login_error = None;

        match self.session.login(&self.api, &email, &password).await {
            Ok(Navigation::ProtectedArea) | Ok(Navigation::EntryPoint) => {
                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                if let Some(token) = self.session.token() {
                    self.api.set_token(token);
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                self.refresh_all_background();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(match e {
                    AuthError::Validation(msg) | AuthError::Authentication(msg) => msg,
                    AuthError::Authorization(msg) => msg,
                    AuthError::Transport(_) => {
                        "Unable to connect to server. Check your internet connection.".to_string()
                    }
                    AuthError::Storage(_) => {
                        "Could not save the session. Check disk permissions.".to_string()
                    }
                });
            }
        }
    }

    /// Clear the session and return to the login screen
    pub fn logout(&mut self) {
        self.session.logout();
        self.api.clear_token();
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear cache on logout");
        }
        self.users.clear();
        self.lov_items.clear();
        self.cache_ages = Default::default();
        self.login_password.clear();
        self.status_message = Some("Logged out".to_string());
        self.start_login();
    }

    /// Re-check the cached expiry; force the login screen when it has passed.
    /// Called once per event-loop tick.
    pub fn check_session(&mut self) {
        if matches!(self.state, AppState::LoggingIn | AppState::Quitting) {
            return;
        }
        match self.session.check_validity() {
            Ok(Some(Navigation::EntryPoint)) => {
                info!("Session expired, forcing login");
                self.api.clear_token();
                self.start_login();
                self.login_error = Some("Session expired. Please log in again.".to_string());
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Session validity check failed");
            }
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Load all data from cache
    pub fn load_from_cache(&mut self) -> Result<()> {
        if let Ok(Some(cached)) = self.cache.load_users() {
            self.users = cached.data;
        }

        if let Ok(Some(cached)) = self.cache.load_lov_items() {
            self.lov_items = cached.data;
        }

        self.cache_ages = self.cache.get_cache_ages();
        Ok(())
    }

    /// Check if any cache data is stale
    pub fn is_cache_stale(&self) -> bool {
        self.cache.any_stale()
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh all data
    pub fn refresh_all_background(&mut self) {
        let api = match self.authed_client() {
            Some(api) => api,
            None => {
                warn!("No token available for refresh");
                return;
            }
        };

        info!("Starting background refresh of all data");
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            let (users_res, items_res) =
                tokio::join!(api.fetch_user_recaps(), api.fetch_lov_items());

            match users_res {
                Ok(users) => {
                    debug!(count = users.len(), "Users fetched");
                    Self::send_result(&tx, RefreshResult::Users(users)).await;
                }
                Err(e) => {
                    error!(error = %e, "Users fetch failed");
                    Self::send_result(&tx, RefreshResult::Error(format!("Users: {}", e))).await;
                }
            }

            match items_res {
                Ok(items) => {
                    debug!(count = items.len(), "Catalog items fetched");
                    Self::send_result(&tx, RefreshResult::LovItems(items)).await;
                }
                Err(e) => {
                    error!(error = %e, "Catalog fetch failed");
                    Self::send_result(&tx, RefreshResult::Error(format!("Catalog: {}", e))).await;
                }
            }

            Self::send_result(&tx, RefreshResult::RefreshComplete).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Spawn a background task to refresh only the catalog
    fn refresh_lov_background(&mut self) {
        let api = match self.authed_client() {
            Some(api) => api,
            None => return,
        };

        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.fetch_lov_items().await {
                Ok(items) => Self::send_result(&tx, RefreshResult::LovItems(items)).await,
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Catalog: {}", e))).await
                }
            }
        });
    }

    /// An API client clone carrying the current session token.
    fn authed_client(&self) -> Option<ApiClient> {
        self.session.token().map(|token| self.api.with_token(token))
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_refresh_result(result);
        }

        if self.pending_lov_refresh {
            self.pending_lov_refresh = false;
            self.refresh_lov_background();
        }
    }

    /// Process a single refresh result from a background task.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Users(data) => {
                if let Err(e) = self.cache.save_users(&data) {
                    warn!(error = %e, "Failed to cache users");
                }
                self.users = data;
                self.user_selection = self
                    .user_selection
                    .min(self.users.len().saturating_sub(1));
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::LovItems(data) => {
                if let Err(e) = self.cache.save_lov_items(&data) {
                    warn!(error = %e, "Failed to cache catalog items");
                }
                self.lov_items = data;
                self.item_selection = self
                    .item_selection
                    .min(self.lov_items.len().saturating_sub(1));
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::MutationDone(msg) => {
                self.mutation_in_progress = false;
                self.status_message = Some(msg);
                self.pending_lov_refresh = true;
            }
            RefreshResult::RefreshComplete => {
                // Only clear status if it's a progress message, preserve errors
                if let Some(ref msg) = self.status_message {
                    if !msg.starts_with("Error:") {
                        self.status_message = None;
                    }
                }
            }
            RefreshResult::Error(msg) => {
                error!(error = %msg, "Background task error");
                self.mutation_in_progress = false;
                let user_message = if msg.to_lowercase().contains("unauthorized")
                    || msg.to_lowercase().contains("401")
                {
                    "Session rejected by server. Please log in again.".to_string()
                } else if msg.to_lowercase().contains("network")
                    || msg.to_lowercase().contains("connect")
                {
                    "Network error. Check your connection.".to_string()
                } else {
                    format!("Error: {}", msg)
                };
                self.status_message = Some(user_message);
            }
        }
    }

    // =========================================================================
    // Users tab
    // =========================================================================

    /// Users filtered by the search query and sorted by the current column.
    pub fn visible_users(&self) -> Vec<&UserRecap> {
        let query = self.search_query.to_lowercase();
        let mut users: Vec<&UserRecap> = self
            .users
            .iter()
            .filter(|u| {
                query.is_empty()
                    || u.name.to_lowercase().contains(&query)
                    || u.email.to_lowercase().contains(&query)
            })
            .collect();

        users.sort_by(|a, b| {
            let ordering = match self.user_sort_column {
                UserSortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                UserSortColumn::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
                UserSortColumn::IncomeKg => a
                    .total_income_kg()
                    .partial_cmp(&b.total_income_kg())
                    .unwrap_or(std::cmp::Ordering::Equal),
                UserSortColumn::ExpenseKg => a
                    .total_expense_kg()
                    .partial_cmp(&b.total_expense_kg())
                    .unwrap_or(std::cmp::Ordering::Equal),
            };
            if self.user_sort_ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        users
    }

    /// The user currently under the cursor, if any.
    pub fn selected_user(&self) -> Option<&UserRecap> {
        self.visible_users().get(self.user_selection).copied()
    }

    /// Toggle the transaction detail pane for the selected user.
    pub fn toggle_expand_selected(&mut self) {
        let id = match self.selected_user() {
            Some(user) => user.id,
            None => return,
        };
        self.expanded_user = if self.expanded_user == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    /// Cycle the user sort column, flipping direction on a repeat.
    pub fn sort_users_by(&mut self, column: UserSortColumn) {
        if self.user_sort_column == column {
            self.user_sort_ascending = !self.user_sort_ascending;
        } else {
            self.user_sort_column = column;
            self.user_sort_ascending = true;
        }
    }

    // =========================================================================
    // Items tab
    // =========================================================================

    /// The catalog item currently under the cursor, if any.
    pub fn selected_item(&self) -> Option<&LovItem> {
        self.lov_items.get(self.item_selection)
    }

    /// Open the catalog form for a new entry.
    pub fn start_create_item(&mut self) {
        self.item_form = LovItemDraft {
            item_type: Some(LovType::Vegetables),
            ..Default::default()
        };
        self.item_form_photo_input.clear();
        self.item_form_error = None;
        self.item_form_focus = ItemFormFocus::Name;
        self.editing_item_id = None;
        self.state = AppState::EditingItem;
    }

    /// Open the catalog form pre-filled from the selected entry.
    pub fn start_edit_item(&mut self) {
        let item = match self.selected_item() {
            Some(item) => item.clone(),
            None => return,
        };
        self.item_form = LovItemDraft::from_item(&item);
        self.item_form_photo_input.clear();
        self.item_form_error = None;
        self.item_form_focus = ItemFormFocus::Name;
        self.editing_item_id = Some(item.id);
        self.state = AppState::EditingItem;
    }

    /// Ask for confirmation before deleting the selected entry.
    pub fn start_delete_item(&mut self) {
        if let Some(item) = self.selected_item() {
            self.delete_target = Some(item.id);
            self.state = AppState::ConfirmingDelete;
        }
    }

    /// Validate the catalog form and spawn the create/update request.
    pub fn submit_item_form(&mut self) {
        let mut draft = self.item_form.clone();
        let photo_input = self.item_form_photo_input.trim();
        if !photo_input.is_empty() {
            draft.photo = Some(std::path::PathBuf::from(photo_input));
        }

        if !draft.is_complete() {
            self.item_form_error = Some("Name and type are required".to_string());
            return;
        }
        // A brand-new entry needs a photo; an edit may keep the existing one
        if self.editing_item_id.is_none() && draft.photo.is_none() {
            self.item_form_error = Some("A photo path is required for new items".to_string());
            return;
        }

        let api = match self.authed_client() {
            Some(api) => api,
            None => {
                self.item_form_error = Some("Not authenticated".to_string());
                return;
            }
        };

        let tx = self.refresh_tx.clone();
        let editing = self.editing_item_id;
        self.mutation_in_progress = true;
        self.item_form_error = None;
        self.state = AppState::Normal;
        self.status_message = Some("Saving item...".to_string());

        tokio::spawn(async move {
            let result = match editing {
                Some(id) => api.update_lov_item(id, &draft).await.map(|_| "Item updated"),
                None => api.create_lov_item(&draft).await.map(|_| "Item added"),
            };
            match result {
                Ok(msg) => {
                    Self::send_result(&tx, RefreshResult::MutationDone(msg.to_string())).await
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Save item: {}", e))).await
                }
            }
        });
    }

    /// Spawn the delete request for the confirmed target.
    pub fn delete_confirmed_item(&mut self) {
        let id = match self.delete_target.take() {
            Some(id) => id,
            None => return,
        };

        let api = match self.authed_client() {
            Some(api) => api,
            None => return,
        };

        let tx = self.refresh_tx.clone();
        self.mutation_in_progress = true;
        self.state = AppState::Normal;
        self.status_message = Some("Deleting item...".to_string());

        tokio::spawn(async move {
            match api.delete_lov_item(id).await {
                Ok(()) => {
                    Self::send_result(&tx, RefreshResult::MutationDone("Item deleted".to_string()))
                        .await
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Delete item: {}", e)))
                        .await
                }
            }
        });
    }

    // =========================================================================
    // Aggregates for the Users tab stat cards
    // =========================================================================

    /// Total income across all users, in kilograms.
    pub fn total_income_kg(&self) -> f64 {
        self.users.iter().map(|u| u.total_income_kg()).sum()
    }

    /// Total expense across all users, in kilograms.
    pub fn total_expense_kg(&self) -> f64 {
        self.users.iter().map(|u| u.total_expense_kg()).sum()
    }
}
