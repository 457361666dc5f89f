//! Domain service for accounts, groups and permission grants.
//!
//! Account creation and deletion go through the account store, which applies
//! the first-account bootstrap rule in the same transaction.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Account, Permission};
use crate::forms::{FieldErrors, RegistrationForm};

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Unknown username, wrong password or inactive account. Callers must
    /// not reveal which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Account row for listings.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: String,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Self-registration. Validates the form, including username
    /// uniqueness, then creates the account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] with field errors.
    async fn register(&self, form: &RegistrationForm) -> Result<Account, AccountError>;

    /// Verifies credentials of an active account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] if login fails.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<Account, AccountError>;

    /// Loads an account with its effective permissions, `None` if the id is
    /// unknown.
    async fn load_account(&self, id: i32) -> Result<Option<Account>, AccountError>;

    /// Administrative creation; same rules as registration minus the
    /// confirmation field.
    async fn create_account(&self, username: &str, password: &str)
    -> Result<Account, AccountError>;

    async fn delete_account(&self, username: &str) -> Result<(), AccountError>;

    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, AccountError>;

    /// Inactive accounts keep their data but can no longer sign in.
    async fn set_active(&self, username: &str, is_active: bool) -> Result<(), AccountError>;

    /// Grants direct permissions, returning how many were new.
    async fn grant(&self, username: &str, permissions: &[Permission])
    -> Result<usize, AccountError>;

    /// Revokes direct permissions, returning how many were removed.
    async fn revoke(
        &self,
        username: &str,
        permissions: &[Permission],
    ) -> Result<usize, AccountError>;

    /// Adds the user to the group, creating the group if needed. Returns
    /// `false` if the user already was a member.
    async fn add_to_group(&self, group: &str, username: &str) -> Result<bool, AccountError>;

    /// Grants permissions to a group, creating the group if needed.
    async fn grant_group(
        &self,
        group: &str,
        permissions: &[Permission],
    ) -> Result<usize, AccountError>;
}
