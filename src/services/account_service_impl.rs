//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::domain::{Account, Permission};
use crate::forms::{FieldErrors, RegistrationForm, validate_password, validate_username};
use crate::services::account_service::{AccountError, AccountService, AccountSummary};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn hydrate(&self, user: User) -> Result<Account, AccountError> {
        let permissions = self.store.effective_permissions(user.id).await?;
        let groups = self.store.group_names_for_user(user.id).await?;

        Ok(Account {
            id: user.id,
            username: user.username,
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
            is_active: user.is_active,
            permissions,
            groups,
        })
    }

    async fn require_user(&self, username: &str) -> Result<User, AccountError> {
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AccountError::UserNotFound(username.to_string()))
    }

    async fn insert(&self, username: &str, password: &str) -> Result<Account, AccountError> {
        let user = self
            .store
            .create_user(username, password, &self.security)
            .await?;

        metrics::counter!("accounts_created_total").increment(1);
        info!(user_id = user.id, username = %user.username, superuser = user.is_superuser, "Account created");

        self.hydrate(user).await
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, form: &RegistrationForm) -> Result<Account, AccountError> {
        let mut errors = form.validate().err().unwrap_or_default();

        if !errors.contains("username")
            && self.store.get_user_by_username(&form.username).await?.is_some()
        {
            errors.add("username", USERNAME_TAKEN);
        }

        errors.into_result().map_err(AccountError::Validation)?;

        self.insert(&form.username, &form.password1).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AccountError::InvalidCredentials);
        }

        self.hydrate(user).await
    }

    async fn load_account(&self, id: i32) -> Result<Option<Account>, AccountError> {
        match self.store.get_user(id).await? {
            Some(user) => Ok(Some(self.hydrate(user).await?)),
            None => Ok(None),
        }
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let mut errors = FieldErrors::new();
        if let Err(message) = validate_username(username) {
            errors.add("username", message);
        } else if self.store.get_user_by_username(username).await?.is_some() {
            errors.add("username", USERNAME_TAKEN);
        }
        if let Err(message) = validate_password(password) {
            errors.add("password", message);
        }
        errors.into_result().map_err(AccountError::Validation)?;

        self.insert(username, password).await
    }

    async fn delete_account(&self, username: &str) -> Result<(), AccountError> {
        let user = self.require_user(username).await?;

        if !self.store.delete_user(user.id).await? {
            return Err(AccountError::UserNotFound(username.to_string()));
        }

        metrics::counter!("accounts_deleted_total").increment(1);
        info!(user_id = user.id, username = %username, "Account deleted");
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, AccountError> {
        let users = self.store.list_users().await?;

        Ok(users
            .into_iter()
            .map(|u| AccountSummary {
                id: u.id,
                username: u.username,
                is_superuser: u.is_superuser,
                is_staff: u.is_staff,
                is_active: u.is_active,
                created_at: u.created_at,
            })
            .collect())
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<(), AccountError> {
        let user = self.require_user(username).await?;

        if !self.store.set_user_active(user.id, is_active).await? {
            return Err(AccountError::UserNotFound(username.to_string()));
        }

        info!(user_id = user.id, username = %username, is_active, "Account activation changed");
        Ok(())
    }

    async fn grant(
        &self,
        username: &str,
        permissions: &[Permission],
    ) -> Result<usize, AccountError> {
        let user = self.require_user(username).await?;

        let mut granted = 0;
        for permission in permissions {
            if self
                .store
                .grant_user_permission(user.id, &permission.qualified())
                .await?
            {
                granted += 1;
            }
        }

        info!(username = %username, granted, "Granted permissions");
        Ok(granted)
    }

    async fn revoke(
        &self,
        username: &str,
        permissions: &[Permission],
    ) -> Result<usize, AccountError> {
        let user = self.require_user(username).await?;

        let mut revoked = 0;
        for permission in permissions {
            if self
                .store
                .revoke_user_permission(user.id, &permission.qualified())
                .await?
            {
                revoked += 1;
            }
        }

        info!(username = %username, revoked, "Revoked permissions");
        Ok(revoked)
    }

    async fn add_to_group(&self, group: &str, username: &str) -> Result<bool, AccountError> {
        let user = self.require_user(username).await?;
        let account = self.hydrate(user).await?;

        if account.is_in_group(group) {
            return Ok(false);
        }

        let group_row = self.store.get_or_create_group(group).await?;
        let added = self.store.add_group_member(group_row.id, account.id).await?;

        info!(group = %group, username = %username, "Added group member");
        Ok(added)
    }

    async fn grant_group(
        &self,
        group: &str,
        permissions: &[Permission],
    ) -> Result<usize, AccountError> {
        let group_row = self.store.get_or_create_group(group).await?;

        let mut granted = 0;
        for permission in permissions {
            if self
                .store
                .grant_group_permission(group_row.id, &permission.qualified())
                .await?
            {
                granted += 1;
            }
        }

        info!(group = %group, granted, "Granted group permissions");
        Ok(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmAccountService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        SeaOrmAccountService::new(store, security)
    }

    fn registration(username: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_string(),
            password1: "correct-horse".to_string(),
            password2: "correct-horse".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let service = service().await;
        service.register(&registration("ada")).await.unwrap();

        let err = service.register(&registration("ada")).await.unwrap_err();
        match err {
            AccountError::Validation(errors) => {
                assert_eq!(errors.get("username"), [USERNAME_TAKEN.to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_hides_failure_reason() {
        let service = service().await;
        let account = service.create_account("ada", "correct-horse").await.unwrap();

        assert!(service.authenticate("ada", "correct-horse").await.is_ok());
        assert!(matches!(
            service.authenticate("ada", "wrong-horse").await,
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("nobody", "correct-horse").await,
            Err(AccountError::InvalidCredentials)
        ));

        service.set_active("ada", false).await.unwrap();
        assert!(matches!(
            service.authenticate("ada", "correct-horse").await,
            Err(AccountError::InvalidCredentials)
        ));

        service.set_active("ada", true).await.unwrap();
        let again = service.authenticate("ada", "correct-horse").await.unwrap();
        assert_eq!(again.id, account.id);
    }

    #[tokio::test]
    async fn test_set_active_unknown_user() {
        let service = service().await;
        assert!(matches!(
            service.set_active("ghost", false).await,
            Err(AccountError::UserNotFound(name)) if name == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_group_permissions_are_inherited() {
        let service = service().await;
        service.create_account("root", "correct-horse").await.unwrap();
        let bob = service.create_account("bob", "correct-horse").await.unwrap();
        assert!(!bob.has_perm(Permission::VIEW_PCB_TYPE));

        service
            .grant_group("Viewers", &[Permission::VIEW_PCB_TYPE])
            .await
            .unwrap();
        assert!(service.add_to_group("Viewers", "bob").await.unwrap());
        assert!(!service.add_to_group("Viewers", "bob").await.unwrap());

        let bob = service.load_account(bob.id).await.unwrap().unwrap();
        assert!(bob.is_in_group("Viewers"));
        assert!(bob.has_perm(Permission::VIEW_PCB_TYPE));
        assert!(!bob.has_perm(Permission::ADD_PCB_TYPE));
    }

    #[tokio::test]
    async fn test_grant_and_revoke_direct_permissions() {
        let service = service().await;
        service.create_account("root", "correct-horse").await.unwrap();
        let bob = service.create_account("bob", "correct-horse").await.unwrap();

        let perms = [Permission::ADD_PCB_TYPE, Permission::CHANGE_PCB_TYPE];
        assert_eq!(service.grant("bob", &perms).await.unwrap(), 2);
        assert_eq!(service.grant("bob", &perms).await.unwrap(), 0);

        let loaded = service.load_account(bob.id).await.unwrap().unwrap();
        assert!(loaded.has_perm(Permission::ADD_PCB_TYPE));

        assert_eq!(
            service
                .revoke("bob", &[Permission::ADD_PCB_TYPE])
                .await
                .unwrap(),
            1
        );
        let loaded = service.load_account(bob.id).await.unwrap().unwrap();
        assert!(!loaded.has_perm(Permission::ADD_PCB_TYPE));
        assert!(loaded.has_perm(Permission::CHANGE_PCB_TYPE));
    }
}
