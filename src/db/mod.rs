use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::{Page, PcbType};

pub mod migrator;
pub mod repositories;

pub use repositories::group::Group;
pub use repositories::pcb_type::DeleteOutcome;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        // Every connection to an in-memory database is its own database.
        if in_memory {
            let keep = Duration::from_secs(60 * 60 * 24 * 365);
            opt.max_connections(1)
                .min_connections(1)
                .idle_timeout(keep)
                .max_lifetime(keep);
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn pcb_type_repo(&self) -> repositories::pcb_type::PcbTypeRepository {
        repositories::pcb_type::PcbTypeRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn permission_repo(&self) -> repositories::permission::PermissionRepository {
        repositories::permission::PermissionRepository::new(self.conn.clone())
    }

    fn group_repo(&self) -> repositories::group::GroupRepository {
        repositories::group::GroupRepository::new(self.conn.clone())
    }

    // PCB types

    pub async fn create_pcb_type(&self, name: &str, description: &str) -> Result<PcbType> {
        self.pcb_type_repo().create(name, description).await
    }

    pub async fn update_pcb_type(
        &self,
        id: i32,
        name: &str,
        description: &str,
    ) -> Result<Option<PcbType>> {
        self.pcb_type_repo().update(id, name, description).await
    }

    pub async fn delete_pcb_type(&self, id: i32) -> Result<bool> {
        self.pcb_type_repo().delete(id).await
    }

    pub async fn delete_pcb_type_if_named(
        &self,
        id: i32,
        confirm_name: &str,
    ) -> Result<DeleteOutcome> {
        self.pcb_type_repo().delete_if_named(id, confirm_name).await
    }

    pub async fn get_pcb_type(&self, id: i32) -> Result<Option<PcbType>> {
        self.pcb_type_repo().get(id).await
    }

    pub async fn list_pcb_types(&self, filter: Option<&str>) -> Result<Vec<PcbType>> {
        self.pcb_type_repo().list(filter).await
    }

    pub async fn page_pcb_types(
        &self,
        filter: Option<&str>,
        requested_page: i64,
        page_size: u64,
    ) -> Result<Page<PcbType>> {
        self.pcb_type_repo()
            .page(filter, requested_page, page_size)
            .await
    }

    pub async fn count_pcb_types(&self) -> Result<u64> {
        self.pcb_type_repo().count().await
    }

    pub async fn insert_pcb_types(&self, records: Vec<(String, String)>) -> Result<u64> {
        self.pcb_type_repo().insert_many(records).await
    }

    // Accounts

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(username, password, config).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn set_user_active(&self, id: i32, is_active: bool) -> Result<bool> {
        self.user_repo().set_active(id, is_active).await
    }

    // Permissions and groups

    pub async fn grant_user_permission(&self, user_id: i32, codename: &str) -> Result<bool> {
        self.permission_repo().grant_user(user_id, codename).await
    }

    pub async fn revoke_user_permission(&self, user_id: i32, codename: &str) -> Result<bool> {
        self.permission_repo().revoke_user(user_id, codename).await
    }

    pub async fn grant_group_permission(&self, group_id: i32, codename: &str) -> Result<bool> {
        self.permission_repo().grant_group(group_id, codename).await
    }

    pub async fn effective_permissions(&self, user_id: i32) -> Result<BTreeSet<String>> {
        self.permission_repo().effective_for_user(user_id).await
    }

    pub async fn get_or_create_group(&self, name: &str) -> Result<Group> {
        self.group_repo().get_or_create(name).await
    }

    pub async fn add_group_member(&self, group_id: i32, user_id: i32) -> Result<bool> {
        self.group_repo().add_member(group_id, user_id).await
    }

    pub async fn group_names_for_user(&self, user_id: i32) -> Result<BTreeSet<String>> {
        self.group_repo().names_for_user(user_id).await
    }
}
