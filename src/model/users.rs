//! Local user accounts and the current session

use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{read_json, write_json, StoreError, StoreResult};

const USERS_FILE: &str = "users.json";
const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Session {
    user_id: Option<Uuid>,
}

/// Registered users plus the logged-in session, persisted under the data dir
#[derive(Clone)]
pub struct UserStore {
    users_path: PathBuf,
    session_path: PathBuf,
    users: Arc<RwLock<Vec<User>>>,
    session: Arc<RwLock<Session>>,
    hash_cost: u32,
}

impl UserStore {
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        Self::open_with_cost(data_dir, bcrypt::DEFAULT_COST)
    }

    pub fn open_with_cost(data_dir: &Path, hash_cost: u32) -> StoreResult<Self> {
        let users_path = data_dir.join(USERS_FILE);
        let session_path = data_dir.join(SESSION_FILE);
        let users: Vec<User> = read_json(&users_path)?;
        let mut session: Session = read_json(&session_path)?;

        // A session pointing at a deleted account is dropped
        if let Some(id) = session.user_id {
            if !users.iter().any(|u| u.id == id) {
                tracing::warn!(user_id = %id, "Session refers to unknown user, clearing");
                session.user_id = None;
            }
        }

        tracing::debug!(users = users.len(), logged_in = session.user_id.is_some(), "User store loaded");

        Ok(Self {
            users_path,
            session_path,
            users: Arc::new(RwLock::new(users)),
            session: Arc::new(RwLock::new(session)),
            hash_cost,
        })
    }

    pub async fn current_user(&self) -> Option<User> {
        let user_id = self.session.read().await.user_id?;
        self.users.read().await.iter().find(|u| u.id == user_id).cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_user().await.is_some()
    }

    /// Create an account and log it in
    pub async fn register(&self, name: &str, password: &str) -> StoreResult<User> {
        let name = name.trim();
        if name.is_empty() || password.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.name.eq_ignore_ascii_case(name)) {
            return Err(StoreError::DuplicateUser(name.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            password_hash: bcrypt::hash(password, self.hash_cost)?,
            created_at: Utc::now(),
        };
        let mut updated = users.clone();
        updated.push(user.clone());
        write_json(&self.users_path, &updated)?;
        *users = updated;
        drop(users);

        self.set_session(Some(user.id)).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, name: &str, password: &str) -> StoreResult<User> {
        let user = self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or(StoreError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(StoreError::InvalidCredentials);
        }

        self.set_session(Some(user.id)).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn logout(&self) -> StoreResult<()> {
        self.set_session(None).await?;
        tracing::info!("User logged out");
        Ok(())
    }

    pub async fn update_username(&self, new_name: &str) -> StoreResult<User> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let user_id = self.session.read().await.user_id.ok_or(StoreError::NotAuthenticated)?;

        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.id != user_id && u.name.eq_ignore_ascii_case(new_name))
        {
            return Err(StoreError::DuplicateUser(new_name.to_string()));
        }
        let mut updated = users.clone();
        let user = updated
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound("user"))?;
        user.name = new_name.to_string();
        let renamed = user.clone();
        write_json(&self.users_path, &updated)?;
        *users = updated;
        Ok(renamed)
    }

    pub async fn update_password(&self, new_password: &str) -> StoreResult<()> {
        if new_password.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let user_id = self.session.read().await.user_id.ok_or(StoreError::NotAuthenticated)?;
        let hash = bcrypt::hash(new_password, self.hash_cost)?;

        let mut users = self.users.write().await;
        let mut updated = users.clone();
        let user = updated
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound("user"))?;
        user.password_hash = hash;
        write_json(&self.users_path, &updated)?;
        *users = updated;
        Ok(())
    }

    async fn set_session(&self, user_id: Option<Uuid>) -> StoreResult<()> {
        let mut session = self.session.write().await;
        let updated = Session { user_id };
        write_json(&self.session_path, &updated)?;
        *session = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn register_logs_in_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open_with_cost(dir.path(), TEST_COST).unwrap();
        assert!(!store.is_authenticated().await);

        let user = store.register("alice", "hunter2").await.unwrap();
        assert_eq!(store.current_user().await.map(|u| u.id), Some(user.id));

        // A fresh store over the same directory restores the session
        let reopened = UserStore::open_with_cost(dir.path(), TEST_COST).unwrap();
        assert_eq!(reopened.current_user().await.map(|u| u.name), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open_with_cost(dir.path(), TEST_COST).unwrap();
        store.register("alice", "pw").await.unwrap();

        let err = store.register("ALICE", "other").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUser(_)));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open_with_cost(dir.path(), TEST_COST).unwrap();
        store.register("bob", "correct").await.unwrap();
        store.logout().await.unwrap();
        assert!(!store.is_authenticated().await);

        let err = store.login("bob", "wrong").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
        assert!(!store.is_authenticated().await);

        store.login("bob", "correct").await.unwrap();
        assert!(store.is_authenticated().await);
    }

    #[tokio::test]
    async fn profile_updates_apply_to_current_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open_with_cost(dir.path(), TEST_COST).unwrap();
        store.register("carol", "old").await.unwrap();

        let updated = store.update_username("caroline").await.unwrap();
        assert_eq!(updated.name, "caroline");

        store.update_password("new").await.unwrap();
        store.logout().await.unwrap();
        assert!(store.login("caroline", "old").await.is_err());
        assert!(store.login("caroline", "new").await.is_ok());
    }

    #[tokio::test]
    async fn updates_require_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open_with_cost(dir.path(), TEST_COST).unwrap();

        let err = store.update_username("dave").await.unwrap_err();
        assert!(matches!(err, StoreError::NotAuthenticated));
        let err = store.update_username("  ").await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyName));
    }

    #[tokio::test]
    async fn failed_register_does_not_reserve_the_name() {
        // A regular file as the data dir makes every write fail
        let not_a_dir = tempfile::NamedTempFile::new().unwrap();
        let store = UserStore::open_with_cost(not_a_dir.path(), TEST_COST).unwrap();

        assert!(matches!(store.register("alice", "pw").await, Err(StoreError::Io(_))));
        assert!(matches!(store.register("alice", "pw").await, Err(StoreError::Io(_))));
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn failed_updates_keep_the_old_account() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open_with_cost(dir.path(), TEST_COST).unwrap();
        store.register("alice", "old").await.unwrap();

        // Directories where the files were make the next writes fail
        for file in [USERS_FILE, SESSION_FILE] {
            std::fs::remove_file(dir.path().join(file)).unwrap();
            std::fs::create_dir(dir.path().join(file)).unwrap();
        }

        assert!(store.update_username("bob").await.is_err());
        assert!(store.update_password("new").await.is_err());
        assert!(store.logout().await.is_err());

        assert_eq!(store.current_user().await.unwrap().name, "alice");
        let user = store.current_user().await.unwrap();
        assert!(bcrypt::verify("old", &user.password_hash).unwrap());
    }
}
