use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{auth::repo_types::User, storage::JsonFile};

/// Outcome of inserting a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    Created,
    AlreadyExists,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by username.
    async fn find(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// Add a user unless the username is taken.
    async fn insert(&self, user: User) -> anyhow::Result<Inserted>;
}

/// Users kept in a flat JSON file; access is serialized per store.
pub struct FileUserStore {
    file: JsonFile<User>,
    lock: Mutex<()>,
}

impl FileUserStore {
    pub fn new(file: JsonFile<User>) -> Self {
        Self {
            file,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn find(&self, username: &str) -> anyhow::Result<Option<User>> {
        let users = {
            let _guard = self.lock.lock().await;
            self.file.load().await?
        };
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn insert(&self, user: User) -> anyhow::Result<Inserted> {
        let _guard = self.lock.lock().await;
        let mut users = self.file.load().await?;
        if users.iter().any(|u| u.username == user.username) {
            return Ok(Inserted::AlreadyExists);
        }
        users.push(user);
        self.file.save(&users).await?;
        Ok(Inserted::Created)
    }
}

/// In-process store, used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[cfg(test)]
#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, username: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, user: User) -> anyhow::Result<Inserted> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == user.username) {
            return Ok(Inserted::AlreadyExists);
        }
        users.push(user);
        Ok(Inserted::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::scratch_dir;

    fn user(name: &str, hash: &str) -> User {
        User {
            username: name.into(),
            password_hash: hash.into(),
        }
    }

    #[tokio::test]
    async fn file_store_rejects_duplicate_username() {
        let dir = scratch_dir("users");
        let store = FileUserStore::new(JsonFile::new(dir.join("users.json")));

        assert_eq!(store.insert(user("alice", "h1")).await.unwrap(), Inserted::Created);
        assert_eq!(
            store.insert(user("alice", "h2")).await.unwrap(),
            Inserted::AlreadyExists
        );

        let found = store.find("alice").await.unwrap().expect("alice exists");
        assert_eq!(found.password_hash, "h1");
        assert!(store.find("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_persists_password_field() {
        let dir = scratch_dir("users-format");
        let path = dir.join("users.json");
        let store = FileUserStore::new(JsonFile::new(&path));
        store.insert(user("alice", "$argon2id$x")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["username"], "alice");
        assert_eq!(raw[0]["password"], "$argon2id$x");
    }

    #[tokio::test]
    async fn memory_store_matches_file_semantics() {
        let store = MemoryUserStore::default();
        assert!(store.find("alice").await.unwrap().is_none());
        assert_eq!(store.insert(user("alice", "h")).await.unwrap(), Inserted::Created);
        assert_eq!(
            store.insert(user("alice", "other")).await.unwrap(),
            Inserted::AlreadyExists
        );
    }
}
