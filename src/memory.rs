//! In-memory repositories and storage used by unit and HTTP tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use axum::async_trait;
use bytes::Bytes;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::{
        repo::{UserRepo, UserWriteError},
        repo_types::{ProfileChanges, User},
    },
    checklists::{
        repo::ChecklistRepo,
        repo_types::{Checklist, ChecklistFields},
    },
    storage::StorageClient,
};

/// Same rule as the SQL: never earlier than the previous value plus 1ms.
fn bumped(prev: OffsetDateTime) -> OffsetDateTime {
    OffsetDateTime::now_utc().max(prev + Duration::milliseconds(1))
}

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
    fail_avatar_writes: AtomicBool,
}

impl MemoryUserRepo {
    pub fn fail_avatar_writes(&self, fail: bool) {
        self.fail_avatar_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, UserWriteError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(UserWriteError::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserWriteError> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &changes.email {
            if users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(UserWriteError::EmailTaken);
            }
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        user.updated_at = bumped(user.updated_at);
        Ok(Some(user.clone()))
    }

    async fn set_avatar(&self, id: Uuid, avatar: &str) -> anyhow::Result<Option<User>> {
        if self.fail_avatar_writes.load(Ordering::SeqCst) {
            anyhow::bail!("simulated avatar write failure for {id}");
        }
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.avatar = Some(avatar.to_string());
            user.updated_at = bumped(user.updated_at);
            user.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryChecklistRepo {
    rows: Mutex<Vec<Checklist>>,
}

#[async_trait]
impl ChecklistRepo for MemoryChecklistRepo {
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Checklist>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|c| c.user_id == owner).cloned().collect())
    }

    async fn insert(
        &self,
        owner: Uuid,
        owner_name: &str,
        fields: &ChecklistFields,
    ) -> anyhow::Result<Checklist> {
        let now = OffsetDateTime::now_utc();
        let checklist = Checklist {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            short_name: fields.short_name.clone(),
            status: fields.status,
            user_id: owner,
            user_name: owner_name.into(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(checklist.clone());
        Ok(checklist)
    }

    async fn update_owned(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: &ChecklistFields,
    ) -> anyhow::Result<Option<Checklist>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|c| c.id == id && c.user_id == owner)
            .map(|c| {
                c.title = fields.title.clone();
                c.short_name = fields.short_name.clone();
                c.status = fields.status;
                c.updated_at = bumped(c.updated_at);
                c.clone()
            }))
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| !(c.id == id && c.user_id == owner));
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FakeStorage {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageClient for FakeStorage {
    async fn put_object(&self, key: &str, body: Bytes, _ct: &str) -> anyhow::Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            anyhow::bail!("simulated put failure for {key}");
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            anyhow::bail!("simulated delete failure for {key}");
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
