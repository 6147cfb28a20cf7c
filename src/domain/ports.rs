use crate::domain::model::{BirthdayDraft, BirthdayRecord, Session};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Listing order for the register, by date of birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Table operations on the `birthdays` collection.
#[async_trait]
pub trait BirthdayStore: Send + Sync {
    /// List every record, ordered by date of birth.
    async fn list(&self, order: SortOrder) -> Result<Vec<BirthdayRecord>>;

    /// Insert one record; the backend assigns and returns the id.
    async fn insert(&self, draft: &BirthdayDraft) -> Result<BirthdayRecord>;

    /// Update the record with the given id, returning the stored row.
    async fn update(&self, id: &str, draft: &BirthdayDraft) -> Result<BirthdayRecord>;

    /// Delete the record with the given id.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Object storage for profile photos.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Upload image bytes under a generated unique name and return the
    /// public URL.
    async fn upload(&self, bytes: Vec<u8>, ext: &str) -> Result<String>;

    /// Delete a previously uploaded photo by its public URL. Returns false
    /// when the URL does not point into the photo bucket.
    async fn delete(&self, url: &str) -> Result<bool>;
}

/// Credential-pair authentication against the backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Register a new account. Returns a session when the backend signs the
    /// user in right away; `None` when email confirmation is still pending.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>>;

    async fn sign_out(&self, access_token: &str) -> Result<()>;
}
