use crate::domain::model::{BirthdayDraft, BirthdayRecord};
use crate::domain::ports::{BirthdayStore, PhotoStore, SortOrder};
use crate::utils::error::{AppError, Result};
use crate::utils::image::compress_image;
use crate::utils::validation::validate_image_extension;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Display theme, persisted in the settings file and re-applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Explicit application state. It only changes as a consequence of a
/// confirmed backend result; a failed write never shows up here.
#[derive(Debug, Default, Clone)]
pub struct AppState {
    records: Vec<BirthdayRecord>,
    month_filter: Option<u32>,
    theme: Theme,
    in_flight: HashSet<String>,
}

impl AppState {
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[BirthdayRecord] {
        &self.records
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_month_filter(&mut self, month: Option<u32>) {
        self.month_filter = month;
    }

    /// Records visible under the current month filter.
    pub fn filtered_records(&self) -> Vec<&BirthdayRecord> {
        self.records
            .iter()
            .filter(|r| match self.month_filter {
                Some(month) => r.date_of_birth.month() == month,
                None => true,
            })
            .collect()
    }

    /// Marks a record mutation as in flight; a second mutation on the same
    /// record is rejected until the first completes.
    fn begin_mutation(&mut self, id: &str) -> Result<()> {
        if !self.in_flight.insert(id.to_string()) {
            return Err(AppError::validation(format!(
                "an operation on record {} is already in progress",
                id
            )));
        }
        Ok(())
    }

    fn finish_mutation(&mut self, id: &str) {
        self.in_flight.remove(id);
    }

    fn upsert(&mut self, record: BirthdayRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }
}

/// Outcome of a record deletion; the photo cleanup is best-effort.
#[derive(Debug)]
pub struct RemovalReport {
    pub id: String,
    pub photo_warning: Option<String>,
}

/// Orchestrates the register: validation first, then the backend call, then
/// the state update. Generic over the two ports so tests can swap in fakes.
pub struct BirthdayService<S: BirthdayStore, P: PhotoStore> {
    store: S,
    photos: P,
    state: AppState,
}

impl<S: BirthdayStore, P: PhotoStore> BirthdayService<S, P> {
    pub fn new(store: S, photos: P, state: AppState) -> Self {
        Self {
            store,
            photos,
            state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Reload the full record list from the backend.
    pub async fn refresh(&mut self, order: SortOrder) -> Result<usize> {
        let records = self.store.list(order).await?;
        let count = records.len();
        self.state.records = records;
        Ok(count)
    }

    /// Create a record, uploading (and compressing) a profile photo first
    /// when one is given.
    pub async fn create(
        &mut self,
        draft: BirthdayDraft,
        photo_path: Option<&Path>,
    ) -> Result<BirthdayRecord> {
        let uploaded = match photo_path {
            Some(path) => Some(self.upload_photo(path).await?),
            None => None,
        };
        let draft = match &uploaded {
            Some(url) => draft.with_photo(Some(url.clone())),
            None => draft,
        };

        let record = match self.store.insert(&draft).await {
            Ok(record) => record,
            Err(e) => {
                // don't leave the fresh upload orphaned in the bucket
                if let Some(url) = uploaded {
                    self.discard_upload(&url).await;
                }
                return Err(e);
            }
        };
        tracing::info!("Created birthday record {} ({})", record.id, record.name);
        self.state.upsert(record.clone());
        Ok(record)
    }

    /// Update a record by id. A replacement photo is uploaded first and the
    /// previous one is removed best-effort.
    pub async fn edit(
        &mut self,
        id: &str,
        draft: BirthdayDraft,
        photo_path: Option<&Path>,
    ) -> Result<BirthdayRecord> {
        self.state.begin_mutation(id)?;
        let result = self.edit_inner(id, draft, photo_path).await;
        self.state.finish_mutation(id);
        result
    }

    async fn edit_inner(
        &mut self,
        id: &str,
        draft: BirthdayDraft,
        photo_path: Option<&Path>,
    ) -> Result<BirthdayRecord> {
        let previous_photo = self
            .state
            .records
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.photo.clone());

        let uploaded = match photo_path {
            Some(path) => Some(self.upload_photo(path).await?),
            None => None,
        };
        let draft = match &uploaded {
            Some(url) => draft.with_photo(Some(url.clone())),
            None => draft.with_photo(previous_photo.clone()),
        };

        let record = match self.store.update(id, &draft).await {
            Ok(record) => record,
            Err(e) => {
                if let Some(url) = uploaded {
                    self.discard_upload(&url).await;
                }
                return Err(e);
            }
        };

        if uploaded.is_some() {
            if let Some(old) = previous_photo {
                self.discard_upload(&old).await;
            }
        }

        tracing::info!("Updated birthday record {}", record.id);
        self.state.upsert(record.clone());
        Ok(record)
    }

    /// Delete a record and, unless `keep_photo` is set, its stored photo.
    /// A failing photo deletion does not block the record deletion.
    pub async fn remove(&mut self, id: &str, keep_photo: bool) -> Result<RemovalReport> {
        self.state.begin_mutation(id)?;
        let result = self.remove_inner(id, keep_photo).await;
        self.state.finish_mutation(id);
        result
    }

    async fn remove_inner(&mut self, id: &str, keep_photo: bool) -> Result<RemovalReport> {
        let photo = self
            .state
            .records
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.photo.clone());

        self.store.delete(id).await?;
        self.state.records.retain(|r| r.id != id);
        tracing::info!("Deleted birthday record {}", id);

        let photo_warning = match photo {
            Some(url) if !keep_photo => match self.photos.delete(&url).await {
                Ok(true) => None,
                Ok(false) => Some(format!("photo {} was not found in the bucket", url)),
                Err(e) => {
                    tracing::warn!("Photo cleanup for record {} failed: {}", id, e);
                    Some(format!("record deleted, but its photo was not: {}", e))
                }
            },
            _ => None,
        };

        Ok(RemovalReport {
            id: id.to_string(),
            photo_warning,
        })
    }

    /// Everyone whose birthday is celebrated on `today`.
    pub fn birthdays_today(&self, today: NaiveDate) -> Vec<&BirthdayRecord> {
        self.state
            .records
            .iter()
            .filter(|r| r.is_birthday_on(today))
            .collect()
    }

    /// Everyone born in the given month, for the monthly highlight card.
    pub fn birthdays_in_month(&self, month: u32) -> Vec<&BirthdayRecord> {
        self.state
            .records
            .iter()
            .filter(|r| r.date_of_birth.month() == month)
            .collect()
    }

    /// Best-effort removal of a photo the register no longer references.
    async fn discard_upload(&self, url: &str) {
        if let Err(e) = self.photos.delete(url).await {
            tracing::warn!("Could not remove unused photo {}: {}", url, e);
        }
    }

    async fn upload_photo(&self, path: &Path) -> Result<String> {
        let ext = validate_image_extension("photo", &path.to_string_lossy())?;
        let bytes = std::fs::read(path)?;
        let compressed = compress_image(&bytes, &ext);
        self.photos.upload(compressed.bytes, &compressed.ext).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        rows: Mutex<Vec<BirthdayRecord>>,
        fail_inserts: bool,
        fail_photo_deletes: bool,
        deleted_photos: Mutex<Vec<String>>,
        next_id: Mutex<u32>,
    }

    #[async_trait]
    impl BirthdayStore for &FakeBackend {
        async fn list(&self, _order: SortOrder) -> Result<Vec<BirthdayRecord>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn insert(&self, draft: &BirthdayDraft) -> Result<BirthdayRecord> {
            if self.fail_inserts {
                return Err(AppError::remote("insert birthday", 500, "boom"));
            }
            let id = {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                *next_id
            };
            let record = BirthdayRecord {
                id: id.to_string(),
                name: draft.name.clone(),
                date_of_birth: draft.date_of_birth,
                photo: draft.photo.clone(),
                notes: draft.notes.clone(),
            };
            self.rows.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn update(&self, id: &str, draft: &BirthdayDraft) -> Result<BirthdayRecord> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::remote("update birthday", 404, "missing"))?;
            row.name = draft.name.clone();
            row.date_of_birth = draft.date_of_birth;
            row.photo = draft.photo.clone();
            row.notes = draft.notes.clone();
            Ok(row.clone())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            if rows.len() == before {
                return Err(AppError::remote("delete birthday", 404, "missing"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PhotoStore for &FakeBackend {
        async fn upload(&self, _bytes: Vec<u8>, ext: &str) -> Result<String> {
            Ok(format!("https://cdn.test/photos/upload.{}", ext))
        }

        async fn delete(&self, url: &str) -> Result<bool> {
            if self.fail_photo_deletes {
                return Err(AppError::remote("delete photo", 503, "bucket offline"));
            }
            self.deleted_photos.lock().unwrap().push(url.to_string());
            Ok(true)
        }
    }

    fn draft(name: &str, date: &str) -> BirthdayDraft {
        BirthdayDraft::from_input(name, date, None, None).unwrap()
    }

    #[tokio::test]
    async fn test_create_appends_confirmed_record() {
        let backend = FakeBackend::default();
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        let record = service
            .create(draft("Maria", "1990-07-22"), None)
            .await
            .unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(service.state().records().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_state_untouched() {
        let backend = FakeBackend {
            fail_inserts: true,
            ..FakeBackend::default()
        };
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        let err = service
            .create(draft("Maria", "1990-07-22"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RemoteOperationFailed { .. }));
        assert!(service.state().records().is_empty());
    }

    fn photo_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("maria.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        path
    }

    #[tokio::test]
    async fn test_failed_insert_discards_uploaded_photo() {
        let backend = FakeBackend {
            fail_inserts: true,
            ..FakeBackend::default()
        };
        let dir = tempfile::TempDir::new().unwrap();
        let path = photo_file(&dir);
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        let err = service
            .create(draft("Maria", "1990-07-22"), Some(&path))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RemoteOperationFailed { .. }));
        // the photo that went up before the insert failed is cleaned up again
        assert_eq!(
            backend.deleted_photos.lock().unwrap().as_slice(),
            ["https://cdn.test/photos/upload.jpg"]
        );
        assert!(service.state().records().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_discards_replacement_photo() {
        let backend = FakeBackend::default();
        let dir = tempfile::TempDir::new().unwrap();
        let path = photo_file(&dir);
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        // no such record, so the update fails after the replacement upload
        let err = service
            .edit("missing", draft("Maria", "1990-07-22"), Some(&path))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RemoteOperationFailed { .. }));
        assert_eq!(
            backend.deleted_photos.lock().unwrap().as_slice(),
            ["https://cdn.test/photos/upload.jpg"]
        );
    }

    #[tokio::test]
    async fn test_remove_cascades_photo_delete() {
        let backend = FakeBackend::default();
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        let record = service
            .create(
                draft("João", "1985-03-09")
                    .with_photo(Some("https://cdn.test/photos/joao.jpg".to_string())),
                None,
            )
            .await
            .unwrap();

        let report = service.remove(&record.id, false).await.unwrap();
        assert!(report.photo_warning.is_none());
        assert!(service.state().records().is_empty());
        assert_eq!(
            backend.deleted_photos.lock().unwrap().as_slice(),
            ["https://cdn.test/photos/joao.jpg"]
        );
    }

    #[tokio::test]
    async fn test_photo_delete_failure_is_nonfatal() {
        let backend = FakeBackend {
            fail_photo_deletes: true,
            ..FakeBackend::default()
        };
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        let record = service
            .create(
                draft("João", "1985-03-09")
                    .with_photo(Some("https://cdn.test/photos/joao.jpg".to_string())),
                None,
            )
            .await
            .unwrap();

        let report = service.remove(&record.id, false).await.unwrap();
        assert!(report.photo_warning.is_some());
        // the record itself is gone despite the photo failure
        assert!(service.state().records().is_empty());
    }

    #[tokio::test]
    async fn test_keep_photo_skips_cascade() {
        let backend = FakeBackend::default();
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        let record = service
            .create(
                draft("João", "1985-03-09")
                    .with_photo(Some("https://cdn.test/photos/joao.jpg".to_string())),
                None,
            )
            .await
            .unwrap();

        let report = service.remove(&record.id, true).await.unwrap();
        assert!(report.photo_warning.is_none());
        assert!(backend.deleted_photos.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_existing_photo_without_replacement() {
        let backend = FakeBackend::default();
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        let record = service
            .create(
                draft("Ana", "2001-12-01")
                    .with_photo(Some("https://cdn.test/photos/ana.jpg".to_string())),
                None,
            )
            .await
            .unwrap();

        let updated = service
            .edit(&record.id, draft("Ana Clara", "2001-12-01"), None)
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Clara");
        assert_eq!(
            updated.photo.as_deref(),
            Some("https://cdn.test/photos/ana.jpg")
        );
    }

    #[tokio::test]
    async fn test_today_and_month_filters() {
        let backend = FakeBackend::default();
        let mut service = BirthdayService::new(&backend, &backend, AppState::default());

        service.create(draft("Maria", "1990-07-22"), None).await.unwrap();
        service.create(draft("João", "1985-03-09"), None).await.unwrap();
        service.create(draft("Ana", "2001-07-22"), None).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 7, 22).unwrap();
        let celebrating = service.birthdays_today(today);
        assert_eq!(celebrating.len(), 2);
        assert_eq!(celebrating[0].age_on(today), 34);

        assert_eq!(service.birthdays_in_month(7).len(), 2);
        assert_eq!(service.birthdays_in_month(3).len(), 1);

        service.state_mut().set_month_filter(Some(3));
        assert_eq!(service.state().filtered_records().len(), 1);
    }

    #[test]
    fn test_overlapping_mutations_on_one_record_are_rejected() {
        let mut state = AppState::default();
        state.begin_mutation("42").unwrap();
        let err = state.begin_mutation("42").unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
        state.finish_mutation("42");
        assert!(state.begin_mutation("42").is_ok());
    }

    #[test]
    fn test_theme_toggle_round_trip() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);

        let mut state = AppState::with_theme(Theme::Dark);
        assert_eq!(state.theme(), Theme::Dark);
        state.set_theme(state.theme().toggle());
        assert_eq!(state.theme(), Theme::Light);
    }
}
