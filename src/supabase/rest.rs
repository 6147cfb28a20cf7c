use crate::domain::model::{BirthdayDraft, BirthdayRecord, BirthdayRow, NewBirthdayRow};
use crate::domain::ports::{BirthdayStore, SortOrder};
use crate::supabase::{api_error, SupabaseClient};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;

impl SupabaseClient {
    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url(), self.table())
    }
}

fn rows_to_records(rows: Vec<BirthdayRow>) -> Result<Vec<BirthdayRecord>> {
    rows.into_iter().map(BirthdayRecord::try_from).collect()
}

fn single_row(operation: &str, id: &str, rows: Vec<BirthdayRow>) -> Result<BirthdayRecord> {
    rows.into_iter()
        .next()
        .ok_or_else(|| {
            AppError::remote(operation, 404, format!("no birthday record with id {}", id))
        })
        .and_then(BirthdayRecord::try_from)
}

#[async_trait]
impl BirthdayStore for SupabaseClient {
    async fn list(&self, order: SortOrder) -> Result<Vec<BirthdayRecord>> {
        let direction = match order {
            SortOrder::Ascending => "date_of_birth.asc",
            SortOrder::Descending => "date_of_birth.desc",
        };

        tracing::debug!("Listing birthdays from {}", self.table_url());
        let response = self
            .authed(self.http().get(self.table_url()))
            .query(&[("select", "*"), ("order", direction)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("list birthdays", response).await);
        }

        let rows: Vec<BirthdayRow> = response.json().await?;
        tracing::debug!("Fetched {} birthday rows", rows.len());
        rows_to_records(rows)
    }

    async fn insert(&self, draft: &BirthdayDraft) -> Result<BirthdayRecord> {
        let body = NewBirthdayRow::from(draft);

        let response = self
            .authed(self.http().post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("insert birthday", response).await);
        }

        // PostgREST returns the inserted rows as an array
        let rows: Vec<BirthdayRow> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| {
                AppError::remote("insert birthday", 500, "backend returned no inserted row")
            })
            .and_then(BirthdayRecord::try_from)
    }

    async fn update(&self, id: &str, draft: &BirthdayDraft) -> Result<BirthdayRecord> {
        let body = NewBirthdayRow::from(draft);

        let response = self
            .authed(self.http().patch(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("update birthday", response).await);
        }

        let rows: Vec<BirthdayRow> = response.json().await?;
        single_row("update birthday", id, rows)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .authed(self.http().delete(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("delete birthday", response).await);
        }

        let rows: Vec<BirthdayRow> = response.json().await?;
        if rows.is_empty() {
            return Err(AppError::remote(
                "delete birthday",
                404,
                format!("no birthday record with id {}", id),
            ));
        }
        Ok(())
    }
}
