use crate::domain::dates;
use crate::utils::error::{AppError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A member of the congregation whose birthday is tracked. `id` is assigned
/// by the backend on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthdayRecord {
    pub id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub photo: Option<String>,
    pub notes: Option<String>,
}

impl BirthdayRecord {
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        dates::age(self.date_of_birth, today)
    }

    pub fn is_birthday_on(&self, today: NaiveDate) -> bool {
        dates::is_birthday(self.date_of_birth, today)
    }

    pub fn formatted_date(&self) -> String {
        dates::format_birth_date(self.date_of_birth)
    }
}

/// Form payload for creating or editing a record; the backend owns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthdayDraft {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub photo: Option<String>,
    pub notes: Option<String>,
}

impl BirthdayDraft {
    /// Builds a draft from raw form input. Name and date are mandatory;
    /// both are checked here so invalid submissions never reach the backend.
    pub fn from_input(
        name: &str,
        date_of_birth: &str,
        photo: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }
        let date_of_birth = dates::parse_birth_date(date_of_birth)?;

        Ok(Self {
            name: name.trim().to_string(),
            date_of_birth,
            photo,
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
    }

    pub fn with_photo(mut self, photo: Option<String>) -> Self {
        self.photo = photo;
        self
    }
}

/// On-the-wire row shape of the `birthdays` table. The date travels as a
/// plain string and is interpreted exactly once, in `TryFrom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthdayRow {
    pub id: String,
    pub name: String,
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TryFrom<BirthdayRow> for BirthdayRecord {
    type Error = AppError;

    fn try_from(row: BirthdayRow) -> Result<Self> {
        Ok(BirthdayRecord {
            id: row.id,
            name: row.name,
            date_of_birth: dates::parse_birth_date(&row.date_of_birth)?,
            photo: row.photo,
            notes: row.notes,
        })
    }
}

/// Insert/update body: everything but the server-assigned id. The canonical
/// column format is ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize)]
pub struct NewBirthdayRow {
    pub name: String,
    pub date_of_birth: String,
    pub photo: Option<String>,
    pub notes: Option<String>,
}

impl From<&BirthdayDraft> for NewBirthdayRow {
    fn from(draft: &BirthdayDraft) -> Self {
        NewBirthdayRow {
            name: draft.name.clone(),
            date_of_birth: draft.date_of_birth.format("%Y-%m-%d").to_string(),
            photo: draft.photo.clone(),
            notes: draft.notes.clone(),
        }
    }
}

/// Authenticated session returned by the auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_requires_name() {
        let err = BirthdayDraft::from_input("  ", "1990-07-22", None, None).unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
    }

    #[test]
    fn test_draft_rejects_bad_date() {
        let err = BirthdayDraft::from_input("Maria", "not-a-date", None, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateFormat { .. }));
    }

    #[test]
    fn test_draft_accepts_both_date_conventions() {
        let iso = BirthdayDraft::from_input("Maria", "1990-07-22", None, None).unwrap();
        let slash = BirthdayDraft::from_input("Maria", "22/07/1990", None, None).unwrap();
        assert_eq!(iso.date_of_birth, slash.date_of_birth);
    }

    #[test]
    fn test_row_to_record_parses_wire_date() {
        let row = BirthdayRow {
            id: "7".to_string(),
            name: "João".to_string(),
            date_of_birth: "1985-03-09".to_string(),
            photo: None,
            notes: Some("tenor".to_string()),
        };
        let record = BirthdayRecord::try_from(row).unwrap();
        assert_eq!(record.formatted_date(), "09/03/1985");
    }

    #[test]
    fn test_row_with_bad_date_fails_loudly() {
        let row = BirthdayRow {
            id: "7".to_string(),
            name: "João".to_string(),
            date_of_birth: "03-09-??".to_string(),
            photo: None,
            notes: None,
        };
        assert!(BirthdayRecord::try_from(row).is_err());
    }

    #[test]
    fn test_new_row_serializes_iso_date() {
        let draft = BirthdayDraft::from_input("Maria", "22/07/1990", None, None).unwrap();
        let row = NewBirthdayRow::from(&draft);
        assert_eq!(row.date_of_birth, "1990-07-22");
    }
}
