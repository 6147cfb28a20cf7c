use crate::utils::error::{AppError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AppError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_image_extension(field_name: &str, file: &str) -> Result<String> {
    let allowed: HashSet<&str> = ["jpg", "jpeg", "png", "gif", "webp"].into_iter().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
    {
        Some(ext) if allowed.contains(ext.as_str()) => Ok(ext),
        Some(ext) => Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported image extension: {}. Allowed extensions: jpg, jpeg, png, gif, webp",
                ext
            ),
        }),
        None => Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("supabase_url", "https://example.supabase.co").is_ok());
        assert!(validate_url("supabase_url", "http://localhost:54321").is_ok());
        assert!(validate_url("supabase_url", "").is_err());
        assert!(validate_url("supabase_url", "invalid-url").is_err());
        assert!(validate_url("supabase_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("name", "Maria").is_ok());
        assert!(validate_non_empty_string("name", "   ").is_err());
        assert!(validate_non_empty_string("name", "").is_err());
    }

    #[test]
    fn test_validate_image_extension() {
        assert_eq!(
            validate_image_extension("photo", "maria.JPG").unwrap(),
            "jpg"
        );
        assert!(validate_image_extension("photo", "maria.webp").is_ok());
        assert!(validate_image_extension("photo", "notes.txt").is_err());
        assert!(validate_image_extension("photo", "noextension").is_err());
    }
}
