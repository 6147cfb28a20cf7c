use crate::domain::ports::PhotoStore;
use crate::supabase::{api_error, SupabaseClient};
use crate::utils::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

impl SupabaseClient {
    fn object_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url(), self.bucket(), name)
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url(),
            self.bucket(),
            name
        )
    }
}

#[async_trait]
impl PhotoStore for SupabaseClient {
    async fn upload(&self, bytes: Vec<u8>, ext: &str) -> Result<String> {
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        tracing::debug!("Uploading photo {} ({} bytes)", name, bytes.len());

        let response = self
            .authed(self.http().post(self.object_url(&name)))
            .header("Content-Type", content_type_for(ext))
            .header("Cache-Control", "max-age=3600")
            // never overwrite an existing object
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("upload photo", response).await);
        }

        Ok(self.public_url(&name))
    }

    async fn delete(&self, url: &str) -> Result<bool> {
        // The photo column stores the public URL; the object name is its
        // last path segment.
        let name = match url.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(false),
        };

        tracing::debug!("Deleting photo object {}", name);
        let response = self
            .authed(self.http().delete(self.object_url(name)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("delete photo", response).await);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("webp"), "image/webp");
        assert_eq!(content_type_for("bin"), "application/octet-stream");
    }
}
