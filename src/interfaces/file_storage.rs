use async_trait::async_trait;

/// Where before/after photos end up. Returns the public reference of the stored object.
#[async_trait]
pub trait ImageStorageInterface {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        path: Option<&str>,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String, String>;
}
