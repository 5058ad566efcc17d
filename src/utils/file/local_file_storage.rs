use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::interfaces::file_storage::ImageStorageInterface;

pub struct LocalFileStorage {
    uploads_dir: String,
    upload_base_url: String,
}

impl LocalFileStorage {
    pub fn new(uploads_dir: String, upload_base_url: String) -> Self {
        LocalFileStorage {
            uploads_dir,
            upload_base_url,
        }
    }

    fn object_name(path: Option<&str>, file_name: &str) -> String {
        match path.filter(|p| !p.is_empty()) {
            Some(p) => format!("{p}/{file_name}"),
            None => file_name.to_string(),
        }
    }
}

#[async_trait]
impl ImageStorageInterface for LocalFileStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        path: Option<&str>,
        file_name: &str,
        _: Option<&str>,
    ) -> Result<String, String> {
        let object_name = Self::object_name(path, file_name);
        let full_path = PathBuf::from(&self.uploads_dir).join(&object_name);
        if let Some(dir) = full_path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| e.to_string())?;
        }
        tokio::fs::write(&full_path, &bytes)
            .await
            .map_err(|e| e.to_string())?;
        debug!("stored {} bytes at {}", bytes.len(), full_path.display());

        Ok(format!("{}/{}", self.upload_base_url, object_name))
    }
}
