use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Two fixed-purpose directories on local disk: raw uploads and converted
/// outputs. Nothing is ever cleaned up.
#[derive(Clone, Debug)]
pub struct StorageService {
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl StorageService {
    pub async fn new(upload_dir: &Path, output_dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(upload_dir).await?;
        fs::create_dir_all(output_dir).await?;

        info!(
            "📁 Local storage ready (uploads: {}, outputs: {})",
            upload_dir.display(),
            output_dir.display()
        );

        Ok(Self {
            upload_dir: upload_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// `file_name` must already be a bare file name.
    pub async fn save_input(&self, file_name: &str, data: &Bytes) -> std::io::Result<PathBuf> {
        let path = self.upload_dir.join(file_name);
        fs::write(&path, data).await?;
        Ok(path)
    }

    /// Outputs live under a directory per job so equal names never collide.
    /// Both arguments must already be bare path components.
    pub async fn save_output(
        &self,
        job_id: &str,
        file_name: &str,
        data: &Bytes,
    ) -> std::io::Result<PathBuf> {
        let dir = self.output_dir.join(job_id);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(file_name);
        fs::write(&path, data).await?;
        Ok(path)
    }

    pub async fn is_file(path: &Path) -> bool {
        fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
    }
}
