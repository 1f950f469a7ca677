use crate::config::settings::AppConfig;
use crate::infrastructure::cloudconvert::CloudConvertClient;
use crate::infrastructure::storage::local::StorageService;
use crate::modules::conversion::repository::JobRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jobs: JobRepository,
    pub converter: CloudConvertClient,
    pub storage: StorageService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        jobs: JobRepository,
        converter: CloudConvertClient,
        storage: StorageService,
    ) -> Self {
        Self {
            config,
            jobs,
            converter,
            storage,
        }
    }

    /// Wires every component from configuration; the job registry starts empty.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let storage = StorageService::new(&config.upload_dir, &config.output_dir).await?;
        let converter = CloudConvertClient::new(&config)?;

        Ok(Self::new(config, JobRepository::new(), converter, storage))
    }
}
