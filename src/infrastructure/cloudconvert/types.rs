//! Wire types shared by the job-creation response and webhook deliveries.
//!
//! Every field the service does not strictly need is optional or defaulted:
//! the payload is an external contract and varies between event kinds.

use super::CloudConvertError;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const OP_IMPORT_UPLOAD: &str = "import/upload";
pub const OP_EXPORT_URL: &str = "export/url";

#[derive(Debug, Clone, Deserialize)]
pub struct JobEnvelope {
    pub data: JobData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub tasks: Vec<TaskData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub form: Option<UploadForm>,
    #[serde(default)]
    pub files: Vec<ExportedFile>,
}

/// Presigned form returned by the `import/upload` task.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadForm {
    pub url: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportedFile {
    pub url: String,
    pub filename: String,
}

impl JobData {
    pub fn upload_form(&self) -> Result<&UploadForm, CloudConvertError> {
        self.tasks
            .iter()
            .filter(|t| t.operation == OP_IMPORT_UPLOAD)
            .find_map(|t| t.result.as_ref()?.form.as_ref())
            .ok_or(CloudConvertError::MissingUploadTask)
    }

    /// First file of the finished `export/url` task. Only a single output
    /// file per job is supported.
    pub fn exported_file(&self) -> Result<&ExportedFile, CloudConvertError> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.operation == OP_EXPORT_URL && t.status.as_deref() == Some("finished"))
            .ok_or(CloudConvertError::MissingExportTask)?;

        task.result
            .as_ref()
            .and_then(|r| r.files.first())
            .ok_or(CloudConvertError::NoExportedFiles)
    }
}

/// Form parameters are posted as text fields whatever their JSON type.
pub fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(tasks: Value) -> JobData {
        serde_json::from_value(json!({ "id": "job_123", "tasks": tasks })).unwrap()
    }

    #[test]
    fn finds_finished_export_file() {
        let job = job(json!([
            { "operation": "convert", "status": "finished" },
            {
                "operation": "export/url",
                "status": "finished",
                "result": { "files": [{ "url": "http://download.pdf", "filename": "output.pdf" }] }
            }
        ]));

        let file = job.exported_file().unwrap();
        assert_eq!(file.url, "http://download.pdf");
        assert_eq!(file.filename, "output.pdf");
    }

    #[test]
    fn export_task_must_be_finished() {
        let job = job(json!([{ "operation": "export/url", "status": "processing" }]));
        assert!(matches!(
            job.exported_file(),
            Err(CloudConvertError::MissingExportTask)
        ));
    }

    #[test]
    fn no_tasks_means_no_export() {
        assert!(job(json!([])).exported_file().is_err());
    }

    #[test]
    fn export_without_files_is_an_error() {
        let job = job(json!([
            { "operation": "export/url", "status": "finished", "result": { "files": [] } }
        ]));
        assert!(matches!(job.exported_file(), Err(CloudConvertError::NoExportedFiles)));
    }

    #[test]
    fn upload_form_is_read_from_import_task() {
        let job = job(json!([
            {
                "operation": "import/upload",
                "status": "waiting",
                "result": { "form": { "url": "http://upload", "parameters": { "expires": 1700000000, "key": "abc" } } }
            }
        ]));

        let form = job.upload_form().unwrap();
        assert_eq!(form.url, "http://upload");
        assert_eq!(form_value(&form.parameters["expires"]), "1700000000");
        assert_eq!(form_value(&form.parameters["key"]), "abc");
    }
}
