use serde::{Deserialize, Serialize};

/// Document metadata collected by the dashboard before an upload starts.
///
/// Attached verbatim to every chunk and finalize call so the backend can
/// route the assembled document into the right site and template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub site_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Backend acknowledgment of a finalized upload.
///
/// The backend may return more fields (ingestion timing, embedding queue
/// position); only the two the caller needs are modeled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeData {
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}
