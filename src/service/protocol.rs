//! Request and response messages
//!
//! Field names follow the wire format: the record type is `type`, binary
//! payloads are base64 strings.

use serde::{Deserialize, Serialize};

use crate::store::{ArchiveEntry, ErrorKind, LibrarianError, SaveMode};

use super::encoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusResult {
    Success,
    Failure,
}

/// Outcome carried by every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub result: StatusResult,
    #[serde(default)]
    pub error: ErrorKind,
    #[serde(default)]
    pub info: String,
}

impl Status {
    pub fn success() -> Self {
        Self {
            result: StatusResult::Success,
            error: ErrorKind::NoError,
            info: String::new(),
        }
    }

    pub fn failure(error: ErrorKind, info: impl Into<String>) -> Self {
        Self {
            result: StatusResult::Failure,
            error,
            info: info.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == StatusResult::Success
    }
}

impl From<&LibrarianError> for Status {
    fn from(err: &LibrarianError) -> Self {
        Self::failure(err.kind(), err.to_string())
    }
}

// ==================
// Requests
// ==================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeRequest {
    #[serde(rename = "type", default)]
    pub type_name: String,
}

/// Request addressing one record: get_path, load, delete, load_params, list_tarball
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordRequest {
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub id: String,
}

pub type AddTypeRequest = TypeRequest;
pub type GetTypePathRequest = TypeRequest;
pub type ListRequest = TypeRequest;
pub type GetPathRequest = RecordRequest;
pub type LoadRequest = RecordRequest;
pub type DeleteRequest = RecordRequest;
pub type LoadParamsRequest = RecordRequest;
pub type ListTarballRequest = RecordRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub mode: SaveMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarballEntry {
    pub name: String,
    #[serde(with = "encoding")]
    pub data: Vec<u8>,
}

impl From<TarballEntry> for ArchiveEntry {
    fn from(entry: TarballEntry) -> Self {
        ArchiveEntry::new(entry.name, entry.data)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveTarballRequest {
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub entries: Vec<TarballEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadTarballRequest {
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub id: String,
    #[serde(alias = "requested_filename", default)]
    pub entry: String,
}

// ==================
// Responses
// ==================

/// Response with no payload: add_type, save, delete, save_tarball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Status,
}

/// Response to get_path and get_type_path; `path` is empty on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResponse {
    pub status: Status,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResponse {
    pub status: Status,
    #[serde(default)]
    pub text: String,
}

/// Response to list and list_tarball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: Status,
    #[serde(default)]
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadParamsResponse {
    pub status: Status,
    /// Number of parameters uploaded
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTarballResponse {
    pub status: Status,
    #[serde(with = "encoding", default)]
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_format() {
        let status = Status::failure(ErrorKind::NoSuchType, "Type robots does not exist!");
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({
                "result": "FAILURE",
                "error": "NO_SUCH_TYPE",
                "info": "Type robots does not exist!"
            })
        );
        assert!(Status::success().is_success());
    }

    #[test]
    fn test_save_request_defaults() {
        let req: SaveRequest =
            serde_json::from_value(json!({"type": "robots", "id": "ur5", "text": "x"})).unwrap();
        assert_eq!(req.type_name, "robots");
        assert_eq!(req.mode, SaveMode::Overwrite);

        let req: SaveRequest = serde_json::from_value(
            json!({"type": "robots", "id": "ur5", "text": "x", "mode": "append"}),
        )
        .unwrap();
        assert_eq!(req.mode, SaveMode::Append);
    }

    #[test]
    fn test_list_request_type_optional() {
        let req: ListRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.type_name.is_empty());
    }

    #[test]
    fn test_load_tarball_accepts_requested_filename() {
        let req: LoadTarballRequest = serde_json::from_value(
            json!({"type": "scenes", "id": "kitchen", "requested_filename": "a.txt"}),
        )
        .unwrap();
        assert_eq!(req.entry, "a.txt");
    }

    #[test]
    fn test_tarball_entry_conversion() {
        let entry: TarballEntry =
            serde_json::from_value(json!({"name": "a.txt", "data": "aGVsbG8="})).unwrap();
        let archive_entry: ArchiveEntry = entry.into();
        assert_eq!(archive_entry, ArchiveEntry::new("a.txt", &b"hello"[..]));
    }
}
