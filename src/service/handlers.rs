//! Librarian service and its method table
//!
//! Every request ends in a response. Store failures become a FAILURE status,
//! and a body that does not decode becomes `INVALID_REQUEST`. Only an unknown
//! method name is reported as a dispatch error.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::params::{upload_params, MemoryParamStore, ParamStore};
use crate::store::{ArchiveEntry, ErrorKind, LibrarianError, LibrarianResult, Library};

use super::protocol::*;

/// Method names served, in registration order
pub const METHODS: [&str; 11] = [
    "add_type",
    "get_path",
    "get_type_path",
    "save",
    "load",
    "list",
    "load_params",
    "delete",
    "save_tarball",
    "list_tarball",
    "load_tarball",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
}

type Handler<L> = fn(&LibrarianService<L>, Value) -> Value;

/// Front end over a `Library` and a `ParamStore`
///
/// Stateless apart from what the library and parameter store hold.
pub struct LibrarianService<L: Library> {
    library: L,
    params: Arc<dyn ParamStore>,
    handlers: HashMap<&'static str, Handler<L>>,
}

impl<L: Library> LibrarianService<L> {
    /// Create a service uploading params to a fresh in-memory store
    pub fn new(library: L) -> Self {
        Self::with_param_store(library, Arc::new(MemoryParamStore::new()))
    }

    pub fn with_param_store(library: L, params: Arc<dyn ParamStore>) -> Self {
        Self {
            library,
            params,
            handlers: Self::method_table(),
        }
    }

    fn method_table() -> HashMap<&'static str, Handler<L>> {
        let handlers: [Handler<L>; 11] = [
            Self::handle_add_type,
            Self::handle_get_path,
            Self::handle_get_type_path,
            Self::handle_save,
            Self::handle_load,
            Self::handle_list,
            Self::handle_load_params,
            Self::handle_delete,
            Self::handle_save_tarball,
            Self::handle_list_tarball,
            Self::handle_load_tarball,
        ];
        METHODS.into_iter().zip(handlers).collect()
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn param_store(&self) -> &Arc<dyn ParamStore> {
        &self.params
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Decode `body` for `method`, run it and encode the response
    ///
    /// A null body is treated as `{}`.
    pub fn dispatch(&self, method: &str, body: Value) -> Result<Value, DispatchError> {
        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| DispatchError::UnknownMethod(method.to_string()))?;

        let body = if body.is_null() {
            Value::Object(Map::new())
        } else {
            body
        };
        Ok(handler(self, body))
    }

    // ==================
    // Typed operations
    // ==================

    pub fn add_type(&self, req: AddTypeRequest) -> StatusResponse {
        let (status, _) = outcome("add_type", self.library.add_type(&req.type_name));
        StatusResponse { status }
    }

    pub fn get_path(&self, req: GetPathRequest) -> PathResponse {
        let (status, path) = outcome(
            "get_path",
            self.library.resolve_record_path(&req.type_name, &req.id),
        );
        PathResponse {
            status,
            path: path.map(|p| p.display().to_string()).unwrap_or_default(),
        }
    }

    pub fn get_type_path(&self, req: GetTypePathRequest) -> PathResponse {
        let (status, path) = outcome(
            "get_type_path",
            self.library.resolve_type_path(&req.type_name),
        );
        PathResponse {
            status,
            path: path.map(|p| p.display().to_string()).unwrap_or_default(),
        }
    }

    pub fn save(&self, req: SaveRequest) -> StatusResponse {
        let (status, _) = outcome(
            "save",
            self.library
                .save(&req.type_name, &req.id, req.text.as_bytes(), req.mode),
        );
        StatusResponse { status }
    }

    pub fn load(&self, req: LoadRequest) -> LoadResponse {
        let result = self
            .library
            .load(&req.type_name, &req.id)
            .and_then(|bytes| {
                String::from_utf8(bytes).map_err(|e| {
                    LibrarianError::io(
                        format!("Record {} of type {} is not UTF-8 text", req.id, req.type_name),
                        io::Error::new(io::ErrorKind::InvalidData, e),
                    )
                })
            });
        let (status, text) = outcome("load", result);
        LoadResponse {
            status,
            text: text.unwrap_or_default(),
        }
    }

    pub fn list(&self, req: ListRequest) -> ListResponse {
        let (status, entries) = outcome("list", self.library.list(&req.type_name));
        ListResponse {
            status,
            entries: entries.unwrap_or_default(),
        }
    }

    pub fn load_params(&self, req: LoadParamsRequest) -> LoadParamsResponse {
        let result = self
            .library
            .load(&req.type_name, &req.id)
            .and_then(|bytes| upload_params(self.params.as_ref(), &bytes));
        let (status, count) = outcome("load_params", result);
        LoadParamsResponse {
            status,
            count: count.unwrap_or_default(),
        }
    }

    pub fn delete(&self, req: DeleteRequest) -> StatusResponse {
        let (status, _) = outcome("delete", self.library.delete(&req.type_name, &req.id));
        StatusResponse { status }
    }

    pub fn save_tarball(&self, req: SaveTarballRequest) -> StatusResponse {
        let entries: Vec<ArchiveEntry> = req.entries.into_iter().map(Into::into).collect();
        let (status, _) = outcome(
            "save_tarball",
            self.library.save_tarball(&req.type_name, &req.id, &entries),
        );
        StatusResponse { status }
    }

    pub fn list_tarball(&self, req: ListTarballRequest) -> ListResponse {
        let (status, entries) = outcome(
            "list_tarball",
            self.library.list_tarball(&req.type_name, &req.id),
        );
        ListResponse {
            status,
            entries: entries.unwrap_or_default(),
        }
    }

    pub fn load_tarball(&self, req: LoadTarballRequest) -> LoadTarballResponse {
        let (status, data) = outcome(
            "load_tarball",
            self.library
                .load_tarball(&req.type_name, &req.id, &req.entry),
        );
        LoadTarballResponse {
            status,
            data: data.unwrap_or_default(),
        }
    }

    // ==================
    // JSON handlers
    // ==================

    fn handle_add_type(&self, body: Value) -> Value {
        invoke(body, |req| self.add_type(req))
    }

    fn handle_get_path(&self, body: Value) -> Value {
        invoke(body, |req| self.get_path(req))
    }

    fn handle_get_type_path(&self, body: Value) -> Value {
        invoke(body, |req| self.get_type_path(req))
    }

    fn handle_save(&self, body: Value) -> Value {
        invoke(body, |req| self.save(req))
    }

    fn handle_load(&self, body: Value) -> Value {
        invoke(body, |req| self.load(req))
    }

    fn handle_list(&self, body: Value) -> Value {
        invoke(body, |req| self.list(req))
    }

    fn handle_load_params(&self, body: Value) -> Value {
        invoke(body, |req| self.load_params(req))
    }

    fn handle_delete(&self, body: Value) -> Value {
        invoke(body, |req| self.delete(req))
    }

    fn handle_save_tarball(&self, body: Value) -> Value {
        invoke(body, |req| self.save_tarball(req))
    }

    fn handle_list_tarball(&self, body: Value) -> Value {
        invoke(body, |req| self.list_tarball(req))
    }

    fn handle_load_tarball(&self, body: Value) -> Value {
        invoke(body, |req| self.load_tarball(req))
    }
}

fn outcome<T>(method: &'static str, result: LibrarianResult<T>) -> (Status, Option<T>) {
    match result {
        Ok(value) => {
            debug!(method, "request succeeded");
            (Status::success(), Some(value))
        }
        Err(err) => {
            warn!(method, error = %err.kind(), info = %err, "request failed");
            (Status::from(&err), None)
        }
    }
}

fn invoke<Req, Resp>(body: Value, op: impl FnOnce(Req) -> Resp) -> Value
where
    Req: DeserializeOwned,
    Resp: Serialize,
{
    match serde_json::from_value::<Req>(body) {
        Ok(req) => encode(&op(req)),
        Err(e) => {
            warn!(error = %e, "invalid request body");
            encode(&StatusResponse {
                status: Status::failure(ErrorKind::InvalidRequest, format!("Invalid request: {}", e)),
            })
        }
    }
}

fn encode<T: Serialize>(response: &T) -> Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        json!({
            "status": Status::failure(ErrorKind::IoFailure, format!("Failed to encode response: {}", e))
        })
    })
}
