use std::{collections::HashMap, marker::PhantomData};

use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRef, FromRequest, Multipart, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{error::ApiError, storage::StorageState};

/// Upper bound on files accepted for a single form field.
pub const MAX_FILES_PER_FIELD: usize = 10;

/// UploadFields
///
/// The file fields an endpoint accepts, with the most files each may carry. A file part
/// under any other name rejects the whole request before anything is stored.
pub trait UploadFields: Send + 'static {
    const FILES: &'static [(&'static str, usize)];

    fn limit(field: &str) -> Option<usize> {
        Self::FILES
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, max)| *max)
    }
}

/// JSON-only endpoints.
pub struct NoFiles;

impl UploadFields for NoFiles {
    const FILES: &'static [(&'static str, usize)] = &[];
}

/// `image` (cover) and `images` (gallery).
pub struct ProjectFiles;

impl UploadFields for ProjectFiles {
    const FILES: &'static [(&'static str, usize)] =
        &[("image", 1), ("images", MAX_FILES_PER_FIELD)];
}

/// `avatar` and `resume`.
pub struct ProfileFiles;

impl UploadFields for ProfileFiles {
    const FILES: &'static [(&'static str, usize)] = &[("avatar", 1), ("resume", 1)];
}

/// FormPayload
///
/// A request body that may arrive as JSON, as a urlencoded form or as
/// `multipart/form-data`. Text parts become JSON fields so the typed request structs can
/// be reused for every encoding. File parts are checked against `F`, then persisted and
/// collected per field as `/uploads/...` paths.
pub struct FormPayload<F = NoFiles> {
    fields: Map<String, Value>,
    files: HashMap<String, Vec<String>>,
    _accepts: PhantomData<fn() -> F>,
}

impl<F> Default for FormPayload<F> {
    fn default() -> Self {
        Self::from_json(Map::new())
    }
}

impl<F> FormPayload<F> {
    pub fn from_json(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            files: HashMap::new(),
            _accepts: PhantomData,
        }
    }

    /// The file uploaded under `field`, if any.
    pub fn take_file(&mut self, field: &str) -> Option<String> {
        self.files.remove(field).and_then(|mut paths| paths.pop())
    }

    pub fn take_files(&mut self, field: &str) -> Vec<String> {
        self.files.remove(field).unwrap_or_default()
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Reads a checkbox-style flag sent either as a JSON boolean or as form text.
    pub fn flag(&self, field: &str) -> bool {
        match self.fields.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim(), "true" | "on" | "1"),
            _ => false,
        }
    }

    pub fn parse<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| ApiError::Validation(format!("Invalid request body: {e}")))
    }

    fn push_text(&mut self, name: String, text: String) {
        // Repeated names (`technologies[]=a&technologies[]=b`) collect into a list.
        match self.fields.remove(&name) {
            None => {
                self.fields.insert(name, Value::String(text));
            }
            Some(Value::Array(mut items)) => {
                items.push(Value::String(text));
                self.fields.insert(name, Value::Array(items));
            }
            Some(previous) => {
                self.fields
                    .insert(name, Value::Array(vec![previous, Value::String(text)]));
            }
        }
    }

    fn push_file(&mut self, name: &str, path: String) {
        self.files.entry(name.to_string()).or_default().push(path);
    }
}

fn field_name(raw: &str) -> String {
    raw.trim_end_matches("[]").to_string()
}

fn content_type(req: &Request) -> &str {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

impl<S, F> FromRequest<S> for FormPayload<F>
where
    S: Send + Sync,
    F: UploadFields,
    StorageState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(&req).to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let storage = StorageState::from_ref(state);
            let multipart = Multipart::from_request(req, state).await?;
            return read_multipart(multipart, &storage).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
            let mut payload = FormPayload::default();
            for (name, value) in pairs {
                payload.push_text(field_name(&name), value);
            }
            return Ok(payload);
        }

        match Json::<Value>::from_request(req, state).await? {
            Json(Value::Object(fields)) => Ok(FormPayload::from_json(fields)),
            Json(_) => Err(ApiError::Validation(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}

/// A file part held in memory until the whole form has been read.
struct PendingFile {
    field: String,
    file_name: String,
    bytes: Bytes,
}

/// Checks a file part against the accepted fields and the parts already seen.
fn admit<F: UploadFields>(field: &str, pending: &[PendingFile]) -> Result<(), ApiError> {
    let Some(max) = F::limit(field) else {
        return Err(ApiError::Validation(format!("Unexpected file field '{field}'")));
    };
    if pending.iter().filter(|file| file.field == field).count() >= max {
        return Err(ApiError::Validation(format!(
            "Too many files for field '{field}' (max {max})"
        )));
    }
    Ok(())
}

// Nothing is written until every part has been read and admitted, so a rejected form
// leaves no files behind.
async fn read_multipart<F: UploadFields>(
    mut multipart: Multipart,
    storage: &StorageState,
) -> Result<FormPayload<F>, ApiError> {
    let mut payload = FormPayload::default();
    let mut pending = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(field_name) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await?;
                // Browsers submit empty file inputs as a nameless, empty part.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                admit::<F>(&name, &pending)?;
                pending.push(PendingFile {
                    field: name,
                    file_name,
                    bytes,
                });
            }
            None => {
                let text = field.text().await?;
                payload.push_text(name, text);
            }
        }
    }

    for file in pending {
        let path = storage.save(Some(&file.file_name), file.bytes).await?;
        payload.push_file(&file.field, path);
    }

    Ok(payload)
}
