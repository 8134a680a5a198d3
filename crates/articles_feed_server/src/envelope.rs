//! JSON response envelope shared by every route.
//!
//! # Invariants
//! - Success bodies are `{success: true, data, meta?}`.
//! - Failure bodies are `{success: false, error: {code, message}}`.
//! - `meta` is emitted only for list responses.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Pagination echo attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub page_size: i64,
    pub total_items: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Typed response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { data: T, meta: Option<PageMeta> },
    Failure(ErrorBody),
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::Success { data, meta: None }
    }

    pub fn page(data: T, meta: PageMeta) -> Self {
        Self::Success {
            data,
            meta: Some(meta),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self::Failure(ErrorBody {
            code,
            message: message.into(),
        })
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { data, meta } => {
                let len = if meta.is_some() { 3 } else { 2 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
                if let Some(meta) = meta {
                    map.serialize_entry("meta", meta)?;
                }
                map.end()
            }
            Self::Failure(error) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
