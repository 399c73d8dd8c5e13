//! Batch upload items and per-item outcomes

use serde::{Serialize, Serializer};
use sharebox_auth::FileRecord;

use crate::error::LifecycleError;

/// Largest accepted file: 50 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 52_428_800;

pub(crate) const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One file of a batch upload
#[derive(Clone, Debug)]
pub struct UploadItem {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadItem {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Why one item of a batch was not stored
#[derive(Debug, Serialize)]
pub struct UploadFailure {
    pub name: String,
    pub size: u64,
    #[serde(serialize_with = "serialize_display")]
    pub error: LifecycleError,
}

/// Result for a single item; a batch returns one per input in order
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadOutcome {
    Stored(FileRecord),
    Failed(UploadFailure),
}

impl UploadOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, UploadOutcome::Stored(_))
    }

    pub fn into_failure(self) -> Option<UploadFailure> {
        match self {
            UploadOutcome::Stored(_) => None,
            UploadOutcome::Failed(failure) => Some(failure),
        }
    }
}

fn serialize_display<S: Serializer>(error: &LifecycleError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

pub(crate) fn size_limit_message(max: u64) -> String {
    let mib = max / (1024 * 1024);
    if mib * 1024 * 1024 == max {
        format!("File size exceeds {mib}MB")
    } else {
        format!("File size exceeds {max} bytes")
    }
}
