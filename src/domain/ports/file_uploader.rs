//! FileUploader port - pushes a local file into a remote file share
//!
//! The upload is an opaque external action whose exit status decides
//! success. Implementations:
//! - `AzFileUploader` - `az storage file upload`
//! - `RecordingUploader` - records requests, for tests

use std::path::{Path, PathBuf};

use super::provider::ProviderResult;
use crate::domain::value_objects::{Secret, StepOp};

/// Which declared command variant runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    /// First deployment of the upload resource
    Create,
    /// Trigger value changed since the last successful run
    Update,
}

impl UploadAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadAction::Create => "create",
            UploadAction::Update => "update",
        }
    }

    /// Upload variant for a planned step; `None` when nothing is uploaded
    pub fn for_op(op: StepOp) -> Option<Self> {
        match op {
            StepOp::Create => Some(UploadAction::Create),
            StepOp::Update | StepOp::Replace => Some(UploadAction::Update),
            StepOp::Same | StepOp::Delete => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub action: UploadAction,
    pub share: String,
    pub account_name: String,
    pub account_key: Secret,
    pub source: PathBuf,
}

impl UploadRequest {
    /// Name of the file inside the share (the source's file name)
    pub fn remote_path(&self) -> String {
        remote_file_name(&self.source)
    }
}

/// Removal of a previously uploaded file
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveRequest {
    pub share: String,
    pub account_name: String,
    pub account_key: Secret,
    pub remote_path: String,
}

pub fn remote_file_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string_lossy().into_owned())
}

pub trait FileUploader {
    fn upload(&self, request: &UploadRequest) -> ProviderResult<()>;

    fn remove(&self, request: &RemoveRequest) -> ProviderResult<()>;
}
