//! `az storage file` uploader
//!
//! The account key is handed to `az` through `AZURE_STORAGE_KEY` so it never
//! shows up in a process listing.

use tracing::info;

use crate::domain::ports::{FileUploader, ProviderError, ProviderResult, RemoveRequest, UploadRequest};

use super::{AzCli, AzCommand};

const STORAGE_KEY_ENV: &str = "AZURE_STORAGE_KEY";

pub struct AzFileUploader {
    az: AzCli,
}

impl AzFileUploader {
    pub fn new(az: AzCli) -> Self {
        Self { az }
    }

    fn upload_command(request: &UploadRequest) -> AzCommand {
        AzCommand::new(["storage", "file", "upload"])
            .opt("--share-name", request.share.as_str())
            .path_opt("--source", &request.source)
            .opt("--path", request.remote_path())
            .opt("--account-name", request.account_name.as_str())
            .arg("--no-progress")
            .env_secret(STORAGE_KEY_ENV, &request.account_key)
    }

    fn remove_command(request: &RemoveRequest) -> AzCommand {
        AzCommand::new(["storage", "file", "delete"])
            .opt("--share-name", request.share.as_str())
            .opt("--path", request.remote_path.as_str())
            .opt("--account-name", request.account_name.as_str())
            .env_secret(STORAGE_KEY_ENV, &request.account_key)
    }
}

impl FileUploader for AzFileUploader {
    fn upload(&self, request: &UploadRequest) -> ProviderResult<()> {
        if !request.source.is_file() {
            return Err(ProviderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a file", request.source.display()),
            )));
        }
        info!(
            share = %request.share,
            path = %request.remote_path(),
            action = request.action.as_str(),
            "az storage file upload"
        );
        self.az.run(&Self::upload_command(request)).map(|_| ())
    }

    fn remove(&self, request: &RemoveRequest) -> ProviderResult<()> {
        info!(share = %request.share, path = %request.remote_path, "az storage file delete");
        self.az.run(&Self::remove_command(request)).map(|_| ())
    }
}
