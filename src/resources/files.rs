use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EasemobError, Result};
use crate::resources::client::EasemobClient;
use crate::resources::endpoint::{Call, Endpoint};
use crate::resources::messages::{Envelope, Message, MessageBody, DEFAULT_IMAGE_SIZE};
use crate::transport::request::{FilePart, Payload};

static UPLOAD_FIELD: &str = "file";
static DOWNLOAD_EXT: &str = ".png";
static THUMBNAIL_SUFFIX: &str = "th";

/// Reference to an uploaded file: `uri`, `entities[0].uuid` and
/// `entities[0].share-secret` of the upload response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub uri: String,
    pub uuid: String,
    pub share_secret: String,
}

impl UploadedFile {
    /// Fails when any of the three fields is missing.
    pub fn from_response(response: &Value) -> Result<Self> {
        let field = |value: Option<&Value>, name: &str| {
            value
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| {
                    EasemobError::UnexpectedResponse(format!("upload response has no '{}'", name))
                })
        };
        let entity = response.get("entities").and_then(|entities| entities.get(0));

        Ok(Self {
            uri: field(response.get("uri"), "uri")?,
            uuid: field(entity.and_then(|e| e.get("uuid")), "entities[0].uuid")?,
            share_secret: field(
                entity.and_then(|e| e.get("share-secret")),
                "entities[0].share-secret",
            )?,
        })
    }

    /// Download URL referenced by file messages.
    pub fn url(&self) -> String {
        format!("{}/{}", self.uri, self.uuid)
    }
}

impl EasemobClient {
    /// Multipart upload of the file at `path`.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadedFile> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UPLOAD_FIELD.to_owned());
        debug!("upload: '{}' ({} bytes)", path.display(), bytes.len());

        let part = FilePart { field: UPLOAD_FIELD.to_owned(), file_name, bytes };
        let response = self
            .execute_json(Call::new(Endpoint::UploadFile).payload(Payload::Multipart(part)))
            .await?;
        UploadedFile::from_response(&response)
    }

    /// Stores the file under the download dir; returns the generated file name.
    pub async fn download_file(&self, uuid: &str, share_secret: &str) -> Result<String> {
        self.download(Endpoint::DownloadFile, uuid, share_secret, "").await
    }

    pub async fn download_thumbnail(&self, uuid: &str, share_secret: &str) -> Result<String> {
        self.download(Endpoint::DownloadThumbnail, uuid, share_secret, THUMBNAIL_SUFFIX)
            .await
    }

    async fn download(
        &self,
        endpoint: Endpoint,
        uuid: &str,
        share_secret: &str,
        suffix: &str,
    ) -> Result<String> {
        let call = Call::new(endpoint)
            .param("uuid", uuid)
            .header(format!("share-secret:{}", share_secret));
        let bytes = self.execute_raw(call).await?;

        let file_name = format!("{}{}{}", Uuid::now_v7().simple(), suffix, DOWNLOAD_EXT);
        tokio::fs::create_dir_all(self.download_dir()).await?;
        let path = self.download_dir().join(&file_name);
        tokio::fs::write(&path, &bytes).await?;

        info!("download: {} bytes written to '{}'", bytes.len(), path.display());
        Ok(file_name)
    }

    pub async fn send_image(
        &self,
        envelope: Envelope,
        path: impl AsRef<Path>,
        filename: impl Into<String>,
    ) -> Result<Value> {
        let uploaded = self.upload_file(path).await?;
        let body = MessageBody::Img {
            url: uploaded.url(),
            filename: filename.into(),
            secret: uploaded.share_secret,
            size: DEFAULT_IMAGE_SIZE,
        };
        self.send_message(&Message::new(envelope, body)).await
    }

    pub async fn send_audio(
        &self,
        envelope: Envelope,
        path: impl AsRef<Path>,
        filename: impl Into<String>,
        length: u64,
    ) -> Result<Value> {
        let uploaded = self.upload_file(path).await?;
        let body = MessageBody::Audio {
            url: uploaded.url(),
            filename: filename.into(),
            length,
            secret: uploaded.share_secret,
        };
        self.send_message(&Message::new(envelope, body)).await
    }

    /// `thumb` / `thumb_secret` refer to a thumbnail uploaded beforehand.
    pub async fn send_video(
        &self,
        envelope: Envelope,
        path: impl AsRef<Path>,
        filename: impl Into<String>,
        length: u64,
        thumb: impl Into<String>,
        thumb_secret: impl Into<String>,
    ) -> Result<Value> {
        let uploaded = self.upload_file(path).await?;
        let body = MessageBody::Video {
            url: uploaded.url(),
            filename: filename.into(),
            thumb: thumb.into(),
            length,
            secret: uploaded.share_secret,
            thumb_secret: thumb_secret.into(),
        };
        self.send_message(&Message::new(envelope, body)).await
    }

    pub async fn send_file(
        &self,
        envelope: Envelope,
        path: impl AsRef<Path>,
        filename: impl Into<String>,
        length: u64,
    ) -> Result<Value> {
        let uploaded = self.upload_file(path).await?;
        let body = MessageBody::File {
            url: uploaded.url(),
            filename: filename.into(),
            length,
            secret: uploaded.share_secret,
        };
        self.send_message(&Message::new(envelope, body)).await
    }
}
