//! Avatar upload: local validation, then a single multipart POST.
//!
//! # Design
//! `UploadAdapter` follows the same build/parse split as `ProfileClient`.
//! `begin` validates the drop and marks the adapter busy, `finish` consumes
//! the transport result and always clears the busy flag. `upload` chains
//! the two over a `Transport` for callers that do not need the split.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::client::ProfileClient;
use crate::error::{ApiError, UploadError, ValidationError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Largest accepted file, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Extensions the picker offers, with the media type declared for each.
pub const ACCEPTED_EXTENSIONS: [(&str, &str); 5] = [
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// A file picked by the user, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    /// Media type declared by the picker; not sniffed from the bytes.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads `path` and declares its media type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type_for(&file_name).to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Media type for a file name, `application/octet-stream` when the
/// extension is not in `ACCEPTED_EXTENSIONS`.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "application/octet-stream",
    };
    ACCEPTED_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
        .unwrap_or("application/octet-stream")
}

/// Size first, then media type, matching the order users see the messages.
pub fn validate_file(file: &UploadFile) -> Result<(), ValidationError> {
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge { size: file.size() });
    }
    if !file.content_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            content_type: file.content_type.clone(),
        });
    }
    Ok(())
}

/// Reduces a drop to exactly one file.
pub fn single_file(mut files: Vec<UploadFile>) -> Result<UploadFile, ValidationError> {
    match files.len() {
        0 => Err(ValidationError::NoFile),
        1 => Ok(files.remove(0)),
        count => Err(ValidationError::MultipleFiles { count }),
    }
}

/// One upload widget. At most one upload is in flight at a time.
#[derive(Debug, Default)]
pub struct UploadAdapter {
    uploading: bool,
}

impl UploadAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Validates a drop and builds the upload request. On success the
    /// adapter is busy until `finish` is called.
    pub fn begin(
        &mut self,
        client: &ProfileClient,
        files: Vec<UploadFile>,
    ) -> Result<HttpRequest, ValidationError> {
        if self.uploading {
            return Err(ValidationError::UploadInProgress);
        }
        let file = single_file(files)?;
        validate_file(&file)?;

        debug!(file = %file.file_name, size = file.size(), "starting upload");
        self.uploading = true;
        Ok(client.build_upload(&file))
    }

    /// Consumes the outcome of the request built by `begin`.
    pub fn finish(
        &mut self,
        client: &ProfileClient,
        result: Result<HttpResponse, ApiError>,
    ) -> Result<String, UploadError> {
        self.uploading = false;
        match result.and_then(|response| client.parse_upload(response)) {
            Ok(upload) => Ok(upload.url),
            Err(err) => {
                warn!(error = %err, "upload error");
                Err(UploadError::UploadFailed(err))
            }
        }
    }

    /// Validates, sends and parses in one call.
    pub async fn upload<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        files: Vec<UploadFile>,
    ) -> Result<String, UploadError> {
        let request = self.begin(api.client(), files)?;
        let result = api.transport().execute(request).await;
        self.finish(api.client(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    fn client() -> ProfileClient {
        ProfileClient::new("http://localhost:3001")
    }

    fn png(size: usize) -> UploadFile {
        UploadFile::new("avatar.png", "image/png", vec![0; size])
    }

    #[test]
    fn from_path_reads_name_type_and_bytes() {
        let path = std::env::temp_dir().join(format!("avatar-{}.PNG", std::process::id()));
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let file = UploadFile::from_path(&path);
        fs::remove_file(&path).unwrap();
        let file = file.unwrap();

        assert_eq!(file.file_name, format!("avatar-{}.PNG", std::process::id()));
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.bytes, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(validate_file(&file), Ok(()));
    }

    #[test]
    fn from_path_of_non_image_is_rejected() {
        let path = std::env::temp_dir().join(format!("notes-{}.txt", std::process::id()));
        fs::write(&path, b"hello").unwrap();

        let file = UploadFile::from_path(&path);
        fs::remove_file(&path).unwrap();
        let file = file.unwrap();

        assert_eq!(file.content_type, "application/octet-stream");
        assert!(matches!(
            validate_file(&file),
            Err(ValidationError::NotAnImage { .. })
        ));
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("missing-{}.png", std::process::id()));
        let err = UploadFile::from_path(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn accepts_exactly_the_size_limit() {
        assert!(validate_file(&png(5 * MIB)).is_ok());
    }

    #[test]
    fn rejects_one_byte_over_the_limit() {
        let err = validate_file(&png(5 * MIB + 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FileTooLarge {
                size: (5 * MIB + 1) as u64
            }
        );
    }

    #[test]
    fn rejects_non_image_media_type() {
        let file = UploadFile::new("notes.txt", "text/plain", vec![b'a'; 16]);
        assert!(matches!(
            validate_file(&file),
            Err(ValidationError::NotAnImage { .. })
        ));
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("me.JPG"), "image/jpeg");
        assert_eq!(content_type_for("me.webp"), "image/webp");
        assert_eq!(content_type_for("me.bmp"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn single_file_rules() {
        assert_eq!(single_file(Vec::new()), Err(ValidationError::NoFile));
        assert_eq!(
            single_file(vec![png(1), png(1)]),
            Err(ValidationError::MultipleFiles { count: 2 })
        );
        assert_eq!(single_file(vec![png(1)]).unwrap(), png(1));
    }

    #[test]
    fn begin_marks_busy_and_rejects_second_drop() {
        let mut adapter = UploadAdapter::new();
        let request = adapter.begin(&client(), vec![png(MIB)]).unwrap();
        assert_eq!(request.path, "http://localhost:3001/api/upload");
        assert!(adapter.is_uploading());

        let err = adapter.begin(&client(), vec![png(MIB)]).unwrap_err();
        assert_eq!(err, ValidationError::UploadInProgress);
    }

    #[test]
    fn rejected_drop_leaves_adapter_idle() {
        let mut adapter = UploadAdapter::new();
        assert!(adapter.begin(&client(), vec![png(6 * MIB)]).is_err());
        assert!(!adapter.is_uploading());
    }

    #[test]
    fn finish_returns_url_and_clears_busy() {
        let mut adapter = UploadAdapter::new();
        adapter.begin(&client(), vec![png(MIB)]).unwrap();
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"{"url":"http://localhost:3001/uploads/a.png"}"#.to_string(),
        };
        let url = adapter.finish(&client(), Ok(response)).unwrap();
        assert_eq!(url, "http://localhost:3001/uploads/a.png");
        assert!(!adapter.is_uploading());
    }

    #[test]
    fn finish_clears_busy_on_failure() {
        let mut adapter = UploadAdapter::new();
        adapter.begin(&client(), vec![png(MIB)]).unwrap();
        let err = adapter
            .finish(&client(), Err(ApiError::Network("connection refused".to_string())))
            .unwrap_err();
        assert!(matches!(err, UploadError::UploadFailed(ApiError::Network(_))));
        assert_eq!(err.to_string(), "Failed to upload file");
        assert!(!adapter.is_uploading());
    }
}
