use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::protocol::file::{FILE_CHUNK_MAX_SIZE, MAX_FILE_SIZE};
use crate::protocol::{
    success_payload, FileAppendRequest, FileContentsRequest, FileCreateRequest, FileCreateResult,
    FileDeleteRequest, FileInfoRequest, FileInfoResponse, FileUpdateRequest, ProtocolLayerClient,
    TransactionResult,
};
use crate::types::FileId;

fn check_file_size(contents: &[u8]) -> std::result::Result<(), ValidationError> {
    if contents.len() > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            field: "file contents",
            max: MAX_FILE_SIZE,
            actual: contents.len(),
        });
    }
    Ok(())
}

/// Store and manage files, splitting large contents into one create or
/// update followed by appends.
#[derive(Clone)]
pub struct FileClient {
    client: Arc<dyn ProtocolLayerClient>,
}

impl FileClient {
    pub fn new(client: Arc<dyn ProtocolLayerClient>) -> Self {
        Self { client }
    }

    pub async fn create_file(&self, contents: &[u8]) -> Result<FileId> {
        self.create(contents, None).await
    }

    pub async fn create_file_with_expiration(
        &self,
        contents: &[u8],
        expiration_time: DateTime<Utc>,
    ) -> Result<FileId> {
        self.create(contents, Some(expiration_time)).await
    }

    async fn create(
        &self,
        contents: &[u8],
        expiration_time: Option<DateTime<Utc>>,
    ) -> Result<FileId> {
        check_file_size(contents)?;
        let mut chunks = contents.chunks(FILE_CHUNK_MAX_SIZE);
        let first = chunks.next().unwrap_or_default().to_vec();
        let request = match expiration_time {
            Some(expiration_time) => FileCreateRequest::with_expiration(first, expiration_time)?,
            None => FileCreateRequest::new(first)?,
        };
        let result = self
            .client
            .execute_file_create_transaction(request)
            .await?
            .require_success()?;
        let file_id = success_payload(FileCreateResult::OPERATION, result.file_id)?;

        self.append_chunks(file_id, chunks).await?;
        Ok(file_id)
    }

    async fn append_chunks<'a>(
        &self,
        file_id: FileId,
        chunks: impl Iterator<Item = &'a [u8]>,
    ) -> Result<()> {
        for chunk in chunks {
            debug!(file_id = %file_id, size = chunk.len(), "appending file chunk");
            let request = FileAppendRequest::new(file_id, chunk.to_vec())?;
            self.client
                .execute_file_append_transaction(request)
                .await?
                .require_success()?;
        }
        Ok(())
    }

    pub async fn read_file(&self, file_id: FileId) -> Result<Vec<u8>> {
        let response = self
            .client
            .execute_file_contents_query(FileContentsRequest::new(file_id))
            .await?;
        Ok(response.contents)
    }

    /// Replace the contents of a file.
    pub async fn update_file(&self, file_id: FileId, contents: &[u8]) -> Result<()> {
        check_file_size(contents)?;
        let mut chunks = contents.chunks(FILE_CHUNK_MAX_SIZE);
        let first = chunks.next().unwrap_or_default().to_vec();
        self.client
            .execute_file_update_transaction(FileUpdateRequest::for_contents(file_id, first)?)
            .await?
            .require_success()?;
        self.append_chunks(file_id, chunks).await
    }

    pub async fn update_expiration_time(
        &self,
        file_id: FileId,
        expiration_time: DateTime<Utc>,
    ) -> Result<()> {
        let request = FileUpdateRequest::for_expiration(file_id, expiration_time)?;
        self.client
            .execute_file_update_transaction(request)
            .await?
            .require_success()?;
        Ok(())
    }

    pub async fn delete_file(&self, file_id: FileId) -> Result<()> {
        self.client
            .execute_file_delete_transaction(FileDeleteRequest::new(file_id))
            .await?
            .require_success()?;
        Ok(())
    }

    async fn info(&self, file_id: FileId) -> Result<FileInfoResponse> {
        self.client
            .execute_file_info_query(FileInfoRequest::new(file_id))
            .await
    }

    pub async fn get_size(&self, file_id: FileId) -> Result<u64> {
        Ok(self.info(file_id).await?.size)
    }

    pub async fn get_expiration_time(&self, file_id: FileId) -> Result<DateTime<Utc>> {
        Ok(self.info(file_id).await?.expiration_time)
    }

    pub async fn is_deleted(&self, file_id: FileId) -> Result<bool> {
        Ok(self.info(file_id).await?.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HederaError;
    use crate::protocol::transport::TransactionBody;
    use crate::protocol::HederaProtocolClient;
    use crate::testing::{operator, MockTransport};
    use chrono::Duration;

    fn file_client() -> (Arc<MockTransport>, FileClient) {
        let mock = Arc::new(MockTransport::new());
        let protocol = HederaProtocolClient::new(Arc::clone(&mock), operator());
        (mock, FileClient::new(Arc::new(protocol)))
    }

    #[tokio::test]
    async fn test_small_file_is_one_transaction() {
        let (mock, client) = file_client();

        let file_id = client.create_file(b"hello world").await.unwrap();

        assert_eq!(mock.submitted().len(), 1);
        assert_eq!(client.read_file(file_id).await.unwrap(), b"hello world");
        assert_eq!(client.get_size(file_id).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_large_file_is_split_into_appends() {
        let (mock, client) = file_client();
        let contents: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();

        let file_id = client.create_file(&contents).await.unwrap();

        let bodies = mock.bodies();
        assert_eq!(bodies.len(), 3);
        assert!(matches!(bodies[0], TransactionBody::FileCreate { .. }));
        assert!(matches!(bodies[1], TransactionBody::FileAppend { .. }));
        assert!(matches!(bodies[2], TransactionBody::FileAppend { .. }));
        assert_eq!(client.read_file(file_id).await.unwrap(), contents);
    }

    #[tokio::test]
    async fn test_update_replaces_contents() {
        let (_mock, client) = file_client();
        let file_id = client.create_file(b"first").await.unwrap();

        let contents = vec![7u8; FILE_CHUNK_MAX_SIZE + 10];
        client.update_file(file_id, &contents).await.unwrap();

        assert_eq!(client.read_file(file_id).await.unwrap(), contents);
    }

    #[tokio::test]
    async fn test_expiration_and_delete() {
        let (_mock, client) = file_client();
        let file_id = client.create_file(b"data").await.unwrap();
        let expiration = Utc::now() + Duration::days(120);

        client
            .update_expiration_time(file_id, expiration)
            .await
            .unwrap();
        assert_eq!(client.get_expiration_time(file_id).await.unwrap(), expiration);

        assert!(!client.is_deleted(file_id).await.unwrap());
        client.delete_file(file_id).await.unwrap();
        assert!(client.is_deleted(file_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_append_to_deleted_file_is_rejected() {
        let (_mock, client) = file_client();
        let file_id = client.create_file(b"data").await.unwrap();
        client.delete_file(file_id).await.unwrap();

        let err = client.update_file(file_id, b"again").await.unwrap_err();
        assert_eq!(
            err.rejection_status(),
            Some(crate::types::Status::FileDeleted)
        );
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_submission() {
        let (mock, client) = file_client();

        let err = client
            .create_file(&vec![0u8; MAX_FILE_SIZE + 1])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HederaError::Validation(ValidationError::TooLarge { .. })
        ));
        assert!(mock.submitted().is_empty());
    }
}
