use chrono::{DateTime, Utc};

use super::transport::{QueryKind, QueryResponse, TransactionBody, TransactionReceipt};
use super::{
    expect_on_success, transaction_result, unexpected_response, QueryOperation,
    TransactionOperation,
};
use crate::crypto::PrivateKey;
use crate::error::{OperationFailure, ValidationError};
use crate::types::{Account, FileId, Status, TransactionId};

/// Maximum content carried by a single file create, append or update transaction.
pub const FILE_CHUNK_MAX_SIZE: usize = 2048;

/// Maximum size of a file stored on the network.
pub const MAX_FILE_SIZE: usize = 1024 * 1024;

fn check_chunk(contents: &[u8]) -> Result<(), ValidationError> {
    if contents.len() > FILE_CHUNK_MAX_SIZE {
        return Err(ValidationError::TooLarge {
            field: "contents",
            max: FILE_CHUNK_MAX_SIZE,
            actual: contents.len(),
        });
    }
    Ok(())
}

fn check_expiration(expiration_time: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *expiration_time <= Utc::now() {
        return Err(ValidationError::invalid(
            "expiration time",
            "expiration time must be in the future",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileContentsRequest {
    file_id: FileId,
}

impl FileContentsRequest {
    pub fn new(file_id: FileId) -> Self {
        Self { file_id }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContentsResponse {
    pub file_id: FileId,
    pub contents: Vec<u8>,
}

impl QueryOperation for FileContentsRequest {
    type Output = FileContentsResponse;

    const OPERATION: &'static str = "FileContentsQuery";

    fn query(&self) -> QueryKind {
        QueryKind::FileContents {
            file_id: self.file_id,
        }
    }

    fn into_output(&self, response: QueryResponse) -> Result<FileContentsResponse, OperationFailure> {
        match response {
            QueryResponse::FileContents { file_id, contents } => {
                Ok(FileContentsResponse { file_id, contents })
            }
            other => Err(unexpected_response("file_contents", &other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfoRequest {
    file_id: FileId,
}

impl FileInfoRequest {
    pub fn new(file_id: FileId) -> Self {
        Self { file_id }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfoResponse {
    pub file_id: FileId,
    pub size: u64,
    pub deleted: bool,
    pub expiration_time: DateTime<Utc>,
}

impl QueryOperation for FileInfoRequest {
    type Output = FileInfoResponse;

    const OPERATION: &'static str = "FileInfoQuery";

    fn query(&self) -> QueryKind {
        QueryKind::FileInfo {
            file_id: self.file_id,
        }
    }

    fn into_output(&self, response: QueryResponse) -> Result<FileInfoResponse, OperationFailure> {
        match response {
            QueryResponse::FileInfo {
                file_id,
                size,
                deleted,
                expiration_time,
            } => Ok(FileInfoResponse {
                file_id,
                size,
                deleted,
                expiration_time,
            }),
            other => Err(unexpected_response("file_info", &other)),
        }
    }
}

/// Create a file owned by the operator key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCreateRequest {
    contents: Vec<u8>,
    expiration_time: Option<DateTime<Utc>>,
}

impl FileCreateRequest {
    pub fn new(contents: Vec<u8>) -> Result<Self, ValidationError> {
        check_chunk(&contents)?;
        Ok(Self {
            contents,
            expiration_time: None,
        })
    }

    pub fn with_expiration(
        contents: Vec<u8>,
        expiration_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        check_expiration(&expiration_time)?;
        let mut request = Self::new(contents)?;
        request.expiration_time = Some(expiration_time);
        Ok(request)
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        self.expiration_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub file_id: Option<FileId>,
}

transaction_result!(FileCreateResult, "FileCreate");

impl TransactionOperation for FileCreateRequest {
    type Output = FileCreateResult;

    fn body(&self, operator: &Account) -> TransactionBody {
        TransactionBody::FileCreate {
            contents: self.contents.clone(),
            keys: vec![operator.public_key.clone()],
            expiration_time: self.expiration_time,
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(&self, receipt: TransactionReceipt) -> Result<FileCreateResult, OperationFailure> {
        let file_id = expect_on_success(&receipt, receipt.file_id, "file id")?;
        Ok(FileCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            file_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAppendRequest {
    file_id: FileId,
    contents: Vec<u8>,
}

impl FileAppendRequest {
    pub fn new(file_id: FileId, contents: Vec<u8>) -> Result<Self, ValidationError> {
        if contents.is_empty() {
            return Err(ValidationError::Empty { field: "contents" });
        }
        check_chunk(&contents)?;
        Ok(Self { file_id, contents })
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAppendResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(FileAppendResult, "FileAppend");

impl TransactionOperation for FileAppendRequest {
    type Output = FileAppendResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::FileAppend {
            file_id: self.file_id,
            contents: self.contents.clone(),
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(&self, receipt: TransactionReceipt) -> Result<FileAppendResult, OperationFailure> {
        Ok(FileAppendResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

/// Replace the contents and/or move the expiration time of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdateRequest {
    file_id: FileId,
    contents: Option<Vec<u8>>,
    expiration_time: Option<DateTime<Utc>>,
}

impl FileUpdateRequest {
    pub fn new(
        file_id: FileId,
        contents: Option<Vec<u8>>,
        expiration_time: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if contents.is_none() && expiration_time.is_none() {
            return Err(ValidationError::invalid(
                "file update",
                "either contents or expiration time must be set",
            ));
        }
        if let Some(contents) = &contents {
            check_chunk(contents)?;
        }
        if let Some(expiration_time) = &expiration_time {
            check_expiration(expiration_time)?;
        }
        Ok(Self {
            file_id,
            contents,
            expiration_time,
        })
    }

    pub fn for_contents(file_id: FileId, contents: Vec<u8>) -> Result<Self, ValidationError> {
        Self::new(file_id, Some(contents), None)
    }

    pub fn for_expiration(
        file_id: FileId,
        expiration_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Self::new(file_id, None, Some(expiration_time))
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn contents(&self) -> Option<&[u8]> {
        self.contents.as_deref()
    }

    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        self.expiration_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(FileUpdateResult, "FileUpdate");

impl TransactionOperation for FileUpdateRequest {
    type Output = FileUpdateResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::FileUpdate {
            file_id: self.file_id,
            contents: self.contents.clone(),
            expiration_time: self.expiration_time,
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(&self, receipt: TransactionReceipt) -> Result<FileUpdateResult, OperationFailure> {
        Ok(FileUpdateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileDeleteRequest {
    file_id: FileId,
}

impl FileDeleteRequest {
    pub fn new(file_id: FileId) -> Self {
        Self { file_id }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDeleteResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(FileDeleteResult, "FileDelete");

impl TransactionOperation for FileDeleteRequest {
    type Output = FileDeleteResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::FileDelete {
            file_id: self.file_id,
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(&self, receipt: TransactionReceipt) -> Result<FileDeleteResult, OperationFailure> {
        Ok(FileDeleteResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}
