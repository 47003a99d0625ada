use std::{error::Error, fmt};

use thiserror::Error as ThisError;

#[derive(Debug)]
pub enum KvError {
    Backend(Box<dyn Error + Send + Sync + 'static>),
    HttpStatus(u16),
    LockError(String),
    InvalidValue(String),
}

impl std::error::Error for KvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use KvError::*;
        match self {
            Backend(e) => Some(e.as_ref() as &dyn Error),
            _ => None,
        }
    }
}

impl fmt::Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KvError::*;
        match self {
            Backend(e) => write!(f, "KvBackendError: {}", e),
            HttpStatus(s) => write!(f, "KvHttpStatus: {}", s),
            LockError(s) => write!(f, "LockError: {}", s),
            InvalidValue(s) => write!(f, "InvalidValue: {}", s),
        }
    }
}

impl From<libsql::Error> for KvError {
    fn from(error: libsql::Error) -> Self {
        KvError::Backend(Box::new(error))
    }
}

impl From<reqwest::Error> for KvError {
    fn from(error: reqwest::Error) -> Self {
        KvError::Backend(Box::new(error))
    }
}

#[derive(Debug)]
pub enum StorageError {
    Kv(KvError),
    Corrupt(String, serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use StorageError::*;
        match self {
            Kv(e) => write!(f, "{}", e),
            Corrupt(key, e) => write!(f, "stored value for {} is not valid JSON: {}", key, e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use StorageError::*;
        match self {
            Kv(e) => Some(e),
            Corrupt(_, e) => Some(e),
        }
    }
}

impl From<KvError> for StorageError {
    fn from(error: KvError) -> Self {
        StorageError::Kv(error)
    }
}

#[derive(ThisError, Debug)]
pub enum IconError {
    #[error("invalid icon url: {0}")]
    InvalidUrl(String),
    #[error("upstream returned {0}")]
    Upstream(reqwest::StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(ThisError, Debug)]
pub enum WebDavError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("could not create directory {0}: {1}")]
    CreateDirectory(String, reqwest::StatusCode),
    #[error("invalid method {0}")]
    Method(String),
    #[error("backup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
