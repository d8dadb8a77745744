use std::path::PathBuf;

use srk_types::SrkError;
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Файл не разобран; вывод для него не создаётся
    #[error("{path:?} rejected: {source}")]
    Rejected {
        path: PathBuf,
        #[source]
        source: SrkError,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl ConvertError {
    /// Смещение, на котором остановился разбор отвергнутого файла.
    pub fn offset(&self) -> Option<u64> {
        match self {
            ConvertError::Rejected { source, .. } => source.offset(),
            _ => None,
        }
    }
}
