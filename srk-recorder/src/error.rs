use std::path::PathBuf;

use thiserror::Error;

pub type RecorderResult<T> = std::result::Result<T, RecorderError>;

#[derive(Debug, Error)]
pub enum RecorderError {
    /// Набор датчиков не найден
    #[error("Sensor suite not found: {0}")]
    SensorNotFound(String),

    /// Ошибка чтения датчика
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Каталог для записи недоступен (нет, не каталог, только чтение)
    #[error("Storage unavailable at {path:?}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    /// Некорректная конфигурация сессии
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Ошибка записи файла
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка формата SRK
    #[error("SRK error: {0}")]
    Srk(#[from] srk_types::SrkError),
}
