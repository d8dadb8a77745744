use serde::{Deserialize, Serialize};

use crate::{FrameTag, Timestamp, Vector3};

/// Долговременная запись: часы, температура и давление.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongTermRecord {
    pub time: Timestamp,
    /// Температура (°C)
    pub celsius: f32,
    /// Давление (мбар); `None` если датчика давления нет
    pub millibars: Option<f32>,
}

/// Запись, восстановленная парсером из одной секции файла.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryRecord {
    /// Выборки акселерометра в g
    Accel(Vec<Vector3>),
    /// Выборки гироскопа в °/с
    Gyro(Vec<Vector3>),
    /// Часы / температура / давление
    LongTerm(LongTermRecord),
}

impl TelemetryRecord {
    /// Тег секции, из которой получена запись.
    pub fn tag(&self) -> FrameTag {
        match self {
            TelemetryRecord::Accel(_) => FrameTag::Accel,
            TelemetryRecord::Gyro(_) => FrameTag::Gyro,
            TelemetryRecord::LongTerm(_) => FrameTag::LongTerm,
        }
    }

    /// Количество трёхосевых выборок (0 для долговременной записи).
    pub fn sample_count(&self) -> usize {
        match self {
            TelemetryRecord::Accel(v) | TelemetryRecord::Gyro(v) => v.len(),
            TelemetryRecord::LongTerm(_) => 0,
        }
    }
}
