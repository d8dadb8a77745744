use std::path::PathBuf;

use crate::{RecorderError, RecorderResult};

/// Источник показаний датчиков (выбор при старте).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorKind {
    /// Встроенный симулятор (не требует железа).
    Simulated,
    /// Шина I2C/SPI носимой метки.
    Hardware,
}

/// Полная конфигурация сессии записи.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Источник показаний
    pub sensors: SensorKind,
    /// Каталог, в котором выбирается имя `DATA-NNN.SRK`
    pub output_dir: PathBuf,
    /// Файл с образом идентичности устройства (17 байт); `None` - встроенный
    pub identity_path: Option<PathBuf>,
    /// Выборок акселерометра в одной секции `ACCL`
    pub accel_write_size: usize,
    /// Выборок гироскопа в одной секции `GYRO`
    pub gyro_write_size: usize,
    /// Циклов между секциями `LONG` (0 - без долговременных записей)
    pub long_term_period: u16,
    /// Полная шкала акселерометра (g)
    pub accel_scale: f32,
    /// Полная шкала гироскопа (°/с)
    pub gyro_scale: f32,
    /// Писать ли гироскоп
    pub gyro_enabled: bool,
    /// Есть ли датчик давления
    pub pressure_enabled: bool,
    /// Пауза между опросами датчиков (мс; 0 - без пауз)
    pub sample_interval_ms: u64,
    /// Ограничение по количеству циклов (None = до Ctrl+C)
    pub max_cycles: Option<u64>,
    /// Интервал вывода статистики (секунды)
    pub stats_interval_secs: u64,
    /// Seed симулятора
    pub seed: u64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RecorderConfig {
    /// Проверяет размеры записи до начала сессии.
    ///
    /// Оба размера ненулевые, помещаются в `u16` заголовка, и гироскоп не
    /// пишет больше выборок, чем акселерометр.
    pub fn validate(&self) -> RecorderResult<()> {
        if self.accel_write_size == 0 || self.gyro_write_size == 0 {
            return Err(RecorderError::Config(
                "write sizes must be non-zero".to_string(),
            ));
        }

        if self.accel_write_size > u16::MAX as usize {
            return Err(RecorderError::Config(format!(
                "accelerometer write size {} exceeds {}",
                self.accel_write_size,
                u16::MAX
            )));
        }

        if self.gyro_write_size > self.accel_write_size {
            return Err(RecorderError::Config(format!(
                "gyroscope write size {} exceeds accelerometer write size {}",
                self.gyro_write_size, self.accel_write_size
            )));
        }

        if !(self.accel_scale > 0.0 && self.gyro_scale > 0.0) {
            return Err(RecorderError::Config(
                "sensor scales must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SensorKind, RecorderConfig
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for SensorKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            SensorKind::Simulated => write!(f, "sim"),
            SensorKind::Hardware => write!(f, "hw"),
        }
    }
}

impl std::str::FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sim" | "simulated" => Ok(SensorKind::Simulated),
            "hw" | "hardware" => Ok(SensorKind::Hardware),
            _ => Err(format!("Unknown sensor source: '{s}'. Use: sim, hw")),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sensors: SensorKind::Simulated,
            output_dir: PathBuf::from("."),
            identity_path: None,
            accel_write_size: 24,
            gyro_write_size: 12,
            long_term_period: 3,
            accel_scale: 8.0,
            gyro_scale: 250.0,
            gyro_enabled: true,
            pressure_enabled: true,
            sample_interval_ms: 10, // 100 Гц
            max_cycles: None,
            stats_interval_secs: 5,
            seed: 0x5EED,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
