use serde::{Deserialize, Serialize};

use crate::{DeviceIdentity, Timestamp, Vector3};

/// Заголовок SRK файла (31 байт полей + 13 байт отметки времени).
///
/// Пишется один раз в начале сессии и настраивает весь дальнейший разбор.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Имя устройства (4 байта, как есть)
    pub name: [u8; 4],
    /// Флаг ориентации крепления
    pub orientation: u8,
    /// Смещение нуля гироскопа (°/с)
    pub gyro_bias: Vector3,
    /// Выборок акселерометра в одной секции `ACCL`
    pub accel_write_size: u16,
    /// Выборок гироскопа в одной секции `GYRO`
    pub gyro_write_size: u16,
    /// Циклов записи между секциями `LONG`
    pub long_term_period: u16,
    /// Полная шкала акселерометра (g)
    pub accel_scale: f32,
    /// Полная шкала гироскопа (°/с)
    pub gyro_scale: f32,
    /// Время начала сессии
    pub start_time: Timestamp,
}

impl FileHeader {
    /// Собирает заголовок из идентичности устройства и параметров сессии.
    pub fn new(
        identity: &DeviceIdentity,
        accel_write_size: u16,
        gyro_write_size: u16,
        long_term_period: u16,
    ) -> Self {
        Self {
            name: identity.name,
            orientation: identity.orientation,
            gyro_bias: identity.gyro_bias,
            accel_write_size,
            gyro_write_size,
            long_term_period,
            accel_scale: 8.0,
            gyro_scale: 250.0,
            start_time: Timestamp::default(),
        }
    }

    /// Имя устройства как строка (нулевые байты в конце отбрасываются).
    pub fn name_str(&self) -> String {
        String::from_utf8_lossy(&self.name)
            .trim_end_matches('\0')
            .to_string()
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            name: self.name,
            orientation: self.orientation,
            gyro_bias: self.gyro_bias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_str_trims_nul() {
        let id = DeviceIdentity::new(*b"AB\0\0", 1, Vector3::default());
        let h = FileHeader::new(&id, 24, 24, 3);
        assert_eq!(h.name_str(), "AB");
        assert_eq!(h.identity(), id);
    }
}
