use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::{SrkError, SrkResult, Vector3};

/// Размер образа идентичности в энергонезависимой памяти устройства.
///
/// ```text
/// [0..4]   NAME     [u8; 4]
/// [4]      ORIENT   u8
/// [5..9]   GX       f32
/// [9..13]  GY       f32
/// [13..17] GZ       f32
/// ```
pub const IDENTITY_IMAGE_SIZE: usize = 17;

/// Идентичность и калибровка устройства из внешнего хранилища.
///
/// Ядро формата эти поля не проверяет: только встраивает и извлекает.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub name: [u8; 4],
    pub orientation: u8,
    pub gyro_bias: Vector3,
}

impl DeviceIdentity {
    pub fn new(
        name: [u8; 4],
        orientation: u8,
        gyro_bias: Vector3,
    ) -> Self {
        Self {
            name,
            orientation,
            gyro_bias,
        }
    }

    /// Разбирает образ EEPROM (первые [`IDENTITY_IMAGE_SIZE`] байт).
    pub fn from_eeprom(image: &[u8]) -> SrkResult<Self> {
        if image.len() < IDENTITY_IMAGE_SIZE {
            return Err(SrkError::IdentityImage {
                needed: IDENTITY_IMAGE_SIZE,
                available: image.len(),
            });
        }

        let mut name = [0u8; 4];
        name.copy_from_slice(&image[0..4]);

        Ok(Self {
            name,
            orientation: image[4],
            gyro_bias: Vector3::new(
                LittleEndian::read_f32(&image[5..9]),
                LittleEndian::read_f32(&image[9..13]),
                LittleEndian::read_f32(&image[13..17]),
            ),
        })
    }

    /// Обратная операция к [`DeviceIdentity::from_eeprom`].
    pub fn to_eeprom(&self) -> [u8; IDENTITY_IMAGE_SIZE] {
        let mut image = [0u8; IDENTITY_IMAGE_SIZE];
        image[0..4].copy_from_slice(&self.name);
        image[4] = self.orientation;
        LittleEndian::write_f32(&mut image[5..9], self.gyro_bias.x);
        LittleEndian::write_f32(&mut image[9..13], self.gyro_bias.y);
        LittleEndian::write_f32(&mut image[13..17], self.gyro_bias.z);
        image
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::new(*b"TAG0", 0, Vector3::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eeprom_round_trip() {
        let id = DeviceIdentity::new(*b"OWL1", 1, Vector3::new(0.25, -1.5, 3.0));
        let image = id.to_eeprom();

        assert_eq!(&image[0..4], b"OWL1");
        assert_eq!(image[4], 1);
        // 0.25f32 = 0x3E800000, little-endian
        assert_eq!(&image[5..9], &[0x00, 0x00, 0x80, 0x3E]);

        assert_eq!(DeviceIdentity::from_eeprom(&image).unwrap(), id);
    }

    #[test]
    fn test_eeprom_short_image() {
        let result = DeviceIdentity::from_eeprom(&[0u8; 10]);
        assert!(matches!(
            result,
            Err(SrkError::IdentityImage {
                needed: 17,
                available: 10
            })
        ));
    }

    #[test]
    fn test_eeprom_ignores_trailing_bytes() {
        let mut image = DeviceIdentity::default().to_eeprom().to_vec();
        image.extend_from_slice(&[0xFF; 32]);
        assert_eq!(
            DeviceIdentity::from_eeprom(&image).unwrap(),
            DeviceIdentity::default()
        );
    }
}
