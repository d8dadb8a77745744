use serde::{Deserialize, Serialize};

/// Минимальное значение 12-битной выборки.
pub const RAW12_MIN: i16 = -2048;

/// Максимальное значение 12-битной выборки.
pub const RAW12_MAX: i16 = 2047;

/// Сырая трёхосевая выборка в отсчётах АЦП датчика.
///
/// Для акселерометра каждая ось обязана укладываться в 12 бит со знаком
/// ([`RAW12_MIN`]..=[`RAW12_MAX`]); гироскоп использует полный диапазон `i16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Трёхосевое значение в физических единицах (g, °/с, ...).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RawSample {
    pub const ZERO: RawSample = RawSample { x: 0, y: 0, z: 0 };

    pub fn new(
        x: i16,
        y: i16,
        z: i16,
    ) -> Self {
        Self { x, y, z }
    }

    pub fn axes(&self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_axes(a: [i16; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// Все три оси укладываются в 12 бит со знаком.
    pub fn fits_12bit(&self) -> bool {
        self.axes()
            .iter()
            .all(|v| (RAW12_MIN..=RAW12_MAX).contains(v))
    }

    /// Ограничивает каждую ось 12-битным диапазоном.
    ///
    /// Производитель обязан вызвать это (или масштабировать сам) до
    /// упаковки: поведение кодека вне диапазона не определено.
    pub fn clamp_12bit(&self) -> Self {
        Self::new(
            self.x.clamp(RAW12_MIN, RAW12_MAX),
            self.y.clamp(RAW12_MIN, RAW12_MAX),
            self.z.clamp(RAW12_MIN, RAW12_MAX),
        )
    }
}

impl Vector3 {
    pub fn new(
        x: f32,
        y: f32,
        z: f32,
    ) -> Self {
        Self { x, y, z }
    }

    /// Покомпонентная разность, используется для вычета bias.
    pub fn sub(
        &self,
        other: &Vector3,
    ) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn is_within_delta(
        &self,
        other: &Vector3,
        delta: f32,
    ) -> bool {
        (self.x - other.x).abs() <= delta
            && (self.y - other.y).abs() <= delta
            && (self.z - other.z).abs() <= delta
    }
}

impl From<[i16; 3]> for RawSample {
    fn from(a: [i16; 3]) -> Self {
        Self::from_axes(a)
    }
}
