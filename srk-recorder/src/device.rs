// Симулятор отдаёт показания в тех же единицах, что и драйверы метки:
// 12-битные отсчёты акселерометра, 16-битные отсчёты гироскопа, регистры
// TMP102 и время RTC. Часы идут от счётчика выборок, поэтому запись
// детерминирована при фиксированном seed.

use std::{f32::consts::PI, fs, path::Path};

use chrono::{NaiveDateTime, TimeDelta};
use rand::{rngs::StdRng, Rng, SeedableRng};
use srk_core::{TimestampExt, ACCEL_FULL_SCALE_COUNTS, GYRO_FULL_SCALE_COUNTS};
use srk_types::{DeviceIdentity, RawSample, Timestamp};

use crate::{RecorderConfig, RecorderError, RecorderResult, SensorKind};

/// Шаг TMP102 (°C на единицу 12-битного отсчёта).
pub const TMP102_RESOLUTION: f32 = 0.0625;

/// Абстракция набора датчиков метки.
// Реализация: [`SimulatedSensors`]; аппаратная шина подключается отдельно.
pub trait SensorSuite: Send {
    /// Информация о датчиках (для логирования и заголовка файла)
    fn info(&self) -> SensorInfo;

    /// Одна 12-битная выборка акселерометра
    fn read_accel(&mut self) -> RecorderResult<RawSample>;

    /// Одна 16-битная выборка гироскопа
    fn read_gyro(&mut self) -> RecorderResult<RawSample>;

    /// Гироскоп включён и его стоит опрашивать
    fn gyro_active(&self) -> bool;

    fn read_clock(&mut self) -> RecorderResult<Timestamp>;

    fn read_celsius(&mut self) -> RecorderResult<f32>;

    /// `None`, если датчика давления нет
    fn read_millibars(&mut self) -> RecorderResult<Option<f32>>;
}

#[derive(Debug, Clone)]
pub struct SensorInfo {
    pub name: String,
    pub accel_scale: f32,
    pub gyro_scale: f32,
    pub has_pressure: bool,
}

/// Генерирует движение (синусоиды + шум) поверх 1 g по оси Z.
pub struct SimulatedSensors {
    pub sample_rate_hz: f32,
    pub accel_scale: f32,
    pub gyro_scale: f32,
    pub gyro_enabled: bool,
    pub pressure_enabled: bool,
    pub motion_freq_hz: f32,
    start: NaiveDateTime,
    tick: u64,
    rng: StdRng,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SimulatedSensors {
    pub fn new(
        start: NaiveDateTime,
        seed: u64,
    ) -> Self {
        Self {
            sample_rate_hz: 100.0,
            accel_scale: 8.0,
            gyro_scale: 250.0,
            gyro_enabled: true,
            pressure_enabled: true,
            motion_freq_hz: 0.5,
            start,
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(
        config: &RecorderConfig,
        start: NaiveDateTime,
    ) -> Self {
        let sample_rate_hz = if config.sample_interval_ms == 0 {
            100.0
        } else {
            1_000.0 / config.sample_interval_ms as f32
        };

        Self {
            sample_rate_hz,
            accel_scale: config.accel_scale,
            gyro_scale: config.gyro_scale,
            gyro_enabled: config.gyro_enabled,
            pressure_enabled: config.pressure_enabled,
            ..Self::new(start, config.seed)
        }
    }

    fn elapsed_secs(&self) -> f32 {
        self.tick as f32 / self.sample_rate_hz
    }
}

impl SensorSuite for SimulatedSensors {
    fn info(&self) -> SensorInfo {
        SensorInfo {
            name: "Simulated tag".to_string(),
            accel_scale: self.accel_scale,
            gyro_scale: self.gyro_scale,
            has_pressure: self.pressure_enabled,
        }
    }

    fn read_accel(&mut self) -> RecorderResult<RawSample> {
        let t = self.elapsed_secs();
        let phase = 2.0 * PI * self.motion_freq_hz * t;
        let counts = ACCEL_FULL_SCALE_COUNTS / self.accel_scale;

        let g = [0.3 * phase.sin(), 0.1 * phase.cos(), 1.0];
        let mut axes = [0i16; 3];
        for (a, v) in axes.iter_mut().zip(g) {
            *a = (v * counts) as i16 + self.rng.gen_range(-4..=4);
        }

        self.tick += 1;
        Ok(RawSample::from_axes(axes).clamp_12bit())
    }

    fn read_gyro(&mut self) -> RecorderResult<RawSample> {
        let t = self.elapsed_secs();
        let phase = 2.0 * PI * self.motion_freq_hz * t;
        let counts = GYRO_FULL_SCALE_COUNTS / self.gyro_scale;

        let dps = [30.0 * phase.cos(), -10.0 * phase.sin(), 2.0];
        let mut axes = [0i16; 3];
        for (a, v) in axes.iter_mut().zip(dps) {
            let noise = self.rng.gen_range(-16.0..=16.0);
            // `as` насыщает на границах i16
            *a = (v * counts + noise) as i16;
        }

        Ok(RawSample::from_axes(axes))
    }

    fn gyro_active(&self) -> bool {
        self.gyro_enabled
    }

    fn read_clock(&mut self) -> RecorderResult<Timestamp> {
        let ms = (self.elapsed_secs() as f64 * 1_000.0) as i64;
        let now = self.start + TimeDelta::milliseconds(ms);
        Ok(Timestamp::from_naive_datetime(&now))
    }

    fn read_celsius(&mut self) -> RecorderResult<f32> {
        let target = 21.5 + 0.5 * (self.elapsed_secs() / 600.0).sin();

        // Через регистр TMP102, как на устройстве
        let raw12 = (target / TMP102_RESOLUTION).round() as i16;
        let [msb, lsb] = (raw12 << 4).to_be_bytes();

        Ok(tmp102_celsius(msb, lsb))
    }

    fn read_millibars(&mut self) -> RecorderResult<Option<f32>> {
        if !self.pressure_enabled {
            return Ok(None);
        }

        Ok(Some(1013.25 + self.rng.gen_range(-0.5..=0.5)))
    }
}

/// Пара регистров TMP102 → °C.
///
/// 12 старших бит - знаковый отсчёт с шагом 0.0625 °C.
pub fn tmp102_celsius(
    msb: u8,
    lsb: u8,
) -> f32 {
    let raw = i16::from_be_bytes([msb, lsb]) >> 4;
    raw as f32 * TMP102_RESOLUTION
}

/// Создаёт набор датчиков по конфигурации.
pub fn create_sensors(
    config: &RecorderConfig,
    start: NaiveDateTime,
) -> RecorderResult<Box<dyn SensorSuite>> {
    match config.sensors {
        SensorKind::Simulated => Ok(Box::new(SimulatedSensors::from_config(config, start))),
        SensorKind::Hardware => Err(RecorderError::SensorNotFound(
            "hardware sensor bus is not available in this build".to_string(),
        )),
    }
}

/// Читает образ идентичности из файла; без файла - встроенная идентичность.
pub fn load_identity(path: Option<&Path>) -> RecorderResult<DeviceIdentity> {
    match path {
        Some(p) => {
            let image = fs::read(p)?;
            Ok(DeviceIdentity::from_eeprom(&image)?)
        }
        None => Ok(DeviceIdentity::default()),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use srk_types::{SrkError, Vector3};

    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 7, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_tmp102_conversion() {
        // Примеры из даташита TMP102
        assert_eq!(tmp102_celsius(0x19, 0x00), 25.0);
        assert_eq!(tmp102_celsius(0x00, 0x10), 0.0625);
        assert_eq!(tmp102_celsius(0x00, 0x00), 0.0);
        assert_eq!(tmp102_celsius(0xFF, 0xF0), -0.0625);
        assert_eq!(tmp102_celsius(0xE7, 0x00), -25.0);
    }

    #[test]
    fn test_simulated_accel_in_range() {
        let mut sensors = SimulatedSensors::new(start(), 1);

        for _ in 0..500 {
            let s = sensors.read_accel().unwrap();
            assert!(s.fits_12bit());
            // ~1 g по Z при шкале 8 g: 256 отсчётов
            assert!((s.z - 256).abs() <= 4, "z = {}", s.z);
        }
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let mut a = SimulatedSensors::new(start(), 42);
        let mut b = SimulatedSensors::new(start(), 42);

        for _ in 0..50 {
            assert_eq!(a.read_accel().unwrap(), b.read_accel().unwrap());
            assert_eq!(a.read_gyro().unwrap(), b.read_gyro().unwrap());
        }
    }

    #[test]
    fn test_clock_follows_samples() {
        let mut sensors = SimulatedSensors::new(start(), 0);
        assert_eq!(sensors.read_clock().unwrap().to_string(), "2016-07-04 12:00:00");

        // 100 Гц: 250 выборок = 2.5 с
        for _ in 0..250 {
            sensors.read_accel().unwrap();
        }
        let t = sensors.read_clock().unwrap();
        assert_eq!((t.min, t.sec), (0, 2));
        assert_eq!(t.wday, 1);
    }

    #[test]
    fn test_temperature_and_pressure() {
        let mut sensors = SimulatedSensors::new(start(), 0);

        let c = sensors.read_celsius().unwrap();
        assert!((c - 21.5).abs() < 0.1, "celsius = {c}");
        // Значение кратно шагу TMP102
        assert_eq!((c / TMP102_RESOLUTION).fract(), 0.0);

        assert!(sensors.read_millibars().unwrap().is_some());
        sensors.pressure_enabled = false;
        assert_eq!(sensors.read_millibars().unwrap(), None);
        assert!(!sensors.info().has_pressure);
    }

    #[test]
    fn test_create_sensors() {
        let config = RecorderConfig {
            gyro_enabled: false,
            ..RecorderConfig::default()
        };
        let sensors = create_sensors(&config, start()).unwrap();
        assert!(!sensors.gyro_active());
        assert_eq!(sensors.info().accel_scale, 8.0);

        let hw = RecorderConfig {
            sensors: SensorKind::Hardware,
            ..RecorderConfig::default()
        };
        assert!(matches!(
            create_sensors(&hw, start()),
            Err(RecorderError::SensorNotFound(_))
        ));
    }

    #[test]
    fn test_load_identity() {
        assert_eq!(load_identity(None).unwrap(), DeviceIdentity::default());

        let identity = DeviceIdentity::new(*b"OWL7", 1, Vector3::new(0.5, -1.0, 2.0));
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), identity.to_eeprom()).unwrap();
        assert_eq!(load_identity(Some(tmp.path())).unwrap(), identity);

        fs::write(tmp.path(), [0u8; 5]).unwrap();
        assert!(matches!(
            load_identity(Some(tmp.path())),
            Err(RecorderError::Srk(SrkError::IdentityImage { .. }))
        ));
    }
}
