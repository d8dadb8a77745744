//! Спецификация формата файлов SRK.
//!
//! Формат фиксирован и не версионируется. Все многобайтовые числа хранятся
//! в порядке little-endian, без выравнивания.
//!
//! ```text
//! [0..4]   NAME          [u8; 4]
//! [4]      ORIENT        u8
//! [5..17]  GYRO_BIAS     3 × f32
//! [17..19] ACCEL_WS      u16  выборок в секции ACCL
//! [19..21] GYRO_WS       u16  выборок в секции GYRO
//! [21..23] PERIOD        u16  циклов между секциями LONG
//! [23..27] ACCEL_SCALE   f32
//! [27..31] GYRO_SCALE    f32
//! [31..44] TIMESTAMP     начало сессии
//! ```
//!
//! Далее повторяются циклы записи:
//!
//! ```text
//! "ACCL" + ceil(ACCEL_WS / 2) * 9 байт
//! "GYRO" + GYRO_WS * 6 байт  |  "GSKP"
//! ["LONG" + TIMESTAMP + celsius f32 + millibars f32]
//! ```

use std::io::{Read, Write};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use srk_types::{FileHeader, LongTermRecord, SrkError, SrkResult, Timestamp, Vector3};

use crate::binary::{
    read_f32_at, read_i32_at, read_u16_at, read_u8_at, read_up_to, write_f32_at, write_i32_at,
    write_u16_at, write_u8_at,
};

/// Размер тега секции.
pub const TAG_SIZE: usize = 4;

/// Размер отметки времени RTC.
pub const TIMESTAMP_SIZE: usize = 13;

/// Размер фиксированных полей заголовка (без отметки времени).
pub const HEADER_FIELDS_SIZE: usize = 31;

/// Полный размер заголовка вместе с отметкой времени начала сессии.
pub const HEADER_SIZE: usize = HEADER_FIELDS_SIZE + TIMESTAMP_SIZE;

/// Размер payload секции `LONG`.
pub const LONG_TERM_SIZE: usize = TIMESTAMP_SIZE + 4 + 4;

/// Сериализация отметки времени.
pub trait TimestampExt: Sized {
    fn to_bytes(&self) -> [u8; TIMESTAMP_SIZE];
    fn from_bytes(buf: &[u8; TIMESTAMP_SIZE]) -> Self;
    /// `None`, если поля не образуют корректную дату.
    fn to_naive_datetime(&self) -> Option<NaiveDateTime>;
    /// Заполняет все поля RTC, включая день недели и года.
    fn from_naive_datetime(dt: &NaiveDateTime) -> Self;
}

/// Сериализация заголовка файла.
pub trait FileHeaderExt: Sized {
    fn to_bytes(&self) -> [u8; HEADER_SIZE];
    fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self;
    fn write_to<W: Write>(
        &self,
        sink: &mut W,
    ) -> SrkResult<()>;
    fn read_from<R: Read>(source: &mut R) -> SrkResult<Self>;
}

/// Сериализация долговременной записи.
pub trait LongTermRecordExt: Sized {
    fn to_bytes(&self) -> [u8; LONG_TERM_SIZE];
    fn from_bytes(buf: &[u8; LONG_TERM_SIZE]) -> Self;
}

fn write_timestamp_at(
    buf: &mut [u8],
    off: &mut usize,
    t: &Timestamp,
) {
    write_u8_at(buf, off, t.sec);
    write_u8_at(buf, off, t.min);
    write_u8_at(buf, off, t.hour);
    write_u8_at(buf, off, t.mday);
    write_u8_at(buf, off, t.mon);
    write_i32_at(buf, off, t.year);
    write_u8_at(buf, off, t.wday);
    write_u8_at(buf, off, t.yday);
    write_u8_at(buf, off, t.isdst);
    write_u8_at(buf, off, t.year_s);
}

fn read_timestamp_at(
    buf: &[u8],
    off: &mut usize,
) -> Timestamp {
    Timestamp {
        sec: read_u8_at(buf, off),
        min: read_u8_at(buf, off),
        hour: read_u8_at(buf, off),
        mday: read_u8_at(buf, off),
        mon: read_u8_at(buf, off),
        year: read_i32_at(buf, off),
        wday: read_u8_at(buf, off),
        yday: read_u8_at(buf, off),
        isdst: read_u8_at(buf, off),
        year_s: read_u8_at(buf, off),
    }
}

impl TimestampExt for Timestamp {
    fn to_bytes(&self) -> [u8; TIMESTAMP_SIZE] {
        let mut buf = [0u8; TIMESTAMP_SIZE];
        let mut off = 0;

        write_timestamp_at(&mut buf, &mut off, self);
        debug_assert_eq!(off, TIMESTAMP_SIZE);

        buf
    }

    fn from_bytes(buf: &[u8; TIMESTAMP_SIZE]) -> Self {
        let mut off = 0;
        read_timestamp_at(buf, &mut off)
    }

    fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.mon as u32, self.mday as u32)?.and_hms_opt(
            self.hour as u32,
            self.min as u32,
            self.sec as u32,
        )
    }

    fn from_naive_datetime(dt: &NaiveDateTime) -> Self {
        Timestamp {
            sec: dt.second() as u8,
            min: dt.minute() as u8,
            hour: dt.hour() as u8,
            mday: dt.day() as u8,
            mon: dt.month() as u8,
            year: dt.year(),
            wday: dt.weekday().num_days_from_sunday() as u8,
            // В формате под день года один байт, старшая часть теряется
            yday: dt.ordinal0() as u8,
            isdst: 0,
            // Двузначный год
            year_s: dt.year().rem_euclid(100) as u8,
        }
    }
}

impl FileHeaderExt for FileHeader {
    fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        let mut off = 0;

        buf[off..off + 4].copy_from_slice(&self.name);
        off += 4;

        write_u8_at(&mut buf, &mut off, self.orientation);
        write_f32_at(&mut buf, &mut off, self.gyro_bias.x);
        write_f32_at(&mut buf, &mut off, self.gyro_bias.y);
        write_f32_at(&mut buf, &mut off, self.gyro_bias.z);
        write_u16_at(&mut buf, &mut off, self.accel_write_size);
        write_u16_at(&mut buf, &mut off, self.gyro_write_size);
        write_u16_at(&mut buf, &mut off, self.long_term_period);
        write_f32_at(&mut buf, &mut off, self.accel_scale);
        write_f32_at(&mut buf, &mut off, self.gyro_scale);
        debug_assert_eq!(off, HEADER_FIELDS_SIZE);

        write_timestamp_at(&mut buf, &mut off, &self.start_time);
        debug_assert_eq!(off, HEADER_SIZE);

        buf
    }

    fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut off = 0;

        let mut name = [0u8; 4];
        name.copy_from_slice(&buf[0..4]);
        off += 4;

        let orientation = read_u8_at(buf, &mut off);
        let gyro_bias = Vector3::new(
            read_f32_at(buf, &mut off),
            read_f32_at(buf, &mut off),
            read_f32_at(buf, &mut off),
        );
        let accel_write_size = read_u16_at(buf, &mut off);
        let gyro_write_size = read_u16_at(buf, &mut off);
        let long_term_period = read_u16_at(buf, &mut off);
        let accel_scale = read_f32_at(buf, &mut off);
        let gyro_scale = read_f32_at(buf, &mut off);
        let start_time = read_timestamp_at(buf, &mut off);

        FileHeader {
            name,
            orientation,
            gyro_bias,
            accel_write_size,
            gyro_write_size,
            long_term_period,
            accel_scale,
            gyro_scale,
            start_time,
        }
    }

    fn write_to<W: Write>(
        &self,
        sink: &mut W,
    ) -> SrkResult<()> {
        sink.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Читает ровно [`HEADER_SIZE`] байт; меньше: [`SrkError::HeaderTruncated`].
    fn read_from<R: Read>(source: &mut R) -> SrkResult<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        let n = read_up_to(source, &mut buf)?;

        if n < HEADER_SIZE {
            return Err(SrkError::HeaderTruncated {
                needed: HEADER_SIZE,
                available: n,
            });
        }

        Ok(Self::from_bytes(&buf))
    }
}

impl LongTermRecordExt for LongTermRecord {
    fn to_bytes(&self) -> [u8; LONG_TERM_SIZE] {
        let mut buf = [0u8; LONG_TERM_SIZE];
        let mut off = 0;

        write_timestamp_at(&mut buf, &mut off, &self.time);
        write_f32_at(&mut buf, &mut off, self.celsius);
        // Нет датчика давления: NaN
        write_f32_at(&mut buf, &mut off, self.millibars.unwrap_or(f32::NAN));
        debug_assert_eq!(off, LONG_TERM_SIZE);

        buf
    }

    fn from_bytes(buf: &[u8; LONG_TERM_SIZE]) -> Self {
        let mut off = 0;

        let time = read_timestamp_at(buf, &mut off);
        let celsius = read_f32_at(buf, &mut off);
        let millibars = read_f32_at(buf, &mut off);

        LongTermRecord {
            time,
            celsius,
            millibars: (!millibars.is_nan()).then_some(millibars),
        }
    }
}
