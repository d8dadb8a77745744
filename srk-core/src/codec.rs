//! Битовая упаковка трёхосевых выборок.
//!
//! Две 12-битные выборки A и B укладываются в 9 байт:
//!
//! ```text
//! [0..3]  xA yA zA   младшие 8 бит выборки A по осям
//! [3..6]  xB yB zB   младшие 8 бит выборки B по осям
//! [6..9]  nx ny nz   старший полубайт A << 4 | старший полубайт B
//! ```
//!
//! Нечётная последняя выборка пакуется в паре с нулевой; при разборе
//! лишний слот отбрасывается по объявленному количеству.
//!
//! Гироскоп не пакуется: три `i16` little-endian на выборку.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use srk_types::{RawSample, SrkError, SrkResult, Vector3};

/// Размер упакованной пары выборок.
pub const PACKED_UNIT_SIZE: usize = 9;

/// Размер одной неупакованной 16-битной выборки.
pub const RAW16_SAMPLE_SIZE: usize = 6;

/// Отсчётов на полную шкалу 12-битного акселерометра.
pub const ACCEL_FULL_SCALE_COUNTS: f32 = 2048.0;

/// Отсчётов на полную шкалу 16-битного гироскопа.
pub const GYRO_FULL_SCALE_COUNTS: f32 = 32768.0;

/// Размер упакованных данных для `count` выборок.
pub fn packed_len(count: usize) -> usize {
    count.div_ceil(2) * PACKED_UNIT_SIZE
}

/// Размер неупакованных данных для `count` выборок.
pub fn raw16_len(count: usize) -> usize {
    count * RAW16_SAMPLE_SIZE
}

#[inline]
fn high_nibble(v: i16) -> u8 {
    ((v >> 8) & 0x0F) as u8
}

/// Восстанавливает знак 12-битного значения (дополнительный код).
#[inline]
pub fn sign_extend_12(v: u16) -> i16 {
    let v = (v & 0x0FFF) as i16;
    if v >= 2048 {
        v - 4096
    } else {
        v
    }
}

/// Пакует пару выборок в 9 байт.
pub fn pack_pair(
    a: &RawSample,
    b: &RawSample,
) -> [u8; PACKED_UNIT_SIZE] {
    let (a, b) = (a.axes(), b.axes());
    let mut unit = [0u8; PACKED_UNIT_SIZE];

    for axis in 0..3 {
        unit[axis] = a[axis] as u8;
        unit[3 + axis] = b[axis] as u8;
        unit[6 + axis] = (high_nibble(a[axis]) << 4) | high_nibble(b[axis]);
    }

    unit
}

/// Распаковывает 9 байт обратно в пару выборок.
pub fn unpack_pair(unit: &[u8; PACKED_UNIT_SIZE]) -> (RawSample, RawSample) {
    let mut a = [0i16; 3];
    let mut b = [0i16; 3];

    for axis in 0..3 {
        let nibbles = unit[6 + axis] as u16;
        a[axis] = sign_extend_12(((nibbles >> 4) << 8) | unit[axis] as u16);
        b[axis] = sign_extend_12(((nibbles & 0x0F) << 8) | unit[3 + axis] as u16);
    }

    (RawSample::from_axes(a), RawSample::from_axes(b))
}

/// Пишет выборки в упакованном виде. Возвращает число записанных байт.
pub fn pack_samples<W: Write>(
    samples: &[RawSample],
    sink: &mut W,
) -> std::io::Result<usize> {
    for pair in samples.chunks(2) {
        let second = pair.get(1).unwrap_or(&RawSample::ZERO);
        sink.write_all(&pack_pair(&pair[0], second))?;
    }

    Ok(packed_len(samples.len()))
}

/// Convenience: упаковка в новый вектор.
pub fn pack_to_vec(samples: &[RawSample]) -> Vec<u8> {
    let mut out = Vec::with_capacity(packed_len(samples.len()));
    // Запись в Vec не падает
    let _ = pack_samples(samples, &mut out);
    out
}

/// Распаковывает ровно `count` выборок из начала `buf`.
///
/// Смещение в ошибке отсчитывается от начала `buf`.
pub fn unpack_samples(
    buf: &[u8],
    count: usize,
) -> SrkResult<Vec<RawSample>> {
    let needed = packed_len(count);
    if buf.len() < needed {
        return Err(SrkError::TruncatedStream {
            offset: 0,
            needed,
            available: buf.len(),
        });
    }

    let mut out = Vec::with_capacity(count);

    for chunk in buf[..needed].chunks_exact(PACKED_UNIT_SIZE) {
        let mut unit = [0u8; PACKED_UNIT_SIZE];
        unit.copy_from_slice(chunk);

        let (a, b) = unpack_pair(&unit);
        out.push(a);
        if out.len() < count {
            out.push(b);
        }
    }

    Ok(out)
}

/// Пишет выборки как `i16` little-endian (вариант для гироскопа).
pub fn write_raw16_samples<W: Write>(
    samples: &[RawSample],
    sink: &mut W,
) -> std::io::Result<usize> {
    for s in samples {
        sink.write_i16::<LittleEndian>(s.x)?;
        sink.write_i16::<LittleEndian>(s.y)?;
        sink.write_i16::<LittleEndian>(s.z)?;
    }

    Ok(raw16_len(samples.len()))
}

/// Читает ровно `count` неупакованных выборок из начала `buf`.
pub fn read_raw16_samples(
    buf: &[u8],
    count: usize,
) -> SrkResult<Vec<RawSample>> {
    let needed = raw16_len(count);
    if buf.len() < needed {
        return Err(SrkError::TruncatedStream {
            offset: 0,
            needed,
            available: buf.len(),
        });
    }

    Ok(buf[..needed]
        .chunks_exact(RAW16_SAMPLE_SIZE)
        .map(|c| {
            RawSample::new(
                LittleEndian::read_i16(&c[0..2]),
                LittleEndian::read_i16(&c[2..4]),
                LittleEndian::read_i16(&c[4..6]),
            )
        })
        .collect())
}

/// `raw / full_scale_counts * scale`.
#[inline]
pub fn to_physical(
    raw: i16,
    full_scale_counts: f32,
    scale: f32,
) -> f32 {
    raw as f32 / full_scale_counts * scale
}

/// 12-битная выборка акселерометра → g.
pub fn accel_to_physical(
    s: &RawSample,
    scale: f32,
) -> Vector3 {
    Vector3::new(
        to_physical(s.x, ACCEL_FULL_SCALE_COUNTS, scale),
        to_physical(s.y, ACCEL_FULL_SCALE_COUNTS, scale),
        to_physical(s.z, ACCEL_FULL_SCALE_COUNTS, scale),
    )
}

/// 16-битная выборка гироскопа → °/с.
pub fn gyro_to_physical(
    s: &RawSample,
    scale: f32,
) -> Vector3 {
    Vector3::new(
        to_physical(s.x, GYRO_FULL_SCALE_COUNTS, scale),
        to_physical(s.y, GYRO_FULL_SCALE_COUNTS, scale),
        to_physical(s.z, GYRO_FULL_SCALE_COUNTS, scale),
    )
}
