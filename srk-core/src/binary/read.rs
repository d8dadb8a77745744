use std::io::{ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian};

pub fn read_u8_at(
    buf: &[u8],
    off: &mut usize,
) -> u8 {
    let v = buf[*off];
    *off += 1;
    v
}

pub fn read_u16_at(
    buf: &[u8],
    off: &mut usize,
) -> u16 {
    let v = LittleEndian::read_u16(&buf[*off..*off + 2]);
    *off += 2;
    v
}

pub fn read_i32_at(
    buf: &[u8],
    off: &mut usize,
) -> i32 {
    let v = LittleEndian::read_i32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_f32_at(
    buf: &[u8],
    off: &mut usize,
) -> f32 {
    let v = LittleEndian::read_f32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

/// Читает до заполнения `buf` или до EOF.
///
/// В отличие от `read_exact` возвращает сколько байт удалось прочитать,
/// чтобы вызывающий мог отличить чистый EOF от обрыва посреди структуры.
pub fn read_up_to<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}
