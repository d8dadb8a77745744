use byteorder::{ByteOrder, LittleEndian};

pub fn write_u8_at(
    buf: &mut [u8],
    off: &mut usize,
    val: u8,
) {
    buf[*off] = val;
    *off += 1;
}

pub fn write_u16_at(
    buf: &mut [u8],
    off: &mut usize,
    val: u16,
) {
    LittleEndian::write_u16(&mut buf[*off..*off + 2], val);
    *off += 2;
}

pub fn write_i32_at(
    buf: &mut [u8],
    off: &mut usize,
    val: i32,
) {
    LittleEndian::write_i32(&mut buf[*off..*off + 4], val);
    *off += 4;
}

pub fn write_f32_at(
    buf: &mut [u8],
    off: &mut usize,
    val: f32,
) {
    LittleEndian::write_f32(&mut buf[*off..*off + 4], val);
    *off += 4;
}
