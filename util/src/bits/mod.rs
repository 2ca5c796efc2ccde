//! Bit and 3-byte integer access at a byte offset of a view.
//!
//! Bit positions count from the least significant bit (0) to the most significant (7).
//! Masks select a contiguous group of bits inside one byte.

#[cfg(test)]
mod bits_test;

pub fn read_bit(view: &[u8], pos: usize, bit: u8) -> bool {
    (view[pos] >> bit) & 0x01 == 0x01
}

pub fn write_bit(view: &mut [u8], pos: usize, bit: u8, value: bool) {
    if value {
        view[pos] |= 1 << bit;
    } else {
        view[pos] &= !(1 << bit);
    }
}

pub fn read_bits(view: &[u8], pos: usize, mask: u8) -> u8 {
    if mask == 0 {
        return 0;
    }
    (view[pos] & mask) >> mask.trailing_zeros()
}

pub fn write_bits(view: &mut [u8], pos: usize, mask: u8, value: u8) {
    if mask == 0 {
        return;
    }
    let shifted = value << mask.trailing_zeros();
    view[pos] = (view[pos] & !mask) | (shifted & mask);
}

pub fn read_u24(view: &[u8], pos: usize) -> u32 {
    (view[pos] as u32) << 16 | (view[pos + 1] as u32) << 8 | view[pos + 2] as u32
}

/// Writes the low 24 bits of `value`.
pub fn write_u24(view: &mut [u8], pos: usize, value: u32) {
    view[pos] = (value >> 16) as u8;
    view[pos + 1] = (value >> 8) as u8;
    view[pos + 2] = value as u8;
}

pub fn read_i24(view: &[u8], pos: usize) -> i32 {
    let v = read_u24(view, pos);
    if v & 0x80_0000 != 0 {
        (v | 0xFF00_0000) as i32
    } else {
        v as i32
    }
}

/// Writes `value` as 24-bit two's complement. Out of range values wrap.
pub fn write_i24(view: &mut [u8], pos: usize, value: i32) {
    write_u24(view, pos, value as u32 & 0x00FF_FFFF);
}
