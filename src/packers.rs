//! Little-endian scalar extraction from raw payload bytes.
//!
//! Callers are responsible for the bounds: the payload decoders only hand
//! out slices that they sized from the resolved row layout.

use byteorder::{ByteOrder, LittleEndian};

pub trait Packable {
    type Type;

    /// Size in bytes of the packed representation
    const SIZE: usize;

    fn unpack_from(input: &[u8]) -> Self::Type;
}

impl Packable for f32 {
    type Type = f32;
    const SIZE: usize = 4;

    fn unpack_from(input: &[u8]) -> Self::Type {
        if input.len() < 4 {
            panic!("f32::unpack_from expected a buffer of 4 bytes");
        }
        LittleEndian::read_f32(input)
    }
}

impl Packable for u32 {
    type Type = u32;
    const SIZE: usize = 4;

    fn unpack_from(input: &[u8]) -> Self::Type {
        if input.len() < 4 {
            panic!("u32::unpack_from expected a buffer of 4 bytes");
        }
        LittleEndian::read_u32(input)
    }
}

impl Packable for u8 {
    type Type = u8;
    const SIZE: usize = 1;

    fn unpack_from(input: &[u8]) -> Self::Type {
        input[0]
    }
}

/// Reads the `index`-th value of type `T` in a tightly packed slice.
#[inline]
pub fn unpack_nth<T: Packable>(input: &[u8], index: usize) -> T::Type {
    let start = index * T::SIZE;
    T::unpack_from(&input[start..start + T::SIZE])
}
