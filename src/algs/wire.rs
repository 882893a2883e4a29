//! Fixed, little-endian wire types for halo and collection messages.
//!
//! Grid rows travel as raw native `f64` bytes (every rank runs the same
//! binary); headers are explicit little-endian records.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use std::mem::size_of;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} bytes, got {actual}"))
    }
}

/// Copy a received byte payload into a row of `f64`s, checking its length.
pub fn decode_row(bytes: &[u8], row: &mut [f64]) -> Result<(), String> {
    expect_exact_len(bytes.len(), size_of::<f64>() * row.len())?;
    // Received `Vec<u8>` need not be 8-aligned, so copy byte-wise.
    cast_slice_mut(row).copy_from_slice(bytes);
    Ok(())
}

/// Bump when the layout or semantics change in incompatible ways.
pub const WIRE_VERSION: u16 = 1;

/// Header announcing one worker's slab to the collecting root.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireSlabHeader {
    pub version_le: u16,
    pub _pad: [u8; 6],
    pub offset_le: u64, // first global row
    pub rows_le: u64,   // number of rows that follow
}

impl WireSlabHeader {
    pub const SIZE: usize = 24;

    pub fn new(offset: usize, rows: usize) -> Self {
        Self {
            version_le: WIRE_VERSION.to_le(),
            _pad: [0; 6],
            offset_le: (offset as u64).to_le(),
            rows_le: (rows as u64).to_le(),
        }
    }

    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }

    pub fn offset(&self) -> usize {
        u64::from_le(self.offset_le) as usize
    }

    pub fn rows(&self) -> usize {
        u64::from_le(self.rows_le) as usize
    }

    /// Decode from a received payload, rejecting short or foreign headers.
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        expect_exact_len(bytes.len(), Self::SIZE)?;
        let mut hdr = Self::zeroed();
        cast_slice_mut(std::slice::from_mut(&mut hdr)).copy_from_slice(bytes);
        if hdr.version() != WIRE_VERSION {
            return Err(format!(
                "wire version {} (expected {WIRE_VERSION})",
                hdr.version()
            ));
        }
        Ok(hdr)
    }
}

const_assert_eq!(size_of::<WireSlabHeader>(), WireSlabHeader::SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_survives_the_wire() {
        let hdr = WireSlabHeader::new(500, 250);
        let bytes = cast_slice(std::slice::from_ref(&hdr)).to_vec();
        let back = WireSlabHeader::decode(&bytes).unwrap();
        assert_eq!(back.offset(), 500);
        assert_eq!(back.rows(), 250);
        assert_eq!(back.version(), WIRE_VERSION);
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(WireSlabHeader::decode(&[0u8; 8]).is_err());
    }

    #[test]
    fn decode_row_checks_length() {
        let src = [1.5f64, -2.0, 3.25];
        let bytes = cast_slice(&src).to_vec();
        let mut row = [0.0f64; 3];
        decode_row(&bytes, &mut row).unwrap();
        assert_eq!(row, src);
        let mut short = [0.0f64; 2];
        assert!(decode_row(&bytes, &mut short).is_err());
    }
}
