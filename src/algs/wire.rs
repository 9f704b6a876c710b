//! Byte views of halo strips for the transport layer.
//!
//! Strips travel as raw native-endian element bytes; both partners run the
//! same binary on the same machine class, so no byte swapping is done.

use bytemuck::Pod;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f64_strip_is_eight_bytes_per_cell() {
        let strip = [1.0f64, -2.5, 3.25];
        assert_eq!(cast_slice(&strip).len(), 24);
    }

    #[test]
    fn byte_view_writes_through() {
        let mut strip = [0.0f32; 2];
        cast_slice_mut(&mut strip).copy_from_slice(cast_slice(&[1.5f32, 2.0]));
        assert_eq!(strip, [1.5, 2.0]);
    }

    #[test]
    fn exact_len_reports_both_sizes() {
        assert!(expect_exact_len(8, 8).is_ok());
        assert_eq!(
            expect_exact_len(4, 8).unwrap_err(),
            "expected 8 bytes, got 4"
        );
    }
}
