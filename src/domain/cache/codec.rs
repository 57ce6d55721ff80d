//! Binary codec for embedding vectors
//!
//! The vector index expects query and stored vectors as packed
//! little-endian FLOAT32, so encoding must be bit-exact in both
//! directions. Non-finite values (NaN, infinities) are passed through
//! unchanged; whether to accept them is the index's decision.

use crate::domain::DomainError;

/// Encode a vector as packed little-endian float32 bytes (`4 * len`).
pub fn encode(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);

    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    bytes
}

/// Decode packed little-endian float32 bytes back into a vector.
///
/// The exact inverse of [`encode`]. Fails only when the byte length is
/// not a multiple of 4.
pub fn decode(bytes: &[u8]) -> Result<Vec<f32>, DomainError> {
    if bytes.len() % 4 != 0 {
        return Err(DomainError::validation(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }

    let vector = bytes
        .chunks_exact(4)
        .map(|chunk| {
            // chunks_exact guarantees 4 bytes per chunk
            let mut buf = [0u8; 4];
            buf.copy_from_slice(chunk);
            f32::from_le_bytes(buf)
        })
        .collect();

    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_length() {
        let vector = vec![0.0f32; 1024];
        assert_eq!(encode(&vector).len(), 4096);
    }

    #[test]
    fn test_round_trip_exact() {
        let vector = vec![
            0.0f32,
            -0.0,
            1.0,
            -1.0,
            0.333_333_34,
            f32::MIN,
            f32::MAX,
            f32::MIN_POSITIVE,
            1.0e-40, // subnormal
        ];

        let decoded = decode(&encode(&vector)).unwrap();

        assert_eq!(decoded.len(), vector.len());
        for (original, restored) in vector.iter().zip(decoded.iter()) {
            assert_eq!(original.to_bits(), restored.to_bits());
        }
    }

    #[test]
    fn test_non_finite_pass_through() {
        let vector = vec![f32::NAN, f32::INFINITY, f32::NEG_INFINITY];

        let decoded = decode(&encode(&vector)).unwrap();

        // Bit patterns survive even though NaN != NaN
        for (original, restored) in vector.iter().zip(decoded.iter()) {
            assert_eq!(original.to_bits(), restored.to_bits());
        }
    }

    #[test]
    fn test_empty_vector() {
        assert!(encode(&[]).is_empty());
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        let mut bytes = encode(&[1.0, 2.0]);
        bytes.pop();

        let result = decode(&bytes);

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_little_endian_layout() {
        let bytes = encode(&[1.0f32]);
        assert_eq!(bytes, vec![0x00, 0x00, 0x80, 0x3f]);
    }
}
