//! Oversized-call-data chunking (spec §4.6 step 3).

use alloy_primitives::Bytes;

/// Splits `call_data` into a first chunk (sized `chunk_size`) plus however
/// many additional chunks are needed to cover the remainder, bounded by
/// `max_chunks`. Returns `None` if the remainder would need more than
/// `max_chunks` additional chunks — callers treat that as a configuration
/// error rather than silently truncating the payload.
pub fn split_into_chunks(call_data: &[u8], chunk_size: usize, max_chunks: usize) -> Option<Chunked> {
    if call_data.len() <= chunk_size {
        return Some(Chunked { first: Bytes::copy_from_slice(call_data), rest: Vec::new() });
    }

    let (first, remainder) = call_data.split_at(chunk_size);
    let rest: Vec<Bytes> = remainder.chunks(chunk_size).map(Bytes::copy_from_slice).collect();

    if rest.len() > max_chunks {
        return None;
    }

    Some(Chunked { first: Bytes::copy_from_slice(first), rest })
}

pub struct Chunked {
    pub first: Bytes,
    pub rest: Vec<Bytes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_in_one_chunk_when_under_the_size_limit() {
        let data = vec![1u8; 120];
        let chunked = split_into_chunks(&data, 4096, 20).unwrap();
        assert_eq!(chunked.first.len(), 120);
        assert!(chunked.rest.is_empty());
    }

    #[test]
    fn splits_oversized_payload_into_bounded_chunks() {
        let data = vec![7u8; 10_000];
        let chunked = split_into_chunks(&data, 4096, 20).unwrap();
        assert_eq!(chunked.first.len(), 4096);
        // 10000 - 4096 = 5904, split into ceil(5904/4096) = 2 chunks.
        assert_eq!(chunked.rest.len(), 2);
        let total: usize = chunked.rest.iter().map(|c| c.len()).sum();
        assert_eq!(total, 10_000 - 4096);
    }

    #[test]
    fn refuses_to_silently_truncate_past_max_chunks() {
        let data = vec![1u8; 100_000];
        let result = split_into_chunks(&data, 4096, 2);
        assert!(result.is_none());
    }
}
