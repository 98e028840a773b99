//! Payload masking (RFC 6455 Section 5.3).

/// Byte-by-byte XOR of `data` with the repeating 4-byte `mask`.
#[inline]
pub fn apply_mask(data: &mut [u8], mask: [u8; 4]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}

/// Same result as [`apply_mask`], eight bytes per step.
#[inline]
pub fn apply_mask_fast(data: &mut [u8], mask: [u8; 4]) {
    let wide = u64::from_ne_bytes([
        mask[0], mask[1], mask[2], mask[3], mask[0], mask[1], mask[2], mask[3],
    ]);

    let mut chunks = data.chunks_exact_mut(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let masked = u64::from_ne_bytes(word) ^ wide;
        chunk.copy_from_slice(&masked.to_ne_bytes());
    }

    // Chunks are a multiple of 4 long, so the tail restarts at mask[0].
    apply_mask(chunks.into_remainder(), mask);
}

/// Produce a fresh masking key.
///
/// Keys come from the OS random source. If that is unavailable the key is
/// derived from `fallback`, which the caller advances per frame.
pub(crate) fn random_mask(fallback: &mut u32) -> [u8; 4] {
    let mut key = [0u8; 4];
    if getrandom::getrandom(&mut key).is_ok() {
        return key;
    }

    *fallback = fallback.wrapping_add(0x9E37_79B9);
    let a = fallback.wrapping_mul(0x85EB_CA6B);
    let b = a ^ (a >> 13);
    b.wrapping_mul(0xC2B2_AE35).to_le_bytes()
}
