//! Deterministic pattern hash for busy-mode slot hiding.
//!
//! A 32-bit FNV-1a string hash. Busy-mode shaping must look random but stay
//! identical between page loads, so the hidden slots are ranked by this hash
//! seeded from (meeting type id, date, pattern version) rather than drawn
//! from a randomness source. Bumping the pattern version is the owner's way
//! of getting a different-looking pattern without touching availability.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Hash a seed string. Same input always yields the same output, across
/// processes and over time.
pub fn pattern_hash(seed: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in seed.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        // Published FNV-1a 32-bit test vectors.
        assert_eq!(pattern_hash(""), 0x811c_9dc5);
        assert_eq!(pattern_hash("a"), 0xe40c_292c);
        assert_eq!(pattern_hash("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn deterministic_and_seed_sensitive() {
        let a = pattern_hash("mt-1:2025-06-02:1:1748876700");
        let b = pattern_hash("mt-1:2025-06-02:1:1748876700");
        assert_eq!(a, b);

        // A bumped pattern version must produce a different score.
        let c = pattern_hash("mt-1:2025-06-02:2:1748876700");
        assert_ne!(a, c);
    }
}
