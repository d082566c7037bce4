//! RNG module - deterministic LCG used for room codes
//!
//! Multiplayer rooms are identified by short uppercase alphanumeric codes.
//! The generator is seedable so tests can pin the sequence.

/// Characters a room code is drawn from.
pub const ROOM_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Seed from the wall clock.
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
            .unwrap_or(1);
        Self::new(nanos)
    }

    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in `[0, max)`. Returns 0 when `max` is 0.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Low LCG bits cycle quickly; use the high half.
        (self.next_u32() >> 16) % max
    }

    /// A string of `len` characters drawn from [`ROOM_ALPHABET`].
    pub fn alphanumeric(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| {
                let i = self.next_range(ROOM_ALPHABET.len() as u32) as usize;
                ROOM_ALPHABET[i] as char
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_zero_seed_is_not_degenerate() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_alphanumeric_uses_room_alphabet() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..50 {
            let code = rng.alphanumeric(5);
            assert_eq!(code.len(), 5);
            assert!(code.bytes().all(|b| ROOM_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_next_range_zero() {
        let mut rng = SimpleRng::new(3);
        assert_eq!(rng.next_range(0), 0);
    }
}
