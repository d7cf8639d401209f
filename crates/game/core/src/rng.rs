//! Seed-keyed random stream for procedural generation.
//!
//! The stream is a pure function of its seed string: two streams built from the
//! same seed yield identical infinite sequences. It is a content-generation
//! PRNG with no cryptographic guarantees.
//!
//! Seeding hashes the string (as UTF-16 code units) into four 32-bit state
//! words with a small multiply-rotate mixer; values are then produced by a
//! 128-bit "small fast counting" generator (add, xor-shift, rotate, counter).

/// Mixing hash that turns a seed string into a sequence of 32-bit words.
#[derive(Clone, Copy, Debug)]
struct SeedHasher {
    state: u32,
}

impl SeedHasher {
    fn new(seed: &str) -> Self {
        let units: Vec<u16> = seed.encode_utf16().collect();
        let mut h = 1_779_033_703u32 ^ (units.len() as u32);
        for unit in units {
            h = (h ^ u32::from(unit)).wrapping_mul(3_432_918_353);
            h = h.rotate_left(13);
        }
        Self { state: h }
    }

    fn next_word(&mut self) -> u32 {
        let mut h = self.state;
        h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
        h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
        h ^= h >> 16;
        self.state = h;
        h
    }
}

/// Deterministic stream of floats in `[0, 1)` keyed by a seed string.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeededStream {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl SeededStream {
    /// Builds a stream from any string, including the empty string.
    pub fn new(seed: &str) -> Self {
        let mut hasher = SeedHasher::new(seed);
        Self {
            a: hasher.next_word(),
            b: hasher.next_word(),
            c: hasher.next_word(),
            d: hasher.next_word(),
        }
    }

    /// Advances the generator and returns the raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        let mut t = self.a.wrapping_add(self.b);
        self.a = self.b ^ (self.b >> 9);
        self.b = self.c.wrapping_add(self.c << 3);
        self.c = self.c.rotate_left(21);
        self.d = self.d.wrapping_add(1);
        t = t.wrapping_add(self.d);
        self.c = self.c.wrapping_add(t);
        t
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let index = (self.next_f64() * len as f64) as usize;
        index.min(len - 1)
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
