const SEED_MIX: u32 = 0x9E37_79B9;
const ZERO_SEED_FALLBACK: u32 = 0x2545_F491;

/// Xorshift32 generator for vine geometry. Built fresh for every render from
/// the plant's creation time, so a plant always grows the same vines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct VineRng {
    state: u32,
}

impl VineRng {
    pub(crate) fn new(seed: u32) -> Self {
        // xorshift has a fixed point at 0
        let state = if seed == 0 { ZERO_SEED_FALLBACK } else { seed };
        Self { state }
    }

    pub(crate) fn from_created_secs(secs: i64) -> Self {
        Self::new((secs as u32) ^ SEED_MIX)
    }

    pub(crate) fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    pub(crate) fn next_f32(&mut self) -> f32 {
        // [0,1)
        let v = self.next_u32() >> 8; // 24 bits
        (v as f32) / ((1u32 << 24) as f32)
    }

    pub(crate) fn roll(&mut self, p: f32) -> bool {
        self.next_f32() < p.clamp(0.0, 1.0)
    }

    /// Uniform in `0..n`; `n == 0` yields 0.
    pub(crate) fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
}
