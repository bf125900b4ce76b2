//! src/keystream/isaac64.rs
//! ISAAC64 (Bob Jenkins), 256-word state, standard `randinit(flag = true)`.
//!
//! Nothing target-specific lives here; see `stream.rs` for the output order.

use crate::consts::ISAAC64_WORDS;

const GOLDEN_RATIO: u64 = 0x9e37_79b9_7f4a_7c13;

/// ISAAC64 generator state.
#[derive(Clone)]
pub struct Isaac64 {
    rsl: [u64; ISAAC64_WORDS],
    mem: [u64; ISAAC64_WORDS],
    a: u64,
    b: u64,
    c: u64,
}

impl std::fmt::Debug for Isaac64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Isaac64 { .. }")
    }
}

#[rustfmt::skip]
#[inline(always)]
fn mix(s: &mut [u64; 8]) {
    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *s;
    a = a.wrapping_sub(e); f ^= h >> 9;  h = h.wrapping_add(a);
    b = b.wrapping_sub(f); g ^= a << 9;  a = a.wrapping_add(b);
    c = c.wrapping_sub(g); h ^= b >> 23; b = b.wrapping_add(c);
    d = d.wrapping_sub(h); a ^= c << 15; c = c.wrapping_add(d);
    e = e.wrapping_sub(a); b ^= d >> 14; d = d.wrapping_add(e);
    f = f.wrapping_sub(b); c ^= e << 20; e = e.wrapping_add(f);
    g = g.wrapping_sub(c); d ^= f >> 17; f = f.wrapping_add(g);
    h = h.wrapping_sub(d); e ^= g << 14; g = g.wrapping_add(h);
    *s = [a, b, c, d, e, f, g, h];
}

impl Isaac64 {
    /// Seed with `randrsl[0] = seed`, all other seed words zero.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rsl = [0u64; ISAAC64_WORDS];
        rsl[0] = seed;
        Self::from_seed_words(rsl)
    }

    /// Seed with a full 256-word `randrsl`.
    #[must_use]
    pub fn from_seed_words(rsl: [u64; ISAAC64_WORDS]) -> Self {
        let mut rng = Self {
            rsl,
            mem: [0; ISAAC64_WORDS],
            a: 0,
            b: 0,
            c: 0,
        };
        rng.init();
        rng
    }

    fn init(&mut self) {
        let mut s = [GOLDEN_RATIO; 8];
        for _ in 0..4 {
            mix(&mut s);
        }

        // pass 0 folds in the seed, pass 1 re-mixes the memory it produced
        for pass in 0..2 {
            for i in (0..ISAAC64_WORDS).step_by(8) {
                for (j, word) in s.iter_mut().enumerate() {
                    let src = if pass == 0 { self.rsl[i + j] } else { self.mem[i + j] };
                    *word = word.wrapping_add(src);
                }
                mix(&mut s);
                self.mem[i..i + 8].copy_from_slice(&s);
            }
        }

        self.generate();
    }

    /// Run one ISAAC64 round, refilling [`Self::results`].
    pub fn generate(&mut self) {
        const HALF: usize = ISAAC64_WORDS / 2;
        const MASK: u64 = (ISAAC64_WORDS as u64) - 1;

        self.c = self.c.wrapping_add(1);
        let mut a = self.a;
        let mut b = self.b.wrapping_add(self.c);

        for i in 0..ISAAC64_WORDS {
            let x = self.mem[i];
            a = match i % 4 {
                0 => !(a ^ (a << 21)),
                1 => a ^ (a >> 5),
                2 => a ^ (a << 12),
                _ => a ^ (a >> 33),
            };
            a = a.wrapping_add(self.mem[(i + HALF) % ISAAC64_WORDS]);

            let y = self.mem[((x >> 3) & MASK) as usize]
                .wrapping_add(a)
                .wrapping_add(b);
            self.mem[i] = y;

            b = self.mem[((y >> 11) & MASK) as usize].wrapping_add(x);
            self.rsl[i] = b;
        }

        self.a = a;
        self.b = b;
    }

    /// The current 256-word result block, in generation order.
    #[must_use]
    pub fn results(&self) -> &[u64; ISAAC64_WORDS] {
        &self.rsl
    }
}
