use rand::Rng;

pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Uniform integer in `[lo, hi]`.
    fn int_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i32;
        lo + offset.min(hi - lo)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Symmetric draw in `[-1, 1)`, i.e. `2u - 1`.
    fn signed_unit(&mut self) -> f64 {
        2.0 * self.next_f64() - 1.0
    }
}

impl<R: Rng> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::RandomSource;

    pub struct Scripted {
        draws: Vec<f64>,
        pos: usize,
    }

    impl Scripted {
        pub fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec(),
                pos: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn next_f64(&mut self) -> f64 {
            let v = self.draws[self.pos % self.draws.len()];
            self.pos += 1;
            v
        }
    }
}
