/// Park-Miller style generator over `f64`, reproducible for a given seed.
pub struct Random {
    seed: f64,
}

impl Random {
    pub fn new(seed: f64) -> Random {
        assert!(seed > 0.0, "random seed must be positive");
        Random { seed }
    }

    // Returns a random float 0 <= x < 1.
    pub fn drand(&mut self) -> f64 {
        const MODULUS: f64 = 2147483647.0;
        self.seed *= 1389796.0;
        let q = (self.seed / MODULUS) as i32;
        self.seed -= (q as f64) * MODULUS;
        self.seed / MODULUS
    }

    // Returns a random integer 0 <= x < size.
    pub fn irand(&mut self, size: usize) -> usize {
        (self.drand() * (size as f64)) as usize
    }

    pub fn chance(&mut self, p: f64) -> bool {
        p > 0.0 && self.drand() < p
    }
}
