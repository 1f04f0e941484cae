//! Lookup table approximations of sigmoid and tanh.  Both are nearest-bucket (truncating)
//! lookups over a bounded domain; arguments outside the bound saturate to the asymptotes.

const SIGMOID_TABLE_SIZE: usize = 1000;
const SIGMOID_BOUND: f32 = 6.;
const TANH_TABLE_SIZE: usize = 1000;
const TANH_BOUND: f32 = 4.;

#[derive(Debug, Clone)]
struct BoundedTable {
    table: Vec<f32>,
    bound: f32,
    scale: f32,
    low: f32,
    high: f32
}

impl BoundedTable {
    fn new(size: usize, bound: f32, low: f32, high: f32, f: impl Fn(f64) -> f64) -> Self {
        // One extra bucket so that x == bound lands inside the table
        let table = (0..=size).map(|i| {
            let x = (i as f64 / size as f64 * 2. - 1.) * bound as f64;
            f(x) as f32
        }).collect();

        BoundedTable { table, bound, scale: size as f32 / bound / 2., low, high }
    }

    #[inline]
    fn get(&self, x: f32) -> f32 {
        if x > self.bound {
            self.high
        } else if x < -self.bound {
            self.low
        } else {
            let idx = ((x + self.bound) * self.scale) as usize;
            self.table[idx.min(self.table.len() - 1)]
        }
    }
}

#[derive(Debug, Clone)]
pub struct FastMath {
    sigmoid: BoundedTable,
    tanh: BoundedTable
}

impl FastMath {
    pub fn new() -> Self {
        FastMath {
            sigmoid: BoundedTable::new(SIGMOID_TABLE_SIZE, SIGMOID_BOUND, 0., 1., |x| {
                let e = x.exp();
                e / (e + 1.)
            }),
            tanh: BoundedTable::new(TANH_TABLE_SIZE, TANH_BOUND, -1., 1., f64::tanh)
        }
    }

    #[inline]
    pub fn sigmoid(&self, x: f32) -> f32 {
        self.sigmoid.get(x)
    }

    #[inline]
    pub fn tanh(&self, x: f32) -> f32 {
        self.tanh.get(x)
    }
}

impl Default for FastMath {
    fn default() -> Self {
        FastMath::new()
    }
}

#[cfg(test)]
mod fast_math_tests {
    use super::*;

    #[test]
    fn test_saturation() {
        let fm = FastMath::new();
        assert_eq!(fm.sigmoid(6.5), 1.);
        assert_eq!(fm.sigmoid(-100.), 0.);
        assert_eq!(fm.tanh(4.01), 1.);
        assert_eq!(fm.tanh(-7.), -1.);
    }

    #[test]
    fn test_bounds_in_table() {
        let fm = FastMath::new();
        assert!((fm.sigmoid(6.) - 6f32.exp() / (6f32.exp() + 1.)).abs() < 1e-4);
        assert!((fm.tanh(4.) - 4f32.tanh()).abs() < 1e-6);
        assert!((fm.tanh(-4.) + 4f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_approximation() {
        let fm = FastMath::new();
        let mut x = -5.9f32;
        while x < 5.9 {
            let exact = 1. / (1. + (-x).exp());
            assert!((fm.sigmoid(x) - exact).abs() < 0.01, "sigmoid({})", x);
            if x.abs() < 4. {
                assert!((fm.tanh(x) - x.tanh()).abs() < 0.01, "tanh({})", x);
            }
            x += 0.013;
        }
    }

    #[test]
    fn test_tanh_sign() {
        let fm = FastMath::new();
        assert_eq!(fm.tanh(0.), 0.);
        assert!(fm.tanh(-1e-4) < 0.);
        assert!(fm.tanh(1e-4) >= 0.);
    }

}
