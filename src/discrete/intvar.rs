//! Integer valued random variables.

use rand::Rng;

use super::with_rng;

/// A discrete random variable over signed 64 bit integers.
pub trait IntVar: Send + Sync {
    /// Will draw one value from the variable.
    fn sample(&self) -> i64;
}

/// Any matching closure is a variable as well, which keeps test and
/// caller code short.
impl<F> IntVar for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn sample(&self) -> i64 {
        self()
    }
}

/// A variable that always produces the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const(pub i64);

impl IntVar for Const {
    fn sample(&self) -> i64 {
        self.0
    }
}

/// A uniform variable over the half open range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    /// Will create a uniform variable over `[min, max)`.
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl IntVar for Range {
    /// Draws uniformly from the range. An empty or inverted range
    /// produces `0`.
    fn sample(&self) -> i64 {
        let span = self.max - self.min;
        if span < 1 {
            return 0;
        }
        self.min + with_rng(|rng| rng.gen_range(0..span))
    }
}

/// A data point mapping an inner variable to a weight.
pub struct IntVarPoint {
    /// The variable delegated to when the point is hit.
    pub x: Box<dyn IntVar>,
    /// The relative weight, and after normalization the upper CDF bound
    /// of the point.
    pub y: f64,
}

impl IntVarPoint {
    /// Will create a weighted point over the given variable.
    pub fn new(x: impl IntVar + 'static, y: f64) -> Self {
        Self { x: Box::new(x), y }
    }
}

/// A variable defined by a piecewise CDF over inner variables.
pub struct Piecewise {
    cdf: Vec<IntVarPoint>,
}

impl Piecewise {
    /// Will build the variable from a probability mass function.
    ///
    /// Zero weighted points are dropped, the remaining weights are
    /// cumulated and normalized into a CDF.
    pub fn from_pmf(pmf: Vec<IntVarPoint>) -> Self {
        let mut cdf = Vec::with_capacity(pmf.len());
        let mut total = 0.0;
        for point in pmf {
            if point.y == 0.0 {
                continue;
            }
            total += point.y;
            cdf.push(IntVarPoint { x: point.x, y: total });
        }
        for point in cdf.iter_mut() {
            point.y /= total;
        }
        Self { cdf }
    }
}

impl IntVar for Piecewise {
    /// Draws a uniform number in `[0, 1)`, locates the first CDF entry
    /// at or above it and delegates to that entry's variable. An empty
    /// CDF produces `0`.
    fn sample(&self) -> i64 {
        if self.cdf.is_empty() {
            return 0;
        }
        let u = with_rng(|rng| rng.gen::<f64>());
        let i = self.cdf.partition_point(|point| point.y < u);
        self.cdf[i.min(self.cdf.len() - 1)].x.sample()
    }
}

/// Will draw `k` independent samples from the variable.
pub fn sample_k(k: usize, var: &dyn IntVar) -> Vec<i64> {
    (0..k).map(|_| var.sample()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(samples: &[i64]) -> f64 {
        samples.iter().sum::<i64>() as f64 / samples.len() as f64
    }

    #[test]
    fn test_const() {
        assert_eq!(42, Const(42).sample());
        assert_eq!(-7, Const(-7).sample());
    }

    #[test]
    fn test_closure_var() {
        let var = || 13i64;
        assert_eq!(13, var.sample());
    }

    #[test]
    fn test_range_mean() {
        let samples = sample_k(1000, &Range::new(0, 100));
        assert!(samples.iter().all(|&s| (0..100).contains(&s)));
        let m = mean(&samples);
        assert!((45.0..=55.0).contains(&m), "mean {} out of tolerance", m);
    }

    #[test]
    fn test_range_empty() {
        assert_eq!(0, Range::new(5, 5).sample());
        assert_eq!(0, Range::new(5, 4).sample());
    }

    #[test]
    fn test_piecewise_mean() {
        let var = Piecewise::from_pmf(vec![
            IntVarPoint::new(Const(42), 3.0),
            IntVarPoint::new(Const(101), 2.0),
        ]);
        // expected mean is 42 * 0.6 + 101 * 0.4 = 65.6
        let m = mean(&sample_k(1000, &var));
        assert!((59.0..=72.0).contains(&m), "mean {} out of tolerance", m);
    }

    #[test]
    fn test_piecewise_drops_zero_weights() {
        let var = Piecewise::from_pmf(vec![
            IntVarPoint::new(Const(42), 0.0),
            IntVarPoint::new(Const(7), 1.0),
        ]);
        assert!(sample_k(100, &var).iter().all(|&s| s == 7));
    }

    #[test]
    fn test_piecewise_empty() {
        assert_eq!(0, Piecewise::from_pmf(vec![]).sample());
    }

    #[test]
    fn test_sample_k_len() {
        assert_eq!(25, sample_k(25, &Const(1)).len());
    }
}
