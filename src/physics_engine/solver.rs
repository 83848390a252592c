//! Bracketed 1-D root finding

use super::EstimationError;
use crate::config::SolverConfig;

/// A converged root and the steps it took.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub iterations: usize,
}

/// Bisection with an iteration cap and an absolute bracket tolerance.
#[derive(Debug, Clone, Copy)]
pub struct Bisection {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl From<&SolverConfig> for Bisection {
    fn from(cfg: &SolverConfig) -> Self {
        Self {
            max_iterations: cfg.max_iterations,
            tolerance: cfg.tolerance,
        }
    }
}

impl Bisection {
    /// Find `x` in `[lo, hi]` with `f(x) = 0`.
    ///
    /// `f(lo)` and `f(hi)` must be finite with opposite signs (or one of them
    /// zero). Fails with `Numerical` when the root is not bracketed, `f`
    /// turns non-finite, or the bracket is still wider than the tolerance
    /// after `max_iterations` halvings.
    pub fn solve<F>(&self, mut f: F, lo: f64, hi: f64) -> Result<Root, EstimationError>
    where
        F: FnMut(f64) -> f64,
    {
        let (mut lo, mut hi) = (lo, hi);
        let mut f_lo = f(lo);
        let f_hi = f(hi);

        if !f_lo.is_finite() || !f_hi.is_finite() {
            return Err(EstimationError::Numerical(format!(
                "non-finite residual at bracket ends [{lo}, {hi}]"
            )));
        }
        if f_lo == 0.0 {
            return Ok(Root { x: lo, iterations: 0 });
        }
        if f_hi == 0.0 {
            return Ok(Root { x: hi, iterations: 0 });
        }
        if f_lo.signum() == f_hi.signum() {
            return Err(EstimationError::Numerical(format!(
                "root not bracketed on [{lo:.6}, {hi:.6}] (residuals {f_lo:.4e}, {f_hi:.4e})"
            )));
        }

        for iteration in 1..=self.max_iterations {
            let mid = 0.5 * (lo + hi);
            let f_mid = f(mid);
            if !f_mid.is_finite() {
                return Err(EstimationError::Numerical(format!("non-finite residual at {mid}")));
            }
            if f_mid == 0.0 {
                return Ok(Root { x: mid, iterations: iteration });
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
            if hi - lo <= self.tolerance {
                return Ok(Root {
                    x: 0.5 * (lo + hi),
                    iterations: iteration,
                });
            }
        }

        Err(EstimationError::Numerical(format!(
            "bisection did not converge within {} iterations (bracket [{lo:.6e}, {hi:.6e}])",
            self.max_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> Bisection {
        Bisection {
            max_iterations: 200,
            tolerance: 1e-12,
        }
    }

    #[test]
    fn test_finds_sqrt_two() {
        let root = solver().solve(|x| x * x - 2.0, 0.0, 2.0).expect("bracketed");
        assert!((root.x - std::f64::consts::SQRT_2).abs() < 1e-10);
        assert!(root.iterations > 0);
    }

    #[test]
    fn test_decreasing_function() {
        let root = solver().solve(|x| 1.0 - x, 0.0, 3.0).expect("bracketed");
        assert!((root.x - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_root_at_bracket_end() {
        let root = solver().solve(|x| x, 0.0, 1.0).expect("root at lo");
        assert_eq!(root, Root { x: 0.0, iterations: 0 });
    }

    #[test]
    fn test_unbracketed_root_fails() {
        let err = solver().solve(|x| x * x + 1.0, -1.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("not bracketed"));
    }

    #[test]
    fn test_iteration_cap() {
        let capped = Bisection {
            max_iterations: 3,
            tolerance: 1e-12,
        };
        assert!(matches!(
            capped.solve(|x| x - 0.3, 0.0, 1.0),
            Err(EstimationError::Numerical(_))
        ));
    }
}
