//! Panorama geometry optimisation.
//!
//! - [`Optimizer`]: adjusts the free image variables of a [`Panorama`] and
//!   writes per control point errors.
//! - [`SharedOptimizer`]: serialises optimizer calls across threads.
//! - [`PitchRollOptimizer`]: Levenberg-Marquardt over yaw, pitch and roll.
mod pitch_roll;
mod residuals;

pub use pitch_roll::PitchRollOptimizer;
pub use residuals::{control_point_error, control_point_errors};

use crate::panorama::Panorama;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

/// Errors reported by an [`Optimizer`].
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("panorama has no control points")]
    NoControlPoints,
    #[error("control point {cp} references image {image}, panorama has {count}")]
    InvalidImageIndex { cp: usize, image: usize, count: usize },
    #[error("{residuals} residuals cannot determine {variables} variables")]
    Underdetermined { residuals: usize, variables: usize },
    #[error("control point {0} has no valid ray")]
    InvalidGeometry(usize),
    #[error("solver failed: {0}")]
    SolverFailed(String),
}

/// Outcome of one optimisation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OptimizeReport {
    pub evaluations: usize,
    /// Half the sum of squared residuals before and after.
    pub initial_cost: f64,
    pub final_cost: f64,
    pub converged: bool,
}

pub trait Optimizer {
    /// Optimise `pano` in place: image orientation for the variables in its
    /// optimize vector, and the `error` of every control point.
    fn optimize(&mut self, pano: &mut Panorama) -> Result<OptimizeReport, OptimizeError>;
}

/// Optimizer behind a lock; one optimisation at a time.
pub struct SharedOptimizer {
    inner: Mutex<Box<dyn Optimizer + Send>>,
}

impl SharedOptimizer {
    pub fn new(optimizer: impl Optimizer + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(optimizer)),
        }
    }

    /// Run the wrapped optimizer on `pano`, holding the lock for the call.
    pub fn run(&self, pano: &mut Panorama) -> Result<OptimizeReport, OptimizeError> {
        let mut guard = self.inner.lock();
        guard.optimize(pano)
    }
}

impl Default for SharedOptimizer {
    fn default() -> Self {
        Self::new(PitchRollOptimizer::default())
    }
}

impl std::fmt::Debug for SharedOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOptimizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
    }

    impl Optimizer for Counting {
        fn optimize(&mut self, _pano: &mut Panorama) -> Result<OptimizeReport, OptimizeError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(2));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(OptimizeReport::default())
        }
    }

    #[test]
    fn shared_optimizer_serialises_calls() {
        let max_active = Arc::new(AtomicUsize::new(0));
        let shared = Arc::new(SharedOptimizer::new(Counting {
            active: Arc::new(AtomicUsize::new(0)),
            max_active: max_active.clone(),
        }));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    let mut pano = Panorama::new();
                    shared.run(&mut pano).is_ok()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }
}
