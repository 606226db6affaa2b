//! Multigrid relaxation of the constraint field.
//!
//! The constraint grid is restricted down to 1x1. The coarsest level is
//! seeded from its own constraints, then each finer level starts from the
//! bilinear prolongation of the coarser solution and runs a fixed number
//! of constrained Jacobi sweeps.

use log::debug;

use super::field::Field;

/// Solve for a smooth field that matches `constraints` at fixed cells.
pub fn solve(constraints: &Field, iterations: usize) -> Field {
    let mut pyramid = vec![constraints.clone()];
    while let Some(level) = pyramid.last() {
        if level.width() == 1 && level.height() == 1 {
            break;
        }
        let coarser = level.restrict();
        pyramid.push(coarser);
    }
    debug!(
        "multigrid: {} levels from {}x{}",
        pyramid.len(),
        constraints.width(),
        constraints.height()
    );

    let mut levels = pyramid.iter().rev();
    let Some(coarsest) = levels.next() else {
        return constraints.clone();
    };
    let mut solution = coarsest.clone();
    solution.fill_unconstrained_with_mean();

    for level in levels {
        let guess = solution.resample(level.width(), level.height());
        solution = relax(guess, level, iterations);
    }
    solution
}

/// `iterations` Jacobi sweeps over `field`, holding the cells fixed by
/// `constraints`. Sweeps alternate between two buffers.
pub fn relax(mut field: Field, constraints: &Field, iterations: usize) -> Field {
    field.impose(constraints);
    let mut scratch = field.clone();
    for _ in 0..iterations {
        field.jacobi_into(&mut scratch);
        std::mem::swap(&mut field, &mut scratch);
    }
    field
}
