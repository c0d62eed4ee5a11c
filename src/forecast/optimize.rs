//! Bounded minimisation for smoothing parameters
//!
//! Objectives here are cheap (one pass over at most a few dozen points), so
//! a coarse grid followed by golden-section refinement is both robust to
//! local minima and deterministic.

/// Inverse golden ratio
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Minimise `f` on `[lo, hi]` by golden-section search.
///
/// Returns the argument and objective value. Assumes `f` is unimodal on the
/// interval; callers bracket with [`grid_minimize`] first.
pub fn golden_section_minimize<F>(f: F, lo: f64, hi: f64, tol: f64, max_iter: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (lo.min(hi), lo.max(hi));
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);

    for _ in 0..max_iter {
        if (b - a).abs() <= tol {
            break;
        }
        if fc <= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
    }

    let x = (a + b) / 2.0;
    let fx = f(x);
    // An interior point can beat the midpoint on flat objectives
    [(x, fx), (c, fc), (d, fd)]
        .into_iter()
        .fold((x, fx), |best, cand| if cand.1 < best.1 { cand } else { best })
}

/// Evaluate `f` on `steps + 1` evenly spaced points of `[lo, hi]`.
///
/// The first strict minimum wins, so ties resolve to the smallest argument.
pub fn grid_minimize<F>(f: F, lo: f64, hi: f64, steps: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let steps = steps.max(1);
    let width = (hi - lo) / steps as f64;
    let mut best = (lo, f(lo));
    for i in 1..=steps {
        let x = lo + width * i as f64;
        let fx = f(x);
        if fx < best.1 {
            best = (x, fx);
        }
    }
    best
}

/// Grid search followed by golden-section refinement around the best cell
pub fn minimize_unit_interval<F>(f: F, steps: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let (x0, f0) = grid_minimize(&f, 0.0, 1.0, steps);
    let width = 1.0 / steps.max(1) as f64;
    let lo = (x0 - width).max(0.0);
    let hi = (x0 + width).min(1.0);
    let (x1, f1) = golden_section_minimize(&f, lo, hi, 1e-6, 100);
    if f1 < f0 {
        (x1, f1)
    } else {
        (x0, f0)
    }
}

/// Minimise `f(x, y)` over the unit square.
///
/// A coarse 2-D grid picks the starting cell, then a few rounds of
/// coordinate-wise golden-section search refine inside it.
pub fn minimize_unit_square<F>(f: F, steps: usize, rounds: usize) -> ((f64, f64), f64)
where
    F: Fn(f64, f64) -> f64,
{
    let steps = steps.max(1);
    let width = 1.0 / steps as f64;

    let mut best = ((0.0, 0.0), f(0.0, 0.0));
    for i in 0..=steps {
        for j in 0..=steps {
            let (x, y) = (width * i as f64, width * j as f64);
            let v = f(x, y);
            if v < best.1 {
                best = ((x, y), v);
            }
        }
    }

    let ((mut x, mut y), mut value) = best;
    let (x_lo, x_hi) = ((x - width).max(0.0), (x + width).min(1.0));
    let (y_lo, y_hi) = ((y - width).max(0.0), (y + width).min(1.0));

    for _ in 0..rounds {
        let (nx, vx) = golden_section_minimize(|a| f(a, y), x_lo, x_hi, 1e-6, 100);
        if vx < value {
            x = nx;
            value = vx;
        }
        let (ny, vy) = golden_section_minimize(|b| f(x, b), y_lo, y_hi, 1e-6, 100);
        if vy < value {
            y = ny;
            value = vy;
        }
    }

    ((x, y), value)
}
