//! Infinity-norm epigraph as a nonnegative block.
//!
//! `t >= max_i |x_i|` over `[t; x]` of dimension `d + 1` holds exactly when
//!
//! ```text
//! [t - x_1, ..., t - x_d, t + x_1, ..., t + x_d] >= 0
//! ```
//!
//! The first half of the block bounds `x` from above, the second half from below.
//! Every map below relies on that order. Where the halves are called `lb` and `ub`
//! (lower-bound rows first), `lb` is `upper` here and `ub` is `lower`.

use log::warn;
use nalgebra::DVector;

use super::set_map::{SetMap, SetMapBridge};
use super::{check_kind, epigraph_split, nonneg_split, Settings};
use crate::error::Result;
use crate::expr::AffineVector;
use crate::sets::{ConeKind, ConeSet};

/// Bridge for infinity-norm epigraph constraints.
pub type NormInfinityBridge = SetMapBridge<NormInfinityMap>;

/// The set map behind [`NormInfinityBridge`].
#[derive(Debug, Clone, Copy)]
pub struct NormInfinityMap;

impl SetMap for NormInfinityMap {
    const SOURCE: ConeKind = ConeKind::NormInfinity;
    const TARGET: ConeKind = ConeKind::Nonnegatives;

    fn map_set(set: &ConeSet) -> Result<ConeSet> {
        check_kind(set, ConeKind::NormInfinity)?;
        let d = epigraph_split(set)?;
        Ok(ConeSet::Nonnegatives(2 * d))
    }

    fn inverse_map_set(set: &ConeSet) -> Result<ConeSet> {
        check_kind(set, ConeKind::Nonnegatives)?;
        let d = nonneg_split(set.dimension())?;
        Ok(ConeSet::NormInfinity(d + 1))
    }

    fn map_function<V: AffineVector>(func: &V) -> Result<V> {
        let n = func.dimension();
        let d = epigraph_split(&ConeSet::NormInfinity(n))?;
        let t = func.component(0).broadcast(d);
        let x = func.subvector(1, n);
        Ok(V::concat(&[t.minus(&x), t.plus(&x)]))
    }

    fn inverse_map_function<V: AffineVector>(func: &V) -> Result<V> {
        let d = nonneg_split(func.dimension())?;
        let upper = func.subvector(0, d);
        let lower = func.subvector(d, 2 * d);
        // Average of all rows: every pair sums to 2t
        let t = func.sum_components().divided((2 * d) as f64);
        let x = lower.minus(&upper).scaled(0.5);
        Ok(V::concat(&[t, x]))
    }

    fn adjoint_map_function<V: AffineVector>(func: &V) -> Result<V> {
        let d = nonneg_split(func.dimension())?;
        let upper = func.subvector(0, d);
        let lower = func.subvector(d, 2 * d);
        let t = func.sum_components();
        let x = lower.minus(&upper);
        Ok(V::concat(&[t, x]))
    }

    fn inverse_adjoint_map_function(
        value: &DVector<f64>,
        settings: &Settings,
    ) -> Result<DVector<f64>> {
        let n = value.len();
        let d = epigraph_split(&ConeSet::NormInfinity(n))?;
        let t = value[0];
        let x = value.rows(1, d);

        // At optimality at most one row of each pair carries a multiplier
        let upper = x.map(|v| (-v).max(0.0));
        let lower = x.map(|v| v.max(0.0));
        let total = upper.sum() + lower.sum();
        let slack = t - total;

        let mut result = DVector::zeros(2 * d);
        if slack < -settings.dual_feasibility_tol * (1.0 + t.abs()) {
            // No nonnegative preimage: shrink the split so it sums to max(t, 0)
            warn!(
                "dual start {:?} lies outside the one-norm cone (slack {}), scaling it down",
                value.as_slice(),
                slack
            );
            let factor = if total > 0.0 { t.max(0.0) / total } else { 0.0 };
            for i in 0..d {
                result[i] = upper[i] * factor;
                result[d + i] = lower[i] * factor;
            }
            return Ok(result);
        }

        // Spread the remaining mass of t evenly over all 2d rows
        let shift = slack.max(0.0) / (2 * d) as f64;
        for i in 0..d {
            result[i] = upper[i] + shift;
            result[d + i] = lower[i] + shift;
        }
        Ok(result)
    }
}
