use crate::environment::Sector;
use itertools::Itertools;
use metfor::{HectoPascal, Meters, Quantity};
use optional::Optioned;
use std::ops::Sub;

/// Find the levels bracketing a target height.
///
/// Only levels with a height that `usable` accepts are considered. Heights are assumed to be
/// increasing with index.
pub(crate) fn bracket_height<F>(
    heights: &[Optioned<Meters>],
    usable: F,
    tgt_h: Meters,
) -> Option<Sector>
where
    F: Fn(usize) -> bool,
{
    // Map this pair of slice index and height points to a Sector
    let make_bracket = |pnt_0, pnt_1| -> Option<Sector> {
        let (i0, h0): (usize, Meters) = pnt_0;
        let (i1, h1): (usize, Meters) = pnt_1;

        debug_assert!(h0 < h1);
        if (h0 - tgt_h).unpack().abs() < std::f64::EPSILON {
            Some(Sector::new(i0, i0))
        } else if (h1 - tgt_h).unpack().abs() < std::f64::EPSILON {
            Some(Sector::new(i1, i1))
        } else if h0 < tgt_h && h1 > tgt_h {
            Some(Sector::new(i0, i1))
        } else {
            None
        }
    };

    heights
        .iter()
        .enumerate()
        // Remove levels with missing data, then unwrap from the Optioned type
        .filter(|&(i, _)| usable(i))
        .filter_map(|(i, h_opt)| h_opt.map(|h| (i, h)))
        // Look at the levels two at a time...
        .tuple_windows::<(_, _)>()
        // ...and keep the first one that brackets the target.
        .find_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
}

#[inline]
pub(crate) fn linear_interp<X, Y>(x_val: X, x1: X, x2: X, y1: Y, y2: Y) -> Y
where
    X: Sub<X> + Copy + std::fmt::Debug + std::cmp::PartialEq,
    <X as Sub<X>>::Output: Quantity,
    Y: Quantity + Sub<Y>,
    <Y as Sub<Y>>::Output: Quantity,
{
    debug_assert_ne!(x1, x2);

    let run = (x2 - x1).unpack();
    let rise = (y2 - y1).unpack();
    let dx = (x_val - x1).unpack();

    Y::pack(y1.unpack() + dx * (rise / run))
}

/// Interpolate pressure in height assuming the log of the pressure varies linearly, which is
/// exact for an isothermal layer.
///
/// Returns `None` for non-positive pressures.
#[inline]
pub(crate) fn log_linear_interp(
    h_val: Meters,
    h1: Meters,
    h2: Meters,
    p1: HectoPascal,
    p2: HectoPascal,
) -> Option<HectoPascal> {
    debug_assert_ne!(h1, h2);

    let (p1, p2) = (p1.unpack(), p2.unpack());
    if p1 <= 0.0 || p2 <= 0.0 {
        return None;
    }

    let run = (h2 - h1).unpack();
    let rise = p2.ln() - p1.ln();
    let dh = (h_val - h1).unpack();

    Some(HectoPascal((p1.ln() + dh * (rise / run)).exp()))
}
