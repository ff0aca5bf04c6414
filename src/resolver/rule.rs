//! Symbol selection: which symbol moves one place right to reach the parent
//!
//! Positions are 1-based throughout. `m` is the length of the active region,
//! the prefix of the vertex that is not yet in identity order.

/// Symbol at 1-based position `p`
#[inline]
fn at(symbols: &[u8], p: usize) -> usize {
    symbols[p - 1] as usize
}

/// Rightmost 1-based position `i <= limit` with `symbols[i - 1] != i`, or 0
pub(crate) fn rightmost_wrong(symbols: &[u8], limit: usize) -> usize {
    (1..=limit).rev().find(|&i| at(symbols, i) != i).unwrap_or(0)
}

/// Choose the symbol to push right inside an active region of length `m`
///
/// Requires `symbols[m - 1] != m`.
pub(crate) fn settle(symbols: &[u8], t: usize, m: usize) -> usize {
    let last = at(symbols, m);

    // Region ends in `m, m-1`: the prefix before them decides the route.
    if last == m - 1 && at(symbols, m - 1) == m {
        let rx = rightmost_wrong(symbols, m - 2);
        if rx > 0 {
            if t == m - 1 {
                return rx;
            }
            let crossing = at(symbols, rx);
            if t == crossing {
                return m;
            }
            if t == rx {
                return crossing;
            }
            return t;
        }
        if t == m - 1 {
            return m;
        }
    }

    if last == t {
        m
    } else {
        t
    }
}

/// Choose the symbol to push right when the last symbol is already `n`
///
/// `first_wrong` comes from the vertex cache and `t <= n - 2`.
pub(crate) fn find_position(symbols: &[u8], t: usize, first_wrong: usize) -> usize {
    let m = first_wrong.max(t + 1);
    if at(symbols, m) == m {
        return at(symbols, m - 1);
    }
    settle(symbols, t, m)
}
