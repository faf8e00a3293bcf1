//! Modular event arithmetic.
//!
//! Event numbers live in `[0, modulus)` and wrap. Distance is defined here
//! once, with unsigned arithmetic, so no caller ever leans on the host
//! language's remainder-of-negative behavior.

/// Forward distance from `from` to `to` in a modular space: `(to - from)
/// mod modulus`, always in `[0, modulus)`.
///
/// Both operands must already be reduced. Panics (debug) otherwise.
#[inline]
pub fn forward_distance(from: u32, to: u32, modulus: u32) -> u32 {
    debug_assert!(modulus > 0, "modulus must be positive");
    debug_assert!(from < modulus, "from={from} not reduced mod {modulus}");
    debug_assert!(to < modulus, "to={to} not reduced mod {modulus}");
    if to >= from {
        to - from
    } else {
        modulus - (from - to)
    }
}

/// Successor of `event` in the modular event space.
#[inline]
pub fn successor(event: u32, modulus: u32) -> u32 {
    debug_assert!(event < modulus);
    if event + 1 == modulus {
        0
    } else {
        event + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_distance_plain() {
        assert_eq!(forward_distance(3, 7, 16), 4);
        assert_eq!(forward_distance(7, 7, 16), 0);
    }

    #[test]
    fn test_forward_distance_wraps() {
        // 14 -> 2 crosses the wrap point
        assert_eq!(forward_distance(14, 2, 16), 4);
        // going "backward" is a long way forward
        assert_eq!(forward_distance(6, 3, 16), 13);
        assert_eq!(forward_distance(0, 15, 16), 15);
        assert_eq!(forward_distance(15, 0, 16), 1);
    }

    #[test]
    fn test_forward_distance_full_modulus() {
        let m = 1 << 16;
        assert_eq!(forward_distance(m - 1, 0, m), 1);
        assert_eq!(forward_distance(0, m - 1, m), m - 1);
    }

    #[test]
    fn test_successor() {
        assert_eq!(successor(14, 16), 15);
        assert_eq!(successor(15, 16), 0);
    }
}
