//! Wraparound-aware comparison of 16-bit sequence numbers.
//! 16位序列号的回绕感知比较。

/// Signed distance from `b` to `a`, modulo 2^16.
///
/// 从 `b` 到 `a` 的有符号距离（模 2^16）。
#[inline]
pub fn sequence_diff(a: u16, b: u16) -> i16 {
    a.wrapping_sub(b) as i16
}

/// Returns true if `a` is newer than `b`.
///
/// 若 `a` 比 `b` 新则返回 true。
#[inline]
pub fn is_newer(a: u16, b: u16) -> bool {
    sequence_diff(a, b) > 0
}
