use core::ops::Range;

use crate::config::{COLS, LED_COUNT, ROWS};

const __: u8 = u8::MAX;

/// LED index under each matrix position, `__` where the matrix has no key.
#[rustfmt::skip]
const LED_MAP: [[u8; COLS]; ROWS] = [
    [ 0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15],
    [16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, __, 30],
    [31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, __, 45],
    [46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, __, 58, __, 59],
    [60, __, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, __, 71, 72, 73],
    [74, 75, 76, __, __, __, 77, __, __, __, 78, 79, 80, 81, 82, 83],
];

pub fn led_index(row: usize, col: usize) -> Option<usize> {
    let idx = *LED_MAP.get(row)?.get(col)?;
    (idx != __).then_some(idx as usize)
}

/// The whole chain, as handed to the indicator callback every frame.
pub const fn all() -> Range<usize> {
    0..LED_COUNT
}
