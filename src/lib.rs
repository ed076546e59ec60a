//! Keymap and Escape-LED NKRO indicator for an 84 key ANSI board.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod indicator;
pub mod keyboard;
pub mod layout;
pub mod leds;
pub mod rgb_matrix;
