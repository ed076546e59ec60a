use fugit::MicrosDurationU64;
use smart_leds::hsv::Hsv;

use crate::layout::OsMode;

pub const ROWS: usize = 6;
pub const COLS: usize = 16;
pub const LAYER_COUNT: usize = 4;
pub const LED_COUNT: usize = 84;

pub const SCAN_TIME_US: u32 = 1000;
pub const FRAME_TIME_US: u32 = 16_000;
pub const WATCHDOG_MS: u32 = 50;
pub const DEBOUNCE_SCANS: u16 = 5;

/// Ticks (one per scan) before a held layer-tap key becomes its layer.
pub const HOLD_TAP_TIMEOUT: u16 = 200;

/// Used until the slide switch has been read.
pub const DEFAULT_OS: OsMode = OsMode::Mac;

pub const ESC_LED_INDEX: usize = 0;
pub const FLASH_DURATION: MicrosDurationU64 = MicrosDurationU64::millis(500);

pub const DEFAULT_RGB: Hsv = Hsv {
    hue: 170,
    sat: 255,
    val: 120,
};
pub const DEFAULT_RGB_SPEED: u8 = 128;

pub const HUE_STEP: u8 = 8;
pub const SAT_STEP: u8 = 16;
pub const VAL_STEP: u8 = 16;
pub const SPEED_STEP: u8 = 16;
