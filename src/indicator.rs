//! Escape key flash shown when N-key rollover is toggled.
//!
//! Pressing the NKRO toggle arms a 500ms flash on the Escape LED: green when
//! rollover is about to be enabled, red when it is about to be disabled. The
//! flash expires lazily, the first frame rendered after the deadline clears it.

use core::ops::Range;

use fugit::{MicrosDurationU64, TimerInstantU64};
use smart_leds::RGB8;

use crate::config::{ESC_LED_INDEX, FLASH_DURATION};
use crate::layout::CustomActions;

pub type Instant = TimerInstantU64<1_000_000>;

const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

#[derive(Debug, Clone, Copy)]
pub struct FlashIndicator {
    active: bool,
    green: bool,
    start: Instant,
}

impl Default for FlashIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashIndicator {
    pub const fn new() -> Self {
        Self {
            active: false,
            green: false,
            start: Instant::from_ticks(0),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_green(&self) -> bool {
        self.green
    }

    /// Key hook, run before the default handling of `action`.
    ///
    /// `nkro` is the setting before the toggle applies. Always returns `true`
    /// so the toggle itself still happens.
    pub fn on_key(&mut self, action: CustomActions, pressed: bool, nkro: bool, now: Instant) -> bool {
        if action == CustomActions::NkroToggle && pressed {
            self.green = !nkro;
            self.active = true;
            self.start = now;

            #[cfg(feature = "defmt")]
            defmt::debug!("nkro flash armed, green: {}", self.green);
        }
        true
    }

    /// Per-frame hook. Returns `true` when the Escape LED was overridden.
    pub fn render(&mut self, leds: Range<usize>, frame: &mut [RGB8], now: Instant) -> bool {
        if !self.active {
            return false;
        }

        // a reading before `start` counts as no time elapsed
        let elapsed = now
            .checked_duration_since(self.start)
            .unwrap_or(MicrosDurationU64::from_ticks(0));

        if elapsed >= FLASH_DURATION {
            self.active = false;
            return false;
        }

        if leds.contains(&ESC_LED_INDEX) {
            if let Some(led) = frame.get_mut(ESC_LED_INDEX) {
                *led = if self.green { GREEN } else { RED };
            }
        }
        true
    }
}
