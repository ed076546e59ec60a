use smart_leds::hsv::{hsv2rgb, Hsv};
use smart_leds::RGB8;

use crate::config;
use crate::indicator::Instant;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    Solid,
    Breathing,
    CycleAll,
}

impl Effect {
    pub fn next(self) -> Self {
        match self {
            Effect::Solid => Effect::Breathing,
            Effect::Breathing => Effect::CycleAll,
            Effect::CycleAll => Effect::Solid,
        }
    }
}

/// Per-key lighting settings, adjusted from the Fn layers.
pub struct RgbMatrix {
    pub enabled: bool,
    pub color: Hsv,
    pub speed: u8,
    pub effect: Effect,
}

impl Default for RgbMatrix {
    fn default() -> Self {
        Self {
            enabled: true,
            color: config::DEFAULT_RGB,
            speed: config::DEFAULT_RGB_SPEED,
            effect: Effect::Solid,
        }
    }
}

impl RgbMatrix {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn next_effect(&mut self) {
        self.effect = self.effect.next();
    }

    pub fn hue_up(&mut self) {
        self.color.hue = self.color.hue.wrapping_add(config::HUE_STEP);
    }

    pub fn sat_up(&mut self) {
        self.color.sat = self.color.sat.saturating_add(config::SAT_STEP);
    }

    pub fn val_up(&mut self) {
        self.color.val = self.color.val.saturating_add(config::VAL_STEP);
    }

    pub fn speed_up(&mut self) {
        self.speed = self.speed.saturating_add(config::SPEED_STEP);
    }

    /// Fills `frame` with the base effect for this instant.
    pub fn render(&self, now: Instant, frame: &mut [RGB8]) {
        let color = match self.enabled {
            false => RGB8::default(),
            true => hsv2rgb(self.color_at(now.ticks() / 1000)),
        };
        frame.iter_mut().for_each(|led| *led = color);
    }

    fn color_at(&self, now_ms: u64) -> Hsv {
        let mut hsv = self.color;
        match self.effect {
            Effect::Solid => {}
            Effect::Breathing => {
                // faster speed, shorter period: 4096ms down to 1036ms
                let period = 4096 - u64::from(self.speed) * 12;
                let phase = now_ms % period;
                let half = period / 2;
                let level = if phase < half { phase } else { period - phase };
                hsv.val = (u64::from(hsv.val) * level / half) as u8;
            }
            Effect::CycleAll => {
                let shift = now_ms * (u64::from(self.speed) + 1) / 1024;
                hsv.hue = hsv.hue.wrapping_add(shift as u8);
            }
        }
        hsv
    }
}
