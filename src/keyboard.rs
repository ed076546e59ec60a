use keyberon::key_code::KbHidReport;
use keyberon::layout::{CustomEvent, Event, Layout};
use smart_leds::RGB8;

use crate::config::{COLS, LAYER_COUNT, ROWS};
use crate::indicator::{FlashIndicator, Instant};
use crate::layout::{CustomActions, OsMode, LAYERS};
use crate::leds;
use crate::rgb_matrix::RgbMatrix;

const CONSUMER_BRIGHTNESS_UP: u16 = 0x006F;
const CONSUMER_BRIGHTNESS_DOWN: u16 = 0x0070;

/// Runtime keymap settings toggled from the keyboard itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeymapConfig {
    pub nkro: bool,
}

pub struct Keyboard {
    layout: Layout<COLS, ROWS, LAYER_COUNT, CustomActions>,
    config: KeymapConfig,
    rgb: RgbMatrix,
    indicator: FlashIndicator,
    os: OsMode,
    consumer: Option<u16>,
}

impl Keyboard {
    pub fn new(os: OsMode) -> Self {
        let mut layout = Layout::new(&LAYERS);
        layout.set_default_layer(os.base_layer() as usize);
        Self {
            layout,
            config: KeymapConfig::default(),
            rgb: RgbMatrix::default(),
            indicator: FlashIndicator::new(),
            os,
            consumer: None,
        }
    }

    pub fn event(&mut self, event: Event) {
        self.layout.event(event)
    }

    /// Follows the Mac/Win slide switch.
    pub fn set_os(&mut self, os: OsMode) {
        if os != self.os {
            #[cfg(feature = "defmt")]
            defmt::info!("os switch: {}", os);

            self.os = os;
            self.layout.set_default_layer(os.base_layer() as usize);
        }
    }

    pub fn os(&self) -> OsMode {
        self.os
    }

    pub fn config(&self) -> KeymapConfig {
        self.config
    }

    pub fn rgb(&self) -> &RgbMatrix {
        &self.rgb
    }

    pub fn indicator(&self) -> &FlashIndicator {
        &self.indicator
    }

    pub fn current_layer(&self) -> usize {
        self.layout.current_layer()
    }

    /// Consumer usage held down this tick, if any.
    pub fn consumer_usage(&self) -> Option<u16> {
        self.consumer
    }

    /// Advances the layout by one scan and returns the report to send.
    pub fn tick(&mut self, now: Instant) -> KbHidReport {
        let custom = match self.layout.tick() {
            CustomEvent::Press(action) => Some((*action, true)),
            CustomEvent::Release(action) => Some((*action, false)),
            CustomEvent::NoEvent => None,
        };
        if let Some((action, pressed)) = custom {
            self.process_record(action, pressed, now);
        }
        self.layout.keycodes().collect()
    }

    /// Composes one LED frame: base effect, then the indicator overlay.
    ///
    /// Returns whether the indicator overrode part of the frame.
    pub fn render(&mut self, now: Instant, frame: &mut [RGB8]) -> bool {
        self.rgb.render(now, frame);
        self.indicator.render(leds::all(), frame, now)
    }

    fn process_record(&mut self, action: CustomActions, pressed: bool, now: Instant) {
        if self.indicator.on_key(action, pressed, self.config.nkro, now) {
            self.handle_custom_action(action, pressed);
        }
    }

    fn handle_custom_action(&mut self, action: CustomActions, pressed: bool) {
        match (action, pressed) {
            (CustomActions::BrightnessUp, true) => self.consumer = Some(CONSUMER_BRIGHTNESS_UP),
            (CustomActions::BrightnessDown, true) => self.consumer = Some(CONSUMER_BRIGHTNESS_DOWN),
            (CustomActions::BrightnessUp | CustomActions::BrightnessDown, false) => self.consumer = None,
            (_, false) => {}
            (CustomActions::NkroToggle, true) => {
                self.config.nkro = !self.config.nkro;

                #[cfg(feature = "defmt")]
                defmt::info!("nkro: {}", self.config.nkro);
            }
            (CustomActions::RgbToggle, true) => self.rgb.toggle(),
            (CustomActions::RgbNext, true) => self.rgb.next_effect(),
            (CustomActions::RgbHueUp, true) => self.rgb.hue_up(),
            (CustomActions::RgbSatUp, true) => self.rgb.sat_up(),
            (CustomActions::RgbValUp, true) => self.rgb.val_up(),
            (CustomActions::RgbSpeedUp, true) => self.rgb.speed_up(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ESC_LED_INDEX, HOLD_TAP_TIMEOUT, LED_COUNT};
    use crate::layout::Layer;
    use keyberon::key_code::KeyCode;

    const FN: (u8, u8) = (5, 10);
    const NKRO: (u8, u8) = (4, 7);
    const RGB_TOG: (u8, u8) = (2, 0);
    const BRIU: (u8, u8) = (2, 4);
    const ESC: (u8, u8) = (0, 0);
    const Q: (u8, u8) = (2, 1);

    struct Harness {
        kb: Keyboard,
        ms: u64,
    }

    impl Harness {
        fn new(os: OsMode) -> Self {
            Self { kb: Keyboard::new(os), ms: 0 }
        }

        fn now(&self) -> Instant {
            Instant::from_ticks(self.ms * 1000)
        }

        fn tick(&mut self) -> KbHidReport {
            self.ms += 1;
            let now = self.now();
            self.kb.tick(now)
        }

        fn press(&mut self, (i, j): (u8, u8)) -> KbHidReport {
            self.kb.event(Event::Press(i, j));
            self.tick()
        }

        fn release(&mut self, (i, j): (u8, u8)) -> KbHidReport {
            self.kb.event(Event::Release(i, j));
            self.tick()
        }

        fn tap(&mut self, key: (u8, u8)) {
            self.press(key);
            self.release(key);
        }

        fn wait(&mut self, ms: u64) {
            for _ in 0..ms {
                self.tick();
            }
        }

        fn render(&mut self) -> ([RGB8; LED_COUNT], bool) {
            let mut frame = [RGB8::default(); LED_COUNT];
            let now = self.now();
            let overridden = self.kb.render(now, &mut frame);
            (frame, overridden)
        }
    }

    #[test]
    fn default_layer_follows_os() {
        assert_eq!(Keyboard::new(OsMode::Mac).current_layer(), Layer::MacBase as usize);
        assert_eq!(Keyboard::new(OsMode::Windows).current_layer(), Layer::WinBase as usize);

        let mut kb = Keyboard::new(OsMode::Mac);
        kb.set_os(OsMode::Windows);
        assert_eq!(kb.os(), OsMode::Windows);
        assert_eq!(kb.current_layer(), Layer::WinBase as usize);
    }

    #[test]
    fn plain_key_reaches_report() {
        let mut h = Harness::new(OsMode::Mac);
        let report = h.press(Q);
        assert_eq!(report.as_bytes()[2], KeyCode::Q as u8);
        let report = h.release(Q);
        assert_eq!(report.as_bytes()[2], 0);
    }

    #[test]
    fn bottom_row_modifier_depends_on_os() {
        let lalt = 1 << (KeyCode::LAlt as u8 - KeyCode::LCtrl as u8);
        let lgui = 1 << (KeyCode::LGui as u8 - KeyCode::LCtrl as u8);

        let mut mac = Harness::new(OsMode::Mac);
        assert_eq!(mac.press((5, 1)).as_bytes()[0], lalt);

        let mut win = Harness::new(OsMode::Windows);
        assert_eq!(win.press((5, 1)).as_bytes()[0], lgui);
    }

    #[test]
    fn holding_escape_enters_fn_layer() {
        let mut h = Harness::new(OsMode::Windows);
        h.press(ESC);
        h.wait(u64::from(HOLD_TAP_TIMEOUT) + 10);
        assert_eq!(h.kb.current_layer(), Layer::WinFn as usize);
        h.release(ESC);
        h.wait(2);
        assert_eq!(h.kb.current_layer(), Layer::WinBase as usize);
    }

    #[test]
    fn fn_n_toggles_nkro_and_flashes() {
        let mut h = Harness::new(OsMode::Mac);
        h.press(FN);
        assert_eq!(h.kb.current_layer(), Layer::MacFn as usize);

        h.press(NKRO);
        assert!(h.kb.config().nkro);
        assert!(h.kb.indicator().is_active());
        assert!(h.kb.indicator().is_green());

        h.wait(100);
        let (frame, overridden) = h.render();
        assert!(overridden);
        assert_eq!(frame[ESC_LED_INDEX], RGB8 { r: 0, g: 255, b: 0 });

        h.wait(500);
        let (frame, overridden) = h.render();
        assert!(!overridden);
        assert!(!h.kb.indicator().is_active());
        assert_eq!(frame[ESC_LED_INDEX], frame[1]);
    }

    #[test]
    fn second_toggle_flashes_red() {
        let mut h = Harness::new(OsMode::Mac);
        h.press(FN);
        h.tap(NKRO);
        h.wait(200);
        h.tap(NKRO);
        assert!(!h.kb.config().nkro);
        assert!(!h.kb.indicator().is_green());

        h.wait(400);
        let (frame, overridden) = h.render();
        assert!(overridden);
        assert_eq!(frame[ESC_LED_INDEX], RGB8 { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn n_without_fn_types_n() {
        let mut h = Harness::new(OsMode::Mac);
        let report = h.press(NKRO);
        assert_eq!(report.as_bytes()[2], KeyCode::N as u8);
        assert!(!h.kb.config().nkro);
        assert!(!h.kb.indicator().is_active());
    }

    #[test]
    fn rgb_toggle_blanks_frame() {
        let mut h = Harness::new(OsMode::Mac);
        h.press(FN);
        h.tap(RGB_TOG);
        assert!(!h.kb.rgb().enabled);
        let (frame, overridden) = h.render();
        assert!(!overridden);
        assert!(frame.iter().all(|led| *led == RGB8::default()));
    }

    #[test]
    fn windows_brightness_is_held_as_consumer_usage() {
        let mut h = Harness::new(OsMode::Windows);
        h.press(FN);
        h.press(BRIU);
        assert_eq!(h.kb.consumer_usage(), Some(CONSUMER_BRIGHTNESS_UP));
        h.release(BRIU);
        assert_eq!(h.kb.consumer_usage(), None);
    }
}
