use keyberon::action::{Action, HoldTapAction, HoldTapConfig};
use keyberon::key_code::KeyCode;
use keyberon::layout::{layout, Layers};

use crate::config::{self, COLS, LAYER_COUNT, ROWS};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CustomActions {
    NkroToggle,
    RgbToggle,
    RgbNext,
    RgbHueUp,
    RgbSatUp,
    RgbValUp,
    RgbSpeedUp,
    /// Consumer-page display brightness, used by the Windows layers.
    BrightnessUp,
    BrightnessDown,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    MacBase = 0,
    MacFn = 1,
    WinBase = 2,
    WinFn = 3,
}

/// Position of the Mac/Win slide switch.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OsMode {
    Mac,
    Windows,
}

impl OsMode {
    /// The switch pin reads high in the Mac position.
    pub const fn from_switch(high: bool) -> Self {
        if high {
            OsMode::Mac
        } else {
            OsMode::Windows
        }
    }

    pub const fn base_layer(self) -> Layer {
        match self {
            OsMode::Mac => Layer::MacBase,
            OsMode::Windows => Layer::WinBase,
        }
    }
}

const NK_TOGG: Action<CustomActions> = Action::Custom(CustomActions::NkroToggle);
const RGB_TOG: Action<CustomActions> = Action::Custom(CustomActions::RgbToggle);
const RGB_MOD: Action<CustomActions> = Action::Custom(CustomActions::RgbNext);
const RGB_HUI: Action<CustomActions> = Action::Custom(CustomActions::RgbHueUp);
const RGB_SAI: Action<CustomActions> = Action::Custom(CustomActions::RgbSatUp);
const RGB_VAI: Action<CustomActions> = Action::Custom(CustomActions::RgbValUp);
const RGB_SPI: Action<CustomActions> = Action::Custom(CustomActions::RgbSpeedUp);
const BRIU: Action<CustomActions> = Action::Custom(CustomActions::BrightnessUp);
const BRID: Action<CustomActions> = Action::Custom(CustomActions::BrightnessDown);

// wired board: no bluetooth hosts and no battery
const BT_HST1: Action<CustomActions> = Action::Trans;
const BT_HST2: Action<CustomActions> = Action::Trans;
const BT_HST3: Action<CustomActions> = Action::Trans;
const BAT_LVL: Action<CustomActions> = Action::Trans;

const MO_MAC_FN: Action<CustomActions> = Action::Layer(Layer::MacFn as usize);
const MO_WIN_FN: Action<CustomActions> = Action::Layer(Layer::WinFn as usize);

const ESC_MAC_FN: Action<CustomActions> = Action::HoldTap(&HoldTapAction {
    timeout: config::HOLD_TAP_TIMEOUT,
    hold: Action::Layer(Layer::MacFn as usize),
    tap: Action::KeyCode(KeyCode::Escape),
    config: HoldTapConfig::Default,
    tap_hold_interval: 0,
});
const ESC_WIN_FN: Action<CustomActions> = Action::HoldTap(&HoldTapAction {
    timeout: config::HOLD_TAP_TIMEOUT,
    hold: Action::Layer(Layer::WinFn as usize),
    tap: Action::KeyCode(KeyCode::Escape),
    config: HoldTapConfig::Default,
    tap_hold_interval: 0,
});

// On the Mac layers Pause and ScrollLock act as the macOS display brightness keys.
#[rustfmt::skip]
pub static LAYERS: Layers<COLS, ROWS, LAYER_COUNT, CustomActions> = layout! {
    {
        [{ESC_MAC_FN} F1   F2   F3   F4   F5   F6   F7   F8   F9   F10  F11       F12       PScreen  Delete   Home],
        [Grave        Kb1  Kb2  Kb3  Kb4  Kb5  Kb6  Kb7  Kb8  Kb9  Kb0  Minus     Equal     BSpace   n        PgUp],
        [Tab          Q    W    E    R    T    Y    U    I    O    P    LBracket  RBracket  Bslash   n        PgDown],
        [Escape       A    S    D    F    G    H    J    K    L    SColon Quote   n         Enter    n        End],
        [LShift       n    Z    X    C    V    B    N    M    Comma Dot Slash     n         RShift   Up       Pause],
        [LCtrl        LAlt LGui n    n    n    Space n   n    n    {MO_MAC_FN} RGui RCtrl   Left     Down     Right]
    }
    {
        [CapsLock     t    t    t    t    t    t    t    t    t    t    t         t         t        Insert   {RGB_HUI}],
        [t  {BT_HST1} {BT_HST2} {BT_HST3} t t  t    t    t    t    t    t         t         t        n        {RGB_SAI}],
        [{RGB_TOG}    MediaMute MediaVolDown MediaVolUp Pause t t t t t t t       t         t        n        {RGB_VAI}],
        [t  MediaPreviousSong MediaPlayPause MediaNextSong ScrollLock t t t t t t t n       t        n        {RGB_SPI}],
        [t            n    t    t    t    t    {BAT_LVL} {NK_TOGG} t t t t      n         t        t        ScrollLock],
        [t            t    t    n    n    n    t    n    n    n    t    Application t       t        t        {RGB_MOD}]
    }
    {
        [{ESC_WIN_FN} F1   F2   F3   F4   F5   F6   F7   F8   F9   F10  F11       F12       PScreen  Delete   Home],
        [Grave        Kb1  Kb2  Kb3  Kb4  Kb5  Kb6  Kb7  Kb8  Kb9  Kb0  Minus     Equal     BSpace   n        PgUp],
        [Tab          Q    W    E    R    T    Y    U    I    O    P    LBracket  RBracket  Bslash   n        PgDown],
        [Escape       A    S    D    F    G    H    J    K    L    SColon Quote   n         Enter    n        End],
        [LShift       n    Z    X    C    V    B    N    M    Comma Dot Slash     n         RShift   Up       Pause],
        [LCtrl        LGui LAlt n    n    n    Space n   n    n    {MO_WIN_FN} RAlt RCtrl   Left     Down     Right]
    }
    {
        [CapsLock     t    t    t    t    t    t    t    t    t    t    t         t         t        Insert   {RGB_HUI}],
        [t  {BT_HST1} {BT_HST2} {BT_HST3} t t  t    t    t    t    t    t         t         t        n        {RGB_SAI}],
        [{RGB_TOG}    MediaMute MediaVolDown MediaVolUp {BRIU} t t t t t t t      t         t        n        {RGB_VAI}],
        [t  MediaPreviousSong MediaPlayPause MediaNextSong {BRID} t t t t t t t n     t        n        {RGB_SPI}],
        [t            n    t    t    t    t    {BAT_LVL} {NK_TOGG} t t t t      n         t        t        ScrollLock],
        [t            t    t    n    n    n    t    n    n    n    t    Application t       t        t        {RGB_MOD}]
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    fn action(layer: Layer, row: usize, col: usize) -> &'static Action<CustomActions> {
        &LAYERS[layer as usize][row][col]
    }

    #[test]
    fn nkro_toggle_sits_on_n_in_both_fn_layers() {
        for layer in [Layer::MacFn, Layer::WinFn] {
            assert_eq!(*action(layer, 4, 7), NK_TOGG);
        }
        assert_eq!(*action(Layer::MacBase, 4, 7), Action::KeyCode(KeyCode::N));
    }

    #[test]
    fn escape_is_layer_tap_to_matching_fn_layer() {
        match action(Layer::MacBase, 0, 0) {
            Action::HoldTap(ht) => {
                assert_eq!(ht.hold, Action::Layer(Layer::MacFn as usize));
                assert_eq!(ht.tap, Action::KeyCode(KeyCode::Escape));
            }
            _ => panic!("expected a layer-tap on escape"),
        }
        match action(Layer::WinBase, 0, 0) {
            Action::HoldTap(ht) => assert_eq!(ht.hold, Action::Layer(Layer::WinFn as usize)),
            _ => panic!("expected a layer-tap on escape"),
        }
    }

    #[test]
    fn bottom_row_modifiers_follow_os() {
        assert_eq!(*action(Layer::MacBase, 5, 1), Action::KeyCode(KeyCode::LAlt));
        assert_eq!(*action(Layer::MacBase, 5, 2), Action::KeyCode(KeyCode::LGui));
        assert_eq!(*action(Layer::WinBase, 5, 1), Action::KeyCode(KeyCode::LGui));
        assert_eq!(*action(Layer::WinBase, 5, 2), Action::KeyCode(KeyCode::LAlt));
    }

    #[test]
    fn brightness_keys_differ_per_os() {
        assert_eq!(*action(Layer::MacFn, 2, 4), Action::KeyCode(KeyCode::Pause));
        assert_eq!(*action(Layer::MacFn, 3, 4), Action::KeyCode(KeyCode::ScrollLock));
        assert_eq!(*action(Layer::WinFn, 2, 4), BRIU);
        assert_eq!(*action(Layer::WinFn, 3, 4), BRID);
    }

    #[test]
    fn wireless_keys_fall_through() {
        assert_eq!(*action(Layer::MacFn, 1, 1), Action::Trans);
        assert_eq!(*action(Layer::WinFn, 4, 6), Action::Trans);
    }

    #[test]
    fn os_switch_selects_base_layer() {
        assert_eq!(OsMode::from_switch(true).base_layer(), Layer::MacBase);
        assert_eq!(OsMode::from_switch(false).base_layer(), Layer::WinBase);
    }
}
