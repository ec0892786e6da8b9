//! Key bindings: logical controls, raw input codes and the static default table.
//!
//! The binding table is a multimap. One raw code may drive several controls
//! (typically one on foot and one in a vehicle, sometimes two vehicle controls),
//! and one control may be reachable from a primary and a secondary code.
//! Each [`BindingEntry`] becomes its own integer field in the document, named
//! `input.key_<context>_<Control>[_secondary]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw keyboard codes (SDL keycode values).
pub mod keycodes {
    const SCANCODE_MASK: i32 = 1 << 30;

    const fn from_scancode(scancode: i32) -> i32 {
        scancode | SCANCODE_MASK
    }

    pub const RETURN: i32 = 13;
    pub const SPACE: i32 = 32;
    pub const A: i32 = 'a' as i32;
    pub const C: i32 = 'c' as i32;
    pub const D: i32 = 'd' as i32;
    pub const E: i32 = 'e' as i32;
    pub const F: i32 = 'f' as i32;
    pub const Q: i32 = 'q' as i32;
    pub const R: i32 = 'r' as i32;
    pub const S: i32 = 's' as i32;
    pub const W: i32 = 'w' as i32;
    pub const X: i32 = 'x' as i32;
    pub const Z: i32 = 'z' as i32;
    pub const DELETE: i32 = 127;

    pub const CAPSLOCK: i32 = from_scancode(57);
    pub const INSERT: i32 = from_scancode(73);
    pub const HOME: i32 = from_scancode(74);
    pub const PAGEUP: i32 = from_scancode(75);
    pub const PAGEDOWN: i32 = from_scancode(78);
    pub const RIGHT: i32 = from_scancode(79);
    pub const LEFT: i32 = from_scancode(80);
    pub const DOWN: i32 = from_scancode(81);
    pub const UP: i32 = from_scancode(82);
    pub const KP_PLUS: i32 = from_scancode(87);
    pub const KP_ENTER: i32 = from_scancode(88);
    pub const KP_1: i32 = from_scancode(89);
    pub const KP_2: i32 = from_scancode(90);
    pub const KP_4: i32 = from_scancode(92);
    pub const KP_6: i32 = from_scancode(94);
    pub const KP_9: i32 = from_scancode(97);
    pub const KP_0: i32 = from_scancode(98);
    pub const KP_PERIOD: i32 = from_scancode(99);
    pub const LCTRL: i32 = from_scancode(224);
    pub const LSHIFT: i32 = from_scancode(225);
    pub const LALT: i32 = from_scancode(226);
    pub const RCTRL: i32 = from_scancode(228);
    pub const RSHIFT: i32 = from_scancode(229);
}

/// Logical game control driven by one or more raw inputs.
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Control {
    // On foot
    FireWeapon,
    NextWeapon,
    LastWeapon,
    GoForward,
    GoBackwards,
    GoLeft,
    GoRight,
    ZoomIn,
    ZoomOut,
    EnterExitVehicle,
    ChangeCamera,
    Jump,
    Sprint,
    Walk,
    AimWeapon,
    LookBehind,

    // In vehicle
    VehicleFireWeapon,
    VehicleLeft,
    VehicleRight,
    VehicleAccelerate,
    VehicleBrake,
    ChangeRadio,
    Horn,
    Submission,
    Handbrake,
    VehicleAimUp,
    VehicleAimDown,
    VehicleAimLeft,
    VehicleAimRight,
    VehicleDown,
    VehicleUp,
    LookLeft,
    LookRight,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Input context a binding applies in.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum InputContext {
    OnFoot,
    InVehicle,
}

impl InputContext {
    pub const fn as_str(self) -> &'static str {
        match self {
            InputContext::OnFoot => "onFoot",
            InputContext::InVehicle => "inVehicle",
        }
    }
}

/// Whether a binding is a control's primary or secondary input.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BindingSlot {
    Primary,
    Secondary,
}

/// One row of the binding table.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BindingEntry {
    /// Raw input code.
    pub code: i32,
    pub control: Control,
    pub context: InputContext,
    pub slot: BindingSlot,
}

impl BindingEntry {
    const fn new(code: i32, control: Control, context: InputContext, slot: BindingSlot) -> Self {
        Self {
            code,
            control,
            context,
            slot,
        }
    }

    /// Key name inside the `input` section, e.g. `key_onFoot_Jump_secondary`.
    pub fn key(&self) -> String {
        let suffix = match self.slot {
            BindingSlot::Primary => "",
            BindingSlot::Secondary => "_secondary",
        };
        format!("key_{}_{}{}", self.context.as_str(), self.control, suffix)
    }

    /// Fully qualified field name, e.g. `input.key_onFoot_Jump`.
    pub fn field_name(&self) -> String {
        format!("input.{}", self.key())
    }
}

const fn foot(code: i32, control: Control) -> BindingEntry {
    BindingEntry::new(code, control, InputContext::OnFoot, BindingSlot::Primary)
}

const fn foot2(code: i32, control: Control) -> BindingEntry {
    BindingEntry::new(code, control, InputContext::OnFoot, BindingSlot::Secondary)
}

const fn car(code: i32, control: Control) -> BindingEntry {
    BindingEntry::new(code, control, InputContext::InVehicle, BindingSlot::Primary)
}

const fn car2(code: i32, control: Control) -> BindingEntry {
    BindingEntry::new(code, control, InputContext::InVehicle, BindingSlot::Secondary)
}

/// The built-in binding table, in document order.
///
/// Shared codes across rows are deliberate (e.g. `D` steers right and brakes,
/// `KP_2` aims down, lifts and looks right).
pub static DEFAULT_BINDINGS: &[BindingEntry] = {
    use self::Control::*;
    use self::keycodes as k;
    &[
        foot(k::KP_0, FireWeapon),
        foot(k::KP_ENTER, NextWeapon),
        foot(k::KP_PERIOD, LastWeapon),
        foot(k::W, GoForward),
        foot2(k::UP, GoForward),
        foot(k::S, GoBackwards),
        foot2(k::DOWN, GoBackwards),
        foot(k::A, GoLeft),
        foot2(k::LEFT, GoLeft),
        foot(k::D, GoRight),
        foot2(k::RIGHT, GoRight),
        foot(k::PAGEUP, ZoomIn),
        foot2(k::Z, ZoomIn),
        foot(k::PAGEDOWN, ZoomOut),
        foot2(k::X, ZoomOut),
        foot(k::F, EnterExitVehicle),
        foot2(k::RETURN, EnterExitVehicle),
        foot(k::C, ChangeCamera),
        foot2(k::HOME, ChangeCamera),
        foot(k::RCTRL, Jump),
        foot2(k::SPACE, Jump),
        foot(k::LSHIFT, Sprint),
        foot2(k::RSHIFT, Sprint),
        foot(k::LALT, Walk),
        foot(k::DELETE, AimWeapon),
        foot(k::CAPSLOCK, LookBehind),
        car(k::LCTRL, VehicleFireWeapon),
        car(k::A, VehicleLeft),
        car2(k::LEFT, VehicleLeft),
        car(k::D, VehicleRight),
        car2(k::RIGHT, VehicleRight),
        car(k::W, VehicleAccelerate),
        car2(k::UP, VehicleAccelerate),
        car(k::D, VehicleBrake),
        car2(k::DOWN, VehicleBrake),
        car(k::INSERT, ChangeRadio),
        car2(k::R, ChangeRadio),
        car(k::LSHIFT, Horn),
        car2(k::RSHIFT, Horn),
        car(k::KP_PLUS, Submission),
        car2(k::CAPSLOCK, Submission),
        car(k::RCTRL, Handbrake),
        car2(k::SPACE, Handbrake),
        car(k::KP_9, VehicleAimUp),
        car(k::KP_2, VehicleAimDown),
        car(k::KP_4, VehicleAimLeft),
        car(k::KP_6, VehicleAimRight),
        car(k::KP_9, VehicleDown),
        car(k::KP_2, VehicleUp),
        car(k::KP_1, LookLeft),
        car2(k::Q, LookLeft),
        car(k::KP_2, LookRight),
        car2(k::E, LookRight),
    ]
};

/// Resolved multimap from raw input code to every control it drives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlMap {
    by_code: BTreeMap<i32, Vec<Control>>,
}

impl ControlMap {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a BindingEntry>) -> Self {
        let mut by_code: BTreeMap<i32, Vec<Control>> = BTreeMap::new();
        for entry in entries {
            let controls = by_code.entry(entry.code).or_default();
            if !controls.contains(&entry.control) {
                controls.push(entry.control);
            }
        }
        Self { by_code }
    }

    /// All controls bound to `code`, in table order.
    pub fn controls_for(&self, code: i32) -> &[Control] {
        self.by_code.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }
}
