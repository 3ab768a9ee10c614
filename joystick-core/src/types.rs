//! Core joystick types: Channels, Source, Buttons, Hat, JoystickState.

use core::ops::{BitOr, BitOrAssign};

/// Channel count of a full CRSF or SBUS frame.
pub const MAX_CHANNELS: usize = 16;

/// Number of buttons carried by a [`JoystickState`].
pub const MAX_BUTTONS: usize = 32;

/// Raw receiver values, one per channel.
///
/// Index order is shared by every source: 0-3 are the stick axes,
/// the remaining channels carry switches.
pub type Channels<const N: usize> = [u16; N];

/// Receiver protocol that wrote a channel vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    /// Bidirectional CRSF link (primary).
    Crsf,
    /// SBUS receiver (fallback).
    Sbus,
}

/// CRSF link state as last reported by the CRSF collaborator.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Up,
    #[default]
    Down,
}

impl LinkState {
    #[inline]
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, LinkState::Up)
    }
}

/// Button state represented as a bitfield.
///
/// Button `n` (0-based) lives in bit `n`. Indices past [`MAX_BUTTONS`]
/// are ignored by [`Buttons::set`].
///
/// # Example
///
/// ```
/// use joystick_core::Buttons;
///
/// let buttons = Buttons::button(0) | Buttons::button(4);
/// assert!(buttons.contains(Buttons::button(4)));
/// assert!(!buttons.is_pressed(1));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u32);

impl Buttons {
    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// A single button by 0-based index.
    #[inline]
    #[must_use]
    pub const fn button(index: usize) -> Self {
        if index < MAX_BUTTONS {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Check if the button at `index` is pressed.
    #[inline]
    #[must_use]
    pub const fn is_pressed(self, index: usize) -> bool {
        index < MAX_BUTTONS && (self.0 >> index) & 1 == 1
    }

    /// Set or clear the button at `index`.
    #[inline]
    pub fn set(&mut self, index: usize, pressed: bool) {
        let mask = Self::button(index).0;
        if pressed {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    /// Get the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Hat switch direction.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hat {
    #[default]
    Centered,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Hat {
    /// HID hat switch value: 0 = up, clockwise in 45 degree steps, 8 = null.
    #[must_use]
    pub const fn hid_value(self) -> u8 {
        match self {
            Hat::Up => 0,
            Hat::UpRight => 1,
            Hat::Right => 2,
            Hat::DownRight => 3,
            Hat::Down => 4,
            Hat::DownLeft => 5,
            Hat::Left => 6,
            Hat::UpLeft => 7,
            Hat::Centered => 8,
        }
    }

    /// Angle in degrees clockwise from up, `None` when centered.
    #[must_use]
    pub const fn degrees(self) -> Option<u16> {
        match self.hid_value() {
            8 => None,
            v => Some(v as u16 * 45),
        }
    }
}

/// Joystick axes driven by the four stick channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
    /// Z rotate.
    Rz,
}

impl Axis {
    /// All axes in report order.
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::Rz];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::Rz => 3,
        }
    }
}

/// Complete joystick snapshot (the mapped output of one mapping cycle).
///
/// Contains:
/// - 4 axes (X, Y, Z, Z rotate), 16-bit unsigned
/// - 1 slider, 16-bit unsigned
/// - 1 hat switch
/// - 32 buttons (bitfield)
///
/// Setters take the wide result of a rescale and keep its low 16 bits,
/// the same truncation a 16-bit HID report field applies.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickState {
    pub axes: [u16; 4],
    pub slider: u16,
    pub hat: Hat,
    pub buttons: Buttons,
}

impl JoystickState {
    /// All axes and the slider at zero, hat centered, no buttons pressed.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            axes: [0; 4],
            slider: 0,
            hat: Hat::Centered,
            buttons: Buttons::NONE,
        }
    }

    #[inline]
    pub fn set_axis(&mut self, axis: Axis, value: i32) {
        self.axes[axis.index()] = value as u16;
    }

    #[inline]
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> u16 {
        self.axes[axis.index()]
    }

    #[inline]
    pub fn set_slider(&mut self, value: i32) {
        self.slider = value as u16;
    }

    #[inline]
    pub fn set_hat(&mut self, hat: Hat) {
        self.hat = hat;
    }

    #[inline]
    pub fn set_button(&mut self, index: usize, pressed: bool) {
        self.buttons.set(index, pressed);
    }

    #[inline]
    #[must_use]
    pub const fn button(&self, index: usize) -> bool {
        self.buttons.is_pressed(index)
    }
}
