//! Channel-to-joystick mapping.
//!
//! Receiver channels are rescaled linearly from per-source calibration
//! endpoints to the 16-bit HID range. Three-position switch channels are
//! rescaled to `{0, 1, 2}` and expanded into three mutually exclusive
//! buttons. Nothing here clamps: a raw value outside the calibration
//! range extrapolates past the output range.

use crate::types::{Axis, Hat, JoystickState, Source, MAX_BUTTONS, MAX_CHANNELS};

/// Lower CRSF endpoint in microseconds.
pub const US_MIN: u16 = 988;

/// Upper CRSF endpoint in microseconds.
pub const US_MAX: u16 = 2011;

/// Lower SBUS endpoint in raw 11-bit units.
pub const SBUS_MIN: u16 = 172;

/// Upper SBUS endpoint in raw 11-bit units.
pub const SBUS_MAX: u16 = 1811;

/// HID axis range.
pub const AXIS_MIN: i32 = 0;
pub const AXIS_MAX: i32 = 65535;

/// Groups beyond this would not fit in [`MAX_BUTTONS`].
pub const MAX_BUTTON_GROUPS: usize = MAX_BUTTONS / 3;

/// Raw endpoints that span full stick travel for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub min: u16,
    pub max: u16,
}

impl Calibration {
    #[must_use]
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Rescale `raw` from this calibration onto `out_min..=out_max`.
    #[inline]
    #[must_use]
    pub fn scale(&self, raw: u16, out_min: i32, out_max: i32) -> i32 {
        map(
            i32::from(raw),
            i32::from(self.min),
            i32::from(self.max),
            out_min,
            out_max,
        )
    }
}

/// CRSF channels arrive in microseconds.
pub const CRSF_CALIBRATION: Calibration = Calibration::new(US_MIN, US_MAX);

/// SBUS channels arrive as raw 11-bit values.
pub const SBUS_CALIBRATION: Calibration = Calibration::new(SBUS_MIN, SBUS_MAX);

/// Calibration endpoints for the source that wrote the channel vector.
#[must_use]
pub const fn calibration_for(source: Source) -> Calibration {
    match source {
        Source::Crsf => CRSF_CALIBRATION,
        Source::Sbus => SBUS_CALIBRATION,
    }
}

/// Affine rescale of `x` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Integer arithmetic truncating toward zero, unclamped. A degenerate
/// input range (`in_min == in_max`) returns `out_min`.
#[must_use]
pub fn map(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let in_span = i64::from(in_max) - i64::from(in_min);
    if in_span == 0 {
        return out_min;
    }
    let out_span = i64::from(out_max) - i64::from(out_min);
    ((i64::from(x) - i64::from(in_min)) * out_span / in_span + i64::from(out_min)) as i32
}

/// Rescale a switch channel onto the three-position domain.
///
/// Valid switch travel lands in `{0, 1, 2}`; anything else is returned
/// as computed.
#[inline]
#[must_use]
pub fn switch_position(raw: u16, calibration: &Calibration) -> i32 {
    calibration.scale(raw, 0, 2)
}

/// Expand a switch position into its three buttons.
///
/// Exactly one output is set for positions 0, 1 and 2; none otherwise.
#[inline]
#[must_use]
pub const fn tri_state(position: i32) -> [bool; 3] {
    [position == 0, position == 1, position == 2]
}

/// Hat directions selected by a three-position switch.
pub const HAT_TABLE: [Hat; 3] = [Hat::UpLeft, Hat::UpRight, Hat::Centered];

/// Look up the hat direction for a switch position.
///
/// Positions outside the table leave the hat centered.
#[must_use]
pub fn hat_from_position(position: i32) -> Hat {
    usize::try_from(position)
        .ok()
        .and_then(|i| HAT_TABLE.get(i).copied())
        .unwrap_or(Hat::Centered)
}

/// Number of switch groups wired for an `n`-channel receiver.
#[must_use]
pub const fn default_button_groups(n: usize) -> usize {
    let groups = n.saturating_sub(4) / 3 + 1;
    if groups > MAX_BUTTON_GROUPS {
        MAX_BUTTON_GROUPS
    } else {
        groups
    }
}

/// Channel mapping configuration.
///
/// Customize this at compile-time by creating your own const.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMapping {
    /// Channel index feeding X, Y, Z and Z rotate.
    pub axes: [usize; 4],
    /// Channel index for the slider, if any.
    pub slider: Option<usize>,
    /// Three-position channel driving the hat, if any.
    pub hat: Option<usize>,
    /// Channel of the first three-position switch group.
    pub first_switch: usize,
    /// Number of consecutive switch channels, three buttons each.
    pub switch_groups: usize,
}

/// Default mapping.
///
/// - CH1 -> X
/// - CH2 -> Y
/// - CH3 -> Z
/// - CH4 -> Z rotate
/// - CH5-CH9 -> buttons 1-15, three per switch
pub const DEFAULT_MAPPING: ChannelMapping = ChannelMapping {
    axes: [0, 1, 2, 3],
    slider: None,
    hat: None,
    first_switch: 4,
    switch_groups: default_button_groups(MAX_CHANNELS),
};

/// Map a channel vector to a joystick state.
///
/// Channel indices outside the vector leave the corresponding field at its
/// zeroed value.
#[must_use]
pub fn channels_to_joystick<const N: usize>(
    channels: &[u16; N],
    calibration: &Calibration,
    mapping: &ChannelMapping,
) -> JoystickState {
    let mut state = JoystickState::zeroed();

    for (axis, &channel) in Axis::ALL.iter().zip(mapping.axes.iter()) {
        if let Some(&raw) = channels.get(channel) {
            state.set_axis(*axis, calibration.scale(raw, AXIS_MIN, AXIS_MAX));
        }
    }

    if let Some(&raw) = mapping.slider.and_then(|ch| channels.get(ch)) {
        state.set_slider(calibration.scale(raw, AXIS_MIN, AXIS_MAX));
    }

    if let Some(&raw) = mapping.hat.and_then(|ch| channels.get(ch)) {
        state.set_hat(hat_from_position(switch_position(raw, calibration)));
    }

    let groups = mapping.switch_groups.min(MAX_BUTTON_GROUPS);
    for group in 0..groups {
        let Some(&raw) = channels.get(mapping.first_switch + group) else {
            break;
        };
        let position = switch_position(raw, calibration);
        for (k, pressed) in tri_state(position).into_iter().enumerate() {
            state.set_button(group * 3 + k, pressed);
        }
    }

    state
}
