//! USB HID joystick output implementation.

use defmt::{info, Format};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::{Builder, Handler};
use joystick_core::{Axis, JoystickState, OutputError, OutputSink};
use portable_atomic::{AtomicBool, Ordering};

/// Set while the host has the device configured.
static CONFIGURED: AtomicBool = AtomicBool::new(false);
/// Set while the bus is suspended.
static SUSPENDED: AtomicBool = AtomicBool::new(false);

/// HID writer for the joystick report.
pub type JoystickWriter<'d> = HidWriter<'d, Driver<'d, USB>, { JoystickReport::SIZE }>;

/// USB HID joystick report structure.
///
/// This matches the HID report descriptor defined below.
/// Total size: 16 bytes (axes: 4x2, slider: 2, hat: 1, pad: 1, buttons: 4)
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
#[repr(C)]
pub struct JoystickReport {
    pub x: u16,
    pub y: u16,
    pub z: u16,
    /// Z rotation
    pub rz: u16,
    pub slider: u16,
    /// Low nibble only; 8 is the null state.
    pub hat: u8,
    /// Button bitfield (32 buttons)
    pub buttons: u32,
}

impl JoystickReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 16;

    /// Convert the report to bytes.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.x.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.y.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.z.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.rz.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.slider.to_le_bytes());
        bytes[10] = self.hat & 0x0F;
        // bytes[11] is padding
        bytes[12..16].copy_from_slice(&self.buttons.to_le_bytes());
        bytes
    }
}

impl From<&JoystickState> for JoystickReport {
    fn from(state: &JoystickState) -> Self {
        Self {
            x: state.axis(Axis::X),
            y: state.axis(Axis::Y),
            z: state.axis(Axis::Z),
            rz: state.axis(Axis::Rz),
            slider: state.slider,
            hat: state.hat.hid_value(),
            buttons: state.buttons.raw(),
        }
    }
}

/// HID Joystick Report Descriptor.
///
/// This descriptor defines a joystick with:
/// - X, Y, Z, Rz and a slider (unsigned 16-bit)
/// - 1 hat switch (8 directions plus null)
/// - 32 buttons
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Axes and slider ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x09, 0x36, //   Usage (Slider)
    0x15, 0x00, //   Logical Minimum (0)
    0x27, 0xFF, 0xFF, 0x00, 0x00, //   Logical Maximum (65535)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x10, //   Report Size (16)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Hat switch ---
    0x09, 0x39, //   Usage (Hat switch)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x07, //   Logical Maximum (7)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14, //   Unit (Eng Rot: Degrees)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x04, //   Report Size (4)
    0x81, 0x42, //   Input (Data, Variable, Absolute, Null State)
    0x65, 0x00, //   Unit (None)
    0x75, 0x0C, //   Report Size (12)
    0x81, 0x03, //   Input (Constant) - padding
    //
    // --- Buttons (32 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x20, //   Usage Maximum (Button 32)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x45, 0x00, //   Physical Maximum (0)
    0x95, 0x20, //   Report Count (32)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

/// Device state callbacks from the USB stack.
///
/// Register with [`Builder::handler`] so [`UsbHidOutput`] knows when the
/// host is listening.
pub struct UsbStateHandler;

impl Handler for UsbStateHandler {
    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
        SUSPENDED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        if configured {
            info!("USB configured by host");
        } else {
            info!("USB deconfigured");
        }
    }

    fn suspended(&mut self, suspended: bool) {
        SUSPENDED.store(suspended, Ordering::Relaxed);
    }
}

/// USB HID joystick output.
///
/// Wraps an embassy-usb HID writer. Reports go out only through
/// [`OutputSink::send`]; building a [`JoystickState`] never transmits.
pub struct UsbHidOutput<'d> {
    writer: JoystickWriter<'d>,
}

impl<'d> UsbHidOutput<'d> {
    /// Create a new USB HID output from the given HID writer.
    pub fn new(writer: JoystickWriter<'d>) -> Self {
        Self { writer }
    }
}

impl OutputSink for UsbHidOutput<'_> {
    async fn send(&mut self, state: &JoystickState) -> Result<(), OutputError> {
        if !self.is_ready() {
            return Err(OutputError::NotReady);
        }
        let report = JoystickReport::from(state);
        self.writer
            .write(&report.as_bytes())
            .await
            .map_err(|_| OutputError::Io)
    }

    fn is_ready(&self) -> bool {
        CONFIGURED.load(Ordering::Relaxed) && !SUSPENDED.load(Ordering::Relaxed)
    }
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the HID writer for use by the application.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
) -> JoystickWriter<'d> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        // No output or feature reports.
        request_handler: None,
        poll_ms: 1,
        max_packet_size: JoystickReport::SIZE as u16,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}
