//! Receiver inputs.
//!
//! Each receiver has a reader that owns its UART and decoder, and a
//! provider that the bridge task polls. The two halves meet in a
//! [`Signal`]: a reader overwrites whatever is pending, so the bridge only
//! ever sees the newest frame.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

pub mod crsf;
pub mod sbus;

pub use crsf::{CrsfReader, CrsfSignalProvider};
pub use sbus::{SbusReader, SbusSignalProvider};

/// Latest CRSF channels in microseconds.
pub type CrsfSignal = Signal<CriticalSectionRawMutex, [u16; crsf_proto::CRSF_CHANNELS]>;

/// Latest SBUS frame.
pub type SbusSignal = Signal<CriticalSectionRawMutex, sbus_proto::SbusFrame<{ sbus_proto::SBUS_CHANNELS }>>;
