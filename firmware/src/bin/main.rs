#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART0, UART1, USB};
use embassy_rp::uart::{Config as UartConfig, Uart, UartRx};
use embassy_rp::usb::Driver;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use rc_usb_joystick::config::{
    CHANNELS, CRSF_BAUDRATE, LATENCY_STEPS, MAPPING, OUTPUT_MODE, TELEMETRY_BATTERY,
    TELEMETRY_INTERVAL_MS, TICK_MS, USB_PID, USB_VID,
};
use rc_usb_joystick::input::sbus::sbus_uart_config;
use rc_usb_joystick::{
    configure_usb_hid, CrsfReader, CrsfSignal, CrsfSignalProvider, CrsfUplink, JoystickBridge,
    LinkState, OutputPacer, SbusReader, SbusSignal, SbusSignalProvider, SourceArbiter,
    TelemetrySynthesizer, TickOutcome, UsbHidOutput, UsbStateHandler,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => embassy_rp::uart::InterruptHandler<UART0>;
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

type Bridge = JoystickBridge<
    CrsfSignalProvider,
    SbusSignalProvider,
    Output<'static>,
    UsbHidOutput<'static>,
    CrsfUplink<'static>,
    CHANNELS,
    LATENCY_STEPS,
>;

/// Signals from the receiver tasks to the bridge task.
/// Using Signal instead of Channel provides "latest value wins" semantics;
/// a frame the bridge has not picked up yet is simply replaced.
static CRSF_SIGNAL: StaticCell<CrsfSignal> = StaticCell::new();
static SBUS_SIGNAL: StaticCell<SbusSignal> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

/// Tracks whether the host has configured the device.
static USB_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RC-USB-Joystick starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let crsf_signal: &'static CrsfSignal = CRSF_SIGNAL.init(Signal::new());
    let sbus_signal: &'static SbusSignal = SBUS_SIGNAL.init(Signal::new());

    // --- CRSF UART (bidirectional) ---
    let mut crsf_config = UartConfig::default();
    crsf_config.baudrate = CRSF_BAUDRATE;

    let crsf_uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        crsf_config,
    );
    let (crsf_tx, crsf_rx) = crsf_uart.split();
    let crsf_reader = CrsfReader::new(crsf_rx);
    let uplink = CrsfUplink::new(crsf_tx);

    // --- SBUS UART (RX only, inverted) ---
    let sbus_rx = UartRx::new(p.UART0, p.PIN_1, Irqs, p.DMA_CH2, sbus_uart_config());
    let sbus_reader = SbusReader::new(sbus_rx);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(USB_VID, USB_PID);
    usb_config.manufacturer = Some("Rust Joystick");
    usb_config.product = Some("RC-USB Joystick");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    // Configure HID class
    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(&mut builder, hid_state);
    builder.handler(USB_HANDLER.init(UsbStateHandler));

    // Build the USB device
    let usb_device = builder.build();

    let usb_output = UsbHidOutput::new(hid_writer);

    // On-board LED on Pico: lit while the CRSF link is up
    let led = Output::new(p.PIN_25, Level::Low);

    let arbiter = SourceArbiter::new(
        CrsfSignalProvider::new(crsf_signal),
        SbusSignalProvider::new(sbus_signal),
        led,
    );
    let bridge: Bridge = JoystickBridge::new(
        arbiter,
        MAPPING,
        OutputPacer::new(OUTPUT_MODE),
        TelemetrySynthesizer::new(TELEMETRY_INTERVAL_MS, TELEMETRY_BATTERY),
        usb_output,
        uplink,
    );

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(crsf_rx_task(crsf_reader, crsf_signal).unwrap());
    spawner.spawn(sbus_rx_task(sbus_reader, sbus_signal).unwrap());
    spawner.spawn(bridge_task(bridge).unwrap());

    info!("RC-USB-Joystick initialized, waiting for receivers...");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// CRSF task - decodes UART1 and signals the latest channels.
#[embassy_executor::task]
async fn crsf_rx_task(mut reader: CrsfReader<'static>, signal: &'static CrsfSignal) {
    reader.run(signal).await
}

/// SBUS task - decodes UART0 and signals the latest frame.
#[embassy_executor::task]
async fn sbus_rx_task(mut reader: SbusReader<'static>, signal: &'static SbusSignal) {
    reader.run(signal).await
}

/// Bridge task - ticks the pipeline at a fixed rate.
#[embassy_executor::task]
async fn bridge_task(mut bridge: Bridge) {
    // Reports are dropped until the host configures the device; the link
    // LED and telemetry run regardless.
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    let mut link = LinkState::Down;
    let mut flags = SbusFlags::default();
    let mut failing = false;

    loop {
        ticker.next().await;

        let result = bridge.tick(Instant::now().as_millis()).await;

        // A failed tick may still have changed the link.
        let now_link = bridge.arbiter().link_state();
        if now_link != link {
            link = now_link;
            match link {
                LinkState::Up => info!("CRSF link up"),
                LinkState::Down => info!("CRSF link down, falling back to SBUS"),
            }
        }

        // The outcome is kept even when the sink failed.
        report_flags(bridge.last_outcome(), &mut flags);

        match result {
            Ok(_) => failing = false,
            Err(e) => {
                // Log once per failure streak; the pipeline keeps running.
                if !failing {
                    warn!("Bridge error: {:?}", e);
                    failing = true;
                }
            }
        }
    }
}

/// Flags seen on the last SBUS frame.
#[derive(Default)]
struct SbusFlags {
    failsafe: bool,
    frame_lost: bool,
}

fn report_flags(outcome: &TickOutcome, flags: &mut SbusFlags) {
    let Some(update) = outcome.update else {
        return;
    };

    if update.failsafe != flags.failsafe {
        flags.failsafe = update.failsafe;
        if update.failsafe {
            warn!("SBUS receiver in failsafe");
        } else {
            info!("SBUS receiver out of failsafe");
        }
    }

    if update.frame_lost != flags.frame_lost {
        flags.frame_lost = update.frame_lost;
        if update.frame_lost {
            warn!("SBUS frame lost");
        } else {
            info!("SBUS frames recovered");
        }
    }
}
