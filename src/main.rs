//! ble2uart firmware entry point (nRF52840 + SoftDevice S140).
//!
//! Tasks:
//! - `softdevice_task` - runs the SoftDevice event loop
//! - `radio_task`      - owns the BLE scanner
//! - `uart_rx_task`    - reads host bytes until the line idles
//! - `uart_tx_task`    - writes one frame at a time
//! - `led_task`        - status LED blinks
//! - `gateway_task`    - all gateway logic, run-to-completion per event

#![no_std]
#![no_main]

mod board;

use ble2uart::config::{
    Baudrate, BoardFeatures, UART_BAUDRATE, WATCHDOG_INTERVAL_MS,
};
use ble2uart::driver::Board;
use ble2uart::uart::UartEvent;
use ble2uart::{Gateway, MacAddress};
use board::{HardwareWatchdog, HostLink, Inbound, Led, Nrf52840, PaLna, SoftdeviceRadio, INBOUND};
use defmt::{error, info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::{bind_interrupts, pac, peripherals, uarte, wdt};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

/// nRF52840 dongle: Long Range capable, no external front end.
const BOARD_FEATURES: BoardFeatures = BoardFeatures {
    coded_phy_supported: true,
    pa_lna: false,
};

static GATEWAY: StaticCell<Gateway<Nrf52840>> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn gateway_task(gateway: &'static mut Gateway<Nrf52840>) -> ! {
    if let Err(e) = gateway.boot() {
        error!("initial scan start failed: {}", e);
    }
    gateway.run_pending();

    loop {
        match INBOUND.receive().await {
            Inbound::Radio(event) => gateway.on_radio_event(event),
            Inbound::UartRx(bytes) => gateway.on_uart_event(UartEvent::Received(&bytes)),
            Inbound::UartSent => gateway.on_uart_event(UartEvent::Sent),
        }
        gateway.run_pending();
    }
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        // Observer only: one central role for scanning, no connections.
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 0,
            periph_role_count: 0,
            central_role_count: 1,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        ..Default::default()
    }
}

/// FICR device id, used as the serial link identifier.
fn device_id() -> u64 {
    let lo = pac::FICR.deviceid(0).read() as u64;
    let hi = pac::FICR.deviceid(1).read() as u64;
    (hi << 32) | lo
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ble2uart starting");

    // The SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);
    interrupt::UARTE0_UART0.set_priority(Priority::P3);

    let sd = Softdevice::enable(&softdevice_config());
    unwrap!(spawner.spawn(softdevice_task(sd)));
    let address = MacAddress(nrf_softdevice::ble::get_address(sd).bytes());
    info!("radio address {}", address);

    // Watchdog
    let mut wdt_config = wdt::Config::default();
    wdt_config.timeout_ticks = 32768 * (WATCHDOG_INTERVAL_MS / 1000);
    wdt_config.action_during_sleep = wdt::SleepConfig::RUN;
    wdt_config.action_during_debug_halt = wdt::HaltConfig::PAUSE;
    let (_wdt, [wdt_handle]) = match wdt::Watchdog::try_new(p.WDT, wdt_config) {
        Ok(x) => x,
        Err(_) => {
            // Already running from before a soft reset; it will bite.
            error!("watchdog already active, waiting for reset");
            loop {
                cortex_m::asm::wfe();
            }
        }
    };

    // UART
    let mut uart_config = uarte::Config::default();
    uart_config.parity = uarte::Parity::EXCLUDED;
    uart_config.baudrate = board::serial::uarte_baudrate(Baudrate::from_board(UART_BAUDRATE));
    let uart = uarte::Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uart_config);
    let (tx, rx) = uart.split_with_idle(p.TIMER1, p.PPI_CH0, p.PPI_CH1);
    unwrap!(spawner.spawn(board::serial::uart_rx_task(rx)));
    unwrap!(spawner.spawn(board::serial::uart_tx_task(tx)));

    // LED (active low, start off)
    let led = Output::new(p.P0_13, Level::High, OutputDrive::Standard);
    unwrap!(spawner.spawn(board::indicator::led_task(led)));

    // PA/LNA lines; only driven when the board has a front end.
    let pa_lna = PaLna {
        crx: Output::new(p.P0_17, Level::Low, OutputDrive::Standard),
        csd: Output::new(p.P0_19, Level::Low, OutputDrive::Standard),
    };

    unwrap!(spawner.spawn(board::radio::radio_task(sd)));

    let gateway = GATEWAY.init(Gateway::new(
        Board {
            radio: SoftdeviceRadio::new(address),
            amplifier: pa_lna,
            serial: HostLink::new(device_id()),
            indicator: Led,
            watchdog: HardwareWatchdog { handle: wdt_handle },
        },
        BOARD_FEATURES,
    ));
    unwrap!(spawner.spawn(gateway_task(gateway)));
}
