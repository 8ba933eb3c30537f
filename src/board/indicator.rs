//! Status LED.

use ble2uart::driver::Indicator;
use ble2uart::error::DriverError;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;

/// Blink length in ms; 0 turns the LED off.
static LED_CTRL: Signal<CriticalSectionRawMutex, u16> = Signal::new();

pub struct Led;

impl Indicator for Led {
    fn blink_stop(&mut self) -> Result<(), DriverError> {
        LED_CTRL.signal(0);
        Ok(())
    }

    fn blink_once(&mut self, duration_ms: u16) -> Result<(), DriverError> {
        LED_CTRL.signal(duration_ms);
        Ok(())
    }
}

/// Drives the LED (active low).
#[embassy_executor::task]
pub async fn led_task(mut led: Output<'static>) -> ! {
    loop {
        let duration_ms = LED_CTRL.wait().await;
        if duration_ms == 0 {
            led.set_high();
            continue;
        }

        led.set_low();
        match select(Timer::after_millis(duration_ms as u64), LED_CTRL.wait()).await {
            Either::First(()) => led.set_high(),
            Either::Second(next) => {
                led.set_high();
                LED_CTRL.signal(next);
            }
        }
    }
}
