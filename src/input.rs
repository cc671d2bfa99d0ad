// ionblade — Color Button
//
// Thin wrapper over the button GPIO: pull-up configuration plus a level
// read. The 300 ms accept window lives in the controller, which owns the
// cycle clock.

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use crate::config::PIN_BUTTON;

pub struct Button<'d> {
    pin: PinDriver<'d, AnyInputPin, Input>,
}

impl<'d> Button<'d> {
    /// Takes an already-created input driver and enables the internal
    /// pull-up. The driver constructor sets the direction; the pull mode
    /// goes through the raw API because the pin type is already downgraded.
    pub fn new(pin: PinDriver<'d, AnyInputPin, Input>) -> Self {
        unsafe {
            esp_idf_sys::gpio_set_pull_mode(
                PIN_BUTTON,
                esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY,
            );
        }
        Self { pin }
    }

    /// Active LOW with pull-up: a low level means pressed.
    pub fn is_pressed(&self) -> bool {
        self.pin.is_low()
    }
}
