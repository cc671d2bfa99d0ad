// ionblade — WS2812 Blade Driver
//
// The blade is a single 87-pixel strip driven over the RMT peripheral. The
// controller only ever asks for three things: a solid palette color, the
// white strike flash, and the power-on ignition sweep.

use std::thread;
use std::time::Duration;

use smart_leds::{SmartLedsWrite, RGB8};
use ws2812_esp32_rmt_driver::Ws2812Esp32Rmt;

use crate::config::*;

pub struct Blade {
    strip: Ws2812Esp32Rmt<'static>,
}

impl Blade {
    pub fn new(strip: Ws2812Esp32Rmt<'static>) -> Self {
        Self { strip }
    }

    /// Solid fill with a palette entry; the index wraps into the palette.
    pub fn set_color(&mut self, index: u8) -> anyhow::Result<()> {
        self.fill(BLADE_COLORS[index as usize % BLADE_COLORS.len()])
    }

    /// Strike accent: full white, held for `hold_ms`, then back to the
    /// active color. Blocks the calling thread for the hold; the control
    /// loop freezes with it.
    pub fn flash_white(&mut self, hold_ms: u32, restore_index: u8) -> anyhow::Result<()> {
        self.fill(FLASH_WHITE)?;
        thread::sleep(Duration::from_millis(u64::from(hold_ms)));
        self.set_color(restore_index)
    }

    /// Power-on sweep: the blade lights from both ends toward the middle,
    /// one pixel pair per step.
    pub fn ignite(&mut self, index: u8) -> anyhow::Result<()> {
        let color = BLADE_COLORS[index as usize % BLADE_COLORS.len()];
        let mut pixels = [RGB8::default(); BLADE_PIXELS];
        for step in 0..IGNITION_STEPS {
            pixels[step] = color;
            pixels[BLADE_PIXELS - step - 1] = color;
            self.strip.write(pixels.iter().cloned())?;
            thread::sleep(Duration::from_millis(IGNITION_STEP_MS));
        }
        Ok(())
    }

    fn fill(&mut self, color: RGB8) -> anyhow::Result<()> {
        self.strip.write((0..BLADE_PIXELS).map(|_| color))?;
        Ok(())
    }
}
