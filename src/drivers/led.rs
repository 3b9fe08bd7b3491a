// WaveCtl — RGB Status LED Driver
//
// Three GPIO-driven channels. Colour vocabulary: green = idle, blue = busy
// (episode tracking), yellow = warning, red = error.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

type Channel = PinDriver<'static, AnyOutputPin, Output>;

pub struct StatusLed {
    r: Channel,
    g: Channel,
    b: Channel,
}

impl StatusLed {
    pub fn new(r: Channel, g: Channel, b: Channel) -> Self {
        Self { r, g, b }
    }

    fn set(&mut self, r: bool, g: bool, b: bool) {
        let _ = if r { self.r.set_high() } else { self.r.set_low() };
        let _ = if g { self.g.set_high() } else { self.g.set_low() };
        let _ = if b { self.b.set_high() } else { self.b.set_low() };
    }

    pub fn idle(&mut self) {
        self.set(false, true, false);
    }

    pub fn busy(&mut self) {
        self.set(false, false, true);
    }

    pub fn warn(&mut self) {
        self.set(true, true, false);
    }

    pub fn error(&mut self) {
        self.set(true, false, false);
    }
}
