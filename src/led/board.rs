//! Board LED table and a GPIO-backed display.

use embedded_hal::digital::StatefulOutputPin;

use super::display::DisplayOps;
use super::intent::LedId;
use super::pattern::Level;

/// Pin level that lights an LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    Low,
    High,
}

/// Static description of one board LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedConfig {
    pub name: &'static str,
    /// Engine channel that drives this LED
    pub channel: LedId,
    pub active: ActiveLevel,
}

/// LEDs fitted on the board, indexed by [`BoardLed`].
pub static BOARD_LEDS: [LedConfig; 3] = [
    LedConfig {
        name: "LED_BLUE",
        channel: LedId::Led0,
        active: ActiveLevel::High,
    },
    LedConfig {
        name: "LED_GREEN",
        channel: LedId::Led1,
        active: ActiveLevel::High,
    },
    LedConfig {
        name: "LED_RED",
        channel: LedId::Led2,
        active: ActiveLevel::High,
    },
];

/// Board-level LED identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BoardLed {
    Blue = 0,
    Green = 1,
    Red = 2,
}

impl BoardLed {
    pub const ALL: [Self; 3] = [Self::Blue, Self::Green, Self::Red];

    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Blue,
            1 => Self::Green,
            2 => Self::Red,
            _ => return None,
        })
    }

    pub fn config(self) -> &'static LedConfig {
        &BOARD_LEDS[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.config().name
    }

    /// Engine channel for this LED.
    pub fn channel(self) -> LedId {
        self.config().channel
    }
}

/// [`DisplayOps`] over a GPIO output pin
pub struct PinDisplay<P> {
    pin: P,
    active: ActiveLevel,
}

impl<P: StatefulOutputPin> PinDisplay<P> {
    pub const fn new(pin: P, active: ActiveLevel) -> Self {
        Self { pin, active }
    }

    /// Build the display for a board LED from its table entry.
    pub fn for_led(pin: P, led: BoardLed) -> Self {
        Self::new(pin, led.config().active)
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, level: Level) -> Result<(), P::Error> {
        let high = match self.active {
            ActiveLevel::High => level.is_on(),
            ActiveLevel::Low => !level.is_on(),
        };
        if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}

impl<P: StatefulOutputPin> DisplayOps for PinDisplay<P> {
    type Error = P::Error;

    fn on(&mut self) -> Result<(), Self::Error> {
        self.drive(Level::On)
    }

    fn off(&mut self) -> Result<(), Self::Error> {
        self.drive(Level::Off)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.pin.toggle()
    }

    fn status(&mut self) -> Result<Level, Self::Error> {
        let high = self.pin.is_set_high()?;
        let on = match self.active {
            ActiveLevel::High => high,
            ActiveLevel::Low => !high,
        };
        Ok(if on { Level::On } else { Level::Off })
    }

    /// Start dark.
    fn prepare(&mut self) -> Result<(), Self::Error> {
        self.drive(Level::Off)
    }
}
