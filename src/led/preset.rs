//! Built-in display patterns
//!
//! Presets are immutable and live for the whole program. Each one has a
//! stable raw id and name so a shell or protocol layer can select it.

use super::pattern::{Pattern, Repeat, Step};

const BLINK_SLOW_ON_MS: u32 = 1000;
const BLINK_SLOW_OFF_MS: u32 = 1000;
const BLINK_NORMAL_ON_MS: u32 = 500;
const BLINK_NORMAL_OFF_MS: u32 = 500;
const BLINK_FAST_ON_MS: u32 = 200;
const BLINK_FAST_OFF_MS: u32 = 200;
const PULSE_SHORT_ON_MS: u32 = 100;
const PULSE_SHORT_OFF_MS: u32 = 900;
const PULSE_LONG_ON_MS: u32 = 1000;
const PULSE_LONG_OFF_MS: u32 = 1000;
const HEARTBEAT_BEAT1_MS: u32 = 150;
const HEARTBEAT_GAP1_MS: u32 = 100;
const HEARTBEAT_BEAT2_MS: u32 = 150;
const HEARTBEAT_GAP2_MS: u32 = 600;

const PRESET_NAME_STEADY_OFF: &str = "steady_off";
const PRESET_NAME_STEADY_ON: &str = "steady_on";
const PRESET_NAME_BLINK_SLOW: &str = "blink_slow";
const PRESET_NAME_BLINK_NORMAL: &str = "blink_normal";
const PRESET_NAME_BLINK_FAST: &str = "blink_fast";
const PRESET_NAME_PULSE_SHORT: &str = "pulse_short";
const PRESET_NAME_PULSE_LONG: &str = "pulse_long";
const PRESET_NAME_HEARTBEAT: &str = "heartbeat";

const PRESET_ID_STEADY_OFF: u8 = 0;
const PRESET_ID_STEADY_ON: u8 = 1;
const PRESET_ID_BLINK_SLOW: u8 = 2;
const PRESET_ID_BLINK_NORMAL: u8 = 3;
const PRESET_ID_BLINK_FAST: u8 = 4;
const PRESET_ID_PULSE_SHORT: u8 = 5;
const PRESET_ID_PULSE_LONG: u8 = 6;
const PRESET_ID_HEARTBEAT: u8 = 7;

static STEADY_OFF: Pattern = Pattern::from_parts(&[Step::off_forever()], Repeat::Times(1), 0);

static STEADY_ON: Pattern = Pattern::from_parts(&[Step::on_forever()], Repeat::Times(1), 0);

static BLINK_SLOW: Pattern = Pattern::from_parts(
    &[Step::on(BLINK_SLOW_ON_MS), Step::off(BLINK_SLOW_OFF_MS)],
    Repeat::Infinite,
    0,
);

static BLINK_NORMAL: Pattern = Pattern::from_parts(
    &[Step::on(BLINK_NORMAL_ON_MS), Step::off(BLINK_NORMAL_OFF_MS)],
    Repeat::Infinite,
    0,
);

static BLINK_FAST: Pattern = Pattern::from_parts(
    &[Step::on(BLINK_FAST_ON_MS), Step::off(BLINK_FAST_OFF_MS)],
    Repeat::Infinite,
    0,
);

static PULSE_SHORT: Pattern = Pattern::from_parts(
    &[Step::on(PULSE_SHORT_ON_MS), Step::off(PULSE_SHORT_OFF_MS)],
    Repeat::Infinite,
    0,
);

static PULSE_LONG: Pattern = Pattern::from_parts(
    &[Step::on(PULSE_LONG_ON_MS), Step::off(PULSE_LONG_OFF_MS)],
    Repeat::Infinite,
    0,
);

static HEARTBEAT: Pattern = Pattern::from_parts(
    &[
        Step::on(HEARTBEAT_BEAT1_MS),
        Step::off(HEARTBEAT_GAP1_MS),
        Step::on(HEARTBEAT_BEAT2_MS),
        Step::off(HEARTBEAT_GAP2_MS),
    ],
    Repeat::Infinite,
    0,
);

/// Known presets that can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Preset {
    #[default]
    SteadyOff = PRESET_ID_STEADY_OFF,
    SteadyOn = PRESET_ID_STEADY_ON,
    BlinkSlow = PRESET_ID_BLINK_SLOW,
    BlinkNormal = PRESET_ID_BLINK_NORMAL,
    BlinkFast = PRESET_ID_BLINK_FAST,
    PulseShort = PRESET_ID_PULSE_SHORT,
    PulseLong = PRESET_ID_PULSE_LONG,
    Heartbeat = PRESET_ID_HEARTBEAT,
}

impl Preset {
    /// Every preset, in id order.
    pub const ALL: [Self; 8] = [
        Self::SteadyOff,
        Self::SteadyOn,
        Self::BlinkSlow,
        Self::BlinkNormal,
        Self::BlinkFast,
        Self::PulseShort,
        Self::PulseLong,
        Self::Heartbeat,
    ];

    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            PRESET_ID_STEADY_OFF => Self::SteadyOff,
            PRESET_ID_STEADY_ON => Self::SteadyOn,
            PRESET_ID_BLINK_SLOW => Self::BlinkSlow,
            PRESET_ID_BLINK_NORMAL => Self::BlinkNormal,
            PRESET_ID_BLINK_FAST => Self::BlinkFast,
            PRESET_ID_PULSE_SHORT => Self::PulseShort,
            PRESET_ID_PULSE_LONG => Self::PulseLong,
            PRESET_ID_HEARTBEAT => Self::Heartbeat,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SteadyOff => PRESET_NAME_STEADY_OFF,
            Self::SteadyOn => PRESET_NAME_STEADY_ON,
            Self::BlinkSlow => PRESET_NAME_BLINK_SLOW,
            Self::BlinkNormal => PRESET_NAME_BLINK_NORMAL,
            Self::BlinkFast => PRESET_NAME_BLINK_FAST,
            Self::PulseShort => PRESET_NAME_PULSE_SHORT,
            Self::PulseLong => PRESET_NAME_PULSE_LONG,
            Self::Heartbeat => PRESET_NAME_HEARTBEAT,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            PRESET_NAME_STEADY_OFF => Some(Self::SteadyOff),
            PRESET_NAME_STEADY_ON => Some(Self::SteadyOn),
            PRESET_NAME_BLINK_SLOW => Some(Self::BlinkSlow),
            PRESET_NAME_BLINK_NORMAL => Some(Self::BlinkNormal),
            PRESET_NAME_BLINK_FAST => Some(Self::BlinkFast),
            PRESET_NAME_PULSE_SHORT => Some(Self::PulseShort),
            PRESET_NAME_PULSE_LONG => Some(Self::PulseLong),
            PRESET_NAME_HEARTBEAT => Some(Self::Heartbeat),
            _ => None,
        }
    }

    /// The shared, immutable pattern behind this preset.
    pub fn pattern(self) -> &'static Pattern {
        match self {
            Self::SteadyOff => &STEADY_OFF,
            Self::SteadyOn => &STEADY_ON,
            Self::BlinkSlow => &BLINK_SLOW,
            Self::BlinkNormal => &BLINK_NORMAL,
            Self::BlinkFast => &BLINK_FAST,
            Self::PulseShort => &PULSE_SHORT,
            Self::PulseLong => &PULSE_LONG,
            Self::Heartbeat => &HEARTBEAT,
        }
    }
}
