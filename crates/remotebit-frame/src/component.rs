//! Component tags and ids.
//!
//! The same tag values are reused in both directions: the micro:bit sends
//! Speed (100) and Distance (101) and receives Button (100) and
//! Joystick (101). Any other tag is application-defined.

use std::fmt;
use std::str::FromStr;

use crate::error::{FrameError, Result};

/// Speed readings sent by the micro:bit.
pub const SPEED: u8 = 100;
/// Distance readings sent by the micro:bit.
pub const DISTANCE: u8 = 101;
/// Button state received by the micro:bit.
pub const BUTTON: u8 = 100;
/// Joystick axes received by the micro:bit.
pub const JOYSTICK: u8 = 101;

/// Components the micro:bit sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SendComponent {
    Speed = SPEED,
    Distance = DISTANCE,
}

/// Components the micro:bit receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReceivedComponent {
    Button = BUTTON,
    Joystick = JOYSTICK,
}

impl SendComponent {
    pub fn name(self) -> &'static str {
        match self {
            SendComponent::Speed => "Speed",
            SendComponent::Distance => "Distance",
        }
    }
}

impl ReceivedComponent {
    pub const ALL: [ReceivedComponent; 2] =
        [ReceivedComponent::Button, ReceivedComponent::Joystick];

    pub fn name(self) -> &'static str {
        match self {
            ReceivedComponent::Button => "Button",
            ReceivedComponent::Joystick => "Joystick",
        }
    }
}

impl From<SendComponent> for u8 {
    fn from(component: SendComponent) -> u8 {
        component as u8
    }
}

impl From<ReceivedComponent> for u8 {
    fn from(component: ReceivedComponent) -> u8 {
        component as u8
    }
}

impl FromStr for SendComponent {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "speed" => Ok(SendComponent::Speed),
            "distance" => Ok(SendComponent::Distance),
            _ => Err(FrameError::UnknownComponent(s.to_string())),
        }
    }
}

impl FromStr for ReceivedComponent {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "button" => Ok(ReceivedComponent::Button),
            "joystick" => Ok(ReceivedComponent::Joystick),
            _ => Err(FrameError::UnknownComponent(s.to_string())),
        }
    }
}

/// Parse a component tag from a name in either direction or a number.
pub fn parse_component(s: &str) -> Result<u8> {
    if let Ok(component) = s.parse::<SendComponent>() {
        return Ok(component.into());
    }
    if let Ok(component) = s.parse::<ReceivedComponent>() {
        return Ok(component.into());
    }
    s.trim()
        .parse::<u8>()
        .map_err(|_| FrameError::UnknownComponent(s.to_string()))
}

/// Returns a human-readable name for a component tag.
pub fn component_name(component: u8) -> &'static str {
    match component {
        SPEED => "Speed/Button",
        DISTANCE => "Distance/Joystick",
        _ => "USER",
    }
}

/// Instance id within a component, `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u8);

impl ComponentId {
    pub const MAX: u8 = 15;

    /// All sixteen ids in ascending order.
    pub fn all() -> impl Iterator<Item = ComponentId> {
        (0..=Self::MAX).map(ComponentId)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ComponentId {
    type Error = FrameError;

    fn try_from(id: u8) -> Result<Self> {
        if id > Self::MAX {
            return Err(FrameError::InvalidId(id));
        }
        Ok(Self(id))
    }
}

impl From<ComponentId> for u8 {
    fn from(id: ComponentId) -> u8 {
        id.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID{}", self.0)
    }
}
