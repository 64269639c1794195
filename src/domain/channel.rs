//! Analog channel identifier
//!
//! One channel is one physical thermistor input. Channels are addressed by
//! index so per-channel data can live in plain fixed-size arrays.

use crate::config::CHANNELS;

/// Index past the last analog input
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("channel {0} out of range")]
pub struct InvalidChannel(pub u8);

/// Analog input channel (memory-efficient representation)
///
/// Always in `0..CHANNELS`; build one with [`Channel::new`] or take it from
/// [`Channel::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Channel(u8);

impl Channel {
    /// Every channel, in port order
    pub const ALL: [Channel; CHANNELS] = [
        Channel(0),
        Channel(1),
        Channel(2),
        Channel(3),
        Channel(4),
        Channel(5),
    ];

    /// Create a channel, rejecting indices past the last input
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < CHANNELS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Array index for per-channel data
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Board label for this input
    pub const fn as_str(&self) -> &'static str {
        match self.0 {
            0 => "A0",
            1 => "A1",
            2 => "A2",
            3 => "A3",
            4 => "A4",
            5 => "A5",
            _ => "unknown",
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index).ok_or(InvalidChannel(index))
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> u8 {
        channel.0
    }
}
