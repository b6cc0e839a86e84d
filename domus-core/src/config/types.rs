//! Per-subsystem configuration
//!
//! Pin fields hold raw numbers as received from the REST front end; they
//! are checked by [`BlockConfig::validate`] before anything is stored.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use super::{validate_pins, BlockConfig, ConfigError};
use crate::storage::BlockType;

/// Maximum hostname length
pub const MAX_HOSTNAME_LEN: usize = 32;

/// Water-flow guard on the shower supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShowerGuardConfig {
    /// Flow sensor input
    pub sensor_pin: u8,
    /// Flow sensor is active-low
    pub sensor_inverted: bool,
    /// Alarm buzzer/relay output
    pub alarm_pin: u8,
    /// Alarm output is active-low
    pub alarm_inverted: bool,
    /// Continuous flow before the alarm sounds (seconds)
    pub alarm_after_s: u16,
}

impl Default for ShowerGuardConfig {
    fn default() -> Self {
        Self {
            sensor_pin: 2,
            sensor_inverted: false,
            alarm_pin: 3,
            alarm_inverted: false,
            alarm_after_s: 900,
        }
    }
}

impl BlockConfig for ShowerGuardConfig {
    const BLOCK: BlockType = BlockType(0x01);

    fn pins(&self) -> Vec<u8, 4> {
        Vec::from_slice(&[self.sensor_pin, self.alarm_pin]).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_pins(&self.pins())?;
        if self.alarm_after_s == 0 {
            return Err(ConfigError::InvalidValue);
        }
        Ok(())
    }
}

/// Electromechanical key box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboxConfig {
    /// Release solenoid output
    pub solenoid_pin: u8,
    /// Door contact input
    pub door_pin: u8,
    /// Door contact is active-low
    pub door_inverted: bool,
    /// Solenoid energize time (ms)
    pub pulse_ms: u16,
}

impl Default for KeyboxConfig {
    fn default() -> Self {
        Self {
            solenoid_pin: 6,
            door_pin: 7,
            door_inverted: true,
            pulse_ms: 500,
        }
    }
}

impl BlockConfig for KeyboxConfig {
    const BLOCK: BlockType = BlockType(0x02);

    fn pins(&self) -> Vec<u8, 4> {
        Vec::from_slice(&[self.solenoid_pin, self.door_pin]).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_pins(&self.pins())?;
        if self.pulse_ms == 0 {
            return Err(ConfigError::InvalidValue);
        }
        Ok(())
    }
}

/// RFID-released door lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfidLockConfig {
    /// Lock actuator output
    pub lock_pin: u8,
    /// Lock output is active-low
    pub lock_inverted: bool,
    /// How long the lock stays released (ms)
    pub unlock_hold_ms: u32,
}

impl Default for RfidLockConfig {
    fn default() -> Self {
        Self {
            lock_pin: 10,
            lock_inverted: false,
            unlock_hold_ms: 3000,
        }
    }
}

impl BlockConfig for RfidLockConfig {
    const BLOCK: BlockType = BlockType(0x03);

    fn pins(&self) -> Vec<u8, 4> {
        Vec::from_slice(&[self.lock_pin]).unwrap_or_default()
    }
}

/// Proportional valve driven from a pulse flow meter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProportionalValveConfig {
    /// Flow meter pulse input
    pub pulse_pin: u8,
    /// Valve motor "open" output
    pub open_pin: u8,
    /// Valve motor "close" output
    pub close_pin: u8,
    /// Flow meter calibration
    pub pulses_per_litre: u16,
    /// Full-stroke travel time (ms)
    pub travel_ms: u32,
}

impl Default for ProportionalValveConfig {
    fn default() -> Self {
        Self {
            pulse_pin: 14,
            open_pin: 15,
            close_pin: 16,
            pulses_per_litre: 450,
            travel_ms: 15_000,
        }
    }
}

impl BlockConfig for ProportionalValveConfig {
    const BLOCK: BlockType = BlockType(0x04);

    fn pins(&self) -> Vec<u8, 4> {
        Vec::from_slice(&[self.pulse_pin, self.open_pin, self.close_pin]).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_pins(&self.pins())?;
        if self.pulses_per_litre == 0 || self.travel_ms == 0 {
            return Err(ConfigError::InvalidValue);
        }
        Ok(())
    }
}

/// Network identity of the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    /// mDNS / DHCP hostname
    pub hostname: String<MAX_HOSTNAME_LEN>,
    /// REST API port
    pub rest_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mut hostname = String::new();
        let _ = hostname.push_str("domus");
        Self {
            hostname,
            rest_port: 80,
        }
    }
}

impl BlockConfig for NetworkConfig {
    const BLOCK: BlockType = BlockType(0x05);

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hostname.is_empty() || self.rest_port == 0 {
            return Err(ConfigError::InvalidValue);
        }
        Ok(())
    }
}
