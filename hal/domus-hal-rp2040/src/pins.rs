//! GPIO allocation by pin number
//!
//! Channels are configured from stored configuration, so pins are looked up
//! by number at runtime instead of being named in code.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{
    PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9, PIN_10, PIN_11,
    PIN_12, PIN_13, PIN_14, PIN_15, PIN_16, PIN_17, PIN_18, PIN_19, PIN_20, PIN_21, PIN_22,
    PIN_23, PIN_24, PIN_25, PIN_26, PIN_27, PIN_28, PIN_29,
};
use embassy_rp::Peri;

/// Number of user GPIOs on the RP2040
pub const BANK_SIZE: usize = 30;

/// Pin bank that holds every GPIO and hands them out by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; BANK_SIZE],
}

impl PinBank {
    /// Take ownership of all GPIO pins
    pub fn new(p: PinBankPeripherals) -> Self {
        Self {
            pins: [
                Some(p.pin0.into()),
                Some(p.pin1.into()),
                Some(p.pin2.into()),
                Some(p.pin3.into()),
                Some(p.pin4.into()),
                Some(p.pin5.into()),
                Some(p.pin6.into()),
                Some(p.pin7.into()),
                Some(p.pin8.into()),
                Some(p.pin9.into()),
                Some(p.pin10.into()),
                Some(p.pin11.into()),
                Some(p.pin12.into()),
                Some(p.pin13.into()),
                Some(p.pin14.into()),
                Some(p.pin15.into()),
                Some(p.pin16.into()),
                Some(p.pin17.into()),
                Some(p.pin18.into()),
                Some(p.pin19.into()),
                Some(p.pin20.into()),
                Some(p.pin21.into()),
                Some(p.pin22.into()),
                Some(p.pin23.into()),
                Some(p.pin24.into()),
                Some(p.pin25.into()),
                Some(p.pin26.into()),
                Some(p.pin27.into()),
                Some(p.pin28.into()),
                Some(p.pin29.into()),
            ],
        }
    }

    /// Take a pin by number
    ///
    /// Returns `None` if the number is out of range or the pin is already
    /// out of the bank.
    pub fn take(&mut self, pin: u8) -> Option<Peri<'static, AnyPin>> {
        self.pins.get_mut(pin as usize)?.take()
    }
}

/// GPIO pins moved out of `embassy_rp::Peripherals` for the [`PinBank`]
pub struct PinBankPeripherals {
    pub pin0: Peri<'static, PIN_0>,
    pub pin1: Peri<'static, PIN_1>,
    pub pin2: Peri<'static, PIN_2>,
    pub pin3: Peri<'static, PIN_3>,
    pub pin4: Peri<'static, PIN_4>,
    pub pin5: Peri<'static, PIN_5>,
    pub pin6: Peri<'static, PIN_6>,
    pub pin7: Peri<'static, PIN_7>,
    pub pin8: Peri<'static, PIN_8>,
    pub pin9: Peri<'static, PIN_9>,
    pub pin10: Peri<'static, PIN_10>,
    pub pin11: Peri<'static, PIN_11>,
    pub pin12: Peri<'static, PIN_12>,
    pub pin13: Peri<'static, PIN_13>,
    pub pin14: Peri<'static, PIN_14>,
    pub pin15: Peri<'static, PIN_15>,
    pub pin16: Peri<'static, PIN_16>,
    pub pin17: Peri<'static, PIN_17>,
    pub pin18: Peri<'static, PIN_18>,
    pub pin19: Peri<'static, PIN_19>,
    pub pin20: Peri<'static, PIN_20>,
    pub pin21: Peri<'static, PIN_21>,
    pub pin22: Peri<'static, PIN_22>,
    pub pin23: Peri<'static, PIN_23>,
    pub pin24: Peri<'static, PIN_24>,
    pub pin25: Peri<'static, PIN_25>,
    pub pin26: Peri<'static, PIN_26>,
    pub pin27: Peri<'static, PIN_27>,
    pub pin28: Peri<'static, PIN_28>,
    pub pin29: Peri<'static, PIN_29>,
}

impl PinBankPeripherals {
    /// Split the GPIO pins off the peripherals
    ///
    /// Returns the pins and the remaining non-GPIO peripherals.
    pub fn from_peripherals(p: embassy_rp::Peripherals) -> (Self, RemainingPeripherals) {
        let pins = Self {
            pin0: p.PIN_0,
            pin1: p.PIN_1,
            pin2: p.PIN_2,
            pin3: p.PIN_3,
            pin4: p.PIN_4,
            pin5: p.PIN_5,
            pin6: p.PIN_6,
            pin7: p.PIN_7,
            pin8: p.PIN_8,
            pin9: p.PIN_9,
            pin10: p.PIN_10,
            pin11: p.PIN_11,
            pin12: p.PIN_12,
            pin13: p.PIN_13,
            pin14: p.PIN_14,
            pin15: p.PIN_15,
            pin16: p.PIN_16,
            pin17: p.PIN_17,
            pin18: p.PIN_18,
            pin19: p.PIN_19,
            pin20: p.PIN_20,
            pin21: p.PIN_21,
            pin22: p.PIN_22,
            pin23: p.PIN_23,
            pin24: p.PIN_24,
            pin25: p.PIN_25,
            pin26: p.PIN_26,
            pin27: p.PIN_27,
            pin28: p.PIN_28,
            pin29: p.PIN_29,
        };
        let remaining = RemainingPeripherals { flash: p.FLASH };
        (pins, remaining)
    }
}

/// Non-GPIO peripherals that remain after creating the [`PinBank`]
pub struct RemainingPeripherals {
    /// Backs the [`FlashEeprom`](crate::FlashEeprom)
    pub flash: Peri<'static, embassy_rp::peripherals::FLASH>,
}
