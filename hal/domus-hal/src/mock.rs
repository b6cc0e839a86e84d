//! Host-side hardware doubles
//!
//! Used by the unit tests of crates built on these traits. `MockGpio`
//! behaves like a pin controller that records configuration and can raise
//! an edge on demand; `MemEeprom` keeps pending and durable contents apart
//! so a power cycle can be simulated.

use crate::eeprom::{check_bounds, Eeprom, EepromError, ERASED_BYTE};
use crate::gpio::{Edge, GpioDriver, InterruptVector, PinMode};

/// Number of pins the mock controller models
pub const MOCK_PIN_COUNT: usize = 40;

/// Interrupt vector attached to a mock pin
#[derive(Debug, Clone, Copy)]
pub struct Attachment {
    /// Entry point invoked when the pin fires
    pub vector: InterruptVector,
    /// Edge the vector was attached to
    pub edge: Edge,
}

/// Recording GPIO controller
#[derive(Debug)]
pub struct MockGpio {
    modes: [Option<PinMode>; MOCK_PIN_COUNT],
    attachments: [Option<Attachment>; MOCK_PIN_COUNT],
    attach_calls: usize,
    detach_calls: usize,
}

impl Default for MockGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGpio {
    /// Create a controller with every pin unconfigured
    pub const fn new() -> Self {
        Self {
            modes: [None; MOCK_PIN_COUNT],
            attachments: [None; MOCK_PIN_COUNT],
            attach_calls: 0,
            detach_calls: 0,
        }
    }

    /// Last mode set on a pin
    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.modes.get(pin as usize).copied().flatten()
    }

    /// Vector and edge currently attached to a pin
    pub fn attachment(&self, pin: u8) -> Option<Attachment> {
        self.attachments.get(pin as usize).copied().flatten()
    }

    /// Vector currently attached to a pin
    pub fn vector(&self, pin: u8) -> Option<InterruptVector> {
        self.attachment(pin).map(|a| a.vector)
    }

    /// Number of pins with an attached vector
    pub fn attached_count(&self) -> usize {
        self.attachments.iter().filter(|a| a.is_some()).count()
    }

    /// Total `attach_interrupt` calls seen
    pub fn attach_calls(&self) -> usize {
        self.attach_calls
    }

    /// Total `detach_interrupt` calls seen
    pub fn detach_calls(&self) -> usize {
        self.detach_calls
    }

    /// Raise the attached edge on a pin, as the hardware would
    ///
    /// Returns false if nothing is attached.
    pub fn fire(&self, pin: u8) -> bool {
        match self.vector(pin) {
            Some(vector) => {
                vector();
                true
            }
            None => false,
        }
    }
}

impl GpioDriver for MockGpio {
    fn configure(&mut self, pin: u8, mode: PinMode) {
        if let Some(slot) = self.modes.get_mut(pin as usize) {
            *slot = Some(mode);
        }
        if let Some(slot) = self.attachments.get_mut(pin as usize) {
            *slot = None;
        }
    }

    fn attach_interrupt(&mut self, pin: u8, vector: InterruptVector, edge: Edge) {
        self.attach_calls += 1;
        if let Some(slot) = self.attachments.get_mut(pin as usize) {
            *slot = Some(Attachment { vector, edge });
        }
    }

    fn detach_interrupt(&mut self, pin: u8) {
        self.detach_calls += 1;
        if let Some(slot) = self.attachments.get_mut(pin as usize) {
            *slot = None;
        }
    }
}

/// RAM-backed EEPROM with explicit durability
///
/// Writes land in a pending buffer; `commit` copies them to the durable
/// buffer. `power_cycle` drops anything not committed.
#[derive(Debug, Clone)]
pub struct MemEeprom<const N: usize> {
    pending: [u8; N],
    durable: [u8; N],
    commits: usize,
    fail_commit: bool,
}

impl<const N: usize> Default for MemEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemEeprom<N> {
    /// Create an erased device
    pub const fn new() -> Self {
        Self {
            pending: [ERASED_BYTE; N],
            durable: [ERASED_BYTE; N],
            commits: 0,
            fail_commit: false,
        }
    }

    /// Create a device whose durable contents start with `bytes`
    pub fn with_contents(bytes: &[u8]) -> Self {
        let mut eeprom = Self::new();
        let len = bytes.len().min(N);
        eeprom.durable[..len].copy_from_slice(&bytes[..len]);
        eeprom.pending = eeprom.durable;
        eeprom
    }

    /// Contents that would survive a power cycle
    pub fn durable(&self) -> &[u8; N] {
        &self.durable
    }

    /// Number of successful commits
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Make subsequent commits fail
    pub fn set_commit_failure(&mut self, fail: bool) {
        self.fail_commit = fail;
    }

    /// Overwrite a durable byte directly (bit rot, foreign firmware)
    pub fn corrupt(&mut self, offset: usize, byte: u8) {
        if offset < N {
            self.durable[offset] = byte;
            self.pending[offset] = byte;
        }
    }

    /// Lose power: drop uncommitted writes
    pub fn power_cycle(&mut self) {
        self.pending = self.durable;
    }
}

impl<const N: usize> Eeprom for MemEeprom<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError> {
        check_bounds(offset, buffer.len(), N)?;
        buffer.copy_from_slice(&self.pending[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        check_bounds(offset, data.len(), N)?;
        self.pending[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        if self.fail_commit {
            return Err(EepromError::NotCommitted);
        }
        self.durable = self.pending;
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FIRED: AtomicUsize = AtomicUsize::new(0);

    fn vector() {
        FIRED.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_mock_gpio_records_and_fires() {
        let mut gpio = MockGpio::new();
        gpio.configure(4, PinMode::InputPullUp);
        assert_eq!(gpio.mode(4), Some(PinMode::InputPullUp));
        assert!(!gpio.fire(4));

        gpio.attach_interrupt(4, vector, Edge::Falling);
        assert_eq!(gpio.attachment(4).map(|a| a.edge), Some(Edge::Falling));
        assert!(gpio.fire(4));
        assert_eq!(FIRED.load(Ordering::SeqCst), 1);

        gpio.detach_interrupt(4);
        assert!(!gpio.fire(4));
        assert_eq!(gpio.attached_count(), 0);
    }

    #[test]
    fn test_mock_gpio_configure_detaches() {
        let mut gpio = MockGpio::new();
        gpio.configure(7, PinMode::Input);
        gpio.attach_interrupt(7, vector, Edge::Rising);
        assert!(gpio.attachment(7).is_some());

        gpio.configure(7, PinMode::InputPullDown);
        assert_eq!(gpio.mode(7), Some(PinMode::InputPullDown));
        assert!(gpio.attachment(7).is_none());
        assert_eq!(gpio.detach_calls(), 0);
    }

    #[test]
    fn test_mem_eeprom_power_cycle_drops_pending() {
        let mut eeprom = MemEeprom::<8>::new();
        eeprom.write(0, &[1, 2, 3]).unwrap();

        let mut buf = [0u8; 3];
        eeprom.read(0, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);

        eeprom.power_cycle();
        eeprom.read(0, &mut buf).unwrap();
        assert_eq!(buf, [ERASED_BYTE; 3]);

        eeprom.write(0, &[1, 2, 3]).unwrap();
        eeprom.commit().unwrap();
        eeprom.power_cycle();
        eeprom.read(0, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(eeprom.commits(), 1);
    }

    #[test]
    fn test_mem_eeprom_bounds() {
        let mut eeprom = MemEeprom::<4>::new();
        assert_eq!(eeprom.write(3, &[0, 0]), Err(EepromError::OutOfBounds));
        let mut buf = [0u8; 5];
        assert_eq!(eeprom.read(0, &mut buf), Err(EepromError::OutOfBounds));
    }

    #[test]
    fn test_mem_eeprom_failed_commit() {
        let mut eeprom = MemEeprom::<4>::new();
        eeprom.set_commit_failure(true);
        eeprom.write(0, &[7]).unwrap();
        assert_eq!(eeprom.commit(), Err(EepromError::NotCommitted));
        eeprom.power_cycle();
        assert_eq!(eeprom.durable()[0], ERASED_BYTE);
    }
}
