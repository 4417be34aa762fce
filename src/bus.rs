//! The shift-register bus driven by the refresh engine.
//!
//! [`ShiftBus`] is the seam between the refresh engine and the hardware. It
//! exposes the individual lines; the ordering rules live in
//! [`crate::refresh::RefreshEngine`].
//!
//! [`PinBus`] implements the bus on top of `embedded-hal` output pins:
//!
//! ```rust,ignore
//! let bus = PinBus::new((sclk, sdat, latch, blank, row0, row1, row2));
//! let mut engine = RefreshEngine::<_, 2>::new(bus);
//! ```

use embedded_hal::digital::OutputPin;

/// Serial clock/data, latch, output-enable and row-select lines.
pub trait ShiftBus {
    /// Drive the serial data line.
    fn set_data(&mut self, high: bool);

    /// Drive the serial clock line. Data is sampled on the rising edge.
    fn set_clock(&mut self, high: bool);

    /// Drive the latch line. A rising then falling edge transfers the shift
    /// registers to the outputs.
    fn set_latch(&mut self, high: bool);

    /// Disable (`true`) or enable (`false`) the LED outputs.
    fn set_blank(&mut self, blanked: bool);

    /// Present a row-select value on the row bus.
    fn select_row(&mut self, row: u8);
}

/// The pins making up a cube bus.
///
/// Implemented for tuples `(sclk, sdat, latch, blank, row0, row1, row2)`
/// where every member implements [`OutputPin`].
pub trait Outputs {
    /// Serial clock pin
    type Sclk: OutputPin;
    /// Serial data pin
    type Sdat: OutputPin;
    /// Latch pin
    type Latch: OutputPin;
    /// Output enable pin, active low
    type Blank: OutputPin;
    /// Row select bit 0
    type Row0: OutputPin;
    /// Row select bit 1
    type Row1: OutputPin;
    /// Row select bit 2
    type Row2: OutputPin;
    /// Serial clock pin
    fn sclk(&mut self) -> &mut Self::Sclk;
    /// Serial data pin
    fn sdat(&mut self) -> &mut Self::Sdat;
    /// Latch pin
    fn latch(&mut self) -> &mut Self::Latch;
    /// Output enable pin, active low
    fn blank(&mut self) -> &mut Self::Blank;
    /// Row select bit 0
    fn row0(&mut self) -> &mut Self::Row0;
    /// Row select bit 1
    fn row1(&mut self) -> &mut Self::Row1;
    /// Row select bit 2
    fn row2(&mut self) -> &mut Self::Row2;
}

impl<
        SCLK: OutputPin,
        SDAT: OutputPin,
        LATCH: OutputPin,
        BLANK: OutputPin,
        ROW0: OutputPin,
        ROW1: OutputPin,
        ROW2: OutputPin,
    > Outputs for (SCLK, SDAT, LATCH, BLANK, ROW0, ROW1, ROW2)
{
    type Sclk = SCLK;
    type Sdat = SDAT;
    type Latch = LATCH;
    type Blank = BLANK;
    type Row0 = ROW0;
    type Row1 = ROW1;
    type Row2 = ROW2;
    fn sclk(&mut self) -> &mut SCLK {
        &mut self.0
    }
    fn sdat(&mut self) -> &mut SDAT {
        &mut self.1
    }
    fn latch(&mut self) -> &mut LATCH {
        &mut self.2
    }
    fn blank(&mut self) -> &mut BLANK {
        &mut self.3
    }
    fn row0(&mut self) -> &mut ROW0 {
        &mut self.4
    }
    fn row1(&mut self) -> &mut ROW1 {
        &mut self.5
    }
    fn row2(&mut self) -> &mut ROW2 {
        &mut self.6
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    // GPIO writes on the supported boards cannot fail; the refresh path has
    // nowhere to report an error anyway.
    if high {
        pin.set_high().ok();
    } else {
        pin.set_low().ok();
    }
}

/// [`ShiftBus`] over individual GPIO pins.
#[derive(Debug)]
pub struct PinBus<PINS> {
    pins: PINS,
}

impl<PINS: Outputs> PinBus<PINS> {
    /// Take ownership of the pins.
    pub fn new(pins: PINS) -> Self {
        Self { pins }
    }

    /// Give the pins back.
    pub fn release(self) -> PINS {
        self.pins
    }
}

impl<PINS: Outputs> ShiftBus for PinBus<PINS> {
    #[inline]
    fn set_data(&mut self, high: bool) {
        drive(self.pins.sdat(), high);
    }

    #[inline]
    fn set_clock(&mut self, high: bool) {
        drive(self.pins.sclk(), high);
    }

    #[inline]
    fn set_latch(&mut self, high: bool) {
        drive(self.pins.latch(), high);
    }

    #[inline]
    fn set_blank(&mut self, blanked: bool) {
        // active low enable: a high level turns the LEDs off
        drive(self.pins.blank(), blanked);
    }

    fn select_row(&mut self, row: u8) {
        drive(self.pins.row0(), row & 0b001 != 0);
        drive(self.pins.row1(), row & 0b010 != 0);
        drive(self.pins.row2(), row & 0b100 != 0);
    }
}


#[cfg(test)]
mod tests {
    extern crate std;

    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use super::*;
    use embedded_hal::digital::ErrorType;

    type Log = Rc<RefCell<Vec<(&'static str, bool)>>>;

    struct FakePin {
        name: &'static str,
        log: Log,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push((self.name, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push((self.name, true));
            Ok(())
        }
    }

    type FakePins = (FakePin, FakePin, FakePin, FakePin, FakePin, FakePin, FakePin);

    fn pin_bus() -> (PinBus<FakePins>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let pin = |name| FakePin {
            name,
            log: log.clone(),
        };
        let bus = PinBus::new((
            pin("sclk"),
            pin("sdat"),
            pin("latch"),
            pin("blank"),
            pin("row0"),
            pin("row1"),
            pin("row2"),
        ));
        (bus, log)
    }

    #[test]
    fn test_pin_bus_lines() {
        let (mut bus, log) = pin_bus();
        bus.set_clock(true);
        bus.set_data(false);
        bus.set_latch(true);
        assert_eq!(
            *log.borrow(),
            [("sclk", true), ("sdat", false), ("latch", true)]
        );
    }

    #[test]
    fn test_pin_bus_blank_is_active_low_enable() {
        let (mut bus, log) = pin_bus();
        bus.set_blank(true);
        bus.set_blank(false);
        assert_eq!(*log.borrow(), [("blank", true), ("blank", false)]);
    }

    #[test]
    fn test_pin_bus_row_select_bits() {
        let (mut bus, log) = pin_bus();
        bus.select_row(5);
        assert_eq!(
            *log.borrow(),
            [("row0", true), ("row1", false), ("row2", true)]
        );
        log.borrow_mut().clear();
        bus.select_row(2);
        assert_eq!(
            *log.borrow(),
            [("row0", false), ("row1", true), ("row2", false)]
        );
    }

    #[test]
    fn test_pin_bus_release() {
        let (bus, _log) = pin_bus();
        let pins = bus.release();
        assert_eq!(pins.0.name, "sclk");
        assert_eq!(pins.6.name, "row2");
    }
}
