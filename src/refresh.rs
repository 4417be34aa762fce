//! Bit-angle-modulation refresh engine.
//!
//! The engine walks a `(sub_cycle, row)` state machine. Every call to
//! [`RefreshEngine::step`] clocks one row of all five panels into the shift
//! register chain for the current sub-cycle and latches it:
//!
//! 1. For each panel in chain order, each channel in shift order and each LED
//!    field starting at the least significant one: put the schedule bit on
//!    SDAT, raise SCLK, lower SCLK, lower SDAT.
//! 2. Raise BLANK, present the row on the row bus, pulse LATCH, lower BLANK
//!    again (unless the animation asked for the outputs to stay dark).
//! 3. Advance `row`; when it wraps advance `sub_cycle`; when that wraps the
//!    refresh cycle is complete and a pending frame swap is adopted.
//!
//! `step` must be called at a fixed rate by a timer; it has no error path and
//! must finish within one timer period.

use crate::bus::ShiftBus;
use crate::frame::DisplayHandle;
use crate::schedule::schedule;
use crate::{compute_cycle_steps, Channel, CheckBits, PanelId, LEDS, ROWS};

/// Drives a [`ShiftBus`] from the DISPLAY frame of a
/// [`FrameStore`](crate::frame::FrameStore).
#[derive(Debug)]
pub struct RefreshEngine<B, const BITS: u8> {
    bus: B,
    sub_cycle: u8,
    row: u8,
}

impl<B: ShiftBus, const BITS: u8> RefreshEngine<B, BITS> {
    const SUB_CYCLES: u8 = 1 << BITS;
    const FIELD_MASK: u32 = (1 << BITS) - 1;

    /// Take ownership of the bus, pull the serial lines low and blank the
    /// outputs until the first row is latched.
    pub fn new(mut bus: B) -> Self {
        let () = CheckBits::<BITS>::OK;
        bus.set_clock(false);
        bus.set_data(false);
        bus.set_latch(false);
        bus.set_blank(true);
        Self {
            bus,
            sub_cycle: 0,
            row: 0,
        }
    }

    /// Clock out and latch one row for the current sub-cycle, then advance.
    pub fn step(&mut self, display: &mut DisplayHandle<'_, BITS>) {
        let schedule = schedule(BITS);
        let cycle_bit: u16 = 1 << self.sub_cycle;
        let cube = display.cube();

        for id in PanelId::CHAIN {
            let row = cube.panel(id).shift_row(usize::from(self.row));
            for channel in Channel::SHIFT_ORDER {
                let mut leds = row.plane(channel);
                // invariant: SCLK and SDAT are low
                for _ in 0..LEDS {
                    let lit = schedule[(leds & Self::FIELD_MASK) as usize] & cycle_bit != 0;
                    self.bus.set_data(lit);
                    self.bus.set_clock(true);
                    self.bus.set_clock(false);
                    if lit {
                        self.bus.set_data(false);
                    }
                    leds >>= BITS;
                }
            }
        }

        self.bus.set_blank(true);
        self.bus.select_row(self.row);
        self.bus.set_latch(true);
        self.bus.set_latch(false);
        if !display.is_blanked() {
            self.bus.set_blank(false);
        }

        self.advance(display);
    }

    fn advance(&mut self, display: &mut DisplayHandle<'_, BITS>) {
        self.row += 1;
        if usize::from(self.row) < ROWS {
            return;
        }
        self.row = 0;
        self.sub_cycle += 1;
        if self.sub_cycle < Self::SUB_CYCLES {
            return;
        }
        self.sub_cycle = 0;
        display.adopt_pending_swap();
    }

    /// Run steps until the start of the next refresh cycle.
    pub fn run_cycle(&mut self, display: &mut DisplayHandle<'_, BITS>) {
        loop {
            self.step(display);
            if self.position() == (0, 0) {
                break;
            }
        }
    }

    /// The `(sub_cycle, row)` the next step will output.
    #[must_use]
    pub fn position(&self) -> (u8, u8) {
        (self.sub_cycle, self.row)
    }

    /// Number of steps in one full refresh cycle.
    #[must_use]
    pub const fn cycle_steps(&self) -> usize {
        compute_cycle_steps(BITS)
    }

    /// The bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// The bus, mutably.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }
}
