//! Double-buffered framebuffer and refresh engine for five-panel LED cubes.
//!
//! ## How the Cube Hardware Works
//!
//! The cube is built from five 8 × 8 RGB panels (back, top, left, front and
//! right; the bottom face sits on the base). Every panel is driven by shift
//! registers, and the registers of all five panels are daisy-chained into one
//! long serial string. Only one row of every panel is lit at a time.
//!
//! ### Signal names
//! - **SCLK** – Shift clock; every rising edge pushes the data bit one position down the chain
//! - **SDAT** – Serial data presented to the first shift register
//! - **LATCH** – Copies the shift-register contents to the parallel output stage
//! - **BLANK** – Output enable (active LOW): LEDs are lit while BLANK is LOW and dark when it is HIGH
//! - **ROW0..ROW2** – Row-select value, chooses which row of every panel is lit
//!
//! ### Row scanning workflow
//! 1. While row N − 1 is still lit, the controller shifts one bit per LED and
//!    colour channel for row N into the chain. Panels go out in the fixed chain
//!    order back, top, left, front, right; inside a panel the channels go out
//!    green, red, blue.
//! 2. After the last bit, BLANK is raised to turn the LEDs off.
//! 3. The row-select lines are changed to row N and LATCH is pulsed to move the
//!    freshly shifted bits to the outputs.
//! 4. BLANK is lowered again, lighting row N.
//!
//! ### Brightness (Bit-Angle Modulation)
//! Each channel holds a level of `BITS` bits (2 or 4). A full refresh cycle
//! scans every row `2^BITS` times; each of those passes is a *sub-cycle*. The
//! [`schedule`] tables decide in which sub-cycles a given level is lit. Unlike
//! binary-weighted BCM the lit sub-cycles are spread as evenly as possible over
//! the cycle, which keeps low levels from flickering at the cube's modest
//! refresh rate.
//!
//! ## Crate Layout
//!
//! - [`pixel`] – quantized RGB values and their RGB565 packing
//! - [`row`] / [`panel`] – bit-planed storage of one row and one cube face
//! - [`frame`] – the two cube buffers and the DISPLAY/ANIMATE swap protocol
//! - [`bus`] / [`refresh`] – the shift-register bus and the BCM refresh engine
//! - [`canvas`] – flat, wide and tall drawing surfaces built on `embedded-graphics`
//! - [`animation`] – periodic invocation of a user draw callback
//!
//! ## Execution Contexts
//!
//! Two contexts share a [`frame::FrameStore`]: a fixed-rate refresh context
//! calling [`refresh::RefreshEngine::step`] and a slower animation context
//! calling [`animation::AnimationScheduler::tick`]. [`frame::FrameStore::split`]
//! hands each context its own handle; the only state they share is a handful
//! of word-sized atomics.
//!
//! ```rust
//! use embedded_graphics::pixelcolor::Rgb565;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//! use ledcube_framebuffer::animation::AnimationScheduler;
//! use ledcube_framebuffer::bus::ShiftBus;
//! use ledcube_framebuffer::canvas::Canvas;
//! use ledcube_framebuffer::frame::FrameStore;
//! use ledcube_framebuffer::refresh::RefreshEngine;
//!
//! struct NullBus;
//!
//! impl ShiftBus for NullBus {
//!     fn set_data(&mut self, _high: bool) {}
//!     fn set_clock(&mut self, _high: bool) {}
//!     fn set_latch(&mut self, _high: bool) {}
//!     fn set_blank(&mut self, _blanked: bool) {}
//!     fn select_row(&mut self, _row: u8) {}
//! }
//!
//! let mut frames = FrameStore::<2>::default();
//! let (mut animate, mut display) = frames.split();
//!
//! let mut scheduler = AnimationScheduler::with_callback(1, |canvas: &mut Canvas<'_, '_, 2>| {
//!     canvas.config_mut().set_wide_mode(true);
//!     Rectangle::new(Point::new(0, 0), Size::new(32, 8))
//!         .into_styled(PrimitiveStyle::with_fill(Rgb565::BLUE))
//!         .draw(canvas)
//!         .unwrap();
//!     true
//! });
//!
//! let mut engine = RefreshEngine::new(NullBus);
//! scheduler.tick(&mut animate);
//! engine.run_cycle(&mut display);
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public value types and enables the
//! [`frame::FrameStore::dump`] diagnostic, which logs every panel of both
//! buffers. Swap adoption is traced at `trace` level.
//!
//! ### `critical-section` Feature
//! Forwards to `portable-atomic/critical-section`. Enable it on single-core
//! targets without native atomic instructions (AVR, `thumbv6m`) and provide a
//! `critical-section` implementation.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod bus;
pub mod canvas;
pub mod frame;
pub mod panel;
pub mod pixel;
pub mod refresh;
pub mod row;
pub mod schedule;

pub use pixel::Pixel;

/// Number of LEDs in one row of a panel.
pub const LEDS: usize = 8;

/// Number of rows in one panel.
pub const ROWS: usize = 8;

/// Number of panels in the cube.
pub const PANELS: usize = 5;

/// Number of colour channels per LED.
pub const CHANNELS: usize = 3;

/// Identifies one face of the cube.
///
/// The discriminants follow the physical daisy-chain order of the shift
/// register string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelId {
    /// Back face, first in the chain
    Back = 0,
    /// Top face
    Top = 1,
    /// Left face
    Left = 2,
    /// Front face
    Front = 3,
    /// Right face, last in the chain
    Right = 4,
}

impl PanelId {
    /// All panels in shift-register chain order.
    pub const CHAIN: [PanelId; PANELS] = [
        PanelId::Back,
        PanelId::Top,
        PanelId::Left,
        PanelId::Front,
        PanelId::Right,
    ];

    /// Position of this panel in the chain.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short upper-case name, used by the diagnostic dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PanelId::Back => "BACK",
            PanelId::Top => "TOP",
            PanelId::Left => "LEFT",
            PanelId::Front => "FRONT",
            PanelId::Right => "RIGHT",
        }
    }
}

/// A colour channel.
///
/// The discriminants follow the order in which the hardware expects the
/// channels to be shifted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Green, shifted first
    Green = 0,
    /// Red
    Red = 1,
    /// Blue, shifted last
    Blue = 2,
}

impl Channel {
    /// All channels in shift order.
    pub const SHIFT_ORDER: [Channel; CHANNELS] = [Channel::Green, Channel::Red, Channel::Blue];

    /// Index of the bit plane holding this channel.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The direction the cable routing leaves a panel's LED array in.
///
/// Some panels are mounted "upside down" relative to the shift direction.
/// Orientation is fixed at setup and only affects addressing; it never moves
/// pixel data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// LED 0 sits in the most significant field and row 0 is scanned first
    #[default]
    Up,
    /// LED 0 sits in the least significant field and rows are scanned in reverse
    Down,
}

/// Panel orientations of the reference cube wiring, indexed by [`PanelId`].
pub const DEFAULT_ORIENTATIONS: [Orientation; PANELS] = [
    Orientation::Down, // Back
    Orientation::Up,   // Top
    Orientation::Down, // Left
    Orientation::Up,   // Front
    Orientation::Down, // Right
];

/// Buffer role inside a [`frame::FrameStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    /// The buffer currently streamed to the hardware
    Display,
    /// The buffer the animation is drawing into
    Animate,
}

/// Computes the number of brightness levels per channel for a bit depth.
///
/// # Arguments
///
/// * `bits` - Number of bits per colour channel
///
/// # Returns
///
/// `2^bits`
#[must_use]
pub const fn compute_levels(bits: u8) -> usize {
    1usize << bits
}

/// Computes the number of BCM sub-cycles in one refresh cycle.
///
/// Every level is expressed as a pulse train over this many sub-cycles, so it
/// is equal to the number of levels.
#[must_use]
pub const fn compute_sub_cycles(bits: u8) -> usize {
    compute_levels(bits)
}

/// Computes the number of refresh steps in one full refresh cycle.
///
/// One step clocks out one row for one sub-cycle, so a full cycle is
/// `ROWS * 2^bits` steps.
#[must_use]
pub const fn compute_cycle_steps(bits: u8) -> usize {
    ROWS * compute_sub_cycles(bits)
}

/// Fails to compile for colour depths other than 2 or 4 bits.
pub(crate) struct CheckBits<const BITS: u8>;

impl<const BITS: u8> CheckBits<BITS> {
    pub(crate) const OK: () = assert!(
        BITS == 2 || BITS == 4,
        "only 2 or 4 bits per channel are supported"
    );
}
