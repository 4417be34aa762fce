//! Quantized RGB pixels and their packed RGB565 representation.
//!
//! A [`Pixel`] stores one level per channel, each `BITS` wide. The cube only
//! has 2 or 4 bits per channel, so conversion from a 16-bit RGB565 word keeps
//! the top `BITS` bits of every field and drops the rest:
//!
//! ```text
//!  15    11 10     5 4     0
//! +--------+--------+-------+
//! |  red   | green  | blue  |
//! +--------+--------+-------+
//!  ^^          ^^       ^^      <- BITS = 2 keeps these bits
//! ```
//!
//! Packing places each level back into the top bits of its field, so a level
//! that already fits in `BITS` bits survives a round trip unchanged.

use bitfield::bitfield;
use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;

use crate::{Channel, CheckBits};

/// Width of the red field in an RGB565 word.
const RED_WIDTH: u8 = 5;
/// Width of the green field in an RGB565 word.
const GREEN_WIDTH: u8 = 6;
/// Width of the blue field in an RGB565 word.
const BLUE_WIDTH: u8 = 5;

bitfield! {
    /// 16-bit packed colour word as handed to the drawing ingress.
    ///
    /// The bit layout is as follows:
    /// - Bits 15-11: Red
    /// - Bits 10-5: Green
    /// - Bits 4-0: Blue
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub(crate) struct PackedColor(u16);
    impl Debug;
    pub red, set_red: 15, 11;
    pub green, set_green: 10, 5;
    pub blue, set_blue: 4, 0;
}

impl PackedColor {
    /// Wrap a raw RGB565 word.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// The raw RGB565 word.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Top `bits` bits of the red field.
    #[must_use]
    pub fn red_level(self, bits: u8) -> u8 {
        (self.red() >> (RED_WIDTH - bits)) as u8
    }

    /// Top `bits` bits of the green field.
    #[must_use]
    pub fn green_level(self, bits: u8) -> u8 {
        (self.green() >> (GREEN_WIDTH - bits)) as u8
    }

    /// Top `bits` bits of the blue field.
    #[must_use]
    pub fn blue_level(self, bits: u8) -> u8 {
        (self.blue() >> (BLUE_WIDTH - bits)) as u8
    }
}

/// Packs channel levels into a 16-bit RGB565 word.
///
/// Every level is placed in the top `bits` bits of its field. Levels wider
/// than `bits` are masked.
///
/// # Example
/// ```rust
/// use ledcube_framebuffer::pixel::rgb_to_color;
///
/// assert_eq!(rgb_to_color(3, 0, 0, 2), 0xC000);
/// assert_eq!(rgb_to_color(0, 3, 0, 2), 0x0600);
/// assert_eq!(rgb_to_color(0, 0, 3, 2), 0x0018);
/// ```
#[must_use]
pub const fn rgb_to_color(red: u8, green: u8, blue: u8, bits: u8) -> u16 {
    let mask = (1u16 << bits) - 1;
    ((red as u16 & mask) << (16 - bits))
        | ((green as u16 & mask) << (11 - bits))
        | ((blue as u16 & mask) << (5 - bits))
}

/// One LED's colour, quantized to `BITS` bits per channel.
///
/// `BITS` must be 2 or 4; other values are rejected at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pixel<const BITS: u8> {
    red: u8,
    green: u8,
    blue: u8,
}

impl<const BITS: u8> Pixel<BITS> {
    /// Mask of a single channel level.
    pub const MASK: u8 = (1u8 << BITS) - 1;

    /// Full-scale level.
    pub const MAX: u8 = Self::MASK;

    /// All channels off.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// All channels at full scale.
    pub const WHITE: Self = Self::new(Self::MAX, Self::MAX, Self::MAX);

    /// Create a pixel. Levels are masked to `BITS` bits.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        let () = CheckBits::<BITS>::OK;
        Self {
            red: red & Self::MASK,
            green: green & Self::MASK,
            blue: blue & Self::MASK,
        }
    }

    /// Overwrite all three channels. Levels are masked to `BITS` bits.
    pub fn set(&mut self, red: u8, green: u8, blue: u8) {
        *self = Self::new(red, green, blue);
    }

    /// Red level.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green level.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue level.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Level of the given channel.
    #[must_use]
    pub const fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Green => self.green,
            Channel::Red => self.red,
            Channel::Blue => self.blue,
        }
    }

    /// Pack into a 16-bit RGB565 word.
    #[must_use]
    pub fn to_color(self) -> u16 {
        let mut packed = PackedColor::new(0);
        packed.set_red(u16::from(self.red) << (RED_WIDTH - BITS));
        packed.set_green(u16::from(self.green) << (GREEN_WIDTH - BITS));
        packed.set_blue(u16::from(self.blue) << (BLUE_WIDTH - BITS));
        packed.raw()
    }

    /// Unpack a 16-bit RGB565 word, keeping the top `BITS` bits of every
    /// field.
    #[must_use]
    pub fn from_color(color: u16) -> Self {
        let packed = PackedColor::new(color);
        Self::new(
            packed.red_level(BITS),
            packed.green_level(BITS),
            packed.blue_level(BITS),
        )
    }

    /// Channel-wise mean of two pixels, rounding down.
    #[must_use]
    pub const fn average(a: Self, b: Self) -> Self {
        Self::new(
            u8::midpoint(a.red, b.red),
            u8::midpoint(a.green, b.green),
            u8::midpoint(a.blue, b.blue),
        )
    }
}

impl<const BITS: u8> From<Rgb565> for Pixel<BITS> {
    fn from(color: Rgb565) -> Self {
        Self::from_color(RawU16::from(color).into_inner())
    }
}

impl<const BITS: u8> From<Pixel<BITS>> for Rgb565 {
    fn from(pixel: Pixel<BITS>) -> Self {
        Rgb565::from(RawU16::new(pixel.to_color()))
    }
}
