//! One addressable row of LEDs, stored as colour bit planes.
//!
//! Instead of an array of [`Pixel`]s a row keeps one `u32` per colour
//! channel. Each plane holds [`LEDS`] fields of `BITS` bits. The refresh engine
//! shifts a plane out from the least significant field upward, so the field
//! an LED lands in decides where in the serial stream it appears.
//!
//! The row's [`Orientation`] maps logical LED indices onto fields:
//!
//! ```text
//!            field:  7   6   5   4   3   2   1   0   (shifted out first)
//! Up    LED index:   0   1   2   3   4   5   6   7
//! Down  LED index:   7   6   5   4   3   2   1   0
//! ```

use crate::pixel::PackedColor;
use crate::{Channel, CheckBits, Orientation, Pixel, CHANNELS, LEDS};

/// Bit offset of the field holding LED `index`.
///
/// This is the only place orientation is applied to LED addressing.
#[inline]
#[must_use]
pub const fn field_shift(orientation: Orientation, index: usize, bits: u8) -> u32 {
    let position = match orientation {
        Orientation::Up => LEDS - 1 - index,
        Orientation::Down => index,
    };
    bits as u32 * position as u32
}

/// A row of [`LEDS`] LEDs for one panel.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Row<const BITS: u8> {
    leds: [u32; CHANNELS],
    orientation: Orientation,
}

impl<const BITS: u8> Row<BITS> {
    const FIELD_MASK: u32 = (1 << BITS) - 1;

    /// Create a dark row.
    #[must_use]
    pub const fn new(orientation: Orientation) -> Self {
        let () = CheckBits::<BITS>::OK;
        Self {
            leds: [0; CHANNELS],
            orientation,
        }
    }

    /// Set an LED from a pixel.
    ///
    /// The destination field is cleared in all three planes before the new
    /// levels are written.
    pub fn set_led(&mut self, index: usize, pixel: &Pixel<BITS>) {
        self.write_levels(index, pixel.red(), pixel.green(), pixel.blue());
    }

    /// Set an LED from a packed RGB565 word without building a [`Pixel`].
    ///
    /// Uses the same bit slicing as [`Pixel::from_color`].
    pub fn set_led_color(&mut self, index: usize, color: u16) {
        let packed = PackedColor::new(color);
        self.write_levels(
            index,
            packed.red_level(BITS),
            packed.green_level(BITS),
            packed.blue_level(BITS),
        );
    }

    /// Read an LED back.
    #[must_use]
    pub fn get_led(&self, index: usize) -> Pixel<BITS> {
        debug_assert!(index < LEDS);
        let shift = field_shift(self.orientation, index, BITS);
        let level = |channel: Channel| {
            let field = (self.leds[channel.index()] >> shift) & Self::FIELD_MASK;
            field as u8
        };
        Pixel::new(
            level(Channel::Red),
            level(Channel::Green),
            level(Channel::Blue),
        )
    }

    fn write_levels(&mut self, index: usize, red: u8, green: u8, blue: u8) {
        debug_assert!(index < LEDS);
        let shift = field_shift(self.orientation, index, BITS);
        let mask = !(Self::FIELD_MASK << shift);
        for (channel, level) in [
            (Channel::Red, red),
            (Channel::Green, green),
            (Channel::Blue, blue),
        ] {
            let plane = &mut self.leds[channel.index()];
            *plane &= mask;
            *plane |= (u32::from(level) & Self::FIELD_MASK) << shift;
        }
    }

    /// Set every LED to the same pixel.
    pub fn fill(&mut self, pixel: &Pixel<BITS>) {
        for index in 0..LEDS {
            self.set_led(index, pixel);
        }
    }

    /// Turn every LED off.
    pub fn clear(&mut self) {
        self.leds = [0; CHANNELS];
    }

    /// The raw bit plane of one channel.
    #[inline]
    #[must_use]
    pub const fn plane(&self, channel: Channel) -> u32 {
        self.leds[channel.index()]
    }

    /// Levels of one channel in shift-out order (least significant field first).
    pub fn shift_levels(&self, channel: Channel) -> impl Iterator<Item = u8> {
        let plane = self.plane(channel);
        (0..LEDS).map(move |field| ((plane >> (BITS as usize * field)) & Self::FIELD_MASK) as u8)
    }

    /// Change where LED 0 is addressed. Already written data is not moved.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// The row's orientation.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether LED 0 sits in the most significant field.
    #[must_use]
    pub const fn is_oriented_up(&self) -> bool {
        matches!(self.orientation, Orientation::Up)
    }
}

impl<const BITS: u8> Default for Row<BITS> {
    fn default() -> Self {
        Self::new(Orientation::Up)
    }
}

impl<const BITS: u8> core::fmt::Debug for Row<BITS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:x}-{:x}-{:x}",
            self.leds[Channel::Red.index()],
            self.leds[Channel::Green.index()],
            self.leds[Channel::Blue.index()]
        )
    }
}

#[cfg(feature = "defmt")]
impl<const BITS: u8> defmt::Format for Row<BITS> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{:x}-{:x}-{:x}",
            self.leds[Channel::Red.index()],
            self.leds[Channel::Green.index()],
            self.leds[Channel::Blue.index()]
        );
    }
}
