//! Cube faces and whole-cube snapshots.

use crate::row::Row;
use crate::{Orientation, PanelId, Pixel, LEDS, PANELS, ROWS};

/// Index of the row the refresh engine streams while scanning row `index`.
///
/// Panels mounted upside down are scanned in reverse so they still show an
/// upright image.
#[inline]
#[must_use]
pub const fn shift_row_index(orientation: Orientation, index: usize) -> usize {
    match orientation {
        Orientation::Up => index,
        Orientation::Down => ROWS - 1 - index,
    }
}

/// One face of the cube: [`ROWS`] rows and an orientation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Panel<const BITS: u8> {
    rows: [Row<BITS>; ROWS],
    orientation: Orientation,
}

impl<const BITS: u8> Panel<BITS> {
    /// Create a dark panel with every row sharing its orientation.
    #[must_use]
    pub const fn new(orientation: Orientation) -> Self {
        Self {
            rows: [Row::new(orientation); ROWS],
            orientation,
        }
    }

    /// Logical row access for drawing.
    #[must_use]
    pub fn row(&self, index: usize) -> &Row<BITS> {
        &self.rows[index]
    }

    /// Mutable logical row access for drawing.
    pub fn row_mut(&mut self, index: usize) -> &mut Row<BITS> {
        &mut self.rows[index]
    }

    /// Row to stream while scanning row `index`, honouring the orientation.
    #[inline]
    #[must_use]
    pub fn shift_row(&self, index: usize) -> &Row<BITS> {
        &self.rows[shift_row_index(self.orientation, index)]
    }

    /// Set the panel orientation and propagate it to every row.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        for row in &mut self.rows {
            row.set_orientation(orientation);
        }
    }

    /// The panel's orientation.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether the panel is scanned from row 0.
    #[must_use]
    pub const fn is_oriented_up(&self) -> bool {
        matches!(self.orientation, Orientation::Up)
    }

    /// Read one LED at logical coordinates.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Pixel<BITS> {
        self.rows[y].get_led(x)
    }

    /// Write one LED at logical coordinates.
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: &Pixel<BITS>) {
        self.rows[y].set_led(x, pixel);
    }

    /// Set every LED to the same pixel.
    pub fn fill(&mut self, pixel: &Pixel<BITS>) {
        for row in &mut self.rows {
            row.fill(pixel);
        }
    }

    /// Turn every LED off.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }
}

impl<const BITS: u8> Default for Panel<BITS> {
    fn default() -> Self {
        Self::new(Orientation::Up)
    }
}

// Rows are printed as packed colours, one line per row.
impl<const BITS: u8> core::fmt::Debug for Panel<BITS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Panel<{}> {:?}", BITS, self.orientation)?;
        for row in &self.rows {
            for index in 0..LEDS {
                write!(f, "{:04X} ", row.get_led(index).to_color())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl<const BITS: u8> defmt::Format for Panel<BITS> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Panel<{}> {}", BITS, self.orientation);
        for row in &self.rows {
            defmt::write!(f, "\n");
            for index in 0..LEDS {
                defmt::write!(f, "{:04X} ", row.get_led(index).to_color());
            }
        }
    }
}

/// The five panels of one frame buffer, indexed by [`PanelId`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cube<const BITS: u8> {
    panels: [Panel<BITS>; PANELS],
}

impl<const BITS: u8> Cube<BITS> {
    /// Create a dark cube. `orientations` is indexed by [`PanelId`].
    #[must_use]
    pub const fn new(orientations: [Orientation; PANELS]) -> Self {
        Self {
            panels: [
                Panel::new(orientations[0]),
                Panel::new(orientations[1]),
                Panel::new(orientations[2]),
                Panel::new(orientations[3]),
                Panel::new(orientations[4]),
            ],
        }
    }

    /// One panel.
    #[inline]
    #[must_use]
    pub fn panel(&self, id: PanelId) -> &Panel<BITS> {
        &self.panels[id.index()]
    }

    /// One panel, mutably.
    #[inline]
    pub fn panel_mut(&mut self, id: PanelId) -> &mut Panel<BITS> {
        &mut self.panels[id.index()]
    }

    /// Panels in chain order.
    pub fn iter(&self) -> impl Iterator<Item = (PanelId, &Panel<BITS>)> {
        PanelId::CHAIN.into_iter().zip(self.panels.iter())
    }

    /// The orientation of every panel, indexed by [`PanelId`].
    #[must_use]
    pub fn orientations(&self) -> [Orientation; PANELS] {
        self.panels.map(|panel| panel.orientation())
    }

    /// Set every LED of every panel to the same pixel.
    pub fn fill(&mut self, pixel: &Pixel<BITS>) {
        for panel in &mut self.panels {
            panel.fill(pixel);
        }
    }

    /// Turn every LED off.
    pub fn clear(&mut self) {
        for panel in &mut self.panels {
            panel.clear();
        }
    }
}

impl<const BITS: u8> Default for Cube<BITS> {
    fn default() -> Self {
        Self::new(crate::DEFAULT_ORIENTATIONS)
    }
}
