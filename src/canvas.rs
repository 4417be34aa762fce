//! Drawing surfaces over the ANIMATE frame.
//!
//! A [`Canvas`] maps 2D coordinates onto the cube and implements
//! `embedded-graphics`' [`DrawTarget`], so any primitive, text or image can be
//! drawn onto the cube. The mapping is chosen by a [`CanvasConfig`]:
//!
//! - **Flat**: one [`LEDS`] × [`ROWS`] panel, selected with
//!   [`CanvasConfig::set_gfx_panel`].
//! - **Wide**: the four side panels side by side, 32 × 8.
//! - **Tall**: wide plus the top panel folded above the sides, 32 × 16.
//!
//! ```text
//! wide:     x  0      8      16     24     32
//!              | LEFT | FRONT| RIGHT| BACK |
//!
//! tall:  y  0  +------+------+------+------+
//!              |     TOP, rotated per band |
//!           8  +------+------+------+------+
//!              | LEFT | FRONT| RIGHT| BACK |
//!          16  +------+------+------+------+
//! ```
//!
//! In tall mode every band shows the top panel as seen from its own side, so
//! the image continues over the edge between a side and the top.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Size};

use crate::frame::AnimateHandle;
use crate::panel::Cube;
use crate::{PanelId, Pixel, LEDS, ROWS};

/// Side panels in wide-canvas order.
pub const BANDS: [PanelId; 4] = [PanelId::Left, PanelId::Front, PanelId::Right, PanelId::Back];

/// Effective canvas layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layout {
    /// A single panel
    Flat,
    /// The four side panels in a row
    Wide,
    /// The side panels with the top panel folded above them
    Tall,
}

/// A physical LED addressed by a canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Target {
    /// The panel
    pub panel: PanelId,
    /// Logical row within the panel
    pub row: usize,
    /// Logical LED within the row
    pub led: usize,
}

/// Canvas mode switches. They persist between animation frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanvasConfig {
    gfx_panel: PanelId,
    wide: bool,
    tall: bool,
    wrap: bool,
}

impl CanvasConfig {
    /// Flat canvas on the top panel without wrapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gfx_panel: PanelId::Top,
            wide: false,
            tall: false,
            wrap: false,
        }
    }

    /// Select the panel a flat canvas draws on.
    pub fn set_gfx_panel(&mut self, panel: PanelId) {
        self.gfx_panel = panel;
    }

    /// The panel a flat canvas draws on.
    #[must_use]
    pub const fn gfx_panel(&self) -> PanelId {
        self.gfx_panel
    }

    /// Span the four side panels.
    pub fn set_wide_mode(&mut self, enable: bool) {
        self.wide = enable;
    }

    /// Add the top panel above the wide canvas. Has no effect unless wide
    /// mode is enabled too.
    pub fn set_tall_mode(&mut self, enable: bool) {
        self.tall = enable;
    }

    /// Wrap horizontal coordinates around instead of dropping them.
    pub fn set_wrap(&mut self, enable: bool) {
        self.wrap = enable;
    }

    /// Whether horizontal coordinates wrap.
    #[must_use]
    pub const fn wrap(&self) -> bool {
        self.wrap
    }

    /// The layout the switches select.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        match (self.wide, self.tall) {
            (true, true) => Layout::Tall,
            (true, false) => Layout::Wide,
            (false, _) => Layout::Flat,
        }
    }

    /// Canvas width in LEDs.
    #[must_use]
    pub const fn width(&self) -> usize {
        match self.layout() {
            Layout::Flat => LEDS,
            Layout::Wide | Layout::Tall => LEDS * BANDS.len(),
        }
    }

    /// Canvas height in LEDs.
    #[must_use]
    pub const fn height(&self) -> usize {
        match self.layout() {
            Layout::Flat | Layout::Wide => ROWS,
            Layout::Tall => ROWS * 2,
        }
    }

    /// Map a canvas coordinate to a physical LED. Returns `None` for
    /// coordinates off the canvas.
    #[must_use]
    pub fn locate(&self, x: i32, y: i32) -> Option<Target> {
        let width = i32::try_from(self.width()).ok()?;
        let height = i32::try_from(self.height()).ok()?;
        let x = if self.wrap {
            x.rem_euclid(width)
        } else if (0..width).contains(&x) {
            x
        } else {
            return None;
        };
        if !(0..height).contains(&y) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);

        let target = match self.layout() {
            Layout::Flat => Target {
                panel: self.gfx_panel,
                row: y,
                led: x,
            },
            Layout::Wide => Target {
                panel: BANDS[x / LEDS],
                row: y,
                led: x % LEDS,
            },
            Layout::Tall if y >= ROWS => Target {
                panel: BANDS[x / LEDS],
                row: y - ROWS,
                led: x % LEDS,
            },
            Layout::Tall => {
                let (led, row) = fold_onto_top(BANDS[x / LEDS], x % LEDS, y);
                Target {
                    panel: PanelId::Top,
                    row,
                    led,
                }
            }
        };
        Some(target)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Top panel `(led, row)` shown at `(x, y)` of the band above `side`.
const fn fold_onto_top(side: PanelId, x: usize, y: usize) -> (usize, usize) {
    match side {
        PanelId::Left => (ROWS - 1 - y, x),
        PanelId::Right => (y, LEDS - 1 - x),
        PanelId::Back => (LEDS - 1 - x, ROWS - 1 - y),
        PanelId::Front | PanelId::Top => (x, y),
    }
}

/// The side-panel pixel adjoining an edge LED of the top panel.
///
/// Edge LEDs read row 0 of the neighbouring side panel: the front edge
/// (`y == ROWS - 1`) reads FRONT LED `x`, the left edge (`x == 0`) LEFT LED
/// `y`, the right edge (`x == LEDS - 1`) RIGHT LED `LEDS - 1 - y` and the back
/// edge (`y == 0`) BACK LED `LEDS - 1 - x`.
///
/// Corners touch two sides. If one of the two equals `background` the other
/// is returned, otherwise their average. Interior and out-of-range
/// coordinates have no neighbour.
#[must_use]
pub fn top_panel_neighbor<const BITS: u8>(
    cube: &Cube<BITS>,
    x: usize,
    y: usize,
    background: Pixel<BITS>,
) -> Option<Pixel<BITS>> {
    if x >= LEDS || y >= ROWS {
        return None;
    }
    let side = |id: PanelId, led: usize| cube.panel(id).pixel(led, 0);

    let across = match y {
        0 => Some(side(PanelId::Back, LEDS - 1 - x)),
        y if y == ROWS - 1 => Some(side(PanelId::Front, x)),
        _ => None,
    };
    let along = match x {
        0 => Some(side(PanelId::Left, y)),
        x if x == LEDS - 1 => Some(side(PanelId::Right, LEDS - 1 - y)),
        _ => None,
    };

    match (across, along) {
        (Some(a), Some(b)) if a == background => Some(b),
        (Some(a), Some(b)) if b == background => Some(a),
        (Some(a), Some(b)) => Some(Pixel::average(a, b)),
        (one, other) => one.or(other),
    }
}

/// An `embedded-graphics` draw target over the ANIMATE frame.
///
/// Drawing while a swap is pending, or outside the canvas, is silently
/// dropped.
pub struct Canvas<'a, 'f, const BITS: u8> {
    frames: &'a mut AnimateHandle<'f, BITS>,
    config: &'a mut CanvasConfig,
}

impl<'a, 'f, const BITS: u8> Canvas<'a, 'f, BITS> {
    /// Draw into `frames` using the layout in `config`.
    pub fn new(frames: &'a mut AnimateHandle<'f, BITS>, config: &'a mut CanvasConfig) -> Self {
        Self { frames, config }
    }

    /// The canvas configuration.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        self.config
    }

    /// The canvas configuration, mutably. Changes apply to the next draw.
    pub fn config_mut(&mut self) -> &mut CanvasConfig {
        self.config
    }

    /// Write one packed RGB565 colour.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: u16) {
        if let Some(cube) = self.frames.cube_mut() {
            put(cube, self.config, x, y, color);
        }
    }

    /// Read a canvas pixel back from the ANIMATE frame.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel<BITS>> {
        let target = self.config.locate(x, y)?;
        let cube = self.frames.cube()?;
        Some(cube.panel(target.panel).pixel(target.led, target.row))
    }

    /// [`top_panel_neighbor`] on the ANIMATE frame, in packed colours.
    ///
    /// Returns `None` while a swap is pending.
    #[must_use]
    pub fn top_panel_neighbor(&self, x: usize, y: usize, background: u16) -> Option<u16> {
        let cube = self.frames.cube()?;
        top_panel_neighbor(cube, x, y, Pixel::from_color(background)).map(Pixel::to_color)
    }
}

fn put<const BITS: u8>(cube: &mut Cube<BITS>, config: &CanvasConfig, x: i32, y: i32, color: u16) {
    if let Some(target) = config.locate(x, y) {
        cube.panel_mut(target.panel)
            .row_mut(target.row)
            .set_led_color(target.led, color);
    }
}

impl<const BITS: u8> DrawTarget for Canvas<'_, '_, BITS> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        let Some(cube) = self.frames.cube_mut() else {
            return Ok(());
        };
        for embedded_graphics::Pixel(point, color) in pixels {
            let color = RawU16::from(color).into_inner();
            put(cube, self.config, point.x, point.y, color);
        }
        Ok(())
    }
}

impl<const BITS: u8> OriginDimensions for Canvas<'_, '_, BITS> {
    fn size(&self) -> Size {
        Size::new(self.config.width() as u32, self.config.height() as u32)
    }
}

impl<const BITS: u8> core::fmt::Debug for Canvas<'_, '_, BITS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::frame::FrameStore;
    use crate::{Frame, Orientation, PANELS};
    use embedded_graphics::prelude::{Point, Primitive, RgbColor, WebColors};
    use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
    use embedded_graphics::Drawable;

    fn config(wide: bool, tall: bool, wrap: bool) -> CanvasConfig {
        let mut config = CanvasConfig::new();
        config.set_wide_mode(wide);
        config.set_tall_mode(tall);
        config.set_wrap(wrap);
        config
    }

    fn target(panel: PanelId, led: usize, row: usize) -> Option<Target> {
        Some(Target { panel, row, led })
    }

    #[test]
    fn test_layout_selection() {
        assert_eq!(config(false, false, false).layout(), Layout::Flat);
        assert_eq!(config(false, true, false).layout(), Layout::Flat);
        assert_eq!(config(true, false, false).layout(), Layout::Wide);
        assert_eq!(config(true, true, false).layout(), Layout::Tall);
    }

    #[test]
    fn test_dimensions() {
        let flat = config(false, false, false);
        assert_eq!((flat.width(), flat.height()), (8, 8));
        let wide = config(true, false, false);
        assert_eq!((wide.width(), wide.height()), (32, 8));
        let tall = config(true, true, false);
        assert_eq!((tall.width(), tall.height()), (32, 16));
    }

    #[test]
    fn test_flat_uses_gfx_panel() {
        let mut flat = CanvasConfig::default();
        assert_eq!(flat.locate(2, 5), target(PanelId::Top, 2, 5));
        flat.set_gfx_panel(PanelId::Right);
        assert_eq!(flat.gfx_panel(), PanelId::Right);
        assert_eq!(flat.locate(7, 0), target(PanelId::Right, 7, 0));
        assert_eq!(flat.locate(8, 0), None);
        assert_eq!(flat.locate(0, 8), None);
        assert_eq!(flat.locate(-1, 0), None);
    }

    #[test]
    fn test_wide_bands() {
        let wide = config(true, false, false);
        assert_eq!(wide.locate(0, 0), target(PanelId::Left, 0, 0));
        assert_eq!(wide.locate(7, 3), target(PanelId::Left, 7, 3));
        assert_eq!(wide.locate(8, 3), target(PanelId::Front, 0, 3));
        assert_eq!(wide.locate(17, 7), target(PanelId::Right, 1, 7));
        assert_eq!(wide.locate(31, 0), target(PanelId::Back, 7, 0));
        assert_eq!(wide.locate(32, 0), None);
        assert_eq!(wide.locate(5, 8), None);
    }

    #[test]
    fn test_wrap_is_euclidean() {
        let wide = config(true, false, true);
        assert_eq!(wide.locate(32, 1), wide.locate(0, 1));
        assert_eq!(wide.locate(-1, 1), target(PanelId::Back, 7, 1));
        assert_eq!(wide.locate(-33, 2), wide.locate(31, 2));
        // vertical coordinates never wrap
        assert_eq!(wide.locate(3, 8), None);
        assert_eq!(wide.locate(3, -1), None);

        let flat = config(false, false, true);
        assert_eq!(flat.locate(9, 0), target(PanelId::Top, 1, 0));
    }

    #[test]
    fn test_tall_side_band() {
        let tall = config(true, true, false);
        assert_eq!(tall.locate(0, 8), target(PanelId::Left, 0, 0));
        assert_eq!(tall.locate(12, 15), target(PanelId::Front, 4, 7));
        assert_eq!(tall.locate(31, 8), target(PanelId::Back, 7, 0));
        assert_eq!(tall.locate(0, 16), None);
    }

    #[test]
    fn test_tall_origin_writes_far_corner_of_top() {
        let mut frames = FrameStore::<2>::default();
        let (mut animate, _display) = frames.split();
        let mut config = config(true, true, false);
        let mut canvas = Canvas::new(&mut animate, &mut config);

        canvas.draw_pixel(0, 0, 0xF800);
        canvas.draw_pixel(0, ROWS as i32, 0x001F);

        let cube = animate.cube().unwrap();
        let top = cube.panel(PanelId::Top);
        assert_eq!(top.pixel(LEDS - 1, 0), Pixel::new(3, 0, 0));
        assert_eq!(top.pixel(0, 0), Pixel::BLACK);
        let left = cube.panel(PanelId::Left);
        assert_eq!(left.pixel(0, 0), Pixel::new(0, 0, 3));
    }

    #[test]
    fn test_tall_top_rotations() {
        let tall = config(true, true, false);
        // Left band: the canvas origin is TOP (LEDS - 1, 0), row ROWS is LEFT
        assert_eq!(tall.locate(0, 0), target(PanelId::Top, 7, 0));
        assert_eq!(tall.locate(0, 8), target(PanelId::Left, 0, 0));
        assert_eq!(tall.locate(0, 7), target(PanelId::Top, 0, 0));
        assert_eq!(tall.locate(7, 7), target(PanelId::Top, 0, 7));
        // Front band maps straight through
        assert_eq!(tall.locate(8, 0), target(PanelId::Top, 0, 0));
        assert_eq!(tall.locate(10, 7), target(PanelId::Top, 2, 7));
        // Right band
        assert_eq!(tall.locate(16, 7), target(PanelId::Top, 7, 7));
        assert_eq!(tall.locate(23, 7), target(PanelId::Top, 7, 0));
        // Back band
        assert_eq!(tall.locate(24, 7), target(PanelId::Top, 7, 0));
        assert_eq!(tall.locate(31, 0), target(PanelId::Top, 0, 7));
    }

    #[test]
    fn test_tall_band_bottom_row_meets_its_side() {
        // The last top-band row of every band lies on the top edge shared
        // with that band's side panel.
        let tall = config(true, true, false);
        for (band, side) in BANDS.iter().enumerate() {
            for x in 0..LEDS {
                let canvas_x = (band * LEDS + x) as i32;
                let top = tall.locate(canvas_x, ROWS as i32 - 1).unwrap();
                let mut cube = Cube::<2>::new([Orientation::Up; PANELS]);
                cube.panel_mut(*side).set_pixel(x, 0, &Pixel::WHITE);
                assert_eq!(
                    top_panel_neighbor(&cube, top.led, top.row, Pixel::BLACK),
                    Some(Pixel::WHITE),
                    "band {band} x {x}"
                );
            }
        }
    }

    #[test]
    fn test_neighbor_edges() {
        let mut cube = Cube::<4>::default();
        for led in 0..LEDS {
            let v = led as u8;
            for (id, pixel) in [
                (PanelId::Front, Pixel::new(v, 0, 0)),
                (PanelId::Left, Pixel::new(0, v, 0)),
                (PanelId::Right, Pixel::new(0, 0, v)),
                (PanelId::Back, Pixel::new(v, v, 0)),
            ] {
                cube.panel_mut(id).set_pixel(led, 0, &pixel);
            }
        }
        let neighbor = |x, y| top_panel_neighbor(&cube, x, y, Pixel::BLACK);
        assert_eq!(neighbor(3, 7), Some(Pixel::new(3, 0, 0)));
        assert_eq!(neighbor(0, 2), Some(Pixel::new(0, 2, 0)));
        assert_eq!(neighbor(7, 2), Some(Pixel::new(0, 0, 5)));
        assert_eq!(neighbor(2, 0), Some(Pixel::new(5, 5, 0)));
    }

    #[test]
    fn test_neighbor_interior_and_out_of_range() {
        let cube = Cube::<2>::default();
        assert_eq!(top_panel_neighbor(&cube, 3, 3, Pixel::BLACK), None);
        assert_eq!(top_panel_neighbor(&cube, 1, 6, Pixel::BLACK), None);
        assert_eq!(top_panel_neighbor(&cube, 8, 0, Pixel::BLACK), None);
        assert_eq!(top_panel_neighbor(&cube, 0, 8, Pixel::BLACK), None);
    }

    #[test]
    fn test_neighbor_corner_blending() {
        let front = Pixel::new(8, 0, 4);
        let left = Pixel::new(2, 6, 1);
        let mut cube = Cube::<4>::default();
        // top-left front corner (0, 7) touches FRONT LED 0 and LEFT LED 7
        cube.panel_mut(PanelId::Front).set_pixel(0, 0, &front);
        let blended = top_panel_neighbor(&cube, 0, 7, Pixel::BLACK);
        assert_eq!(blended, Some(front));

        cube.panel_mut(PanelId::Left).set_pixel(7, 0, &left);
        let blended = top_panel_neighbor(&cube, 0, 7, Pixel::BLACK);
        assert_eq!(blended, Some(Pixel::new(5, 3, 2)));

        // a side equal to the background yields the other side verbatim
        let blended = top_panel_neighbor(&cube, 0, 7, left);
        assert_eq!(blended, Some(front));

        // both sides background
        let cube = Cube::<4>::default();
        assert_eq!(
            top_panel_neighbor(&cube, 7, 0, Pixel::BLACK),
            Some(Pixel::BLACK)
        );
    }

    #[test]
    fn test_draw_pixel_writes_animate_frame() {
        let mut frames = FrameStore::<2>::default();
        let (mut animate, _display) = frames.split();
        let mut config = CanvasConfig::new();
        config.set_wide_mode(true);
        let mut canvas = Canvas::new(&mut animate, &mut config);

        canvas.draw_pixel(9, 2, 0xF800);
        canvas.draw_pixel(40, 2, 0xFFFF);
        assert_eq!(canvas.pixel(9, 2), Some(Pixel::new(3, 0, 0)));

        let cube = animate.cube().unwrap();
        assert_eq!(cube.panel(PanelId::Front).pixel(1, 2), Pixel::new(3, 0, 0));
        assert_eq!(cube.panel(PanelId::Top).pixel(1, 2), Pixel::BLACK);
    }

    #[test]
    fn test_drawing_dropped_while_swap_pending() {
        let mut frames = FrameStore::<2>::default();
        {
            let (mut animate, display) = frames.split();
            animate.request_swap();
            let mut config = CanvasConfig::new();
            let mut canvas = Canvas::new(&mut animate, &mut config);

            canvas.draw_pixel(0, 0, 0xFFFF);
            Rectangle::new(Point::zero(), Size::new(8, 8))
                .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
                .draw(&mut canvas)
                .unwrap();
            assert_eq!(canvas.pixel(0, 0), None);
            assert_eq!(canvas.top_panel_neighbor(0, 0, 0), None);
            assert_eq!(display.panel(PanelId::Top).pixel(0, 0), Pixel::BLACK);
        }

        // neither buffer was touched
        for frame in [Frame::Display, Frame::Animate] {
            let top = frames.panel(frame, PanelId::Top);
            assert_eq!(top.pixel(0, 0), Pixel::BLACK);
        }
    }

    #[test]
    fn test_draw_target_wide_line() {
        let mut frames = FrameStore::<4>::default();
        let (mut animate, _display) = frames.split();
        let mut config = CanvasConfig::new();
        config.set_wide_mode(true);
        let mut canvas = Canvas::new(&mut animate, &mut config);
        assert_eq!(canvas.size(), Size::new(32, 8));

        Line::new(Point::new(0, 4), Point::new(31, 4))
            .into_styled(PrimitiveStyle::with_stroke(Rgb565::CSS_ORANGE, 1))
            .draw(&mut canvas)
            .unwrap();

        let orange = Pixel::<4>::from(Rgb565::CSS_ORANGE);
        for id in BANDS {
            let cube = animate.cube().unwrap();
            for led in 0..LEDS {
                assert_eq!(cube.panel(id).pixel(led, 4), orange);
                assert_eq!(cube.panel(id).pixel(led, 3), Pixel::BLACK);
            }
        }
    }

    #[test]
    fn test_config_changes_apply_to_next_draw() {
        let mut frames = FrameStore::<2>::default();
        let (mut animate, _display) = frames.split();
        let mut config = CanvasConfig::new();
        {
            let mut canvas = Canvas::new(&mut animate, &mut config);
            canvas.draw_pixel(20, 0, 0xFFFF);
            canvas.config_mut().set_wide_mode(true);
            canvas.config_mut().set_tall_mode(true);
            assert_eq!(canvas.size(), Size::new(32, 16));
            canvas.draw_pixel(20, 9, 0xFFFF);
        }
        assert_eq!(config.layout(), Layout::Tall);
        let cube = animate.cube().unwrap();
        assert_eq!(cube.panel(PanelId::Right).pixel(4, 1), Pixel::WHITE);
        assert_eq!(cube.panel(PanelId::Top).pixel(4, 0), Pixel::BLACK);
    }

    #[test]
    fn test_canvas_neighbor_in_packed_colours() {
        let mut frames = FrameStore::<2>::default();
        frames
            .panel_mut(Frame::Animate, PanelId::Front)
            .set_pixel(4, 0, &Pixel::new(0, 3, 0));
        let (mut animate, _display) = frames.split();
        let mut config = CanvasConfig::new();
        let canvas = Canvas::new(&mut animate, &mut config);

        assert_eq!(
            canvas.top_panel_neighbor(4, 7, 0),
            Some(Pixel::<2>::new(0, 3, 0).to_color())
        );
        assert_eq!(canvas.top_panel_neighbor(4, 4, 0), None);
    }
}
