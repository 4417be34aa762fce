//! Double-buffered frame storage and the buffer swap protocol.
//!
//! A [`FrameStore`] owns two complete [`Cube`]s. At any moment one of them
//! plays the [`Frame::Display`] role (streamed by the refresh engine) and the
//! other the [`Frame::Animate`] role (drawn into by the animation). The role
//! mapping is a single atomic buffer index, so the two roles can never point at
//! the same buffer.
//!
//! # Swapping
//!
//! - [`FrameStore::swap_buffers`] with `immediate = true` exchanges the roles
//!   on the spot. It needs `&mut FrameStore`, which guarantees the refresh
//!   engine is not running.
//! - The deferred path sets a pending flag ([`AnimateHandle::request_swap`]).
//!   The refresh engine adopts it at the end of a full refresh cycle through
//!   [`DisplayHandle::adopt_pending_swap`], so a frame is never replaced in
//!   the middle of a row or sub-cycle.
//!
//! # Sharing between contexts
//!
//! [`FrameStore::split`] returns an [`AnimateHandle`] for the animation
//! context and a [`DisplayHandle`] for the refresh context. No locks are
//! involved:
//! - the animation side only ever touches the ANIMATE buffer, and only while
//!   no swap is pending,
//! - the display side only reads the DISPLAY buffer and is the only one that
//!   changes the role mapping,
//! - the pending flag, the role index and the blanking request are each a
//!   single atomic word.
//!
//! # Example
//! ```rust
//! use ledcube_framebuffer::frame::FrameStore;
//! use ledcube_framebuffer::{Frame, PanelId, Pixel};
//!
//! let mut frames = FrameStore::<2>::default();
//! frames
//!     .panel_mut(Frame::Animate, PanelId::Top)
//!     .fill(&Pixel::new(3, 0, 0));
//! frames.swap_buffers(true);
//! assert_eq!(
//!     frames.panel(Frame::Display, PanelId::Top).pixel(0, 0),
//!     Pixel::new(3, 0, 0)
//! );
//! ```

use core::cell::UnsafeCell;

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::panel::{Cube, Panel};
use crate::{Frame, Orientation, PanelId, Pixel, DEFAULT_ORIENTATIONS, PANELS};

/// Two cube buffers plus the shared role and swap state.
pub struct FrameStore<const BITS: u8> {
    buffers: [UnsafeCell<Cube<BITS>>; 2],
    display: AtomicU8,
    swap_pending: AtomicBool,
    blanked: AtomicBool,
}

// SAFETY: the buffers are only reached through `&mut FrameStore` or through
// the handles returned by `split`, which borrow the store mutably. The
// animate handle only dereferences the buffer that is not displayed and only
// while no swap is pending; the display handle only reads the displayed
// buffer and alone changes which buffer that is, after observing the pending
// flag the animate handle released.
unsafe impl<const BITS: u8> Sync for FrameStore<BITS> {}

impl<const BITS: u8> FrameStore<BITS> {
    /// Create a store with both buffers dark and configured with the same
    /// panel orientations (indexed by [`PanelId`]).
    ///
    /// Buffer 1 starts out as DISPLAY, buffer 0 as ANIMATE.
    #[must_use]
    pub const fn new(orientations: [Orientation; PANELS]) -> Self {
        Self {
            buffers: [
                UnsafeCell::new(Cube::new(orientations)),
                UnsafeCell::new(Cube::new(orientations)),
            ],
            display: AtomicU8::new(1),
            swap_pending: AtomicBool::new(false),
            blanked: AtomicBool::new(false),
        }
    }

    fn index(&self, frame: Frame) -> usize {
        let display = usize::from(self.display.load(Ordering::Acquire));
        match frame {
            Frame::Display => display,
            Frame::Animate => display ^ 1,
        }
    }

    /// Physical buffer index currently playing the DISPLAY role.
    #[must_use]
    pub fn display_index(&self) -> usize {
        self.index(Frame::Display)
    }

    /// The cube playing `frame`.
    #[must_use]
    pub fn cube(&self, frame: Frame) -> &Cube<BITS> {
        let index = self.index(frame);
        // SAFETY: handles borrow the store mutably, so while `&self` is alive
        // none exist, and every other mutable access goes through `&mut self`.
        unsafe { &*self.buffers[index].get() }
    }

    /// The cube playing `frame`, mutably.
    pub fn cube_mut(&mut self, frame: Frame) -> &mut Cube<BITS> {
        let index = self.index(frame);
        self.buffers[index].get_mut()
    }

    /// One panel of the cube playing `frame`.
    #[must_use]
    pub fn panel(&self, frame: Frame, id: PanelId) -> &Panel<BITS> {
        self.cube(frame).panel(id)
    }

    /// One panel of the cube playing `frame`, mutably.
    pub fn panel_mut(&mut self, frame: Frame, id: PanelId) -> &mut Panel<BITS> {
        self.cube_mut(frame).panel_mut(id)
    }

    /// Fill one panel in both buffers.
    pub fn fill_panel(&mut self, id: PanelId, pixel: &Pixel<BITS>) {
        for buffer in &mut self.buffers {
            buffer.get_mut().panel_mut(id).fill(pixel);
        }
    }

    /// Turn every LED off in both buffers.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.get_mut().clear();
        }
    }

    /// Exchange the DISPLAY and ANIMATE roles.
    ///
    /// With `immediate` the roles change right away and any pending request
    /// is dropped. Otherwise the swap is left pending for the refresh engine
    /// to adopt at its next cycle boundary.
    pub fn swap_buffers(&mut self, immediate: bool) {
        if immediate {
            let display = self.display.load(Ordering::Relaxed);
            self.display.store(display ^ 1, Ordering::Relaxed);
            self.swap_pending.store(false, Ordering::Relaxed);
        } else {
            self.swap_pending.store(true, Ordering::Release);
        }
    }

    /// Whether a deferred swap is waiting for the refresh engine.
    #[must_use]
    pub fn is_swap_pending(&self) -> bool {
        self.swap_pending.load(Ordering::Acquire)
    }

    /// Whether the animation side asked for the LED outputs to stay blanked.
    #[must_use]
    pub fn is_blanked(&self) -> bool {
        self.blanked.load(Ordering::Acquire)
    }

    /// Split the store into one handle per execution context.
    ///
    /// Debug builds check that both buffers agree on every panel orientation.
    pub fn split(&mut self) -> (AnimateHandle<'_, BITS>, DisplayHandle<'_, BITS>) {
        debug_assert_eq!(
            self.cube(Frame::Display).orientations(),
            self.cube(Frame::Animate).orientations(),
            "both frame buffers must use the same panel orientations"
        );
        let store: &FrameStore<BITS> = self;
        (AnimateHandle { store }, DisplayHandle { store })
    }

    /// Log every panel of both buffers.
    #[cfg(feature = "defmt")]
    pub fn dump(&self) {
        for frame in [Frame::Display, Frame::Animate] {
            for (id, panel) in self.cube(frame).iter() {
                defmt::info!("dumpPanel [{}][{}]\n{}", frame, id.name(), panel);
            }
        }
    }
}

impl<const BITS: u8> Default for FrameStore<BITS> {
    fn default() -> Self {
        Self::new(DEFAULT_ORIENTATIONS)
    }
}

impl<const BITS: u8> core::fmt::Debug for FrameStore<BITS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameStore")
            .field("bits", &BITS)
            .field("display", &self.display_index())
            .field("swap_pending", &self.is_swap_pending())
            .field("blanked", &self.is_blanked())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<const BITS: u8> defmt::Format for FrameStore<BITS> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "FrameStore<{}> display: {} swap_pending: {} blanked: {}",
            BITS,
            self.display_index(),
            self.is_swap_pending(),
            self.is_blanked()
        );
    }
}

/// Animation-side access to a [`FrameStore`]: the ANIMATE buffer only.
pub struct AnimateHandle<'a, const BITS: u8> {
    store: &'a FrameStore<BITS>,
}

impl<const BITS: u8> AnimateHandle<'_, BITS> {
    /// The ANIMATE cube, or `None` while a swap is pending.
    #[must_use]
    pub fn cube(&self) -> Option<&Cube<BITS>> {
        if self.is_swap_pending() {
            return None;
        }
        let index = self.store.index(Frame::Animate);
        // SAFETY: see `FrameStore`'s `Sync` impl. With no swap pending the
        // refresh side never touches the ANIMATE buffer.
        Some(unsafe { &*self.store.buffers[index].get() })
    }

    /// The ANIMATE cube mutably, or `None` while a swap is pending.
    pub fn cube_mut(&mut self) -> Option<&mut Cube<BITS>> {
        if self.is_swap_pending() {
            return None;
        }
        let index = self.store.index(Frame::Animate);
        // SAFETY: as for `cube`; `&mut self` keeps this the only reference
        // handed out by this handle, and `request_swap` cannot run while it
        // is alive.
        Some(unsafe { &mut *self.store.buffers[index].get() })
    }

    /// One panel of the ANIMATE cube, mutably.
    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel<BITS>> {
        self.cube_mut().map(|cube| cube.panel_mut(id))
    }

    /// Hand the ANIMATE buffer to the refresh engine.
    ///
    /// The swap happens at the end of the refresh cycle in progress. Until
    /// then [`cube`](Self::cube) and [`cube_mut`](Self::cube_mut) return
    /// `None`.
    pub fn request_swap(&mut self) {
        self.store.swap_pending.store(true, Ordering::Release);
    }

    /// Whether a requested swap has not been adopted yet.
    #[must_use]
    pub fn is_swap_pending(&self) -> bool {
        self.store.is_swap_pending()
    }

    /// Ask the refresh engine to keep the LED outputs blanked.
    pub fn set_blanked(&self, blanked: bool) {
        self.store.blanked.store(blanked, Ordering::Release);
    }

    /// Whether the LED outputs are requested blanked.
    #[must_use]
    pub fn is_blanked(&self) -> bool {
        self.store.is_blanked()
    }
}

/// Refresh-side access to a [`FrameStore`]: the DISPLAY buffer only.
pub struct DisplayHandle<'a, const BITS: u8> {
    store: &'a FrameStore<BITS>,
}

impl<const BITS: u8> DisplayHandle<'_, BITS> {
    /// The DISPLAY cube.
    #[inline]
    #[must_use]
    pub fn cube(&self) -> &Cube<BITS> {
        let index = self.store.index(Frame::Display);
        // SAFETY: see `FrameStore`'s `Sync` impl. The animation side never
        // writes the DISPLAY buffer, and the role mapping only changes in
        // `adopt_pending_swap`, which needs `&mut self`.
        unsafe { &*self.store.buffers[index].get() }
    }

    /// One panel of the DISPLAY cube.
    #[inline]
    #[must_use]
    pub fn panel(&self, id: PanelId) -> &Panel<BITS> {
        self.cube().panel(id)
    }

    /// Whether the animation side asked for the outputs to stay blanked.
    #[inline]
    #[must_use]
    pub fn is_blanked(&self) -> bool {
        self.store.is_blanked()
    }

    /// Whether a swap is waiting to be adopted.
    #[must_use]
    pub fn is_swap_pending(&self) -> bool {
        self.store.is_swap_pending()
    }

    /// Perform a pending swap, if any. Returns whether the roles changed.
    ///
    /// Only call this at a refresh cycle boundary.
    pub fn adopt_pending_swap(&mut self) -> bool {
        if !self.store.swap_pending.load(Ordering::Acquire) {
            return false;
        }
        let display = self.store.display.load(Ordering::Relaxed) ^ 1;
        self.store.display.store(display, Ordering::Relaxed);
        self.store.swap_pending.store(false, Ordering::Release);
        #[cfg(feature = "defmt")]
        defmt::trace!("frame swap, display buffer {}", display);
        true
    }
}
