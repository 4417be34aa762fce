//! Periodic invocation of a user draw callback.
//!
//! The scheduler is ticked from the animation context (a slow timer or the
//! main loop). Every `period` ticks it hands the callback a [`Canvas`] over
//! the ANIMATE frame. A callback returning `true` marks the frame finished and
//! requests a deferred swap; the refresh engine picks it up at the end of its
//! current cycle.
//!
//! ```rust
//! use ledcube_framebuffer::animation::AnimationScheduler;
//! use ledcube_framebuffer::canvas::Canvas;
//! use ledcube_framebuffer::frame::FrameStore;
//!
//! let mut frames = FrameStore::<4>::default();
//! let (mut animate, mut display) = frames.split();
//! let mut frame = 0;
//! let mut scheduler = AnimationScheduler::with_callback(2, |canvas: &mut Canvas<'_, '_, 4>| {
//!     canvas.draw_pixel(frame % 8, 0, 0xFFFF);
//!     frame += 1;
//!     true
//! });
//!
//! assert!(!scheduler.tick(&mut animate));
//! assert!(scheduler.tick(&mut animate));
//! assert!(display.is_swap_pending());
//! ```

use crate::canvas::{Canvas, CanvasConfig};
use crate::frame::AnimateHandle;

/// Runs a draw callback every `period` ticks.
pub struct AnimationScheduler<const BITS: u8, F> {
    period: u32,
    elapsed: u32,
    callback: Option<F>,
    config: CanvasConfig,
}

impl<const BITS: u8, F> AnimationScheduler<BITS, F> {
    /// A scheduler without a callback. Ticking it does nothing until one is
    /// registered.
    #[must_use]
    pub const fn new(period: u32) -> Self {
        Self {
            period,
            elapsed: 0,
            callback: None,
            config: CanvasConfig::new(),
        }
    }

    /// Remove the callback and hand it back.
    pub fn unregister(&mut self) -> Option<F> {
        self.elapsed = 0;
        self.callback.take()
    }

    /// Whether a callback is registered.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.callback.is_some()
    }

    /// Ticks between callback invocations.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// The canvas configuration handed to the callback.
    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// The canvas configuration, mutably.
    pub fn config_mut(&mut self) -> &mut CanvasConfig {
        &mut self.config
    }
}

impl<const BITS: u8, F> AnimationScheduler<BITS, F>
where
    F: FnMut(&mut Canvas<'_, '_, BITS>) -> bool,
{
    /// A scheduler running `callback` every `period` ticks.
    pub fn with_callback(period: u32, callback: F) -> Self {
        let mut scheduler = Self::new(period);
        scheduler.register(period, callback);
        scheduler
    }

    /// Replace the callback and its period. The tick count restarts.
    pub fn register(&mut self, period: u32, callback: F) {
        self.period = period;
        self.elapsed = 0;
        self.callback = Some(callback);
    }

    /// Count one tick and run the callback when the period has elapsed.
    /// A period of 0 runs on every tick.
    ///
    /// The count only restarts once the callback has run, so a run skipped
    /// because a swap is still pending is retried on the next tick.
    ///
    /// Returns whether a swap was requested.
    pub fn tick(&mut self, frames: &mut AnimateHandle<'_, BITS>) -> bool {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed < self.period.max(1) {
            return false;
        }
        match self.invoke(frames) {
            Some(finished) => {
                self.elapsed = 0;
                finished
            }
            None => false,
        }
    }

    /// Run the callback now.
    ///
    /// Nothing happens without a callback or while the previous frame has
    /// not been adopted by the refresh engine. The outputs are held blanked
    /// while the callback runs. Returns whether a swap was requested.
    pub fn run(&mut self, frames: &mut AnimateHandle<'_, BITS>) -> bool {
        self.invoke(frames).unwrap_or(false)
    }

    /// The callback's result, or `None` when it did not run.
    fn invoke(&mut self, frames: &mut AnimateHandle<'_, BITS>) -> Option<bool> {
        let callback = self.callback.as_mut()?;
        if frames.is_swap_pending() {
            return None;
        }

        let was_blanked = frames.is_blanked();
        if !was_blanked {
            frames.set_blanked(true);
        }

        let finished = callback(&mut Canvas::new(frames, &mut self.config));
        if finished {
            frames.request_swap();
        }

        if !was_blanked {
            frames.set_blanked(false);
        }
        Some(finished)
    }
}

impl<const BITS: u8, F> core::fmt::Debug for AnimationScheduler<BITS, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("period", &self.period)
            .field("elapsed", &self.elapsed)
            .field("registered", &self.callback.is_some())
            .field("config", &self.config)
            .finish()
    }
}
