//! Region capture pipeline

use crate::pointer::draw_pointer_arrow;
use crate::{CaptureError, CaptureOptions, CaptureResult, CapturedImage, Rect, VirtualDesktop};

/// Source of screen pixels and pointer position, in native coordinates
pub trait ScreenSource {
    /// Grab the pixels of `region`, which may span several monitors
    fn grab(&self, region: Rect) -> CaptureResult<CapturedImage>;

    /// Live pointer position, `None` if it cannot be read
    fn pointer_position(&self) -> Option<(i32, i32)>;
}

/// Turns a selected virtual-desktop rectangle into an image
pub struct CaptureService<S> {
    source: S,
}

impl<S: ScreenSource> CaptureService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Capture `rect` (virtual coordinates) on `desktop`
    ///
    /// The overlay must already be hidden; this only reads pixels.
    pub fn capture(
        &self,
        desktop: &VirtualDesktop,
        rect: Rect,
        options: &CaptureOptions,
    ) -> CaptureResult<CapturedImage> {
        let clamped = desktop
            .clamp_virtual(&rect)
            .ok_or(CaptureError::EmptyRegion(rect))?;
        if clamped != rect {
            log::warn!("Capture region {:?} clamped to {:?}", rect, clamped);
        }

        let native = desktop.virtual_to_native(&clamped);
        log::debug!("Grabbing native region {:?}", native);
        let mut image = self.source.grab(native)?;

        if options.capture_pointer {
            match self.source.pointer_position() {
                Some((px, py)) if native.contains(px, py) => {
                    let (lx, ly) = (px - native.x, py - native.y);
                    log::debug!("Drawing pointer marker at local ({}, {})", lx, ly);
                    draw_pointer_arrow(image.as_rgba_mut(), lx, ly);
                }
                Some(_) => log::debug!("Pointer outside capture region, no marker"),
                None => log::warn!("Pointer position unavailable, no marker"),
            }
        }

        Ok(image)
    }
}
