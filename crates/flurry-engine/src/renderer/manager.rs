use super::traits::{Surface, Viewport};

/// Platform hook that finds or creates the single drawing surface.
pub trait SurfaceProvider {
    type Surface: Surface;

    /// Return the existing surface, creating it if absent.
    /// `None` means the host is not ready yet; the caller retries later.
    fn acquire(&mut self) -> Option<Self::Surface>;

    /// Current viewport dimensions from the host.
    fn viewport(&self) -> Viewport;
}

/// Owns the drawing surface and keeps it sized to the viewport.
pub struct SurfaceManager<P: SurfaceProvider> {
    provider: P,
    surface: Option<P::Surface>,
}

impl<P: SurfaceProvider> SurfaceManager<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            surface: None,
        }
    }

    /// Obtain the surface once. Returns true when a surface is attached.
    /// Repeated calls never create a second surface.
    pub fn ensure_surface(&mut self) -> bool {
        if self.surface.is_some() {
            return true;
        }
        match self.provider.acquire() {
            Some(surface) => {
                self.surface = Some(surface);
                self.on_resize();
                log::info!("ambient surface attached");
                true
            }
            None => {
                log::debug!("ambient surface host not ready");
                false
            }
        }
    }

    /// Re-read the viewport and resize the surface to match.
    pub fn on_resize(&mut self) {
        let viewport = self.provider.viewport();
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(viewport);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface_mut(&mut self) -> Option<&mut P::Surface> {
        self.surface.as_mut()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }
}
