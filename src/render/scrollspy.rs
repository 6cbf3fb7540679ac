//! Tracks which heading is currently being read.

/// Vertical band of the viewport, as fractions of its height, in which a
/// heading counts as active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBand {
    pub top: f64,
    pub bottom: f64,
}

impl Default for ActiveBand {
    fn default() -> Self {
        Self {
            top: 0.2,
            bottom: 0.8,
        }
    }
}

/// A heading's current offset from the top of the viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingPosition<'a> {
    pub id: &'a str,
    pub top: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Scrollspy {
    band: ActiveBand,
    active: Option<String>,
}

impl Scrollspy {
    pub fn new(band: ActiveBand) -> Self {
        Self { band, active: None }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Feed the current heading positions after a scroll or resize.
    ///
    /// The first heading (in document order) inside the band becomes
    /// active. With no heading inside the band the previous one stays.
    pub fn update(&mut self, viewport_height: f64, positions: &[HeadingPosition<'_>]) -> Option<&str> {
        let top = viewport_height * self.band.top;
        let bottom = viewport_height * self.band.bottom;

        if let Some(hit) = positions.iter().find(|p| p.top >= top && p.top < bottom) {
            if self.active.as_deref() != Some(hit.id) {
                self.active = Some(hit.id.to_string());
            }
        }
        self.active()
    }
}
