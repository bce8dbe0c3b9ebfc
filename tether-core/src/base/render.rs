//! Frame source of an environment.
use anyhow::Result;
use image::RgbImage;

/// An environment that can draw its current state as an RGB frame.
pub trait Render {
    /// Renders the current state.
    fn render(&self) -> Result<RgbImage>;
}
