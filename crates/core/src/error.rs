//! Error types for the grid and compositor.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Point ({x}, {y}) is outside a {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("Area {width}x{height} at ({x}, {y}) does not fit the {target_width}x{target_height} grid")]
    AreaOutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        target_width: usize,
        target_height: usize,
    },

    #[error("Invalid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Renderable on layer {layer} at ({x}, {y}) lies outside the frame")]
    OutOfFrame { layer: i32, x: i32, y: i32 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelError {
    #[error("Control character U+{0:04X} cannot be displayed")]
    ControlCharacter(u32),
}
