//! Renderer Module - Cell grids and terminal output
//!
//! - [`FrameBuffer`]: the cell grid every surface draws into
//! - [`DiffRenderer`]: pushes changed cells of a frame to a writer

pub mod buffer;
pub mod diff;

pub use buffer::FrameBuffer;
pub use diff::DiffRenderer;
