//! Error types raised by the toolkit.

use std::io;

use thiserror::Error;

use crate::registry::Handle;
use crate::types::{ObjectType, Rect};

/// Errors surfaced by windows, screens and widgets.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot create surface {rect}: {reason}")]
    SurfaceCreation { rect: Rect, reason: &'static str },

    #[error("cannot create {kind:?} widget: {reason}")]
    ResourceCreation { kind: ObjectType, reason: String },

    #[error("cannot move window to ({x}, {y}): outside its bounds")]
    OutOfBounds { x: i32, y: i32 },

    #[error("handle {0} is no longer live")]
    StaleHandle(Handle),

    #[error("the terminal is already owned by another context")]
    AlreadyInitialized,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn resource(kind: ObjectType, reason: impl Into<String>) -> Self {
        Error::ResourceCreation {
            kind,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
