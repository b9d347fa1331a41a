use std::{error::Error, fmt::Display, io};

/// Anything that can go wrong while driving the terminal.
#[derive(Debug)]
pub enum VizGuiError {
    /// Setting up, drawing to or restoring the terminal failed.
    IOError(io::Error),
}

impl Display for VizGuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VizGuiError::IOError(e) => write!(f, "terminal error: {e}"),
        }
    }
}

impl Error for VizGuiError {}

impl From<io::Error> for VizGuiError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value)
    }
}
