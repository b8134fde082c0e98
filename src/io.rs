// SPDX-License-Identifier: Apache-2.0

/// Represents the direction (`Input`, `Output`, or `Internal`) and bit width
/// of a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IO {
    Input(usize),
    Output(usize),
    /// A wire local to its module; invisible at the module boundary.
    Internal(usize),
}

impl IO {
    /// Returns the width of the signal in bits.
    pub fn width(&self) -> usize {
        match self {
            IO::Input(width) => *width,
            IO::Output(width) => *width,
            IO::Internal(width) => *width,
        }
    }

    /// Returns a new IO enum with the same width but the opposite direction.
    pub fn flip(&self) -> IO {
        match self {
            IO::Input(width) => IO::Output(*width),
            IO::Output(width) => IO::Input(*width),
            IO::Internal(width) => IO::Internal(*width),
        }
    }

    /// Returns a new IO enum with the same direction but a different width.
    pub fn with_width(&self, width: usize) -> IO {
        match self {
            IO::Input(_) => IO::Input(width),
            IO::Output(_) => IO::Output(width),
            IO::Internal(_) => IO::Internal(width),
        }
    }

    pub fn is_port(&self) -> bool {
        !matches!(self, IO::Internal(_))
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            IO::Input(_) => "Input",
            IO::Output(_) => "Output",
            IO::Internal(_) => "Internal",
        }
    }
}
