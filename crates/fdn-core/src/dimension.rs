//! Network dimension (number of parallel delay lines)

use serde::{Deserialize, Serialize};

use crate::FdnError;

/// Supported feedback delay network sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum FdnDimension {
    D2 = 2,
    D4 = 4,
    D8 = 8,
    D16 = 16,
}

impl FdnDimension {
    /// All dimensions, smallest first
    pub const ALL: [FdnDimension; 4] = [Self::D2, Self::D4, Self::D8, Self::D16];

    /// Largest supported number of delay lines
    pub const MAX_LINES: usize = 16;

    /// Number of delay lines
    #[inline]
    pub const fn lines(self) -> usize {
        self as usize
    }

    /// Position in a table ordered like [`FdnDimension::ALL`] (`log2(lines) - 1`)
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::D2 => 0,
            Self::D4 => 1,
            Self::D8 => 2,
            Self::D16 => 3,
        }
    }
}

impl Default for FdnDimension {
    fn default() -> Self {
        Self::D4
    }
}

impl TryFrom<usize> for FdnDimension {
    type Error = FdnError;

    fn try_from(lines: usize) -> Result<Self, Self::Error> {
        match lines {
            2 => Ok(Self::D2),
            4 => Ok(Self::D4),
            8 => Ok(Self::D8),
            16 => Ok(Self::D16),
            other => Err(FdnError::InvalidDimension(other)),
        }
    }
}

impl std::fmt::Display for FdnDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.lines(), self.lines())
    }
}
