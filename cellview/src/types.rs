use crate::ConfigError;

/// Which axis scrolls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    /// Size along the scroll axis.
    pub fn main(self, rect: Rect) -> u32 {
        match self {
            Self::Vertical => rect.height,
            Self::Horizontal => rect.width,
        }
    }

    /// Size across the scroll axis.
    pub fn cross(self, rect: Rect) -> u32 {
        match self {
            Self::Vertical => rect.width,
            Self::Horizontal => rect.height,
        }
    }

    /// Offset along the scroll axis.
    pub fn main_offset(self, pos: ScrollPosition) -> u64 {
        match self {
            Self::Vertical => pos.y,
            Self::Horizontal => pos.x,
        }
    }

    pub fn cross_offset(self, pos: ScrollPosition) -> u64 {
        match self {
            Self::Vertical => pos.x,
            Self::Horizontal => pos.y,
        }
    }

    /// Returns `pos` with its main-axis component replaced.
    pub fn with_main_offset(self, pos: ScrollPosition, offset: u64) -> ScrollPosition {
        match self {
            Self::Vertical => ScrollPosition { y: offset, ..pos },
            Self::Horizontal => ScrollPosition { x: offset, ..pos },
        }
    }

    /// Builds a point from main/cross components.
    pub fn point(self, main: u64, cross: u64) -> ScrollPosition {
        match self {
            Self::Vertical => ScrollPosition { x: cross, y: main },
            Self::Horizontal => ScrollPosition { x: main, y: cross },
        }
    }
}

/// Viewport or cell size in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A two-axis scroll offset (or a logical position), in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollPosition {
    pub x: u64,
    pub y: u64,
}

impl ScrollPosition {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }
}

/// How many extra cells are kept on each side of the visible ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BufferSize {
    Small = 1,
    #[default]
    Medium = 2,
    Big = 3,
}

impl BufferSize {
    pub const fn cells(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for BufferSize {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Small),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Big),
            other => Err(ConfigError::InvalidBufferSize(other)),
        }
    }
}

impl From<BufferSize> for u8 {
    fn from(value: BufferSize) -> Self {
        value as u8
    }
}

/// Where a live cell sits in content coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellBounds {
    pub x: u64,
    pub y: u64,
    pub width: u32,
    pub height: u32,
}

impl CellBounds {
    pub fn right(&self) -> u64 {
        self.x.saturating_add(self.width as u64)
    }

    pub fn bottom(&self) -> u64 {
        self.y.saturating_add(self.height as u64)
    }
}
