//! Size: A column/row extent used for preferred bounds.

use unicode_width::UnicodeWidthStr;

/// A size in terminal cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Zero-sized extent.
    pub const ZERO: Self = Self::new(0, 0);

    /// Check if the size covers no cells.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Element-wise maximum of two sizes.
    #[inline]
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        Self::new(
            if self.width > other.width { self.width } else { other.width },
            if self.height > other.height { self.height } else { other.height },
        )
    }

    /// Check if `other` fits inside this size on both axes.
    #[inline]
    pub const fn contains(&self, other: &Self) -> bool {
        other.width <= self.width && other.height <= self.height
    }

    /// Measure a block of lines.
    ///
    /// The width is the widest line in display columns (wide characters
    /// count twice), the height is the number of lines. Both saturate at
    /// `u16::MAX`.
    pub fn of_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let width = lines
            .iter()
            .map(|line| UnicodeWidthStr::width(line.as_ref()))
            .max()
            .unwrap_or(0);
        Self::new(
            u16::try_from(width).unwrap_or(u16::MAX),
            u16::try_from(lines.len()).unwrap_or(u16::MAX),
        )
    }
}

impl std::fmt::Debug for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Size({}x{})", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_max_is_elementwise() {
        let a = Size::new(5, 1);
        let b = Size::new(2, 3);
        assert_eq!(a.max(b), Size::new(5, 3));
        assert_eq!(b.max(a), Size::new(5, 3));
    }

    #[test]
    fn test_size_of_lines() {
        assert_eq!(Size::of_lines(&["-"]), Size::new(1, 1));
        assert_eq!(Size::of_lines(&["ab", "abcd", ""]), Size::new(4, 3));
        assert_eq!(Size::of_lines::<&str>(&[]), Size::ZERO);
    }

    #[test]
    fn test_size_of_lines_wide_chars() {
        // CJK ideographs take two columns each
        assert_eq!(Size::of_lines(&["日本"]), Size::new(4, 1));
    }

    #[test]
    fn test_size_contains() {
        let big = Size::new(10, 4);
        assert!(big.contains(&Size::new(10, 4)));
        assert!(big.contains(&Size::new(3, 1)));
        assert!(!big.contains(&Size::new(11, 1)));
        assert!(Size::new(0, 3).is_empty());
        assert!(!big.is_empty());
    }
}
