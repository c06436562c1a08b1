//! Page index newtype for safe conversion between usize and i32.
//!
//! mupdf addresses pages with an i32 while the rest of the crate counts in
//! usize; this wrapper centralizes the checked conversion in one place.

use std::fmt;

use crate::error::Error;

/// A page index that can be safely used with mupdf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageIndex(i32);

impl PageIndex {
    /// Create a new PageIndex from an i32 value.
    ///
    /// This should only be used when you already have a valid i32 page index.
    #[must_use]
    pub const fn new(index: i32) -> Self {
        Self(index)
    }

    /// Get the underlying i32 value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Try to create a PageIndex from a usize page number.
    ///
    /// Returns an error if the page number is too large to fit in an i32
    /// or exceeds the total page count.
    pub fn try_from_page_num(page_num: usize, total_pages: usize) -> Result<Self, Error> {
        if page_num >= total_pages {
            return Err(Error::PdfInvalidPage {
                page: page_num,
                total: total_pages,
            });
        }

        let index = i32::try_from(page_num).map_err(|_| Error::PdfInvalidPage {
            page: page_num,
            total: total_pages,
        })?;

        Ok(Self(index))
    }
}

impl From<PageIndex> for i32 {
    fn from(index: PageIndex) -> Self {
        index.0
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_index_creation() {
        let idx = PageIndex::new(5);
        assert_eq!(idx.as_i32(), 5);
    }

    #[test]
    fn test_try_from_page_num_valid() {
        let idx = PageIndex::try_from_page_num(5, 10).unwrap();
        assert_eq!(idx.as_i32(), 5);
    }

    #[test]
    fn test_try_from_page_num_out_of_range() {
        let result = PageIndex::try_from_page_num(10, 5);
        assert!(result.is_err());
    }

    #[test]
    fn test_into_i32() {
        let idx = PageIndex::new(42);
        let value: i32 = idx.into();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_display() {
        let idx = PageIndex::new(7);
        assert_eq!(format!("{idx}"), "7");
    }
}
