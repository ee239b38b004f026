//! Entry-aligned pagination over a collected mapping.
//!
//! A page is a window over the mapping's top-level entries. Buckets are never
//! split: a table's records always land on one page together.

use crate::mapping::{AffectedTable, CollectedMapping};
use ondelete_core::error::ConfigError;
use ondelete_core::{Error, InvalidPageError, InvalidPageKind, Result};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::ops::RangeInclusive;

/// Entries per page when no size is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Read-only paginator borrowing a mapping's entries.
#[derive(Debug, Clone, Copy)]
pub struct PagedResultView<'a> {
    entries: &'a [AffectedTable],
    page_size: usize,
}

impl<'a> PagedResultView<'a> {
    /// Paginate `mapping` with `page_size` entries per page.
    ///
    /// A page size of zero is rejected as a configuration error.
    pub fn new(mapping: &'a CollectedMapping, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::Config(ConfigError {
                message: "page size must be at least 1".to_string(),
            }));
        }
        Ok(Self {
            entries: mapping.entries(),
            page_size,
        })
    }

    /// Paginate with `DEFAULT_PAGE_SIZE`.
    pub fn with_default_page_size(mapping: &'a CollectedMapping) -> Self {
        Self {
            entries: mapping.entries(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Total number of entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(count / page_size)`; zero when there are no entries.
    pub fn num_pages(&self) -> usize {
        self.entries.len().div_ceil(self.page_size)
    }

    /// Valid page numbers, 1-based. Empty when there are no entries.
    pub fn page_range(&self) -> RangeInclusive<usize> {
        1..=self.num_pages()
    }

    /// Check a page number without building the page.
    pub fn validate_number(&self, number: usize) -> Result<usize> {
        let num_pages = self.num_pages();
        let kind = if number < 1 {
            InvalidPageKind::LessThanOne
        } else if num_pages == 0 {
            InvalidPageKind::NoResults
        } else if number > num_pages {
            InvalidPageKind::OutOfRange
        } else {
            return Ok(number);
        };
        Err(Error::InvalidPage(InvalidPageError {
            kind,
            requested: number,
            num_pages,
        }))
    }

    /// Page `number` (1-based).
    pub fn get_page(&self, number: usize) -> Result<Page<'a>> {
        let number = self.validate_number(number)?;
        Ok(self.page_unchecked(number))
    }

    /// The final page. Fails with `NoResults` when there are no entries.
    pub fn last_page(&self) -> Result<Page<'a>> {
        let num_pages = self.num_pages();
        if num_pages == 0 {
            return Err(Error::InvalidPage(InvalidPageError {
                kind: InvalidPageKind::NoResults,
                requested: 0,
                num_pages,
            }));
        }
        Ok(self.page_unchecked(num_pages))
    }

    /// Every page, in order.
    pub fn pages(&self) -> impl Iterator<Item = Page<'a>> {
        let view = *self;
        self.page_range().map(move |n| view.page_unchecked(n))
    }

    fn page_unchecked(&self, number: usize) -> Page<'a> {
        let start = (number - 1) * self.page_size;
        let end = (start + self.page_size).min(self.entries.len());
        Page {
            entries: &self.entries[start..end],
            number,
            num_pages: self.num_pages(),
            page_size: self.page_size,
        }
    }
}

/// One page of entries.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    entries: &'a [AffectedTable],
    number: usize,
    num_pages: usize,
    page_size: usize,
}

impl<'a> Page<'a> {
    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// The entries on this page.
    pub fn entries(&self) -> &'a [AffectedTable] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'a, AffectedTable> {
        self.entries.iter()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based position of the first entry on this page, 0 when empty.
    pub fn start_index(&self) -> usize {
        if self.entries.is_empty() {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }

    /// 1-based position of the last entry on this page, 0 when empty.
    pub fn end_index(&self) -> usize {
        if self.entries.is_empty() {
            0
        } else {
            self.start_index() + self.entries.len() - 1
        }
    }
}

impl<'a> IntoIterator for Page<'a> {
    type Item = &'a AffectedTable;
    type IntoIter = std::slice::Iter<'a, AffectedTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Page<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 5)?;
        state.serialize_field("number", &self.number)?;
        state.serialize_field("num_pages", &self.num_pages)?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("has_previous", &self.has_previous())?;
        state.serialize_field("entries", self.entries)?;
        state.end()
    }
}
