//! Header rows and name-based column lookup.
//!
//! This module provides [`Header`], the optional first row naming the
//! columns. Its name → column index map is built on the first lookup, using
//! [`IndexMap`] so the map iterates in column order.
//!
//! Duplicate names do not prevent reading or writing the header itself, but
//! they make every name lookup fail with [`Error::DuplicateHeader`] rather
//! than silently picking one of the columns.
//!
//! ## Examples
//!
//! ```rust
//! use csv_codec::Header;
//!
//! let mut header = Header::new(vec!["id".to_string(), "name".to_string()]);
//! assert_eq!(header.index_of("name").unwrap(), 1);
//! assert!(header.index_of("email").is_err());
//! ```

use crate::{Error, Result};
use indexmap::IndexMap;

/// A header row with a lazily built name lookup.
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
    lookup: Option<std::result::Result<IndexMap<String, usize>, Error>>,
}

impl Header {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Header {
            names,
            lookup: None,
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn build(names: &[String]) -> Result<IndexMap<String, usize>> {
        let mut lookup = IndexMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if let Some(first) = lookup.insert(name.clone(), index) {
                return Err(Error::DuplicateHeader {
                    name: name.clone(),
                    first,
                    second: index,
                });
            }
        }
        Ok(lookup)
    }

    /// Returns the column index of `name`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateHeader`] if any name repeats, [`Error::NameNotFound`]
    /// if no column has this name.
    pub fn index_of(&mut self, name: &str) -> Result<usize> {
        let names = &self.names;
        let lookup = self
            .lookup
            .get_or_insert_with(|| Header::build(names))
            .as_ref()
            .map_err(Clone::clone)?;
        lookup
            .get(name)
            .copied()
            .ok_or_else(|| Error::NameNotFound(name.to_string()))
    }
}
