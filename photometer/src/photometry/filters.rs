//! Named filter lookup.
//!
//! Callers register the bandpasses they have available (measured curves
//! they loaded themselves, or the idealised set from [`FilterCatalog::sloan`])
//! and hand them to observation requests by name.

use std::collections::BTreeMap;

use thiserror::Error;

use super::Bandpass;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterCatalogError {
    #[error("filter `{0}` is already registered")]
    Duplicate(String),

    #[error("unknown filter `{name}`, available: {available:?}")]
    Unknown { name: String, available: Vec<String> },
}

/// Mapping from filter name to bandpass
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    filters: BTreeMap<String, Bandpass>,
}

impl FilterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idealised top-hat approximations of the SDSS u'g'r'i'z' filters
    pub fn sloan() -> Self {
        let edges = [
            ("u'", 320.0, 385.0),
            ("g'", 401.0, 550.0),
            ("r'", 562.0, 695.0),
            ("i'", 695.0, 844.0),
            ("z'", 826.0, 1000.0),
        ];

        let mut catalog = Self::new();
        for (name, lower_nm, upper_nm) in edges {
            let bandpass = Bandpass::top_hat(name, lower_nm, upper_nm)
                .expect("Sloan filter edges are positive and ordered");
            catalog.filters.insert(name.to_string(), bandpass);
        }
        catalog
    }

    /// Register a bandpass under its own name
    pub fn insert(&mut self, bandpass: Bandpass) -> Result<(), FilterCatalogError> {
        let name = bandpass.name().to_string();
        if self.filters.contains_key(&name) {
            return Err(FilterCatalogError::Duplicate(name));
        }
        self.filters.insert(name, bandpass);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Bandpass, FilterCatalogError> {
        self.filters
            .get(name)
            .ok_or_else(|| FilterCatalogError::Unknown {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    /// Filter names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
