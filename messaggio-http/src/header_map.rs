// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use hashbrown::HashMap;
use unicase::UniCase;

use crate::{
    error::Error,
    syntax,
    HeaderValues,
};

/// The headers of a message.
///
/// Headers are kept in insertion order, together with the case of the name
/// they were first inserted with. Lookups are case-insensitive.
#[derive(Clone, Debug, Default)]
pub struct HeaderMap {
    headers: Vec<(String, Vec<String>)>,
    index: HashMap<UniCase<String>, usize>,
}

impl HeaderMap {
    pub fn new() -> HeaderMap {
        HeaderMap::default()
    }

    /// Builds a map from a list of headers. Headers that only differ in case
    /// are merged, keeping the case of the first occurrence.
    pub fn from_headers<I, N, V>(headers: I) -> Result<HeaderMap, Error>
            where I: IntoIterator<Item = (N, V)>,
                  N: AsRef<str>,
                  V: Into<HeaderValues> {
        let mut map = HeaderMap::new();
        for (name, values) in headers {
            map.append(name.as_ref(), values)?;
        }
        Ok(map)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name)
            .map(|index| self.headers[index].1.as_slice())
    }

    /// Returns the name the header was stored with.
    #[must_use]
    pub fn original_name(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| self.headers[index].0.as_str())
    }

    /// The values of the header, joined by a comma.
    #[must_use]
    pub fn line(&self, name: &str) -> Option<String> {
        self.get(name).map(|values| values.join(","))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers.iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Replaces any header with the same name. The header is moved to the
    /// end and takes the case of the given name.
    pub fn set(&mut self, name: &str, values: impl Into<HeaderValues>) -> Result<(), Error> {
        let values = validate(name, values)?;
        self.remove(name);
        self.push(name.to_string(), values);
        Ok(())
    }

    /// Adds values to a header, keeping the case of an existing header name.
    pub fn append(&mut self, name: &str, values: impl Into<HeaderValues>) -> Result<(), Error> {
        let values = validate(name, values)?;
        match self.position(name) {
            Some(index) => self.headers[index].1.extend(values),
            None => self.push(name.to_string(), values),
        }
        Ok(())
    }

    /// Returns whether or not a header was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.index.remove(&UniCase::new(name.to_string())) {
            Some(index) => {
                self.headers.remove(index);
                self.reindex();
                true
            }
            None => false,
        }
    }

    /// Sets the `Host` header to a single value and moves it to the front.
    /// The case of an existing `Host` header name is kept.
    pub(crate) fn set_host_first(&mut self, host: &str) -> Result<(), Error> {
        let host = syntax::normalize_field_value(host)
            .map_err(|reason| Error::InvalidHeaderValue { name: String::from("Host"), reason })?;

        let name = self.original_name("Host")
            .unwrap_or("Host")
            .to_string();
        self.remove(&name);
        self.headers.insert(0, (name, vec![host]));
        self.reindex();
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&UniCase::new(name.to_string())).copied()
    }

    fn push(&mut self, name: String, values: Vec<String>) {
        self.index.insert(UniCase::new(name.clone()), self.headers.len());
        self.headers.push((name, values));
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (index, (name, _)) in self.headers.iter().enumerate() {
            self.index.insert(UniCase::new(name.clone()), index);
        }
    }
}

/// Validates the name and normalizes the values of a header.
fn validate(name: &str, values: impl Into<HeaderValues>) -> Result<Vec<String>, Error> {
    syntax::validate_token(name)
        .map_err(|reason| Error::InvalidHeaderName { name: name.to_string(), reason })?;

    let values = values.into().into_vec();
    if values.is_empty() {
        return Err(Error::EmptyHeaderValues(name.to_string()));
    }

    values.iter()
        .map(|value| syntax::normalize_field_value(value)
            .map_err(|reason| Error::InvalidHeaderValue { name: name.to_string(), reason }))
        .collect()
}
