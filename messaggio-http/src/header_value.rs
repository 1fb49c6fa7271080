// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::sync::Arc;

/// The value(s) given when setting a header.
///
/// A header can be set to a single value or to an ordered list of values.
/// Numbers are accepted as well and are converted to their decimal form.
/// The values are validated and normalized when they are stored in a
/// [`HeaderMap`](crate::HeaderMap).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeaderValues {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValues {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value],
            Self::Multiple(values) => values,
        }
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<&String> for HeaderValues {
    fn from(value: &String) -> Self {
        Self::Single(value.clone())
    }
}

impl From<Arc<str>> for HeaderValues {
    fn from(value: Arc<str>) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for HeaderValues {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for HeaderValues {
    fn from(values: &[&str]) -> Self {
        Self::Multiple(values.iter().map(|value| value.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValues {
    fn from(values: [&str; N]) -> Self {
        Self::Multiple(values.iter().map(|value| value.to_string()).collect())
    }
}

macro_rules! impl_from_number {
    ($($number:ty)*) => {
        $(
            impl From<$number> for HeaderValues {
                fn from(value: $number) -> Self {
                    Self::Single(value.to_string())
                }
            }
        )*
    };
}

impl_from_number!(u8 u16 u32 u64 usize i8 i16 i32 i64 isize f32 f64);
