// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Access modes, in the `fopen(3)` notation used by the resource metadata.

use std::fs::OpenOptions;

use phf::phf_map;

use crate::StreamError;

/// The capabilities a resource advertises through its mode string.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccessMode {
    pub readable: bool,
    pub writable: bool,
}

impl AccessMode {
    const fn new(readable: bool, writable: bool) -> Self {
        Self { readable, writable }
    }

    /// Looks up the capabilities of the given mode string. Modes that aren't
    /// known are neither readable nor writable.
    pub fn from_mode(mode: &str) -> Self {
        MODES.get(mode).copied().unwrap_or_default()
    }
}

/// Note that `"rw"` is writable but not readable, and the binary/text suffix
/// of the append modes isn't recognized. This mirrors what resources report
/// in their metadata, not what callers pass to `fopen`.
static MODES: phf::Map<&'static str, AccessMode> = phf_map!(
    "r" => AccessMode::new(true, false),
    "rb" => AccessMode::new(true, false),
    "rt" => AccessMode::new(true, false),

    "w" => AccessMode::new(false, true),
    "wb" => AccessMode::new(false, true),
    "rw" => AccessMode::new(false, true),
    "a" => AccessMode::new(false, true),

    "w+" => AccessMode::new(true, true),
    "r+" => AccessMode::new(true, true),
    "x+" => AccessMode::new(true, true),
    "c+" => AccessMode::new(true, true),
    "a+" => AccessMode::new(true, true),
    "w+b" => AccessMode::new(true, true),
    "r+b" => AccessMode::new(true, true),
    "x+b" => AccessMode::new(true, true),
    "c+b" => AccessMode::new(true, true),
    "w+t" => AccessMode::new(true, true),
    "r+t" => AccessMode::new(true, true),
    "x+t" => AccessMode::new(true, true),
    "c+t" => AccessMode::new(true, true),
);

/// Translates an `fopen` mode into the [`OpenOptions`] to open a file with.
///
/// ```text
/// mode = ( "r" / "w" / "a" / "x" / "c" ) [ "+" ] [ "b" / "t" ]
/// ```
/// The `b`/`t` flag may also precede the `+`, e.g. `"rb+"`.
pub fn open_options(mode: &str) -> Result<OpenOptions, StreamError> {
    let invalid = || StreamError::InvalidMode(mode.to_string());

    let mut chars = mode.chars();
    let base = chars.next().ok_or_else(invalid)?;

    let mut plus = false;
    let mut flag = false;
    for character in chars {
        match character {
            '+' if !plus => plus = true,
            'b' | 't' if !flag => flag = true,
            _ => return Err(invalid()),
        }
    }

    let mut options = OpenOptions::new();
    match base {
        'r' => {
            options.read(true).write(plus);
        }
        'w' => {
            options.write(true).read(plus).create(true).truncate(true);
        }
        'a' => {
            options.append(true).read(plus).create(true);
        }
        'x' => {
            options.write(true).read(plus).create_new(true);
        }
        'c' => {
            options.write(true).read(plus).create(true);
        }
        _ => return Err(invalid()),
    }

    Ok(options)
}

/// Normalizes a mode to the form reported in the metadata, moving the `+`
/// before the binary/text flag, e.g. `"rb+"` becomes `"r+b"`.
pub(crate) fn canonical_mode(mode: &str) -> String {
    let plus = mode.contains('+');
    let mut result: String = mode.chars().filter(|c| *c != '+').collect();
    if plus {
        result.insert(result.len().min(1), '+');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("r", true, false)]
    #[case("rb", true, false)]
    #[case("w", false, true)]
    #[case("rw", false, true)]
    #[case("w+b", true, true)]
    #[case("a+", true, true)]
    #[case("a", false, true)]
    #[case("ab", false, false)]
    #[case("", false, false)]
    #[case("q", false, false)]
    fn test_access_mode(#[case] mode: &str, #[case] readable: bool, #[case] writable: bool) {
        assert_eq!(AccessMode::from_mode(mode), AccessMode { readable, writable });
    }

    #[rstest]
    #[case("r")]
    #[case("r+")]
    #[case("rb+")]
    #[case("w+b")]
    #[case("x+t")]
    #[case("c")]
    #[case("a+")]
    fn test_open_options_accepts(#[case] mode: &str) {
        assert!(open_options(mode).is_ok(), "mode {mode:?} should be accepted");
    }

    #[rstest]
    #[case("")]
    #[case("q")]
    #[case("r++")]
    #[case("rbt")]
    #[case("+r")]
    fn test_open_options_rejects(#[case] mode: &str) {
        assert!(matches!(open_options(mode), Err(StreamError::InvalidMode(..))));
    }

    #[rstest]
    #[case("r", "r")]
    #[case("rb+", "r+b")]
    #[case("w+b", "w+b")]
    #[case("a+", "a+")]
    fn test_canonical_mode(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_mode(input), expected);
    }
}
