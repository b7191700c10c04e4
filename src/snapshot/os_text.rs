//! Lossless serde encoding for paths and file names.
//!
//! Valid UTF-8 is written as a plain JSON string. Anything else is written as
//! its raw platform units: `{"bytes": [...]}` on unix, `{"wide": [...]}` on
//! Windows. Used through `#[serde(with = ...)]`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Encoded {
    Text(String),
    Bytes { bytes: Vec<u8> },
    Wide { wide: Vec<u16> },
}

fn encode(value: &OsStr) -> Encoded {
    if let Some(text) = value.to_str() {
        return Encoded::Text(text.to_owned());
    }

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Encoded::Bytes {
            bytes: value.as_bytes().to_vec(),
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        Encoded::Wide {
            wide: value.encode_wide().collect(),
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        Encoded::Text(value.to_string_lossy().into_owned())
    }
}

fn decode(encoded: Encoded) -> Result<OsString, &'static str> {
    match encoded {
        Encoded::Text(text) => Ok(OsString::from(text)),
        #[cfg(unix)]
        Encoded::Bytes { bytes } => {
            use std::os::unix::ffi::OsStringExt;
            Ok(OsString::from_vec(bytes))
        }
        #[cfg(windows)]
        Encoded::Wide { wide } => {
            use std::os::windows::ffi::OsStringExt;
            Ok(OsString::from_wide(&wide))
        }
        #[allow(unreachable_patterns)]
        _ => Err("path was stored on a different platform"),
    }
}

/// A single `OsString` or `PathBuf`.
pub mod one {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<OsStr>,
        S: Serializer,
    {
        encode(value.as_ref()).serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: From<OsString>,
        D: Deserializer<'de>,
    {
        let encoded = Encoded::deserialize(deserializer)?;
        decode(encoded).map(T::from).map_err(D::Error::custom)
    }
}

/// A list of paths.
pub mod paths {
    use super::*;

    pub fn serialize<S>(values: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(|p| encode(p.as_os_str())))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<Encoded>::deserialize(deserializer)?
            .into_iter()
            .map(|e| decode(e).map(PathBuf::from).map_err(D::Error::custom))
            .collect()
    }
}
