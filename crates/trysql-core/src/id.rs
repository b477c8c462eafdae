//! Public identifiers — the opaque handle a client uses to address its tenant
//! database.

use std::{fmt, str::FromStr};

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Length of every generated identifier.
pub const GENERATED_LEN: usize = 5;

/// Upper bound accepted by [`PublicId::parse`].
pub const MAX_LEN: usize = 64;

const ALPHABET: &[u8; 52] =
  b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

// Largest multiple of 52 that fits in a byte; anything at or above it is
// rejected so every letter stays equally likely.
const REJECT_FROM: u8 = 208;

/// The external handle of a tenant.
///
/// Always non-empty ASCII alphanumerics, so it can be embedded in a file name
/// without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PublicId(String);

impl PublicId {
  /// Generate a fresh identifier from the operating system RNG.
  ///
  /// No uniqueness is promised; the registry's constraint catches collisions.
  pub fn generate() -> Self { Self::generate_with(&mut OsRng) }

  /// Generate an identifier from an arbitrary RNG.
  pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
    let mut id = String::with_capacity(GENERATED_LEN);
    let mut buf = [0u8; 8];
    while id.len() < GENERATED_LEN {
      rng.fill_bytes(&mut buf);
      for &byte in &buf {
        if byte >= REJECT_FROM {
          continue;
        }
        id.push(char::from(ALPHABET[usize::from(byte % 52)]));
        if id.len() == GENERATED_LEN {
          break;
        }
      }
    }
    Self(id)
  }

  /// Validate a caller-supplied identifier.
  pub fn parse(s: &str) -> Result<Self> {
    let valid = !s.is_empty()
      && s.len() <= MAX_LEN
      && s.bytes().all(|b| b.is_ascii_alphanumeric());
    if valid {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::InvalidPublicId(s.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_string(self) -> String { self.0 }
}

impl fmt::Display for PublicId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for PublicId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl AsRef<str> for PublicId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl<'de> Deserialize<'de> for PublicId {
  fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
    let s = String::deserialize(de)?;
    Self::parse(&s).map_err(serde::de::Error::custom)
  }
}
