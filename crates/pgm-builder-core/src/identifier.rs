//! Interned node names.
//!
//! Node names are referenced from many places at once: anchors of relative
//! placements, edge targets, and forward references from plates. [`Name`]
//! interns them so that those references are `Copy` and compare in constant
//! time.

use std::{
    fmt,
    sync::{Mutex, OnceLock, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Process-wide interner backing every [`Name`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Runs `f` with exclusive access to the interner.
///
/// A poisoned lock is recovered: the interner is append-only, so a panic in
/// another thread cannot leave it half-updated.
fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut interner)
}

/// The identifier of a node in a PGM.
///
/// Names are what the rendering backend uses to connect edges, so they are
/// plain identifiers such as `"X_tilde_ij"` rather than display symbols.
///
/// # Examples
///
/// ```
/// use pgm_builder_core::identifier::Name;
///
/// let mu = Name::new("mu");
/// assert_eq!(mu, "mu");
/// assert_eq!(mu, Name::from("mu"));
///
/// // Numbers are valid node names too.
/// assert_eq!(Name::from(22), "22");
/// assert_eq!(Name::from(22.1), "22.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name(DefaultSymbol);

impl Name {
    /// Interns `name` and returns its handle.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns an owned copy of the interned string.
    pub fn to_text(self) -> String {
        with_interner(|interner| interner.resolve(self.0).unwrap_or_default().to_owned())
    }

    /// Returns `true` if the interned string is empty.
    pub fn is_empty(self) -> bool {
        with_interner(|interner| interner.resolve(self.0).is_none_or(str::is_empty))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_text())
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<&String> for Name {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<i64> for Name {
    fn from(value: i64) -> Self {
        Self::new(&value.to_string())
    }
}

impl From<i32> for Name {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<f64> for Name {
    /// Formats the number the shortest way that round-trips, so `22.0`
    /// becomes `"22"` and `22.1` stays `"22.1"`.
    fn from(value: f64) -> Self {
        Self::new(&value.to_string())
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::new(&text))
    }
}
