// ABOUTME: Phantom-typed identifiers for containers and exec instances.
// ABOUTME: A ContainerId cannot be passed where an ExecId is expected.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub enum ContainerMarker {}
pub enum ExecMarker {}

/// An opaque runtime-assigned identifier tagged with what it identifies.
#[must_use]
pub struct Id<T> {
    value: String,
    _kind: PhantomData<fn() -> T>,
}

pub type ContainerId = Id<ContainerMarker>;
pub type ExecId = Id<ExecMarker>;

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The 12-character prefix the docker CLI prints.
    pub fn short(&self) -> &str {
        match self.value.char_indices().nth(12) {
            Some((end, _)) => &self.value[..end],
            None => &self.value,
        }
    }
}

// Written by hand so that T needs no bounds.

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
