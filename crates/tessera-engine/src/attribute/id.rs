use std::borrow::Cow;
use std::fmt;

/// Name of a uniform slot or vertex array, e.g. `builtin.proj_matrix`.
///
/// Built-in ids are `'static` and cost nothing to clone; user ids own their
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(Cow<'static, str>);

impl AttributeId {
    #[inline]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for AttributeId {
    #[inline]
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for AttributeId {
    #[inline]
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
