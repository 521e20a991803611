use std::fmt;

/// A dotted path through a data tree.
///
/// `order.items.0.name` is `["order", "items", "0", "name"]`. Numeric segments address
/// indexed values; every other segment is a key or property name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct DataPath(Vec<String>);

impl DataPath {
    /// Split a dotted path. Empty segments are dropped.
    pub fn parse(text: &str) -> Self {
        Self(
            text.split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for DataPath {
    fn from(text: &str) -> Self {
        DataPath::parse(text)
    }
}
