use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ordered set of tags, serialized the structurizr way as a comma separated string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tags(IndexSet<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Adds every non-blank tag, returning `true` if at least one was not already present.
    pub fn union<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = false;
        for tag in tags {
            let tag = tag.as_ref().trim();
            if !tag.is_empty() {
                added |= self.0.insert(tag.to_string());
            }
        }
        added
    }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut tags = Tags::new();
        tags.union(iter);
        tags
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let joined = self.iter().collect::<Vec<_>>().join(",");
        serializer.serialize_str(&joined)
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(value.split(',').collect())
    }
}
