use std::borrow::Cow;
use std::fmt;

/// Cache-invalidation label.
///
/// Queries carry tags as readers; mutations invalidate tags as writers.
/// Tags are a single namespace shared by every resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    kind: Cow<'static, str>,
    id: Option<String>,
}

impl Tag {
    /// Tag covering every entry of `kind`.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
        }
    }

    pub fn with_id(kind: impl Into<Cow<'static, str>>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.into()),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether invalidating `self` hits an entry that carries `carried`.
    ///
    /// A tag without id hits every tag of the same kind; a tag with id hits
    /// only the identical tag.
    pub fn invalidates(&self, carried: &Tag) -> bool {
        self.kind == carried.kind && (self.id.is_none() || self.id == carried.id)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{id}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

/// Identity of a cached query: operation plus canonical arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    endpoint: String,
    args: String,
}

impl QueryKey {
    pub fn new(endpoint: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            args: args.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tag_hits_every_id() {
        let all = Tag::new("Question");
        assert!(all.invalidates(&Tag::new("Question")));
        assert!(all.invalidates(&Tag::with_id("Question", "q1")));
        assert!(!all.invalidates(&Tag::new("Survey")));
    }

    #[test]
    fn id_tag_hits_only_itself() {
        let one = Tag::with_id("Response", "survey-s1");
        assert!(one.invalidates(&Tag::with_id("Response", "survey-s1")));
        assert!(!one.invalidates(&Tag::with_id("Response", "survey-s2")));
        assert!(!one.invalidates(&Tag::new("Response")));
    }

    #[test]
    fn display() {
        assert_eq!(Tag::with_id("Question", "s1").to_string(), "Question:s1");
        assert_eq!(QueryKey::new("trip.get", "id=7").to_string(), "trip.get(id=7)");
    }
}
