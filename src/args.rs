use std::sync::LazyLock;

use regex::Regex;

static NAMED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+|#default)$").expect("valid key pattern"));

/// Parameters bound at one invocation site.
///
/// Holds the key/value bindings in first-insertion order plus the raw,
/// unsplit argument strings in source order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArgumentList {
    bindings: Vec<(String, String)>,
    raw: Vec<String>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind already flattened argument texts.
    ///
    /// `key=value` binds `key` when the trimmed key is a word or `#default`;
    /// anything else takes the next positional number, starting at 1.
    pub fn bind<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        let mut position = 1usize;

        for arg in args {
            let arg = arg.as_ref();
            let trimmed = arg.trim();
            list.raw.push(trimmed.to_string());

            match arg.split_once('=') {
                Some((key, value)) if NAMED_KEY.is_match(key.trim()) => {
                    list.insert(key.trim(), value.trim());
                }
                _ => {
                    list.insert(&position.to_string(), trimmed);
                    position += 1;
                }
            }
        }

        list
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.bindings.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value.to_string(),
            None => self.bindings.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value bound to the 1-based position `n`
    pub fn positional(&self, n: usize) -> Option<&str> {
        self.get(&n.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Trimmed argument strings as written, named ones included
    pub fn raw(&self) -> &[String] {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = ArgumentList::bind([" a ", "b"]);
        assert_eq!(args.positional(1), Some("a"));
        assert_eq!(args.get("2"), Some("b"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_named_and_positional() {
        let args = ArgumentList::bind(["foo", " x = bar ", "baz"]);
        assert_eq!(args.get("1"), Some("foo"));
        assert_eq!(args.get("x"), Some("bar"));
        assert_eq!(args.get("2"), Some("baz"));
        assert_eq!(args.raw(), ["foo", "x = bar", "baz"]);
    }

    #[test]
    fn test_later_named_binding_wins() {
        let args = ArgumentList::bind(["x=1", "y=2", "x=3"]);
        assert_eq!(args.get("x"), Some("3"));
        let keys: Vec<&str> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["x", "y"]);
    }

    #[test]
    fn test_named_overrides_positional_number() {
        let args = ArgumentList::bind(["a", "1=b"]);
        assert_eq!(args.get("1"), Some("b"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_invalid_key_falls_back_to_positional() {
        let args = ArgumentList::bind(["a b=c", "=d", "e"]);
        assert_eq!(args.get("1"), Some("a b=c"));
        assert_eq!(args.get("2"), Some("=d"));
        assert_eq!(args.get("3"), Some("e"));
        assert!(!args.contains("a b"));
    }

    #[test]
    fn test_default_key() {
        let args = ArgumentList::bind(["#default = fallback"]);
        assert_eq!(args.get("#default"), Some("fallback"));
    }

    #[test]
    fn test_value_keeps_further_equals() {
        let args = ArgumentList::bind(["expr=a=b"]);
        assert_eq!(args.get("expr"), Some("a=b"));
    }

    #[test]
    fn test_empty_argument_is_positional() {
        let args = ArgumentList::bind(["", "x"]);
        assert_eq!(args.positional(1), Some(""));
        assert_eq!(args.positional(2), Some("x"));
    }
}
