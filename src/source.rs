use std::collections::HashMap;
use std::rc::Rc;

/// Where template bodies and transcluded articles come from.
///
/// Both lookups are plain queries; `None` just means "no such page".
pub trait TemplateSource {
    /// Text of the template `name`
    fn get_template(&self, name: &str) -> Option<String>;

    /// Raw text of the article `title`, for `{{:Title}}`-style transclusion
    fn get_raw_article(&self, title: &str) -> Option<String>;
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn get_template(&self, name: &str) -> Option<String> {
        (**self).get_template(name)
    }

    fn get_raw_article(&self, title: &str) -> Option<String> {
        (**self).get_raw_article(title)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for Box<T> {
    fn get_template(&self, name: &str) -> Option<String> {
        (**self).get_template(name)
    }

    fn get_raw_article(&self, title: &str) -> Option<String> {
        (**self).get_raw_article(title)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for Rc<T> {
    fn get_template(&self, name: &str) -> Option<String> {
        (**self).get_template(name)
    }

    fn get_raw_article(&self, title: &str) -> Option<String> {
        (**self).get_raw_article(title)
    }
}

/// In-memory source; templates and articles share one namespace
#[derive(Debug, Default, Clone)]
pub struct MapSource(HashMap<String, String>);

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.0.insert(name.into(), text.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl TemplateSource for MapSource {
    fn get_template(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }

    fn get_raw_article(&self, title: &str) -> Option<String> {
        self.0.get(title).cloned()
    }
}
