use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Node;
use crate::parser::parse;
use crate::source::TemplateSource;

/// Marks bodies that start like a list or definition line
pub const LINE_STYLE_SENTINEL: char = '\0';

/// Parsed template bodies for one expansion, misses included
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<String, Option<Rc<Node>>>,
    parses: usize,
    hits: usize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed body for `name`, fetching and parsing it on first use.
    ///
    /// A leading `:` transcludes the raw article named by the rest.
    pub fn resolve(&mut self, name: &str, source: &dyn TemplateSource) -> Option<Rc<Node>> {
        if let Some(cached) = self.entries.get(name) {
            self.hits += 1;
            log::debug!("template cache hit for {name:?}");
            return cached.clone();
        }

        let raw = match name.strip_prefix(':') {
            Some(title) => {
                log::info!("including article {title:?}");
                source.get_raw_article(title)
            }
            None => source.get_template(name),
        };

        let parsed = match raw {
            Some(mut raw) => {
                if raw.starts_with(':') || raw.starts_with(';') {
                    raw.insert(0, LINE_STYLE_SENTINEL);
                }
                log::info!("parsing template {name:?}");
                self.parses += 1;
                Some(Rc::new(parse(&raw)))
            }
            None => {
                log::debug!("source has no page {name:?}");
                None
            }
        };

        self.entries.insert(name.to_string(), parsed.clone());
        parsed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of bodies parsed so far
    pub fn parses(&self) -> usize {
        self.parses
    }

    /// Number of lookups answered from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
