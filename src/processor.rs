use std::rc::Rc;

use crate::args::ArgumentList;
use crate::ast::{Invocation, Node, Placeholder};
use crate::cache::TemplateCache;
use crate::error::{BuildError, ExpandError};
use crate::magic::{MagicCall, MagicRegistry};
use crate::parser::parse;
use crate::source::TemplateSource;

/// Tunables for one expander
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpanderConfig {
    /// How many template bodies may be open at once
    pub max_depth: usize,
    /// How many tree nodes may be open at once, counted across all template
    /// bodies
    pub max_nesting: usize,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            max_depth: 40,
            max_nesting: 500,
        }
    }
}

/// Expands the templates of one document.
///
/// The document is parsed once at construction. Template bodies are fetched
/// from the source on first use and kept for the lifetime of the expander.
pub struct Expander<'s> {
    parsed: Rc<Node>,
    page: String,
    source: Box<dyn TemplateSource + 's>,
    magic: MagicRegistry,
    config: ExpanderConfig,
    cache: TemplateCache,
    diagnostics: Vec<ExpandError>,
    nesting: usize,
}

impl<'s> Expander<'s> {
    pub fn new(
        text: &str,
        page: impl Into<String>,
        source: impl TemplateSource + 's,
    ) -> Self {
        Self::with_parts(
            text,
            page.into(),
            Box::new(source),
            MagicRegistry::empty(),
            ExpanderConfig::default(),
        )
    }

    pub fn builder(text: impl Into<String>) -> ExpanderBuilder<'s> {
        ExpanderBuilder::new(text)
    }

    fn with_parts(
        text: &str,
        page: String,
        source: Box<dyn TemplateSource + 's>,
        magic: MagicRegistry,
        config: ExpanderConfig,
    ) -> Self {
        Self {
            parsed: Rc::new(parse(text)),
            page,
            source,
            magic,
            config,
            cache: TemplateCache::new(),
            diagnostics: Vec::new(),
            nesting: 0,
        }
    }

    /// Expand the whole document, starting from an empty scope
    pub fn expand(&mut self) -> String {
        self.diagnostics.clear();
        self.nesting = 0;
        let root = Rc::clone(&self.parsed);
        let mut out = String::new();
        self.flatten(&root, &ArgumentList::new(), 0, &mut out);
        out
    }

    pub fn tree(&self) -> &Node {
        &self.parsed
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Problems met during the last [`Expander::expand`], in order
    pub fn diagnostics(&self) -> &[ExpandError] {
        &self.diagnostics
    }

    fn flatten(&mut self, node: &Node, scope: &ArgumentList, depth: usize, out: &mut String) {
        if let Node::Text(s) = node {
            out.push_str(s);
            return;
        }
        if self.nesting >= self.config.max_nesting {
            return self.report(ExpandError::NestingTooDeep {
                limit: self.config.max_nesting,
            });
        }
        self.nesting += 1;
        match node {
            Node::Text(_) => {}
            Node::Plain(children) => {
                for child in children {
                    self.flatten(child, scope, depth, out);
                }
            }
            Node::Placeholder(p) => self.substitute(p, scope, depth, out),
            Node::Invocation(t) => self.invoke(t, scope, depth, out),
        }
        self.nesting -= 1;
    }

    fn flatten_to_string(&mut self, node: &Node, scope: &ArgumentList, depth: usize) -> String {
        let mut out = String::new();
        self.flatten(node, scope, depth, &mut out);
        out
    }

    fn substitute(&mut self, p: &Placeholder, scope: &ArgumentList, depth: usize, out: &mut String) {
        let name = self.flatten_to_string(&p.name, scope, depth);
        match scope.get(name.trim()) {
            Some(value) => out.push_str(value),
            None => {
                if let Some(default) = &p.default {
                    self.flatten(default, scope, depth, out);
                }
            }
        }
    }

    fn invoke(&mut self, t: &Invocation, scope: &ArgumentList, depth: usize, out: &mut String) {
        let name = self.flatten_to_string(&t.name, scope, depth);
        let name = name.trim();

        // Arguments see the caller's scope
        let flattened: Vec<String> = t
            .args
            .iter()
            .map(|arg| self.flatten_to_string(arg, scope, depth))
            .collect();
        let args = ArgumentList::bind(flattened);

        let call = MagicCall {
            name,
            args: &args,
            scope,
            page: &self.page,
        };
        if let Some(result) = self.magic.evaluate(&call) {
            out.push_str(&result);
            return;
        }

        let depth = match self.enter(name, depth) {
            Ok(depth) => depth,
            Err(e) => return self.report(e),
        };

        match self.cache.resolve(name, &*self.source) {
            Some(body) => self.flatten(&body, &args, depth, out),
            None => self.report(ExpandError::MissingTemplate {
                name: name.to_string(),
            }),
        }
    }

    /// Depth inside the body of `name`, if that is still allowed
    fn enter(&self, name: &str, depth: usize) -> Result<usize, ExpandError> {
        if depth >= self.config.max_depth {
            return Err(ExpandError::TooDeep {
                name: name.to_string(),
                limit: self.config.max_depth,
            });
        }
        Ok(depth + 1)
    }

    fn report(&mut self, e: ExpandError) {
        log::warn!("{e}");
        self.diagnostics.push(e);
    }
}

/// Collects what an [`Expander`] needs; the template source is mandatory
pub struct ExpanderBuilder<'s> {
    text: String,
    page: String,
    source: Option<Box<dyn TemplateSource + 's>>,
    magic: MagicRegistry,
    config: ExpanderConfig,
}

impl<'s> ExpanderBuilder<'s> {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: String::new(),
            source: None,
            magic: MagicRegistry::empty(),
            config: ExpanderConfig::default(),
        }
    }

    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    pub fn source(mut self, source: impl TemplateSource + 's) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn magic(mut self, magic: MagicRegistry) -> Self {
        self.magic = magic;
        self
    }

    pub fn config(mut self, config: ExpanderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn max_nesting(mut self, max_nesting: usize) -> Self {
        self.config.max_nesting = max_nesting;
        self
    }

    pub fn build(self) -> Result<Expander<'s>, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSource)?;
        Ok(Expander::with_parts(
            &self.text,
            self.page,
            source,
            self.magic,
            self.config,
        ))
    }
}
