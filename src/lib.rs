//! Template expansion for wiki markup.
//!
//! Source text is tokenized, the nested `{{...}}`/`{{{...}}}` structure is
//! resolved into a tree of invocations and placeholders, and the tree is
//! flattened into plain text by substituting template bodies fetched from a
//! [`TemplateSource`].
//!
//! ```
//! use wikiexpand::{Expander, MapSource};
//!
//! let source = MapSource::new().with("greet", "Hello, {{{1|world}}}!");
//! let mut expander = Expander::new("{{greet|wiki}} {{greet}}", "Main Page", &source);
//! assert_eq!(expander.expand(), "Hello, wiki! Hello, world!");
//! ```

pub mod args;
pub mod ast;
pub mod cache;
pub mod error;
pub mod lexer;
pub mod magic;
pub mod parser;
pub mod processor;
pub mod source;

pub use args::ArgumentList;
pub use ast::{Invocation, Node, Placeholder, Token};
pub use cache::TemplateCache;
pub use error::{BuildError, ExpandError};
pub use lexer::tokenize;
pub use magic::{Magic, MagicCall, MagicRegistry};
pub use parser::parse;
pub use processor::{Expander, ExpanderBuilder, ExpanderConfig};
pub use source::{MapSource, TemplateSource};

/// Expand `text` with default settings and no magic names
pub fn expand_str(text: &str, source: impl TemplateSource) -> String {
    Expander::new(text, "", source).expand()
}
