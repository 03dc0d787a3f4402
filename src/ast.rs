use std::borrow::Cow;
use std::fmt::Write as _;

/// Lexical token produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Run of two or more `{`, carrying the run length
    OpenBraces(usize),
    /// Run of two or more `}`, carrying the run length
    CloseBraces(usize),
    /// `[[`
    LinkOpen,
    /// `]]`
    LinkClose,
    /// Comments, `<noinclude>` blocks and `<includeonly>` markers.
    /// Consumed by the parser without contributing to the tree.
    Skipped(Cow<'a, str>),
    /// Literal text, including verbatim spans and lone special characters
    Text(Cow<'a, str>),
    /// Always the last token of a sequence
    End,
}

impl Token<'_> {
    /// Detach the token from the text it was lexed from
    pub fn into_owned(self) -> Token<'static> {
        match self {
            Token::OpenBraces(n) => Token::OpenBraces(n),
            Token::CloseBraces(n) => Token::CloseBraces(n),
            Token::LinkOpen => Token::LinkOpen,
            Token::LinkClose => Token::LinkClose,
            Token::Skipped(s) => Token::Skipped(Cow::Owned(s.into_owned())),
            Token::Text(s) => Token::Text(Cow::Owned(s.into_owned())),
            Token::End => Token::End,
        }
    }

    /// The source text this token stands for
    pub fn lexeme(&self) -> Cow<'_, str> {
        match self {
            Token::OpenBraces(n) => Cow::Owned("{".repeat(*n)),
            Token::CloseBraces(n) => Cow::Owned("}".repeat(*n)),
            Token::LinkOpen => Cow::Borrowed("[["),
            Token::LinkClose => Cow::Borrowed("]]"),
            Token::Skipped(s) | Token::Text(s) => Cow::Borrowed(s),
            Token::End => Cow::Borrowed(""),
        }
    }
}

/// Node of the invocation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, copied to the output as is
    Text(String),
    /// Structural grouping of children
    Plain(Vec<Node>),
    /// `{{{name|default}}}`
    Placeholder(Placeholder),
    /// `{{name|arg|...}}`
    Invocation(Invocation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: Box<Node>,
    /// Present whenever the source had a `|` after the name
    pub default: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: Box<Node>,
    /// One entry per top-level `|`-separated segment
    pub args: Vec<Node>,
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    /// True for a text node holding exactly `s`
    pub fn is_text(&self, s: &str) -> bool {
        matches!(self, Node::Text(t) if t == s)
    }

    /// Indented dump of the tree, one node per line
    pub fn show(&self) -> String {
        let mut out = String::new();
        self.show_into(0, &mut out);
        out
    }

    fn show_into(&self, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match self {
            Node::Text(s) => {
                let _ = writeln!(out, "{pad}{s:?}");
            }
            Node::Plain(children) => {
                let _ = writeln!(out, "{pad}Plain ({} children)", children.len());
                for child in children {
                    child.show_into(indent + 1, out);
                }
            }
            Node::Placeholder(p) => {
                let _ = writeln!(out, "{pad}Placeholder");
                p.name.show_into(indent + 1, out);
                if let Some(default) = &p.default {
                    let _ = writeln!(out, "{pad}  | default");
                    default.show_into(indent + 2, out);
                }
            }
            Node::Invocation(t) => {
                let _ = writeln!(out, "{pad}Invocation ({} args)", t.args.len());
                t.name.show_into(indent + 1, out);
                for arg in &t.args {
                    let _ = writeln!(out, "{pad}  | arg");
                    arg.show_into(indent + 2, out);
                }
            }
        }
    }
}
