use std::mem;

use crate::ast::{Invocation, Node, Placeholder, Token};
use crate::lexer::tokenize;

/// Parse wiki text into its canonical (optimized) invocation tree
pub fn parse(text: &str) -> Node {
    optimize(BraceParser::new(tokenize(text)).parse())
}

/// Deepest brace nesting the parser builds a tree for. Opening runs below
/// this level are kept as literal text.
pub const MAX_NESTING: usize = 256;

/// Recursive descent over a token sequence, resolving brace runs into
/// invocations and placeholders as the closing runs show up.
pub struct BraceParser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    nesting: usize,
}

impl<'a> BraceParser<'a> {
    /// Brace runs shorter than two are not markup and become plain text
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        let mut tokens: Vec<Token<'a>> = tokens
            .into_iter()
            .filter_map(|token| match token {
                Token::OpenBraces(0) | Token::CloseBraces(0) => None,
                Token::OpenBraces(1) => Some(Token::Text("{".into())),
                Token::CloseBraces(1) => Some(Token::Text("}".into())),
                token => Some(token),
            })
            .collect();
        if tokens.last() != Some(&Token::End) {
            tokens.push(Token::End);
        }
        Self {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    fn token(&self) -> Token<'a> {
        self.tokens.get(self.pos).cloned().unwrap_or(Token::End)
    }

    /// Parse the whole sequence. The root is always [`Node::Plain`].
    pub fn parse(mut self) -> Node {
        let mut children = Vec::new();
        loop {
            match self.token() {
                Token::OpenBraces(n) => children.push(self.parse_braces(n)),
                Token::End => break,
                Token::Skipped(_) => self.pos += 1,
                token => {
                    children.push(Node::Text(token.lexeme().into_owned()));
                    self.pos += 1;
                }
            }
        }
        Node::Plain(children)
    }

    /// Parse everything following an opening run of `opened` braces, up to
    /// the point where the run is used up or the input ends.
    fn parse_braces(&mut self, opened: usize) -> Node {
        self.pos += 1;
        self.nesting += 1;
        let mut outstanding = opened;
        let mut children = Vec::new();

        loop {
            match self.token() {
                Token::OpenBraces(n) if self.nesting >= MAX_NESTING => {
                    children.push(Node::Text("{".repeat(n)));
                    self.pos += 1;
                }
                Token::OpenBraces(n) => children.push(self.parse_braces(n)),
                Token::End => {
                    // Openings that never got closed are plain text
                    children.insert(0, Node::Text("{".repeat(outstanding)));
                    break;
                }
                Token::CloseBraces(closing) => {
                    let collected = mem::take(&mut children);
                    let consumed = if closing == 2 || outstanding == 2 {
                        children.push(template_from_children(collected));
                        2
                    } else {
                        children.push(variable_from_children(collected));
                        3
                    };
                    self.eat_close(closing, consumed);
                    outstanding -= consumed;

                    match outstanding {
                        0 => break,
                        1 => {
                            children.insert(0, Node::text("{"));
                            break;
                        }
                        _ => {}
                    }
                }
                Token::Skipped(_) => self.pos += 1,
                token => {
                    children.push(Node::Text(token.lexeme().into_owned()));
                    self.pos += 1;
                }
            }
        }

        self.nesting -= 1;
        Node::Plain(children)
    }

    /// Take `consumed` braces off the closing run under the cursor, leaving
    /// the rest for an enclosing level.
    fn eat_close(&mut self, closing: usize, consumed: usize) {
        match closing.saturating_sub(consumed) {
            0 => self.pos += 1,
            1 => self.tokens[self.pos] = Token::Text("}".into()),
            rest => self.tokens[self.pos] = Token::CloseBraces(rest),
        }
    }
}

/// Build an invocation from the children found between `{{` and `}}`.
///
/// The name runs up to the first `|` or `:`. The remainder is split into
/// arguments at every `|` that is not inside a `[[...]]` link.
pub fn template_from_children(mut children: Vec<Node>) -> Node {
    let rest = match children
        .iter()
        .position(|c| c.is_text("|") || c.is_text(":"))
    {
        Some(idx) => {
            let rest = children.split_off(idx + 1);
            children.pop();
            rest
        }
        None => Vec::new(),
    };

    let mut args = Vec::new();
    let mut arg = Vec::new();
    let mut links = 0i32;
    for child in rest {
        if child.is_text("[[") {
            links += 1;
        } else if child.is_text("]]") {
            links -= 1;
        } else if child.is_text("|") && links == 0 {
            args.push(Node::Plain(mem::take(&mut arg)));
            continue;
        }
        arg.push(child);
    }
    if !arg.is_empty() {
        args.push(Node::Plain(arg));
    }

    Node::Invocation(Invocation {
        name: Box::new(Node::Plain(children)),
        args,
    })
}

/// Build a placeholder from the children found between `{{{` and `}}}`.
/// Everything after the first `|` is the default.
pub fn variable_from_children(mut children: Vec<Node>) -> Node {
    let default = match children.iter().position(|c| c.is_text("|")) {
        Some(idx) => {
            let default = children.split_off(idx + 1);
            children.pop();
            Some(Box::new(Node::Plain(default)))
        }
        None => None,
    };

    Node::Placeholder(Placeholder {
        name: Box::new(Node::Plain(children)),
        default,
    })
}

/// Replace every `Plain` node holding a single child with that child
pub fn optimize(node: Node) -> Node {
    match node {
        Node::Plain(mut children) => {
            if children.len() == 1 {
                if let Some(only) = children.pop() {
                    return optimize(only);
                }
            }
            Node::Plain(children.into_iter().map(optimize).collect())
        }
        Node::Placeholder(p) => Node::Placeholder(Placeholder {
            name: Box::new(optimize(*p.name)),
            default: p.default.map(|d| Box::new(optimize(*d))),
        }),
        Node::Invocation(t) => Node::Invocation(Invocation {
            name: Box::new(optimize(*t.name)),
            args: t.args.into_iter().map(optimize).collect(),
        }),
        text @ Node::Text(_) => text,
    }
}
