use std::borrow::Cow;
use std::sync::LazyLock;

use pest::{Parser, iterators::Pair};
use pest_derive::Parser;
use regex::Regex;

use crate::ast::Token;

#[derive(Parser)]
#[grammar = "src/wikitext.pest"]
pub struct WikiLexer;

static ONLY_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<onlyinclude>(.*?)</onlyinclude>").expect("valid onlyinclude pattern")
});

/// Concatenation of all `<onlyinclude>` spans, if the text uses them
pub fn only_include(text: &str) -> Option<String> {
    if !text.contains("<onlyinclude>") {
        return None;
    }
    Some(
        ONLY_INCLUDE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect(),
    )
}

/// Split wiki text into tokens. Never fails; the result always ends with
/// exactly one [`Token::End`].
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    match only_include(text) {
        Some(kept) => {
            let owned: Vec<Token<'static>> =
                lex(&kept).into_iter().map(Token::into_owned).collect();
            owned
        }
        None => lex(text),
    }
}

fn lex(text: &str) -> Vec<Token<'_>> {
    let mut tokens = match WikiLexer::parse(Rule::document, text) {
        Ok(mut pairs) => pairs
            .next()
            .map(|document| document.into_inner().filter_map(to_token).collect::<Vec<_>>())
            .unwrap_or_default(),
        Err(e) => {
            log::warn!("lexer rejected input, treating it as text: {e}");
            vec![Token::Text(Cow::Borrowed(text))]
        }
    };
    tokens.retain(|t| !matches!(t, Token::Text(s) | Token::Skipped(s) if s.is_empty()));
    tokens.push(Token::End);
    tokens
}

fn to_token(pair: Pair<'_, Rule>) -> Option<Token<'_>> {
    let lexeme = pair.as_str();
    match pair.as_rule() {
        Rule::brace_open => Some(Token::OpenBraces(lexeme.len())),
        Rule::brace_close => Some(Token::CloseBraces(lexeme.len())),
        Rule::link_open => Some(Token::LinkOpen),
        Rule::link_close => Some(Token::LinkClose),
        Rule::skipped => Some(Token::Skipped(Cow::Borrowed(lexeme))),
        Rule::verbatim | Rule::special | Rule::text => Some(Token::Text(Cow::Borrowed(lexeme))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token<'_> {
        Token::Text(Cow::Borrowed(s))
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(tokenize("hello world"), vec![text("hello world"), Token::End]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), vec![Token::End]);
    }

    #[test]
    fn test_brace_runs() {
        assert_eq!(
            tokenize("{{{x}}}}"),
            vec![
                Token::OpenBraces(3),
                text("x"),
                Token::CloseBraces(4),
                Token::End
            ]
        );
    }

    #[test]
    fn test_single_brace_is_text() {
        assert_eq!(
            tokenize("a{b}c"),
            vec![text("a"), text("{"), text("b"), text("}"), text("c"), Token::End]
        );
    }

    #[test]
    fn test_specials_split_text() {
        assert_eq!(
            tokenize("a|b:c"),
            vec![text("a"), text("|"), text("b"), text(":"), text("c"), Token::End]
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            tokenize("[[a|b]] [x]"),
            vec![
                Token::LinkOpen,
                text("a"),
                text("|"),
                text("b"),
                Token::LinkClose,
                text(" "),
                text("["),
                text("x"),
                text("]"),
                Token::End
            ]
        );
    }

    #[test]
    fn test_comments_and_noinclude_are_skipped() {
        let tokens = tokenize("a<!-- {{x}} -->b<NoInclude>{{y}}</noinclude><includeonly>c");
        assert_eq!(
            tokens,
            vec![
                text("a"),
                Token::Skipped(Cow::Borrowed("<!-- {{x}} -->")),
                text("b"),
                Token::Skipped(Cow::Borrowed("<NoInclude>{{y}}</noinclude>")),
                Token::Skipped(Cow::Borrowed("<includeonly>")),
                text("c"),
                Token::End
            ]
        );
    }

    #[test]
    fn test_verbatim_spans_are_not_relexed() {
        assert_eq!(
            tokenize("<nowiki>{{a|b}}</nowiki>"),
            vec![text("<nowiki>{{a|b}}</nowiki>"), Token::End]
        );
        assert_eq!(
            tokenize(r#"<pre class="x">{{a}}</pre>"#),
            vec![text(r#"<pre class="x">{{a}}</pre>"#), Token::End]
        );
        assert_eq!(
            tokenize("<math>\\frac{{1}}{2}</math>"),
            vec![text("<math>\\frac{{1}}{2}</math>"), Token::End]
        );
    }

    #[test]
    fn test_unterminated_tag_falls_back_to_text() {
        assert_eq!(
            tokenize("<nowiki>{{a}}"),
            vec![
                text("<"),
                text("nowiki>"),
                Token::OpenBraces(2),
                text("a"),
                Token::CloseBraces(2),
                Token::End
            ]
        );
    }

    #[test]
    fn test_only_include() {
        assert_eq!(
            only_include("pre<onlyinclude>KEEP</onlyinclude>post"),
            Some("KEEP".to_string())
        );
        assert_eq!(only_include("no markers"), None);
        assert_eq!(
            tokenize("x<onlyinclude>A</onlyinclude>y<onlyinclude>B</onlyinclude>z"),
            vec![text("AB"), Token::End]
        );
    }

    #[test]
    fn test_unclosed_only_include_keeps_nothing() {
        assert_eq!(tokenize("a<onlyinclude>b"), vec![Token::End]);
    }
}
