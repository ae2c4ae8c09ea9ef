//! Error tolerant bbcode translator.
//!
//! Input text goes through three steps:
//!
//! 1. [`lexer::scan`]: text into [`token::Token`]s.
//! 2. [`tree::build`]: tokens into a tree of [`tree::Node`]s.
//! 3. [`render::render`]: tree into text, in the output [`grammar::Grammar`].
//!
//! No step fails on any input. Unknown, malformed or unmatched tags are kept as text.

pub mod grammar;
pub mod lexer;
pub mod render;
mod scanner;
pub mod tag;
pub mod token;
pub mod tree;

pub use grammar::{Grammar, GrammarError};

use token::Token;
use tree::Element;

const OPEN: char = '[';
const CLOSE: char = ']';
const SLASH: char = '/';
const EQUAL: char = '=';

/// Translate documents with a fixed grammar.
///
/// Holds no state besides the grammar, share it freely across documents and threads.
#[derive(Clone, Debug, Default)]
pub struct Translator {
    grammar: Grammar,
}

impl Translator {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Scan `data` into tokens.
    pub fn scan(&self, data: &str) -> Vec<Token> {
        lexer::scan(data, &self.grammar)
    }

    /// Parse `data` into document tree.
    pub fn parse(&self, data: &str) -> Element {
        tree::build(self.scan(data))
    }

    /// Translate `data` into the output grammar.
    #[tracing::instrument(skip_all, fields(grammar = self.grammar.name(), len = data.len()))]
    pub fn translate(&self, data: &str) -> String {
        render::render(&self.parse(data), &self.grammar)
    }
}

/// Translate bbcode `data` into canonical bbcode.
pub fn translate(data: impl AsRef<str>) -> String {
    Translator::default().translate(data.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        assert_eq!(translate("[b]x[/b]"), "[b]x[/b]");
        assert_eq!(
            Translator::new(Grammar::html()).translate("[i]x"),
            "<em>x"
        );
    }

    #[test]
    fn test_translator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();
    }
}
