use crate::grammar::Grammar;
use crate::scanner::Scanner;
use crate::token::{TagHead, TagTail, Token};
use crate::{CLOSE, EQUAL, OPEN, SLASH};
use tracing::trace;

/// Scan `data` into tokens, recognizing the tags defined in `grammar`.
///
/// Never fails: anything not recognized as a tag is kept as text.
pub fn scan(data: &str, grammar: &Grammar) -> Vec<Token> {
    Lexer::new(data, grammar).scan()
}

pub struct Lexer<'a> {
    /// Inner scanner.
    source: Scanner,

    /// Tags to recognize.
    grammar: &'a Grammar,

    /// Start position of current constructing text.
    start: usize,

    /// Scanned tokens.
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &str, grammar: &'a Grammar) -> Self {
        Self {
            source: Scanner::new(data),
            grammar,
            start: 0,
            tokens: vec![],
        }
    }

    /// Run the process.
    pub fn scan(mut self) -> Vec<Token> {
        while !self.source.done() {
            match self.source.curr() {
                Some(OPEN) => self.scan_head_or_tail(),
                _ => {
                    self.source.next();
                }
            }
        }
        self.flush_text(self.source.position());
        self.tokens
    }

    /// Reached the first character of tag head or tail, which is exactly a `[`.
    ///
    /// On success the tag is pushed and text restarts after it. Otherwise all consumed
    /// characters stay in the pending text.
    fn scan_head_or_tail(&mut self) {
        let tag_start = self.source.position();
        self.source.next();

        while let Some(ch) = self.source.curr() {
            if ch == CLOSE {
                self.source.next();
                let raw = self
                    .source
                    .collect_range(tag_start, self.source.position());
                match self.collect_tag(raw) {
                    Ok(token) => {
                        self.flush_text(tag_start);
                        self.tokens.push(token);
                        self.start = self.source.position();
                    }
                    Err(raw) => trace!("unrecognized tag {raw:?}, keep as text"),
                }
                return;
            } else if ch == OPEN {
                // Another `[` before the tag closes, invalid head.
                // Keep the first `[` as text and retry from the second one.
                return;
            }
            self.source.next();
        }

        // Reached the end without `]`.
        trace!("unterminated tag at {tag_start}, keep as text");
    }

    /// Push chars between `start` and `end` as text, if any.
    ///
    /// Text is only pushed when a tag or the end is reached, so the tokens never hold two
    /// [`Token::Text`] in a row.
    fn flush_text(&mut self, end: usize) {
        if end > self.start {
            self.tokens
                .push(Token::Text(self.source.collect_range(self.start, end)));
        }
        self.start = end;
    }

    /// Classify the content between brackets.
    ///
    /// The caller shall ensure `raw` is the full tag including brackets:
    ///
    /// ```console
    /// [ / n a m e ]    [ n a m e = a t t r ]
    /// ```
    ///
    /// Return `raw` back if it is not a recognized tag.
    fn collect_tag(&self, raw: String) -> Result<Token, String> {
        // Brackets are single byte.
        let content = &raw[OPEN.len_utf8()..raw.len() - CLOSE.len_utf8()];

        if let Some(name) = content.strip_prefix(SLASH) {
            let Some((name, _)) = self.grammar.rule(name) else {
                return Err(raw);
            };
            let name = name.to_owned();
            return Ok(Token::Tail(TagTail { name, raw }));
        }

        let (name, attr) = match content.split_once(EQUAL) {
            Some((name, attr)) => (name, Some(unquote(attr))),
            None => (content, None),
        };
        let Some((name, rule)) = self.grammar.rule(name) else {
            return Err(raw);
        };
        match attr {
            Some(attr) if !rule.allows_attribute || attr.is_empty() => Err(raw),
            _ => {
                let name = name.to_owned();
                let attr = attr.map(str::to_owned);
                Ok(Token::Head(TagHead { name, attr, raw }))
            }
        }
    }
}

/// Strip one pair of matching surrounding quotes.
fn unquote(attr: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(v) = attr
            .strip_prefix(quote)
            .and_then(|x| x.strip_suffix(quote))
        {
            return v;
        }
    }
    attr
}
