use serde::Serialize;

/// All types of tokens.
///
/// Tokens are units of of bbcode tags, produced by [`crate::lexer::Lexer`] in document order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Token {
    /// Tag head.
    Head(TagHead),

    /// Tag tail.
    Tail(TagTail),

    /// Plain text.
    Text(String),
}

impl Token {
    /// The exact source text this token was scanned from.
    ///
    /// Concatenating the source of all tokens of a document gives back the document.
    pub fn source(&self) -> &str {
        match self {
            Token::Head(head) => head.raw.as_str(),
            Token::Tail(tail) => tail.raw.as_str(),
            Token::Text(text) => text.as_str(),
        }
    }
}

/// Tag head.
///
/// `[$name=$attr]` or `[$name]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagHead {
    /// Tag name, lowercased.
    pub name: String,

    /// Optional attribute, surrounding quotes removed.
    pub attr: Option<String>,

    /// Original text including brackets.
    pub raw: String,
}

/// Tag tail.
///
/// `[/$name]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagTail {
    /// Tag name, lowercased.
    pub name: String,

    /// Original text including brackets.
    pub raw: String,
}
