//! Grammar: the tag table pairing recognized input tags with their output delimiters.
//!
//! A grammar is immutable once built. Three grammars are built in, all recognizing the same
//! BBCode tag set:
//!
//! * [`Grammar::bbcode`]: canonical BBCode.
//! * [`Grammar::html`]: html, text and attributes escaped.
//! * [`Grammar::markdown`]: markdown, best effort.
//!
//! Custom grammars are loaded from toml:
//!
//! ```toml
//! name = "html-lite"
//! escape = "html"
//!
//! [tags.b]
//! open = "<b>"
//! close = "</b>"
//!
//! [tags.url]
//! open = "<a>"
//! close = "</a>"
//! allows_attribute = true
//! open_with_attr = "<a href=\"{attr}\">"
//! ```

use crate::tag::{Escape, TagRule};
use crate::{CLOSE, EQUAL, OPEN, SLASH};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// Grammar file is not valid toml or does not fit the format.
    #[error("invalid grammar file: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Tag name empty or containing characters reserved by tag syntax.
    #[error("invalid tag name {0:?}: expected non-empty name without whitespace, brackets, '=' or '/'")]
    InvalidTagName(String),

    /// Two tag names only differ in letter case.
    #[error("duplicated tag name {0:?}, tag names are case-insensitive")]
    DuplicatedTag(String),

    /// `*_with_attr` template set on a tag not allowing attributes.
    #[error("tag {0:?} has attribute templates but does not allow attributes")]
    UnexpectedAttrTemplate(String),
}

/// Format of grammar files.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GrammarFile {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    escape: Escape,

    #[serde(default)]
    tags: BTreeMap<String, TagRule>,
}

/// Recognized tags and how to write them.
#[derive(Clone, Debug)]
pub struct Grammar {
    /// Grammar name, for diagnostic.
    name: String,

    /// Escaping applied on text and attributes.
    escape: Escape,

    /// Rules keyed by lowercased tag name.
    tags: HashMap<String, TagRule>,
}

impl Grammar {
    /// Build a grammar, validating every tag.
    ///
    /// # Errors
    ///
    /// When any tag name is invalid or duplicated, or a rule is inconsistent.
    pub fn new(
        name: impl Into<String>,
        escape: Escape,
        tags: impl IntoIterator<Item = (String, TagRule)>,
    ) -> Result<Self, GrammarError> {
        let mut map = HashMap::new();
        for (tag, rule) in tags {
            if !is_valid_tag_name(&tag) {
                return Err(GrammarError::InvalidTagName(tag));
            }
            if !rule.allows_attribute && rule.has_attr_template() {
                return Err(GrammarError::UnexpectedAttrTemplate(tag));
            }
            let key = tag.to_lowercase();
            if map.insert(key, rule).is_some() {
                return Err(GrammarError::DuplicatedTag(tag));
            }
        }

        Ok(Self {
            name: name.into(),
            escape,
            tags: map,
        })
    }

    /// Load grammar from toml text.
    ///
    /// # Errors
    ///
    /// When the text is not a valid grammar file, see [`Grammar::new`] for validation.
    pub fn from_toml(data: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = toml::from_str(data)?;
        let grammar = Self::new(file.name.unwrap_or_default(), file.escape, file.tags)?;
        debug!(
            "loaded grammar {:?} with {} tags",
            grammar.name,
            grammar.tags.len()
        );
        Ok(grammar)
    }

    /// Look up built-in grammar by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "bbcode" => Some(Self::bbcode()),
            "html" => Some(Self::html()),
            "markdown" | "md" => Some(Self::markdown()),
            _ => None,
        }
    }

    /// BBCode to canonical BBCode.
    ///
    /// Tag names are lowercased and attribute quotes dropped, everything else stays the same.
    /// Attributes starting or ending with a quote keep one pair of quotes around them.
    pub fn bbcode() -> Self {
        Self::from_table(
            "bbcode",
            Escape::Bbcode,
            vec![
                ("b", TagRule::plain("[b]", "[/b]")),
                ("i", TagRule::plain("[i]", "[/i]")),
                ("u", TagRule::plain("[u]", "[/u]")),
                ("s", TagRule::plain("[s]", "[/s]")),
                (
                    "quote",
                    TagRule::attributed("[quote]", "[/quote]", Some("[quote={attr}]"), None),
                ),
                (
                    "url",
                    TagRule::attributed("[url]", "[/url]", Some("[url={attr}]"), None),
                ),
                ("img", TagRule::plain("[img]", "[/img]")),
                (
                    "color",
                    TagRule::attributed("[color]", "[/color]", Some("[color={attr}]"), None),
                ),
                (
                    "size",
                    TagRule::attributed("[size]", "[/size]", Some("[size={attr}]"), None),
                ),
                ("code", TagRule::plain("[code]", "[/code]")),
                ("table", TagRule::plain("[table]", "[/table]")),
                ("tr", TagRule::plain("[tr]", "[/tr]")),
                (
                    "td",
                    TagRule::attributed("[td]", "[/td]", Some("[td={attr}]"), None),
                ),
            ],
        )
    }

    /// BBCode to html.
    pub fn html() -> Self {
        Self::from_table(
            "html",
            Escape::Html,
            vec![
                ("b", TagRule::plain("<strong>", "</strong>")),
                ("i", TagRule::plain("<em>", "</em>")),
                ("u", TagRule::plain("<u>", "</u>")),
                ("s", TagRule::plain("<s>", "</s>")),
                (
                    "quote",
                    TagRule::attributed(
                        "<blockquote>",
                        "</blockquote>",
                        Some("<blockquote><cite>{attr}</cite>"),
                        None,
                    ),
                ),
                (
                    "url",
                    TagRule::attributed("<a>", "</a>", Some(r#"<a href="{attr}">"#), None)
                        .with_content_as_attr(),
                ),
                ("img", TagRule::plain(r#"<img src=""#, r#"">"#)),
                (
                    "color",
                    TagRule::attributed(
                        "<span>",
                        "</span>",
                        Some(r#"<span style="color: {attr}">"#),
                        None,
                    ),
                ),
                (
                    "size",
                    TagRule::attributed(
                        "<span>",
                        "</span>",
                        Some(r#"<span style="font-size: {attr}">"#),
                        None,
                    ),
                ),
                ("code", TagRule::plain("<pre><code>", "</code></pre>")),
                ("table", TagRule::plain("<table>", "</table>")),
                ("tr", TagRule::plain("<tr>", "</tr>")),
                (
                    "td",
                    TagRule::attributed("<td>", "</td>", Some(r#"<td width="{attr}">"#), None),
                ),
            ],
        )
    }

    /// BBCode to markdown.
    ///
    /// Markdown has no color, size or underline, color and size keep only their content and
    /// underline falls back to inline html.
    pub fn markdown() -> Self {
        Self::from_table(
            "markdown",
            Escape::Plain,
            vec![
                ("b", TagRule::plain("**", "**")),
                ("i", TagRule::plain("*", "*")),
                ("u", TagRule::plain("<u>", "</u>")),
                ("s", TagRule::plain("~~", "~~")),
                ("quote", TagRule::attributed("> ", "", None, None)),
                (
                    "url",
                    TagRule::attributed("<", ">", Some("["), Some("]({attr})")),
                ),
                ("img", TagRule::plain("![](", ")")),
                ("color", TagRule::attributed("", "", None, None)),
                ("size", TagRule::attributed("", "", None, None)),
                ("code", TagRule::plain("`", "`")),
                ("table", TagRule::plain("", "")),
                ("tr", TagRule::plain("|", "\n")),
                ("td", TagRule::attributed(" ", " |", None, None)),
            ],
        )
    }

    /// Build from a table known to be valid.
    fn from_table(name: &str, escape: Escape, table: Vec<(&str, TagRule)>) -> Self {
        Self {
            name: name.to_owned(),
            escape,
            tags: table
                .into_iter()
                .map(|(tag, rule)| (tag.to_owned(), rule))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn escape(&self) -> Escape {
        self.escape
    }

    /// Find the rule of tag `name`, case-insensitive.
    ///
    /// Return the canonical (lowercased) name along with the rule.
    pub fn rule(&self, name: &str) -> Option<(&str, &TagRule)> {
        self.tags
            .get_key_value(name.to_lowercase().as_str())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// All recognized tag names, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names = self.tags.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::bbcode()
    }
}

fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|ch| ch.is_whitespace() || [OPEN, CLOSE, EQUAL, SLASH].contains(&ch))
}
