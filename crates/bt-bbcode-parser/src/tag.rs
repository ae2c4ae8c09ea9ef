use serde::Deserialize;
use std::fmt;

/// Placeholder replaced by the tag attribute in `*_with_attr` templates.
pub const ATTR_PLACEHOLDER: &str = "{attr}";

/// Output delimiters of one tag.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagRule {
    /// Opening delimiter used when the tag has no attribute.
    pub open: String,

    /// Closing delimiter used when the tag has no attribute.
    pub close: String,

    /// Accept `[$name=$attr]` form or not.
    ///
    /// A head carrying an attribute on a tag not allowing it is not a tag, it stays as text.
    #[serde(default)]
    pub allows_attribute: bool,

    /// Opening template used when the tag has an attribute, falls back to [`TagRule::open`].
    #[serde(default)]
    pub open_with_attr: Option<String>,

    /// Closing template used when the tag has an attribute, falls back to [`TagRule::close`].
    #[serde(default)]
    pub close_with_attr: Option<String>,

    /// Without an attribute, use the text content as the attribute.
    ///
    /// Only applies when the only child of the element is text, e.g. `[url]http://x[/url]`.
    #[serde(default)]
    pub content_as_attr: bool,
}

impl TagRule {
    /// Build a rule for tags that never carry an attribute.
    pub fn plain(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
            allows_attribute: false,
            open_with_attr: None,
            close_with_attr: None,
            content_as_attr: false,
        }
    }

    /// Build a rule for tags that may carry an attribute.
    pub fn attributed(
        open: impl Into<String>,
        close: impl Into<String>,
        open_with_attr: Option<&str>,
        close_with_attr: Option<&str>,
    ) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
            allows_attribute: true,
            open_with_attr: open_with_attr.map(str::to_owned),
            close_with_attr: close_with_attr.map(str::to_owned),
            content_as_attr: false,
        }
    }

    /// Use the text content as attribute when the tag has none.
    pub fn with_content_as_attr(mut self) -> Self {
        self.content_as_attr = true;
        self
    }

    pub(crate) fn has_attr_template(&self) -> bool {
        self.open_with_attr.is_some() || self.close_with_attr.is_some()
    }

    /// Write the opening delimiter.
    pub fn write_open(
        &self,
        attr: Option<&str>,
        escape: Escape,
        formatter: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match (attr, self.open_with_attr.as_deref()) {
            (Some(attr), Some(template)) => write_template(template, attr, escape, formatter),
            _ => formatter.write_str(&self.open),
        }
    }

    /// Write the closing delimiter.
    pub fn write_close(
        &self,
        attr: Option<&str>,
        escape: Escape,
        formatter: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match (attr, self.close_with_attr.as_deref()) {
            (Some(attr), Some(template)) => write_template(template, attr, escape, formatter),
            _ => formatter.write_str(&self.close),
        }
    }
}

fn write_template(
    template: &str,
    attr: &str,
    escape: Escape,
    formatter: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let mut parts = template.split(ATTR_PLACEHOLDER);
    if let Some(first) = parts.next() {
        formatter.write_str(first)?;
    }
    for part in parts {
        escape.write_attr(attr, formatter)?;
        formatter.write_str(part)?;
    }
    Ok(())
}

/// How text and attributes are escaped in output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escape {
    /// Write as is.
    #[default]
    Plain,

    /// Escape html special characters.
    Html,

    /// Text as is, attributes quoted when they start or end with a quote.
    ///
    /// Quotes around attributes are stripped once when scanning, so `[quote=""Bob""]` has to
    /// be written back with the quotes to read the same again.
    Bbcode,
}

impl Escape {
    /// Write text content.
    pub fn write(self, text: &str, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escape::Plain | Escape::Bbcode => formatter.write_str(text),
            Escape::Html => {
                let mut rest = text;
                while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
                    formatter.write_str(&rest[..pos])?;
                    let entity = match &rest[pos..pos + 1] {
                        "&" => "&amp;",
                        "<" => "&lt;",
                        ">" => "&gt;",
                        "\"" => "&quot;",
                        _ => "&#39;",
                    };
                    formatter.write_str(entity)?;
                    rest = &rest[pos + 1..];
                }
                formatter.write_str(rest)
            }
        }
    }

    /// Write a tag attribute.
    pub fn write_attr(self, attr: &str, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escape::Bbcode
                if attr.starts_with(['"', '\'']) || attr.ends_with(['"', '\'']) =>
            {
                write!(formatter, "\"{attr}\"")
            }
            _ => self.write(attr, formatter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fmt<F>(F);

    impl<F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result> fmt::Display for Fmt<F> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.0)(f)
        }
    }

    /// Run a writer taking formatter and collect the output.
    fn display<F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result>(writer: F) -> String {
        Fmt(writer).to_string()
    }

    #[test]
    fn test_html_escape() {
        let out = display(|f| Escape::Html.write(r#"a<b>&"c"'d'"#, f));
        assert_eq!(out, "a&lt;b&gt;&amp;&quot;c&quot;&#39;d&#39;");
        let out = display(|f| Escape::Plain.write("<b>", f));
        assert_eq!(out, "<b>");
    }

    #[test]
    fn test_bbcode_attr_quoting() {
        let out = display(|f| Escape::Bbcode.write_attr("Bob", f));
        assert_eq!(out, "Bob");
        let out = display(|f| Escape::Bbcode.write_attr(r#""Bob""#, f));
        assert_eq!(out, r#"""Bob"""#);
        let out = display(|f| Escape::Bbcode.write_attr("it's", f));
        assert_eq!(out, "it's");
        let out = display(|f| Escape::Bbcode.write_attr("'a", f));
        assert_eq!(out, r#""'a""#);
        // Text is never quoted.
        let out = display(|f| Escape::Bbcode.write(r#""x""#, f));
        assert_eq!(out, r#""x""#);
    }

    #[test]
    fn test_content_as_attr() {
        let rule = TagRule::plain("<a>", "</a>");
        assert!(!rule.content_as_attr);
        let rule = TagRule::attributed("<a>", "</a>", Some(r#"<a href="{attr}">"#), None)
            .with_content_as_attr();
        assert!(rule.content_as_attr);
        assert!(rule.allows_attribute);
    }

    #[test]
    fn test_template_substitution() {
        let rule = TagRule::attributed("[url]", "[/url]", Some("[url={attr}]"), None);
        let out = display(|f| rule.write_open(Some("http://x"), Escape::Plain, f));
        assert_eq!(out, "[url=http://x]");
        let out = display(|f| rule.write_open(None, Escape::Plain, f));
        assert_eq!(out, "[url]");
        // No close template, the plain one is used.
        let out = display(|f| rule.write_close(Some("http://x"), Escape::Plain, f));
        assert_eq!(out, "[/url]");
    }

    #[test]
    fn test_template_escapes_attr_only() {
        let rule = TagRule::attributed("<a>", "</a>", Some(r#"<a href="{attr}" title="{attr}">"#), None);
        let out = display(|f| rule.write_open(Some(r#"x"y"#), Escape::Html, f));
        assert_eq!(out, r#"<a href="x&quot;y" title="x&quot;y">"#);
    }
}
