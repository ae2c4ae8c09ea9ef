use crate::grammar::Grammar;
use crate::tag::TagRule;
use crate::tree::{Element, Node};
use std::fmt;
use std::fmt::Formatter;
use tracing::trace;

/// The main trait writing tree nodes in the output grammar.
pub trait Render {
    fn render(&self, grammar: &Grammar, formatter: &mut Formatter<'_>) -> fmt::Result;
}

struct RenderWrapper<'a, T>(&'a T, &'a Grammar);

impl<'a, T: Render> fmt::Display for RenderWrapper<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.render(self.1, f)
    }
}

/// Render `node` into a string in `grammar`.
pub fn render<T: Render>(node: &T, grammar: &Grammar) -> String {
    RenderWrapper(node, grammar).to_string()
}

impl Render for Vec<Node> {
    fn render(&self, grammar: &Grammar, formatter: &mut Formatter<'_>) -> fmt::Result {
        for node in self.iter() {
            node.render(grammar, formatter)?
        }
        Ok(())
    }
}

impl Render for Node {
    fn render(&self, grammar: &Grammar, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => grammar.escape().write(text, formatter),
            Node::Element(element) => element.render(grammar, formatter),
        }
    }
}

impl Render for Element {
    /// Write open delimiter, children then close delimiter, in pre-order.
    ///
    /// Close delimiter is only written when the element was closed in source. Root writes
    /// children only.
    ///
    /// Walks with an explicit stack, nesting depth does not grow the call stack.
    fn render(&self, grammar: &Grammar, formatter: &mut Formatter<'_>) -> fmt::Result {
        // Elements being written, with the index of their next child.
        let mut stack: Vec<(&Element, usize)> = vec![(self, 0)];
        write_open(self, grammar, formatter)?;

        while let Some(frame) = stack.last_mut() {
            let element = frame.0;
            let Some(child) = element.children.get(frame.1) else {
                stack.pop();
                write_close(element, grammar, formatter)?;
                continue;
            };
            frame.1 += 1;

            match child {
                Node::Text(text) => grammar.escape().write(text, formatter)?,
                Node::Element(child) => {
                    write_open(child, grammar, formatter)?;
                    stack.push((child, 0));
                }
            }
        }
        Ok(())
    }
}

/// Find the rule of `element` and the attribute to write in its delimiters.
///
/// Root and elements unknown to `grammar` have no rule.
fn element_rule<'a>(
    element: &'a Element,
    grammar: &'a Grammar,
) -> Option<(&'a TagRule, Option<&'a str>)> {
    let name = element.name.as_deref()?;
    let Some((_, rule)) = grammar.rule(name) else {
        trace!(
            "tag {name:?} not in grammar {:?}, render children only",
            grammar.name()
        );
        return None;
    };

    let attr = match element.attr.as_deref() {
        Some(attr) => Some(attr),
        None if rule.content_as_attr => match element.children.as_slice() {
            [Node::Text(text)] => Some(text.as_str()),
            _ => None,
        },
        None => None,
    };
    Some((rule, attr))
}

fn write_open(
    element: &Element,
    grammar: &Grammar,
    formatter: &mut Formatter<'_>,
) -> fmt::Result {
    match element_rule(element, grammar) {
        Some((rule, attr)) => rule.write_open(attr, grammar.escape(), formatter),
        None => Ok(()),
    }
}

fn write_close(
    element: &Element,
    grammar: &Grammar,
    formatter: &mut Formatter<'_>,
) -> fmt::Result {
    match element_rule(element, grammar) {
        Some((rule, attr)) if element.closed => {
            rule.write_close(attr, grammar.escape(), formatter)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan;
    use crate::tree::build;

    fn convert(data: &str, grammar: &Grammar) -> String {
        render(&build(scan(data, grammar)), grammar)
    }

    #[test]
    fn test_bbcode_canonical() {
        let grammar = Grammar::bbcode();
        assert_eq!(
            convert("[B]x[/b] [QUOTE=\"Bob\"]hi[/quote]", &grammar),
            "[b]x[/b] [quote=Bob]hi[/quote]"
        );
    }

    #[test]
    fn test_html() {
        let grammar = Grammar::html();
        assert_eq!(
            convert("[b][i]x[/i][/b]", &grammar),
            "<strong><em>x</em></strong>"
        );
        assert_eq!(
            convert("[url=http://x?a=1&b=2]<link>[/url]", &grammar),
            r#"<a href="http://x?a=1&amp;b=2">&lt;link&gt;</a>"#
        );
        assert_eq!(
            convert("[quote=Bob]hi[/quote]", &grammar),
            "<blockquote><cite>Bob</cite>hi</blockquote>"
        );
        assert_eq!(
            convert("[color=red]x[/color][color]y[/color]", &grammar),
            r#"<span style="color: red">x</span><span>y</span>"#
        );
    }

    #[test]
    fn test_html_url_content_as_link() {
        let grammar = Grammar::html();
        assert_eq!(
            convert("[url]http://x[/url]", &grammar),
            r#"<a href="http://x">http://x</a>"#
        );
        assert_eq!(
            convert("[url]http://x?a=1&b=2[/url]", &grammar),
            r#"<a href="http://x?a=1&amp;b=2">http://x?a=1&amp;b=2</a>"#
        );
        // Content with tags inside is not a link.
        assert_eq!(
            convert("[url][b]x[/b][/url]", &grammar),
            "<a><strong>x</strong></a>"
        );
        // Unclosed, the link still opens.
        assert_eq!(
            convert("[url]http://x", &grammar),
            r#"<a href="http://x">http://x"#
        );
    }

    #[test]
    fn test_html_keeps_literal_brackets() {
        assert_eq!(
            convert("[foo]x[/b]", &Grammar::html()),
            "[foo]x[/b]"
        );
    }

    #[test]
    fn test_markdown() {
        let grammar = Grammar::markdown();
        assert_eq!(convert("[b]x[/b] [s]y[/s]", &grammar), "**x** ~~y~~");
        assert_eq!(
            convert("[url=http://x]site[/url]", &grammar),
            "[site](http://x)"
        );
        assert_eq!(convert("[url]http://x[/url]", &grammar), "<http://x>");
        assert_eq!(convert("[color=red]x[/color]", &grammar), "x");
    }

    #[test]
    fn test_unclosed_has_no_close_delimiter() {
        assert_eq!(
            convert("[b]bold forever", &Grammar::html()),
            "<strong>bold forever"
        );
        // Close template with attribute is skipped too.
        assert_eq!(
            convert("[url=http://x]site", &Grammar::markdown()),
            "[site"
        );
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 100_000;
        let closed = format!("{}x{}", "[i]".repeat(depth), "[/i]".repeat(depth));
        let html = convert(&closed, &Grammar::html());
        assert!(html.starts_with("<em><em>"));
        assert_eq!(html.len(), depth * "<em></em>".len() + 1);

        let unclosed = "[b]".repeat(depth);
        assert_eq!(convert(&unclosed, &Grammar::bbcode()), unclosed);
    }

    #[test]
    fn test_tag_missing_in_grammar() {
        let root = build(scan("[code]x[/code]", &Grammar::bbcode()));
        let grammar = Grammar::from_toml("[tags.b]\nopen = \"<b>\"\nclose = \"</b>\"").unwrap();
        assert_eq!(render(&root, &grammar), "x");
    }
}
