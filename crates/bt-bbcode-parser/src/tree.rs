use crate::token::{TagHead, TagTail, Token};
use serde::Serialize;
use tracing::trace;

/// Node is a unit in the document tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Node {
    /// Plain text, does not contain tags.
    Text(String),

    /// Tag span, may contain other nodes.
    Element(Element),
}

/// A tag span and its children.
///
/// The document root is an element without name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Lowercased tag name, `None` on root.
    pub name: Option<String>,

    /// Attribute in tag head.
    pub attr: Option<String>,

    /// Children in document order.
    pub children: Vec<Node>,

    /// The tail of this element was seen in source or not.
    ///
    /// Always false on root.
    pub closed: bool,
}

impl Element {
    /// Construct an empty document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.name.is_none()
    }

    fn open(head: TagHead) -> Self {
        Self {
            name: Some(head.name),
            attr: head.attr,
            children: vec![],
            closed: false,
        }
    }

    /// Append text, merged into the last child if it is text too.
    fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_owned()));
        }
    }
}

impl Drop for Element {
    /// Drop descendants from a flat list, nesting depth does not grow the call stack.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// Build the document tree from tokens.
///
/// Never fails, see [`TreeBuilder`] for how unmatched tags are handled.
pub fn build(tokens: impl IntoIterator<Item = Token>) -> Element {
    let mut builder = TreeBuilder::new();
    for token in tokens {
        builder.push(token);
    }
    builder.finish()
}

/// Builds tree with an explicit stack of open elements.
///
/// * A tail only closes the element on top of the stack, when names match. Any other tail,
///   including one with nothing open, is kept as text in the current element.
/// * Elements still open at the end are kept with their children, and stay unclosed.
pub struct TreeBuilder {
    /// Document root, bottom of the stack.
    root: Element,

    /// Open elements, innermost last.
    stack: Vec<Element>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            root: Element::root(),
            stack: vec![],
        }
    }

    /// Current innermost element.
    fn current(&mut self) -> &mut Element {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    pub fn push(&mut self, token: Token) {
        match token {
            Token::Text(text) => self.current().push_text(&text),
            Token::Head(head) => self.stack.push(Element::open(head)),
            Token::Tail(tail) => self.close(tail),
        }
    }

    fn close(&mut self, tail: TagTail) {
        let matched = self
            .stack
            .last()
            .is_some_and(|x| x.name.as_deref() == Some(tail.name.as_str()));
        if !matched {
            trace!("unmatched tail {:?}, keep as text", tail.raw);
            self.current().push_text(&tail.raw);
            return;
        }

        if let Some(mut element) = self.stack.pop() {
            element.closed = true;
            self.current().children.push(Node::Element(element));
        }
    }

    /// Attach all elements still open to their parents and return the root.
    pub fn finish(mut self) -> Element {
        while let Some(element) = self.stack.pop() {
            trace!("element {:?} not closed", element.name);
            self.current().children.push(Node::Element(element));
        }
        self.root
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
