//! Markup writer
//!
//! Serializes widget subtrees to HTML text. Container children land on
//! their own lines and the closing tag is indented to the widget's
//! depth; raw formatting nodes print verbatim, carrying whatever
//! whitespace the declarative markup gave them.

use trellis_widgets::{Flavor, WidgetId, WidgetTree};

/// Render a widget subtree to a markup string
pub fn render_markup(tree: &WidgetTree, widget: WidgetId) -> String {
    let mut out = String::new();
    write_markup(tree, widget, &mut out, 0);
    out
}

/// Write a widget subtree at the given indentation depth
pub fn write_markup(tree: &WidgetTree, widget: WidgetId, out: &mut String, depth: usize) {
    let node = &tree[widget];

    if node.flavor() == Flavor::Raw {
        out.push_str(node.inner_value());
        return;
    }

    let element = node.element();
    out.push('<');
    out.push_str(element);
    if !node.identifier().is_empty() {
        out.push_str(" id=\"");
        push_escaped(out, &tree.client_id(widget));
        out.push('"');
    }
    for attr in node.attrs().iter() {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push_str("=\"");
            push_escaped(out, value);
            out.push('"');
        }
    }
    out.push('>');

    match node.flavor() {
        Flavor::Void => {}
        Flavor::Literal => {
            // Inner markup is authored HTML and passes through unescaped.
            out.push_str(node.inner_value());
            close_tag(out, element, 0);
        }
        Flavor::Container => {
            if node.has_content() {
                for &child in tree.children(widget) {
                    if tree[child].flavor() == Flavor::Raw {
                        write_markup(tree, child, out, depth + 1);
                    } else {
                        out.push_str("\r\n");
                        push_tabs(out, depth + 1);
                        write_markup(tree, child, out, depth + 1);
                    }
                }
                close_tag(out, element, depth + 1);
            } else {
                close_tag(out, element, 0);
            }
        }
        Flavor::Raw => {}
    }
}

/// Closing tag on its own line when `tabs > 0`, inline otherwise
fn close_tag(out: &mut String, element: &str, tabs: usize) {
    if tabs > 0 {
        out.push_str("\r\n");
        push_tabs(out, tabs - 1);
    }
    out.push_str("</");
    out.push_str(element);
    out.push('>');
}

fn push_tabs(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push('\t');
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_widgets::Widget;

    fn attach_identified(tree: &mut WidgetTree, parent: WidgetId, widget: Widget, id: &str) -> WidgetId {
        let node = tree.insert(widget);
        tree[node].set_identifier(id);
        tree.attach(parent, node, None).unwrap();
        node
    }

    #[test]
    fn test_literal_markup() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let literal = attach_identified(&mut tree, root, Widget::literal("literal"), "msg");
        tree[literal].set_inner_value("hello <b>world</b>").unwrap();

        assert_eq!(
            render_markup(&tree, literal),
            "<p id=\"msg\">hello <b>world</b></p>"
        );
    }

    #[test]
    fn test_void_markup_has_no_closing_tag() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let void = attach_identified(&mut tree, root, Widget::void("void"), "inp");
        tree[void].attrs_mut().set("type", "text");

        assert_eq!(render_markup(&tree, void), "<input id=\"inp\" type=\"text\">");
    }

    #[test]
    fn test_container_markup_indents_children() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let container = attach_identified(&mut tree, root, Widget::container("container"), "c");
        let child = attach_identified(&mut tree, container, Widget::literal("literal"), "a");
        tree[child].set_inner_value("x").unwrap();

        assert_eq!(
            render_markup(&tree, container),
            "<div id=\"c\">\r\n\t<p id=\"c_a\">x</p>\r\n</div>"
        );
    }

    #[test]
    fn test_empty_container_closes_inline() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let container = attach_identified(&mut tree, root, Widget::container("container"), "c");

        assert_eq!(render_markup(&tree, container), "<div id=\"c\"></div>");
    }

    #[test]
    fn test_bare_attribute_renders_name_only() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let option = attach_identified(&mut tree, root, Widget::literal("literal"), "o");
        tree[option].set_element("option").unwrap();
        tree[option].attrs_mut().set("value", "1");
        tree[option].attrs_mut().set_bare("selected");

        assert_eq!(
            render_markup(&tree, option),
            "<option id=\"o\" value=\"1\" selected></option>"
        );
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let literal = attach_identified(&mut tree, root, Widget::literal("literal"), "l");
        tree[literal].attrs_mut().set("title", "a\"b&c<d>");

        assert_eq!(
            render_markup(&tree, literal),
            "<p id=\"l\" title=\"a&quot;b&amp;c&lt;d&gt;\"></p>"
        );
    }

    #[test]
    fn test_raw_node_prints_verbatim() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let container = attach_identified(&mut tree, root, Widget::container("container"), "c");
        let raw = tree.insert(Widget::raw("\r\n  <!-- static -->"));
        tree.attach(container, raw, None).unwrap();

        assert_eq!(
            render_markup(&tree, container),
            "<div id=\"c\">\r\n  <!-- static -->\r\n</div>"
        );
    }
}
