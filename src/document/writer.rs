//! Serializer for rule documents.
//!
//! The writer is the left-inverse of the parser for any document built
//! from the literal/reference/list/nested-object grammar: parsing the
//! output yields a structurally equal document. Raw expressions are
//! written back verbatim.

use std::fmt::Write as _;

use crate::document::value::{Document, Import, Node, Value};

const INDENT: &str = "    ";

/// Serialize a document to rule text.
#[must_use]
pub fn write(document: &Document) -> String {
    let mut writer = DocumentWriter {
        buf: String::new(),
        depth: 0,
    };
    for import in &document.imports {
        writer.write_import(import);
    }
    if !document.imports.is_empty() {
        writer.buf.push('\n');
    }
    writer.write_node(&document.root);
    writer.buf.push('\n');
    writer.buf
}

struct DocumentWriter {
    buf: String,
    depth: usize,
}

impl DocumentWriter {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
    }

    fn write_import(&mut self, import: &Import) {
        self.buf.push_str("import ");
        if let Some(uri) = &import.uri {
            self.buf.push_str(uri);
        } else if let Some(file) = &import.file {
            self.write_string(file);
        }
        if let Some(version) = &import.version {
            self.buf.push(' ');
            self.buf.push_str(version);
        }
        if let Some(alias) = &import.alias {
            self.buf.push_str(" as ");
            self.buf.push_str(alias);
        }
        self.buf.push('\n');
    }

    /// Write a node starting at the current position; the closing brace
    /// lands on its own line at the current depth.
    fn write_node(&mut self, node: &Node) {
        self.buf.push_str(&node.type_name);
        self.buf.push_str(" {\n");
        self.depth += 1;

        if let Some(id) = &node.id {
            self.indent();
            let _ = writeln!(self.buf, "id: {id}");
        }
        for (name, value) in node.properties() {
            self.indent();
            self.buf.push_str(name);
            self.buf.push_str(": ");
            self.write_value(value);
            self.buf.push('\n');
        }
        for child in node.children() {
            self.indent();
            self.write_node(child);
            self.buf.push('\n');
        }

        self.depth -= 1;
        self.indent();
        self.buf.push('}');
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.buf.push_str("null"),
            Value::Bool(true) => self.buf.push_str("true"),
            Value::Bool(false) => self.buf.push_str("false"),
            Value::Int(n) => {
                let _ = write!(self.buf, "{n}");
            }
            Value::Double(d) => self.write_double(*d),
            Value::String(s) => self.write_string(s),
            Value::Reference(reference) => self.buf.push_str(&reference.chain()),
            Value::Expr(raw) => self.buf.push_str(&raw.source),
            Value::Object(node) => self.write_node(node),
            Value::List(items) => self.write_list(items),
        }
    }

    fn write_list(&mut self, items: &[Value]) {
        if items.is_empty() {
            self.buf.push_str("[]");
            return;
        }
        self.buf.push_str("[\n");
        self.depth += 1;
        for (index, item) in items.iter().enumerate() {
            self.indent();
            self.write_value(item);
            if index + 1 < items.len() {
                self.buf.push(',');
            }
            self.buf.push('\n');
        }
        self.depth -= 1;
        self.indent();
        self.buf.push(']');
    }

    /// Doubles keep a decimal point so they re-parse as doubles.
    fn write_double(&mut self, value: f64) {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            let _ = write!(self.buf, "{value:.1}");
        } else {
            let _ = write!(self.buf, "{value}");
        }
    }

    fn write_string(&mut self, value: &str) {
        self.buf.push('"');
        for ch in value.chars() {
            match ch {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                ch if (ch as u32) < 0x20 => {
                    let _ = write!(self.buf, "\\u{:04x}", ch as u32);
                }
                ch => self.buf.push(ch),
            }
        }
        self.buf.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use crate::document::value::PropertyRef;

    fn sample_document() -> Document {
        let mut trigger = Node::new("TimeTrigger");
        trigger.set_property(
            "time",
            Value::Reference(PropertyRef::new("mapper0", vec!["value".to_string()])),
        );

        let mut action = Node::new("LoggerAction");
        action.set_property("enabled", Value::Bool(true));

        let mut mapper = Node::new("TimeMapper");
        mapper.id = Some("mapper0".to_string());
        mapper.set_property("hour", Value::Int(8));
        mapper.set_property("minute", Value::Int(30));

        let mut root = Node::new("Rule");
        root.set_property("name", Value::String("morning".to_string()));
        root.set_property("trigger", Value::Object(trigger));
        root.set_property("actions", Value::List(vec![Value::Object(action)]));
        root.set_property("mappers", Value::List(vec![Value::Object(mapper)]));

        Document::new(vec![Import::module("org.rulebot.core", "1.0")], root)
    }

    #[test]
    fn test_write_layout() {
        let text = write(&sample_document());
        let expected = "\
import org.rulebot.core 1.0

Rule {
    name: \"morning\"
    trigger: TimeTrigger {
        time: mapper0.value
    }
    actions: [
        LoggerAction {
            enabled: true
        }
    ]
    mappers: [
        TimeMapper {
            id: mapper0
            hour: 8
            minute: 30
        }
    ]
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_round_trip() {
        let document = sample_document();
        let text = write(&document);
        let reparsed = parse(&text).expect("serialized document must parse");
        assert_eq!(reparsed, document);
    }

    #[test]
    fn test_round_trip_value_grammar() {
        let mut root = Node::new("Rule");
        root.set_property("string", Value::String("a \"b\"\nc".to_string()));
        root.set_property("int", Value::Int(-42));
        root.set_property("double", Value::Double(3.0));
        root.set_property("fraction", Value::Double(0.25));
        root.set_property("flag", Value::Bool(false));
        root.set_property("nothing", Value::Null);
        root.set_property(
            "reference",
            Value::Reference(PropertyRef::new("a", vec!["b".to_string(), "c".to_string()])),
        );
        root.set_property(
            "list",
            Value::List(vec![Value::Int(1), Value::String("two".to_string())]),
        );
        root.set_property("empty", Value::List(Vec::new()));
        let document = Document::new(Vec::new(), root);

        let reparsed = parse(&write(&document)).expect("must parse");
        assert_eq!(reparsed, document);
    }

    #[test]
    fn test_double_keeps_decimal_point() {
        let mut root = Node::new("Rule");
        root.set_property("d", Value::Double(3.0));
        let text = write(&Document::new(Vec::new(), root));
        assert!(text.contains("d: 3.0"), "got: {text}");
    }

    #[test]
    fn test_raw_expression_verbatim() {
        let source = "Rule {\n    js: new Date(1960, 1, 1)\n}\n";
        let document = parse(source).expect("must parse");
        assert_eq!(write(&document), source);
    }
}
