//! Default converters for generic values (strings, numbers, arrays, maps).

use super::{Doc, PrintError, Printer, Registry};
use crate::{Node, NodeKind, Path};

pub(super) fn register(registry: &mut Registry) {
    registry
        .register(NodeKind::STR, "", print_literal)
        .register(NodeKind::INT, "", print_literal)
        .register(NodeKind::FLOAT, "", print_literal)
        .register(NodeKind::BOOL, "", print_literal)
        .register(NodeKind::NONE, "", print_literal)
        .register(NodeKind::ARRAY, "", print_array)
        .register(NodeKind::MAP, "", print_map);
}

fn mismatch(kind: NodeKind, expected: &'static str, path: &Path) -> PrintError {
    PrintError::KindMismatch { kind, expected, path: path.clone() }
}

fn print_literal(node: &Node, path: &Path, _: &Printer<'_>) -> Result<Doc, PrintError> {
    Ok(match node {
        Node::Str(s) => Doc::str(&s[..]),
        &Node::Int(x) => Doc::int(x),
        &Node::Float(x) => Doc::float(x),
        &Node::Bool(b) => Doc::boolean(b),
        Node::None => Doc::none(),
        _ => return Err(mismatch(node.kind(), "literal", path)),
    })
}

/// Arrays print as lists, with each element at `path[i]`.
fn print_array(node: &Node, path: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    let Node::Array(elements) = node else {
        return Err(mismatch(node.kind(), "array", path));
    };
    let elements = elements
        .iter()
        .enumerate()
        .map(|(i, element)| printer.convert(element, &path.index(i)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Doc::list(elements))
}

/// Maps print as dicts (in key insertion order), with each value at `path[key]`.
fn print_map(node: &Node, path: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    let Node::Map(entries) = node else {
        return Err(mismatch(node.kind(), "map", path));
    };
    let entries = entries
        .iter()
        .map(|(key, value)| Ok((Doc::str(&key[..]), printer.convert(value, &path.map_value(key))?)))
        .collect::<Result<Vec<_>, PrintError>>()?;
    Ok(Doc::dict(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FxIndexMap;
    use crate::print::PrinterConfig;

    #[test]
    fn values() {
        let registry = Registry::with_builtins();
        let config = PrinterConfig::default();
        let printer = Printer::new(&registry, &config);

        let mut map = FxIndexMap::default();
        map.insert("b".to_string(), Node::from(vec![Node::Int(1), Node::Bool(false)]));
        map.insert("a".to_string(), Node::None);
        let doc = printer.print(&Node::from(map)).unwrap();
        assert_eq!(doc.to_string(), r#"{"b": [1, False], "a": None}"#);

        let dict = doc.as_dict().unwrap();
        let (_, list) = &dict.entries[0];
        let first = &list.as_list().unwrap().elements[0];
        assert_eq!(first.source_paths(), [Path::root().map_value("b").index(0)]);
    }
}
