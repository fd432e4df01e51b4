// src/xml/element.rs
use crate::error::{IndexError, Result};
use crate::rle::parse_integer;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::str::FromStr;

/// Minimal element tree, an index document carries all its data in attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    /// Parses a document and returns its root element.
    pub fn parse(text: &str) -> Result<Element> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(true);
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;
        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| IndexError::Decode("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        if let Some(open) = stack.last() {
            return Err(IndexError::Decode(format!("element <{}> is not closed", open.name)));
        }
        root.ok_or_else(|| IndexError::Decode("document has no root element".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn expect_name(&self, name: &str) -> Result<()> {
        if self.name != name {
            return Err(IndexError::UnexpectedElement {
                expected: name.to_string(),
                found: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn attr(&self, name: &str) -> Result<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| IndexError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    pub fn invalid_attr(&self, name: &str, value: &str) -> IndexError {
        IndexError::InvalidAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
            value: value.to_string(),
        }
    }

    /// An integer attribute written in decimal or `0x` hexadecimal.
    pub fn attr_int<T: TryFrom<i64>>(&self, name: &str) -> Result<T> {
        let text = self.attr(name)?;
        parse_integer(text)
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| self.invalid_attr(name, text))
    }

    pub fn attr_parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let text = self.attr(name)?;
        text.parse().map_err(|_| self.invalid_attr(name, text))
    }

    pub fn children_named<'a: 'b, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a Element> + 'b {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// The only child called `name`, absent or repeated is an error.
    pub fn single(&self, name: &str) -> Result<&Element> {
        self.optional(name)?.ok_or_else(|| IndexError::XPathCardinalityError {
            xpath: format!("{}/{}", self.name, name),
            found: 0,
        })
    }

    /// At most one child called `name`.
    pub fn optional(&self, name: &str) -> Result<Option<&Element>> {
        let mut matches = self.children_named(name);
        let first = matches.next();
        let rest = matches.count();
        if rest > 0 {
            return Err(IndexError::XPathCardinalityError {
                xpath: format!("{}/{}", self.name, name),
                found: rest + 1,
            });
        }
        Ok(first)
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(IndexError::Decode(format!("second root element <{}>", element.name))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Root a="1" h="0x1F" s="x &amp; y">
  <Child n="1"/>
  <Child n="2"><Leaf/></Child>
  <Other/>
</Root>"#;

    #[test]
    fn test_parse_tree() {
        let root = Element::parse(DOC).unwrap();
        root.expect_name("Root").unwrap();
        assert_eq!(root.attr_int::<u32>("a").unwrap(), 1);
        assert_eq!(root.attr_int::<u64>("h").unwrap(), 31);
        assert_eq!(root.attr("s").unwrap(), "x & y");
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children_named("Child").count(), 2);
        assert_eq!(root.single("Other").unwrap().children.len(), 0);
        assert!(root.optional("Missing").unwrap().is_none());
    }

    #[test]
    fn test_errors() {
        let root = Element::parse(DOC).unwrap();
        assert!(matches!(root.attr("zz"), Err(IndexError::MissingAttribute { .. })));
        assert!(matches!(root.attr_int::<u8>("s"), Err(IndexError::InvalidAttribute { .. })));
        assert!(matches!(root.attr_int::<u8>("h"), Ok(31)));
        assert!(matches!(
            root.single("Child"),
            Err(IndexError::XPathCardinalityError { found: 2, .. })
        ));
        assert!(matches!(
            root.single("Missing"),
            Err(IndexError::XPathCardinalityError { found: 0, .. })
        ));
        assert!(matches!(root.expect_name("Other"), Err(IndexError::UnexpectedElement { .. })));
        assert!(Element::parse("<A><B></A>").is_err());
        assert!(Element::parse("").is_err());
    }

    #[test]
    fn test_child_outlives_name() {
        let root = Element::parse("<A><B/><C/><C/></A>").unwrap();
        let found = {
            let name = String::from("B");
            root.optional(&name).unwrap()
        };
        assert_eq!(found.map(|e| e.name.as_str()), Some("B"));
        assert!(root.optional("D").unwrap().is_none());
        assert!(matches!(root.optional("C"), Err(IndexError::XPathCardinalityError { found: 2, .. })));
    }
}
