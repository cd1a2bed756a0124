//! Round-trip tests for the element tree over portal-shaped documents.

use portal_xml::{escape_cdata, parse_document, unescape_cdata, write_document, WriteOptions, XmlNode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- saved by the designer -->
<page>
  <webpartzone id="zoneA" v="1">
    <webpart controlid="text1" type="statictext" guid="6f1c2a86-6a53-4d8e-9f0b-0c4b7d1e2f30" v="1">
      <property name="text">Fish &amp; chips &lt;today&gt;</property>
      <property name="visible" ismacro="true">{%CurrentUser.IsAuthenticated%}</property>
    </webpart>
  </webpartzone>
</page>"#;

#[test]
fn template_survives_compact_and_indented_writes() {
    let parsed = parse_document(TEMPLATE).unwrap();

    for options in [WriteOptions::new(), WriteOptions::new().with_indent(4).with_declaration()] {
        let written = write_document(&parsed, &options).unwrap();
        assert_eq!(parse_document(&written).unwrap(), parsed);
    }
}

#[test]
fn comments_and_declaration_are_dropped() {
    let parsed = parse_document(TEMPLATE).unwrap();
    assert_eq!(parsed.name(), "page");
    assert_eq!(parsed.children().len(), 1);

    let property = parsed
        .elements()
        .flat_map(|zone| zone.elements())
        .flat_map(|wp| wp.elements_named("property"))
        .next()
        .unwrap();
    assert_eq!(property.text(), "Fish & chips <today>");
}

proptest! {
    #[test]
    fn escaped_cdata_payload_is_writable(payload in "([a-z<>&]|\\]\\]>){0,12}") {
        let mut root = parse_document("<content/>").unwrap();
        root.push_cdata(escape_cdata(&payload).into_owned());

        let written = write_document(&root, &WriteOptions::default()).unwrap();
        let reparsed = parse_document(&written).unwrap();

        let stored = match reparsed.children().first() {
            Some(XmlNode::CData(text)) => text.clone(),
            None => String::new(),
            Some(other) => panic!("unexpected node {other:?}"),
        };
        prop_assert_eq!(unescape_cdata(&stored), payload.as_str());
    }
}
