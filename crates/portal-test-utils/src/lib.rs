//! Testing utilities for the portal workspace
//!
//! Shared fixtures and builders for templates, web parts and content.

#![allow(missing_docs)]

use portal_content::EditableItems;
use portal_webparts::{PageTemplateInstance, PropertyValue, WebPartInstance};
use uuid::Uuid;

/// Two zones, three web parts, one macro property
pub const SAMPLE_TEMPLATE_XML: &str = r#"<page>
  <webpartzone id="zoneHeader" v="1">
    <property name="container">box</property>
    <webpart controlid="logo" type="image" guid="00000000-0000-0000-0000-000000000001" v="1">
      <property name="imageurl">~/logo.png</property>
    </webpart>
  </webpartzone>
  <webpartzone id="zoneContent" v="1">
    <webpart controlid="text1" type="statictext" guid="00000000-0000-0000-0000-000000000002" v="1">
      <property name="text">Hello {%title%}</property>
      <property name="title">World</property>
    </webpart>
    <webpart controlid="text2" type="statictext" guid="00000000-0000-0000-0000-000000000003" variantmode="mvt" v="1">
      <property name="visible" ismacro="true">{%CurrentUser.IsAuthenticated%}</property>
    </webpart>
  </webpartzone>
</page>"#;

/// One region and one web part, with a CDATA terminator in the region
pub const SAMPLE_CONTENT_XML: &str = r#"<content>
  <region id="main"><![CDATA[<p>Main ]]#> text</p>]]></region>
  <webpart id="editabletext;editabletext1"><![CDATA[<b>Bold</b>]]></webpart>
</content>"#;

/// Deterministic GUID ending in `n`
pub fn fixed_guid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn sample_template() -> PageTemplateInstance {
    PageTemplateInstance::from_xml(SAMPLE_TEMPLATE_XML).unwrap()
}

pub fn sample_content() -> EditableItems {
    EditableItems::from_content_xml(SAMPLE_CONTENT_XML).unwrap()
}

pub fn web_part(control_id: &str, web_part_type: &str, properties: &[(&str, &str)]) -> WebPartInstance {
    let mut instance = WebPartInstance::new(control_id, web_part_type);
    for (name, value) in properties {
        instance.set_value(name, *value);
    }
    instance
}

pub fn web_part_with_guid(control_id: &str, web_part_type: &str, n: u128) -> WebPartInstance {
    let mut instance = WebPartInstance::new(control_id, web_part_type);
    instance.set_instance_guid(fixed_guid(n));
    instance
}

pub fn variant(control_id: &str, variant_id: i64, text: &str) -> WebPartInstance {
    let mut instance = WebPartInstance::new(control_id, "statictext");
    instance.set_variant_id(Some(variant_id));
    instance.set_value("text", PropertyValue::from(text));
    instance
}
