//! Persistence tests for web-part instances and page templates.
//!
//! - A saved instance reloads with the same control ID, type, GUID and
//!   properties.
//! - Loading rejects nodes without `controlid` or `type`.
//! - Template edits survive a save/load cycle.

use portal_test_utils::{fixed_guid, sample_template, variant, web_part, web_part_with_guid};
use portal_webparts::{
    InMemoryVariantLoader, MacroEscape, PageTemplateInstance, PropertyValue, VariantMode,
    WebPartError, WebPartInstance,
};
use portal_xml::WriteOptions;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Every kind of stored value, including blank and padded text
fn property_value() -> impl Strategy<Value = PropertyValue> {
    prop_oneof![
        "[A-Za-z0-9<>&\"' ]{0,16}".prop_map(PropertyValue::Text),
        "[ \t]{1,4}".prop_map(PropertyValue::Text),
        any::<bool>().prop_map(PropertyValue::Bool),
        any::<i64>().prop_map(PropertyValue::Int),
        any::<u128>().prop_map(|n| PropertyValue::Guid(fixed_guid(n))),
        "\\{%[A-Za-z.]{1,12}%\\}".prop_map(PropertyValue::Macro),
    ]
}

proptest! {
    #[test]
    fn saved_instance_reloads_identically(
        control_id in identifier(),
        web_part_type in identifier(),
        guid in any::<u128>().prop_filter("nil guid is not an identity", |n| *n != 0),
        properties in prop::collection::btree_map(identifier(), property_value(), 0..8),
        indent in prop::option::of(1_usize..4),
    ) {
        let mut instance = WebPartInstance::new(control_id.as_str(), web_part_type.as_str());
        instance.set_instance_guid(fixed_guid(guid));
        for (name, value) in &properties {
            instance.set_value(name, value.clone());
        }

        let options = WriteOptions { indent, xml_declaration: false };
        let xml = instance.to_xml_with(&MacroEscape::Preserve, &options).unwrap();
        let reloaded = WebPartInstance::from_xml(&xml).unwrap();

        prop_assert_eq!(reloaded.control_id(), control_id.as_str());
        prop_assert_eq!(reloaded.web_part_type(), web_part_type.as_str());
        prop_assert_eq!(reloaded.instance_guid(), Some(fixed_guid(guid)));
        for (name, value) in &properties {
            prop_assert_eq!(reloaded.get_value(name), Some(value.clone()));
        }
        prop_assert_eq!(reloaded.properties(), instance.properties());
    }
}

#[test]
fn missing_attributes_are_reported_with_loader_prefix() {
    for xml in [
        r#"<webpart type="statictext"/>"#,
        r#"<webpart controlid="text1"/>"#,
        r#"<webpart controlid="  " type="statictext"/>"#,
    ] {
        let err = WebPartInstance::from_xml(xml).unwrap_err();
        assert!(matches!(err, WebPartError::MissingAttribute { .. }));
        assert!(err.to_string().starts_with("[WebPartInstance.LoadFromXmlNode]:"));
    }
}

#[test]
fn clone_edits_do_not_leak() {
    let original = web_part("text1", "statictext", &[("text", "Hello")]);
    let mut copy = original.clone();
    copy.set_value("text", "Changed");
    copy.set_value("extra", true);

    assert_eq!(original.get_text("text").as_deref(), Some("Hello"));
    assert!(original.get_value("extra").is_none());
    assert_eq!(copy.get_value("extra"), Some(PropertyValue::Bool(true)));
}

#[test]
fn macro_values_survive_with_normalized_escaping() {
    let mut instance = web_part_with_guid("text1", "statictext", 7);
    instance.set_value("visible", PropertyValue::Macro(" CurrentUser.IsAuthenticated ".into()));

    let xml = instance
        .to_xml_with(&MacroEscape::Normalize, &WriteOptions::default())
        .unwrap();
    let reloaded = WebPartInstance::from_xml(&xml).unwrap();

    assert_eq!(
        reloaded.get_value("visible"),
        Some(PropertyValue::Macro("{%CurrentUser.IsAuthenticated%}".into()))
    );
}

#[test]
fn edited_template_round_trips() {
    let mut template = sample_template();
    template
        .move_web_part("text2", "zoneHeader", Some(0))
        .unwrap();
    let copy_id = template.copy_web_part("logo", "zoneContent").unwrap();
    template.remove_web_part("text1").unwrap();

    let xml = template.to_xml_with(&MacroEscape::Preserve, &WriteOptions::new().with_indent(2)).unwrap();
    let reloaded = PageTemplateInstance::from_xml(&xml).unwrap();

    let header: Vec<_> = reloaded
        .zone("zoneheader")
        .unwrap()
        .web_parts()
        .map(WebPartInstance::control_id)
        .collect();
    assert_eq!(header, vec!["text2", "logo"]);
    assert_eq!(copy_id, "logo1");
    assert!(reloaded.find_web_part("text1").is_none());
    assert_eq!(
        reloaded.find_web_part("logo1").unwrap().get_text("imageurl").as_deref(),
        Some("~/logo.png")
    );
    assert_eq!(reloaded.find_web_part("text2").unwrap().variant_mode(), VariantMode::Mvt);
}

#[test]
fn template_variants_follow_document_scope() {
    let mut template = sample_template();
    let mut loader = InMemoryVariantLoader::new();
    loader.register(fixed_guid(3), VariantMode::Mvt, None, variant("text2", 1, "A"));
    loader.register(fixed_guid(3), VariantMode::Mvt, Some(42), variant("text2", 2, "B"));

    assert_eq!(template.load_variants(&loader, Some(7)).unwrap(), 1);
    assert_eq!(template.load_variants(&loader, Some(42)).unwrap(), 2);

    let text2 = template.find_web_part("text2").unwrap();
    assert_eq!(text2.select_variant(Some(2)).get_text("text").as_deref(), Some("B"));
    assert_eq!(text2.select_variant(Some(99)).control_id(), "text2");
}

#[test]
fn property_macros_resolve_against_own_properties() {
    let template = sample_template();
    let text1 = template.find_web_part("text1").unwrap();
    let text = text1.get_text("text").unwrap();
    assert_eq!(text1.resolve_property_macros(&text), "Hello World");
}
