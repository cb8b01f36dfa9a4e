use junlib::{
    element_to_dict, element_to_json, element_to_structured, from_json_str, from_xml_str,
    json_to_element, to_json_string, ErrorKind, FieldValue, StructuredValue,
};

const PEOPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<root>
    <person id="1">
        <name>홍길동</name>
        <age>30</age>
    </person>
    <person id="2">
        <name>김철수</name>
        <age>25</age>
    </person>
</root>"#;

#[test]
fn test_xml_to_json_text() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str(PEOPLE)?;
    let output = to_json_string(&element_to_json(&doc.root)?, false)?;
    assert_eq!(
        output,
        r#"{"person":[{"id":"1","name":{"__text__":"홍길동"},"age":{"__text__":"30"}},{"id":"2","name":{"__text__":"김철수"},"age":{"__text__":"25"}}]}"#
    );
    Ok(())
}

#[test]
fn test_json_round_trip_restores_tree() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str(
        r#"<settings version="3"><window width="800" height="600">main</window>
           <theme><name>dark</name></theme><empty/></settings>"#,
    )?;
    let text = to_json_string(&element_to_json(&doc.root)?, true)?;
    let rebuilt = json_to_element(&from_json_str(&text)?, "settings")?;
    assert_eq!(rebuilt, doc.root);
    Ok(())
}

#[test]
fn test_list_promotion_order() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str("<list><item>a</item><item>b</item><item>c</item></list>")?;
    let structured = element_to_structured(&doc.root);
    let items: Vec<_> = structured
        .as_branch()
        .and_then(|fields| fields.get("item"))
        .map(|field| field.items().iter().filter_map(StructuredValue::as_leaf).collect())
        .unwrap_or_default();
    assert_eq!(items, vec![Some("a"), Some("b"), Some("c")]);
    Ok(())
}

#[test]
fn test_single_field_and_null_leaf() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str("<person><name>Hong</name><tag></tag></person>")?;
    let structured = element_to_structured(&doc.root);
    let fields = structured.as_branch().cloned().unwrap_or_default();
    assert!(matches!(fields.get("name"), Some(FieldValue::Single(_))));
    assert_eq!(
        fields.get("tag"),
        Some(&FieldValue::Single(StructuredValue::Leaf(None)))
    );
    Ok(())
}

#[test]
fn test_dict_text() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str(PEOPLE)?;
    let output = to_json_string(&element_to_dict(&doc.root), false)?;
    assert_eq!(
        output,
        r#"{"root":{"person":[{"name":"홍길동","age":"30"},{"name":"김철수","age":"25"}]}}"#
    );
    Ok(())
}

#[test]
fn test_conversion_errors() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str("<r><__text__/></r>")?;
    let err = element_to_json(&doc.root).err();
    assert!(matches!(
        err.as_ref().map(|e| e.kind()),
        Some(ErrorKind::ReservedKeyCollision { .. })
    ));

    let nested = from_json_str(r#"{"a": [[{"b": 1}]]}"#)?;
    let err = json_to_element(&nested, "root").err();
    assert!(matches!(
        err.as_ref().map(|e| e.kind()),
        Some(ErrorKind::MalformedInput)
    ));
    Ok(())
}

#[test]
fn test_search_by_attribute() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str(
        r#"<log><emotion worker="003" mood="happy"/><emotion worker="004" mood="sad"/>
           <day><emotion worker="003" mood="calm"/></day></log>"#,
    )?;
    let hits = doc.root.search_by_attribute("emotion", "worker", "003");
    let moods: Vec<_> = hits
        .iter()
        .filter_map(|(_, attrs)| attrs.get("mood").map(String::as_str))
        .collect();
    assert_eq!(moods, vec!["happy", "calm"]);
    assert!(doc.root.search_by_attribute("emotion", "worker", "999").is_empty());
    Ok(())
}
