use junlib::{
    derive_schema, element_to_json, element_to_structured, from_json_str, from_xml_str,
    SchemaOptions, SchemaSource, SchemaType,
};

#[test]
fn test_schema_document_text() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_xml_str("<data><row><id>1</id></row><row><id>2</id></row></data>")?;
    let schema = derive_schema(SchemaSource::Element(&doc.root), &SchemaOptions::default());
    let expected = "<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">\n\
        <xs:element name=\"data\">\n\
        <xs:complexType>\n<xs:sequence>\n\
        <xs:element name=\"row\" maxOccurs=\"unbounded\">\n\
        <xs:complexType>\n<xs:sequence>\n\
        <xs:element name=\"id\">\n\
        <xs:simpleType>\n<xs:restriction base=\"xs:string\" />\n</xs:simpleType>\n\
        </xs:element>\n\
        </xs:sequence>\n</xs:complexType>\n\
        </xs:element>\n\
        </xs:sequence>\n</xs:complexType>\n\
        </xs:element></xs:schema>";
    assert_eq!(schema.to_document(), expected);
    Ok(())
}

#[test]
fn test_cardinality_from_every_source() -> Result<(), Box<dyn std::error::Error>> {
    let options = SchemaOptions::default();
    for (xml, repeatable) in [("<t><row/><row/></t>", true), ("<t><row/></t>", false)] {
        let root = from_xml_str(xml)?.root;
        let structured = element_to_structured(&root);
        let json = element_to_json(&root)?;
        let sources = [
            SchemaSource::Element(&root),
            SchemaSource::Structured {
                value: &structured,
                root_name: "t",
            },
            SchemaSource::Json {
                value: &json,
                root_name: "t",
            },
        ];
        for source in sources {
            let schema = derive_schema(source, &options);
            let row = schema.root.member("row");
            assert_eq!(row.map(|row| row.repeatable), Some(repeatable), "{source:?}");
        }
    }
    Ok(())
}

#[test]
fn test_numeric_text_stays_string() -> Result<(), Box<dyn std::error::Error>> {
    let root = from_xml_str("<m><n>42</n><f>3.5</f><b>false</b></m>")?.root;
    let schema = derive_schema(SchemaSource::Element(&root), &SchemaOptions::default());
    assert!(schema.members().iter().all(|m| m.kind == SchemaType::Simple));

    let json = from_json_str(r#"{"n": 42, "f": 3.5, "b": false}"#)?;
    let schema = derive_schema(
        SchemaSource::Json {
            value: &json,
            root_name: "m",
        },
        &SchemaOptions::default(),
    );
    assert!(schema.members().iter().all(|m| m.kind == SchemaType::String));
    Ok(())
}

#[test]
fn test_merge_repeated_collects_all_members() -> Result<(), Box<dyn std::error::Error>> {
    let json = from_json_str(r#"{"row": [{"a": 1}, {"b": 2}, {"a": 3, "c": [1, 2]}]}"#)?;
    let source = SchemaSource::Json {
        value: &json,
        root_name: "t",
    };

    let first = derive_schema(source, &SchemaOptions::default());
    let names = |schema: &junlib::SchemaDescription| -> Vec<String> {
        schema
            .root
            .member("row")
            .map(|row| match &row.kind {
                SchemaType::Complex(members) => members.iter().map(|m| m.name.clone()).collect(),
                _ => Vec::new(),
            })
            .unwrap_or_default()
    };
    assert_eq!(names(&first), vec!["a"]);

    let merged = derive_schema(source, &SchemaOptions::merged());
    assert_eq!(names(&merged), vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn test_derived_schema_validates_its_source() -> Result<(), Box<dyn std::error::Error>> {
    let source = from_xml_str(
        "<orders><order id=\"1\"><sku>A</sku><qty>2</qty></order>\
         <order id=\"2\"><sku>B</sku><qty>1</qty></order></orders>",
    )?;
    let schema = derive_schema(SchemaSource::Element(&source.root), &SchemaOptions::default());
    schema.validate(&source.root)?;

    let extra = from_xml_str("<orders><order><sku>A</sku><qty>2</qty><note/></order></orders>")?;
    assert!(schema.validate(&extra.root).is_err());
    Ok(())
}
