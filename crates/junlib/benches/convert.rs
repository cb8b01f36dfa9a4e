use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use junlib::{
    derive_schema, element_to_json, element_to_structured, from_xml_str, json_to_element,
    Element, SchemaOptions, SchemaSource,
};

fn table(rows: usize) -> Element {
    let mut xml = String::from("<table>");
    for i in 0..rows {
        xml.push_str(&format!(
            "<row id=\"{i}\"><name>name {i}</name><tags><tag>a</tag><tag>b</tag></tags></row>"
        ));
    }
    xml.push_str("</table>");
    from_xml_str(&xml).map(|doc| doc.root).unwrap_or_default()
}

fn bench_to_json(c: &mut Criterion) {
    let root = table(500);
    c.bench_function("junlib_element_to_json", |b| {
        b.iter(|| element_to_json(black_box(&root)))
    });
    c.bench_function("junlib_element_to_structured", |b| {
        b.iter(|| element_to_structured(black_box(&root)))
    });
}

fn bench_from_json(c: &mut Criterion) {
    let root = table(500);
    if let Ok(value) = element_to_json(&root) {
        c.bench_function("junlib_json_to_element", |b| {
            b.iter(|| json_to_element(black_box(&value), "table"))
        });
    }
}

fn bench_schema(c: &mut Criterion) {
    let root = table(500);
    c.bench_function("junlib_schema_first_item", |b| {
        b.iter(|| derive_schema(SchemaSource::Element(black_box(&root)), &SchemaOptions::default()))
    });
    c.bench_function("junlib_schema_merged", |b| {
        b.iter(|| derive_schema(SchemaSource::Element(black_box(&root)), &SchemaOptions::merged()))
    });
}

criterion_group!(benches, bench_to_json, bench_from_json, bench_schema);
criterion_main!(benches);
