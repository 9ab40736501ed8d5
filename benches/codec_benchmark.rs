// SPDX-License-Identifier: MIT
//! Benchmark comparing encoding with and without a shared initial vocabulary

use binary_infoset::{
    Attribute, CharacterContent, Codec, DocumentHeader, InfosetEvent, InitialVocabulary,
    QualifiedName, VocabularyDefinition,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const VOCABULARY_URI: &str = "urn:bench:measurements";

fn create_test_events(external_vocabulary: Option<&str>) -> Vec<InfosetEvent> {
    let header = DocumentHeader {
        external_vocabulary: external_vocabulary.map(str::to_string),
        ..Default::default()
    };
    let mut events = vec![
        InfosetEvent::StartDocument(header),
        InfosetEvent::start(QualifiedName::local("measurements")),
    ];

    // 2000 rows with repeated names, a handful of distinct units and typed values
    for i in 0..2000 {
        events.push(InfosetEvent::StartElement {
            name: QualifiedName::local("sample"),
            namespaces: Vec::new(),
            attributes: vec![
                Attribute::new(QualifiedName::local("unit"), ["mV", "mA", "C"][i % 3]),
                Attribute::new(QualifiedName::local("seq"), i.to_string()),
            ],
        });
        events.push(InfosetEvent::Characters(CharacterContent::Restricted {
            alphabet: 0,
            text: format!("{}.{}", i * 7, i % 10),
        }));
        events.push(InfosetEvent::EndElement);
    }

    events.push(InfosetEvent::EndElement);
    events.push(InfosetEvent::EndDocument);
    events
}

fn shared_codec() -> Codec {
    let vocabulary = InitialVocabulary::shared(VocabularyDefinition {
        external_uri: Some(VOCABULARY_URI.to_string()),
        local_names: vec!["measurements".into(), "sample".into(), "unit".into(), "seq".into()],
        element_names: vec![
            QualifiedName::local("measurements"),
            QualifiedName::local("sample"),
        ],
        attribute_names: vec![QualifiedName::local("unit"), QualifiedName::local("seq")],
        ..Default::default()
    })
    .unwrap();
    Codec::builder().initial_vocabulary(vocabulary).build().unwrap()
}

fn benchmark_encode(c: &mut Criterion) {
    let codec = Codec::default();
    let events = create_test_events(None);

    c.bench_function("encode", |b| {
        b.iter(|| {
            let _result = codec.encode(black_box(&events)).unwrap();
        })
    });
}

fn benchmark_encode_with_vocabulary(c: &mut Criterion) {
    let codec = shared_codec();
    let events = create_test_events(Some(VOCABULARY_URI));

    c.bench_function("encode_with_vocabulary", |b| {
        b.iter(|| {
            let _result = codec.encode(black_box(&events)).unwrap();
        })
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let codec = Codec::default();
    let data = codec.encode(&create_test_events(None)).unwrap();

    c.bench_function("decode", |b| {
        b.iter(|| {
            let _events = codec.decode(black_box(&data)).unwrap();
        })
    });
}

fn benchmark_decode_with_vocabulary(c: &mut Criterion) {
    let codec = shared_codec();
    let data = codec.encode(&create_test_events(Some(VOCABULARY_URI))).unwrap();

    c.bench_function("decode_with_vocabulary", |b| {
        b.iter(|| {
            let _events = codec.decode(black_box(&data)).unwrap();
        })
    });
}

fn benchmark_size_comparison(c: &mut Criterion) {
    let plain = Codec::default()
        .encode(&create_test_events(None))
        .unwrap();
    let shared = shared_codec()
        .encode(&create_test_events(Some(VOCABULARY_URI)))
        .unwrap();

    println!("\n=== Size Comparison ===");
    println!("Without vocabulary: {} bytes", plain.len());
    println!("With vocabulary:    {} bytes", shared.len());
    println!(
        "Saved:              {} bytes",
        plain.len() as i64 - shared.len() as i64
    );

    c.bench_function("size_comparison", |b| b.iter(|| black_box(plain.len())));
}

criterion_group!(
    benches,
    benchmark_encode,
    benchmark_encode_with_vocabulary,
    benchmark_decode,
    benchmark_decode_with_vocabulary,
    benchmark_size_comparison
);
criterion_main!(benches);
