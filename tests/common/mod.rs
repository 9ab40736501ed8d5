// SPDX-License-Identifier: MIT
//! Shared test fixtures
#![allow(dead_code)]

use std::sync::{Arc, Once};

use binary_infoset::{
    Attribute, CharacterContent, Codec, DocumentHeader, InfosetEvent, InitialVocabulary,
    NamespaceDeclaration, QualifiedName, VocabularyDefinition,
};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub const ORDERS_URI: &str = "urn:example:orders";

/// Vocabulary shared by the order documents
pub fn orders_vocabulary() -> Arc<InitialVocabulary> {
    InitialVocabulary::shared(VocabularyDefinition {
        external_uri: Some(ORDERS_URI.to_string()),
        local_names: vec!["order".into(), "line".into(), "sku".into()],
        element_names: vec![QualifiedName::local("order"), QualifiedName::local("line")],
        attribute_names: vec![QualifiedName::local("sku")],
        ..Default::default()
    })
    .unwrap()
}

/// Complete event list around `body`
pub fn document(body: Vec<InfosetEvent>) -> Vec<InfosetEvent> {
    let mut events = vec![InfosetEvent::StartDocument(DocumentHeader::default())];
    events.extend(body);
    events.push(InfosetEvent::EndDocument);
    events
}

/// A catalogue with namespaces, attributes, repeated names and mixed content
pub fn catalogue() -> Vec<InfosetEvent> {
    let book = |title: &str, year: &str| {
        vec![
            InfosetEvent::StartElement {
                name: QualifiedName::new("c", "urn:catalogue", "book"),
                namespaces: Vec::new(),
                attributes: vec![
                    Attribute::new(QualifiedName::local("year"), year),
                    Attribute::new(QualifiedName::new("xml", "http://www.w3.org/XML/1998/namespace", "lang"), "en"),
                ],
            },
            InfosetEvent::characters(title),
            InfosetEvent::EndElement,
        ]
    };

    let mut body = vec![
        InfosetEvent::Comment(" generated ".into()),
        InfosetEvent::StartElement {
            name: QualifiedName::new("c", "urn:catalogue", "catalogue"),
            namespaces: vec![NamespaceDeclaration::new("c", "urn:catalogue")],
            attributes: Vec::new(),
        },
        InfosetEvent::ProcessingInstruction {
            target: "render".into(),
            data: "compact".into(),
        },
    ];
    body.extend(book("Dune", "1965"));
    body.extend(book("Emma", "1815"));
    body.extend(book("Dune", "1965"));
    body.push(InfosetEvent::Characters(CharacterContent::text("\n")));
    body.push(InfosetEvent::EndElement);
    document(body)
}

pub fn round_trip(codec: &Codec, events: &[InfosetEvent]) -> Vec<InfosetEvent> {
    let data = codec.encode(events).unwrap();
    codec.decode(&data).unwrap()
}
