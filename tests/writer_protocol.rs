// SPDX-License-Identifier: MIT
//! Call-sequence enforcement of the low-level writer

mod common;

use binary_infoset::header::integer::MAX_INDEX;
use binary_infoset::{
    AlgorithmValue, Attribute, BuiltinAlgorithm, Codec, CodecConfig, CodecError, DocumentHeader,
    InfosetEvent, LowLevelWriter, NameKind, OpaqueKind, ProtocolError, QualifiedName,
    VocabularyError,
};
use common::init_tracing;

fn started(codec: &Codec) -> LowLevelWriter<'_, Vec<u8>> {
    init_tracing();
    let mut writer = codec.writer(Vec::new());
    writer.start_document(&DocumentHeader::default()).unwrap();
    writer.initiate_low_level_writing().unwrap();
    writer
}

fn is_protocol_error<T>(result: Result<T, CodecError>) -> bool {
    matches!(result, Err(CodecError::Protocol(_)))
}

#[test]
fn test_end_element_with_no_open_element() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    assert!(is_protocol_error(writer.end_element()));
}

#[test]
fn test_attribute_after_end_start_element() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("a")).unwrap();
    writer.end_start_element().unwrap();

    assert!(is_protocol_error(writer.start_attributes()));
    assert!(is_protocol_error(
        writer.attribute(&QualifiedName::local("late"))
    ));
}

#[test]
fn test_next_element_index_is_consecutive() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    let first = writer.get_next_element_index();
    assert_eq!(writer.get_next_element_index(), first + 1);
    assert_eq!(writer.get_next_element_index(), first + 2);
}

#[test]
fn test_low_level_writing_must_be_initiated() {
    let codec = Codec::default();
    let mut writer = codec.writer(Vec::new());
    writer.start_document(&DocumentHeader::default()).unwrap();
    assert!(is_protocol_error(writer.termination_and_mark()));
}

#[test]
fn test_start_document_only_once() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    assert!(is_protocol_error(
        writer.start_document(&DocumentHeader::default())
    ));
}

#[test]
fn test_name_required_after_mark() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    assert!(is_protocol_error(writer.end_start_element()));
}

#[test]
fn test_namespaces_precede_element_name() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("a")).unwrap();
    assert!(is_protocol_error(writer.start_namespaces()));
}

#[test]
fn test_attribute_needs_exactly_one_value() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("a")).unwrap();
    writer.start_attributes().unwrap();
    writer.attribute(&QualifiedName::local("b")).unwrap();
    assert!(is_protocol_error(writer.end_start_element()));

    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("a")).unwrap();
    writer.start_attributes().unwrap();
    writer.attribute(&QualifiedName::local("b")).unwrap();
    writer.attribute_value("1").unwrap();
    assert!(is_protocol_error(writer.attribute_value("2")));
}

#[test]
fn test_poisoned_writer_rejects_everything() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    assert!(writer.end_element().is_err());
    assert!(writer.is_poisoned());

    assert!(matches!(
        writer.termination_and_mark(),
        Err(CodecError::Protocol(ProtocolError::Poisoned))
    ));
    assert!(matches!(
        writer.end_document(),
        Err(CodecError::Protocol(ProtocolError::Poisoned))
    ));
}

#[test]
fn test_unknown_algorithm_leaves_writer_usable() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("a")).unwrap();
    writer.end_start_element().unwrap();

    let err = writer
        .typed_content(50, &AlgorithmValue::Ints(vec![1]))
        .unwrap_err();
    assert!(err.is_recoverable());
    assert!(!writer.is_poisoned());

    // pre-encoded octets are written without consulting the registry
    writer
        .encoded_content(OpaqueKind::Algorithm, 50, &[0, 0, 0, 1])
        .unwrap();
    writer.end_element().unwrap();
    writer.end_document().unwrap();
}

#[test]
fn test_duplicate_literal_name_rejected() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("a")).unwrap();
    writer.end_start_element().unwrap();

    let local = writer.get_local_name_index("a").unwrap();
    writer.termination_and_mark().unwrap();
    let err = writer
        .start_name_literal(NameKind::Element, "", "", local)
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Vocabulary(VocabularyError::DuplicateEntry { .. })
    ));
    assert!(err.is_recoverable());

    writer.start_element_indexed(0).unwrap();
    writer.end_start_element().unwrap();
    writer.end_element().unwrap();
    writer.end_element().unwrap();
    writer.end_document().unwrap();
}

#[test]
fn test_precomputed_indices_match_decoder() {
    let codec = Codec::default();
    let mut writer = started(&codec);

    let element = writer.get_next_element_index();
    let attribute = writer.get_next_attribute_index();
    let local = writer.get_next_local_name_index();

    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("row")).unwrap();
    writer.start_attributes().unwrap();
    writer.attribute(&QualifiedName::local("id")).unwrap();
    writer.attribute_value("1").unwrap();
    writer.end_start_element().unwrap();
    writer.end_element().unwrap();

    assert_eq!(writer.get_local_name_index("row"), Some(local));

    writer.termination_and_mark().unwrap();
    writer.start_element_indexed(element).unwrap();
    writer.start_attributes().unwrap();
    writer.attribute_indexed(attribute).unwrap();
    writer.attribute_value("2").unwrap();
    writer.end_start_element().unwrap();
    writer.end_element().unwrap();
    let data = writer.end_document().unwrap();

    let events = codec.decode(&data).unwrap();
    assert_eq!(
        events[3],
        InfosetEvent::StartElement {
            name: QualifiedName::local("row"),
            namespaces: Vec::new(),
            attributes: vec![Attribute::new(QualifiedName::local("id"), "2")],
        }
    );
}

#[test]
fn test_writes_to_io_sink() {
    let codec = Codec::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.bin");
    let file = std::fs::File::create(&path).unwrap();

    let mut writer = codec.writer(std::io::BufWriter::new(file));
    writer.start_document(&DocumentHeader::default()).unwrap();
    writer.initiate_low_level_writing().unwrap();
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("root")).unwrap();
    writer.end_start_element().unwrap();
    for i in 0..5000 {
        writer.text(&format!("chunk {}", i)).unwrap();
    }
    writer.end_element().unwrap();
    drop(writer.end_document().unwrap());

    let data = std::fs::read(&path).unwrap();
    assert_eq!(codec.decode(&data).unwrap().len(), 5004);
}

#[test]
fn test_empty_typed_and_restricted_values() {
    let codec = Codec::default();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("a")).unwrap();
    writer.start_attributes().unwrap();
    writer.attribute(&QualifiedName::local("n")).unwrap();
    writer
        .attribute_value_typed(BuiltinAlgorithm::Int.id(), &AlgorithmValue::Ints(vec![]))
        .unwrap();
    writer.attribute(&QualifiedName::local("r")).unwrap();
    writer.attribute_value_restricted(0, "").unwrap();
    writer.end_start_element().unwrap();
    writer
        .typed_content(BuiltinAlgorithm::Int.id(), &AlgorithmValue::Ints(vec![]))
        .unwrap();
    writer
        .typed_content(BuiltinAlgorithm::Cdata.id(), &AlgorithmValue::Text(String::new()))
        .unwrap();
    writer.end_element().unwrap();
    let data = writer.end_document().unwrap();

    let events = codec.decode(&data).unwrap();
    assert_eq!(
        events,
        vec![
            InfosetEvent::StartDocument(Default::default()),
            InfosetEvent::StartElement {
                name: QualifiedName::local("a"),
                namespaces: Vec::new(),
                attributes: vec![
                    Attribute::new(QualifiedName::local("n"), ""),
                    Attribute::new(QualifiedName::local("r"), ""),
                ],
            },
            InfosetEvent::EndElement,
            InfosetEvent::EndDocument,
        ]
    );
}

#[test]
fn test_chunk_table_stops_growing_at_index_cap() {
    let config = CodecConfig {
        chunk_memory_limit: usize::MAX,
        ..CodecConfig::default()
    };
    let codec = Codec::builder().config(config).build().unwrap();
    let mut writer = started(&codec);
    writer.termination_and_mark().unwrap();
    writer.start_element(&QualifiedName::local("root")).unwrap();
    writer.end_start_element().unwrap();

    for i in 0..=MAX_INDEX {
        writer.text(&format!("c{}", i)).unwrap();
    }
    assert_eq!(writer.vocabulary().character_content_chunks.len(), MAX_INDEX);

    // past the cap a repeat goes out as a literal again
    let overflow = format!("c{}", MAX_INDEX);
    writer.text(&overflow).unwrap();
    writer.text("c0").unwrap();
    writer.end_element().unwrap();
    let data = writer.end_document().unwrap();

    let events = codec.decode(&data).unwrap();
    assert_eq!(events.len(), MAX_INDEX + 7);
    let tail = &events[events.len() - 5..events.len() - 2];
    assert_eq!(
        tail,
        &[
            InfosetEvent::characters(overflow.as_str()),
            InfosetEvent::characters(overflow.as_str()),
            InfosetEvent::characters("c0"),
        ]
    );
}
