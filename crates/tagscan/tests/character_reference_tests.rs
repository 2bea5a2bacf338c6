//! Integration tests for numeric and named character references.

use std::collections::HashMap;

use tagscan::{AttributeMap, Event, EventCollector, SyntaxError, Tokenizer, tokenize};

fn text(s: &str) -> Event {
    Event::Text(s.to_owned())
}

fn start_tag(name: &str) -> Event {
    Event::Tag {
        name: name.to_owned(),
        attributes: AttributeMap::new(),
        end_tag: false,
        empty_tag: false,
    }
}

fn error(s: &str, kind: SyntaxError) -> Event {
    Event::Error {
        text: s.to_owned(),
        error: kind,
    }
}

/// Tokenize with a sink that answers unknown references from `substitutions`.
fn expand(input: &str, substitutions: &[(&str, &str)]) -> Vec<Event> {
    let substitutions: HashMap<String, String> = substitutions
        .iter()
        .map(|&(name, value)| (name.to_owned(), value.to_owned()))
        .collect();
    let mut tokenizer = Tokenizer::from_text(input);
    let mut sink = EventCollector::with_substitutions(substitutions);
    tokenizer.parse(&mut sink).unwrap();
    sink.into_events()
}

// =============================================================================
// Numeric references
// =============================================================================

#[test]
fn test_decimal_reference() {
    assert_eq!(tokenize("&#65;"), vec![text("A")]);
}

#[test]
fn test_decimal_reference_without_semicolon() {
    assert_eq!(tokenize("&#65x"), vec![text("Ax")]);
}

#[test]
fn test_invalid_code_points_become_replacement() {
    assert_eq!(tokenize("&#0;"), vec![text("\u{FFFD}")]);
    assert_eq!(tokenize("&#55296;"), vec![text("\u{FFFD}")]);
    assert_eq!(tokenize("&#99999999999999;"), vec![text("\u{FFFD}")]);
}

#[test]
fn test_numeric_reference_without_digits() {
    assert_eq!(
        tokenize("a&#;b"),
        vec![
            text("a"),
            error("&#;", SyntaxError::ExpectingDigit),
            text("b"),
        ]
    );
}

#[test]
fn test_hex_reference_is_not_recognized() {
    assert_eq!(
        tokenize("&#x41;"),
        vec![error("&#", SyntaxError::ExpectingDigit), text("x41;")]
    );
}

// =============================================================================
// Named references
// =============================================================================

#[test]
fn test_named_references_join_surrounding_text() {
    assert_eq!(tokenize("&lt;b&gt;"), vec![text("<b>")]);
    assert_eq!(tokenize("AT&amp;T"), vec![text("AT&T")]);
}

#[test]
fn test_latin1_letters() {
    assert_eq!(tokenize("&eacute;t&eacute;"), vec![text("été")]);
}

#[test]
fn test_first_table_hit_wins() {
    assert_eq!(tokenize("&ltx"), vec![text("<x")]);
    assert_eq!(tokenize("&copy2"), vec![text("©2")]);
}

#[test]
fn test_reference_at_end_of_input() {
    assert_eq!(tokenize("&amp"), vec![text("&")]);
}

#[test]
fn test_unknown_reference_is_dropped() {
    assert_eq!(tokenize("a&zzz;b"), vec![text("ab")]);
}

#[test]
fn test_unknown_reference_is_expanded_by_sink() {
    assert_eq!(
        expand("Hello &name;!", &[("name", "World")]),
        vec![text("Hello World!")]
    );
}

#[test]
fn test_expansion_without_semicolon_keeps_terminator() {
    assert_eq!(
        expand("&name rest", &[("name", "World")]),
        vec![text("World rest")]
    );
}

#[test]
fn test_expansion_is_inserted_verbatim() {
    assert_eq!(
        expand("&x;", &[("x", "&amp;<b>")]),
        vec![text("&amp;<b>")]
    );
}

#[test]
fn test_ampersand_before_non_letter() {
    assert_eq!(
        tokenize("a & b"),
        vec![
            text("a "),
            error("&", SyntaxError::ExpectingLetter),
            text(" b"),
        ]
    );
}

#[test]
fn test_ampersand_before_markup_is_reprocessed() {
    assert_eq!(
        tokenize("&<b>"),
        vec![error("&", SyntaxError::ExpectingLetter), start_tag("b")]
    );
}

#[test]
fn test_eof_inside_named_reference() {
    assert_eq!(
        tokenize("a &b"),
        vec![text("a "), error("&b", SyntaxError::UnexpectedEof)]
    );
}

#[test]
fn test_entity_table_is_built_lazily() {
    let mut tokenizer = Tokenizer::from_text("<b>plain</b>");
    let mut sink = EventCollector::new();
    tokenizer.parse(&mut sink).unwrap();
    assert!(tokenizer.entity_table().is_none());

    tokenizer.set_input_str("&amp;");
    tokenizer.parse(&mut sink).unwrap();
    let table = tokenizer.entity_table().expect("table should be built");
    assert!(table.contains("amp"));
}

// =============================================================================
// References inside attribute values
// =============================================================================

fn single_attribute(events: &[Event], name: &str) -> String {
    match events {
        [.., Event::Tag { attributes, .. }] => attributes
            .get(name)
            .unwrap_or_else(|| panic!("missing attribute {name}"))
            .to_owned(),
        other => panic!("Expected a trailing tag, got {other:?}"),
    }
}

#[test]
fn test_references_in_quoted_value() {
    let events = tokenize("<a title=\"x &amp; y &#33;\">");
    assert_eq!(events.len(), 1);
    assert_eq!(single_attribute(&events, "title"), "x & y !");
}

#[test]
fn test_references_in_unquoted_value() {
    let events = expand("<img alt=&name;>", &[("name", "logo")]);
    assert_eq!(single_attribute(&events, "alt"), "logo");
}

#[test]
fn test_error_in_value_does_not_break_tag() {
    let events = tokenize("x<a title=\"&#;\">");
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], text("x"));
    assert_eq!(events[1], error("&#;", SyntaxError::ExpectingDigit));
    assert_eq!(single_attribute(&events, "title"), "");
}

#[test]
fn test_eof_in_value_reference_is_reported_by_tag() {
    assert_eq!(
        tokenize("<a title=\"&am"),
        vec![error("<a title=\"&am", SyntaxError::UnexpectedEof)]
    );
}
