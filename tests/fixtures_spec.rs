use gedcom_reader::{
    Bom, CharacterSet, Dialect, ErrorCategory, GedcomError, GedcomReader, ParseMode, ParseOptions,
    Record, StructuralKind, TextCodec,
};
use std::path::PathBuf;

/// (file, mode, dialect, charset, codec, individuals, families)
type Fixture = (
    &'static str,
    ParseMode,
    Dialect,
    CharacterSet,
    TextCodec,
    usize,
    usize,
);

const FIXTURES: &[Fixture] = &[
    ("family_555.ged", ParseMode::Strict, Dialect::V555, CharacterSet::Utf8, TextCodec::Utf8, 3, 1),
    ("family_555.ged", ParseMode::Relaxed, Dialect::V555, CharacterSet::Utf8, TextCodec::Utf8, 3, 1),
    ("unicode_le_555.ged", ParseMode::Strict, Dialect::V555, CharacterSet::Unicode, TextCodec::Utf16Le, 1, 0),
    ("legacy_551.ged", ParseMode::Relaxed, Dialect::V551, CharacterSet::Ascii, TextCodec::Ascii, 1, 0),
    ("legacy_40.ged", ParseMode::Relaxed, Dialect::V40, CharacterSet::Ansel, TextCodec::Latin1, 1, 0),
    ("modern_70.ged", ParseMode::Relaxed, Dialect::V70, CharacterSet::Utf8, TextCodec::Utf8, 1, 0),
];

/// Fixtures that strict mode must reject, with the expected error category.
const STRICT_FAILURES: &[(&str, ErrorCategory)] = &[
    ("legacy_551.ged", ErrorCategory::Dialect),
    ("legacy_40.ged", ErrorCategory::Dialect),
    ("modern_70.ged", ErrorCategory::Dialect),
    ("damaged_555.ged", ErrorCategory::Structural),
];

fn fixture_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    p.push(name);
    p
}

fn options(mode: ParseMode) -> ParseOptions {
    match mode {
        ParseMode::Strict => ParseOptions::strict(),
        ParseMode::Relaxed => ParseOptions::relaxed(),
    }
}

/// Every record sits exactly one level below its parent.
fn assert_levels(record: &Record) {
    for child in record.children() {
        assert_eq!(
            child.level(),
            record.level() + 1,
            "level mismatch under {} at line {}",
            record.tag(),
            child.line()
        );
        assert_levels(child);
    }
}

#[test]
fn fixtures_parse_with_expected_metadata() {
    for (name, mode, dialect, charset, codec, individuals, families) in FIXTURES {
        let reader = GedcomReader::open(fixture_path(name), options(*mode))
            .unwrap_or_else(|e| panic!("failed to open {} ({:?}): {}", name, mode, e));

        assert_eq!(reader.dialect(), *dialect, "dialect mismatch for {}", name);
        assert_eq!(reader.charset(), *charset, "charset mismatch for {}", name);
        assert_eq!(reader.codec(), *codec, "codec mismatch for {}", name);
        assert_eq!(reader.individuals().count(), *individuals, "individual count for {}", name);
        assert_eq!(reader.families().count(), *families, "family count for {}", name);
        assert_eq!(reader.source(), Some(fixture_path(name).as_path()));

        let header = reader.header().unwrap_or_else(|| panic!("no header in {}", name));
        assert_eq!(header.tag(), "HEAD");
        assert_eq!(reader.roots().first().map(Record::tag), Some("HEAD"));
        assert_eq!(reader.roots().last().map(Record::tag), Some("TRLR"));

        for root in reader.roots() {
            assert_eq!(root.level(), 0, "non-zero root level in {}", name);
            assert_levels(root);
        }
    }
}

#[test]
fn strict_mode_rejects_non_conforming_fixtures() {
    for (name, category) in STRICT_FAILURES {
        let err = GedcomReader::open(fixture_path(name), ParseOptions::strict())
            .err()
            .unwrap_or_else(|| panic!("{} unexpectedly passed strict validation", name));
        assert_eq!(err.category(), *category, "wrong category for {}: {}", name, err);
    }
}

#[test]
fn family_fixture_content() {
    let reader = GedcomReader::open(fixture_path("family_555.ged"), ParseOptions::strict()).expect("open family");
    assert_eq!(reader.bom(), Bom::Utf8);
    assert!(reader.recoveries().is_empty());

    let john = reader.get_individual("@I1@").expect("@I1@");
    assert_eq!(john.child_value("NAME"), Some("John /Doe/"));
    assert_eq!(john.line(), 9);

    let birth = john.child("BIRT").expect("birth event");
    assert_eq!(birth.child_value("DATE"), Some("1 JAN 1900"));
    assert_eq!(birth.child_value("PLAC"), Some("Springfield"));

    // CRLF terminators never leak into values.
    assert_eq!(
        john.child_value("NOTE"),
        Some("Born in the old farmhouse\nMoved to town in 1920")
    );

    let names: Vec<&str> = reader
        .individuals()
        .filter_map(|r| r.child_value("NAME"))
        .collect();
    assert_eq!(names, ["John /Doe/", "Jane /Roe/", "Jim /Doe/"]);

    let source = reader.get("@S1@", "SOUR").expect("source record");
    assert_eq!(source.child_value("TITL"), Some("Parish register"));
}

#[test]
fn cross_references_resolve_through_the_index() {
    let reader = GedcomReader::open(fixture_path("family_555.ged"), ParseOptions::strict()).expect("open family");

    let john = reader.get_individual("@I1@").expect("@I1@");
    let fams = john.child("FAMS").expect("FAMS");
    assert_eq!(fams.pointer(), Some("@F1@"));
    let family = reader.resolve_pointer(fams).expect("family via pointer");
    assert_eq!(family.xref(), Some("@F1@"));
    assert_eq!(reader.get_family("@F1@"), Some(family));

    let children: Vec<&Record> = family.children_with_tag("CHIL").collect();
    assert_eq!(children.len(), 2);
    assert_eq!(
        reader.resolve_pointer(children[0]).and_then(|r| r.child_value("NAME")),
        Some("Jim /Doe/")
    );
    // @I9@ is never defined.
    assert_eq!(reader.resolve_pointer(children[1]), None);

    // Tag filter on lookup.
    assert!(reader.get("@F1@", "INDI").is_none());
    assert!(reader.get_individual("@F1@").is_none());
    assert!(reader.get_individual("@nope@").is_none());
    assert!(reader.resolve("@S1@").is_some());
}

#[test]
fn unicode_fixture_decodes_utf16() {
    let reader = GedcomReader::open(fixture_path("unicode_le_555.ged"), ParseOptions::strict()).expect("open utf-16");
    assert_eq!(reader.bom(), Bom::Utf16Le);
    let person = reader.get_individual("@I1@").expect("@I1@");
    assert_eq!(person.child_value("NAME"), Some("张 /伟/"));
}

#[test]
fn legacy_fixtures_decode_their_declared_charsets() {
    let ansel = GedcomReader::open(fixture_path("legacy_40.ged"), ParseOptions::relaxed()).expect("open 4.0");
    assert_eq!(
        ansel.get_individual("@I1@").and_then(|r| r.child_value("NAME")),
        Some("René /Dupont/")
    );

    let legacy = GedcomReader::open(fixture_path("legacy_551.ged"), ParseOptions::relaxed()).expect("open 5.5.1");
    let note = legacy.header().and_then(|h| h.child_value("NOTE"));
    assert_eq!(note, Some("Exported from an old program\nsecond line of the note"));

    let modern = GedcomReader::open(fixture_path("modern_70.ged"), ParseOptions::relaxed()).expect("open 7.0");
    let person = modern.get_individual("@I1@").expect("@I1@");
    assert_eq!(person.child_value("NAME"), Some("Zoë /Müller/"));
    assert_eq!(person.child_value("NOTE").map(str::len), Some(300));
}

#[test]
fn damaged_fixture_strict_stops_at_first_violation() {
    let err = GedcomReader::open(fixture_path("damaged_555.ged"), ParseOptions::strict()).unwrap_err();
    assert_eq!(err.line(), Some(9));
    assert!(matches!(
        err,
        GedcomError::Structural {
            kind: StructuralKind::SkippedLevel { from: Some(1), to: 3 },
            ..
        }
    ));
    assert!(err.to_string().contains("Skipped level"), "{}", err);
}

#[test]
fn damaged_fixture_relaxed_recovers_locally() {
    let reader = GedcomReader::open(fixture_path("damaged_555.ged"), ParseOptions::relaxed()).expect("relaxed open");

    let recovered: Vec<(usize, &StructuralKind)> = reader
        .recoveries()
        .iter()
        .map(|r| (r.line, &r.kind))
        .collect();
    assert_eq!(
        recovered,
        vec![
            (9, &StructuralKind::SkippedLevel { from: Some(1), to: 3 }),
            (11, &StructuralKind::EmptyLine),
            (12, &StructuralKind::LeadingWhitespace),
            (13, &StructuralKind::Malformed("this is not gedcom".to_string())),
            (14, &StructuralKind::DuplicateXref("@I1@".to_string())),
        ]
    );

    // Keep-first on duplicate identifiers; the later record stays in document order.
    let roots: Vec<&str> = reader.roots().iter().map(Record::tag).collect();
    assert_eq!(roots, ["HEAD", "INDI", "INDI", "TRLR"]);
    let first = reader.get_individual("@I1@").expect("@I1@");
    assert_eq!(first.child_value("NAME"), Some("John /Doe/"));
    assert_eq!(reader.individuals().count(), 2);

    let tags: Vec<&str> = first.children().iter().map(Record::tag).collect();
    assert_eq!(tags, ["NAME", "BIRT", "SEX", "OCCU"]);
    assert!(first.child("BIRT").expect("BIRT").children().is_empty());
    assert_eq!(first.child_value("OCCU"), Some("Farmer"));
}

#[test]
fn reparsing_is_idempotent() {
    for (name, mode, ..) in FIXTURES {
        let a = GedcomReader::open(fixture_path(name), options(*mode)).expect("first parse");
        let b = GedcomReader::open(fixture_path(name), options(*mode)).expect("second parse");
        assert_eq!(a.roots(), b.roots(), "trees differ for {}", name);
        assert_eq!(a.dialect(), b.dialect());
        assert_eq!(a.charset(), b.charset());
        assert_eq!(a.recoveries(), b.recoveries());
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = GedcomReader::open(fixture_path("does_not_exist.ged"), ParseOptions::strict()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
}
