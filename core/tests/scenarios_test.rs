use std::sync::Arc;

use rsidx_core::exceptions::WordExceptionLearner;
use rsidx_core::file_kind::FileKind;
use rsidx_core::index::{DeclarationText, IdentifierIndex};
use rsidx_core::lexer::LexedDocument;
use rsidx_core::matching::MatchTypeId;
use rsidx_core::{FileId, IndexSession, LineCol, Location, TextEdit};

fn session_with(files: &[(&str, &str)]) -> IndexSession {
    let mut session = IndexSession::default();
    for (name, text) in files {
        assert!(session.load_file(FileId::new(*name), text));
    }
    session.rebuild_all();
    session
}

#[test]
fn proc_header_declares_proc_parameters_and_return_type() {
    let mut session = session_with(&[("a.rs2", "[proc,foo](int $x)(obj)\nreturn(coins);")]);
    let a = FileId::new("a.rs2");

    let line = session.document(&a).unwrap().line(0).unwrap().clone();
    let words: Vec<&str> = line.tokens.iter().map(|w| w.value.as_ref()).collect();
    assert_eq!(&words[..4], &["proc", "foo", "int", "x"]);
    let x = line.tokens.iter().find(|w| w.value.as_ref() == "x").unwrap();
    assert_eq!(x.paren_depth, 1);

    let foo = session.match_at(&a, 0, 6).unwrap();
    assert_eq!(foo.kind, MatchTypeId::Proc);
    assert!(foo.declaration);

    let active = session.active_index().unwrap();
    let var = active.local_variable(0, "x").unwrap();
    assert_eq!(var.type_keyword.as_ref(), "int");
    assert!(var.parameter);
    assert_eq!(active.block_at(1).unwrap().returns, vec![Arc::<str>::from("obj")]);
}

#[test]
fn forward_reference_resolves_after_both_passes() {
    let session = session_with(&[
        ("0_caller.rs2", "[proc,caller]\n~foo(coins);"),
        ("z_decl.rs2", "[proc,foo](obj $item)"),
    ]);
    let foo = session.identifiers().get("foo", MatchTypeId::Proc).unwrap();
    assert_eq!(foo.declaration, Some(Location::new(FileId::new("z_decl.rs2"), 0, 6)));
    assert_eq!(foo.reference_locations(), vec![Location::new(FileId::new("0_caller.rs2"), 1, 1)]);
    assert_eq!(
        session.identifiers().references("coins", MatchTypeId::Obj),
        vec![Location::new(FileId::new("0_caller.rs2"), 1, 5)]
    );
}

#[test]
fn edit_inside_block_comment_stops_at_matching_end_state() {
    let mut lines: Vec<String> = (0..10).map(|i| format!("mes(\"{i}\");")).collect();
    lines.extend(["/* a", "b", "c", "d", "e */"].map(String::from));
    lines.extend((15..20).map(|i| format!("~p{i}(coins);")));
    let text = lines.join("\n");

    let exceptions = WordExceptionLearner::new();
    let mut doc = LexedDocument::new(FileId::new("a.rs2"), FileKind::Rs2, &text, &exceptions);
    let before = doc.lines().to_vec();
    let report = doc.apply_edit(&TextEdit::insert(LineCol::new(10, 4), "x"), &exceptions);
    assert_eq!(report.first_line, 10);
    assert!(report.last_line <= 14, "{report:?}");
    assert_eq!(&doc.lines()[15..], &before[15..]);

    let fresh = LexedDocument::new(FileId::new("a.rs2"), FileKind::Rs2, &doc.text().to_string(), &exceptions);
    assert_eq!(doc.lines(), fresh.lines());
}

#[test]
fn clearing_a_file_keeps_foreign_references() {
    let (a, b) = (FileId::new("a.rs2"), FileId::new("b.rs2"));
    let mut index = IdentifierIndex::new();
    index.put_declaration(
        "bar",
        MatchTypeId::Proc,
        Location::new(a.clone(), 0, 6),
        &DeclarationText::from_line("[proc,bar]"),
    );
    index.put_reference("bar", MatchTypeId::Proc, &a, 3, 1);
    index.put_reference("bar", MatchTypeId::Proc, &b, 7, 1);

    index.clear_file(&a);
    let bar = index.get("bar", MatchTypeId::Proc).unwrap();
    assert!(bar.declaration.is_none());
    assert_eq!(bar.reference_locations(), vec![Location::new(b.clone(), 7, 1)]);

    index.clear_file(&b);
    assert!(index.get("bar", MatchTypeId::Proc).is_none());
}

#[test]
fn local_variables_do_not_leak_between_blocks() {
    let text = "[proc,one]\ndef_int $count = 0;\nmes(\"a\");\n[proc,two]\ndef_int $count = 1;\ndef_int $other = 2;";
    let mut session = session_with(&[("a.rs2", text)]);
    let a = FileId::new("a.rs2");
    let names = session.local_variable_names(&a, 2);
    assert_eq!(names, vec![Arc::<str>::from("count")]);
    assert_eq!(session.definition(&a, 1, 9), Some(Location::new(a.clone(), 1, 9)));
    assert_eq!(session.active_index().unwrap().local_variable(2, "count").unwrap().declared_at, LineCol::new(1, 9));
}

#[test]
fn incremental_edits_match_a_full_rebuild() {
    let files = [
        ("a.rs2", "[proc,give](obj $item)\n~take($item);\n"),
        ("b.rs2", "[proc,take](obj $item)\nmes(\"x\");\n"),
        ("items.obj", "[coins]\n[bones]\n"),
    ];
    let mut edited = session_with(&files);
    edited
        .apply_edits(
            &FileId::new("a.rs2"),
            &[
                TextEdit::insert(LineCol::new(2, 0), "~take(coins);\n"),
                TextEdit::new(LineCol::new(0, 6), LineCol::new(0, 10), "hand"),
            ],
        )
        .unwrap();

    let fresh = session_with(&[
        ("a.rs2", "[proc,hand](obj $item)\n~take($item);\n~take(coins);\n"),
        files[1],
        files[2],
    ]);
    let summary = |s: &IndexSession| {
        let mut out: Vec<(String, MatchTypeId, Option<Location>, Vec<Location>)> = s
            .identifiers()
            .iter()
            .map(|i| (i.name.to_string(), i.kind, i.declaration.clone(), i.reference_locations()))
            .collect();
        out.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
        out
    };
    assert_eq!(summary(&edited), summary(&fresh));
    assert_eq!(edited.export_json().unwrap(), fresh.export_json().unwrap());
}
