#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::index::DeclarationDetail;
    use crate::matching::MatchTypeId;
    use crate::session::IndexSession;
    use crate::text::{FileId, LineCol, Location, TextEdit};

    fn session_with(files: &[(&str, &str)]) -> IndexSession {
        let mut session = IndexSession::default();
        for (name, text) in files {
            assert!(session.load_file(FileId::new(*name), text), "{name} not loaded");
        }
        session.rebuild_all();
        session
    }

    fn loc(file: &str, line: u32, column: u32) -> Location {
        Location::new(FileId::new(file), line, column)
    }

    #[test]
    fn test_proc_header_queries() {
        let mut session = session_with(&[("a.rs2", "[proc,foo](int $x)(obj)\nreturn(coins);")]);
        let a = FileId::new("a.rs2");
        let foo = session.match_at(&a, 0, 7).unwrap();
        assert_eq!(foo.kind, MatchTypeId::Proc);
        assert!(foo.declaration);
        assert_eq!(session.active_file(), Some(&a));

        assert_eq!(session.definition(&a, 0, 16), Some(loc("a.rs2", 0, 16)));
        let names: Vec<Arc<str>> = session.local_variable_names(&a, 1);
        assert_eq!(names, vec![Arc::<str>::from("x")]);
    }

    #[test]
    fn test_cross_file_definition_and_references() {
        let mut session = session_with(&[
            ("a.rs2", "[proc,give](obj $item)\nmes(\"given\");"),
            ("b.rs2", "[opheld1,coins]\n~give(coins);\n~give(bones);"),
            ("items.obj", "[coins]\n[bones]"),
        ]);
        let a = FileId::new("a.rs2");
        let b = FileId::new("b.rs2");

        assert_eq!(session.definition(&b, 1, 1), Some(loc("a.rs2", 0, 6)));
        assert_eq!(session.definition(&b, 1, 7), Some(loc("items.obj", 0, 1)));
        assert_eq!(
            session.references(&a, 0, 7),
            vec![loc("b.rs2", 1, 1), loc("b.rs2", 2, 1)]
        );
        assert_eq!(
            session.references(&FileId::new("items.obj"), 0, 2),
            vec![loc("b.rs2", 0, 9), loc("b.rs2", 1, 6)]
        );
        assert_eq!(session.completions(MatchTypeId::Obj, "b"), vec!["bones".to_string()]);
        assert!(session.is_declared("give", MatchTypeId::Proc));
        assert!(session.unknown_references(&b).is_empty());
    }

    #[test]
    fn test_removing_a_declaration_keeps_foreign_references() {
        let mut session = session_with(&[
            ("a.rs2", "[proc,bar](obj $o)\n~bar(coins);"),
            ("b.rs2", "[proc,user]\n~bar(bones);"),
        ]);
        let a = FileId::new("a.rs2");
        let b = FileId::new("b.rs2");
        session.update_file(&a, "[proc,other]").unwrap();

        let bar = session.identifiers().get("bar", MatchTypeId::Proc).expect("stub remains");
        assert!(bar.declaration.is_none());
        assert_eq!(bar.reference_locations(), vec![loc("b.rs2", 1, 1)]);
        let unknown = session.unknown_references(&b);
        assert!(
            unknown
                .iter()
                .any(|u| u.message() == "unknown proc: bar" && u.position == LineCol::new(1, 1)),
            "{unknown:?}"
        );
    }

    #[test]
    fn test_duplicate_declaration_survives_edit_of_first() {
        let mut session = session_with(&[
            ("a.rs2", "[proc,foo]\nmes(\"a\");"),
            ("b.rs2", "[proc,foo]\nmes(\"b\");"),
            ("c.rs2", "[proc,user]\n~foo;"),
        ]);
        let c = FileId::new("c.rs2");
        assert_eq!(session.identifiers().declaration("foo", MatchTypeId::Proc), Some(&loc("a.rs2", 0, 6)));

        session.update_file(&FileId::new("a.rs2"), "[proc,bar]").unwrap();
        assert_eq!(session.identifiers().declaration("foo", MatchTypeId::Proc), Some(&loc("b.rs2", 0, 6)));
        assert!(session.unknown_references(&c).is_empty());

        session.update_file(&FileId::new("a.rs2"), "[proc,foo]").unwrap();
        assert_eq!(session.identifiers().declaration("foo", MatchTypeId::Proc), Some(&loc("a.rs2", 0, 6)));
    }

    #[test]
    fn test_reloading_unchanged_loc_keeps_index() {
        let a_text = "[l1]\nmodel=wall_8";
        let mut session = session_with(&[("a.loc", a_text), ("b.loc", "[l2]\nmodel=wall")]);
        assert!(session.identifiers().get("wall_8", MatchTypeId::Model).is_none());
        assert_eq!(
            session.identifiers().references("wall", MatchTypeId::Model),
            vec![loc("a.loc", 1, 6), loc("b.loc", 1, 6)]
        );

        let wall = session.match_at(&FileId::new("a.loc"), 1, 7).unwrap();
        assert_eq!(wall.name.as_ref(), "wall");
        assert_eq!(wall.suffix.as_deref(), Some("_8"));

        let before = session.export_json().unwrap();
        session.update_file(&FileId::new("a.loc"), a_text).unwrap();
        assert_eq!(session.export_json().unwrap(), before);
    }

    #[test]
    fn test_signature_change_rematches_callers() {
        let mut session = session_with(&[
            ("a.rs2", "[proc,foo](obj $o)"),
            ("b.rs2", "[proc,user]\n~foo(coins);"),
            ("items.obj", "[coins]"),
        ]);
        let a = FileId::new("a.rs2");
        assert_eq!(session.identifiers().references("coins", MatchTypeId::Obj), vec![loc("b.rs2", 1, 5)]);

        session.update_file(&a, "[proc,foo](int $o)").unwrap();
        assert!(session.identifiers().references("coins", MatchTypeId::Obj).is_empty());
        assert_eq!(session.identifiers().references("foo", MatchTypeId::Proc), vec![loc("b.rs2", 1, 1)]);

        session.update_file(&a, "[proc,foo](obj $o)").unwrap();
        assert_eq!(session.identifiers().references("coins", MatchTypeId::Obj), vec![loc("b.rs2", 1, 5)]);
    }

    #[test]
    fn test_local_variables_are_block_scoped() {
        let text = "[proc,one]\ndef_int $count = 1;\n$count = 2;\n[proc,two]\ndef_int $total = 0;\ndef_obj $count = coins;";
        let mut session = session_with(&[("a.rs2", text)]);
        let a = FileId::new("a.rs2");

        assert_eq!(session.local_variable_names(&a, 2), vec![Arc::<str>::from("count")]);
        assert_eq!(
            session.local_variable_names(&a, 5),
            vec![Arc::<str>::from("count"), Arc::<str>::from("total")]
        );
        assert_eq!(session.definition(&a, 2, 1), Some(loc("a.rs2", 1, 9)));
        assert_eq!(session.references(&a, 1, 9), vec![loc("a.rs2", 2, 1)]);
        let second = session.active_index().unwrap().local_variable(5, "count").unwrap();
        assert_eq!(second.type_keyword.as_ref(), "obj");
    }

    #[test]
    fn test_edits_rematch_the_file() {
        let mut session = session_with(&[("a.rs2", "[proc,foo]\nmes(\"x\");"), ("b.rs2", "[proc,b]\n~foo;")]);
        let a = FileId::new("a.rs2");
        let b = FileId::new("b.rs2");

        let reports = session
            .apply_edits(&a, &[TextEdit::new(LineCol::new(0, 6), LineCol::new(0, 9), "baz")])
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].first_line, 0);
        assert!(session.is_declared("baz", MatchTypeId::Proc));
        assert!(!session.is_declared("foo", MatchTypeId::Proc));
        assert_eq!(session.references(&b, 1, 1), vec![loc("b.rs2", 1, 1)]);
        assert_eq!(session.completions(MatchTypeId::Proc, "ba"), vec!["baz".to_string()]);

        session
            .apply_edits(&b, &[TextEdit::insert(LineCol::new(1, 5), "\n~baz;")])
            .unwrap();
        assert_eq!(session.identifiers().references("baz", MatchTypeId::Proc), vec![loc("b.rs2", 2, 1)]);
        assert!(session.apply_edits(&FileId::new("missing.rs2"), &[]).is_err());
    }

    #[test]
    fn test_new_exception_words_apply_after_rebuild() {
        let mut session = session_with(&[
            ("a.rs2", "[proc,x]\n~drink(potion(4));"),
            ("drink.rs2", "[proc,drink](obj $o)"),
            ("items.obj", "[coins]"),
        ]);
        let items = FileId::new("items.obj");
        session
            .apply_edits(&items, &[TextEdit::insert(LineCol::new(0, 7), "\n[potion(4)]")])
            .unwrap();
        assert!(session.exceptions().is_exception("potion(4)"));
        assert!(session.is_declared("potion(4)", MatchTypeId::Obj));

        session.rebuild_all();
        let span = session.match_at(&FileId::new("a.rs2"), 1, 8).unwrap();
        assert_eq!(span.word.as_ref(), "potion(4)");
        assert_eq!(span.kind, MatchTypeId::Obj);
    }

    #[test]
    fn test_interface_files_declare_their_stem() {
        let mut session = session_with(&[
            ("shop.if", "[title]\n[close]"),
            ("a.rs2", "[if_close,shop]\nmes(\"x\");"),
        ]);
        assert!(session.is_declared("shop", MatchTypeId::Interface));
        assert!(session.is_declared("shop:close", MatchTypeId::Component));
        assert_eq!(session.definition(&FileId::new("a.rs2"), 0, 10), Some(loc("shop.if", 0, 0)));
    }

    #[test]
    fn test_symbol_info() {
        let mut session = session_with(&[
            ("a.rs2", "// Gives an item.\n[proc,give](obj $item)(boolean)\nreturn(true);"),
            ("b.rs2", "[proc,b]\n~give(coins);"),
        ]);
        let info = session.symbol_info(&FileId::new("b.rs2"), 1, 2).unwrap();
        assert_eq!(info.title(), "proc give");
        assert_eq!(info.declaration, Some(loc("a.rs2", 1, 6)));
        assert_eq!(info.doc.as_deref(), Some("Gives an item."));
        assert_eq!(info.reference_count, 1);
        let DeclarationDetail::Signature(sig) = &info.detail else {
            panic!("expected a signature, got {:?}", info.detail);
        };
        assert_eq!(sig.to_string(), "(obj $item)(boolean)");
    }

    #[test]
    fn test_remove_file() {
        let mut session = session_with(&[("items.obj", "[coins]"), ("b.rs2", "[opheld1,coins]\nmes(\"x\");")]);
        let items = FileId::new("items.obj");
        session.open_file(&items).unwrap();
        assert!(session.remove_file(&items));
        assert!(!session.remove_file(&items));
        assert!(session.active_file().is_none());
        assert!(!session.is_declared("coins", MatchTypeId::Obj));
        assert_eq!(session.identifiers().references("coins", MatchTypeId::Obj).len(), 1);
        assert!(!session.load_file(FileId::new("notes.txt"), "hello"));
    }

    #[test]
    fn test_scan_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let write = |path: &str, text: &str| {
            let full = root.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, text).unwrap();
        };
        write("rsidx.toml", "[index]\nexclude_dirs = [\"build\"]\n");
        write("scripts/shop.rs2", "[proc,open_shop]\n~restock(coins);");
        write("configs/items.obj", "[coins]\n[bones]");
        write("configs/obj.pack", "995=coins\n526=bones");
        write("maps/m50_50.jm2", "==== OBJ ====\n0 1 1: 995 10\n0 2 2: 123 1\nbroken line\n");
        write("build/ignored.rs2", "[proc,ignored]");
        write("notes.txt", "hello");

        let mut session = IndexSession::default();
        let stats = session.scan_project(root).unwrap();
        assert_eq!(stats.files, 3);
        assert_eq!(stats.maps, 1);
        assert_eq!(session.config().exclude_dirs, vec!["build".to_string()]);
        assert!(session.root().is_some());

        assert!(session.is_declared("coins", MatchTypeId::Obj));
        assert!(!session.is_declared("ignored", MatchTypeId::Proc));
        let coins = session.identifiers().get("coins", MatchTypeId::Obj).unwrap();
        assert_eq!(coins.pack_id, Some(995));
        let refs = session.identifiers().references("coins", MatchTypeId::Obj);
        assert!(refs.contains(&loc("maps/m50_50.jm2", 1, 7)), "{refs:?}");
        assert!(refs.contains(&loc("scripts/shop.rs2", 1, 9)), "{refs:?}");

        let diagnostics = session.map_diagnostics(&FileId::new("maps/m50_50.jm2"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 3);

        // A rescan starts from scratch.
        std::fs::remove_file(root.join("configs/items.obj")).unwrap();
        let stats = session.scan_project(root).unwrap();
        assert_eq!(stats.files, 2);
        assert!(!session.is_declared("coins", MatchTypeId::Obj));
    }
}
