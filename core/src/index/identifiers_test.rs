#[cfg(test)]
mod tests {
    use crate::index::export::export;
    use crate::index::{DeclarationDetail, DeclarationText, IdentifierIndex, parse_signature};
    use crate::matching::MatchTypeId;
    use crate::text::{FileId, LineCol, Location};

    fn loc(file: &str, line: u32, column: u32) -> Location {
        Location::new(FileId::new(file), line, column)
    }

    fn header(text: &str) -> DeclarationText {
        DeclarationText::from_line(text)
    }

    #[test]
    fn test_declaration_insert_is_idempotent() {
        let mut index = IdentifierIndex::new();
        let a = FileId::new("a.rs2");
        let text = header("[proc,foo](int $x)");
        index.put_declaration("foo", MatchTypeId::Proc, loc("a.rs2", 0, 6), &text);
        index.put_reference("foo", MatchTypeId::Proc, &a, 4, 1);
        index.put_declaration("foo", MatchTypeId::Proc, loc("a.rs2", 0, 6), &text);

        assert_eq!(index.len(), 1);
        let foo = index.get("foo", MatchTypeId::Proc).unwrap();
        assert_eq!(foo.declaration, Some(loc("a.rs2", 0, 6)));
        assert_eq!(foo.reference_count(), 1, "second insert must keep references");
    }

    #[test]
    fn test_existing_declaration_is_not_replaced() {
        let mut index = IdentifierIndex::new();
        index.put_declaration("foo", MatchTypeId::Proc, loc("a.rs2", 0, 6), &header("[proc,foo]"));
        index.put_declaration("foo", MatchTypeId::Proc, loc("b.rs2", 3, 6), &header("[proc,foo](int $x)"));
        let foo = index.get("foo", MatchTypeId::Proc).unwrap();
        assert_eq!(foo.declaration, Some(loc("a.rs2", 0, 6)));
        assert_eq!(foo.signature().map(|s| s.params.len()), Some(0));
    }

    #[test]
    fn test_earliest_duplicate_declaration_wins() {
        let mut index = IdentifierIndex::new();
        index.put_declaration("foo", MatchTypeId::Proc, loc("b.rs2", 3, 6), &header("[proc,foo](int $x)"));
        index.put_declaration("foo", MatchTypeId::Proc, loc("a.rs2", 0, 6), &header("[proc,foo]"));
        let foo = index.get("foo", MatchTypeId::Proc).unwrap();
        assert_eq!(foo.declaration, Some(loc("a.rs2", 0, 6)));
        assert_eq!(foo.signature().map(|s| s.params.len()), Some(0));
    }

    #[test]
    fn test_clear_file_promotes_remaining_declaration() {
        let mut index = IdentifierIndex::new();
        let (a, b, c) = (FileId::new("a.rs2"), FileId::new("b.rs2"), FileId::new("c.rs2"));
        index.put_declaration("foo", MatchTypeId::Proc, loc("a.rs2", 0, 6), &header("[proc,foo]"));
        index.put_declaration("foo", MatchTypeId::Proc, loc("c.rs2", 2, 6), &header("[proc,foo](obj $o)"));
        index.put_declaration("foo", MatchTypeId::Proc, loc("b.rs2", 1, 6), &header("[proc,foo](int $x)"));
        index.put_reference("foo", MatchTypeId::Proc, &c, 7, 1);

        index.clear_file(&a);
        let foo = index.get("foo", MatchTypeId::Proc).unwrap();
        assert_eq!(foo.declaration, Some(loc("b.rs2", 1, 6)));
        assert_eq!(foo.signature().and_then(|s| s.param_type(0)), Some("int"));
        assert!(index.unknown_references(&c).is_empty());

        index.clear_file(&b);
        let foo = index.get("foo", MatchTypeId::Proc).unwrap();
        assert_eq!(foo.declaration, Some(loc("c.rs2", 2, 6)));

        index.clear_file(&c);
        assert!(index.get("foo", MatchTypeId::Proc).is_none());

        index.put_declaration("foo", MatchTypeId::Proc, loc("b.rs2", 1, 6), &header("[proc,foo]"));
        assert_eq!(index.declaration("foo", MatchTypeId::Proc), Some(&loc("b.rs2", 1, 6)));
    }

    #[test]
    fn test_stub_then_declare_keeps_all_references() {
        let mut index = IdentifierIndex::new();
        let b = FileId::new("b.rs2");
        index.put_reference("foo", MatchTypeId::Proc, &b, 1, 1);
        assert!(!index.is_declared("foo", MatchTypeId::Proc));
        assert!(index.get("foo", MatchTypeId::Proc).is_some());

        index.set_pack_id("foo", MatchTypeId::Proc, 7, &FileId::new("proc.pack"));
        index.put_declaration("foo", MatchTypeId::Proc, loc("a.rs2", 0, 6), &header("[proc,foo]"));
        index.put_reference("foo", MatchTypeId::Proc, &b, 9, 3);

        let foo = index.get("foo", MatchTypeId::Proc).unwrap();
        assert!(foo.is_declared());
        assert_eq!(foo.pack_id, Some(7));
        assert_eq!(
            foo.reference_locations(),
            vec![loc("b.rs2", 1, 1), loc("b.rs2", 9, 3)]
        );
    }

    #[test]
    fn test_unresolvable_keys_are_ignored() {
        let mut index = IdentifierIndex::new();
        let a = FileId::new("a.rs2");
        assert!(index.put_reference("", MatchTypeId::Obj, &a, 0, 0).is_none());
        assert!(index.put_reference("x", MatchTypeId::LocalVar, &a, 0, 0).is_none());
        assert!(index.put_reference("5", MatchTypeId::Number, &a, 0, 0).is_none());
        assert!(index.put_declaration("", MatchTypeId::Proc, loc("a.rs2", 0, 0), &header("")).is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_clear_file_removes_everything_it_contributed() {
        let mut index = IdentifierIndex::new();
        let a = FileId::new("a.rs2");
        index.put_declaration("local_only", MatchTypeId::Proc, loc("a.rs2", 0, 6), &header("[proc,local_only]"));
        index.put_reference("local_only", MatchTypeId::Proc, &a, 3, 1);
        index.put_reference("coins", MatchTypeId::Obj, &a, 4, 9);
        index.put_declaration("coins", MatchTypeId::Obj, loc("a.obj", 0, 1), &header("[coins]"));

        index.clear_file(&a);

        assert!(index.get("local_only", MatchTypeId::Proc).is_none());
        assert!(index.completions(MatchTypeId::Proc, "loc").is_empty());
        let coins = index.get("coins", MatchTypeId::Obj).unwrap();
        assert!(coins.is_declared());
        assert_eq!(coins.reference_count(), 0);
        assert!(index.iter().all(|i| !i.references.contains_key(&a)));
    }

    #[test]
    fn test_clear_file_demotes_declaration_referenced_elsewhere() {
        let mut index = IdentifierIndex::new();
        let a = FileId::new("a.rs2");
        let b = FileId::new("b.rs2");
        index.put_declaration("bar", MatchTypeId::Proc, loc("a.rs2", 0, 6), &header("[proc,bar](obj $o)"));
        index.put_reference("bar", MatchTypeId::Proc, &a, 5, 1);
        index.put_reference("bar", MatchTypeId::Proc, &b, 2, 1);

        index.clear_file(&a);

        let bar = index.get("bar", MatchTypeId::Proc).expect("bar survives as a stub");
        assert!(bar.declaration.is_none());
        assert_eq!(bar.detail, DeclarationDetail::None);
        assert_eq!(bar.reference_locations(), vec![loc("b.rs2", 2, 1)]);
        assert_eq!(index.completions(MatchTypeId::Proc, "b"), vec!["bar".to_string()]);
    }

    #[test]
    fn test_completions_per_kind() {
        let mut index = IdentifierIndex::new();
        let a = FileId::new("a.rs2");
        index.put_reference("coins", MatchTypeId::Obj, &a, 0, 0);
        index.put_reference("cooked_meat", MatchTypeId::Obj, &a, 1, 0);
        index.put_reference("cook", MatchTypeId::Proc, &a, 2, 0);
        assert_eq!(
            index.completions(MatchTypeId::Obj, "co"),
            vec!["coins".to_string(), "cooked_meat".to_string()]
        );
        assert_eq!(index.completions(MatchTypeId::Proc, "co"), vec!["cook".to_string()]);
        assert!(index.completions(MatchTypeId::Npc, "co").is_empty());
    }

    #[test]
    fn test_pack_ids() {
        let mut index = IdentifierIndex::new();
        let pack = FileId::new("obj.pack");
        index.put_declaration("coins", MatchTypeId::Obj, loc("a.obj", 0, 1), &header("[coins]"));
        index.set_pack_id("coins", MatchTypeId::Obj, 995, &pack);
        assert_eq!(
            index.find_by_pack_id(MatchTypeId::Obj, 995).map(|i| i.name.as_ref()),
            Some("coins")
        );
        index.clear_file(&pack);
        assert!(index.find_by_pack_id(MatchTypeId::Obj, 995).is_none());
        assert_eq!(index.get("coins", MatchTypeId::Obj).unwrap().pack_id, None);
    }

    #[test]
    fn test_unknown_references() {
        let mut index = IdentifierIndex::new();
        let a = FileId::new("a.rs2");
        index.put_reference("missing", MatchTypeId::Obj, &a, 3, 4);
        index.put_reference("model_1", MatchTypeId::Model, &a, 1, 0);
        index.put_declaration("coins", MatchTypeId::Obj, loc("a.obj", 0, 1), &header("[coins]"));
        index.put_reference("coins", MatchTypeId::Obj, &a, 2, 0);

        let unknown = index.unknown_references(&a);
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].position, LineCol::new(3, 4));
        assert_eq!(unknown[0].message(), "unknown obj: missing");
    }

    #[test]
    fn test_declaration_details() {
        let mut index = IdentifierIndex::new();
        let text = DeclarationText {
            lines: vec!["[damage]".into(), "type=int".into(), "default=0".into()],
            doc: Some("Bonus damage.".into()),
        };
        index.put_declaration("damage", MatchTypeId::Param, loc("a.param", 0, 1), &text);
        let damage = index.get("damage", MatchTypeId::Param).unwrap();
        assert_eq!(damage.detail, DeclarationDetail::ValueType("int".into()));
        assert_eq!(damage.doc.as_deref(), Some("Bonus damage."));

        index.put_declaration(
            "max_hp",
            MatchTypeId::Constant,
            loc("a.constant", 0, 1),
            &header("^max_hp = 99 // cap"),
        );
        assert_eq!(
            index.get("max_hp", MatchTypeId::Constant).unwrap().detail,
            DeclarationDetail::ConstantValue("99".into())
        );
    }

    #[test]
    fn test_parse_signature() {
        let sig = parse_signature("[proc,give](obj $item, int $count)(boolean)").unwrap();
        assert_eq!(sig.param_type(0), Some("obj"));
        assert_eq!(sig.param_type(1), Some("int"));
        assert_eq!(sig.param_type(2), None);
        assert_eq!(sig.params[1].name.as_ref(), "count");
        assert_eq!(sig.return_type(0), Some("boolean"));
        assert_eq!(sig.to_string(), "(obj $item, int $count)(boolean)");

        let empty = parse_signature("[label,done]").unwrap();
        assert!(empty.params.is_empty() && empty.returns.is_empty());
    }

    #[test]
    fn test_export_shape() {
        let mut index = IdentifierIndex::new();
        let b = FileId::new("b.rs2");
        index.put_declaration("foo", MatchTypeId::Proc, loc("a.rs2", 0, 6), &header("[proc,foo]"));
        index.put_reference("foo", MatchTypeId::Proc, &b, 10, 2);
        index.put_reference("foo", MatchTypeId::Proc, &b, 2, 1);

        let exported = export(&index);
        let record = exported.get("fooPROC").expect("flat key");
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["declaration"]["file"], "a.rs2");
        assert_eq!(json["declaration"]["lineCol"], "0|6");
        assert_eq!(json["references"]["b.rs2"], serde_json::json!(["2|1", "10|2"]));
        assert_eq!(json["kind"], "PROC");
        assert!(json.get("packId").is_none());
    }
}
