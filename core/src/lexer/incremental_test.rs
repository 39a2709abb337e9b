#[cfg(test)]
mod tests {
    use crate::exceptions::WordExceptionLearner;
    use crate::file_kind::FileKind;
    use crate::lexer::LexedDocument;
    use crate::text::{FileId, LineCol, TextEdit};

    fn doc(text: &str, exceptions: &WordExceptionLearner) -> LexedDocument {
        LexedDocument::new(FileId::new("test.rs2"), FileKind::Rs2, text, exceptions)
    }

    fn assert_matches_full_lex(document: &LexedDocument, exceptions: &WordExceptionLearner) {
        let fresh = doc(&document.text().to_string(), exceptions);
        assert_eq!(document.line_count(), fresh.line_count());
        for (n, (a, b)) in document.lines().iter().zip(fresh.lines()).enumerate() {
            assert_eq!(a, b, "line {n} differs from a full lex");
        }
    }

    fn sample() -> String {
        let mut lines: Vec<String> = (0..10).map(|i| format!("mes(\"line {i}\");")).collect();
        lines.push("/* start of comment".into());
        lines.push("   still comment".into());
        lines.push("   more comment".into());
        lines.push("   nearly done".into());
        lines.push("   end */".into());
        for i in 15..20 {
            lines.push(format!("~proc_{i}($a, {i});"));
        }
        lines.join("\n")
    }

    #[test]
    fn test_edit_inside_block_comment_stops_early() {
        let exceptions = WordExceptionLearner::new();
        let mut document = doc(&sample(), &exceptions);
        let before: Vec<_> = document.lines().to_vec();

        let report = document.apply_edit(&TextEdit::insert(LineCol::new(12, 3), "x"), &exceptions);
        assert_eq!(report.first_line, 12);
        assert!(report.last_line <= 14, "relexed past the comment: {report:?}");
        assert_eq!(report.line_delta, 0);
        for n in 15..20 {
            assert_eq!(document.lines()[n], before[n], "line {n} should be untouched");
        }
        assert_matches_full_lex(&document, &exceptions);
    }

    #[test]
    fn test_opening_comment_relexes_forward() {
        let exceptions = WordExceptionLearner::new();
        let mut document = doc(&sample(), &exceptions);
        let report = document.apply_edit(&TextEdit::insert(LineCol::new(3, 0), "/*"), &exceptions);
        assert_eq!(report.first_line, 3);
        // Line 10 opens a comment anyway, so its end state is unchanged.
        assert_eq!(report.last_line, 10);
        assert!(document.lines()[5].tokens.is_empty());
        assert_matches_full_lex(&document, &exceptions);
    }

    #[test]
    fn test_unterminated_string_then_fix() {
        let exceptions = WordExceptionLearner::new();
        let mut document = doc(&sample(), &exceptions);
        document.apply_edit(&TextEdit::insert(LineCol::new(2, 0), "\""), &exceptions);
        assert_matches_full_lex(&document, &exceptions);
        document.apply_edit(
            &TextEdit::new(LineCol::new(2, 0), LineCol::new(2, 1), ""),
            &exceptions,
        );
        assert_matches_full_lex(&document, &exceptions);
    }

    #[test]
    fn test_line_insertions_and_deletions() {
        let exceptions = WordExceptionLearner::new();
        let mut document = doc(&sample(), &exceptions);

        let report = document.apply_edit(
            &TextEdit::insert(LineCol::new(4, 5), "\n~give(coins,\n  5);\n"),
            &exceptions,
        );
        assert_eq!(report.line_delta, 3);
        assert_eq!(document.line_count(), 23);
        assert_matches_full_lex(&document, &exceptions);

        let report = document.apply_edit(
            &TextEdit::new(LineCol::new(1, 2), LineCol::new(9, 4), ""),
            &exceptions,
        );
        assert_eq!(report.line_delta, -8);
        assert_matches_full_lex(&document, &exceptions);

        // Delete across the comment start so the comment body becomes code.
        let report = document.apply_edit(
            &TextEdit::new(LineCol::new(5, 0), LineCol::new(5, 2), ""),
            &exceptions,
        );
        assert_eq!(report.first_line, 5);
        assert!(!document.lines()[6].tokens.is_empty());
        assert_matches_full_lex(&document, &exceptions);
    }

    #[test]
    fn test_edit_sequence_matches_full_lex() {
        let exceptions = WordExceptionLearner::new();
        let mut document = doc(&sample(), &exceptions);
        let edits = [
            TextEdit::insert(LineCol::new(0, 0), "[proc,start](int $x)\n"),
            TextEdit::insert(LineCol::new(7, 4), "\"<"),
            TextEdit::insert(LineCol::new(7, 8), ">\""),
            TextEdit::new(LineCol::new(14, 0), LineCol::new(16, 3), "if ($x >= 1) {\n}"),
            TextEdit::insert(LineCol::new(99, 99), "\n// trailing"),
            TextEdit::new(LineCol::new(0, 0), LineCol::new(0, 0), "/* "),
            TextEdit::new(LineCol::new(0, 0), LineCol::new(0, 3), ""),
        ];
        for edit in &edits {
            document.apply_edit(edit, &exceptions);
            assert_matches_full_lex(&document, &exceptions);
        }
    }

    #[test]
    fn test_edit_on_empty_document() {
        let exceptions = WordExceptionLearner::new();
        let mut document = doc("", &exceptions);
        assert_eq!(document.line_count(), 1);
        let report = document.apply_edit(&TextEdit::insert(LineCol::new(0, 0), "a\nb\nc"), &exceptions);
        assert_eq!(report.first_line, 0);
        assert_eq!(report.last_line, 2);
        assert_eq!(document.line_count(), 3);
        assert_matches_full_lex(&document, &exceptions);
    }

    #[test]
    fn test_config_document_edit() {
        let exceptions = WordExceptionLearner::new();
        let text = "[coins]\nname=Coins\ncost=1\n\n[bones]\nname=Bones";
        let mut document = LexedDocument::new(FileId::new("a.obj"), FileKind::Obj, text, &exceptions);
        let report = document.apply_edit(&TextEdit::insert(LineCol::new(2, 6), "00"), &exceptions);
        assert_eq!(report.first_line, 2);
        assert_eq!(report.last_line, 3);
        let fresh = LexedDocument::new(FileId::new("a.obj"), FileKind::Obj, &document.text().to_string(), &exceptions);
        assert_eq!(document.lines(), fresh.lines());
        assert_eq!(document.line_text(2), "cost=100");
    }
}
