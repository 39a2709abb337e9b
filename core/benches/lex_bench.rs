use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rsidx_core::exceptions::WordExceptionLearner;
use rsidx_core::file_kind::FileKind;
use rsidx_core::lexer::LexedDocument;
use rsidx_core::text::{FileId, LineCol, TextEdit};
use rsidx_core::{IndexSession, SessionConfig};

fn sample_script(blocks: usize) -> String {
    let mut out = String::new();
    for i in 0..blocks {
        out.push_str(&format!(
            "// Block {i}.\n[proc,give_{i}](obj $item, int $count)(boolean)\ndef_int $total = calc($count * 2);\nif ($item = cert_coins) {{\n    mes(\"<tostring($total)> coins\");\n}}\nswitch_obj ($item) {{\n    case coins, bones : ~give_{next}(bones, 1);\n    case default : return(false);\n}}\nreturn(true);\n",
            next = (i + 1) % blocks
        ));
    }
    out
}

fn bench_full_lex(c: &mut Criterion) {
    let text = sample_script(200);
    let exceptions = WordExceptionLearner::new();
    c.bench_function("lex_full_document", |b| {
        b.iter(|| {
            let doc = LexedDocument::new(FileId::new("bench.rs2"), FileKind::Rs2, black_box(&text), &exceptions);
            black_box(doc.line_count());
        });
    });
}

fn bench_incremental_edit(c: &mut Criterion) {
    let text = sample_script(200);
    let exceptions = WordExceptionLearner::new();
    let mut doc = LexedDocument::new(FileId::new("bench.rs2"), FileKind::Rs2, &text, &exceptions);
    let edit = TextEdit::new(LineCol::new(499, 4), LineCol::new(499, 7), "mes");
    c.bench_function("lex_single_line_edit", |b| {
        b.iter(|| black_box(doc.apply_edit(&edit, &exceptions)));
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let mut session = IndexSession::new(SessionConfig::default());
    for n in 0..20 {
        session.load_file(FileId::new(format!("scripts/s{n}.rs2")), &sample_script(20));
    }
    session.load_file(FileId::new("configs/items.obj"), "[coins]\n[bones]");
    c.bench_function("rebuild_all", |b| {
        b.iter(|| black_box(session.rebuild_all()));
    });
}

criterion_group!(lexing, bench_full_lex, bench_incremental_edit, bench_rebuild);
criterion_main!(lexing);
