use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use mboxbook::normalize::WrapConfig;

fn wrapped_letter() -> String {
    let paragraph = "the road over the pass was closed again for most of the week\n\
                     and the mail sat in town until the plow finally came through,\n\
                     so forgive the silence, it was the snow and not the writer\n\n";
    let mut body = String::from("Dear friend,\n\n");
    for _ in 0..40 {
        body.push_str(paragraph);
    }
    body
}

fn reply_with_history() -> String {
    let mut body = String::from("Thanks, that answers it.\n");
    body.push_str("\nOn Mon, 2 Jan 2023 at 10:00, Ana Duarte wrote:\n");
    for _ in 0..200 {
        body.push_str("> a line of quoted history from the previous message\n");
    }
    body
}

fn bench_wrap_detection(c: &mut Criterion) {
    let body = wrapped_letter();
    let cfg = WrapConfig::default();

    c.bench_function("detect_hard_wrap", |b| {
        b.iter(|| mboxbook::normalize::is_hard_wrapped(&body, &cfg))
    });
}

fn bench_normalize_body(c: &mut Criterion) {
    let body = wrapped_letter();
    let cfg = WrapConfig::default();

    c.bench_function("normalize_wrapped_letter", |b| {
        b.iter(|| mboxbook::normalize::normalize_body(&body, &cfg))
    });
}

fn bench_reply_selection(c: &mut Criterion) {
    let body = reply_with_history();

    c.bench_function("select_visible_reply", |b| {
        b.iter(|| mboxbook::reply::visible_content(&body))
    });
}

fn bench_scan_mbox(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("letters.mbox");

    c.bench_function("scan_letters_mbox", |b| {
        b.iter(|| {
            let reader = mboxbook::parser::mbox::MboxReader::new(&fixture_path).unwrap();
            let mut count = 0u64;
            reader
                .for_each_message(
                    &mut |_offset, _bytes| {
                        count += 1;
                        true
                    },
                    None,
                )
                .unwrap();
            count
        })
    });
}

criterion_group!(
    benches,
    bench_wrap_detection,
    bench_normalize_body,
    bench_reply_selection,
    bench_scan_mbox
);
criterion_main!(benches);
