use criterion::{Criterion, black_box, criterion_group, criterion_main};
use scan::{Navigator, StrSource};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

fn make_blocks(blocks: usize) -> String {
    let mut input = String::with_capacity(blocks * 48);
    for _ in 0..blocks {
        input.push_str(r#"<div class="box"><span>hello</span><img src="x"></div>"#);
    }
    input
}

// Dense angle brackets and near-miss tag names keep the raw-text scan honest.
fn make_script_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<script>");
    while body.len() < bytes {
        body.push_str("<scri");
        body.push('<');
        body.push_str("pt ");
    }
    body.push_str("</script>");
    body
}

fn walk_to_end(input: &str) -> usize {
    let mut nav = Navigator::new(StrSource::new(input));
    let mut tags = 0;
    while !nav.is_done() {
        if nav.descend().expect("in-memory scan cannot fail").is_some() {
            tags += 1;
        }
    }
    tags
}

fn bench_walk_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_walk_small", |b| {
        b.iter(|| black_box(walk_to_end(black_box(&input))));
    });
}

fn bench_walk_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_walk_large", |b| {
        b.iter(|| black_box(walk_to_end(black_box(&input))));
    });
}

fn bench_script_adversarial(c: &mut Criterion) {
    let input = make_script_adversarial(512 * 1024);
    c.bench_function("bench_script_adversarial", |b| {
        b.iter(|| black_box(walk_to_end(black_box(&input))));
    });
}

fn bench_find_by_class(c: &mut Criterion) {
    let mut input = make_blocks(LARGE_BLOCKS);
    input.push_str(r#"<p class="needle">end</p>"#);
    c.bench_function("bench_find_by_class", |b| {
        b.iter(|| {
            let mut nav = Navigator::new(StrSource::new(black_box(&input)));
            let hit = nav
                .find(|tag| tag.has_class("needle"))
                .expect("in-memory scan cannot fail");
            black_box(hit.is_some());
        });
    });
}

criterion_group!(
    benches,
    bench_walk_small,
    bench_walk_large,
    bench_script_adversarial,
    bench_find_by_class
);
criterion_main!(benches);
