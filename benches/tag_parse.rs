use criterion::{Criterion, black_box, criterion_group, criterion_main};
use scout::db::Store;
use scout::indexer::parse::parse_line;
use std::path::Path;
use std::time::Duration;

fn tag_listing(count: usize) -> String {
    let mut out = String::from("!_TAG_FILE_FORMAT\t2\t/extended format/\n");
    for i in 0..count {
        match i % 3 {
            0 => out.push_str(&format!(
                "handler_{i}\tsrc/mod_{}.py\t{};\"\tfunction\tline:{}\n",
                i % 50,
                i + 1,
                i + 1
            )),
            1 => out.push_str(&format!(
                "Widget{i}\tsrc/mod_{}.py\t/^class Widget{i}:$/;\"\tkind:class\tline:{}\n",
                i % 50,
                i + 1
            )),
            _ => out.push_str(&format!(
                "{{\"_type\": \"tag\", \"name\": \"method_{i}\", \"path\": \"src/mod_{}.py\", \"line\": {}, \"kind\": \"method\"}}\n",
                i % 50,
                i + 1
            )),
        }
    }
    out
}

fn bench_parse_lines(c: &mut Criterion) {
    let listing = tag_listing(10_000);
    let root = Path::new("/repo");
    c.bench_function("parse_10k_tag_lines", |b| {
        b.iter(|| {
            let parsed = listing
                .lines()
                .filter_map(|line| parse_line(black_box(line), root).into_symbol())
                .count();
            black_box(parsed)
        })
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let temp = tempfile::TempDir::new().unwrap();
    let tags = temp.path().join("tags");
    std::fs::write(&tags, tag_listing(10_000)).unwrap();
    let mut store = Store::open(&temp.path().join("index.db"), Duration::from_secs(5)).unwrap();
    c.bench_function("rebuild_10k_symbols", |b| {
        b.iter(|| black_box(store.rebuild(Some(&tags), temp.path()).unwrap()))
    });
}

criterion_group!(benches, bench_parse_lines, bench_rebuild);
criterion_main!(benches);
