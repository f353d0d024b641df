use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mismo_compare::{load_str, locate, pair, Comparison, ElementTree};

/// A deal with `n` parties; every seventh one differs from the basis side
fn deal(n: usize, basis: bool) -> String {
    let mut xml = String::from("<DEAL><PARTIES>");
    for i in 0..n {
        let last = if basis && i % 7 == 0 { "Smyth" } else { "Smith" };
        xml.push_str(&format!(
            "<PARTY><ROLE>borrower</ROLE><NAME><FIRST>P{i}</FIRST><LAST>{last}</LAST></NAME>\
             <CONTACT><PHONE>555-{i:04}</PHONE></CONTACT></PARTY>"
        ));
    }
    xml.push_str("</PARTIES></DEAL>");
    xml
}

fn trees(n: usize) -> Option<(ElementTree, ElementTree)> {
    Some((load_str(&deal(n, false)).ok()?, load_str(&deal(n, true)).ok()?))
}

fn bench_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_parties");
    for n in [10, 50, 200] {
        let Some((primary, basis)) = trees(n) else {
            continue;
        };
        let sources = locate(&primary, "PARTY").unwrap_or_default();
        let candidates = locate(&basis, "PARTY").unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| pair(black_box(&sources), black_box(&candidates)))
        });
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let Some((primary, basis)) = trees(50) else {
        return;
    };
    c.bench_function("compare_party_50", |b| {
        b.iter(|| Comparison::new(&primary, &basis).compare(black_box("PARTY")))
    });
}

criterion_group!(benches, bench_pair, bench_compare);
criterion_main!(benches);
