// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

use redirecthunter::{BodyRedirectScanner, Detectors, InternalHostClassifier};

fn body_scan_benchmark(c: &mut Criterion) {
    let scanner = BodyRedirectScanner::new();
    let base = Url::parse("https://example.com/landing").unwrap();

    let mut html = String::from("<!DOCTYPE html><html><head><title>Test</title></head><body>");
    for i in 0..500 {
        html.push_str(&format!("<div class=\"row\"><a href=\"/page{}\">Link {}</a></div>", i, i));
    }
    html.push_str(r#"<script>window.location.href = "/final";</script></body></html>"#);

    c.bench_function("body_redirect_scan", |b| {
        b.iter(|| black_box(scanner.detect(black_box(html.as_bytes()), &base)))
    });
}

fn detector_benchmark(c: &mut Criterion) {
    let detectors = Detectors::new(InternalHostClassifier::default());
    let urls: Vec<Url> = [
        "https://example.com/cb?state=1&access_token=abc",
        "http://169.254.169.254/latest/meta-data/",
        "https://login.example.com/#id_token=abc&state=2",
        "https://cdn.example.net/assets/app.js",
    ]
    .iter()
    .map(|u| Url::parse(u).unwrap())
    .collect();

    c.bench_function("url_detectors", |b| {
        b.iter(|| {
            for url in &urls {
                black_box(detectors.ssrf(url, 0));
                black_box(detectors.token_leakage(url, 0));
            }
        })
    });

    let body = b"<form action=/login><input name=username><input type=password></form>".repeat(50);
    c.bench_function("phishing_indicator", |b| {
        b.iter(|| black_box(detectors.phishing_indicator(black_box(&body), 0)))
    });
}

criterion_group!(benches, body_scan_benchmark, detector_benchmark);
criterion_main!(benches);
