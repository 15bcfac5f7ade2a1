//! Criterion benchmarks for catalog_logger

use catalog_logger::format::FormatPipeline;
use catalog_logger::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

struct Discard;

impl Appender for Discard {
    fn append(&mut self, line: &str) -> catalog_logger::Result<()> {
        black_box(line);
        Ok(())
    }

    fn flush(&mut self) -> catalog_logger::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "discard"
    }
}

fn standard_sinks(builder: LoggerBuilder) -> LoggerBuilder {
    builder
        .sink(
            Sink::new(
                "http-access",
                FormatPipeline::http_access("CatalogService", TimestampFormat::Display),
                Discard,
            )
            .min_severity(Severity::Http)
            .filter(SeverityFilter::only(Severity::Http)),
        )
        .sink(
            Sink::new(
                "error",
                FormatPipeline::error("CatalogService", TimestampFormat::Display),
                Discard,
            )
            .min_severity(Severity::Error)
            .filter(SeverityFilter::only(Severity::Error)),
        )
        .sink(Sink::new(
            "console",
            FormatPipeline::console("CatalogService", TimestampFormat::Display, true),
            Discard,
        ))
}

// ============================================================================
// Format Pipeline Benchmarks
// ============================================================================

fn bench_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_pipeline");
    group.throughput(Throughput::Elements(1));

    let request = HttpRequest::new("1.2.3.4", "GET", "/products/42", "1.1")
        .with_header("user-agent", "curl/8.5.0");
    let http_event = LogEvent::new(
        Severity::Http,
        "CatalogService",
        serde_json::to_string(&request).unwrap(),
    );
    let error_event = LogEvent::new(Severity::Error, "CatalogService", "Datastore unavailable")
        .with_error(Some(ErrorDetail::new("refused").with_stack("Error: refused")));

    let http = FormatPipeline::http_access("CatalogService", TimestampFormat::Display);
    let error = FormatPipeline::error("CatalogService", TimestampFormat::Display);
    let console = FormatPipeline::console("CatalogService", TimestampFormat::Display, true);

    group.bench_function("http_access", |b| {
        b.iter(|| black_box(http.format(black_box(&http_event))))
    });
    group.bench_function("error", |b| {
        b.iter(|| black_box(error.format(black_box(&error_event))))
    });
    group.bench_function("console_colored", |b| {
        b.iter(|| black_box(console.format(black_box(&error_event))))
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let sync_logger = standard_sinks(Logger::builder()).build();
    let async_logger = standard_sinks(Logger::builder()).async_mode().build();
    let floored = standard_sinks(Logger::builder().floor(Severity::Info)).build();
    let request = HttpRequest::new("1.2.3.4", "GET", "/x", "1.1").with_header("user-agent", "curl");

    group.bench_function("sync_info", |b| {
        b.iter(|| sync_logger.info(black_box("Cache hit")))
    });
    group.bench_function("sync_http", |b| {
        b.iter(|| sync_logger.http(black_box(&request)))
    });
    group.bench_function("async_info", |b| {
        b.iter(|| async_logger.info(black_box("Cache hit")))
    });
    group.bench_function("below_floor", |b| {
        b.iter(|| floored.debug(black_box("dropped")))
    });

    group.finish();
    async_logger.flush().unwrap();
}

criterion_group!(benches, bench_pipelines, bench_dispatch);
criterion_main!(benches);
