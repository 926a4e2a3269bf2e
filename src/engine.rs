use crate::archive::{self, ArchiveWriter, ArchivedBook, ReportPaths, ReportWriter, SearchHit};
use crate::classify::Classifier;
use crate::config::AppConfig;
use crate::error::Error;
use crate::gate::{QualityGate, Screened};
use crate::hasher::Deduplicator;
use crate::model::{AcceptedBook, Outcome, RejectionRecord, Statistics};
use crate::progress::ProgressReporter;
use crate::scanner::DocumentLoader;
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Everything a single run accumulates. Owned by the caller and threaded
/// through each stage; nothing here outlives the run.
#[derive(Debug)]
pub struct RunContext {
    pub stats: Statistics,
    pub accepted: Vec<AcceptedBook>,
    pub rejected: Vec<RejectionRecord>,
    pub scan_duration: Duration,
    pub gate_duration: Duration,
    dedup: Deduplicator,
}

impl RunContext {
    pub fn new(fingerprint_prefix_chars: usize) -> Self {
        Self {
            stats: Statistics::default(),
            accepted: Vec::new(),
            rejected: Vec::new(),
            scan_duration: Duration::ZERO,
            gate_duration: Duration::ZERO,
            dedup: Deduplicator::new(fingerprint_prefix_chars),
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.stats.record(&outcome);
        match outcome {
            Outcome::Accepted(book) => self.accepted.push(book),
            Outcome::Rejected(record) => self.rejected.push(record),
        }
    }
}

#[derive(Debug)]
pub struct RunResult {
    pub scan_duration: Duration,
    pub gate_duration: Duration,
    pub write_duration: Duration,
    pub stats: Statistics,
    pub books: Vec<ArchivedBook>,
    pub rejected: Vec<RejectionRecord>,
    pub waste_moved: usize,
    /// `None` on a dry run.
    pub reports: Option<ReportPaths>,
}

pub struct SieveEngine {
    config: AppConfig,
    loader: DocumentLoader,
    gate: QualityGate,
    classifier: Classifier,
}

impl SieveEngine {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        config.validate()?;
        let loader =
            DocumentLoader::new(&config.source_dir, &config.extension, &config.ignore_patterns);
        let gate = QualityGate::new(&config);
        let classifier = Classifier::new(&config)?;
        Ok(Self {
            config,
            loader,
            gate,
            classifier,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Dedup then inference for one gated document. The index is only
    /// touched once the gate has already passed the document.
    fn resolve(&self, dedup: &Deduplicator, gated: Result<Screened, RejectionRecord>) -> Outcome {
        let Screened {
            document,
            chapter_count,
        } = match gated {
            Ok(screened) => screened,
            Err(record) => return Outcome::Rejected(record),
        };

        if let Err(reason) = dedup.check(&document.filename, &document.content) {
            return Outcome::Rejected(RejectionRecord {
                filename: document.filename,
                reason,
                path: document.path,
                relative_path: document.relative_path,
            });
        }

        let (title, category) = self.classifier.classify(&document.filename, &document.content);
        Outcome::Accepted(AcceptedBook {
            filename: document.filename,
            title,
            category,
            content: document.content,
            length: document.length,
            chapter_count,
            source_path: document.path,
        })
    }

    /// Load, gate, dedup and classify every document. Nothing is written.
    ///
    /// The gate runs in parallel; results are collected back into path order
    /// before the sequential dedup fold, so "first seen" is the first path in
    /// lexicographic order.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunContext, Error> {
        let mut ctx = RunContext::new(self.config.fingerprint_prefix_chars);

        info!("Scanning {}...", self.loader.root().display());
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let paths = self.loader.paths()?;
        ctx.scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(paths.len(), ctx.scan_duration.as_secs_f64());
        info!("Found {} files", paths.len());

        reporter.on_gate_start(paths.len());
        let gate_start = Instant::now();
        let checked = AtomicUsize::new(0);
        let gated: Vec<Result<Screened, RejectionRecord>> = paths
            .par_iter()
            .map(|path| {
                let result = self.gate.screen(self.loader.load(path));
                reporter.on_gate_progress(checked.fetch_add(1, Ordering::Relaxed) + 1);
                result
            })
            .collect();
        ctx.gate_duration = gate_start.elapsed();
        let passed = gated.iter().filter(|result| result.is_ok()).count();
        reporter.on_gate_complete(passed, ctx.gate_duration.as_secs_f64());
        debug!(
            "Quality gate completed in {:.2}s, {} of {} passed",
            ctx.gate_duration.as_secs_f64(),
            passed,
            paths.len()
        );

        for result in gated {
            let outcome = self.resolve(&ctx.dedup, result);
            log_outcome(&outcome);
            ctx.record(outcome);
        }
        reporter.on_dedup_complete(ctx.stats.kept, ctx.stats.duplicates);

        info!(
            "Total: {}, kept: {}, removed: {} ({} duplicates)",
            ctx.stats.total, ctx.stats.kept, ctx.stats.removed, ctx.stats.duplicates
        );

        Ok(ctx)
    }

    /// Full run: classify, write the archive, move rejects to the waste
    /// directory and regenerate the reports. `dry_run` stops after
    /// classification and only plans archive paths.
    pub fn process(&self, reporter: &dyn ProgressReporter, dry_run: bool) -> Result<RunResult, Error> {
        let ctx = self.run(reporter)?;
        let books_dir = self.config.books_dir();
        let writer = ArchiveWriter::new(&books_dir, &self.config.extension);

        if dry_run {
            info!("Dry run: nothing written, nothing moved");
            return Ok(RunResult {
                scan_duration: ctx.scan_duration,
                gate_duration: ctx.gate_duration,
                write_duration: Duration::ZERO,
                stats: ctx.stats,
                books: writer.plan(&ctx.accepted),
                rejected: ctx.rejected,
                waste_moved: 0,
                reports: None,
            });
        }

        reporter.on_write_start(ctx.accepted.len());
        let write_start = Instant::now();

        info!("Writing {} books to {}", ctx.accepted.len(), books_dir.display());
        let books = writer.write_books(&ctx.accepted)?;

        let waste_dir = self.config.waste_dir();
        info!("Moving {} rejected files to {}", ctx.rejected.len(), waste_dir.display());
        let waste_moved = archive::move_to_waste(&ctx.rejected, &waste_dir);

        let reports = ReportWriter::new(&self.config.output_dir).write_all(
            &ctx.stats,
            &ctx.rejected,
            &books,
            &chrono::Local::now(),
        )?;

        let write_duration = write_start.elapsed();
        reporter.on_write_complete(books.len(), write_duration.as_secs_f64());

        Ok(RunResult {
            scan_duration: ctx.scan_duration,
            gate_duration: ctx.gate_duration,
            write_duration,
            stats: ctx.stats,
            books,
            rejected: ctx.rejected,
            waste_moved,
            reports: Some(reports),
        })
    }

    /// Title search over the metadata written by the last full run.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, Error> {
        archive::search_library(&self.config.output_dir, query)
    }

    /// Verdict for a single file, judged as if it were the first file of a
    /// run. Nothing is written or moved.
    pub fn inspect(&self, path: &Path) -> Outcome {
        let dedup = Deduplicator::new(self.config.fingerprint_prefix_chars);
        self.resolve(&dedup, self.gate.screen(self.loader.load(path)))
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Accepted(book) => info!(
            "Kept: {} [{}] ({} chars, {} chapters)",
            book.title, book.category, book.length, book.chapter_count
        ),
        Outcome::Rejected(record) => debug!("Rejected {}: {}", record.filename, record.reason),
    }
}
