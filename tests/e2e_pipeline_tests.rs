use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use book_sieve::archive::report::{CATALOG, DELETION_REPORT, METADATA, REJECTIONS_CSV};
use book_sieve::{AppConfig, Category, Outcome, Reason, SieveEngine, SilentReporter};

const PROSE: &str = "山川湖海，风雨雷电，行人匆匆而过。";

/// A novel with a `# heading`, `chapters` markdown chapter headings and
/// prose filler, exactly `chars` characters long.
fn novel(heading: &str, chapters: usize, chars: usize) -> String {
    let mut content = format!("# {}\n\n", heading);
    for i in 1..=chapters {
        content.push_str(&format!("## 第{}章\n\n{}\n\n", i, PROSE));
    }
    while content.chars().count() < chars {
        content.push_str(PROSE);
    }
    content.chars().take(chars).collect()
}

fn prefix(content: &str, chars: usize) -> String {
    content.chars().take(chars).collect()
}

fn write(root: &Path, relative: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Layout:
///   source/
///     mystery/a_original.md      accepted (5 chapters)
///     mystery/b_reprint.md       duplicate of a_original.md (same first 10000 chars)
///     misc/test_debug_novel.md   test_or_debug_file
///     misc/tiny.md               too_small
///     misc/short_wide.md         too_short(4999)
///     misc/flat.md               too_few_chapters(1)
///     misc/broken.md             read_error (invalid UTF-8)
///     long_flat.md               accepted, no chapters but 50,000 chars
///     notes.txt                  not a document
fn create_library(source: &Path) -> String {
    let original = novel("盗墓笔记之七星鲁王宫", 5, 12_000);
    let reprint = format!("{}{}", prefix(&original, 10_000), "另一个结局。".repeat(400));

    write(source, "mystery/a_original.md", &original);
    write(source, "mystery/b_reprint.md", &reprint);
    write(source, "misc/test_debug_novel.md", novel("测试", 10, 20_000));
    write(source, "misc/tiny.md", novel("小", 5, 100));
    write(source, "misc/short_wide.md", "字".repeat(4999));
    write(source, "misc/flat.md", novel("平凡的世界", 1, 20_000));
    write(source, "misc/broken.md", [0xffu8, 0xfe, 0xfd].repeat(5000));
    write(source, "long_flat.md", "长".repeat(50_000));
    write(source, "notes.txt", "not a book");

    original
}

fn config_for(root: &Path) -> AppConfig {
    AppConfig {
        source_dir: root.join("source"),
        output_dir: root.join("library"),
        ..AppConfig::default()
    }
}

fn reason_for<'a>(rejected: &'a [book_sieve::RejectionRecord], filename: &str) -> &'a Reason {
    &rejected
        .iter()
        .find(|r| r.filename == filename)
        .unwrap_or_else(|| panic!("{} was not rejected", filename))
        .reason
}

#[test]
fn test_full_pipeline() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let original = create_library(&source);
    let config = config_for(tmp.path());

    let engine = SieveEngine::new(config.clone()).unwrap();
    let result = engine.process(&SilentReporter, false).unwrap();

    // every document is either kept or rejected
    assert_eq!(result.stats.total, 8);
    assert_eq!(result.stats.kept, 2);
    assert_eq!(result.stats.removed, 6);
    assert_eq!(result.stats.duplicates, 1);
    assert_eq!(result.books.len() + result.rejected.len(), result.stats.total);

    let rejected = &result.rejected;
    assert_eq!(
        reason_for(rejected, "b_reprint.md"),
        &Reason::DuplicateOf("a_original.md".to_string())
    );
    assert_eq!(reason_for(rejected, "test_debug_novel.md"), &Reason::TestOrDebugFile);
    assert!(matches!(reason_for(rejected, "tiny.md"), Reason::TooSmall(_)));
    assert_eq!(reason_for(rejected, "short_wide.md"), &Reason::TooShort(4999));
    assert_eq!(reason_for(rejected, "flat.md"), &Reason::TooFewChapters(1));
    assert!(matches!(reason_for(rejected, "broken.md"), Reason::ReadError(_)));

    // accepted books are written verbatim, shelved by category
    let kept = result
        .books
        .iter()
        .find(|b| b.filename == "a_original.md")
        .unwrap();
    assert_eq!(kept.title, "盗墓笔记之七星鲁王宫");
    assert_eq!(kept.category, Category::TombRaiding);
    assert_eq!(kept.chapter_count, 5);
    let archived = fs::read(config.books_dir().join(&kept.archive_path)).unwrap();
    assert_eq!(archived, original.as_bytes());

    let long = result
        .books
        .iter()
        .find(|b| b.filename == "long_flat.md")
        .unwrap();
    assert_eq!(long.chapter_count, 0);
    assert_eq!(long.category, Category::Other);
    assert!(config.books_dir().join("其他/long_flat.md").exists());

    // rejects are moved, keeping their relative layout
    assert_eq!(result.waste_moved, 6);
    assert!(config.waste_dir().join("mystery/b_reprint.md").exists());
    assert!(config.waste_dir().join("misc/broken.md").exists());
    assert!(!source.join("mystery/b_reprint.md").exists());
    assert!(source.join("mystery/a_original.md").exists());
    assert!(source.join("notes.txt").exists());

    // reports
    for name in [DELETION_REPORT, CATALOG, METADATA, REJECTIONS_CSV] {
        assert!(config.output_dir.join(name).exists(), "{} missing", name);
    }
    let report = fs::read_to_string(config.output_dir.join(DELETION_REPORT)).unwrap();
    assert!(report.contains("| b_reprint.md | duplicate of a_original.md |"));

    let metadata: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.output_dir.join(METADATA)).unwrap())
            .unwrap();
    assert_eq!(metadata["stats"]["total"], 8);
    assert_eq!(
        metadata["categories"]["盜墓探險"][0]["title"],
        "盗墓笔记之七星鲁王宫"
    );
}

#[test]
fn test_dry_run_touches_nothing() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    create_library(&source);
    let config = config_for(tmp.path());

    let result = SieveEngine::new(config.clone())
        .unwrap()
        .process(&SilentReporter, true)
        .unwrap();

    assert_eq!(result.stats.kept, 2);
    assert!(result.reports.is_none());
    assert_eq!(result.waste_moved, 0);
    assert!(!config.output_dir.exists());
    assert!(source.join("misc/tiny.md").exists());
    assert!(result
        .books
        .iter()
        .any(|b| b.archive_path == PathBuf::from("盜墓探險/盗墓笔记之七星鲁王宫.md")));
}

#[test]
fn test_first_in_path_order_is_canonical() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let body = novel("重生之路", 4, 15_000);
    write(&source, "z_last.md", &body);
    write(&source, "a_first.md", format!("{}尾声。", body));

    let config = config_for(tmp.path());
    let ctx = SieveEngine::new(config)
        .unwrap()
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(ctx.accepted.len(), 1);
    assert_eq!(ctx.accepted[0].filename, "a_first.md");
    assert_eq!(ctx.accepted[0].category, Category::WebFiction);
    assert_eq!(
        ctx.rejected[0].reason,
        Reason::DuplicateOf("a_first.md".to_string())
    );
}

#[test]
fn test_run_is_repeatable() {
    let tmp = tempdir().unwrap();
    create_library(&tmp.path().join("source"));
    let engine = SieveEngine::new(config_for(tmp.path())).unwrap();

    let first = engine.run(&SilentReporter).unwrap();
    let second = engine.run(&SilentReporter).unwrap();

    assert_eq!(first.stats, second.stats);
    assert_eq!(first.rejected, second.rejected);
    assert_eq!(first.accepted, second.accepted);
}

#[test]
fn test_inspect_single_file() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    create_library(&source);
    let engine = SieveEngine::new(config_for(tmp.path())).unwrap();

    match engine.inspect(&source.join("mystery/b_reprint.md")) {
        // judged alone, the reprint has nothing to duplicate
        Outcome::Accepted(book) => assert_eq!(book.category, Category::TombRaiding),
        Outcome::Rejected(record) => panic!("unexpected rejection: {}", record.reason),
    }
    match engine.inspect(&source.join("misc/test_debug_novel.md")) {
        Outcome::Rejected(record) => assert_eq!(record.reason, Reason::TestOrDebugFile),
        Outcome::Accepted(_) => panic!("blocklisted file accepted"),
    }
}

#[test]
fn test_report_failure_is_fatal() {
    let tmp = tempdir().unwrap();
    create_library(&tmp.path().join("source"));
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "a file where the output directory should be").unwrap();

    let config = AppConfig {
        source_dir: tmp.path().join("source"),
        output_dir: blocker,
        books_dir: Some(tmp.path().join("books")),
        waste_dir: Some(tmp.path().join("waste")),
        ..AppConfig::default()
    };

    let result = SieveEngine::new(config).unwrap().process(&SilentReporter, false);
    assert!(result.is_err());
}

#[test]
fn test_missing_source_dir_is_error() {
    let tmp = tempdir().unwrap();
    let engine = SieveEngine::new(config_for(tmp.path())).unwrap();
    assert!(engine.run(&SilentReporter).is_err());
}

#[test]
fn test_long_heading_still_archives() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let heading = "长".repeat(120);
    write(&source, "epic.md", novel(&heading, 5, 12_000));
    write(&source, "plain.md", novel("平凡的世界", 5, 12_000));
    write(&source, "tiny.md", "小");
    let config = config_for(tmp.path());

    let result = SieveEngine::new(config.clone())
        .unwrap()
        .process(&SilentReporter, false)
        .unwrap();

    assert_eq!(result.stats.kept, 2);
    let epic = result
        .books
        .iter()
        .find(|b| b.filename == "epic.md")
        .unwrap();
    assert_eq!(epic.title, heading);
    assert!(config.books_dir().join(&epic.archive_path).exists());
    assert_eq!(result.waste_moved, 1);
    assert!(!source.join("tiny.md").exists());
    assert!(result.reports.is_some());
    assert!(config.output_dir.join(METADATA).exists());
}

#[test]
fn test_search_after_process() {
    let tmp = tempdir().unwrap();
    create_library(&tmp.path().join("source"));
    let engine = SieveEngine::new(config_for(tmp.path())).unwrap();

    // nothing to search before the first full run
    assert!(engine.search("盗墓").is_err());

    engine.process(&SilentReporter, false).unwrap();
    let hits = engine.search("七星鲁王").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].category, Category::TombRaiding.label());
    assert_eq!(hits[0].entry.filename, "a_original.md");
    assert!(engine.search("LONG_FLAT").unwrap().len() == 1);
    assert!(engine.search("   ").unwrap().is_empty());
}
