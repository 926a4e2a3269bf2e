pub mod report;
pub mod waste;
pub mod writer;

pub use report::{search_library, CatalogEntry, ReportPaths, ReportWriter, SearchHit};
pub use waste::move_to_waste;
pub use writer::{sanitize_title, ArchiveWriter, ArchivedBook};
