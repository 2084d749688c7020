//! Pagination driver.
//!
//! Follows the search endpoint's continuation cursors one page at a time and
//! streams every asset through the flattener into the CSV sink. Pages are
//! fetched strictly in sequence because a cursor chain cannot be shared.

use crate::cloudinary::{ApiError, SearchApi};
use crate::format::{CsvSink, FormattingError};
use crate::metadata::ValueLookupTable;
use crate::model::{ExportConfiguration, SearchRequest};
use crate::record::{export_columns, flatten};
use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0}")]
    Output(#[from] FormattingError),
    #[error("search request for page {page} failed after {rows_written} rows were written: {source}")]
    Search {
        page: u64,
        rows_written: u64,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: u64,
    pub pages: u64,
    pub output_path: PathBuf,
}

/// Run one export.
///
/// The output file is opened before the first request so filesystem problems
/// surface without touching the network. The file is closed on every path;
/// after a failed request it keeps the header and every row written so far.
pub async fn run_export<S>(
    api: &S,
    config: &ExportConfiguration,
    lookup: &ValueLookupTable,
    progress: &ProgressBar,
) -> Result<ExportSummary, ExportError>
where
    S: SearchApi + ?Sized,
{
    let mut sink = CsvSink::open(config.output_path(), export_columns(config))?;
    debug!(
        "Exporting cloud {} to {}",
        config.credentials().cloud_name(),
        config.output_path().display()
    );

    let outcome = export_pages(api, config, lookup, &mut sink, progress).await;
    let closed = sink.close();

    match (outcome, closed) {
        (Ok(pages), Ok(rows)) => {
            info!("Exported {} assets in {} pages", rows, pages);
            Ok(ExportSummary {
                rows,
                pages,
                output_path: config.output_path().to_path_buf(),
            })
        }
        (Ok(_), Err(e)) => Err(ExportError::Output(e)),
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(close_error)) => {
            error!("Failed to close {}: {}", config.output_path().display(), close_error);
            Err(e)
        }
    }
}

/// Page loop. Returns the number of pages fetched.
pub async fn export_pages<S>(
    api: &S,
    config: &ExportConfiguration,
    lookup: &ValueLookupTable,
    sink: &mut CsvSink,
    progress: &ProgressBar,
) -> Result<u64, ExportError>
where
    S: SearchApi + ?Sized,
{
    let search_fields = config.search_fields();
    let mut cursor: Option<String> = None;
    let mut pages: u64 = 0;

    loop {
        let request = SearchRequest::new(config.search_expression())
            .with_fields(search_fields.clone())
            .with_cursor(cursor.take());

        trace!("Requesting page {}...", pages + 1);
        let page = match api.search(&request).await {
            Ok(page) => page,
            Err(source) => {
                error!(
                    "Search failed on page {} after {} rows: {}",
                    pages + 1,
                    sink.rows(),
                    source
                );
                if let Err(flush_error) = sink.flush() {
                    warn!("Failed to flush rows before aborting: {}", flush_error);
                }
                return Err(ExportError::Search {
                    page: pages + 1,
                    rows_written: sink.rows(),
                    source,
                });
            }
        };
        pages += 1;

        for asset in &page.resources {
            sink.write(&flatten(asset, config, lookup))?;
            progress.inc(1);
        }
        sink.flush()?;

        debug!(
            "Page {}: {} assets, {} rows so far",
            pages,
            page.resources.len(),
            sink.rows()
        );
        progress.set_message(format!("page {}", pages));

        match page.cursor() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    Ok(pages)
}
