//! Monthly report fetching.

use std::sync::Arc;

use playreports_core::{ReportFile, ReportKind, ReportMonth, ReportSet, ReportsError};
use tracing::{debug, info, instrument, warn};

use crate::host::storage::{ObjectRef, ObjectStore};
use crate::unpack::Unpacker;

/// Downloads the earnings and sales reports of one month.
///
/// Sales objects for the following month are included as well: their
/// transactions can settle into the requested earnings period.
#[derive(Clone)]
pub struct ReportFetcher {
    store: Arc<dyn ObjectStore>,
    unpacker: Unpacker,
}

impl ReportFetcher {
    /// Creates a fetcher over an authorized object store.
    pub fn new(store: Arc<dyn ObjectStore>, unpacker: Unpacker) -> Self {
        Self { store, unpacker }
    }

    /// Fetches every report for `month` from `bucket`.
    ///
    /// Fails with a not-found error when no earnings report exists. Sales may
    /// be empty.
    #[instrument(skip(self), fields(month = %month))]
    pub async fn fetch(&self, bucket: &str, month: ReportMonth) -> Result<ReportSet, ReportsError> {
        let mut reports = ReportSet::new(month);

        self.fetch_kind(bucket, ReportKind::Earnings, month, &mut reports)
            .await?;
        if reports.earnings().is_empty() {
            return Err(ReportsError::NotFound(format!(
                "no earnings report for requested date ({month})"
            )));
        }

        self.fetch_kind(bucket, ReportKind::Sales, month, &mut reports)
            .await?;
        match month.next() {
            Some(next) => {
                self.fetch_kind(bucket, ReportKind::Sales, next, &mut reports)
                    .await?;
            }
            None => warn!(month = %month, "No month follows the requested one"),
        }

        info!(
            earnings = reports.earnings().len(),
            sales = reports.sales().len(),
            "Reports fetched"
        );
        Ok(reports)
    }

    async fn fetch_kind(
        &self,
        bucket: &str,
        kind: ReportKind,
        month: ReportMonth,
        reports: &mut ReportSet,
    ) -> Result<(), ReportsError> {
        let prefix = kind.object_prefix(month);
        let objects = self.store.list(bucket, &prefix).await?;
        debug!(prefix = %prefix, count = objects.len(), "Listed report objects");

        for object in &objects {
            let file = self.download(bucket, object).await?;
            reports.push(kind, file);
        }
        Ok(())
    }

    async fn download(&self, bucket: &str, object: &ObjectRef) -> Result<ReportFile, ReportsError> {
        let bytes = self.store.download(bucket, &object.name).await?;
        debug!(object = %object.name, bytes = bytes.len(), "Downloaded report object");

        let (path, original_name) = self.unpacker.unpack(&bytes)?;
        Ok(ReportFile::new(path, &object.name, original_name))
    }
}

impl std::fmt::Debug for ReportFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportFetcher")
            .field("unpacker", &self.unpacker)
            .finish_non_exhaustive()
    }
}
