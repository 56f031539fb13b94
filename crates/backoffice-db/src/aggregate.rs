//! # Aggregation Engine
//!
//! Assembles nested records (a header plus its line items) when the lines
//! of each header come from a separate query. Instead of N sequential
//! round trips, one task per header fetches that header's lines and all
//! tasks are joined before the call returns.
//!
//! ## Fan-out / Fan-in
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  headers = SELECT ... ORDER BY id      [ R1 , R2 , R3 , R4 ]            │
//! │                                          │    │    │    │               │
//! │  fan out (JoinSet, one task each)        ▼    ▼    ▼    ▼               │
//! │                                        fetch fetch fetch fetch          │
//! │                                          │    │    │    │   any order   │
//! │  commit under one Mutex                  ▼    ▼    ▼    ▼               │
//! │  slots                                 [ L1 , L2 , L3 , L4 ]            │
//! │                                                                         │
//! │  fan in: join EVERY task, then                                          │
//! │    ├── any task failed → first error, slots discarded                   │
//! │    └── all succeeded   → header[i].attach(slot[i])                      │
//! │                                                                         │
//! │  result                                [ R1+L1, R2+L2, R3+L3, R4+L4 ]   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! A failing fetch does not cancel its siblings: every task runs to
//! completion and the first error observed while joining is returned.
//! Results of the other tasks are dropped, so callers get either every
//! header fully populated or nothing.
//!
//! No timeout is applied here; a slow line query delays the whole call and
//! the HTTP layer's request timeout bounds it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use backoffice_core::{FullReceipt, FullSupplierOrder, ReceiptLine, SupplierOrderLine};

use crate::error::{DbError, DbResult};

// =============================================================================
// Header
// =============================================================================

/// A parent record whose children are fetched separately.
pub trait Header: Send + 'static {
    type Child: Send + 'static;

    /// Identity passed to the child fetch.
    fn key(&self) -> i64;

    /// Stores the fetched children on the header.
    fn attach(&mut self, children: Vec<Self::Child>);
}

impl Header for FullReceipt {
    type Child = ReceiptLine;

    fn key(&self) -> i64 {
        self.id
    }

    fn attach(&mut self, children: Vec<ReceiptLine>) {
        self.products = children;
    }
}

impl Header for FullSupplierOrder {
    type Child = SupplierOrderLine;

    fn key(&self) -> i64 {
        self.id
    }

    fn attach(&mut self, children: Vec<SupplierOrderLine>) {
        self.supplier_order_items = children;
    }
}

// =============================================================================
// Engine
// =============================================================================

type Slots<C> = Arc<Mutex<Vec<Option<Vec<C>>>>>;

/// Fetches the children of every header concurrently and attaches them,
/// keeping the input order of `headers`.
///
/// `fetch` is called once per header, on the calling task, to build the
/// child query future; each future then runs on its own spawned task.
pub async fn fan_out<H, F, Fut>(mut headers: Vec<H>, fetch: F) -> DbResult<Vec<H>>
where
    H: Header,
    F: Fn(i64) -> Fut,
    Fut: Future<Output = DbResult<Vec<H::Child>>> + Send + 'static,
{
    if headers.is_empty() {
        return Ok(headers);
    }

    let slots: Slots<H::Child> = Arc::new(Mutex::new(
        std::iter::repeat_with(|| None).take(headers.len()).collect(),
    ));

    let mut tasks = JoinSet::new();
    for (index, header) in headers.iter().enumerate() {
        let key = header.key();
        let children = fetch(key);
        let slots = Arc::clone(&slots);

        tasks.spawn(async move {
            let children = children
                .await
                .map_err(|err| err.in_operation(format!("fetch lines of {key}")))?;
            slots.lock().await[index] = Some(children);
            Ok::<(), DbError>(())
        });
    }

    debug!(tasks = tasks.len(), "Line fetches spawned");

    let mut first_error: Option<DbError> = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined
            .unwrap_or_else(|err| Err(DbError::Internal(format!("line fetch task failed: {err}"))));

        if let Err(err) = outcome {
            if first_error.is_none() {
                first_error = Some(err);
            } else {
                warn!(error = %err, "Additional line fetch failure discarded");
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    let slots = Arc::try_unwrap(slots)
        .map_err(|_| DbError::Internal("line slots still shared after join".to_string()))?
        .into_inner();

    for (header, slot) in headers.iter_mut().zip(slots) {
        let key = header.key();
        let children = slot.ok_or_else(|| {
            DbError::Internal(format!("no lines recorded for header {key}"))
        })?;
        header.attach(children);
    }

    Ok(headers)
}

// =============================================================================
// Unit Tests
// =============================================================================
