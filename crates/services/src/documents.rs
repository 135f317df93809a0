//! Document listing service: refresh, aggregation, and lazy detailed
//! summaries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use study_core::model::{Document, DocumentGroups, UserId};

use crate::error::ApiError;
use crate::gateway::DocumentApi;

/// Shown when neither a detailed nor a short summary is available.
pub const SUMMARY_PLACEHOLDER: &str = "Summary not available";

/// Monotonic counter used to discard responses of superseded requests.
///
/// There is no cancellation for in-flight calls; instead each refresh takes a
/// new generation token, and a response is only applied while its token is
/// still the latest.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Starts a new request generation and returns its token.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while no newer request has started since `token` was taken.
    #[must_use]
    pub fn is_current(&self, token: u64) -> bool {
        self.0.load(Ordering::SeqCst) == token
    }
}

/// In-memory view of the user's document corpus for one page session.
///
/// The remote listing is the source of truth; [`refresh`](Self::refresh)
/// replaces the whole view and recomputes the aggregation, nothing is
/// maintained incrementally.
pub struct DocumentService {
    api: Arc<dyn DocumentApi>,
    user: UserId,
    groups: DocumentGroups,
    catalog: Vec<Document>,
    detailed_summaries: HashMap<String, String>,
    generation: Generation,
}

impl DocumentService {
    #[must_use]
    pub fn new(api: Arc<dyn DocumentApi>, user: UserId) -> Self {
        Self {
            api,
            user,
            groups: DocumentGroups::default(),
            catalog: Vec::new(),
            detailed_summaries: HashMap::new(),
            generation: Generation::default(),
        }
    }

    /// The grouped listing as last fetched.
    #[must_use]
    pub fn groups(&self) -> &DocumentGroups {
        &self.groups
    }

    /// The de-duplicated aggregation of the last fetched listing.
    #[must_use]
    pub fn catalog(&self) -> &[Document] {
        &self.catalog
    }

    /// True when the user has no documents at all. Render as an empty state,
    /// not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Re-fetches the grouped listing and recomputes the aggregation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the listing call fails; the previous view is
    /// kept untouched.
    pub async fn refresh(&mut self) -> Result<&[Document], ApiError> {
        let (token, groups) = self.fetch_listing().await;
        self.apply_listing(token, groups?);
        Ok(&self.catalog)
    }

    /// Starts a listing fetch that can run detached from the service.
    ///
    /// The returned future resolves to the generation token taken at call
    /// time and the fetched listing; the caller hands both to
    /// [`apply_listing`](Self::apply_listing). Callers that spawn several
    /// fetches may see them complete out of order.
    pub fn fetch_listing(
        &self,
    ) -> impl Future<Output = (u64, Result<DocumentGroups, ApiError>)> + Send + 'static {
        let token = self.generation.begin();
        let api = Arc::clone(&self.api);
        let user = self.user.clone();
        async move { (token, api.fetch_documents(&user).await) }
    }

    /// Applies a fetched listing and recomputes the aggregation.
    ///
    /// A listing whose token has been superseded by a newer fetch is dropped
    /// so stale data never overwrites the current view. Returns whether the
    /// listing was applied.
    pub fn apply_listing(&mut self, token: u64, groups: DocumentGroups) -> bool {
        if !self.generation.is_current(token) {
            debug!("discarding superseded document listing");
            return false;
        }
        self.groups = groups;
        self.catalog = self.groups.aggregate();
        debug!(documents = self.catalog.len(), "document listing refreshed");
        true
    }

    /// Returns the detailed summary for a document, fetching it on first use
    /// and caching it by filename.
    ///
    /// Never fails from the caller's perspective: on a remote error this
    /// falls back to the document's short summary, or to a fixed placeholder.
    pub async fn detailed_summary(&mut self, filename: &str) -> String {
        if let Some(cached) = self.detailed_summaries.get(filename) {
            return cached.clone();
        }
        match self.api.generate_summary(&self.user, filename).await {
            Ok(summary) => {
                self.detailed_summaries
                    .insert(filename.to_string(), summary.clone());
                summary
            }
            Err(err) => {
                warn!(filename, %err, "detailed summary fetch failed, falling back");
                self.groups
                    .find(filename)
                    .and_then(|doc| doc.summary.clone())
                    .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string())
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
