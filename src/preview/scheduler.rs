use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::assets::catalog::StampCatalog;
use crate::assets::photo::BasePhoto;
use crate::editor::store::{Stamp, StoreEvent, StoreObserver};
use crate::foundation::error::{PhotostampError, PhotostampResult};
use crate::render::compose::{ComposedImage, Compositor};
use crate::render::fingerprint::{ComposeFingerprint, fingerprint_compose};

/// Monotonic preview request token. Larger is newer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// What the preview shows.
#[derive(Clone, Debug)]
pub enum PreviewImage {
    /// Composite of the photo and stamps.
    Composed(ComposedImage),
    /// The photo could not be composed; show it undecorated.
    Fallback {
        /// Raw captured photo.
        photo: BasePhoto,
        /// Non-fatal warning for the UI.
        warning: String,
    },
}

impl PreviewImage {
    /// Encoded bytes to display.
    pub fn display_bytes(&self) -> &[u8] {
        match self {
            PreviewImage::Composed(img) => &img.encoded,
            PreviewImage::Fallback { photo, .. } => photo.bytes(),
        }
    }

    /// `true` when showing the raw photo.
    pub fn is_fallback(&self) -> bool {
        matches!(self, PreviewImage::Fallback { .. })
    }
}

/// A finished preview accepted for display.
#[derive(Clone, Debug)]
pub struct PreviewFrame {
    /// Request that produced it.
    pub token: RequestToken,
    /// Inputs it was rendered from.
    pub fingerprint: ComposeFingerprint,
    /// The image.
    pub image: PreviewImage,
}

/// Counters for observability and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewStats {
    /// Renders issued.
    pub requested: u64,
    /// Requests skipped because inputs matched the latest request.
    pub skipped_unchanged: u64,
    /// Results accepted for display.
    pub applied: u64,
    /// Results dropped because a newer request existed.
    pub discarded: u64,
}

/// One issued preview render, not yet executed.
#[derive(Clone, Debug)]
pub struct PreviewJob {
    token: RequestToken,
    fingerprint: ComposeFingerprint,
    photo: BasePhoto,
    stamps: Vec<Stamp>,
}

impl PreviewJob {
    /// Token assigned when the job was issued.
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Fingerprint of the job's inputs.
    pub fn fingerprint(&self) -> ComposeFingerprint {
        self.fingerprint
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    shown: Option<Arc<PreviewFrame>>,
    last_requested: Option<ComposeFingerprint>,
    in_flight: usize,
    stats: PreviewStats,
}

#[derive(Debug)]
struct Inner {
    compositor: Compositor,
    catalog: Arc<StampCatalog>,
    // Written only while `state` is held, so issue and accept checks are ordered.
    latest: AtomicU64,
    state: Mutex<SchedulerState>,
    idle: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn execute(&self, job: PreviewJob) -> PhotostampResult<Arc<PreviewFrame>> {
        let image = match self.compositor.compose(&job.photo, &job.stamps, &self.catalog) {
            Ok(img) => PreviewImage::Composed(img),
            Err(e) => {
                tracing::warn!(token = job.token.0, error = %e, "preview compose failed; showing raw photo");
                PreviewImage::Fallback {
                    photo: job.photo,
                    warning: e.to_string(),
                }
            }
        };
        self.complete(job.token, job.fingerprint, image)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(token = token.0))]
    fn complete(
        &self,
        token: RequestToken,
        fingerprint: ComposeFingerprint,
        image: PreviewImage,
    ) -> PhotostampResult<Arc<PreviewFrame>> {
        let mut st = self.lock();
        let latest = self.latest.load(Ordering::SeqCst);
        if token.0 != latest {
            st.stats.discarded += 1;
            tracing::debug!(latest, "discarding stale preview");
            return Err(PhotostampError::stale(token.0, latest));
        }
        let frame = Arc::new(PreviewFrame {
            token,
            fingerprint,
            image,
        });
        st.shown = Some(Arc::clone(&frame));
        st.stats.applied += 1;
        Ok(frame)
    }
}

/// Renders previews on a background pool and only ever displays the newest request.
///
/// Every issued request gets a strictly increasing [`RequestToken`]. A result is accepted only
/// if its token is still the latest when it completes; anything older is discarded with
/// [`PhotostampError::StaleRender`], regardless of completion order. Requesting never blocks on
/// rendering.
#[derive(Clone, Debug)]
pub struct PreviewScheduler {
    inner: Arc<Inner>,
    pool: Arc<rayon::ThreadPool>,
}

impl PreviewScheduler {
    /// Scheduler rendering with `compositor` on a pool of `threads` workers.
    pub fn new(
        compositor: Compositor,
        catalog: Arc<StampCatalog>,
        threads: usize,
    ) -> PhotostampResult<Self> {
        Ok(Self {
            inner: Arc::new(Inner {
                compositor,
                catalog,
                latest: AtomicU64::new(0),
                state: Mutex::new(SchedulerState::default()),
                idle: Condvar::new(),
            }),
            pool: Arc::new(build_thread_pool(threads)?),
        })
    }

    /// Issue a token for rendering `stamps` over `photo` without running it.
    ///
    /// Returns `None` when the inputs equal the latest request's inputs.
    pub fn prepare(&self, photo: &BasePhoto, stamps: &[Stamp]) -> Option<PreviewJob> {
        let fingerprint =
            fingerprint_compose(photo, stamps, self.inner.compositor.settings());
        let mut st = self.inner.lock();
        if st.last_requested == Some(fingerprint) {
            st.stats.skipped_unchanged += 1;
            return None;
        }
        st.last_requested = Some(fingerprint);
        st.stats.requested += 1;
        let token = RequestToken(self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1);
        Some(PreviewJob {
            token,
            fingerprint,
            photo: photo.clone(),
            stamps: stamps.to_vec(),
        })
    }

    /// Issue a render and run it on the pool.
    pub fn request(&self, photo: &BasePhoto, stamps: &[Stamp]) -> Option<RequestToken> {
        let job = self.prepare(photo, stamps)?;
        let token = job.token;
        self.inner.lock().in_flight += 1;

        // Pool jobs hold only the shared state, never the pool itself.
        let inner = Arc::clone(&self.inner);
        self.pool.spawn(move || {
            // Staleness is expected here and already logged.
            let _ = inner.execute(job);
            let mut st = inner.lock();
            st.in_flight = st.in_flight.saturating_sub(1);
            if st.in_flight == 0 {
                inner.idle.notify_all();
            }
        });
        Some(token)
    }

    /// Render `job` on the calling thread and hand the result to [`Self::complete`].
    ///
    /// Compose failures never propagate: they produce a fallback preview of the raw photo.
    pub fn execute(&self, job: PreviewJob) -> PhotostampResult<Arc<PreviewFrame>> {
        self.inner.execute(job)
    }

    /// Offer a finished render for display.
    ///
    /// Accepted only if `token` is the latest issued token.
    pub fn complete(
        &self,
        token: RequestToken,
        fingerprint: ComposeFingerprint,
        image: PreviewImage,
    ) -> PhotostampResult<Arc<PreviewFrame>> {
        self.inner.complete(token, fingerprint, image)
    }

    /// Supersede every outstanding request and clear the shown preview.
    pub fn invalidate(&self) {
        let mut st = self.inner.lock();
        self.inner.latest.fetch_add(1, Ordering::SeqCst);
        st.shown = None;
        st.last_requested = None;
    }

    /// Preview currently accepted for display.
    pub fn latest_preview(&self) -> Option<Arc<PreviewFrame>> {
        self.inner.lock().shown.clone()
    }

    /// Newest issued token, if any.
    pub fn latest_token(&self) -> Option<RequestToken> {
        match self.inner.latest.load(Ordering::SeqCst) {
            0 => None,
            t => Some(RequestToken(t)),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> PreviewStats {
        self.inner.lock().stats
    }

    /// Block until every render spawned by [`Self::request`] has finished.
    pub fn wait_idle(&self) {
        let mut st = self.inner.lock();
        while st.in_flight > 0 {
            st = self
                .inner
                .idle
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Store subscriber that schedules a preview of `photo` after every change.
#[derive(Clone, Debug)]
pub struct PreviewObserver {
    scheduler: PreviewScheduler,
    photo: BasePhoto,
}

impl PreviewObserver {
    /// Observer feeding `scheduler`.
    pub fn new(scheduler: PreviewScheduler, photo: BasePhoto) -> Self {
        Self { scheduler, photo }
    }
}

impl StoreObserver for PreviewObserver {
    fn on_change(&mut self, event: &StoreEvent, stamps: &[Stamp]) {
        if let Some(token) = self.scheduler.request(&self.photo, stamps) {
            tracing::trace!(?event, token = token.0, "preview requested");
        }
    }
}

fn build_thread_pool(threads: usize) -> PhotostampResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(PhotostampError::validation(
            "preview threads must be >= 1",
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("photostamp-preview-{i}"))
        .build()
        .map_err(|e| PhotostampError::validation(format!("failed to build preview pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/preview/scheduler.rs"]
mod tests;
