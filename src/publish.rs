//! Handoff of a finished post to the persistence collaborator.
//!
//! Image bytes go to an [`ObjectStore`] under `posts/<uid>/<uuid>.jpg`; a [`PostDocument`]
//! pointing at the stored image goes to a [`DocumentStore`] collection named `posts`. Both
//! ports have in-memory adapters for tests and filesystem adapters used by the CLI.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;

use crate::foundation::error::{PhotostampError, PhotostampResult};

/// Document collection that receives posts.
pub const POSTS_COLLECTION: &str = "posts";

/// What the user typed and picked before posting.
///
/// Each draft carries an upload id fixed at creation, so every attempt to post the same draft
/// writes the same object key.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PostDraft {
    /// Free-text memo. Omitted from the document when blank.
    pub caption: Option<String>,
    /// Identifier of the checked-in location.
    pub location_id: String,
    /// Display name of the location.
    pub location_name: Option<String>,
    #[serde(skip, default = "uuid::Uuid::new_v4")]
    upload_id: uuid::Uuid,
}

impl PostDraft {
    /// Draft for `location_id` with no caption.
    pub fn new(location_id: impl Into<String>) -> Self {
        Self {
            caption: None,
            location_id: location_id.into(),
            location_name: None,
            upload_id: uuid::Uuid::new_v4(),
        }
    }

    /// Random id naming this draft's image object.
    pub fn upload_id(&self) -> uuid::Uuid {
        self.upload_id
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the location display name.
    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    fn caption_for_document(&self) -> Option<String> {
        self.caption
            .as_ref()
            .filter(|c| !c.trim().is_empty())
            .cloned()
    }
}

/// Signed-in identity posting the image.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Owner {
    /// Account id. Empty means signed out.
    pub uid: String,
}

impl Owner {
    /// Owner with `uid`.
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Metadata record stored for each post.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PostDocument {
    /// URL returned by the object store.
    pub image_url: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at_unix_ms: u64,
    /// Caption, when one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Checked-in location.
    pub location_id: String,
    /// Location display name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Posting account.
    pub uid: String,
}

impl PostDocument {
    /// Document for `draft` by `owner`, pointing at `image_url`.
    pub fn new(draft: &PostDraft, owner: &Owner, image_url: String, created_at_unix_ms: u64) -> Self {
        Self {
            image_url,
            created_at_unix_ms,
            caption: draft.caption_for_document(),
            location_id: draft.location_id.clone(),
            location_name: draft.location_name.clone(),
            uid: owner.uid.clone(),
        }
    }
}

/// Result of a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Object store key of the uploaded image.
    pub object_key: String,
    /// Where the image can be fetched.
    pub image_url: String,
    /// Id assigned by the document store.
    pub document_id: String,
    /// Stored document.
    pub document: PostDocument,
    /// Set when the raw photo was posted because the composite could not be produced.
    pub fallback_warning: Option<String>,
}

/// Blob storage for image bytes.
pub trait ObjectStore {
    /// Store `bytes` at `key` and return a URL for them.
    fn put(&mut self, key: &str, bytes: &[u8], content_type: &str) -> PhotostampResult<String>;
}

/// Metadata storage for post documents.
pub trait DocumentStore {
    /// Append `doc` to `collection` and return its id.
    fn add(&mut self, collection: &str, doc: &PostDocument) -> PhotostampResult<String>;
}

/// `posts/<uid>/<uuid-v4>.jpg`, with the draft's upload id.
pub fn object_key_for(owner: &Owner, draft: &PostDraft) -> String {
    format!("posts/{}/{}.jpg", owner.uid, draft.upload_id)
}

/// Milliseconds since the Unix epoch.
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Upload `image` and record a post document for it.
///
/// Refuses signed-out owners and drafts without a location before touching either store.
/// Store failures surface as [`PhotostampError::Submission`].
///
/// The upload is not rolled back when recording the document fails. Retrying with the same
/// draft overwrites that object instead of adding another one.
#[tracing::instrument(skip_all, fields(location = %draft.location_id, bytes = image.len()))]
pub fn publish(
    image: &[u8],
    content_type: &str,
    draft: &PostDraft,
    owner: &Owner,
    objects: &mut dyn ObjectStore,
    docs: &mut dyn DocumentStore,
) -> PhotostampResult<SubmitReceipt> {
    if owner.uid.trim().is_empty() {
        return Err(PhotostampError::submission("not signed in"));
    }
    if draft.location_id.trim().is_empty() {
        return Err(PhotostampError::validation("post needs a location id"));
    }

    let object_key = object_key_for(owner, draft);
    let image_url = objects
        .put(&object_key, image, content_type)
        .map_err(as_submission)?;

    let document = PostDocument::new(draft, owner, image_url.clone(), now_unix_ms());
    let document_id = docs
        .add(POSTS_COLLECTION, &document)
        .map_err(as_submission)?;

    tracing::info!(%object_key, %document_id, "post published");
    Ok(SubmitReceipt {
        object_key,
        image_url,
        document_id,
        document,
        fallback_warning: None,
    })
}

fn as_submission(e: PhotostampError) -> PhotostampError {
    match e {
        PhotostampError::Submission(_) => e,
        other => PhotostampError::submission(other.to_string()),
    }
}

/// One object held by [`InMemoryObjectStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Stored bytes.
    pub bytes: Vec<u8>,
    /// Declared content type.
    pub content_type: String,
}

/// Object store kept in memory; URLs are `mem://<key>`.
#[derive(Clone, Debug, Default)]
pub struct InMemoryObjectStore {
    objects: BTreeMap<String, StoredObject>,
}

impl InMemoryObjectStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Object at `key`.
    pub fn get(&self, key: &str) -> Option<&StoredObject> {
        self.objects.get(key)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `true` when nothing was stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&mut self, key: &str, bytes: &[u8], content_type: &str) -> PhotostampResult<String> {
        self.objects.insert(
            key.to_owned(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_owned(),
            },
        );
        Ok(format!("mem://{key}"))
    }
}

/// One document as persisted by a [`DocumentStore`] adapter.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredDocument {
    /// Collection name.
    pub collection: String,
    /// Assigned id.
    pub id: String,
    /// Document body.
    pub document: PostDocument,
}

/// Document store kept in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    docs: Vec<StoredDocument>,
}

impl InMemoryDocumentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents in `collection`, oldest first.
    pub fn collection(&self, collection: &str) -> Vec<&StoredDocument> {
        self.docs
            .iter()
            .filter(|d| d.collection == collection)
            .collect()
    }

    /// Total number of documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn add(&mut self, collection: &str, doc: &PostDocument) -> PhotostampResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.docs.push(StoredDocument {
            collection: collection.to_owned(),
            id: id.clone(),
            document: doc.clone(),
        });
        Ok(id)
    }
}

/// Object store writing each key as a file below a root directory.
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path for `key`, rejecting keys that would escape the root.
    pub fn path_for(&self, key: &str) -> PhotostampResult<PathBuf> {
        let rel = Path::new(key);
        let safe = !key.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(PhotostampError::submission(format!(
                "object key '{key}' is not a relative path"
            )));
        }
        Ok(self.root.join(rel))
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&mut self, key: &str, bytes: &[u8], _content_type: &str) -> PhotostampResult<String> {
        let path = self.path_for(key)?;
        let write = || -> anyhow::Result<PathBuf> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create '{}'", parent.display()))?;
            }
            fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
            Ok(fs::canonicalize(&path).unwrap_or_else(|_| path.clone()))
        };
        let abs = write().map_err(|e| PhotostampError::submission(format!("{e:#}")))?;
        Ok(format!("file://{}", abs.display()))
    }
}

/// Document store appending one JSON object per line to a file.
#[derive(Clone, Debug)]
pub struct JsonlDocumentStore {
    path: PathBuf,
}

impl JsonlDocumentStore {
    /// Store appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored document back. A missing file is an empty store.
    pub fn load(&self) -> PhotostampResult<Vec<StoredDocument>> {
        let f = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("open '{}'", self.path.display()))
                    .into());
            }
        };
        let mut out = Vec::new();
        for (n, line) in BufReader::new(f).lines().enumerate() {
            let line = line.with_context(|| format!("read '{}'", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let doc = serde_json::from_str(&line).map_err(|e| {
                PhotostampError::validation(format!(
                    "'{}' line {}: {e}",
                    self.path.display(),
                    n + 1
                ))
            })?;
            out.push(doc);
        }
        Ok(out)
    }
}

impl DocumentStore for JsonlDocumentStore {
    fn add(&mut self, collection: &str, doc: &PostDocument) -> PhotostampResult<String> {
        let stored = StoredDocument {
            collection: collection.to_owned(),
            id: uuid::Uuid::new_v4().simple().to_string(),
            document: doc.clone(),
        };
        let append = || -> anyhow::Result<()> {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create '{}'", parent.display()))?;
            }
            let mut f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .with_context(|| format!("open '{}'", self.path.display()))?;
            let mut line = serde_json::to_vec(&stored).context("serialize post document")?;
            line.push(b'\n');
            f.write_all(&line)
                .with_context(|| format!("append '{}'", self.path.display()))?;
            Ok(())
        };
        append().map_err(|e| PhotostampError::submission(format!("{e:#}")))?;
        Ok(stored.id)
    }
}

#[cfg(test)]
#[path = "../tests/unit/publish.rs"]
mod tests;
