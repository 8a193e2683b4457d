//! ============================================================================
//! Upload & Classification Pipeline
//! ============================================================================
//! Two entry points:
//! - [`classify_single`]: one photo, result returned for user confirmation.
//!   Never fails; a broken AI call degrades to an "Other / Unknown" item.
//! - [`classify_batch`]: many files through a bounded-concurrency queue.
//!   Non-images are skipped, successes are committed immediately, failures
//!   are logged and counted, and the batch always runs to the end.
//! ============================================================================

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::StylistBackend;
use crate::state::{Action, AppState};
use crate::types::{ClothingItem, ImageData, ItemAnalysis, WardrobeError};

/// A file picked by the user, before we know whether it is an image
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Mime type if this looks like an image, by magic bytes then extension
    pub fn image_mime(&self) -> Option<&'static str> {
        sniff_image(&self.bytes).or_else(|| mime_from_extension(&self.name))
    }

    pub fn into_image(self) -> Option<ImageData> {
        let mime = self.image_mime()?;
        Some(ImageData::new(mime, self.bytes))
    }
}

fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [_, _, _, _, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c', ..] => Some("image/heic"),
        _ => None,
    }
}

fn mime_from_extension(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" | "heif" => Some("image/heic"),
        _ => None,
    }
}

/// Classify and build an item, propagating AI failures
async fn analyze(
    backend: &dyn StylistBackend,
    image: ImageData,
) -> Result<ClothingItem, WardrobeError> {
    let analysis = backend.classify_item(&image).await?;
    Ok(ClothingItem::from_analysis(image, analysis))
}

/// Single-photo path. The returned item is *not* committed; the caller shows
/// it for confirmation and dispatches `Action::AddItem` itself.
pub async fn classify_single(backend: &dyn StylistBackend, image: ImageData) -> ClothingItem {
    match backend.classify_item(&image).await {
        Ok(analysis) => ClothingItem::from_analysis(image, analysis),
        Err(e) => {
            warn!("Classification failed, falling back to defaults: {}", e);
            ClothingItem::from_analysis(image, ItemAnalysis::default())
        }
    }
}

/// Queue policy for bulk uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPolicy {
    /// Maximum classifications in flight. 1 keeps requests strictly sequential.
    pub concurrency: usize,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Result for one file of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Added { item_id: String },
    Skipped,
    Failed { error: String },
}

/// Progress event emitted once per file, in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchProgress {
    pub index: usize,
    pub total: usize,
    pub file_name: String,
    pub outcome: ItemOutcome,
}

/// Aggregate result of a bulk upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Bulk upload: skip non-images, classify the rest through a bounded queue,
/// commit each success as soon as it arrives.
pub async fn classify_batch<F>(
    backend: &dyn StylistBackend,
    state: &mut AppState,
    files: Vec<UploadFile>,
    policy: BatchPolicy,
    mut on_progress: F,
) -> BatchReport
where
    F: FnMut(&BatchProgress),
{
    let total = files.len();
    let mut report = BatchReport {
        total,
        ..BatchReport::default()
    };

    info!(
        "Bulk upload of {} files (concurrency {})",
        total,
        policy.concurrency.max(1)
    );

    // `buffered` keeps output in input order, so progress stays linear even
    // when more than one request is in flight.
    let mut results = stream::iter(files.into_iter().enumerate())
        .map(|(index, file)| async move {
            let name = file.name.clone();
            let outcome = match file.into_image() {
                Some(image) => Some(analyze(backend, image).await),
                None => None,
            };
            (index, name, outcome)
        })
        .buffered(policy.concurrency.max(1));

    while let Some((index, file_name, outcome)) = results.next().await {
        let outcome = match outcome {
            None => {
                report.skipped += 1;
                ItemOutcome::Skipped
            }
            Some(Ok(item)) => {
                let item_id = item.id.clone();
                match state.dispatch(Action::AddItem(item)) {
                    Ok(()) => {
                        report.succeeded += 1;
                        ItemOutcome::Added { item_id }
                    }
                    Err(e) => {
                        warn!("Could not commit {}: {}", file_name, e);
                        report.failed += 1;
                        ItemOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
            Some(Err(e)) => {
                warn!("Classification of {} failed: {}", file_name, e);
                report.failed += 1;
                ItemOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        on_progress(&BatchProgress {
            index,
            total,
            file_name,
            outcome,
        });
    }

    info!(
        "Bulk upload finished: {} added, {} failed, {} skipped",
        report.succeeded, report.failed, report.skipped
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fake::FakeStylist;
    use crate::state::tests::onboarded;
    use crate::types::Category;
    use std::sync::atomic::Ordering;

    fn png(marker: u8) -> Vec<u8> {
        vec![0x89, b'P', b'N', b'G', marker]
    }

    #[test]
    fn test_image_detection() {
        assert_eq!(UploadFile::new("a.bin", png(1)).image_mime(), Some("image/png"));
        assert_eq!(
            UploadFile::new("a.bin", vec![0xFF, 0xD8, 0xFF, 0xE0]).image_mime(),
            Some("image/jpeg")
        );
        assert_eq!(UploadFile::new("IMG.JPEG", vec![0]).image_mime(), Some("image/jpeg"));
        assert_eq!(UploadFile::new("notes.txt", b"hello".to_vec()).image_mime(), None);
        assert_eq!(UploadFile::new("noext", vec![]).image_mime(), None);
    }

    #[tokio::test]
    async fn test_single_falls_back_to_unknown() {
        let mut backend = FakeStylist::default();
        backend.fail_markers.insert(0x89);
        let item = classify_single(&backend, ImageData::new("image/png", png(1))).await;
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.sub_category, "Unknown");
        assert_eq!(item.image.bytes, png(1));
    }

    #[tokio::test]
    async fn test_single_does_not_commit() {
        let backend = FakeStylist::default();
        let state = onboarded();
        let item = classify_single(&backend, ImageData::new("image/png", vec![5])).await;
        assert_eq!(item.category, Category::Top);
        assert!(state.items().is_empty());
    }

    #[tokio::test]
    async fn test_batch_skips_non_images_and_survives_failures() {
        let mut backend = FakeStylist::default();
        // JPEG magic starts with 0xFF: make every JPEG fail
        backend.fail_markers.insert(0xFF);
        let mut state = onboarded();

        let files = vec![
            UploadFile::new("one.png", png(1)),
            UploadFile::new("readme.txt", b"text".to_vec()),
            UploadFile::new("broken.jpg", vec![0xFF, 0xD8, 0xFF, 0x00]),
            UploadFile::new("two.png", png(2)),
            UploadFile::new("data.csv", b"a,b".to_vec()),
        ];
        let n = files.len();
        let k = 2;

        let mut events = Vec::new();
        let report = classify_batch(
            &backend,
            &mut state,
            files,
            BatchPolicy::default(),
            |p| events.push((p.index, p.outcome.clone())),
        )
        .await;

        assert_eq!(report.total, n);
        assert_eq!(report.skipped, k);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 2);
        assert!(report.succeeded <= n - k);
        assert_eq!(state.items().len(), 2);
        assert_eq!(backend.classify_calls.load(Ordering::SeqCst), 3);

        let order: Vec<usize> = events.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(events[1].1, ItemOutcome::Skipped);
        assert!(matches!(events[2].1, ItemOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_batch_with_wider_queue_keeps_order() {
        let backend = FakeStylist::default();
        let mut state = onboarded();
        let files = (1..=6).map(|i| UploadFile::new(format!("{}.png", i), png(i))).collect();

        let mut seen = Vec::new();
        let report = classify_batch(
            &backend,
            &mut state,
            files,
            BatchPolicy { concurrency: 3 },
            |p| seen.push(p.index),
        )
        .await;

        assert_eq!(report.succeeded, 6);
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        let subs: Vec<_> = state.items().iter().map(|i| i.sub_category.clone()).collect();
        assert_eq!(subs[0], "Shirt 137");
    }

    #[tokio::test]
    async fn test_batch_before_onboarding_counts_failures() {
        let backend = FakeStylist::default();
        let mut state = AppState::new();
        let report = classify_batch(
            &backend,
            &mut state,
            vec![UploadFile::new("a.png", png(1))],
            BatchPolicy::default(),
            |_| {},
        )
        .await;
        assert_eq!(report.failed, 1);
        assert!(state.items().is_empty());
    }
}
