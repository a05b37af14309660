//! Import coordinator — bounded-concurrency batch ingestion.
//!
//! Per item: dedup check → convert → extract text → extract metadata →
//! classify → title → vault encrypt → repository insert. Items run
//! concurrently up to the semaphore limit; stages within an item are
//! strictly sequential. One item's failure never aborts the batch.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use uuid::Uuid;

use super::classify::classify;
use super::convert::prepare_container;
use super::extract::extract_text;
use super::metadata;
use super::title::generate_title;
use super::traits::{DocumentStore, TextRecognizer};
use super::types::{BatchSummary, ImportConfig, ImportStatus, ItemOutcome};
use super::ImportError;
use crate::crypto::Vault;
use crate::db::DatabaseError;
use crate::models::{Document, LearnedKeyword, ScannedFile};

pub struct ImportCoordinator {
    store: Arc<dyn DocumentStore>,
    vault: Arc<Vault>,
    recognizer: Arc<dyn TextRecognizer>,
    scratch_dir: PathBuf,
    config: ImportConfig,
    semaphore: Arc<Semaphore>,
    status_tx: Arc<watch::Sender<ImportStatus>>,
    // Keeps the channel alive so status sends never fail
    _status_rx: watch::Receiver<ImportStatus>,
}

impl ImportCoordinator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        vault: Arc<Vault>,
        recognizer: Arc<dyn TextRecognizer>,
        scratch_dir: impl Into<PathBuf>,
        config: ImportConfig,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(ImportStatus::Idle);
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_items.max(1)));
        Self {
            store,
            vault,
            recognizer,
            scratch_dir: scratch_dir.into(),
            config,
            semaphore,
            status_tx: Arc::new(status_tx),
            _status_rx: status_rx,
        }
    }

    /// Subscribe to the import status stream. Late subscribers see the
    /// latest state immediately.
    pub fn subscribe(&self) -> watch::Receiver<ImportStatus> {
        self.status_tx.subscribe()
    }

    /// Import a batch of scanned files.
    ///
    /// Publishes `Progress` after every item, `Success` once the batch is
    /// done, and `Idle` after a short delay. Returns the aggregate counts.
    pub async fn import_files(&self, batch: Vec<ScannedFile>) -> Result<BatchSummary, ImportError> {
        if batch.is_empty() {
            return Ok(BatchSummary::default());
        }

        let total = batch.len();
        let learned: Arc<Vec<LearnedKeyword>> = match self.store.learned_keywords() {
            Ok(list) => Arc::new(list),
            Err(e) => {
                tracing::error!(error = %e, "Cannot load learned keywords, aborting batch");
                let _ = self.status_tx.send(ImportStatus::Error {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        tracing::info!(total, "Import batch starting");
        let _ = self.status_tx.send(ImportStatus::Progress {
            current: 0,
            total,
            file_name: String::new(),
        });

        let processed = Arc::new(AtomicUsize::new(0));
        let imported = Arc::new(AtomicUsize::new(0));
        let duplicates = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));

        for chunk in batch.chunks(self.config.chunk_size.max(1)) {
            let mut tasks = Vec::with_capacity(chunk.len());

            for file in chunk.iter().cloned() {
                let semaphore = self.semaphore.clone();
                let store = self.store.clone();
                let vault = self.vault.clone();
                let recognizer = self.recognizer.clone();
                let learned = learned.clone();
                let scratch_dir = self.scratch_dir.clone();
                let confidence = self.config.default_confidence;
                let processed = processed.clone();
                let imported = imported.clone();
                let duplicates = duplicates.clone();
                let failed = failed.clone();
                let status_tx = self.status_tx.clone();

                tasks.push(tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };

                    let file_name = file.display_name.clone();
                    let outcome = tokio::task::spawn_blocking(move || {
                        process_item(
                            &file,
                            store.as_ref(),
                            &vault,
                            recognizer.as_ref(),
                            &learned,
                            &scratch_dir,
                            confidence,
                        )
                    })
                    .await;

                    match outcome {
                        Ok(Ok(ItemOutcome::Imported)) => {
                            imported.fetch_add(1, Ordering::SeqCst);
                        }
                        Ok(Ok(ItemOutcome::Duplicate)) => {
                            duplicates.fetch_add(1, Ordering::SeqCst);
                        }
                        Ok(Ok(ItemOutcome::Failed)) => {
                            failed.fetch_add(1, Ordering::SeqCst);
                        }
                        Ok(Err(e)) => {
                            failed.fetch_add(1, Ordering::SeqCst);
                            tracing::warn!(file = %file_name, error = %e, "Import item failed");
                        }
                        Err(e) => {
                            failed.fetch_add(1, Ordering::SeqCst);
                            tracing::warn!(file = %file_name, error = %e, "Import task panicked");
                        }
                    }

                    let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    let _ = status_tx.send(ImportStatus::Progress {
                        current,
                        total,
                        file_name,
                    });
                }));
            }

            for task in tasks {
                let _ = task.await;
            }
            // Fairness: give other work a chance between chunks
            tokio::task::yield_now().await;
        }

        let summary = BatchSummary {
            imported: imported.load(Ordering::SeqCst),
            duplicates: duplicates.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
            total,
        };

        tracing::info!(
            imported = summary.imported,
            duplicates = summary.duplicates,
            failed = summary.failed,
            total = summary.total,
            "Import batch finished"
        );

        let _ = self.status_tx.send(ImportStatus::Success {
            imported: summary.imported,
        });
        tokio::time::sleep(self.config.idle_reset_delay).await;
        let _ = self.status_tx.send(ImportStatus::Idle);

        Ok(summary)
    }
}

/// Run the full stage chain for one item. Called on the blocking pool;
/// every error is contained here — scratch files and any vault object
/// written for this item are cleaned up before returning.
fn process_item(
    file: &ScannedFile,
    store: &dyn DocumentStore,
    vault: &Vault,
    recognizer: &dyn TextRecognizer,
    learned: &[LearnedKeyword],
    scratch_dir: &Path,
    confidence: f32,
) -> Result<ItemOutcome, ImportError> {
    if store.exists_by_fingerprint(&file.fingerprint)? {
        tracing::debug!(file = %file.display_name, "Duplicate fingerprint, skipping");
        return Ok(ItemOutcome::Duplicate);
    }

    // Fresh id per item: no two tasks can ever contend on the same
    // document id or vault object.
    let document_id = Uuid::new_v4();

    let container = match prepare_container(&file.path, &file.mime_type, &document_id, scratch_dir)
    {
        Ok(path) => path,
        Err(e) => {
            let _ = std::fs::remove_file(scratch_dir.join(format!("imp_{document_id}.pdf")));
            return Err(e);
        }
    };

    let result = ingest_item(
        file,
        store,
        vault,
        recognizer,
        learned,
        &document_id,
        &container,
        confidence,
    );

    let _ = std::fs::remove_file(&container);
    if result.is_err() {
        // No orphaned vault object may outlive a failed item
        if let Err(e) = vault.remove(&document_id) {
            tracing::warn!(document_id = %document_id, error = %e, "Vault cleanup failed");
        }
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn ingest_item(
    file: &ScannedFile,
    store: &dyn DocumentStore,
    vault: &Vault,
    recognizer: &dyn TextRecognizer,
    learned: &[LearnedKeyword],
    document_id: &Uuid,
    container: &Path,
    confidence: f32,
) -> Result<ItemOutcome, ImportError> {
    let text = extract_text(&file.path, &file.mime_type, recognizer);
    let extracted = metadata::extract(&text);
    let category = classify(&text, &file.display_name, learned);
    let title = generate_title(&text, &extracted, &file.display_name);

    // Vault write strictly precedes the repository insert: a row must never
    // point at a missing object.
    let object = vault.encrypt_and_store(container, document_id)?;

    let document = Document {
        id: *document_id,
        original_file_name: file.display_name.clone(),
        original_fingerprint: file.fingerprint.clone(),
        vault_object_name: object.object_name,
        title,
        category: category.display_name().to_string(),
        user_category: None,
        user_title: None,
        extracted_text: text,
        metadata: serde_json::to_string(&extracted).unwrap_or_else(|_| "{}".to_string()),
        confidence,
        file_size_bytes: file.size_bytes,
        mime_type: file.mime_type.clone(),
        source_folder: file.source_folder(),
        imported_at: chrono::Local::now().naive_local(),
        is_favorite: false,
    };

    match store.insert(&document) {
        Ok(()) => {
            tracing::info!(
                document_id = %document_id,
                file = %file.display_name,
                category = %document.category,
                "Document imported"
            );
            Ok(ItemOutcome::Imported)
        }
        Err(DatabaseError::ConstraintViolation(_)) => {
            // Lost the check-then-insert race: a sibling task persisted this
            // fingerprint after our dedup check. Roll back the vault object.
            tracing::debug!(
                file = %file.display_name,
                "Concurrent duplicate insert rejected by unique index"
            );
            if let Err(e) = vault.remove(document_id) {
                tracing::warn!(document_id = %document_id, error = %e, "Vault cleanup failed");
            }
            Ok(ItemOutcome::Duplicate)
        }
        Err(e) => Err(e.into()),
    }
}
