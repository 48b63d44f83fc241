use crate::error::{config_error, SchedulerResult};
use crate::store::{document_id, Collection, Document, EventStore};
use std::fs;
use std::path::Path;
use tracing::info;

/// Seed file holding the default documents of `collection`
fn seed_file(collection: Collection) -> String {
    format!("{}.json", collection)
}

/// Fill every empty collection from `<dir>/<collection>.json`.
///
/// Each file holds a JSON array of documents carrying their own `id`.
/// Collections that already hold data are left alone. Returns the number of
/// documents inserted.
pub async fn seed_defaults(store: &dyn EventStore, dir: &Path) -> SchedulerResult<usize> {
    let mut inserted = 0;

    for collection in Collection::ALL {
        let path = dir.join(seed_file(collection));
        if !path.exists() {
            info!("No seed data for {} at {}", collection, path.display());
            continue;
        }

        if !store.query(collection, &[]).await?.is_empty() {
            info!("Collection {} already populated, skipping seed", collection);
            continue;
        }

        let content = fs::read_to_string(&path)?;
        let documents: Vec<Document> = serde_json::from_str(&content)?;

        // A malformed file is rejected before any of it is written
        let identified = documents
            .into_iter()
            .map(|document| match document_id(&document) {
                Some(id) => Ok((id, document)),
                None => Err(config_error(&format!(
                    "{} contains a document without id",
                    path.display()
                ))),
            })
            .collect::<SchedulerResult<Vec<_>>>()?;

        for (id, document) in identified {
            store.insert(collection, Some(&id), document).await?;
            inserted += 1;
        }

        info!("Seeded {} from {}", collection, path.display());
    }

    info!("Seeding from {} inserted {} documents", dir.display(), inserted);
    Ok(inserted)
}
