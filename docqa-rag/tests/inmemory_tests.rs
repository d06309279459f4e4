//! Property tests for the in-memory store: search ranking and deletes.

use docqa_rag::document::{Chunk, Metadata, chunk_ids};
use docqa_rag::inmemory::InMemoryVectorStore;
use docqa_rag::vectorstore::VectorStore;
use proptest::prelude::*;
use serde_json::json;

fn unit_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("zero vector", |mut v| {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        (norm > 1e-6).then(|| {
            v.iter_mut().for_each(|x| *x /= norm);
            v
        })
    })
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Chunks as ingestion produces them: `doc-<i>` ids and page metadata.
fn page_chunks(dim: usize) -> impl Strategy<Value = Vec<Chunk>> {
    proptest::collection::vec(("[a-z ]{5,30}", unit_vector(dim)), 1..20).prop_map(|pieces| {
        let ids = chunk_ids(pieces.len());
        pieces
            .into_iter()
            .zip(ids)
            .enumerate()
            .map(|(i, ((text, embedding), id))| {
                let mut metadata = Metadata::new();
                metadata.insert("source".into(), json!("relatorio.pdf"));
                metadata.insert("page".into(), json!(i / 4));
                Chunk { id, text, metadata, embedding }
            })
            .collect()
    })
}

mod prop_inmemory_search {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn best_matches_come_first_with_their_page_metadata(
            chunks in page_chunks(DIM),
            query in unit_vector(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("relatorio", DIM).await.unwrap();
                store.upsert("relatorio", &chunks).await.unwrap();
                store.search("relatorio", &query, top_k).await.unwrap()
            });

            prop_assert_eq!(results.len(), top_k.min(chunks.len()));
            for pair in results.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }

            let best = chunks.iter().map(|c| cosine(&c.embedding, &query)).fold(f32::MIN, f32::max);
            prop_assert!((results[0].score - best).abs() < 1e-4);

            for result in &results {
                let index: usize = result.chunk.id.strip_prefix("doc-").unwrap().parse().unwrap();
                let stored = &chunks[index];
                prop_assert_eq!(&result.chunk.text, &stored.text);
                prop_assert_eq!(&result.chunk.metadata["page"], &json!(index / 4));
                prop_assert!((result.score - cosine(&stored.embedding, &query)).abs() < 1e-4);
            }
        }
    }
}

/// Deleted ids never come back from a search, and everything else still can.
mod prop_inmemory_delete {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn deleted_chunks_are_not_returned(
            chunks in page_chunks(DIM),
            query in unit_vector(DIM),
            delete_mask in proptest::collection::vec(any::<bool>(), 15),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (results, deleted, remaining) = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();
                store.upsert("test", &chunks).await.unwrap();

                let ids: Vec<String> = store_ids(&chunks);
                let deleted: Vec<String> = ids
                    .iter()
                    .zip(&delete_mask)
                    .filter(|(_, delete)| **delete)
                    .map(|(id, _)| id.clone())
                    .collect();
                let refs: Vec<&str> = deleted.iter().map(String::as_str).collect();
                store.delete("test", &refs).await.unwrap();

                let remaining = store.len("test").await;
                let results = store.search("test", &query, 100).await.unwrap();
                (results, deleted, remaining)
            });

            prop_assert_eq!(results.len(), remaining);
            for result in &results {
                prop_assert!(!deleted.contains(&result.chunk.id));
            }
        }
    }

    fn store_ids(chunks: &[Chunk]) -> Vec<String> {
        let mut ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
