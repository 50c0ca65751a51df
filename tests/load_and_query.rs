use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use wordvec::ingest::{discover_vector_parts, VOCAB_FILE};
use wordvec::{progress_channel, FileSource, LoadError, Loader, LoaderConfig, Source, WordVectors};

const DIM: usize = 4;

fn encode(floats: &[f32]) -> Vec<u8> {
    floats.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// 100 words; "cat" first, every other word scores distinctly against it
fn fixture() -> (Vec<String>, Vec<f32>) {
    let mut words = vec!["cat".to_string()];
    let mut floats = vec![10.0, 0.0, 0.0, 0.0];

    for i in 1..100 {
        words.push(format!("word{}", i));
        let i = i as f32;
        floats.extend_from_slice(&[
            ((i as usize * 37) % 100) as f32 / 10.0,
            i.sin(),
            i.cos(),
            i / 100.0,
        ]);
    }

    (words, floats)
}

fn write_artifacts(dir: &Path, words: &[String], blob: &[u8], cuts: &[usize]) -> Vec<PathBuf> {
    let vocab = serde_json::json!({ "dim": DIM, "words": words });
    std::fs::write(dir.join(VOCAB_FILE), vocab.to_string()).unwrap();

    let mut bounds = vec![0];
    bounds.extend_from_slice(cuts);
    bounds.push(blob.len());

    bounds
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let path = dir.join(format!("vectors.f32.part{}", i));
            std::fs::write(&path, &blob[w[0]..w[1]]).unwrap();
            path
        })
        .collect()
}

#[tokio::test]
async fn test_load_parts_from_disk_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (words, floats) = fixture();
    let blob = encode(&floats);
    let paths = write_artifacts(dir.path(), &words, &blob, &[7, 501, 1000]);

    assert_eq!(discover_vector_parts(dir.path()), paths);

    let (report, mut rx) = progress_channel();
    let vectors = WordVectors::load_files(dir.path().join(VOCAB_FILE), &paths, Some(report))
        .await
        .unwrap();

    let mut reports = Vec::new();
    while let Some(ratio) = rx.recv().await {
        reports.push(ratio);
    }
    assert_eq!(reports.first(), Some(&0.0));
    assert_eq!(reports.last(), Some(&1.0));

    assert_eq!(vectors.len(), 100);
    assert_eq!(vectors.dim(), DIM);
    for (i, word) in words.iter().enumerate() {
        assert_eq!(
            vectors.vector_of(word).unwrap(),
            &floats[i * DIM..(i + 1) * DIM],
            "row {}",
            i
        );
    }
}

#[tokio::test]
async fn test_small_file_chunks_match_single_blob() {
    let dir = tempfile::tempdir().unwrap();
    let (words, floats) = fixture();
    let blob = encode(&floats);
    let paths = write_artifacts(dir.path(), &words, &blob, &[3, 4, 5, 1234]);

    let vocab = FileSource::new(dir.path().join(VOCAB_FILE));
    let parts: Vec<Arc<dyn Source>> = paths
        .iter()
        .map(|p| Arc::new(FileSource::new(p).with_chunk_size(5)) as Arc<dyn Source>)
        .collect();

    let table = Loader::new(LoaderConfig::default().with_max_concurrent_fetches(2))
        .load(&vocab, &parts, None)
        .await
        .unwrap();

    assert_eq!(table.vectors(), floats.as_slice());
}

#[tokio::test]
async fn test_html_part_on_disk_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (words, floats) = fixture();
    let mut paths = write_artifacts(dir.path(), &words, &encode(&floats), &[]);

    let html = dir.path().join("vectors.html");
    std::fs::write(&html, "<html><body>Not Found</body></html>").unwrap();
    paths.push(html);

    let err = WordVectors::load_files(dir.path().join(VOCAB_FILE), &paths, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::UnexpectedContentType { .. }));
}

#[tokio::test]
async fn test_missing_part_is_transport_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (words, floats) = fixture();
    let mut paths = write_artifacts(dir.path(), &words, &encode(&floats), &[]);
    paths.push(dir.path().join("vectors.f32.part9"));

    let err = WordVectors::load_files(dir.path().join(VOCAB_FILE), &paths, None)
        .await
        .unwrap_err();
    match err {
        LoadError::Transport { source_id, .. } => assert!(source_id.ends_with("vectors.f32.part9")),
        other => panic!("Expected Transport, got {:?}", other),
    }
}

async fn loaded_fixture() -> (WordVectors, Vec<String>) {
    let dir = tempfile::tempdir().unwrap();
    let (words, floats) = fixture();
    let paths = write_artifacts(dir.path(), &words, &encode(&floats), &[]);
    let vectors = WordVectors::load_files(dir.path().join(VOCAB_FILE), &paths, None)
        .await
        .unwrap();
    (vectors, words)
}

#[tokio::test]
async fn test_nearest_matches_brute_force() {
    let (vectors, words) = loaded_fixture().await;

    let mut expected: Vec<(String, f32)> = words[1..]
        .iter()
        .map(|w| (w.clone(), vectors.similarity("cat", w).unwrap()))
        .collect();
    expected.sort_by(|a, b| b.1.total_cmp(&a.1));
    expected.truncate(5);

    let results = vectors.nearest("cat", 5);
    assert_eq!(results.len(), 5);
    assert!(results.windows(2).all(|w| w[0].score > w[1].score));
    for (got, (word, score)) in results.iter().zip(&expected) {
        assert_eq!(&got.word, word);
        assert_eq!(got.score, *score);
    }
}

#[tokio::test]
async fn test_self_is_never_returned() {
    let (vectors, _) = loaded_fixture().await;

    // "cat" scores highest against itself.
    let self_score = vectors.similarity("cat", "cat").unwrap();
    let results = vectors.nearest("cat", 100);
    assert_eq!(results.len(), 99);
    assert!(results.iter().all(|r| r.word != "cat"));
    assert!(results.iter().all(|r| r.score < self_score));
}

#[tokio::test]
async fn test_unknown_words() {
    let (vectors, _) = loaded_fixture().await;

    assert_eq!(vectors.similarity("x", "cat"), None);
    assert!(vectors.nearest("x", 3).is_empty());
    assert!(vectors.analogy("cat", "x", "word1", 3).is_empty());
    assert!(!vectors.has("x"));
}

#[tokio::test]
async fn test_concurrent_readers() {
    let (vectors, _) = loaded_fixture().await;
    let expected = vectors.nearest("word7", 10);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let vectors = vectors.clone();
            thread::spawn(move || vectors.nearest("word7", 10))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
