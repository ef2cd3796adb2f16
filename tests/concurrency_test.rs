use std::sync::{Arc, Barrier};
use std::thread;

use spendwise::{Categorizer, CategorizerConfig, Category, ModelStatus};

#[test]
fn test_concurrent_first_predictions_train_once() {
    let dir = tempfile::tempdir().unwrap();
    let categorizer = Arc::new(
        Categorizer::new(CategorizerConfig::with_model_path(dir.path().join("model.bin"))).unwrap(),
    );
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let categorizer = Arc::clone(&categorizer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                categorizer.predict("uber ride to airport")
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().category(), Category::Travel);
    }
    assert_eq!(categorizer.training_runs(), 1);
    assert_eq!(categorizer.status(), ModelStatus::Loaded);
}

#[test]
fn test_predictions_during_retraining() {
    let dir = tempfile::tempdir().unwrap();
    let categorizer = Arc::new(
        Categorizer::new(CategorizerConfig::with_model_path(dir.path().join("model.bin"))).unwrap(),
    );
    categorizer.train().unwrap();

    let trainer = {
        let categorizer = Arc::clone(&categorizer);
        thread::spawn(move || {
            for _ in 0..3 {
                categorizer.train().unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let categorizer = Arc::clone(&categorizer);
            thread::spawn(move || {
                for _ in 0..20 {
                    let prediction = categorizer.predict("electricity bill");
                    assert_eq!(prediction.category(), Category::Bills);
                    assert!(!prediction.is_degraded());
                }
            })
        })
        .collect();

    trainer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(categorizer.training_runs(), 4);
}
