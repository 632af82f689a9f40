// ==========================================
// SequenceStore 并发与持久化测试
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rfcv_transform::repository::{SequenceKey, SequenceStore};

fn test_key() -> SequenceKey {
    SequenceKey::new("VF1", "RFB00", 'G', 'T')
}

#[test]
fn test_concurrent_reserves_never_overlap() {
    println!("\n=== 测试：并发预留不重叠 ===");
    let store = Arc::new(SequenceStore::open_in_memory().unwrap());
    let threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                let mut issued = Vec::new();
                for _ in 0..per_thread {
                    let range = store.reserve(&test_key(), 3).unwrap();
                    issued.extend(range.iter());
                }
                issued
            })
        })
        .collect();

    let mut all: Vec<u32> = Vec::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }

    let expected = threads * per_thread * 3;
    assert_eq!(all.len(), expected);

    let unique: HashSet<u32> = all.iter().copied().collect();
    assert_eq!(unique.len(), expected, "存在重复序号");
    assert_eq!(store.last_issued(&test_key()).unwrap(), expected as u32);
}

#[test]
fn test_counter_survives_reopen() {
    println!("\n=== 测试：计数器跨重开持久化 ===");
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sequence.db");
    let db_path = db_path.to_str().unwrap();

    {
        let store = SequenceStore::open(db_path).unwrap();
        let range = store.reserve(&test_key(), 7).unwrap();
        assert_eq!(range.start, 1);
    }

    let store = SequenceStore::open(db_path).unwrap();
    assert_eq!(store.last_issued(&test_key()).unwrap(), 7);

    let range = store.reserve(&test_key(), 2).unwrap();
    assert_eq!(range.start, 8);
}

#[test]
fn test_batched_flush_policy_is_rejected() {
    println!("\n=== 测试：批量落盘策略被拒绝 ===");
    use rfcv_transform::domain::types::FlushPolicy;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sequence.db");

    let result = SequenceStore::open_with_policy(
        db_path.to_str().unwrap(),
        FlushPolicy::Batched { every: 100 },
    );
    assert!(result.is_err());
}
