#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::SlowHost;
use tagbridge_core::{Compound, RuntimeContext, VersionToken};

const READERS: usize = 4;
const WRITES: usize = 20;

#[test]
fn test_readers_never_observe_torn_root_during_writes() {
    let host = Arc::new(SlowHost::new(
        VersionToken::MC1_20_R3,
        Duration::from_millis(1),
    ));
    let ctx = Arc::new(RuntimeContext::with_version(host, VersionToken::MC1_20_R3));
    let root = Compound::standalone(&ctx);
    for r in 0..READERS {
        root.set_string(&format!("reader.{}", r), &format!("value-{}", r))
            .unwrap();
    }

    let writer = {
        let root = root.clone();
        thread::spawn(move || {
            for i in 0..WRITES {
                root.set_string(&format!("writer.k{}", i), &format!("w{}", i))
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..READERS)
        .map(|r| {
            let root = root.clone();
            thread::spawn(move || {
                for _ in 0..WRITES {
                    let value = root.get_string(&format!("reader.{}", r)).unwrap();
                    assert_eq!(value, Some(format!("value-{}", r)));
                    let keys = root.get_compound("writer").unwrap().map(|w| w.len().unwrap());
                    assert!(keys.unwrap_or(0) <= WRITES);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let written = root.get_compound("writer").unwrap().unwrap();
    assert_eq!(written.len().unwrap(), WRITES);
    for i in 0..WRITES {
        assert_eq!(
            written.get_string(&format!("k{}", i)).unwrap(),
            Some(format!("w{}", i))
        );
    }
}

#[test]
fn test_concurrent_list_appends_are_linearized() {
    let root = common::standalone();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let list = root.get_integer_list("values").unwrap();
            thread::spawn(move || {
                for i in 0..25 {
                    list.push(t * 100 + i).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut values = root.get_integer_list("values").unwrap().to_vec().unwrap();
    assert_eq!(values.len(), 100);
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), 100);
}
