// SPDX-License-Identifier: Apache-2.0

mod common;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use common::*;

/// Builds and runs a pair of queues of the given width for `cycles` cycles,
/// returning the line trace of every cycle. Module trees are not `Send`, so
/// every job builds its own.
fn run_job(nbits: usize, cycles: usize) -> Vec<String> {
    let m = two_queues(nbits);
    let mut sim = simulator(&m);
    (0..cycles)
        .map(|cycle| {
            let cycle = cycle as u64;
            sim.set("in_.val", cycle % 3 != 0).unwrap();
            sim.set("in_.msg", cycle * 0x1234_5677).unwrap();
            sim.set("out.rdy", cycle % 2).unwrap();
            sim.eval_combinational().unwrap();
            let line = sim.line_trace().unwrap();
            sim.tick().unwrap();
            line
        })
        .collect()
}

fn run_jobs_in_pool(
    jobs: Vec<usize>,
    cycles: usize,
    n_workers: usize,
) -> HashMap<usize, Vec<String>> {
    assert!(n_workers > 0, "n_workers must be at least 1");

    let total = jobs.len();
    let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
    let (tx, rx) = mpsc::channel::<Result<(usize, Vec<String>), String>>();

    let mut handles = Vec::new();
    for _ in 0..n_workers {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();

        handles.push(thread::spawn(move || {
            loop {
                let job = {
                    let mut q = queue.lock().unwrap();
                    q.pop_front()
                };
                let Some(nbits) = job else {
                    break;
                };

                let result = std::panic::catch_unwind(|| run_job(nbits, cycles))
                    .map(|trace| (nbits, trace))
                    .map_err(|_| format!("simulation panic in worker for width {nbits}"));

                if tx.send(result).is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    let mut traces = HashMap::new();
    for _ in 0..total {
        match rx.recv().unwrap() {
            Ok((nbits, trace)) => {
                let existing = traces.insert(nbits, trace);
                assert!(existing.is_none(), "duplicate result for width {nbits}");
            }
            Err(msg) => panic!("{msg}"),
        }
    }

    for handle in handles {
        handle.join().expect("worker thread panicked unexpectedly");
    }

    traces
}

#[test]
fn test_parallel_simulation() {
    const WIDTHS: &[usize] = &[1, 4, 8, 16, 32, 64];
    const CYCLES: usize = 40;

    let parallel = run_jobs_in_pool(WIDTHS.to_vec(), CYCLES, 4);

    for nbits in WIDTHS {
        assert_eq!(parallel[nbits], run_job(*nbits, CYCLES), "width {nbits}");
    }
}
