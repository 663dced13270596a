use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rand::Rng;

use colstats::StatsError;
use colstats::pipeline::{PipelineEvent, PipelineMetrics, PipelineObserver, RunOptions, run};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(name)
}

fn run_to_string(files: &[PathBuf], op: &str, column: usize, opts: &RunOptions) -> String {
    let mut out = Vec::new();
    run(files, op, column, &mut out, opts).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn avg_over_one_file() {
    let files = vec![fixture("example.csv")];
    let out = run_to_string(&files, "avg", 3, &RunOptions::default());
    assert_eq!(out, "227.6\n");
}

#[test]
fn sum_over_one_file() {
    let files = vec![fixture("example.csv")];
    let out = run_to_string(&files, "sum", 3, &RunOptions::default());
    assert_eq!(out, "1138\n");
}

#[test]
fn avg_merges_files_before_reducing() {
    let both = vec![fixture("example.csv"), fixture("example2.csv")];
    let combined = run_to_string(&both, "avg", 3, &RunOptions::default());
    assert_eq!(combined, "233.8\n");

    // The combined average is a single reduction over the merged values, not
    // an average of per-file averages; it matches neither file on its own.
    let first = run_to_string(&both[..1], "avg", 3, &RunOptions::default());
    let second = run_to_string(&both[1..], "avg", 3, &RunOptions::default());
    assert_eq!(first, "227.6\n");
    assert_eq!(second, "240\n");
    assert_ne!(combined, first);
    assert_ne!(combined, second);
}

#[test]
fn nonexistent_file_fails_and_writes_nothing() {
    let files = vec![fixture("example.csv"), fixture("fakefile.csv")];
    let mut out = Vec::new();
    let err = run(&files, "avg", 2, &mut out, &RunOptions::default()).unwrap_err();
    match err {
        StatsError::FileOpen { path, source } => {
            assert!(path.ends_with("fakefile.csv"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected FileOpen, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[test]
fn column_past_every_row_fails_and_writes_nothing() {
    let files = vec![fixture("example.csv")];
    let mut out = Vec::new();
    let err = run(&files, "avg", 4, &mut out, &RunOptions::default()).unwrap_err();
    match err {
        StatsError::ColumnOutOfRange { column, fields } => {
            assert_eq!(column, 4);
            assert_eq!(fields, 3);
        }
        other => panic!("expected ColumnOutOfRange, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[test]
fn non_numeric_field_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "name,score\nada,98.5\ngrace,not-a-score\n").unwrap();

    let files = vec![path];
    let mut out = Vec::new();
    let err = run(&files, "sum", 2, &mut out, &RunOptions::default()).unwrap_err();
    match err {
        StatsError::NotANumber { row, raw, .. } => {
            assert_eq!(row, 3);
            assert_eq!(raw, "not-a-score");
        }
        other => panic!("expected NotANumber, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[test]
fn header_only_files_preserve_the_nan_average() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "a,b\n").unwrap();

    // Zero values merged: avg is 0/0. Deliberately unguarded.
    let out = run_to_string(&[path], "avg", 1, &RunOptions::default());
    assert_eq!(out, "NaN\n");
}

#[test]
fn result_is_independent_of_worker_count_and_merge_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = rand::rng();

    // Integer values keep f64 addition exact, so every merge order produces
    // bit-identical sums.
    let mut files = Vec::new();
    for i in 0..8 {
        let mut body = String::from("id,value\n");
        for j in 0..50 {
            let v: i64 = rng.random_range(-1_000_000..=1_000_000);
            body.push_str(&format!("{j},{v}\n"));
        }
        let path = dir.path().join(format!("part{i}.csv"));
        fs::write(&path, body).unwrap();
        files.push(path);
    }

    for op in ["sum", "avg"] {
        let baseline = run_to_string(
            &files,
            op,
            2,
            &RunOptions {
                num_workers: Some(1),
                ..RunOptions::default()
            },
        );
        for workers in [2, 4, 8] {
            let out = run_to_string(
                &files,
                op,
                2,
                &RunOptions {
                    num_workers: Some(workers),
                    ..RunOptions::default()
                },
            );
            assert_eq!(out, baseline, "op={op} workers={workers}");
        }
    }
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[test]
fn observer_and_metrics_report_the_run() {
    let observer = Arc::new(RecordingObserver::default());
    let metrics = Arc::new(PipelineMetrics::new());
    let opts = RunOptions {
        num_workers: Some(2),
        observer: Some(observer.clone()),
        metrics: Some(metrics.clone()),
    };

    let files = vec![fixture("example.csv"), fixture("example2.csv")];
    let out = run_to_string(&files, "avg", 3, &opts);
    assert_eq!(out, "233.8\n");

    let snap = metrics.snapshot();
    assert_eq!(snap.files_merged, 2);
    assert_eq!(snap.values_merged, 10);
    assert!(snap.elapsed.is_some());

    let events = observer.events.lock().unwrap();
    assert!(matches!(
        events.first(),
        Some(PipelineEvent::RunStarted {
            files: 2,
            workers: 2
        })
    ));
    assert!(matches!(
        events.last(),
        Some(PipelineEvent::RunFinished { .. })
    ));
    let merges = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::ResultMerged { values: 5 }))
        .count();
    assert_eq!(merges, 2);
}

#[test]
fn first_error_wins_across_many_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = Vec::new();
    for i in 0..16 {
        let path = dir.path().join(format!("ok{i}.csv"));
        fs::write(&path, "id,value\n1,10\n2,20\n").unwrap();
        files.push(path);
    }
    files.push(dir.path().join("missing.csv"));

    let mut out = Vec::new();
    let err = run(
        &files,
        "sum",
        2,
        &mut out,
        &RunOptions {
            num_workers: Some(4),
            ..RunOptions::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, StatsError::FileOpen { .. }));
    assert!(out.is_empty());
}
