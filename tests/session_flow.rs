//! End-to-end recording sessions driven through the controller.

use std::{fs, path::Path, sync::Arc};

use serde_json::json;
use video_timer_lib::model::ModelError;
use video_timer_lib::settings::Settings;
use video_timer_lib::timer::{
    DirectorySink, ManualClock, Marker, MemorySink, TimerController, TimerField, TimerPatch,
    TimerPhase, TimerState,
};

fn exports_in(dir: &Path) -> Vec<serde_json::Value> {
    let mut documents: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let contents = fs::read_to_string(entry.unwrap().path()).unwrap();
            serde_json::from_str::<serde_json::Value>(&contents).unwrap()
        })
        .collect();
    documents.sort_by_key(|doc| doc["startTime"].as_i64());
    documents
}

#[tokio::test]
async fn record_mark_stop_exports_session() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(0);
    let sink = DirectorySink::new(dir.path());
    let timer = TimerController::new(
        &Settings::default(),
        Arc::new(clock.clone()),
        Arc::new(sink.clone()),
    );

    timer.toggle().await.unwrap();
    clock.set(10_000);
    timer.add_marker("✨").await.unwrap();
    clock.set(20_000);
    let state = timer.toggle().await.unwrap();
    sink.flush().await;

    assert_eq!(
        exports_in(dir.path()),
        vec![json!({
            "startTime": 0,
            "endTime": 20000,
            "markers": [{ "note": "✨", "readableTime": "0:00:10" }],
        })]
    );

    // markers are cleared for the next session, the duration stays readable
    assert!(state.markers.is_empty());
    assert_eq!(state.phase(), TimerPhase::Stopped);
    assert_eq!(timer.get_snapshot().await.readable_time, "0:00:20");

    clock.set(30_000);
    let restarted = timer.toggle().await.unwrap();
    assert_eq!(restarted.start_time, Some(30_000));
    assert_eq!(restarted.end_time, None);
}

#[tokio::test]
async fn consecutive_sessions_export_separately() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(1_000);
    let sink = DirectorySink::new(dir.path());
    let timer = TimerController::new(
        &Settings::default(),
        Arc::new(clock.clone()),
        Arc::new(sink.clone()),
    );

    for (start, mark, stop) in [(1_000, 2_000, 3_000), (5_000, 65_000, 70_000)] {
        clock.set(start);
        timer.toggle().await.unwrap();
        clock.set(mark);
        timer.add_marker("✔").await.unwrap();
        clock.set(stop);
        timer.toggle().await.unwrap();
    }
    sink.flush().await;

    let documents = exports_in(dir.path());
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["markers"][0]["readableTime"], "0:00:01");
    assert_eq!(documents[1]["markers"][0]["readableTime"], "0:01:00");
    assert_eq!(documents[1]["markers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listeners_see_each_transition() {
    let clock = ManualClock::new(0);
    let timer = TimerController::new(
        &Settings::default(),
        Arc::new(clock.clone()),
        Arc::new(MemorySink::new()),
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    timer
        .listen([TimerField::Markers], move |state: &TimerState| {
            let _ = tx.send(state.markers.clone());
        })
        .await;

    timer.toggle().await.unwrap();
    clock.set(1_000);
    timer.add_marker("❌").await.unwrap();
    clock.set(2_000);
    timer.toggle().await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), vec![Marker::new("❌", "0:00:01")]);
    // the export responder's clear
    assert_eq!(rx.recv().await.unwrap(), Vec::<Marker>::new());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn runaway_responder_is_reported() {
    let settings = Settings {
        max_cascade: 8,
        ..Settings::default()
    };
    let timer = TimerController::new(
        &settings,
        Arc::new(ManualClock::new(0)),
        Arc::new(MemorySink::new()),
    );

    timer
        .respond([TimerField::StartTime], |state: &TimerState| {
            Some(TimerPatch::new().with_start_time(state.start_time.map(|t| t + 1)))
        })
        .await;

    let err = timer.toggle().await.unwrap_err();
    let cause = err.downcast_ref::<ModelError>().unwrap();
    assert!(matches!(cause, ModelError::ReentrantUpdateOverflow { limit: 8 }));
}
