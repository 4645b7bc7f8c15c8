//! Performance benchmarks for the per-frame hot paths

use client::game::PaddleController;
use client::network::Channel;
use client::rendering::{RecordingSurface, Renderer};
use shared::{decode_server_message, ServerMessage, Snapshot};
use std::time::Instant;
use tokio::sync::mpsc;

const GAME_STATE: &str = r#"{"type":"game_state","state":{
    "ball":{"x":400,"y":300,"dx":5,"dy":5},
    "paddles":{"player1":{"x":50,"y":300},"player2":{"x":750,"y":300}},
    "scores":{"player1":3,"player2":1},
    "obstacles":[{"x":300,"y":150,"size":30},{"x":520,"y":420,"size":30}],
    "is_active":true,
    "players":["player_abc","player_xyz"]}}"#;

fn decoded_snapshot() -> Snapshot {
    match decode_server_message(GAME_STATE) {
        Ok(ServerMessage::GameState { state }) => state,
        other => panic!("unexpected decode result: {:?}", other),
    }
}

/// Benchmarks snapshot decoding
#[test]
fn benchmark_snapshot_decode() {
    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = decode_server_message(GAME_STATE).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot decode: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds even in debug builds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks proposals that collapse onto the same clamped value
#[test]
fn benchmark_propose_dedup() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut channel = Channel::new(tx);
    channel.mark_open();

    let mut controller = PaddleController::new("player_abc");
    controller.reconcile(&decoded_snapshot());

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        // Everything past the bottom edge clamps to the same value.
        controller.propose(600.0 + i as f32, &mut channel);
    }

    let duration = start.elapsed();
    println!(
        "Propose: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    let mut sent = 0;
    while rx.try_recv().is_ok() {
        sent += 1;
    }
    assert_eq!(sent, 1);
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks rendering into an offscreen surface
#[test]
fn benchmark_render() {
    let snapshot = decoded_snapshot();
    let mut renderer = Renderer::new();

    let iterations = 10_000;
    let start = Instant::now();

    for generation in 0..iterations {
        let mut surface = RecordingSurface::new();
        renderer.render(Some(&snapshot), generation, &mut surface);
    }

    let duration = start.elapsed();
    println!(
        "Render: {} frames in {:?} ({:.2} μs/frame)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(renderer.last_drawn(), Some(iterations - 1));
    assert!(duration.as_millis() < 2000);
}
