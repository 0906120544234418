//! Throughput benchmark for the streaming onset engine and the batch driver.
//!
//! Measures the per-block cost of `compute_block_at` for several history
//! lengths, then the cost of running `detect_onsets` over a longer matrix.

use ndarray::Array2;
use onset_engine::{OnsetConfig, OnsetEngine, detect_onsets};
use std::time::Instant;

/// Deterministic pseudo-random strengths with a periodic spike.
fn generate_strengths(blocks: usize) -> Array2<f32> {
    let mut state: u32 = 0x9E37_79B9;
    Array2::from_shape_fn((blocks, 3), |(block, _)| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let noise = (state % 1000) as f32 / 50_000.0;
        if block % 43 == 0 { 0.8 + noise } else { 0.01 + noise }
    })
}

fn benchmark_streaming(history: usize, blocks: usize) {
    let config = OnsetConfig::new().with_detection_buffer_size(history);
    let Ok(mut engine) = OnsetEngine::new(config) else {
        println!("  history {history}: invalid configuration");
        return;
    };
    let strengths = generate_strengths(blocks);
    let block_ms = engine.block_duration_ms();

    // Warm up
    for (index, row) in strengths.rows().into_iter().take(256).enumerate() {
        engine.compute_block_at(row[0], row[1], row[2], index as f64 * block_ms);
    }
    engine.reset();

    let start = Instant::now();
    let mut onsets = 0usize;
    for (index, row) in strengths.rows().into_iter().enumerate() {
        if engine.compute_block_at(row[0], row[1], row[2], index as f64 * block_ms) {
            onsets += 1;
        }
    }
    let elapsed = start.elapsed();

    println!(
        "  history {:>4}: {:>8} blocks in {:?} ({:.1} ns/block, {} onsets)",
        history,
        blocks,
        elapsed,
        elapsed.as_nanos() as f64 / blocks as f64,
        onsets
    );
}

fn benchmark_batch(blocks: usize) {
    let strengths = generate_strengths(blocks);
    let config = OnsetConfig::default();

    let start = Instant::now();
    match detect_onsets(strengths.view(), &config) {
        Ok(onsets) => println!(
            "  batch: {} blocks in {:?}, {} onsets",
            blocks,
            start.elapsed(),
            onsets.len()
        ),
        Err(err) => println!("  batch failed: {err}"),
    }
}

fn main() {
    println!("Onset engine benchmark");
    println!("======================");

    println!("\nStreaming (per-block cost vs. history length):");
    for history in [8, 32, 128, 512] {
        benchmark_streaming(history, 100_000);
    }

    println!("\nBatch driver:");
    benchmark_batch(100_000);
}
