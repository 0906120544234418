//! Streams synthetic onset strengths through an `OnsetEngine` driven by a
//! manual clock, the way a host would when time comes from sample positions.
//!
//! A UI thread adjusts parameters through the shared handle while the
//! analysis loop runs.

use onset_engine::{
    Clock, DebounceMode, ManualClock, OnsetConfig, OnsetEngine, OnsetFeature,
    OnsetResult,
};
use std::thread;

fn main() -> OnsetResult<()> {
    let config = OnsetConfig::new()
        .with_block_format(48_000, 256)
        .with_time_threshold_ms(60.0);
    let clock = ManualClock::new(0.0);
    let mut engine = OnsetEngine::with_clock(config.clone(), clock.clone())?;
    let block_ms = engine.block_duration_ms();

    println!(
        "block = {:.2} ms, history = {} blocks",
        block_ms, config.detection_buffer_size
    );

    // Host-side parameter changes land between blocks.
    let params = engine.parameters();
    let ui = thread::spawn(move || -> OnsetResult<()> {
        params.set_alpha(0.2)?;
        params.set_feature_weight(OnsetFeature::Hfc, 2.0)?;
        Ok(())
    });

    let spikes = [24usize, 26, 60, 96, 99, 140];
    for block in 0..160 {
        let level = if spikes.contains(&block) { 0.9 } else { 0.015 };
        let flux = if block % 3 == 0 { level * 0.8 } else { level };
        if engine.compute_block(level, level * 0.9, flux) {
            let eval = engine.last_evaluation();
            println!(
                "onset at block {:>3} ({:7.1} ms): sum {:.3} > threshold {:.3}",
                block, clock.now_ms(), eval.current, eval.threshold
            );
        }
        clock.advance_ms(block_ms);
    }

    match ui.join() {
        Ok(result) => result?,
        Err(_) => println!("parameter thread panicked"),
    }

    println!("\nswitching to block-count debouncing");
    engine.set_debounce_mode(DebounceMode::BufferCountBased);
    engine.set_buffer_num_threshold(config.ms_to_blocks(60.0));
    engine.reset();
    for block in 0..80 {
        let level = if block == 10 || block == 14 || block == 40 { 0.9 } else { 0.015 };
        if engine.compute_block(level, level, level) {
            println!("onset at block {block:>3} (counter {})", engine.block_counter());
        }
        clock.advance_ms(block_ms);
    }

    Ok(())
}
