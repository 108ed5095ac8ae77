//! Block Runner entry point
//!
//! The native build runs one headless run driven by a simple autopilot and
//! prints the final snapshot. The browser build enters through `web::wasm_start`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use block_runner::persistence::FileStore;
    use block_runner::{ManualClock, Session, Tuning};

    env_logger::init();
    log::info!("Block Runner (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let max_ticks: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600);

    let tuning = std::env::var_os("BLOCK_RUNNER_TUNING")
        .map(|path| Tuning::load(std::path::Path::new(&path)))
        .unwrap_or_default();

    // Frame-locked clock so hold durations match the simulated frames
    let clock = ManualClock::new();
    let mut session = Session::new(
        tuning,
        seed,
        Box::new(FileStore::open("block_runner_progress.json")),
        Box::new(clock.clone()),
    );
    session.load_progress();
    session.subscribe(|snap| {
        log::trace!(
            "x={:.2} y={:.2} {:?}",
            snap.world_position,
            snap.player.pos.y,
            snap.jump_phase
        );
    });

    session.start_run();

    let dt = 1.0 / 60.0;
    let hold_frames = 15;
    let mut held_for = None;
    let mut ticks = 0;

    while session.snapshot().active && ticks < max_ticks {
        let snap = session.snapshot();
        let pitch = session.tuning().platform_pitch;
        let offset = snap.world_position.rem_euclid(pitch);

        match held_for {
            None if !snap.player.jumping && offset > 1.0 && offset < 1.5 => {
                session.begin_jump_hold();
                held_for = Some(0);
            }
            Some(frames) if frames >= hold_frames => {
                session.end_jump_hold();
                held_for = None;
            }
            Some(frames) => held_for = Some(frames + 1),
            None => {}
        }

        session.advance_tick(dt);
        clock.advance(dt as f64 * 1000.0);
        ticks += 1;

        // Reaching a new platform on a single press counts as a perfect jump
        let report = session.last_report().clone();
        if let Some(id) = report.landed_on.filter(|&id| report.scored && id > 0) {
            log::info!("Landed on platform {}", id);
            session.award_perfect_jump();
        }
    }

    if session.snapshot().active {
        session.end_run();
    }

    let snap = session.snapshot();
    log::info!(
        "Finished after {} ticks: score {}, high score {}, gems {} ({} theme)",
        ticks,
        snap.score,
        snap.high_score,
        snap.gems,
        snap.current_theme.display_name()
    );
    match serde_json::to_string_pretty(&snap) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Failed to encode snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
