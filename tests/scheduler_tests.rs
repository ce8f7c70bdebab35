use dyeflow::{FixedRateLoop, SimConfig, Simulator};
use std::time::{Duration, Instant};

#[test]
fn test_loop_stops_when_callback_declines() {
    let scheduler = FixedRateLoop::new(Duration::from_millis(1));
    let mut seen = Vec::new();

    let frames = scheduler.run(|frame| {
        seen.push(frame);
        frame < 4
    });

    assert_eq!(frames, 5);
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_loop_keeps_its_period() {
    let scheduler = FixedRateLoop::new(Duration::from_millis(5));
    let started = Instant::now();

    scheduler.run(|frame| frame < 9);

    // Ten frames, nine full sleeps in between.
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[test]
fn test_stop_handle_ends_loop_from_another_thread() {
    let scheduler = FixedRateLoop::from_hz(200.0);
    let stop = scheduler.stop_handle();

    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        stop.stop();
    });

    let frames = scheduler.run(|_| true);
    stopper.join().unwrap();

    assert!(frames > 0);
    assert!(scheduler.stop_handle().is_stopped());
}

#[test]
fn test_loop_drives_simulator_ticks() {
    let mut sim = Simulator::new(SimConfig::with_size(16, 16)).unwrap();
    let scheduler = FixedRateLoop::from_hz(sim.config().target_hz);
    assert!((scheduler.period().as_secs_f32() - 1.0 / 60.0).abs() < 1e-4);

    scheduler.run(|frame| {
        sim.tick();
        frame < 2
    });

    assert_eq!(sim.ticks(), 3);
    assert_eq!(sim.passes_executed(), 36);
}
