use dyeflow::{
    AnalysisRecorder, FixedRateLoop, ImageExporter, InteractiveApp, PointerHandle, RenderMode,
    SimConfig, Simulator, StopHandle, ViewSettings,
};
use glam::Vec2;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_HEADLESS_TICKS: u64 = 300;
const EXPORT_EVERY: u64 = 30;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = flag_value(&args, "--config").map(PathBuf::from);
    let config = match &config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if args.len() > 1 && args[1] == "headless" {
        let ticks = args
            .get(2)
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(DEFAULT_HEADLESS_TICKS);
        let out_dir = flag_value(&args, "--out")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("frames"));
        run_headless(config, ticks, &out_dir)?;
    } else {
        run_gui_app(config)?;
    }

    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn run_headless(
    config: SimConfig,
    ticks: u64,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("running {ticks} headless ticks, frames go to {}", out_dir.display());
    std::fs::create_dir_all(out_dir)?;

    let scheduler = FixedRateLoop::new(config.tick_period());
    let mut simulation = Simulator::new(config)?;
    let exporter = ImageExporter::new(RenderMode::Dye, 2);
    let mut recorder = AnalysisRecorder::new();

    let stop = scheduler.stop_handle();
    let stroke = {
        let pointer = simulation.pointer();
        let center = Vec2::new(simulation.width() as f32, simulation.height() as f32) * 0.5;
        let radius = simulation.width().min(simulation.height()) as f32 * 0.25;
        let stop = stop.clone();
        std::thread::spawn(move || scripted_stroke(pointer, center, radius, stop))
    };

    let mut export_error = None;
    let frames = scheduler.run(|frame| {
        let report = simulation.tick();
        if report.recovered {
            log::warn!("tick {frame} recovered from an unusable grid");
        }

        if frame % EXPORT_EVERY == 0 {
            recorder.record_frame(&simulation, frame as usize).log_summary();
            let path = out_dir.join(format!("frame_{:05}.png", frame));
            if let Err(err) = exporter.export_png(&simulation, &path) {
                export_error = Some(err);
                return false;
            }
        }
        frame + 1 < ticks
    });

    stop.stop();
    if stroke.join().is_err() {
        log::error!("pointer script thread panicked");
    }

    if let Some(err) = export_error {
        return Err(err.into());
    }

    recorder.log_trends();
    log::info!("headless run finished after {frames} ticks");
    Ok(())
}

/// Drives the pointer from its own thread, independent of the tick cadence:
/// push around a circle, then feed dye while circling back.
fn scripted_stroke(pointer: PointerHandle, center: Vec2, radius: f32, stop: StopHandle) {
    let step = Duration::from_millis(5);
    let mut angle: f32 = 0.0;
    let mut button = 0;
    let mut pressed = false;

    while !stop.is_stopped() {
        let position = center + Vec2::new(angle.cos(), angle.sin()) * radius;
        if pressed {
            pointer.move_to(position);
        } else {
            pointer.press(button, position);
            pressed = true;
        }

        angle += 0.01;
        if angle >= std::f32::consts::TAU {
            pointer.release();
            pressed = false;
            angle = 0.0;
            button = 1 - button;
        }
        std::thread::sleep(step);
    }
    pointer.release();
}

fn run_gui_app(config: SimConfig) -> Result<(), Box<dyn std::error::Error>> {
    let simulation = Simulator::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 900.0])
            .with_title("dyeflow"),
        ..Default::default()
    };

    eframe::run_native(
        "dyeflow",
        options,
        Box::new(move |cc| {
            let settings: ViewSettings = cc
                .storage
                .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
                .unwrap_or_default();
            Box::new(InteractiveApp::new(simulation, settings))
        }),
    )
    .map_err(|err| format!("viewer failed: {err}"))?;

    Ok(())
}
