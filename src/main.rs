//! Runs a set of traffic lights, with a thread at each one waiting for it to turn green

#[macro_use]
extern crate log;
extern crate env_logger;
extern crate colored;
extern crate trafficlight;

use std::env;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use trafficlight::{Config, Phase, TrafficLight, WaitPeriod};
use trafficlight::util::duration_string;

fn init_log() {
    use log::{Level, LevelFilter};
    use colored::Colorize;
    let mut log_builder = env_logger::Builder::new();
    log_builder.filter(Some("trafficlight"), LevelFilter::Debug);
    if let Ok(s) = env::var("RUST_LOG") {
        log_builder.parse_filters(&s);
    }
    log_builder.format(|buf, rec| {
        let level_str = match rec.level() {
            Level::Trace => "[TRACE]".dimmed(),
            Level::Debug => "[DEBUG]".white().bold(),
            Level::Info => "[INFO]".cyan(),
            Level::Warn => "[WARN]".yellow(),
            Level::Error => "[ERROR]".red(),
        };
        writeln!(buf,
                 "{:7} {:30} - {}",
                 level_str,
                 rec.module_path().unwrap_or(""),
                 rec.args())
    });
    log_builder.init();
}

/// Waits for `light` to turn green over and over, until `running` is cleared
fn start_observer(light: Arc<TrafficLight>, running: Arc<AtomicBool>) -> JoinHandle<()> {
    // wake up every so often to check whether we should still be running
    let period = WaitPeriod::AtMost(light.bounds().max() * 2);
    thread::spawn(move || {
        let mut crossings: u64 = 0;
        while running.load(Ordering::Acquire) {
            if light.wait_for_green_for(&period) {
                crossings += 1;
                info!("light {} is {}, vehicle {} crossing", light.name(), Phase::Green, crossings);
            }
        }
        debug!("observer for light {} done after {} crossings", light.name(), crossings);
    })
}

fn main() {
    init_log();

    let config = match env::args().nth(1) {
        Some(path) => {
            Config::from_file(&path)
                .unwrap_or_else(|err| panic!("error loading config file {}: {}", path, err))
        }
        None => Config::default(),
    };
    debug!("config: {:?}", config);

    let lights: Vec<Arc<TrafficLight>> = config.to_lights()
        .unwrap_or_else(|err| panic!("error creating lights: {}", err))
        .into_iter()
        .map(Arc::new)
        .collect();

    info!("starting {} lights", lights.len());
    let running = Arc::new(AtomicBool::new(true));
    let mut observers = Vec::new();
    for light in &lights {
        light.simulate().unwrap_or_else(|err| panic!("error starting light: {}", err));
        observers.push(start_observer(light.clone(), running.clone()));
    }

    match config.run_for() {
        Some(run_for) => {
            info!("running for {}", duration_string(&run_for));
            thread::sleep(run_for);
        }
        None => {
            // the lights cycle until the process is killed
            loop {
                thread::park();
            }
        }
    }

    info!("stopping...");
    running.store(false, Ordering::Release);
    for observer in observers {
        if observer.join().is_err() {
            error!("observer thread panicked");
        }
    }
    for light in &lights {
        light.stop();
        debug!("{:?}", light);
    }
}
