#![warn(missing_docs)]

//! Traffic lights which switch between red and green on their own threads, and a blocking
//! queue used to tell waiting threads when they turn green

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate quick_error;

extern crate chrono;
extern crate rand;
extern crate serde;
extern crate serde_json;

pub mod wait_for;
pub mod util;
pub mod blocking_queue;
pub mod phase;
pub mod cycle;
pub mod traffic_light;
pub mod config;

pub use wait_for::WaitPeriod;
pub use blocking_queue::BlockingQueue;
pub use phase::{Phase, AtomicPhase};
pub use cycle::{CycleBounds, CycleTimer};
pub use traffic_light::{TrafficLight, LightError};
pub use config::{Config, ConfigError};
