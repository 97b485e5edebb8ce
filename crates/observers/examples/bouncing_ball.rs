//! Drops a ball and prints its height at every bounce.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info cargo run --example bouncing_ball
//! RUST_LOG=strand=debug cargo run --example bouncing_ball -- 5 0.001
//! ```
//!
//! The optional arguments are the stop time (default 3) and the step size
//! (default 0.01). Event details go to the log; the simulation summary and a
//! table of bounces go to stdout.

use std::error::Error;

use strand_core::{Observer, Value};
use strand_models::BouncingBall;
use strand_observers::EventLog;
use strand_solvers::transient::euler::{self, Action, Config, Event};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1).map(|arg| arg.parse::<f64>());
    let stop_time = args.next().transpose()?.unwrap_or(3.0);
    let step_size = args.next().transpose()?.unwrap_or(0.01);

    let model = BouncingBall::default();
    let description = model.description()?;
    let config = Config::new(0.0, stop_time, step_size)?
        .with_instance_name("ball")
        .with_logging(true)
        .with_debug_categories(["logEvents"]);

    let mut log = EventLog::default();
    let solution = euler::solve(
        &model,
        &description,
        config,
        |event: &Event<'_>| -> Option<Action> { log.observe(event) },
    )?;

    println!("{solution}");
    println!();
    println!("{:>10} {:>10} {:>8}", "time", "v", "bounces");

    let output = &solution.output;
    let (Some(v), Some(bounces)) = (output.get("v"), output.get("bounces")) else {
        return Err("output is missing `v` or `bounces`".into());
    };

    let mut previous = Value::Integer(0);
    for ((time, &v), &count) in output.times().iter().zip(v).zip(bounces) {
        if count != previous {
            println!("{time:>10.3} {:>10.4} {:>8}", v.as_f64(), count.to_string());
            previous = count;
        }
    }

    Ok(())
}
