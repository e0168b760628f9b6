//! Example showing stepper bars and spinners side by side

use color_eyre::Result;
use multibar::{max_spinners, max_steppers, MultiBar, TaskBuilder, Tasks};
use rand::Rng;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let tasks = Tasks::new(MultiBar::new());

    for i in 0..max_steppers() {
        let delay = Duration::from_millis(rand::rng().random_range(10..60));
        tasks.add(
            TaskBuilder::new(format!("Stepper #{i}"))
                .bar(|bar| bar.stepper(i).upper_bound(200))
                .worker(move |tracker, exit| {
                    while !tracker.is_completed() {
                        if exit.wait_timeout(delay) {
                            break;
                        }
                        tracker.step(1);
                    }
                    false
                }),
        )?;
    }

    // A few spinners picked across the registered styles.
    for i in (0..max_spinners()).step_by(19) {
        let delay = Duration::from_millis(rand::rng().random_range(20..80));
        tasks.add(
            TaskBuilder::new(format!("Spinner #{i}"))
                .bar(|bar| bar.spinner(i).highlight_color("green"))
                .worker(move |tracker, exit| {
                    while !tracker.is_completed() {
                        if exit.wait_timeout(delay) {
                            break;
                        }
                        tracker.step(1);
                    }
                    false
                }),
        )?;
    }

    tasks.wait();
    tasks.close();
    println!("All tasks finished.");

    Ok(())
}
