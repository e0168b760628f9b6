//! Example showing trackers organized in groups

use color_eyre::Result;
use multibar::{MultiBar, TrackerBuilder};
use rand::Rng;
use std::sync::mpsc;
use std::time::Duration;

fn main() -> Result<()> {
    color_eyre::install()?;

    let (done_tx, done_rx) = mpsc::channel();
    let bars = MultiBar::builder()
        .grouped(true)
        .on_done(move |bars| {
            bars.close();
            let _ = done_tx.send(());
        })
        .build();

    for (group, count) in [("Toolchains", 3), ("Crates", 5), ("Docs", 2)] {
        for i in 0..count {
            let delay = Duration::from_millis(rand::rng().random_range(5..40));
            bars.add_to_group(
                group,
                TrackerBuilder::new()
                    .title(format!("{} {}", group.to_lowercase(), i + 1))
                    .upper_bound(100)
                    .stepper(i % 2)
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
    }

    done_rx.recv()?;
    println!("Every group is done.");

    Ok(())
}
