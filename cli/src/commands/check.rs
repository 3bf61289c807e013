use std::time::Duration;

use colored::*;
use lanwake_common::status::{HostStatus, StatusBatch, Verdict};
use lanwake_common::success;
use lanwake_core::broadcaster::HostSet;
use lanwake_core::poller::{PollOutcome, Poller};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::app::App;
use crate::mprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn check(follow: bool, app: &App) -> anyhow::Result<()> {
    if !follow {
        let start_time: Instant = Instant::now();
        let pb = spinner::start("Checking devices...");
        let batch: StatusBatch = app.status.check_all().await?;
        pb.finish_and_clear();

        print_batch(&batch);
        print_summary(&batch, start_time.elapsed());
        return Ok(());
    }

    let poller: Poller = app.status.poller(HostSet::All, &app.polling);
    loop {
        let next_in: Duration = match poller.tick().await {
            Ok(PollOutcome::Completed { batch, next_in }) => {
                print_batch(&batch);
                info!("next check in {}s", next_in.as_secs_f64());
                next_in
            }
            Ok(PollOutcome::Skipped) => poller.cadence(),
            Err(e) => {
                warn!("check failed: {e:#}");
                poller.cadence()
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(next_in) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
        mprint!();
    }

    print::end_of_program();
    Ok(())
}

fn print_batch(batch: &StatusBatch) {
    for status in batch.iter() {
        print_status_line(status);
    }
}

fn print_status_line(status: &HostStatus) {
    let when: String = status.checked_at.format("%H:%M:%S").to_string();
    print::aligned_line(
        &status.host_id,
        format!(
            "{} {} {}",
            format::verdict(status.status),
            when.color(colors::SEPARATOR),
            format::changed_marker(status.changed)
        ),
    );
}

fn print_summary(batch: &StatusBatch, total_time: Duration) {
    let online: usize = batch.iter().filter(|s| s.status == Verdict::Online).count();
    let online: ColoredString = format!("{online}/{} online", batch.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    print::fat_separator();
    success!("Check complete: {online} in {total_time}");
}
