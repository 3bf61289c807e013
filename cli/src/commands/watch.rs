use lanwake_common::status::StreamEvent;
use lanwake_core::broadcaster::HostSet;
use lanwake_core::session::Subscription;
use tracing::info;

use crate::app::App;
use crate::terminal::print;

pub async fn watch(app: &App) -> anyhow::Result<()> {
    let mut subscription: Subscription = app.status.subscribe(HostSet::All);
    info!(
        "session {} open; status every {}s (Ctrl-C to stop)",
        subscription.info().id,
        subscription.info().cadence.as_secs()
    );

    loop {
        tokio::select! {
            event = subscription.next_event() => match event {
                Some(event) => print_event(&event)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.shutdown().await;
    print::end_of_program();
    Ok(())
}

fn print_event(event: &StreamEvent) -> anyhow::Result<()> {
    let line: String = serde_json::to_string(event)?;
    print::print(&line);
    Ok(())
}
