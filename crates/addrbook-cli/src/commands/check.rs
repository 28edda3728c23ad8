//! One-shot session check

use crate::output;
use addrbook_client::{ApiClient, SessionMonitor, SessionState};
use anyhow::Result;

pub async fn check(client: ApiClient) -> Result<()> {
    let monitor = SessionMonitor::new(client);
    match monitor.check().await {
        SessionState::Authenticated => output::success("Signed in."),
        _ => output::hint("Not signed in."),
    }
    Ok(())
}
