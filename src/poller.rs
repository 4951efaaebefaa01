use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::PollError;
use crate::homework::{check_response, parse_status};
use crate::notifier::{send_message, Messenger};
use crate::practicum::HomeworkApi;

/// Mutable state carried from one cycle to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    /// Lower bound (unix seconds) for the next fetch
    pub from_date: i64,
    /// Last status message that was delivered
    pub last_message: Option<String>,
    /// Last failure message that delivery was attempted for
    pub last_error: Option<String>,
}

/// Polls the review API and forwards status changes to the chat.
pub struct Poller<A, M> {
    api: A,
    messenger: M,
    retry_period: Duration,
    state: PollState,
}

impl<A: HomeworkApi, M: Messenger> Poller<A, M> {
    pub fn new(api: A, messenger: M, retry_period: Duration, from_date: i64) -> Self {
        Self {
            api,
            messenger,
            retry_period,
            state: PollState {
                from_date,
                ..PollState::default()
            },
        }
    }

    /// Poll forever. Each cycle is followed by the fixed sleep, failed or not.
    pub async fn run(mut self) {
        info!(
            "Polling every {}s starting from {}",
            self.retry_period.as_secs(),
            self.state.from_date
        );

        loop {
            self.tick().await;
            debug!("Next check in {}s", self.retry_period.as_secs());
            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// One cycle, with failures reported instead of propagated.
    pub async fn tick(&mut self) {
        let Err(e) = self.run_cycle().await else {
            return;
        };

        let message = format!("Program failure: {}", e);
        error!("{}", message);

        if self.state.last_error.as_deref() != Some(message.as_str()) {
            // Recorded even when delivery fails so a dead chat can't cause a send storm.
            send_message(&self.messenger, &message).await;
            self.state.last_error = Some(message);
        }
    }

    /// Fetch, validate, notify on change, then advance the cursor.
    pub async fn run_cycle(&mut self) -> Result<(), PollError> {
        let response = self.api.fetch(self.state.from_date).await?;
        let batch = check_response(response)?;

        match batch.latest() {
            None => debug!("No new statuses"),
            Some(record) => {
                let message = parse_status(record)?;
                if self.state.last_message.as_deref() == Some(message.as_str()) {
                    debug!("Status unchanged: {}", message);
                } else if send_message(&self.messenger, &message).await {
                    self.state.last_message = Some(message);
                }
            }
        }

        self.state.from_date = batch.current_date.unwrap_or(self.state.from_date);
        Ok(())
    }
}
