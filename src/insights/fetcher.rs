use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{info, instrument, warn};

use crate::utils::clock::Clock;

use super::{client::InsightsSource, entities::InsightsData, error::FetchError};

pub const DEFAULT_MAX_TRIES: u32 = 12;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(25);

/// Attempt budget shared by stale responses, rate limiting, 5xx and network failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_tries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Result of polling. [FetchOutcome::Unavailable] is the empty result of a run in which no
/// attempt produced a decodable payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fresh(InsightsData),
    /// The budget ran out while the server was still aggregating.
    Stale(InsightsData),
    Unavailable {
        attempts: u32,
        last_error: Option<FetchError>,
    },
}

impl FetchOutcome {
    /// Stale data is still usable. A run without any payload is reported with its last failure.
    pub fn into_data(self, range: &str) -> Result<InsightsData> {
        match self {
            FetchOutcome::Fresh(data) | FetchOutcome::Stale(data) => Ok(data),
            FetchOutcome::Unavailable {
                attempts,
                last_error,
            } => {
                let message = format!(
                    "No insights payload was decoded for range '{range}' after {attempts} attempts"
                );
                Err(match last_error {
                    Some(e) => anyhow!(e).context(message),
                    None => anyhow!(message),
                })
            }
        }
    }
}

/// Polls an [InsightsSource] until the server reports the aggregation as complete.
///
/// Yearly ranges are usually computed lazily on the server, so the first responses are often
/// marked `is_up_to_date: false`. When the budget runs out the most recent decoded payload is
/// returned anyway and the caller renders what is available.
pub struct Fetcher<S> {
    source: S,
    policy: RetryPolicy,
    clock: Box<dyn Clock>,
}

impl<S: InsightsSource> Fetcher<S> {
    pub fn new(source: S, policy: RetryPolicy, clock: Box<dyn Clock>) -> Self {
        Self {
            source,
            policy,
            clock,
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, range: &str) -> Result<FetchOutcome> {
        let max_tries = self.policy.max_tries.max(1);
        let mut last: Option<InsightsData> = None;
        let mut last_error: Option<FetchError> = None;

        for attempt in 1..=max_tries {
            match self.source.get_days(range).await {
                Ok(response) => {
                    let data = response.data;
                    if data.is_ready() {
                        return Ok(FetchOutcome::Fresh(data));
                    }
                    info!(
                        "[retry {attempt}/{max_tries}] stale: status={}, percent={}",
                        data.status_or_stale(),
                        data.progress(),
                    );
                    last = Some(data);
                }
                Err(e) if e.is_payment_required() => {
                    return Err(anyhow!(e).context(format!(
                        "Range '{range}' requires a paid plan. The account tier likely does not \
                         support this range"
                    )));
                }
                Err(e) if e.is_retryable() => {
                    warn!("[retry {attempt}/{max_tries}] transient failure for range '{range}': {e}");
                    last_error = Some(e);
                }
                Err(e) => {
                    return Err(fatal(e, range));
                }
            }

            if attempt < max_tries {
                info!("Sleeping {}s before next attempt", self.policy.delay.as_secs());
                self.clock.sleep(self.policy.delay).await;
            }
        }

        match last {
            Some(data) => {
                warn!("Insights still stale after {max_tries} attempts. Rendering last available data.");
                Ok(FetchOutcome::Stale(data))
            }
            None => {
                warn!("No insights payload was received after {max_tries} attempts");
                Ok(FetchOutcome::Unavailable {
                    attempts: max_tries,
                    last_error,
                })
            }
        }
    }
}

fn fatal(e: FetchError, range: &str) -> anyhow::Error {
    anyhow!(e).context(format!("Failed to fetch insights for range '{range}'"))
}
