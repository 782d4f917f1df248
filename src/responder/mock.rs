use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::common::Persona;

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(3000);

/// Offline responder: waits a random while, then answers with a canned line.
#[derive(Debug, Clone)]
pub struct MockResponder {
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::with_delay(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl MockResponder {
    /// Bounds are swapped if given in the wrong order.
    pub fn with_delay(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay: min_delay.min(max_delay),
            max_delay: max_delay.max(min_delay),
        }
    }

    pub async fn reply(&self, persona: Persona) -> String {
        // ThreadRng is not Send, keep it out of the await.
        let (delay, phrase) = {
            let mut rng = rand::thread_rng();
            let millis = rng.gen_range(
                self.min_delay.as_millis() as u64..=self.max_delay.as_millis() as u64,
            );
            let phrase = persona
                .profile()
                .phrases
                .choose(&mut rng)
                .copied()
                .unwrap_or_default();
            (Duration::from_millis(millis), phrase)
        };

        tokio::time::sleep(delay).await;
        phrase.to_string()
    }
}
