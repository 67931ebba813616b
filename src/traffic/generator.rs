/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::TrafficConfig;
use crate::dispatch::Dispatch;
use crate::shared::{CancelToken, ElevatorStatus, Floor, Request};

/**
 * Random passenger traffic for exercising a freshly booted bank of elevators.
 *
 * Each request goes to a randomly chosen elevator with a random pair of distinct floors. Group
 * sizes never exceed what the target car can currently hold; the last request of a run tops the
 * car up to its limit.
 */
pub struct TrafficGenerator {
    config: TrafficConfig,
    rng: ChaCha8Rng,
}

impl TrafficGenerator {
    pub fn new(config: TrafficConfig) -> TrafficGenerator {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        TrafficGenerator { config, rng }
    }

    /// A request sized for `status`, or `None` if that car has no room left.
    pub fn plan_request(&mut self, status: &ElevatorStatus, is_last: bool) -> Option<Request> {
        let remaining = status.remaining_capacity();
        if remaining == 0 {
            return None;
        }

        let departure = *Floor::ALL.choose(&mut self.rng)?;
        let others: Vec<Floor> = Floor::ALL
            .iter()
            .copied()
            .filter(|&floor| floor != departure)
            .collect();
        let destination = *others.choose(&mut self.rng)?;

        let passengers = if is_last {
            remaining.max(1)
        } else {
            let largest_group = self.config.max_passengers_per_request.max(1);
            self.rng.gen_range(1..=largest_group).min(remaining)
        };

        Some(Request::new(passengers, departure, destination))
    }

    /// Submits up to `request_count` requests, pausing between them. Returns how many went in.
    pub fn generate(&mut self, dispatch: &Dispatch, cancel: &CancelToken) -> usize {
        let ids = dispatch.ids();
        let interval = Duration::from_millis(self.config.submit_interval_ms);
        let mut submitted = 0;

        for i in 0..self.config.request_count {
            if cancel.is_cancelled() {
                break;
            }
            let id = match ids.choose(&mut self.rng) {
                Some(&id) => id,
                None => break,
            };
            let status = match dispatch.status(id) {
                Ok(status) => status,
                Err(e) => {
                    warn!("[Traffic] {}", e);
                    continue;
                }
            };

            let is_last = i + 1 == self.config.request_count;
            let request = match self.plan_request(&status, is_last) {
                Some(request) => request,
                None => {
                    debug!("[Traffic] Elevator #{} is full, skipping.", id);
                    continue;
                }
            };

            info!(
                "[Traffic] Added request: {} passengers from {} to {} on Elevator #{}.",
                request.passenger_count, request.departure_floor, request.destination_floor, id
            );
            match dispatch.submit(id, request) {
                Ok(()) => submitted += 1,
                Err(e) => warn!("[Traffic] {}", e),
            }

            if cancel.sleep(interval).is_err() {
                break;
            }
        }

        info!(
            "Test initialization complete. {} requests added to elevators.",
            submitted
        );
        submitted
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
