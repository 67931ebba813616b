/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::ElevatorConfig;
use crate::elevator::{Elevator, ElevatorEvent, StopReason};
use crate::shared::{
    CancelToken, ConfigError, DispatchError, ElevatorId, ElevatorStatus, Floor, Request,
};

/***************************************/
/*       Private data structures       */
/***************************************/
struct ElevatorHandle {
    request_tx: cbc::Sender<Request>,
    status: Arc<Mutex<ElevatorStatus>>,
    // Holds the elevator until its control loop is started.
    parked: Mutex<Option<Elevator>>,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * The shared, addressable collection of elevators.
 *
 * Built once at boot and never resized. Every collaborator that needs to reach an elevator is
 * handed this value (usually behind an `Arc`): requests go in through each elevator's inbox
 * channel and status comes out as a copied snapshot, so callers never hold elevator state.
 */
pub struct Dispatch {
    elevators: BTreeMap<ElevatorId, ElevatorHandle>,
}

impl Dispatch {
    /// Builds `count` elevators with identical parameters, ids `0..count`.
    pub fn boot(count: usize, config: &ElevatorConfig) -> Result<Dispatch, ConfigError> {
        Dispatch::build(count, config, None)
    }

    /// Like [`Dispatch::boot`], with every elevator reporting to one event channel.
    pub fn boot_with_events(
        count: usize,
        config: &ElevatorConfig,
    ) -> Result<(Dispatch, cbc::Receiver<ElevatorEvent>), ConfigError> {
        let (event_tx, event_rx) = cbc::unbounded::<ElevatorEvent>();
        let dispatch = Dispatch::build(count, config, Some(event_tx))?;
        Ok((dispatch, event_rx))
    }

    fn build(
        count: usize,
        config: &ElevatorConfig,
        event_tx: Option<cbc::Sender<ElevatorEvent>>,
    ) -> Result<Dispatch, ConfigError> {
        if count == 0 {
            return Err(ConfigError::NoElevators);
        }

        let mut elevators = BTreeMap::new();
        for id in 0..count {
            let (request_tx, request_rx) = cbc::unbounded::<Request>();
            let mut elevator = Elevator::new(id, config, request_rx)?;
            if let Some(event_tx) = &event_tx {
                elevator = elevator.with_events(event_tx.clone());
            }

            elevators.insert(
                id,
                ElevatorHandle {
                    request_tx,
                    status: elevator.status_handle(),
                    parked: Mutex::new(Some(elevator)),
                },
            );
        }

        info!(
            "Booted {} elevators: {} passengers max, {} ms per floor, starting at {}.",
            count, config.max_capacity, config.movement_delay_ms, config.boot_floor
        );
        Ok(Dispatch { elevators })
    }

    pub fn len(&self) -> usize {
        self.elevators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevators.is_empty()
    }

    pub fn ids(&self) -> Vec<ElevatorId> {
        self.elevators.keys().copied().collect()
    }

    pub fn contains(&self, id: ElevatorId) -> bool {
        self.elevators.contains_key(&id)
    }

    /// Queues `request` on elevator `id`. Nothing changes if the elevator does not exist.
    pub fn submit(&self, id: ElevatorId, request: Request) -> Result<(), DispatchError> {
        let handle = self.handle(id)?;
        let (passengers, departure, destination) = (
            request.passenger_count,
            request.departure_floor,
            request.destination_floor,
        );
        handle
            .request_tx
            .send(request)
            .map_err(|_| DispatchError::Offline(id))?;

        info!(
            "[Elevator #{}] Request submitted: {} passengers from {} to {}.",
            id, passengers, departure, destination
        );
        Ok(())
    }

    /// Fire-and-forget [`Dispatch::submit`]; failures are only logged.
    pub fn add_request(&self, id: ElevatorId, request: Request) {
        if let Err(e) = self.submit(id, request) {
            warn!("{}", e);
        }
    }

    pub fn status(&self, id: ElevatorId) -> Result<ElevatorStatus, DispatchError> {
        let handle = self.handle(id)?;
        let status = handle
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(status)
    }

    /// Snapshots of every elevator, ordered by id.
    pub fn statuses(&self) -> Vec<ElevatorStatus> {
        self.elevators
            .values()
            .map(|handle| {
                handle
                    .status
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .collect()
    }

    /// Requests submitted to `id` that its loop has not picked up yet.
    pub fn pending_submissions(&self, id: ElevatorId) -> Result<usize, DispatchError> {
        Ok(self.handle(id)?.request_tx.len())
    }

    /// Spawns the control loop of `id` on its own thread. Each elevator can be started once.
    pub fn start(
        &self,
        id: ElevatorId,
        cancel: CancelToken,
    ) -> Result<JoinHandle<StopReason>, DispatchError> {
        let handle = self.handle(id)?;
        let elevator = handle
            .parked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(DispatchError::AlreadyStarted(id))?;

        Builder::new()
            .name(format!("elevator_{}", id))
            .spawn(move || elevator.run(cancel))
            .map_err(|source| DispatchError::Spawn { id, source })
    }

    pub fn start_all(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<(ElevatorId, JoinHandle<StopReason>)>, DispatchError> {
        self.ids()
            .into_iter()
            .map(|id| Ok((id, self.start(id, cancel.clone())?)))
            .collect()
    }

    /// Drives a not-yet-started elevator to `target` on the calling thread.
    ///
    /// The parked elevator stays locked for the whole trip, so a concurrent `start(id)` blocks
    /// until the move finishes or is cancelled.
    pub fn move_to(
        &self,
        id: ElevatorId,
        target: Floor,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError> {
        let handle = self.handle(id)?;
        let mut parked = handle.parked.lock().unwrap_or_else(PoisonError::into_inner);
        let elevator = parked.as_mut().ok_or(DispatchError::Running(id))?;
        elevator
            .move_to(target, cancel)
            .map_err(|_| DispatchError::Cancelled(id))
    }

    fn handle(&self, id: ElevatorId) -> Result<&ElevatorHandle, DispatchError> {
        self.elevators
            .get(&id)
            .ok_or(DispatchError::UnknownElevator(id))
    }
}
