/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::ElevatorConfig;
use crate::elevator::capacity::CapacityTracker;
use crate::shared::{
    format_movement_speed, ActiveRequest, CancelToken, Cancelled, ConfigError, DoorState,
    ElevatorId, ElevatorStatus, Floor, MotionState, Request, RequestId,
};

/***************************************/
/*               Enums                 */
/***************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Pickup,
    Dropoff,
}

/// Where the loop is heading next, and for which request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub request: RequestId,
    pub floor: Floor,
    pub kind: TargetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOutcome {
    Boarded,
    /// At the right floor but the car is too full. The request keeps waiting.
    Deferred,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    /// Every request sender is gone and nothing is left to serve.
    InboxClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    RequestAccepted {
        request: RequestId,
        passengers: u32,
        departure: Floor,
        destination: Floor,
    },
    FloorReached {
        floor: Floor,
        motion_state: MotionState,
        door_state: DoorState,
    },
    Arrived {
        floor: Floor,
    },
    Boarded {
        request: RequestId,
        floor: Floor,
        capacity: u32,
    },
    BoardingDeferred {
        request: RequestId,
        floor: Floor,
        capacity: u32,
    },
    Disembarked {
        request: RequestId,
        floor: Floor,
        capacity: u32,
    },
    Stopped {
        reason: StopReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatorEvent {
    pub elevator: ElevatorId,
    pub kind: EventKind,
}

/**
 * Control loop for a single elevator.
 *
 * The `Elevator` owns all of its mutable state and is driven by exactly one thread. It repeatedly
 * selects the next request, travels one floor per tick towards it, and boards or disembarks
 * passengers on every floor it reaches. Outside callers never touch this state directly: requests
 * come in through `request_rx` and status goes out through the shared snapshot in `status`.
 *
 * # Fields
 * - `id`:                  Identifier used by the dispatch surface and in logs.
 * - `capacity`:            Occupancy tracker, the only place capacity changes.
 * - `motion_state`:        Moving while the floor is changing, otherwise Stationary.
 * - `door_state`:          Closed while Moving, Opened once Stationary.
 * - `current_floor`:       Last floor committed by a completed tick.
 * - `movement_delay`:      Time spent travelling one floor.
 * - `movement_speed`:      `movement_delay` rendered for display.
 * - `requests`:            Active requests, in arrival order.
 * - `next_request_id`:     Id handed to the next accepted request.
 * - `request_rx`:          Inbox fed by the dispatch surface.
 * - `status`:              Copy-out snapshot, republished after every state change.
 * - `event_tx`:            Optional trace of everything the loop does.
 */
pub struct Elevator {
    id: ElevatorId,
    capacity: CapacityTracker,
    motion_state: MotionState,
    door_state: DoorState,
    current_floor: Floor,
    movement_delay: Duration,
    movement_delay_ms: u64,
    movement_speed: String,
    requests: Vec<ActiveRequest>,
    next_request_id: RequestId,
    request_rx: cbc::Receiver<Request>,
    status: Arc<Mutex<ElevatorStatus>>,
    event_tx: Option<cbc::Sender<ElevatorEvent>>,
}

impl Elevator {
    pub fn new(
        id: ElevatorId,
        config: &ElevatorConfig,
        request_rx: cbc::Receiver<Request>,
    ) -> Result<Elevator, ConfigError> {
        config.validate()?;
        let delay_ms = config.movement_delay()?;
        let capacity = CapacityTracker::new(config.max_capacity)?;
        let movement_speed = format_movement_speed(delay_ms);

        let status = ElevatorStatus {
            id,
            current_floor: config.boot_floor,
            motion_state: MotionState::Stationary,
            door_state: DoorState::Opened,
            capacity: capacity.capacity(),
            max_capacity: capacity.max_capacity(),
            movement_delay_ms: delay_ms.get(),
            movement_speed: movement_speed.clone(),
            waiting_requests: 0,
            onboard_requests: 0,
        };

        Ok(Elevator {
            id,
            capacity,
            motion_state: MotionState::Stationary,
            door_state: DoorState::Opened,
            current_floor: config.boot_floor,
            movement_delay: Duration::from_millis(delay_ms.get()),
            movement_delay_ms: delay_ms.get(),
            movement_speed,
            requests: Vec::new(),
            next_request_id: 0,
            request_rx,
            status: Arc::new(Mutex::new(status)),
            event_tx: None,
        })
    }

    pub fn with_events(mut self, event_tx: cbc::Sender<ElevatorEvent>) -> Elevator {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn motion_state(&self) -> MotionState {
        self.motion_state
    }

    pub fn door_state(&self) -> DoorState {
        self.door_state
    }

    pub fn capacity(&self) -> &CapacityTracker {
        &self.capacity
    }

    pub fn requests(&self) -> &[ActiveRequest] {
        &self.requests
    }

    pub fn status_handle(&self) -> Arc<Mutex<ElevatorStatus>> {
        Arc::clone(&self.status)
    }

    pub fn snapshot(&self) -> ElevatorStatus {
        let onboard_requests = self.requests.iter().filter(|r| r.request.on_board).count();
        ElevatorStatus {
            id: self.id,
            current_floor: self.current_floor,
            motion_state: self.motion_state,
            door_state: self.door_state,
            capacity: self.capacity.capacity(),
            max_capacity: self.capacity.max_capacity(),
            movement_delay_ms: self.movement_delay_ms,
            movement_speed: self.movement_speed.clone(),
            waiting_requests: self.requests.len() - onboard_requests,
            onboard_requests,
        }
    }

    /// Runs the select, travel, board and disembark cycle until `cancel` fires.
    pub fn run(mut self, cancel: CancelToken) -> StopReason {
        info!(
            "[Elevator #{}] Online at {} ({} passengers max, {}).",
            self.id,
            self.current_floor,
            self.capacity.max_capacity(),
            self.movement_speed
        );
        self.publish();

        let reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            self.collect_requests();

            match self.next_request() {
                Some(target) => {
                    if self.service(target, &cancel).is_err() {
                        break StopReason::Cancelled;
                    }
                }
                None => {
                    if let Err(reason) = self.wait_for_request(&cancel) {
                        break reason;
                    }
                }
            }
        };

        self.motion_state = MotionState::Offline;
        self.publish();
        info!(
            "[Elevator #{}] Stopped at {} ({:?}).",
            self.id, self.current_floor, reason
        );
        self.emit(EventKind::Stopped { reason });
        reason
    }

    /// Appends a request to the active set. Capacity is only checked when it tries to board.
    pub fn add_request(&mut self, mut request: Request) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        request.on_board = false;

        info!(
            "[Elevator #{}] Request added: {} passengers from {} to {}.",
            self.id, request.passenger_count, request.departure_floor, request.destination_floor
        );
        if request.passenger_count > self.capacity.max_capacity() {
            warn!(
                "[Elevator #{}] Request #{} has {} passengers but the car holds {}; it will keep waiting.",
                self.id,
                id,
                request.passenger_count,
                self.capacity.max_capacity()
            );
        }
        self.emit(EventKind::RequestAccepted {
            request: id,
            passengers: request.passenger_count,
            departure: request.departure_floor,
            destination: request.destination_floor,
        });

        self.requests.push(ActiveRequest { id, request });
        self.publish();
        id
    }

    /**
     * Picks the request to head for next.
     *
     * Onboard passengers come first: the nearest destination wins. With nobody onboard the
     * nearest departure floor wins, among waiting requests that would fit in the car. Ties go to
     * the request accepted first.
     *
     * A group larger than `max_capacity` never fits, so it is never a target and stays waiting.
     */
    pub fn next_request(&self) -> Option<Target> {
        let floor = self.current_floor;

        let dropoff = self
            .requests
            .iter()
            .filter(|r| r.request.on_board)
            .min_by_key(|r| r.request.destination_floor.distance(floor))
            .map(|r| Target {
                request: r.id,
                floor: r.request.destination_floor,
                kind: TargetKind::Dropoff,
            });

        dropoff.or_else(|| {
            self.requests
                .iter()
                .filter(|r| !r.request.on_board)
                .filter(|r| self.capacity.can_board(r.request.passenger_count))
                .min_by_key(|r| r.request.departure_floor.distance(floor))
                .map(|r| Target {
                    request: r.id,
                    floor: r.request.departure_floor,
                    kind: TargetKind::Pickup,
                })
        })
    }

    /**
     * Travels to `target` one floor per tick.
     *
     * Each tick closes the doors, waits the movement delay, commits the next floor and runs a
     * boarding pass there. Cancellation during the wait returns before the floor is committed,
     * leaving the elevator stationary with its doors open at the last committed floor.
     */
    pub fn move_to(&mut self, target: Floor, cancel: &CancelToken) -> Result<(), Cancelled> {
        let direction = if target > self.current_floor { "up" } else { "down" };

        while self.current_floor != target {
            self.motion_state = MotionState::Moving;
            self.door_state = DoorState::Closed;
            self.publish();

            let next = self.current_floor.step_towards(target);
            if let Err(cancelled) = cancel.sleep(self.movement_delay) {
                self.stop_in_place();
                return Err(cancelled);
            }
            self.current_floor = next;

            self.emit(EventKind::FloorReached {
                floor: next,
                motion_state: self.motion_state,
                door_state: self.door_state,
            });
            self.handle_boarding_and_disembarking();

            info!(
                "[Elevator #{}] Currently on floor: {}, Moving {} at {}...Current capacity: {}/{}...Door is now closed.",
                self.id,
                self.current_floor,
                direction,
                self.movement_speed,
                self.capacity.capacity(),
                self.capacity.max_capacity()
            );
        }

        self.stop_in_place();
        self.emit(EventKind::Arrived { floor: target });
        Ok(())
    }

    /// Boards `id` if it is waiting on the current floor and fits in the car.
    pub fn board_request(&mut self, id: RequestId) -> BoardOutcome {
        let index = match self.position(id) {
            Some(index) => index,
            None => return BoardOutcome::NotApplicable,
        };
        let request = &self.requests[index].request;
        if request.on_board || request.departure_floor != self.current_floor {
            return BoardOutcome::NotApplicable;
        }

        let passengers = request.passenger_count;
        if !self.capacity.try_board(passengers) {
            warn!(
                "[Elevator #{}] Cannot board {} passengers at floor {}: capacity would be exceeded ({}/{}).",
                self.id,
                passengers,
                self.current_floor,
                self.capacity.capacity(),
                self.capacity.max_capacity()
            );
            self.emit(EventKind::BoardingDeferred {
                request: id,
                floor: self.current_floor,
                capacity: self.capacity.capacity(),
            });
            return BoardOutcome::Deferred;
        }

        self.requests[index].request.on_board = true;
        info!(
            "[Elevator #{}] Boarded {} passengers at floor {}. Current capacity: {}/{}.",
            self.id,
            passengers,
            self.current_floor,
            self.capacity.capacity(),
            self.capacity.max_capacity()
        );
        self.emit(EventKind::Boarded {
            request: id,
            floor: self.current_floor,
            capacity: self.capacity.capacity(),
        });
        BoardOutcome::Boarded
    }

    /// Lets `id` off if it is onboard and this is its destination. The request is then gone.
    pub fn disembark_request(&mut self, id: RequestId) -> bool {
        let index = match self.position(id) {
            Some(index) => index,
            None => return false,
        };
        let request = &self.requests[index].request;
        if !request.on_board || request.destination_floor != self.current_floor {
            return false;
        }

        let removed = self.requests.remove(index);
        self.capacity.disembark(removed.request.passenger_count);
        info!(
            "[Elevator #{}] Disembarked {} passengers at floor {}. Current capacity: {}/{}.",
            self.id,
            removed.request.passenger_count,
            self.current_floor,
            self.capacity.capacity(),
            self.capacity.max_capacity()
        );
        self.emit(EventKind::Disembarked {
            request: id,
            floor: self.current_floor,
            capacity: self.capacity.capacity(),
        });
        true
    }

    /// One boarding and disembarking pass over a snapshot of the active set.
    pub fn handle_boarding_and_disembarking(&mut self) {
        self.collect_requests();

        let snapshot: Vec<RequestId> = self.requests.iter().map(|r| r.id).collect();
        for id in snapshot {
            self.board_request(id);
            self.disembark_request(id);
        }
        self.publish();
    }

    fn service(&mut self, target: Target, cancel: &CancelToken) -> Result<(), Cancelled> {
        debug!(
            "[Elevator #{}] Next target: {:?} of request #{} at {}.",
            self.id, target.kind, target.request, target.floor
        );
        if self.current_floor == target.floor {
            // Already here, so no tick will run the pass for us.
            self.handle_boarding_and_disembarking();
            Ok(())
        } else {
            self.move_to(target.floor, cancel)
        }
    }

    fn wait_for_request(&mut self, cancel: &CancelToken) -> Result<(), StopReason> {
        let request_rx = self.request_rx.clone();
        cbc::select! {
            recv(request_rx) -> msg => match msg {
                Ok(request) => {
                    self.add_request(request);
                    Ok(())
                }
                Err(_) => Err(StopReason::InboxClosed),
            },
            recv(cancel.receiver()) -> _ => Err(StopReason::Cancelled),
        }
    }

    fn collect_requests(&mut self) {
        while let Ok(request) = self.request_rx.try_recv() {
            self.add_request(request);
        }
    }

    fn stop_in_place(&mut self) {
        self.motion_state = MotionState::Stationary;
        self.door_state = DoorState::Opened;
        self.publish();
    }

    fn position(&self, id: RequestId) -> Option<usize> {
        self.requests.iter().position(|r| r.id == id)
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    fn emit(&self, kind: EventKind) {
        if let Some(event_tx) = &self.event_tx {
            let _ = event_tx.send(ElevatorEvent {
                elevator: self.id,
                kind,
            });
        }
    }
}
