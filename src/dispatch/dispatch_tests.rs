/*
 * Unit tests for the dispatch surface
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 *  - boot validation and initial status
 *  - addressing failures
 *  - starting loops and driving parked elevators
 *  - independent elevators running concurrently
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatch_tests {
    use crate::config::ElevatorConfig;
    use crate::dispatch::Dispatch;
    use crate::elevator::{ElevatorEvent, EventKind, StopReason};
    use crate::shared::{
        CancelSource, CancelToken, ConfigError, DispatchError, DoorState, ElevatorId, Floor,
        MotionState, Request,
    };
    use crossbeam_channel::Receiver;
    use std::collections::HashSet;
    use std::time::Duration;

    fn fast_config() -> ElevatorConfig {
        ElevatorConfig {
            max_capacity: 10,
            movement_delay_ms: 5,
            boot_floor: Floor::Ground,
        }
    }

    fn wait_for_arrivals(
        event_rx: &Receiver<ElevatorEvent>,
        expected: &[(ElevatorId, Floor)],
    ) -> Vec<ElevatorEvent> {
        let mut outstanding: HashSet<(ElevatorId, Floor)> = expected.iter().copied().collect();
        let mut seen = Vec::new();
        while !outstanding.is_empty() {
            match event_rx.recv_timeout(Duration::from_secs(3)) {
                Ok(event) => {
                    if let EventKind::Arrived { floor } = event.kind {
                        outstanding.remove(&(event.elevator, floor));
                    }
                    seen.push(event);
                }
                Err(e) => panic!("Timed out waiting for {:?}: {:?}", outstanding, e),
            }
        }
        seen
    }

    #[test]
    fn test_boot_rejects_zero_elevators() {
        let result = Dispatch::boot(0, &fast_config());
        assert!(matches!(result, Err(ConfigError::NoElevators)));
    }

    #[test]
    fn test_boot_rejects_invalid_elevator_config() {
        let config = ElevatorConfig {
            movement_delay_ms: 0,
            ..fast_config()
        };
        assert!(matches!(
            Dispatch::boot(2, &config),
            Err(ConfigError::ZeroMovementDelay)
        ));
    }

    #[test]
    fn test_boot_initial_status() {
        // Arrange
        let config = ElevatorConfig {
            max_capacity: 20,
            movement_delay_ms: 1000,
            boot_floor: Floor::Ground,
        };

        // Act
        let dispatch = Dispatch::boot(3, &config).unwrap();

        // Assert
        assert_eq!(dispatch.ids(), vec![0, 1, 2]);
        assert_eq!(dispatch.len(), 3);
        let statuses = dispatch.statuses();
        assert_eq!(statuses.len(), 3);
        for (expected_id, status) in statuses.iter().enumerate() {
            assert_eq!(status.id, expected_id);
            assert_eq!(status.current_floor, Floor::Ground);
            assert_eq!(status.motion_state, MotionState::Stationary);
            assert_eq!(status.door_state, DoorState::Opened);
            assert_eq!(status.capacity, 0);
            assert_eq!(status.max_capacity, 20);
            assert_eq!(status.movement_speed, "1 m/s");
        }
    }

    #[test]
    fn test_submit_to_unknown_elevator_is_reported() {
        let dispatch = Dispatch::boot(2, &fast_config()).unwrap();
        let request = Request::new(2, Floor::Ground, Floor::FirstFloor);

        let result = dispatch.submit(7, request.clone());
        dispatch.add_request(7, request);

        assert!(matches!(result, Err(DispatchError::UnknownElevator(7))));
        assert_eq!(dispatch.pending_submissions(0).unwrap(), 0);
        assert_eq!(dispatch.pending_submissions(1).unwrap(), 0);
        assert!(matches!(
            dispatch.status(7),
            Err(DispatchError::UnknownElevator(7))
        ));
    }

    #[test]
    fn test_submit_queues_on_addressed_elevator_only() {
        let dispatch = Dispatch::boot(2, &fast_config()).unwrap();

        dispatch
            .submit(1, Request::new(2, Floor::Ground, Floor::FirstFloor))
            .unwrap();
        dispatch.add_request(1, Request::new(1, Floor::SecondFloor, Floor::Ground));

        assert_eq!(dispatch.pending_submissions(0).unwrap(), 0);
        assert_eq!(dispatch.pending_submissions(1).unwrap(), 2);
    }

    #[test]
    fn test_move_to_parked_elevator() {
        // Arrange
        let dispatch = Dispatch::boot(2, &fast_config()).unwrap();

        // Act
        dispatch
            .move_to(1, Floor::SecondFloor, &CancelToken::never())
            .unwrap();

        // Assert
        let moved = dispatch.status(1).unwrap();
        assert_eq!(moved.current_floor, Floor::SecondFloor);
        assert_eq!(moved.motion_state, MotionState::Stationary);
        assert_eq!(moved.door_state, DoorState::Opened);
        assert_eq!(dispatch.status(0).unwrap().current_floor, Floor::Ground);
    }

    #[test]
    fn test_move_to_cancelled() {
        let config = ElevatorConfig {
            movement_delay_ms: 60_000,
            ..fast_config()
        };
        let dispatch = Dispatch::boot(1, &config).unwrap();
        let mut source = CancelSource::new();
        let cancel = source.token();
        source.cancel();

        let result = dispatch.move_to(0, Floor::ThirdFloor, &cancel);

        assert!(matches!(result, Err(DispatchError::Cancelled(0))));
        let parked = dispatch.status(0).unwrap();
        assert_eq!(parked.current_floor, Floor::Ground);
        assert_eq!(parked.motion_state, MotionState::Stationary);
        assert_eq!(parked.door_state, DoorState::Opened);
    }

    #[test]
    fn test_started_after_cancelled_move_idles_stationary() {
        // Arrange
        let config = ElevatorConfig {
            movement_delay_ms: 60_000,
            ..fast_config()
        };
        let (dispatch, event_rx) = Dispatch::boot_with_events(1, &config).unwrap();
        let mut cancelled_move = CancelSource::new();
        let cancel = cancelled_move.token();
        cancelled_move.cancel();
        let _ = dispatch.move_to(0, Floor::ThirdFloor, &cancel);

        // Act
        let mut source = CancelSource::new();
        let elevator_thread = dispatch.start(0, source.token()).unwrap();
        dispatch
            .submit(0, Request::new(2, Floor::Ground, Floor::Ground))
            .unwrap();
        loop {
            match event_rx.recv_timeout(Duration::from_secs(3)) {
                Ok(event) if matches!(event.kind, EventKind::Disembarked { .. }) => break,
                Ok(_) => {}
                Err(e) => panic!("Timed out waiting for disembark: {:?}", e),
            }
        }

        // Assert
        let idle = dispatch.status(0).unwrap();
        assert_eq!(idle.current_floor, Floor::Ground);
        assert_eq!(idle.motion_state, MotionState::Stationary);
        assert_eq!(idle.door_state, DoorState::Opened);

        // Cleanup
        source.cancel();
        assert_eq!(elevator_thread.join().unwrap(), StopReason::Cancelled);
    }

    #[test]
    fn test_started_elevator_cannot_be_started_or_driven_again() {
        // Arrange
        let dispatch = Dispatch::boot(1, &fast_config()).unwrap();
        let mut source = CancelSource::new();
        let elevator_thread = dispatch.start(0, source.token()).unwrap();

        // Act
        let second_start = dispatch.start(0, source.token());
        let direct_move = dispatch.move_to(0, Floor::FirstFloor, &CancelToken::never());

        // Assert
        assert!(matches!(second_start, Err(DispatchError::AlreadyStarted(0))));
        assert!(matches!(direct_move, Err(DispatchError::Running(0))));

        // Cleanup
        source.cancel();
        assert_eq!(elevator_thread.join().unwrap(), StopReason::Cancelled);
    }

    #[test]
    fn test_submit_after_loop_stopped_is_offline() {
        let dispatch = Dispatch::boot(1, &fast_config()).unwrap();
        let mut source = CancelSource::new();
        let elevator_thread = dispatch.start(0, source.token()).unwrap();
        source.cancel();
        elevator_thread.join().unwrap();

        let result = dispatch.submit(0, Request::new(1, Floor::Ground, Floor::FirstFloor));

        assert!(matches!(result, Err(DispatchError::Offline(0))));
        assert_eq!(dispatch.status(0).unwrap().motion_state, MotionState::Offline);
    }

    #[test]
    fn test_elevators_run_independently() {
        // Arrange
        let (dispatch, event_rx) = Dispatch::boot_with_events(2, &fast_config()).unwrap();
        let mut source = CancelSource::new();
        let handles = dispatch.start_all(&source.token()).unwrap();

        // Act
        dispatch
            .submit(0, Request::new(3, Floor::Ground, Floor::FirstFloor))
            .unwrap();
        dispatch
            .submit(1, Request::new(2, Floor::Ground, Floor::Basement))
            .unwrap();
        let events = wait_for_arrivals(
            &event_rx,
            &[(0, Floor::FirstFloor), (1, Floor::Basement)],
        );

        // Assert
        let first = dispatch.status(0).unwrap();
        let second = dispatch.status(1).unwrap();
        assert_eq!(first.current_floor, Floor::FirstFloor);
        assert_eq!(second.current_floor, Floor::Basement);
        assert_eq!(first.capacity + second.capacity, 0);
        for elevator in [0, 1] {
            assert!(events.iter().any(|event| event.elevator == elevator
                && matches!(event.kind, EventKind::Disembarked { .. })));
        }

        // Cleanup
        source.cancel();
        for (_, handle) in handles {
            assert_eq!(handle.join().unwrap(), StopReason::Cancelled);
        }
        assert!(dispatch
            .statuses()
            .iter()
            .all(|status| status.motion_state == MotionState::Offline));
    }
}
