//! Property-based tests for the command transition table.
//!
//! These tests use proptest to drive arbitrary command sequences through the
//! pure rules and check the invariants that must hold after every step.

use chrono::Utc;
use proptest::prelude::*;
use vehicle_companion::config::Limits;
use vehicle_companion::core::{
    rules, Command, Gear, GuardRejection, GuardViolation, HoldSpeed, Plan, RuleContext,
    VehicleState,
};

fn apply(command: Command, state: &VehicleState) -> Result<Plan, GuardRejection> {
    let limits = Limits::default();
    let ctx = RuleContext {
        limits: &limits,
        now: Utc::now(),
        trip_started_at: None,
        engine_stop_hook: &HoldSpeed,
    };
    rules::plan(&command, state, &ctx)
}

fn step(command: Command, state: VehicleState) -> VehicleState {
    match apply(command, &state) {
        Ok(plan) => state.with_writes(&plan.writes),
        Err(_) => state,
    }
}

fn running() -> VehicleState {
    VehicleState {
        engine_running: true,
        ..VehicleState::default()
    }
}

prop_compose! {
    fn arbitrary_gear()(variant in 0..5usize) -> Gear {
        Gear::SEQUENCE[variant]
    }
}

prop_compose! {
    fn arbitrary_command()(variant in 0..14u8, gear in arbitrary_gear()) -> Command {
        match variant {
            0 => Command::Accelerate,
            1 => Command::Decelerate,
            2 => Command::SteerLeft,
            3 => Command::SteerRight,
            4 => Command::ToggleLeftSignal,
            5 => Command::ToggleRightSignal,
            6 => Command::ToggleLowBeam,
            7 => Command::ToggleHighBeam,
            8 => Command::ToggleEnginePower,
            9 => Command::ShiftGear(gear),
            10 => Command::ToggleParkingBrake,
            11 => Command::ShiftUp,
            12 => Command::ShiftDown,
            _ => Command::EmergencyBrake,
        }
    }
}

prop_compose! {
    fn arbitrary_state()(
        speed in -240i32..=240,
        steering in -40i32..=40,
        gear in arbitrary_gear(),
        engine_running in any::<bool>(),
        parking_brake_engaged in any::<bool>(),
    ) -> VehicleState {
        VehicleState {
            speed: speed as f32,
            steering_angle: steering as f32,
            gear,
            engine_running,
            parking_brake_engaged,
            is_moving: speed != 0,
            ..VehicleState::default()
        }
    }
}

proptest! {
    #[test]
    fn acceleration_from_rest_increases_until_clamped(presses in 1usize..80) {
        let mut state = running();
        for i in 1..=presses {
            let before = state.speed;
            state = step(Command::Accelerate, state);
            let expected = (5.0 * i as f32).min(240.0);
            prop_assert_eq!(state.speed, expected);
            if before < 240.0 {
                prop_assert!(state.speed > before);
            }
            prop_assert_eq!(state.gear, Gear::Drive);
        }
    }

    #[test]
    fn steering_stays_within_limits(turns in prop::collection::vec(any::<bool>(), 0..60)) {
        let mut state = running();
        for left in turns {
            let command = if left { Command::SteerLeft } else { Command::SteerRight };
            state = step(command, state);
            prop_assert!((-40.0..=40.0).contains(&state.steering_angle));
        }
    }

    #[test]
    fn speed_stays_within_limits(
        start in arbitrary_state(),
        commands in prop::collection::vec(arbitrary_command(), 0..60),
    ) {
        let mut state = start;
        for command in commands {
            state = step(command, state);
            prop_assert!((-240.0..=240.0).contains(&state.speed));
            prop_assert!((-40.0..=40.0).contains(&state.steering_angle));
        }
    }

    #[test]
    fn zero_crossing_selects_direction_gear(start in arbitrary_state()) {
        let state = VehicleState { engine_running: true, parking_brake_engaged: false, ..start };

        let forward = step(Command::Accelerate, state.clone());
        if state.speed <= 0.0 && forward.speed > 0.0 {
            prop_assert_eq!(forward.gear, Gear::Drive);
        }
        if forward.speed == 0.0 {
            prop_assert_eq!(forward.gear, Gear::Neutral);
        }

        let backward = step(Command::Decelerate, state.clone());
        if state.speed >= 0.0 && backward.speed < 0.0 {
            prop_assert_eq!(backward.gear, Gear::Reverse);
        }
    }

    #[test]
    fn movement_with_engine_off_writes_nothing(
        start in arbitrary_state(),
        command in arbitrary_command(),
    ) {
        let state = VehicleState { engine_running: false, ..start };
        if command.affects_movement() {
            let rejection = apply(command, &state).unwrap_err();
            prop_assert!(rejection.contains(&GuardViolation::EngineOff));
        }
    }

    #[test]
    fn parking_brake_toggle_always_succeeds(start in arbitrary_state()) {
        let plan = apply(Command::ToggleParkingBrake, &start).unwrap();
        let after = start.clone().with_writes(&plan.writes);
        prop_assert_eq!(after.parking_brake_engaged, !start.parking_brake_engaged);
    }

    #[test]
    fn park_and_reverse_refused_while_moving_forward(
        start in arbitrary_state(),
        speed in 1i32..=240,
    ) {
        let state = VehicleState {
            engine_running: true,
            parking_brake_engaged: false,
            speed: speed as f32,
            ..start
        };
        prop_assert!(apply(Command::ShiftGear(Gear::Park), &state).is_err());
        prop_assert!(apply(Command::ShiftGear(Gear::Reverse), &state).is_err());
    }

    #[test]
    fn rejected_commands_leave_state_unchanged(
        start in arbitrary_state(),
        command in arbitrary_command(),
    ) {
        if apply(command, &start).is_err() {
            prop_assert_eq!(step(command, start.clone()), start);
        }
    }
}

#[test]
fn reverse_to_zero_selects_neutral_not_drive() {
    let state = VehicleState {
        speed: -5.0,
        gear: Gear::Reverse,
        ..running()
    };
    let after = step(Command::Accelerate, state);
    assert_eq!(after.speed, 0.0);
    assert_eq!(after.gear, Gear::Neutral);
}

#[test]
fn park_rejection_at_speed_is_a_guard_rejection() {
    let state = VehicleState {
        speed: 10.0,
        gear: Gear::Drive,
        ..running()
    };
    let rejection = apply(Command::ShiftGear(Gear::Park), &state).unwrap_err();
    assert!(rejection.contains(&GuardViolation::VehicleMoving {
        speed: 10.0,
        target: Gear::Park,
    }));
    assert_eq!(step(Command::ShiftGear(Gear::Park), state.clone()), state);
}
