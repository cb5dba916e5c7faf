//! Transition table for operator commands.
//!
//! [`plan`] is the single authority on what a command does: it picks the
//! command's guard, evaluates it against a snapshot, and returns the ordered
//! writes the shell must commit. Nothing here touches the cache or the store.

use super::catalog::SignalPath;
use super::command::Command;
use super::gear::Gear;
use super::guard::{self, Guard, GuardRejection};
use super::history::ShiftCause;
use super::state::{SignalWrite, VehicleState};
use super::trip::{trip_seconds, TripEvent};
use super::value::SignalValue;
use crate::config::Limits;
use chrono::{DateTime, Utc};

/// Hook consulted when the engine is switched off.
///
/// Implementations decide whether a moving vehicle loses speed when its
/// engine stops. [`HoldSpeed`] leaves speed untouched.
pub trait EngineStopHook: Send + Sync {
    /// Extra writes appended after `EngineRunning=false`.
    fn on_engine_stop(&self, state: &VehicleState) -> Vec<SignalWrite>;
}

/// Engine stop leaves the rest of the vehicle state alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoldSpeed;

impl EngineStopHook for HoldSpeed {
    fn on_engine_stop(&self, _state: &VehicleState) -> Vec<SignalWrite> {
        Vec::new()
    }
}

/// Inputs a transition needs besides the snapshot.
pub struct RuleContext<'a> {
    pub limits: &'a Limits,
    pub now: DateTime<Utc>,
    /// Start of the running trip as tracked by the controller.
    pub trip_started_at: Option<DateTime<Utc>>,
    pub engine_stop_hook: &'a dyn EngineStopHook,
}

/// Gear the plan moves the transmission into, and why.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedShift {
    pub to: Gear,
    pub cause: ShiftCause,
}

/// Ordered outcome of an accepted command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub writes: Vec<SignalWrite>,
    pub trip: Option<TripEvent>,
    pub shift: Option<PlannedShift>,
}

impl Plan {
    fn writes(writes: Vec<SignalWrite>) -> Self {
        Self {
            writes,
            ..Self::default()
        }
    }

    fn single(write: SignalWrite) -> Self {
        Self::writes(vec![write])
    }

    pub fn is_noop(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Gear a shift command moves into, given the gear currently engaged.
///
/// `None` for commands that are not shifts.
pub fn target_gear(command: &Command, state: &VehicleState) -> Option<Gear> {
    match command {
        Command::ShiftGear(target) => Some(*target),
        Command::ShiftUp => Some(state.gear.up()),
        Command::ShiftDown => Some(state.gear.down()),
        _ => None,
    }
}

/// Guard that must pass before `command` may run against `state`, if any.
///
/// Shifts use the guard of the gear they resolve to. Lights, signals, the
/// parking brake and engine power are deliberately unguarded.
pub fn guard_for(command: &Command, state: &VehicleState) -> Option<Guard> {
    match command {
        Command::Accelerate
        | Command::Decelerate
        | Command::SteerLeft
        | Command::SteerRight
        | Command::EmergencyBrake => Some(guard::allowed_to_move()),
        Command::ShiftGear(_) | Command::ShiftUp | Command::ShiftDown => {
            match target_gear(command, state) {
                Some(Gear::Park) => Some(guard::allowed_to_park()),
                Some(Gear::Reverse) => Some(guard::allowed_to_reverse()),
                _ => Some(guard::allowed_to_move()),
            }
        }
        Command::ToggleLeftSignal
        | Command::ToggleRightSignal
        | Command::ToggleLowBeam
        | Command::ToggleHighBeam
        | Command::ToggleEnginePower
        | Command::ToggleParkingBrake => None,
    }
}

/// Evaluate `command` against `state`.
///
/// A rejected command yields no writes.
pub fn plan(
    command: &Command,
    state: &VehicleState,
    ctx: &RuleContext<'_>,
) -> Result<Plan, GuardRejection> {
    if let Some(guard) = guard_for(command, state) {
        guard.evaluate(state)?;
    }

    let limits = ctx.limits;
    let plan = match command {
        Command::Accelerate => accelerate(state, limits),
        Command::Decelerate => decelerate(state, limits),
        Command::SteerLeft => steer(state, limits, limits.steering_increment),
        Command::SteerRight => steer(state, limits, -limits.steering_increment),
        Command::ToggleLeftSignal => toggle(SignalPath::LeftSignal, state.left_signal),
        Command::ToggleRightSignal => toggle(SignalPath::RightSignal, state.right_signal),
        Command::ToggleLowBeam => toggle(SignalPath::LowBeam, state.low_beam),
        Command::ToggleHighBeam => toggle(SignalPath::HighBeam, state.high_beam),
        Command::ToggleParkingBrake => {
            toggle(SignalPath::ParkingBrakeEngaged, state.parking_brake_engaged)
        }
        Command::ToggleEnginePower => engine_power(state, ctx),
        Command::ShiftGear(_) | Command::ShiftUp | Command::ShiftDown => {
            match target_gear(command, state) {
                Some(target) => shift(target),
                None => Plan::default(),
            }
        }
        Command::EmergencyBrake => emergency_brake(state, limits),
    };
    Ok(plan)
}

pub fn clamp_speed(speed: f32, limits: &Limits) -> f32 {
    speed.clamp(-limits.max_speed, limits.max_speed)
}

pub fn clamp_steering(angle: f32, limits: &Limits) -> f32 {
    angle.clamp(-limits.max_steering_angle, limits.max_steering_angle)
}

/// Bring a value reported by the store within `limits`.
///
/// Speed and steering angle are clamped; every other signal passes through.
///
/// ```rust
/// use vehicle_companion::config::Limits;
/// use vehicle_companion::core::{rules, SignalPath, SignalValue};
///
/// let limits = Limits::default();
/// assert_eq!(
///     rules::clamp_reported(SignalPath::Speed, SignalValue::Float(900.0), &limits),
///     SignalValue::Float(240.0)
/// );
/// ```
pub fn clamp_reported(path: SignalPath, value: SignalValue, limits: &Limits) -> SignalValue {
    match (path, value) {
        (SignalPath::Speed, SignalValue::Float(v)) => SignalValue::Float(clamp_speed(v, limits)),
        (SignalPath::SteeringAngle, SignalValue::Float(v)) => {
            SignalValue::Float(clamp_steering(v, limits))
        }
        (_, value) => value,
    }
}

fn accelerate(state: &VehicleState, limits: &Limits) -> Plan {
    let original = state.speed;
    let speed = clamp_speed(original + limits.speed_increment, limits);

    if speed == 0.0 {
        return come_to_rest();
    }
    if speed > 0.0 {
        return drive_at(speed, original <= 0.0, Gear::Drive);
    }
    brake_pulse(speed, limits)
}

fn decelerate(state: &VehicleState, limits: &Limits) -> Plan {
    let original = state.speed;
    let speed = clamp_speed(original - limits.speed_increment, limits);

    if speed == 0.0 {
        return come_to_rest();
    }
    if speed < 0.0 {
        return drive_at(speed, original >= 0.0, Gear::Reverse);
    }
    brake_pulse(speed, limits)
}

/// Speed reached zero: Neutral, not moving, speed 0.
fn come_to_rest() -> Plan {
    Plan {
        writes: vec![
            SignalWrite::gear(Gear::Neutral),
            SignalWrite::bool(SignalPath::IsMoving, false),
            SignalWrite::float(SignalPath::Speed, 0.0),
        ],
        shift: Some(PlannedShift {
            to: Gear::Neutral,
            cause: ShiftCause::Stop,
        }),
        ..Plan::default()
    }
}

/// Moving at `speed`, engaging `direction` first when speed crossed zero.
fn drive_at(speed: f32, crossed_zero: bool, direction: Gear) -> Plan {
    let mut plan = Plan::default();
    if crossed_zero {
        plan.writes.push(SignalWrite::gear(direction));
        plan.shift = Some(PlannedShift {
            to: direction,
            cause: ShiftCause::ZeroCrossing,
        });
    }
    plan.writes.push(SignalWrite::bool(SignalPath::IsMoving, true));
    plan.writes.push(SignalWrite::float(SignalPath::Speed, speed));
    plan
}

/// Pedal pressed, speed applied, pedal released.
fn brake_pulse(speed: f32, limits: &Limits) -> Plan {
    Plan::writes(vec![
        SignalWrite::brake_pedal(limits.brake_pulse_position),
        SignalWrite::float(SignalPath::Speed, speed),
        SignalWrite::brake_pedal(0),
    ])
}

fn steer(state: &VehicleState, limits: &Limits, delta: f32) -> Plan {
    let angle = clamp_steering(state.steering_angle + delta, limits);
    Plan::single(SignalWrite::float(SignalPath::SteeringAngle, angle))
}

fn toggle(path: SignalPath, current: bool) -> Plan {
    Plan::single(SignalWrite::bool(path, !current))
}

fn shift(target: Gear) -> Plan {
    Plan {
        writes: vec![SignalWrite::gear(target)],
        shift: Some(PlannedShift {
            to: target,
            cause: ShiftCause::Operator,
        }),
        ..Plan::default()
    }
}

fn engine_power(state: &VehicleState, ctx: &RuleContext<'_>) -> Plan {
    if !state.engine_running {
        return Plan {
            writes: vec![
                SignalWrite::new(SignalPath::TripStartTime, SignalValue::Timestamp(Some(ctx.now))),
                SignalWrite::float(SignalPath::TripDuration, 0.0),
                SignalWrite::bool(SignalPath::EngineRunning, true),
            ],
            trip: Some(TripEvent::Started(ctx.now)),
            ..Plan::default()
        };
    }

    // A trip already running at startup only has the store's start time.
    let started = ctx.trip_started_at.or(state.trip_start_time);
    let duration = started.map_or(0.0, |start| trip_seconds(start, ctx.now));

    let mut writes = vec![
        SignalWrite::float(SignalPath::TripDuration, duration),
        SignalWrite::bool(SignalPath::EngineRunning, false),
    ];
    writes.extend(ctx.engine_stop_hook.on_engine_stop(state));

    Plan {
        writes,
        trip: Some(TripEvent::Stopped),
        ..Plan::default()
    }
}

/// Stop in one step while the EBA flag is asserted.
///
/// No deceleration curve is modelled: the flag goes up, the pedal is
/// floored, speed drops to zero, then pedal and flag are released.
fn emergency_brake(state: &VehicleState, limits: &Limits) -> Plan {
    if state.speed == 0.0 {
        return Plan::default();
    }
    Plan::writes(vec![
        SignalWrite::bool(SignalPath::EmergencyBrakeDetected, true),
        SignalWrite::brake_pedal(limits.emergency_brake_position),
        SignalWrite::float(SignalPath::Speed, 0.0),
        SignalWrite::bool(SignalPath::IsMoving, false),
        SignalWrite::brake_pedal(0),
        SignalWrite::bool(SignalPath::EmergencyBrakeDetected, false),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::guard::GuardViolation;
    use chrono::Duration;

    fn limits() -> Limits {
        Limits::default()
    }

    fn run(command: Command, state: &VehicleState) -> Result<Plan, GuardRejection> {
        run_at(command, state, Utc::now(), None)
    }

    fn run_at(
        command: Command,
        state: &VehicleState,
        now: DateTime<Utc>,
        trip_started_at: Option<DateTime<Utc>>,
    ) -> Result<Plan, GuardRejection> {
        let limits = limits();
        let ctx = RuleContext {
            limits: &limits,
            now,
            trip_started_at,
            engine_stop_hook: &HoldSpeed,
        };
        plan(&command, state, &ctx)
    }

    fn driving(speed: f32, gear: Gear) -> VehicleState {
        VehicleState {
            engine_running: true,
            speed,
            gear,
            ..VehicleState::default()
        }
    }

    fn paths(plan: &Plan) -> Vec<SignalPath> {
        plan.writes.iter().map(|w| w.path).collect()
    }

    #[test]
    fn accelerate_from_rest_engages_drive() {
        let state = driving(0.0, Gear::Park);
        let plan = run(Command::Accelerate, &state).unwrap();

        assert_eq!(
            plan.writes,
            vec![
                SignalWrite::gear(Gear::Drive),
                SignalWrite::bool(SignalPath::IsMoving, true),
                SignalWrite::float(SignalPath::Speed, 5.0),
            ]
        );
        assert_eq!(
            plan.shift,
            Some(PlannedShift {
                to: Gear::Drive,
                cause: ShiftCause::ZeroCrossing
            })
        );
    }

    #[test]
    fn accelerate_while_moving_keeps_gear() {
        let plan = run(Command::Accelerate, &driving(20.0, Gear::Drive)).unwrap();
        assert_eq!(paths(&plan), vec![SignalPath::IsMoving, SignalPath::Speed]);
        assert!(plan.shift.is_none());
    }

    #[test]
    fn accelerate_from_reverse_to_zero_selects_neutral() {
        let plan = run(Command::Accelerate, &driving(-5.0, Gear::Reverse)).unwrap();
        let after = driving(-5.0, Gear::Reverse).with_writes(&plan.writes);

        assert_eq!(after.speed, 0.0);
        assert_eq!(after.gear, Gear::Neutral);
        assert!(!after.is_moving);
    }

    #[test]
    fn accelerate_while_reversing_fast_pulses_brake() {
        let plan = run(Command::Accelerate, &driving(-20.0, Gear::Reverse)).unwrap();
        assert_eq!(
            plan.writes,
            vec![
                SignalWrite::brake_pedal(50),
                SignalWrite::float(SignalPath::Speed, -15.0),
                SignalWrite::brake_pedal(0),
            ]
        );
    }

    #[test]
    fn accelerate_clamps_at_max_speed() {
        let plan = run(Command::Accelerate, &driving(238.0, Gear::Drive)).unwrap();
        let after = driving(238.0, Gear::Drive).with_writes(&plan.writes);
        assert_eq!(after.speed, 240.0);
    }

    #[test]
    fn decelerate_to_zero_then_into_reverse() {
        let state = driving(5.0, Gear::Drive);
        let first = run(Command::Decelerate, &state).unwrap();
        let state = state.with_writes(&first.writes);
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.gear, Gear::Neutral);

        let second = run(Command::Decelerate, &state).unwrap();
        let state = state.with_writes(&second.writes);
        assert_eq!(state.speed, -5.0);
        assert_eq!(state.gear, Gear::Reverse);
        assert!(state.is_moving);
    }

    #[test]
    fn decelerate_while_moving_forward_pulses_brake() {
        let plan = run(Command::Decelerate, &driving(30.0, Gear::Drive)).unwrap();
        assert_eq!(
            plan.writes,
            vec![
                SignalWrite::brake_pedal(50),
                SignalWrite::float(SignalPath::Speed, 25.0),
                SignalWrite::brake_pedal(0),
            ]
        );
    }

    #[test]
    fn decelerate_clamps_at_max_reverse_speed() {
        let plan = run(Command::Decelerate, &driving(-239.0, Gear::Reverse)).unwrap();
        let after = driving(-239.0, Gear::Reverse).with_writes(&plan.writes);
        assert_eq!(after.speed, -240.0);
        assert!(plan.shift.is_none());
    }

    #[test]
    fn movement_with_engine_off_is_rejected() {
        let state = VehicleState::default();
        for command in [
            Command::Accelerate,
            Command::Decelerate,
            Command::SteerLeft,
            Command::SteerRight,
            Command::ShiftGear(Gear::Drive),
            Command::ShiftGear(Gear::Neutral),
            Command::ShiftGear(Gear::Manual),
            Command::ShiftGear(Gear::Reverse),
            Command::ShiftGear(Gear::Park),
            Command::EmergencyBrake,
        ] {
            let rejection = run(command, &state).unwrap_err();
            assert!(rejection.contains(&GuardViolation::EngineOff), "{command}");
        }
    }

    #[test]
    fn parking_brake_blocks_acceleration() {
        let state = VehicleState {
            parking_brake_engaged: true,
            ..driving(0.0, Gear::Park)
        };
        let rejection = run(Command::Accelerate, &state).unwrap_err();
        assert_eq!(
            rejection.violations,
            vec![GuardViolation::ParkingBrakeEngaged]
        );
    }

    #[test]
    fn steering_clamps_to_limits() {
        let near_left = VehicleState {
            steering_angle: 38.0,
            ..driving(0.0, Gear::Drive)
        };
        let left = run(Command::SteerLeft, &near_left).unwrap();
        assert_eq!(
            left.writes,
            vec![SignalWrite::float(SignalPath::SteeringAngle, 40.0)]
        );

        let full_right = VehicleState {
            steering_angle: -40.0,
            ..driving(0.0, Gear::Drive)
        };
        let right = run(Command::SteerRight, &full_right).unwrap();
        assert_eq!(
            right.writes,
            vec![SignalWrite::float(SignalPath::SteeringAngle, -40.0)]
        );
    }

    #[test]
    fn lights_and_signals_toggle_with_engine_off() {
        let state = VehicleState {
            low_beam: true,
            ..VehicleState::default()
        };
        assert_eq!(
            run(Command::ToggleLowBeam, &state).unwrap().writes,
            vec![SignalWrite::bool(SignalPath::LowBeam, false)]
        );
        assert_eq!(
            run(Command::ToggleLeftSignal, &state).unwrap().writes,
            vec![SignalWrite::bool(SignalPath::LeftSignal, true)]
        );
        assert_eq!(
            run(Command::ToggleHighBeam, &state).unwrap().writes,
            vec![SignalWrite::bool(SignalPath::HighBeam, true)]
        );
        assert_eq!(
            run(Command::ToggleRightSignal, &state).unwrap().writes,
            vec![SignalWrite::bool(SignalPath::RightSignal, true)]
        );
    }

    #[test]
    fn parking_brake_toggles_regardless_of_engine() {
        let state = VehicleState {
            parking_brake_engaged: true,
            ..VehicleState::default()
        };
        assert_eq!(
            run(Command::ToggleParkingBrake, &state).unwrap().writes,
            vec![SignalWrite::bool(SignalPath::ParkingBrakeEngaged, false)]
        );
    }

    #[test]
    fn park_refused_while_moving_forward() {
        let rejection =
            run(Command::ShiftGear(Gear::Park), &driving(10.0, Gear::Drive)).unwrap_err();
        assert!(rejection.contains(&GuardViolation::VehicleMoving {
            speed: 10.0,
            target: Gear::Park
        }));
    }

    #[test]
    fn park_allowed_with_parking_brake_engaged() {
        let state = VehicleState {
            parking_brake_engaged: true,
            ..driving(0.0, Gear::Neutral)
        };
        let plan = run(Command::ShiftGear(Gear::Park), &state).unwrap();
        assert_eq!(plan.writes, vec![SignalWrite::gear(Gear::Park)]);
    }

    #[test]
    fn reverse_depends_on_speed() {
        assert!(run(Command::ShiftGear(Gear::Reverse), &driving(0.0, Gear::Park)).is_ok());
        assert!(run(Command::ShiftGear(Gear::Reverse), &driving(10.0, Gear::Drive)).is_err());
        assert!(run(Command::ShiftGear(Gear::Reverse), &driving(-10.0, Gear::Neutral)).is_ok());
    }

    #[test]
    fn sequential_shift_resolves_against_current_gear() {
        let up = run(Command::ShiftUp, &driving(0.0, Gear::Neutral)).unwrap();
        assert_eq!(up.writes, vec![SignalWrite::gear(Gear::Drive)]);
        assert_eq!(
            up.shift,
            Some(PlannedShift {
                to: Gear::Drive,
                cause: ShiftCause::Operator
            })
        );

        let down = run(Command::ShiftDown, &driving(0.0, Gear::Drive)).unwrap();
        assert_eq!(down.writes, vec![SignalWrite::gear(Gear::Neutral)]);
    }

    #[test]
    fn sequential_shift_uses_target_gear_guard() {
        // Neutral -> Reverse while rolling forward
        let rejection = run(Command::ShiftDown, &driving(10.0, Gear::Neutral)).unwrap_err();
        assert!(rejection.contains(&GuardViolation::VehicleMoving {
            speed: 10.0,
            target: Gear::Reverse
        }));

        // Reverse -> Park with the parking brake engaged is still allowed
        let braked = VehicleState {
            parking_brake_engaged: true,
            ..driving(0.0, Gear::Reverse)
        };
        let plan = run(Command::ShiftDown, &braked).unwrap();
        assert_eq!(plan.writes, vec![SignalWrite::gear(Gear::Park)]);

        assert!(run(Command::ShiftUp, &VehicleState::default())
            .unwrap_err()
            .contains(&GuardViolation::EngineOff));
    }

    #[test]
    fn operator_shift_is_tagged() {
        let plan = run(Command::ShiftGear(Gear::Manual), &driving(30.0, Gear::Drive)).unwrap();
        assert_eq!(
            plan.shift,
            Some(PlannedShift {
                to: Gear::Manual,
                cause: ShiftCause::Operator
            })
        );
    }

    #[test]
    fn engine_start_records_trip_start() {
        let now = Utc::now();
        let plan = run_at(
            Command::ToggleEnginePower,
            &VehicleState::default(),
            now,
            None,
        )
        .unwrap();

        assert_eq!(
            paths(&plan),
            vec![
                SignalPath::TripStartTime,
                SignalPath::TripDuration,
                SignalPath::EngineRunning
            ]
        );
        assert_eq!(plan.writes[0].value, SignalValue::Timestamp(Some(now)));
        assert_eq!(plan.trip, Some(TripEvent::Started(now)));
    }

    #[test]
    fn engine_stop_writes_duration_before_engine_flag() {
        let start = Utc::now();
        let stop = start + Duration::seconds(42);
        let plan = run_at(
            Command::ToggleEnginePower,
            &driving(0.0, Gear::Park),
            stop,
            Some(start),
        )
        .unwrap();

        assert_eq!(
            plan.writes,
            vec![
                SignalWrite::float(SignalPath::TripDuration, 42.0),
                SignalWrite::bool(SignalPath::EngineRunning, false),
            ]
        );
        assert_eq!(plan.trip, Some(TripEvent::Stopped));
    }

    #[test]
    fn engine_stop_falls_back_to_stored_trip_start() {
        let start = Utc::now();
        let state = VehicleState {
            trip_start_time: Some(start),
            ..driving(0.0, Gear::Park)
        };
        let plan = run_at(
            Command::ToggleEnginePower,
            &state,
            start + Duration::seconds(10),
            None,
        )
        .unwrap();
        assert_eq!(plan.writes[0], SignalWrite::float(SignalPath::TripDuration, 10.0));
    }

    #[test]
    fn engine_stop_keeps_speed() {
        let plan = run(Command::ToggleEnginePower, &driving(50.0, Gear::Drive)).unwrap();
        assert!(!paths(&plan).contains(&SignalPath::Speed));
    }

    #[test]
    fn reported_speed_and_steering_are_clamped() {
        let limits = limits();
        assert_eq!(
            clamp_reported(SignalPath::Speed, SignalValue::Float(-500.0), &limits),
            SignalValue::Float(-240.0)
        );
        assert_eq!(
            clamp_reported(SignalPath::SteeringAngle, SignalValue::Float(-75.0), &limits),
            SignalValue::Float(-40.0)
        );
        assert_eq!(
            clamp_reported(SignalPath::TripDuration, SignalValue::Float(9_000.0), &limits),
            SignalValue::Float(9_000.0)
        );
    }

    #[test]
    fn emergency_brake_at_rest_is_noop() {
        let plan = run(Command::EmergencyBrake, &driving(0.0, Gear::Drive)).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn emergency_brake_stops_and_asserts_flag() {
        let state = driving(80.0, Gear::Drive);
        let plan = run(Command::EmergencyBrake, &state).unwrap();

        assert_eq!(
            plan.writes.first(),
            Some(&SignalWrite::bool(SignalPath::EmergencyBrakeDetected, true))
        );
        assert!(plan.writes.contains(&SignalWrite::brake_pedal(100)));

        let after = state.with_writes(&plan.writes);
        assert_eq!(after.speed, 0.0);
        assert!(!after.is_moving);
        assert!(!after.emergency_brake_detected);
        assert_eq!(after.brake_pedal_position, 0);
    }
}
