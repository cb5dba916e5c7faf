//! Text key bindings for the interactive companion.
//!
//! Lower-case keys are the plain bindings and upper-case keys the
//! SHIFT+key bindings.

use crate::control::{programming_error, ControlError};
use crate::core::{Command, Gear};

pub const KEY_HELP: &str = "\
 ------- Keyboard Controls ------
| Key       | function           |
 --------------------------------
| q         | engine start/stop  |
| w         | accelerate         |
| s         | decelerate/brake   |
| a         | left turn          |
| d         | right turn         |
| A         | left signal        |
| D         | right signal       |
| l         | low beam           |
| L         | high beam          |
| p         | parking brake      |
| x         | emergency brake    |
| up        | gear shift up      |
| down      | gear shift down    |
| gear NAME | shift to gear NAME |
| state     | show vehicle state |
| history   | show gear changes  |
| exit      | quit               |
 --------------------------------";

/// One parsed line of operator input.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    Command(Command),
    ShowState,
    ShowHistory,
    Help,
    Quit,
    Unknown(String),
}

/// Parse one input line; blank lines yield `None`.
///
/// An unknown gear name is a programming error, not an unknown key.
pub fn parse(line: &str) -> Result<Option<Input>, ControlError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(name) = line.strip_prefix("gear ") {
        let gear: Gear = name
            .trim()
            .parse()
            .map_err(|err| programming_error(format!("{err}")))?;
        return Ok(Some(Input::Command(Command::ShiftGear(gear))));
    }

    let input = match line {
        "q" => Input::Command(Command::ToggleEnginePower),
        "w" => Input::Command(Command::Accelerate),
        "s" => Input::Command(Command::Decelerate),
        "a" => Input::Command(Command::SteerLeft),
        "d" => Input::Command(Command::SteerRight),
        "A" => Input::Command(Command::ToggleLeftSignal),
        "D" => Input::Command(Command::ToggleRightSignal),
        "l" => Input::Command(Command::ToggleLowBeam),
        "L" => Input::Command(Command::ToggleHighBeam),
        "p" => Input::Command(Command::ToggleParkingBrake),
        "x" => Input::Command(Command::EmergencyBrake),
        "up" => Input::Command(Command::ShiftUp),
        "down" => Input::Command(Command::ShiftDown),
        "state" => Input::ShowState,
        "history" => Input::ShowHistory,
        "help" | "?" => Input::Help,
        "exit" | "quit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    };
    Ok(Some(input))
}
