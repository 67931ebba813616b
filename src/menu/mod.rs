/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::io::{self, BufRead, Write};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatch::Dispatch;
use crate::shared::{ElevatorId, Floor, Request, RequestError};

/**
 * Text menu for driving a running bank of elevators by hand.
 *
 * Reads one answer per line from `input` and writes prompts to `output`. Choosing an elevator and
 * filling in a request is how a request gets assigned to that elevator. End of input leaves the
 * menu as if `0. Exit` had been chosen.
 */
pub struct Menu<'a, R, W> {
    dispatch: &'a Dispatch,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(dispatch: &'a Dispatch, input: R, output: W) -> Menu<'a, R, W> {
        Menu {
            dispatch,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\nElevator Control Menu:")?;
            for id in self.dispatch.ids() {
                writeln!(self.output, "{}. Control Elevator #{}", id + 1, id)?;
            }
            writeln!(self.output, "0. Exit")?;
            writeln!(self.output, "Select an elevator to control (or 0 to exit): ")?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(()),
            };
            match line.parse::<usize>() {
                Ok(0) => return Ok(()),
                Ok(selected) if self.dispatch.contains(selected - 1) => {
                    if !self.elevator_menu(selected - 1)? {
                        return Ok(());
                    }
                }
                _ => writeln!(self.output, "Invalid selection. Please try again.")?,
            }
        }
    }

    // Ok(false) means input ran out.
    fn elevator_menu(&mut self, id: ElevatorId) -> io::Result<bool> {
        loop {
            writeln!(self.output, "\nElevator #{} Menu:", id)?;
            writeln!(self.output, "1. Add Request")?;
            writeln!(self.output, "2. Show Status (All Elevators)")?;
            writeln!(self.output, "3. Back to Main Menu")?;
            writeln!(self.output, "Select an option: ")?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(false),
            };
            match line.as_str() {
                "1" => {
                    if !self.add_request(id)? {
                        return Ok(false);
                    }
                }
                "2" => self.show_status_all()?,
                "3" => return Ok(true),
                _ => writeln!(self.output, "Invalid choice, please try again.")?,
            }
        }
    }

    fn add_request(&mut self, id: ElevatorId) -> io::Result<bool> {
        let departure = match self.prompt_floor("Select Departure Floor:")? {
            Some(floor) => floor,
            None => return Ok(false),
        };
        let destination = match self.prompt_floor("Select Destination Floor:")? {
            Some(floor) => floor,
            None => return Ok(false),
        };
        let passengers = match self.prompt_passengers()? {
            Some(passengers) => passengers,
            None => return Ok(false),
        };

        match build_request(departure, destination, passengers) {
            Ok(request) => match self.dispatch.submit(id, request) {
                Ok(()) => writeln!(self.output, "Request submitted to Elevator #{}.", id)?,
                Err(e) => writeln!(self.output, "{}", e)?,
            },
            Err(e) => writeln!(self.output, "Request rejected: {}.", e)?,
        }
        Ok(true)
    }

    fn prompt_floor(&mut self, prompt: &str) -> io::Result<Option<Floor>> {
        loop {
            writeln!(self.output, "{}", prompt)?;
            for floor in Floor::ALL {
                writeln!(self.output, "{}. {}", floor.value(), floor_label(floor))?;
            }
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            match parse_floor(&line) {
                Some(floor) => return Ok(Some(floor)),
                None => writeln!(
                    self.output,
                    "Invalid floor. Please enter a number between -1 and 3."
                )?,
            }
        }
    }

    fn prompt_passengers(&mut self) -> io::Result<Option<u32>> {
        loop {
            writeln!(self.output, "Select how many passengers: 1 - ?")?;
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            match parse_passengers(&line) {
                Some(passengers) => return Ok(Some(passengers)),
                None => writeln!(
                    self.output,
                    "Invalid number of passengers. Please enter a positive integer."
                )?,
            }
        }
    }

    fn show_status_all(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- All Elevators Status ---")?;
        for status in self.dispatch.statuses() {
            writeln!(self.output, "\nElevator #{} Status:", status.id)?;
            writeln!(self.output, "{}", status)?;
        }
        writeln!(self.output, "---------------------------\n")
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn floor_label(floor: Floor) -> &'static str {
    match floor {
        Floor::Basement => "Basement",
        Floor::Ground => "Ground",
        Floor::FirstFloor => "First Floor",
        Floor::SecondFloor => "Second Floor",
        Floor::ThirdFloor => "Third Floor",
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn parse_floor(input: &str) -> Option<Floor> {
    let value = input.trim().parse::<i8>().ok()?;
    Floor::try_from(value).ok()
}

pub fn parse_passengers(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|&count| count > 0)
}

/// Validation done before a request is handed to any elevator.
pub fn build_request(
    departure: Floor,
    destination: Floor,
    passengers: u32,
) -> Result<Request, RequestError> {
    if passengers == 0 {
        return Err(RequestError::NoPassengers);
    }
    if departure == destination {
        return Err(RequestError::SameFloor(departure));
    }
    Ok(Request::new(passengers, departure, destination))
}

/***************************************/
/*             Unit tests              */
/***************************************/
