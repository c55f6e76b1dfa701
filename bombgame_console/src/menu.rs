use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use console::Style;
use indoc::writedoc;
use log::{error, warn};

use bombgame::error::InputError;
use bombgame::presenter::Prompter;
use bombgame::role::Role;
use bombgame::session::{MIN_PLAYER_NAME_LEN, is_valid_player_name};

use crate::tui;


const WARNING_PAUSE: Duration = Duration::from_secs(2);

pub fn parse_role_choice(input: &str) -> Option<Role> {
    match input.trim() {
        "1" => Some(Role::Initiator),
        "2" => Some(Role::Joiner),
        _ => None,
    }
}

pub fn read_line(input: &mut impl BufRead) -> Result<String, InputError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        error!("Standard input closed while prompting");
        return Err(InputError::Device(io::ErrorKind::UnexpectedEof.into()));
    }
    Ok(line.trim().to_owned())
}

// Like the session screens, menu output is best effort: a broken terminal is logged, and the
// answer is still read.
fn log_output_error(result: io::Result<()>) {
    if let Err(err) = result {
        warn!("Cannot write to terminal: {err}");
    }
}

pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn new() -> Self { ConsolePrompter::with_io(io::stdin().lock(), io::stdout()) }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn with_io(input: R, output: W) -> Self { ConsolePrompter { input, output } }

    fn prompt(&mut self, question: &str) -> Result<String, InputError> {
        log_output_error(self.write_prompt(question));
        read_line(&mut self.input)
    }

    fn write_prompt(&mut self, question: &str) -> io::Result<()> {
        tui::clear_screen(&mut self.output)?;
        write!(self.output, "{}", Style::new().on_white().black().apply_to(question))?;
        self.output.flush()
    }

    fn show_warning(&mut self, message: &str) {
        let shown = tui::clear_screen(&mut self.output)
            .and_then(|()| writeln!(self.output, "{}", tui::render_warning(message)));
        log_output_error(shown);
        thread::sleep(WARNING_PAUSE);
    }

    fn write_menu(&mut self) -> io::Result<()> {
        tui::clear_screen(&mut self.output)?;
        let title = Style::new().on_cyan().bright().black().bold();
        let select = Style::new().magenta().bright();
        let option = Style::new().yellow();
        writedoc!(
            self.output,
            "
            ======================================
            {}
            ======================================

            {}

            {}
            {}

            ======================================
            ",
            title.apply_to("     Welcome to THE BOMBGAME v0.1     "),
            select.apply_to("   Please select a option [1 or 2]:"),
            option.apply_to("        [1]- Host a new game"),
            option.apply_to("        [2]-  Join the game"),
        )?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn prompt_role_choice(&mut self) -> Result<Role, InputError> {
        loop {
            log_output_error(self.write_menu());
            if let Some(role) = parse_role_choice(&read_line(&mut self.input)?) {
                return Ok(role);
            }
            self.show_warning("Please select from only 1 or 2");
        }
    }

    fn prompt_player_name(&mut self) -> Result<String, InputError> {
        let name = self.prompt("Please, write a name: ")?;
        if !is_valid_player_name(&name) {
            self.show_warning(&format!(
                "Name too short ({MIN_PLAYER_NAME_LEN} characters minimum). Try again please"
            ));
        }
        Ok(name)
    }

    fn prompt_join_address(&mut self) -> Result<String, InputError> {
        self.prompt("Please write host [ IP:PORT ] to connect: ")
    }
}
