use std::fmt;
use std::io;
use std::net::IpAddr;
use std::time::Duration;

use console::Style;
use crossterm::{cursor, execute, style, terminal};
use log::warn;

use bombgame::presenter::Presenter;
use bombgame::role::Role;
use bombgame::session::SessionContext;
use bombgame::turn_engine::Outcome;


const BANNER: &str = "======================================";
const TURN_SEPARATOR: &str = "=-=-=-=-=-=-=-=-=-=-=-=--=-=-=-=-=-=-=-=-=-=-=-=";

// Works both in cooked and in raw mode: raw mode does not translate '\n' into a carriage return.
pub fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    // Note. Not using `lines()` because it removes trailing new line.
    for line in s.split('\n') {
        execute!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
    }
    Ok(())
}

pub fn clear_screen(out: &mut impl io::Write) -> io::Result<()> {
    execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))
}

pub fn render_session_address(ip: IpAddr, port: u16) -> String {
    let info_style = Style::new().on_white().yellow().bright();
    format!(
        "{BANNER}\nGame address is: {}\nTell it to your friend and wait for them to join.\n{BANNER}",
        info_style.apply_to(format!("{ip}:{port}"))
    )
}

pub fn render_turn_state(holder: Role, local_role: Role) -> String {
    let text = if holder == local_role {
        ">> It is your turn. Hold space key <<"
    } else {
        ">> It is your friend's turn, wait please <<"
    };
    let info_style = Style::new().on_white().yellow().bright();
    format!("{TURN_SEPARATOR}\n{}\n{TURN_SEPARATOR}", info_style.apply_to(text))
}

pub fn render_hold_duration(held: Duration) -> String {
    format!("You held the bomb for {:.1}s", held.as_secs_f64())
}

pub fn render_result(outcome: &Outcome, player_name: &str) -> String {
    let (text, text_style) = if outcome.local_won() {
        ("WINNER WINNER CHICKEN DINNER", Style::new().on_green().black().bold())
    } else {
        ("YOU LOSE HA HA HA", Style::new().on_red().black().bold())
    };
    format!(
        "{BANNER}\n{BANNER}\n\n{}\n\n{player_name}: {} turn(s), {:.1}s holding the bomb\n{BANNER}\n{BANNER}",
        text_style.apply_to(text),
        outcome.local_turns,
        outcome.local_hold_time.as_secs_f64(),
    )
}

pub fn render_warning(message: &str) -> String {
    format!("{BANNER}\n{}\n{BANNER}", Style::new().on_red().bold().apply_to(message))
}

// For failures that happen before there is a session to present them.
pub fn show_fatal_warning(message: &str) {
    let mut stdout = io::stdout();
    let shown =
        clear_screen(&mut stdout).and_then(|()| writeln_raw(&mut stdout, render_warning(message)));
    if let Err(err) = shown {
        warn!("Cannot write to terminal: {err}");
    }
}

pub struct ConsolePresenter {
    local_role: Role,
    player_name: String,
    stdout: io::Stdout,
}

impl ConsolePresenter {
    pub fn new(ctx: &SessionContext) -> Self {
        ConsolePresenter {
            local_role: ctx.role,
            player_name: ctx.player_name.clone(),
            stdout: io::stdout(),
        }
    }

    fn try_show(&mut self, clear: bool, text: String) -> io::Result<()> {
        if clear {
            clear_screen(&mut self.stdout)?;
        }
        writeln_raw(&mut self.stdout, text)
    }

    // Presentation is best effort: a broken terminal must not abort the session.
    fn show(&mut self, clear: bool, text: String) {
        if let Err(err) = self.try_show(clear, text) {
            warn!("Cannot write to terminal: {err}");
        }
    }
}

impl Presenter for ConsolePresenter {
    fn present_session_address(&mut self, ip: IpAddr, port: u16) {
        self.show(true, render_session_address(ip, port));
    }
    fn present_turn_state(&mut self, holder: Role) {
        self.show(false, render_turn_state(holder, self.local_role));
    }
    fn present_hold_duration(&mut self, held: Duration) {
        self.show(false, render_hold_duration(held));
    }
    fn present_result(&mut self, outcome: &Outcome) {
        let text = render_result(outcome, &self.player_name);
        self.show(true, text);
    }
    fn present_fatal_warning(&mut self, message: &str) {
        self.show(true, render_warning(message));
    }
}
