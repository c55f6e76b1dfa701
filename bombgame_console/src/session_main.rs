use std::process::ExitCode;
use std::thread;

use log::{error, info};

use bombgame::error::{InputError, SessionError};
use bombgame::presenter::Presenter;
use bombgame::session::{SessionConfig, SessionContext, SessionPreset};
use bombgame::ticker::Ticker;
use bombgame::transport::{self, HostOptions};
use bombgame::turn_engine::{Outcome, TurnEngine};

use crate::keyboard::CrosstermKeyboard;
use crate::menu::ConsolePrompter;
use crate::tui::{self, ConsolePresenter};


pub struct SessionMainConfig {
    pub preset: SessionPreset,
    pub session: SessionConfig,
}

fn play(ctx: &SessionContext, presenter: &mut ConsolePresenter) -> Result<Outcome, SessionError> {
    let stream = transport::establish(ctx, HostOptions::default(), presenter)?;
    // Raw mode lasts until `keyboard` is dropped, i.e. before the result lingers on screen.
    let mut keyboard = CrosstermKeyboard::open().map_err(InputError::from)?;
    let mut ticker = Ticker::new(ctx.config.tick);
    TurnEngine::new(ctx, stream, &mut keyboard, &mut ticker, presenter).run()
}

fn fail(err: SessionError, present: impl FnOnce(&str)) -> ExitCode {
    error!("Fatal: {err}");
    present(&format!("{}\n{err}", err.warning()));
    ExitCode::FAILURE
}

pub fn run(config: SessionMainConfig) -> ExitCode {
    let mut prompter = ConsolePrompter::new();
    let ctx = match SessionContext::resolve(config.preset, config.session, &mut prompter) {
        Ok(ctx) => ctx,
        Err(err) => return fail(err.into(), tui::show_fatal_warning),
    };
    info!("Session context: {ctx:?}");
    let mut presenter = ConsolePresenter::new(&ctx);
    match play(&ctx, &mut presenter) {
        Ok(outcome) => {
            info!("Session finished: {outcome:?}");
            thread::sleep(ctx.config.result_linger);
            ExitCode::SUCCESS
        }
        Err(err) => fail(err, |message| presenter.present_fatal_warning(message)),
    }
}
