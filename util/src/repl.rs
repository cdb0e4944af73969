use std::path::PathBuf;

use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Readline(ReadlineError),
    #[error("Eval failed: {0:?}")]
    EvalError(E),
}

/// A line-oriented interpreter driven by [`start_repl`].
pub trait Repl {
    type Error: std::fmt::Debug;
    const PROMPT: &'static str = ">> ";
    /// A line that ends the session, compared after trimming.
    const EXIT: Option<&'static str> = None;
    fn history(&self) -> Option<PathBuf> {
        None
    }
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error>;
}

pub fn start_repl<R: Repl>(mut repl: R) -> Result<(), Error<R::Error>> {
    let mut editor = Editor::<()>::new();
    let history = repl.history();
    if let Some(history) = &history {
        editor.load_history(history).ok();
    }
    loop {
        match editor.readline(R::PROMPT) {
            Ok(line) if R::EXIT.map_or(false, |exit| line.trim() == exit) => {
                break Ok(());
            }
            Ok(line) => {
                editor.add_history_entry(line.as_str());
                repl.evaluate(line).map_err(Error::EvalError)?;
                if let Some(history) = &history {
                    editor.save_history(history).map_err(Error::Readline)?;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(e) => break Err(Error::Readline(e)),
        }
    }
}
