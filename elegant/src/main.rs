use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use clap::Parser;
use elegant::{
    evaluator::{self, Budget},
    parser,
    prelude::*,
    EvalError, Evaluator,
};
use util::repl;

#[derive(Parser, Debug)]
#[command(name = "elegant", version)]
#[command(about = "Normal-order evaluator for the untyped lambda calculus", long_about = None)]
struct Cli {
    /// Give up after this many beta steps
    #[arg(long, default_value_t = Budget::default().max_steps)]
    max_steps: usize,

    /// Give up after this many milliseconds of reduction (0 disables the clock)
    #[arg(long, default_value_t = 10_000)]
    time_limit_ms: u64,

    /// Give up once an intermediate term has more nodes than this
    #[arg(long, default_value_t = Budget::default().max_size)]
    max_size: usize,

    /// File to keep the line history in
    #[arg(long)]
    history: Option<PathBuf>,
}

impl Cli {
    fn budget(&self) -> Budget {
        Budget {
            max_steps: self.max_steps,
            time_limit: (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms)),
            max_size: self.max_size,
        }
    }
}

fn build_report(e: Error) -> Report<Span> {
    use chumsky::error::SimpleReason;
    let report = Report::build(ReportKind::Error, (), e.span().start);
    match e.reason() {
        SimpleReason::Unexpected => {
            let found = e.found().map(String::as_str).unwrap_or("end of the input");
            let expected = e
                .expected()
                .map(|t| t.as_ref().map(String::as_str).unwrap_or("end of the input"))
                .collect::<Vec<_>>()
                .join(", ");
            let expected = if expected.is_empty() {
                "something else"
            } else {
                &expected
            };
            report
                .with_message(format!("Unexpected {found}, expected {expected}",))
                .with_label(
                    Label::new(e.span())
                        .with_message(format!("Unexpected {}", found.fg(Color::Red)))
                        .with_color(Color::Red),
                )
        }
        SimpleReason::Unclosed { span, delimiter } => report
            .with_message(format!("Unclosed delimiter {}", delimiter.fg(Color::Yellow)))
            .with_label(
                Label::new(span.clone())
                    .with_message(format!(
                        "Unclosed delimiter {}",
                        delimiter.fg(Color::Yellow)
                    ))
                    .with_color(Color::Yellow),
            )
            .with_label(
                Label::new(e.span())
                    .with_message(format!(
                        "Must be closed before this {}",
                        e.found()
                            .map(String::as_str)
                            .unwrap_or("end of the input")
                            .fg(Color::Red)
                    ))
                    .with_color(Color::Red),
            ),
        SimpleReason::Custom(msg) => report.with_message(msg).with_label(
            Label::new(e.span())
                .with_message(format!("{}", msg.fg(Color::Red)))
                .with_color(Color::Red),
        ),
    }
    .finish()
}

fn print_error(input: &str, error: EvalError) -> Result<()> {
    match error {
        EvalError::Syntax(es) => {
            for e in es {
                build_report(e).eprint(Source::from(input))?;
            }
        }
        EvalError::Name(e) => build_report(e).eprint(Source::from(input))?,
        EvalError::Divergence(d) => Report::<Span>::build(ReportKind::Error, (), 0)
            .with_message(d)
            .with_note("Raise the limit with :steps or --max-steps")
            .finish()
            .eprint(Source::from(input))?,
    }
    Ok(())
}

/// Splits `:command argument` into its parts. A line without the colon is
/// an argument to the default command.
fn split_command(input: &str) -> (&str, &str) {
    match input.trim_start().strip_prefix(':') {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .split_once(char::is_whitespace)
                .unwrap_or((stripped.trim_end(), ""))
        }
        None => ("", input),
    }
}

type CommandResult<'a> = Result<(), (&'a str, EvalError)>;

struct Repl {
    evaluator: Evaluator,
    history: Option<PathBuf>,
}
impl Repl {
    fn tokenize(input: &str) -> CommandResult {
        let tokens = parser::tokenize(input)
            .map_err(|es| (input, EvalError::Syntax(es)))?
            .iter()
            .map(|token| token.value().to_string())
            .collect::<Vec<_>>();
        println!("{}", tokens.join(" "));
        Ok(())
    }

    fn parse(input: &str) -> CommandResult {
        let term = parser::parse_term(input).map_err(|es| (input, EvalError::Syntax(es)))?;
        println!("{term}");
        Ok(())
    }

    fn expand<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let term = self.evaluator.expand(input).map_err(|e| (input, e))?;
        println!("{term}");
        Ok(())
    }

    fn trace<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let term = self.evaluator.expand(input).map_err(|e| (input, e))?;
        println!("0: {term}");
        let normalized = evaluator::reduce_traced(term, &self.evaluator.budget, |i, term| {
            println!("{i}: {term}")
        })
        .map_err(|e| (input, EvalError::from(e)))?;
        println!("Normal form after {} steps", normalized.steps);
        Ok(())
    }

    fn evaluate<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let term = self.evaluator.evaluate(input).map_err(|e| (input, e))?;
        println!("{term}");
        Ok(())
    }

    fn show_library(&self) {
        for (name, term) in self.evaluator.library().entries() {
            println!("{name:<8} = {term}");
        }
        println!("{:<8} = Church numerals, up to {MAX_NUMERAL}", "0, 1, ..");
    }

    fn set_steps(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            println!("{}", self.evaluator.budget.max_steps);
            return;
        }
        match input.parse() {
            Ok(steps) => self.evaluator.budget.max_steps = steps,
            Err(e) => eprintln!("Invalid step limit {input}: {e}"),
        }
    }

    fn show_help() {
        println!(
            "{}",
            r#"
term                -- same as :evaluate term
:tokenize   term    -- show tokenized term
:parse      term    -- show parsed term
:expand     term    -- show the term with library names and numerals expanded
:trace      term    -- show every step of the reduction
:evaluate   term    -- show the normal form
:library            -- list the library definitions
:steps      [n]     -- show or set the step limit
:help               -- show this message
exit                -- leave the interpreter
        "#
            .trim()
        );
    }

    fn handle_repl_input<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        let (cmd, input) = split_command(input);
        match cmd {
            "to" | "tokenize" => {
                Self::tokenize(input)?;
            }
            "p" | "parse" => {
                Self::parse(input)?;
            }
            "x" | "expand" => {
                self.expand(input)?;
            }
            "tr" | "trace" => {
                self.trace(input)?;
            }
            "" | "e" | "eval" | "evaluate" => {
                self.evaluate(input)?;
            }
            "l" | "lib" | "library" => {
                self.show_library();
            }
            "s" | "steps" => {
                self.set_steps(input);
            }
            "h" | "he" | "hel" | "help" => {
                Self::show_help();
            }
            _ => {
                eprintln!("Unknown command {cmd}");
                Self::show_help();
            }
        }
        Ok(())
    }
}
impl repl::Repl for Repl {
    type Error = anyhow::Error;
    const PROMPT: &'static str = ">>> ";
    const EXIT: Option<&'static str> = Some("exit");
    fn history(&self) -> Option<PathBuf> {
        self.history.clone()
    }
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error> {
        if input.trim().is_empty() {
            return Ok(());
        }
        if let Err((input, e)) = self.handle_repl_input(&input) {
            print_error(input, e)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    println!("Elegant {}", env!("CARGO_PKG_VERSION"));
    println!("Type \"exit\" to leave the interpreter.");
    let repl = Repl {
        evaluator: Evaluator::new(cli.budget()),
        history: cli.history,
    };
    repl::start_repl(repl)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command(":steps 5"), ("steps", "5"));
        assert_eq!(split_command(":steps\t5"), ("steps", "5"));
        assert_eq!(split_command("  : trace (f x)"), ("trace", "(f x)"));
        assert_eq!(split_command(":library  "), ("library", " "));
        assert_eq!(split_command(":help"), ("help", ""));
        assert_eq!(split_command("(f x)"), ("", "(f x)"));
    }
}
