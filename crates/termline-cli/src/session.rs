//! A compiled grammar with the components configured on the command line.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use serde_json::json;
use termline::{
    CompiledGrammar, CompleteEvent, Completer, Document, GrammarCompleter, GrammarLexer,
    GrammarValidator, Lexer, Match, MatchVariable, SimpleLexer, Validator, ValidatorError,
    WordCompleter, compile,
};
use tracing::{debug, info};

use crate::cli::{Args, Command};
use crate::config::{CliConfig, parse_style};
use crate::error::CliError;

/// How a command ended when it ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The input was accepted.
    Accepted,
    /// The input did not match or did not validate.
    Rejected,
}

impl Outcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Accepted => 0,
            Self::Rejected => 1,
        }
    }
}

/// Everything needed to answer commands about one grammar.
#[derive(Debug)]
pub struct Session {
    grammar: Arc<CompiledGrammar>,
    completer: GrammarCompleter,
    lexer: GrammarLexer,
    validator: GrammarValidator,
    json: bool,
}

impl Session {
    /// Compile `expression` and build the components from `VAR=...`
    /// assignments.
    ///
    /// # Errors
    /// Returns [`CliError::Grammar`] when the expression does not compile and
    /// [`CliError::InvalidConfig`] for malformed assignments.
    pub fn new(
        expression: &str,
        words: &[String],
        styles: &[String],
        default_style: &str,
        json: bool,
    ) -> Result<Self, CliError> {
        let grammar = Arc::new(compile(expression)?);
        debug!(variables = ?grammar.variable_names(), "grammar ready");

        let mut completers: HashMap<String, Arc<dyn Completer>> = HashMap::new();
        for arg in words {
            let (name, list) = parse_assignment(arg, "--words")?;
            let list = list.split(',').map(str::trim).filter(|word| !word.is_empty());
            completers.insert(name.to_owned(), Arc::new(WordCompleter::new(list)));
        }

        let mut lexers: HashMap<String, Arc<dyn Lexer>> = HashMap::new();
        for arg in styles {
            let (name, style) = parse_assignment(arg, "--style")?;
            lexers.insert(name.to_owned(), Arc::new(SimpleLexer::new(parse_style(style)?)));
        }

        Ok(Self {
            completer: GrammarCompleter::new(Arc::clone(&grammar), completers),
            lexer: GrammarLexer::new(Arc::clone(&grammar), default_style, lexers),
            validator: GrammarValidator::new(Arc::clone(&grammar), HashMap::new()),
            grammar,
            json,
        })
    }

    /// Build a session from parsed arguments and the effective configuration.
    ///
    /// # Errors
    /// Returns [`CliError::Io`] when the grammar file cannot be read, plus the
    /// errors of [`Session::new`].
    pub fn from_args(args: &Args, config: &CliConfig) -> Result<Self, CliError> {
        let expression = match (&args.grammar, &args.grammar_file) {
            (Some(expression), _) => expression.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                return Err(CliError::InvalidConfig(
                    "either --grammar or --grammar-file is required".to_owned(),
                ));
            }
        };
        Self::new(
            &expression,
            &args.words,
            &args.styles,
            &config.default_style,
            args.json,
        )
    }

    /// The compiled grammar.
    #[must_use]
    pub fn grammar(&self) -> &CompiledGrammar {
        &self.grammar
    }

    /// Run `command`, writing its results to `out`.
    ///
    /// # Errors
    /// Returns [`CliError`] when a component fails or output cannot be
    /// written.
    pub fn run(&self, command: &Command, out: &mut impl Write) -> Result<Outcome, CliError> {
        info!(?command, "running command");
        match command {
            Command::Match { input } => self.exact(input, out),
            Command::Prefix { input } => self.prefix(input, out),
            Command::Complete { input, cursor } => {
                let document = Document::new(input.as_str(), cursor.unwrap_or(input.len()));
                self.complete(&document, out)
            }
            Command::Highlight { input } => self.highlight(input, out),
            Command::Validate { input } => self.validate(input, out),
        }
    }

    fn exact(&self, input: &str, out: &mut impl Write) -> Result<Outcome, CliError> {
        let matched = self.grammar.match_exact(input);
        let outcome = if matched.is_some() {
            Outcome::Accepted
        } else {
            Outcome::Rejected
        };
        let variables: Vec<MatchVariable> = matched
            .as_ref()
            .map(|m| m.variables().into_iter().collect())
            .unwrap_or_default();

        if self.json {
            let value = json!({ "matched": matched.is_some(), "variables": variables });
            write_json(out, &value)?;
        } else if matched.is_some() {
            for var in &variables {
                write_variable(out, "var", var)?;
            }
        } else {
            writeln!(out, "no match")?;
        }
        Ok(outcome)
    }

    fn prefix(&self, input: &str, out: &mut impl Write) -> Result<Outcome, CliError> {
        let matched: Match<'_> = self.grammar.match_prefix(input);
        let variables: Vec<MatchVariable> = matched.variables().into_iter().collect();
        let end_nodes = matched.end_nodes();
        let trailing = matched.trailing_input();

        if self.json {
            let value = json!({
                "variables": variables,
                "end_nodes": end_nodes,
                "trailing_input": trailing,
            });
            write_json(out, &value)?;
        } else {
            for var in &variables {
                write_variable(out, "var", var)?;
            }
            for var in &end_nodes {
                write_variable(out, "end", var)?;
            }
            if let Some(var) = &trailing {
                write_variable(out, "trailing", var)?;
            }
        }
        Ok(Outcome::Accepted)
    }

    fn complete(&self, document: &Document, out: &mut impl Write) -> Result<Outcome, CliError> {
        let completions = self
            .completer
            .get_completions(document, &CompleteEvent::requested())?;

        if self.json {
            write_json(out, &json!(completions))?;
        } else {
            for completion in &completions {
                write!(out, "{}\t{}", completion.text(), completion.start_position())?;
                if let Some(meta) = completion.display_meta() {
                    write!(out, "\t{meta}")?;
                }
                writeln!(out)?;
            }
        }
        Ok(Outcome::Accepted)
    }

    fn highlight(&self, input: &str, out: &mut impl Write) -> Result<Outcome, CliError> {
        let lexed = self.lexer.lex_document(&Document::at_end(input));

        if self.json {
            write_json(out, &json!(lexed))?;
        } else {
            for (number, line) in lexed.lines().iter().enumerate() {
                for fragment in line {
                    writeln!(out, "{number}\t{}\t{:?}", fragment.style, fragment.text)?;
                }
            }
        }
        Ok(Outcome::Accepted)
    }

    fn validate(&self, input: &str, out: &mut impl Write) -> Result<Outcome, CliError> {
        let error = match self.validator.validate(&Document::at_end(input)) {
            Ok(()) => None,
            Err(ValidatorError::Invalid(error)) => Some(error),
            Err(ValidatorError::Failed(source)) => return Err(CliError::Validation(source)),
        };

        if self.json {
            write_json(out, &json!({ "valid": error.is_none(), "error": error }))?;
        } else if let Some(error) = &error {
            writeln!(out, "invalid\t{}\t{}", error.cursor_position, error.message)?;
        } else {
            writeln!(out, "valid")?;
        }
        Ok(if error.is_none() {
            Outcome::Accepted
        } else {
            Outcome::Rejected
        })
    }
}

/// Split a `VAR=VALUE` argument of `flag`.
///
/// # Errors
/// Returns [`CliError::InvalidConfig`] when `=` is missing or the variable
/// name is empty.
pub fn parse_assignment<'a>(arg: &'a str, flag: &str) -> Result<(&'a str, &'a str), CliError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(CliError::InvalidConfig(format!(
            "{flag} expects VAR=VALUE, got '{arg}'"
        ))),
    }
}

fn write_variable(out: &mut impl Write, kind: &str, var: &MatchVariable) -> Result<(), CliError> {
    writeln!(
        out,
        "{kind}\t{}\t{}..{}\t{:?}",
        var.name, var.start, var.stop, var.value
    )?;
    Ok(())
}

fn write_json(out: &mut impl Write, value: &serde_json::Value) -> Result<(), CliError> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests inspect command output")]
mod tests {
    use super::*;
    use rstest::rstest;

    fn session(json: bool) -> Session {
        Session::new(
            r"cd \s (?P<dir>\w*)",
            &["dir=home, tmp,var".to_owned()],
            &["dir=class:dir".to_owned()],
            "",
            json,
        )
        .unwrap()
    }

    fn run(session: &Session, command: Command) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = session.run(&command, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[rstest]
    #[case("dir=a,b", ("dir", "a,b"))]
    #[case(" dir =", ("dir", ""))]
    fn parses_assignments(#[case] arg: &str, #[case] expected: (&str, &str)) {
        assert_eq!(parse_assignment(arg, "--words").unwrap(), expected);
    }

    #[rstest]
    #[case("dir")]
    #[case("=a,b")]
    fn rejects_malformed_assignments(#[case] arg: &str) {
        let err = parse_assignment(arg, "--words").unwrap_err();
        assert!(err.to_string().contains("--words expects VAR=VALUE"));
    }

    #[test]
    fn match_prints_variables() {
        let (outcome, out) = run(&session(false), Command::Match { input: "cd tmp".into() });
        assert_eq!(outcome, Outcome::Accepted);
        assert_eq!(out, "var\tdir\t3..6\t\"tmp\"\n");
    }

    #[test]
    fn failed_match_is_rejected() {
        let (outcome, out) = run(&session(false), Command::Match { input: "ls".into() });
        assert_eq!(outcome, Outcome::Rejected);
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(out, "no match\n");
    }

    #[test]
    fn complete_lists_words() {
        let (_, out) = run(
            &session(false),
            Command::Complete {
                input: "cd ".into(),
                cursor: None,
            },
        );
        assert_eq!(out, "home\t0\ntmp\t0\nvar\t0\n");
    }

    #[test]
    fn validate_reports_position() {
        let (outcome, out) = run(&session(false), Command::Validate { input: "cd a b".into() });
        assert_eq!(outcome, Outcome::Rejected);
        assert_eq!(out, "invalid\t6\tInvalid command\n");
    }

    #[test]
    fn json_output_is_machine_readable() {
        let (_, out) = run(&session(true), Command::Prefix { input: "cd tm".into() });
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["end_nodes"][0]["name"], "dir");
        assert_eq!(value["end_nodes"][0]["value"], "tm");
        assert!(value["trailing_input"].is_null());
    }

    #[test]
    fn highlight_styles_fields() {
        let (_, out) = run(&session(false), Command::Highlight { input: "cd tmp".into() });
        assert_eq!(out, "0\t\t\"cd \"\n0\tclass:dir\t\"tmp\"\n");
    }
}
