//! Token classification.
//!
//! Walks the tokens after the command name once, left to right, and tags each
//! one as a boolean flag, an opaque flag, a flag with its value, a flag with
//! its path, or a positional. `--flag=value` is split into two tokens first so
//! that both spellings go through the same validation.

use itertools::Itertools;
use log::debug;

use crate::error::{Error, Result};
use crate::tables::{PathRole, SwitchRule, TranslationTables};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedArgument {
    /// A boolean flag declared in the switch table.
    Boolean(String),
    /// A flag the switch table does not know. Passed through as is.
    Opaque(String),
    ValueBound {
        flag: String,
        value: String,
    },
    PathBound {
        flag: String,
        role: PathRole,
        mount: Option<String>,
        path: String,
    },
    Positional(String),
}

/// What the next token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State<'t> {
    Idle,
    ExpectingValueFor(&'t str, Option<&'t [String]>),
    ExpectingPathFor(&'t str, PathRole, Option<&'t str>),
}

/// Whether `text` follows the flag-prefix convention. A lone `-` does not.
pub fn looks_like_flag(text: &str) -> bool {
    text.len() > 1 && text.starts_with('-')
}

/// Splits `--flag=value` into `--flag` and `value` when `--flag` takes an
/// argument. Everything else is kept as a single token.
pub fn desugar(raw: &[String], tables: &TranslationTables) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(raw.len());

    for (position, text) in raw.iter().enumerate() {
        let split = text
            .split_once('=')
            .filter(|(flag, _)| looks_like_flag(flag))
            .filter(|(flag, _)| tables.switch(flag).is_some_and(SwitchRule::takes_argument));

        match split {
            Some((flag, value)) => {
                tokens.push(Token {
                    text: flag.to_string(),
                    position,
                });
                tokens.push(Token {
                    text: value.to_string(),
                    position,
                });
            }
            None => tokens.push(Token {
                text: text.clone(),
                position,
            }),
        }
    }

    tokens
}

pub struct Classifier<'t> {
    tables: &'t TranslationTables,
}

impl<'t> Classifier<'t> {
    pub fn new(tables: &'t TranslationTables) -> Self {
        Self { tables }
    }

    /// Classifies the raw tokens that follow the command name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnumValue`] when a constrained flag gets a value
    /// outside its set, and [`Error::MissingArgument`] when the tokens run out
    /// while a flag still waits for its value or path.
    pub fn classify(&self, raw: &[String]) -> Result<Vec<ClassifiedArgument>> {
        let mut classified = Vec::with_capacity(raw.len());
        let mut state = State::Idle;

        for token in desugar(raw, self.tables) {
            state = match state {
                State::Idle => self.classify_idle(token, &mut classified),
                State::ExpectingValueFor(flag, allowed) => {
                    if let Some(allowed) = allowed {
                        if !allowed.contains(&token.text) {
                            return Err(Error::InvalidEnumValue {
                                flag: flag.to_string(),
                                value: token.text,
                                allowed: allowed.iter().map(|value| format!("`{value}`")).join(", "),
                            });
                        }
                    }

                    classified.push(ClassifiedArgument::ValueBound {
                        flag: flag.to_string(),
                        value: token.text,
                    });
                    State::Idle
                }
                State::ExpectingPathFor(flag, role, mount) => {
                    classified.push(ClassifiedArgument::PathBound {
                        flag: flag.to_string(),
                        role,
                        mount: mount.map(str::to_string),
                        path: token.text,
                    });
                    State::Idle
                }
            };
        }

        match state {
            State::Idle => Ok(classified),
            State::ExpectingValueFor(flag, _) | State::ExpectingPathFor(flag, _, _) => {
                Err(Error::MissingArgument {
                    flag: flag.to_string(),
                })
            }
        }
    }

    fn classify_idle(&self, token: Token, classified: &mut Vec<ClassifiedArgument>) -> State<'t> {
        // Look the flag up by key so the state can borrow the table's own string.
        let Some((flag, rule)) = self.tables.switches.get_key_value(token.text.as_str()) else {
            let argument = if looks_like_flag(&token.text) {
                ClassifiedArgument::Opaque(token.text)
            } else {
                ClassifiedArgument::Positional(token.text)
            };
            debug!("Token {} classified as {:?}", token.position, argument);
            classified.push(argument);
            return State::Idle;
        };

        match rule {
            SwitchRule::Boolean => {
                classified.push(ClassifiedArgument::Boolean(token.text));
                State::Idle
            }
            SwitchRule::Value { allowed } => State::ExpectingValueFor(flag, allowed.as_deref()),
            SwitchRule::Path { role, mount } => {
                State::ExpectingPathFor(flag, *role, mount.as_deref())
            }
        }
    }
}
