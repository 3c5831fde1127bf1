//! # Command Grammar
//!
//! One parsing pass turns an input line into a [`ModeSwitch`] or a design
//! [`Command`]; the session then matches the result exhaustively.
//!
//! ## Design Commands
//!
//! | Tokens                                  | Command          |
//! |-----------------------------------------|------------------|
//! | `check element all`                     | `ListElements`   |
//! | `check element <name>`                  | `ShowElement`    |
//! | `check element <name> <property>`       | `ShowProperty`   |
//! | `edit <any> <name> <property> <value>`  | `EditProperty`   |
//! | `check formula all`                     | `ListFormulas`   |
//! | `calculate <name> <formula>`            | `Calculate`      |
//!
//! Keywords are case-insensitive. The second token of `edit` is positional
//! and never checked, so `edit element ...` and `edit beam ...` are the same
//! command.

use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};

const MODE_PREFIX: &str = "!mode";

/// Router behavioural state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Free-form chat, forwarded to the chat service
    #[default]
    Chat,
    /// Structured design commands
    Design,
}

impl Mode {
    /// Upper-case label used in the prompt
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Chat => "CHAT",
            Mode::Design => "DESIGN",
        }
    }
}

/// A `!mode ...` input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    To(Mode),
    /// Starts with `!mode` but names no known mode
    Unknown,
}

impl ModeSwitch {
    /// Classify a line. Returns `None` if it does not start with `!mode`.
    ///
    /// The whole line must equal `!mode design` or `!mode chat` (any case);
    /// surrounding whitespace makes it an unknown mode.
    pub fn parse(line: &str) -> Option<ModeSwitch> {
        let head = line.get(..MODE_PREFIX.len())?;
        if !head.eq_ignore_ascii_case(MODE_PREFIX) {
            return None;
        }
        let switch = if line.eq_ignore_ascii_case("!mode design") {
            ModeSwitch::To(Mode::Design)
        } else if line.eq_ignore_ascii_case("!mode chat") {
            ModeSwitch::To(Mode::Chat)
        } else {
            ModeSwitch::Unknown
        };
        Some(switch)
    }
}

/// A parsed design-mode command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ListElements,
    ShowElement {
        element: String,
    },
    ShowProperty {
        element: String,
        property: String,
    },
    /// `value` is kept raw; the router validates it before touching the store
    EditProperty {
        element: String,
        property: String,
        value: String,
    },
    ListFormulas,
    Calculate {
        element: String,
        formula: String,
    },
}

impl Command {
    /// Parse a design-mode line. Lines matching no shape fail with `InvalidCommand`.
    pub fn parse(line: &str) -> DesignResult<Command> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let is = |index: usize, keyword: &str| tokens[index].eq_ignore_ascii_case(keyword);

        let command = match tokens.len() {
            3 if is(0, "check") && is(1, "element") && is(2, "all") => Command::ListElements,
            3 if is(0, "check") && is(1, "element") => Command::ShowElement {
                element: tokens[2].to_string(),
            },
            4 if is(0, "check") && is(1, "element") => Command::ShowProperty {
                element: tokens[2].to_string(),
                property: tokens[3].to_string(),
            },
            5 if is(0, "edit") => Command::EditProperty {
                element: tokens[2].to_string(),
                property: tokens[3].to_string(),
                value: tokens[4].to_string(),
            },
            3 if is(0, "check") && is(1, "formula") && is(2, "all") => Command::ListFormulas,
            3 if is(0, "calculate") => Command::Calculate {
                element: tokens[1].to_string(),
                formula: tokens[2].to_string(),
            },
            _ => return Err(DesignError::invalid_command(line)),
        };
        Ok(command)
    }
}

/// Parse an `edit` value as a finite number.
pub fn parse_value(raw: &str) -> DesignResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| DesignError::invalid_value(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch_parsing() {
        assert_eq!(ModeSwitch::parse("!mode design"), Some(ModeSwitch::To(Mode::Design)));
        assert_eq!(ModeSwitch::parse("!MODE Chat"), Some(ModeSwitch::To(Mode::Chat)));
        assert_eq!(ModeSwitch::parse("!mode xyz"), Some(ModeSwitch::Unknown));
        assert_eq!(ModeSwitch::parse("!mode"), Some(ModeSwitch::Unknown));
        assert_eq!(ModeSwitch::parse("!mode  design"), Some(ModeSwitch::Unknown));
        assert_eq!(ModeSwitch::parse("mode design"), None);
        assert_eq!(ModeSwitch::parse("hello"), None);
        assert_eq!(ModeSwitch::parse("!m"), None);
    }

    #[test]
    fn test_mode_switch_requires_exact_line() {
        assert_eq!(ModeSwitch::parse("!mode design "), Some(ModeSwitch::Unknown));
        assert_eq!(ModeSwitch::parse("!mode chat\t"), Some(ModeSwitch::Unknown));
        assert_eq!(ModeSwitch::parse(" !mode design"), None);
    }

    #[test]
    fn test_check_commands() {
        assert_eq!(Command::parse("check element all").unwrap(), Command::ListElements);
        assert_eq!(Command::parse("CHECK Element ALL").unwrap(), Command::ListElements);
        assert_eq!(
            Command::parse("check element Beam1").unwrap(),
            Command::ShowElement { element: "Beam1".to_string() }
        );
        assert_eq!(
            Command::parse("  check   element Beam1   fck ").unwrap(),
            Command::ShowProperty {
                element: "Beam1".to_string(),
                property: "fck".to_string()
            }
        );
        assert_eq!(Command::parse("check formula all").unwrap(), Command::ListFormulas);
    }

    #[test]
    fn test_edit_second_token_is_positional() {
        let expected = Command::EditProperty {
            element: "Beam1".to_string(),
            property: "h".to_string(),
            value: "550".to_string(),
        };
        assert_eq!(Command::parse("edit element Beam1 h 550").unwrap(), expected);
        assert_eq!(Command::parse("EDIT whatever Beam1 h 550").unwrap(), expected);
        assert!(Command::parse("edit Beam1 h 550").is_err());
    }

    #[test]
    fn test_calculate() {
        assert_eq!(
            Command::parse("calculate Column1 KDS_Compression_Capacity").unwrap(),
            Command::Calculate {
                element: "Column1".to_string(),
                formula: "KDS_Compression_Capacity".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_shapes() {
        for line in [
            "",
            "check",
            "check formula",
            "check formula Beam1",
            "check element Beam1 fck extra",
            "show element all",
            "calculate Beam1",
        ] {
            assert_eq!(
                Command::parse(line).unwrap_err().error_code(),
                "INVALID_COMMAND",
                "{:?}",
                line
            );
        }
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("550").unwrap(), 550.0);
        assert_eq!(parse_value("-1.5e2").unwrap(), -150.0);
        for raw in ["abc", "", "NaN", "inf", "1,5"] {
            assert_eq!(parse_value(raw).unwrap_err(), DesignError::invalid_value(raw));
        }
    }
}
