//! # Wire Protocol
//!
//! Newline-delimited text commands, tokenized on ASCII whitespace runs.
//! `parse_line` turns one already-framed line into a `Command`; `Response`
//! renders the exact response-line grammar.
//!
//! The framer (in `server.rs`) filters out blank lines before they ever
//! reach here, so in practice `Command::parse` only observes
//! `ERR empty_command` when called directly (as the unit tests below do)
//! rather than from the wire.

use std::fmt;

/// A fully parsed, not-yet-dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get { key: String },
    Put { key: String, value: String, ttl_secs: Option<f64> },
    Del { key: String },
    Stats,
    Quit,
}

/// A rejected line: either empty, wrong arity, a bad TTL, or an unknown verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    EmptyCommand,
    Usage { canonical_form: &'static str },
    TtlNotNumeric,
    UnknownCommand { verb: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::EmptyCommand => write!(f, "ERR empty_command"),
            ProtocolError::Usage { canonical_form } => {
                write!(f, "ERR usage: {canonical_form}")
            }
            ProtocolError::TtlNotNumeric => write!(f, "ERR ttl must be numeric"),
            ProtocolError::UnknownCommand { verb } => {
                write!(f, "ERR unknown_command {verb}")
            }
        }
    }
}

impl Command {
    /// Parses one already-trimmed line (no trailing `\r`/`\n`) into a command.
    ///
    /// `STATS` and `QUIT` ignore any trailing tokens, matching the canonical
    /// behavior of only ever inspecting `parts[0]` for those two verbs.
    pub fn parse(line: &str) -> Result<Command, ProtocolError> {
        let mut parts = line.split_ascii_whitespace();
        let verb = match parts.next() {
            Some(verb) => verb,
            None => return Err(ProtocolError::EmptyCommand),
        };
        let verb_upper = verb.to_ascii_uppercase();
        let rest: Vec<&str> = parts.collect();

        match verb_upper.as_str() {
            "QUIT" => Ok(Command::Quit),
            "STATS" => Ok(Command::Stats),
            "GET" => {
                if rest.len() != 1 {
                    return Err(ProtocolError::Usage {
                        canonical_form: "GET key",
                    });
                }
                Ok(Command::Get {
                    key: rest[0].to_string(),
                })
            }
            "PUT" => {
                if rest.len() < 2 || rest.len() > 3 {
                    return Err(ProtocolError::Usage {
                        canonical_form: "PUT key value [ttl]",
                    });
                }
                let ttl_secs = if rest.len() == 3 {
                    match rest[2].parse::<f64>() {
                        Ok(seconds) => Some(seconds),
                        Err(_) => return Err(ProtocolError::TtlNotNumeric),
                    }
                } else {
                    None
                };
                Ok(Command::Put {
                    key: rest[0].to_string(),
                    value: rest[1].to_string(),
                    ttl_secs,
                })
            }
            "DEL" => {
                if rest.len() != 1 {
                    return Err(ProtocolError::Usage {
                        canonical_form: "DEL key",
                    });
                }
                Ok(Command::Del {
                    key: rest[0].to_string(),
                })
            }
            _ => Err(ProtocolError::UnknownCommand { verb: verb_upper }),
        }
    }
}

/// A dispatched command's outcome, rendered as the exact response-line
/// grammar. `Quit` has no textual form: the caller closes the connection
/// without writing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Value(String),
    NotFound,
    Stored,
    Deleted,
    Stats {
        hits: u64,
        misses: u64,
        evictions: u64,
        gets: u64,
        puts: u64,
    },
    Moved { shard_id: u32, host: String, port: u16 },
    Err(ProtocolError),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Value(value) => write!(f, "VALUE {value}"),
            Response::NotFound => write!(f, "NOT_FOUND"),
            Response::Stored => write!(f, "STORED"),
            Response::Deleted => write!(f, "DELETED"),
            Response::Stats {
                hits,
                misses,
                evictions,
                gets,
                puts,
            } => write!(
                f,
                "HITS {hits} MISSES {misses} EVICTIONS {evictions} GETS {gets} PUTS {puts}"
            ),
            Response::Moved { shard_id, host, port } => {
                write!(f, "MOVED {shard_id} {host}:{port}")
            }
            Response::Err(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get() {
        assert_eq!(
            Command::parse("GET foo").unwrap(),
            Command::Get { key: "foo".to_string() }
        );
    }

    #[test]
    fn verb_is_case_insensitive() {
        assert_eq!(
            Command::parse("get foo").unwrap(),
            Command::Get { key: "foo".to_string() }
        );
    }

    #[test]
    fn tokenizes_on_whitespace_runs() {
        assert_eq!(
            Command::parse("PUT  a    b   5").unwrap(),
            Command::Put {
                key: "a".to_string(),
                value: "b".to_string(),
                ttl_secs: Some(5.0),
            }
        );
    }

    #[test]
    fn put_without_ttl_has_no_expiry() {
        assert_eq!(
            Command::parse("PUT a b").unwrap(),
            Command::Put {
                key: "a".to_string(),
                value: "b".to_string(),
                ttl_secs: None,
            }
        );
    }

    #[test]
    fn put_rejects_non_numeric_ttl() {
        assert_eq!(
            Command::parse("PUT a b notanumber").unwrap_err(),
            ProtocolError::TtlNotNumeric
        );
    }

    #[test]
    fn put_rejects_wrong_arity() {
        assert!(matches!(
            Command::parse("PUT a"),
            Err(ProtocolError::Usage { .. })
        ));
        assert!(matches!(
            Command::parse("PUT a b c d"),
            Err(ProtocolError::Usage { .. })
        ));
    }

    #[test]
    fn empty_line_is_empty_command() {
        assert_eq!(Command::parse(""), Err(ProtocolError::EmptyCommand));
        assert_eq!(Command::parse("   "), Err(ProtocolError::EmptyCommand));
    }

    #[test]
    fn stats_and_quit_ignore_trailing_tokens() {
        assert_eq!(Command::parse("STATS extra tokens"), Ok(Command::Stats));
        assert_eq!(Command::parse("QUIT now"), Ok(Command::Quit));
    }

    #[test]
    fn unknown_verb_reports_uppercased_token() {
        assert_eq!(
            Command::parse("frobnicate x"),
            Err(ProtocolError::UnknownCommand {
                verb: "FROBNICATE".to_string()
            })
        );
    }

    #[test]
    fn renders_moved_response() {
        let response = Response::Moved {
            shard_id: 3,
            host: "10.0.0.1".to_string(),
            port: 7000,
        };
        assert_eq!(response.to_string(), "MOVED 3 10.0.0.1:7000");
    }

    #[test]
    fn renders_stats_response() {
        let response = Response::Stats {
            hits: 1,
            misses: 2,
            evictions: 3,
            gets: 4,
            puts: 5,
        };
        assert_eq!(
            response.to_string(),
            "HITS 1 MISSES 2 EVICTIONS 3 GETS 4 PUTS 5"
        );
    }
}
