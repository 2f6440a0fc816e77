//! Configuration directive handlers.
//!
//! # Responsibilities
//! - Name the five directives and their help text
//! - Validate arity and command context
//! - Convert the argument to an integer and store it in the record
//!
//! # Design Decisions
//! - All directives are global-only
//! - Lenient parsing follows `atoi`: junk yields 0 rather than an error.
//!   Lossy conversions are reported through [`ParsedInt::lossy`] and a
//!   warning so callers can see them. [`ParsePolicy::Strict`] rejects them.

use thiserror::Error;

use crate::host::{CommandContext, ContextError};
use crate::sockopts::options::{OptionKind, SocketOptionsConfig, Timeval};

/// The directives this module registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    TcpDeferAccept,
    SendTimeout,
    ReceiveTimeout,
    SendBuffer,
    ReceiveBuffer,
}

impl Directive {
    pub const ALL: [Directive; 5] = [
        Directive::TcpDeferAccept,
        Directive::SendTimeout,
        Directive::ReceiveTimeout,
        Directive::ReceiveBuffer,
        Directive::SendBuffer,
    ];

    /// Name as written in the configuration file.
    pub fn name(&self) -> &'static str {
        match self {
            Directive::TcpDeferAccept => "SoTcpDeferAccept",
            Directive::SendTimeout => "SoSoSndTimeo",
            Directive::ReceiveTimeout => "SoSoRcvTimeo",
            Directive::SendBuffer => "SoSoSndBuf",
            Directive::ReceiveBuffer => "SoSoRcvBuf",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            Directive::TcpDeferAccept => "TCP_DEFER_ACCEPT in seconds (see tcp(7))",
            Directive::SendTimeout => {
                "SO_SNDTIMEO in seconds (see socket(7)); does not interrupt transfers in progress"
            }
            Directive::ReceiveTimeout => {
                "SO_RCVTIMEO in seconds (see socket(7)); does not interrupt transfers in progress"
            }
            Directive::SendBuffer => "SO_SNDBUF in bytes (see socket(7))",
            Directive::ReceiveBuffer => "SO_RCVBUF in bytes (see socket(7))",
        }
    }

    /// Case-insensitive lookup by directive name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// The socket option this directive configures.
    pub fn kind(&self) -> OptionKind {
        match self {
            Directive::TcpDeferAccept => OptionKind::TcpDeferAccept,
            Directive::SendTimeout => OptionKind::SendTimeout,
            Directive::ReceiveTimeout => OptionKind::ReceiveTimeout,
            Directive::SendBuffer => OptionKind::SendBuffer,
            Directive::ReceiveBuffer => OptionKind::ReceiveBuffer,
        }
    }

    /// Store `value` in the matching field of `config`.
    pub fn store(&self, config: &mut SocketOptionsConfig, value: i32) {
        match self {
            Directive::TcpDeferAccept => config.defer_accept = Some(value),
            Directive::SendTimeout => config.send_timeout = Some(Timeval::from_secs(value.into())),
            Directive::ReceiveTimeout => {
                config.receive_timeout = Some(Timeval::from_secs(value.into()))
            }
            Directive::SendBuffer => config.send_buffer_size = Some(value),
            Directive::ReceiveBuffer => config.receive_buffer_size = Some(value),
        }
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How directive arguments are converted to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// `atoi` semantics: junk becomes 0, trailing junk is ignored.
    #[default]
    Lenient,
    /// Only a well-formed integer is accepted.
    Strict,
}

/// Result of converting a directive argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedInt {
    pub value: i32,
    /// The argument was not exactly an in-range integer, so `value` is a
    /// best-effort guess.
    pub lossy: bool,
}

/// Errors raised while handling a directive. All are fatal to startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("{directive} takes one argument, {help} (got {got})")]
    Arity {
        directive: &'static str,
        help: &'static str,
        got: usize,
    },

    #[error("{directive}: '{value}' is not a valid integer")]
    InvalidValue {
        directive: &'static str,
        value: String,
    },
}

/// Convert `raw` the way `atoi(3)` does.
///
/// Leading whitespace and one sign are accepted, then the longest run of
/// digits. No digits yields 0. Out-of-range values saturate.
pub fn parse_int(raw: &str) -> ParsedInt {
    let exact = raw.trim().parse::<i32>().ok();

    let s = raw.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'));
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut acc: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        acc = (acc * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        acc = -acc;
    }
    let value = acc.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;

    ParsedInt {
        value,
        lossy: exact != Some(value),
    }
}

/// Handle one occurrence of `directive`, storing into `config`.
///
/// Checks arity, then context, then converts the argument under `policy`.
pub fn handle_directive(
    directive: Directive,
    context: &CommandContext,
    args: &[&str],
    policy: ParsePolicy,
    config: &mut SocketOptionsConfig,
) -> Result<ParsedInt, DirectiveError> {
    let [arg] = args else {
        return Err(DirectiveError::Arity {
            directive: directive.name(),
            help: directive.help(),
            got: args.len(),
        });
    };

    context.check_global_only(directive.name())?;

    let parsed = parse_int(arg);
    if parsed.lossy {
        if policy == ParsePolicy::Strict {
            return Err(DirectiveError::InvalidValue {
                directive: directive.name(),
                value: arg.to_string(),
            });
        }
        tracing::warn!(
            directive = directive.name(),
            argument = %arg,
            value = parsed.value,
            "Directive argument is not a clean integer, using best-effort value"
        );
    }

    directive.store(config, parsed.value);
    tracing::debug!(directive = directive.name(), value = parsed.value, "Directive set");
    Ok(parsed)
}
