//! Command-line argument parsing.

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Store a bearer token and exit
    Login(String),
    /// End the session (best-effort `POST /logout`) and exit
    Logout,
    /// Pair the WhatsApp link, then exit
    Pair,
    /// Run the interactive console (default)
    Run,
    /// Bad invocation, with the reason
    Usage(String),
}

pub const USAGE: &str = "usage: zapdesk [--version | login <token> | logout | pair]";

/// Parse command-line arguments (program name first).
///
/// # Examples
///
/// ```
/// use zapdesk::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["zapdesk".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1);
    let Some(first) = args.next() else {
        return CliCommand::Run;
    };
    match first.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "login" => match args.next().filter(|t| !t.trim().is_empty()) {
            Some(token) => CliCommand::Login(token.trim().to_string()),
            None => CliCommand::Usage("login requires a token".to_string()),
        },
        "logout" => CliCommand::Logout,
        "pair" => CliCommand::Pair,
        "run" => CliCommand::Run,
        other => CliCommand::Usage(format!("unknown argument '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args_runs_console() {
        assert_eq!(parse(&["zapdesk"]), CliCommand::Run);
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse(&["zapdesk", "--version"]), CliCommand::Version);
        assert_eq!(parse(&["zapdesk", "-V"]), CliCommand::Version);
    }

    #[test]
    fn test_parse_login() {
        assert_eq!(
            parse(&["zapdesk", "login", "abc123"]),
            CliCommand::Login("abc123".to_string())
        );
        assert!(matches!(parse(&["zapdesk", "login"]), CliCommand::Usage(_)));
        assert!(matches!(parse(&["zapdesk", "login", "  "]), CliCommand::Usage(_)));
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(parse(&["zapdesk", "logout"]), CliCommand::Logout);
        assert_eq!(parse(&["zapdesk", "pair"]), CliCommand::Pair);
    }

    #[test]
    fn test_unknown_argument() {
        assert_eq!(
            parse(&["zapdesk", "--frobnicate"]),
            CliCommand::Usage("unknown argument '--frobnicate'".to_string())
        );
    }
}
