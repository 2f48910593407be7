//! Inbound command parsing.
//!
//! Recognizes `/keyword args...` commands (with aliases) and the bare
//! `<code>j` arcade trigger. Everything else is not addressed to the bridge.

use regex_lite::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Every command the bridge answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    /// `/help`: local usage summary.
    Help,
    /// `/bind <token>`: exchange a bot token for a credential.
    Bind,
    /// `/mai <name>`: player profile.
    Profile,
    /// `/mai_status`: network status, first five arcades.
    NetworkStatus,
    /// `/run <int>`: set the ticket multiplier.
    SetTicket,
    /// `/go`: set the ticket multiplier to 6.
    QuickTicket,
    /// `/norun`: cancel the ticket multiplier.
    ResetTicket,
    /// `/getrun`: show the current multiplier.
    CurrentTicket,
    /// `<code>j`: arcade detail, admin identity.
    ArcadeDetail,
    /// `/net`: full network status, admin identity.
    AdminNetworkStatus,
}

impl CommandName {
    /// Resolve a slash keyword (without the `/`), aliases included.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "help" | "帮助" => Some(Self::Help),
            "bind" => Some(Self::Bind),
            "mai" | "查分" | "maimai" => Some(Self::Profile),
            "mai_status" | "网厅状态" | "网络状况" => Some(Self::NetworkStatus),
            "run" => Some(Self::SetTicket),
            "go" => Some(Self::QuickTicket),
            "norun" => Some(Self::ResetTicket),
            "getrun" => Some(Self::CurrentTicket),
            "net" => Some(Self::AdminNetworkStatus),
            _ => None,
        }
    }

    /// Canonical name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Bind => "bind",
            Self::Profile => "mai",
            Self::NetworkStatus => "mai_status",
            Self::SetTicket => "run",
            Self::QuickTicket => "go",
            Self::ResetTicket => "norun",
            Self::CurrentTicket => "getrun",
            Self::ArcadeDetail => "arcade_detail",
            Self::AdminNetworkStatus => "net",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound command, consumed within a single request cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub user_id: String,
    pub command: CommandName,
    /// Text after the keyword, trimmed. For the arcade trigger: the arcade code.
    pub raw_args: String,
}

impl CommandInvocation {
    pub fn new(user_id: impl Into<String>, command: CommandName, raw_args: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            command,
            raw_args: raw_args.into(),
        }
    }

    /// First whitespace-separated argument, if any.
    pub fn first_arg(&self) -> Option<&str> {
        self.raw_args.split_whitespace().next()
    }
}

fn arcade_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\S+)j$").expect("arcade trigger regex is valid"))
}

/// Arcade code from a `<code>j` message. Slash-prefixed text never matches.
pub fn arcade_code(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.starts_with('/') {
        return None;
    }
    arcade_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse a raw inbound message. `None` means the message is not for us.
pub fn parse_command(user_id: &str, text: &str) -> Option<CommandInvocation> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix('/') {
        let (keyword, args) = match rest.split_once(char::is_whitespace) {
            Some((keyword, args)) => (keyword, args.trim()),
            None => (rest, ""),
        };
        return CommandName::from_keyword(keyword)
            .map(|command| CommandInvocation::new(user_id, command, args));
    }
    arcade_code(text).map(|code| CommandInvocation::new(user_id, CommandName::ArcadeDetail, code))
}
