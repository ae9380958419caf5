use std::{fmt, str::FromStr};

use crate::DetanglerError;

/// Permission level a command source needs to run any Detangler command
pub const REQUIRED_PERMISSION_LEVEL: u8 = 2;

/// Administrative commands, parsed from their text form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetanglerCommand {
    /// Count orphans without touching them
    Scan,
    /// Same as `Scan`
    DryRun,
    /// Count orphans and reclaim them
    Run,
    /// Count orphans per partition
    Report,
    /// Write a JSON report of every orphan
    Dump,
}

impl DetanglerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DetanglerCommand::Scan => "scan",
            DetanglerCommand::DryRun => "dryrun",
            DetanglerCommand::Run => "run",
            DetanglerCommand::Report => "report",
            DetanglerCommand::Dump => "dump",
        }
    }

    /// Whether the command discards what it finds
    pub fn reclaims(&self) -> bool {
        matches!(self, DetanglerCommand::Run)
    }
}

impl FromStr for DetanglerCommand {
    type Err = DetanglerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "scan" => Ok(DetanglerCommand::Scan),
            "dryrun" => Ok(DetanglerCommand::DryRun),
            "run" => Ok(DetanglerCommand::Run),
            "report" => Ok(DetanglerCommand::Report),
            "dump" => Ok(DetanglerCommand::Dump),
            _ => Err(DetanglerError::UnknownCommand {
                input: input.to_string(),
            }),
        }
    }
}

impl fmt::Display for DetanglerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whoever issued a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSource {
    pub permission_level: u8,
}

impl CommandSource {
    pub fn new(permission_level: u8) -> Self {
        Self { permission_level }
    }

    pub fn has_permission(&self, level: u8) -> bool {
        self.permission_level >= level
    }
}

/// Result of a successful command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandReply {
    pub message: String,
    /// Number of orphans the command found
    pub count: usize,
    /// Whether the host should also announce the reply to other operators
    pub broadcast: bool,
}

impl CommandReply {
    pub fn new(message: impl Into<String>, count: usize, broadcast: bool) -> Self {
        Self {
            message: message.into(),
            count,
            broadcast,
        }
    }
}
