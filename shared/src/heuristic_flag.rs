use std::{fmt, slice::Iter};

use serde::{Serialize, Serializer};

/// One piece of evidence that an object is an orphaned clone.
/// No single flag is authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeuristicFlag {
    /// Object has no live network/session association
    NoConnection,
    /// Object's identity is absent from the active session list
    NotInSessionList,
    /// Object carries a recognized marker, named by its vocabulary label
    Tag(String),
    /// Synthesized whenever at least one `Tag` fired
    RevivalTag,
    /// Object has existed past the age threshold without a legitimacy signal
    HighAge,
}

impl fmt::Display for HeuristicFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicFlag::NoConnection => f.write_str("no_connection"),
            HeuristicFlag::NotInSessionList => f.write_str("not_in_session_list"),
            HeuristicFlag::Tag(label) => write!(f, "tag:{}", label),
            HeuristicFlag::RevivalTag => f.write_str("revival_tag"),
            HeuristicFlag::HighAge => f.write_str("high_age"),
        }
    }
}

impl Serialize for HeuristicFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// HeuristicFlags
/// Insertion-ordered set of flags, in the order the signals were checked
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeuristicFlags {
    flags: Vec<HeuristicFlag>,
}

impl HeuristicFlags {
    pub fn new() -> Self {
        Self { flags: Vec::new() }
    }

    /// Adds `flag` unless already present. Returns whether it was added.
    pub fn insert(&mut self, flag: HeuristicFlag) -> bool {
        if self.flags.contains(&flag) {
            return false;
        }
        self.flags.push(flag);
        true
    }

    pub fn contains(&self, flag: &HeuristicFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, HeuristicFlag> {
        self.flags.iter()
    }

    pub fn has_tag(&self) -> bool {
        self.flags
            .iter()
            .any(|flag| matches!(flag, HeuristicFlag::Tag(_)))
    }

    /// Flags rendered as their diagnostic names
    pub fn labels(&self) -> Vec<String> {
        self.flags.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a HeuristicFlags {
    type Item = &'a HeuristicFlag;
    type IntoIter = Iter<'a, HeuristicFlag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.iter()
    }
}

impl FromIterator<HeuristicFlag> for HeuristicFlags {
    fn from_iter<I: IntoIterator<Item = HeuristicFlag>>(iter: I) -> Self {
        let mut flags = HeuristicFlags::new();
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}
