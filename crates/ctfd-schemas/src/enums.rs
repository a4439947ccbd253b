//! Closed value sets used by the challenge model.
//!
//! Each enum serializes to the exact lowercase string CTFd uses and
//! deserializes through its `parse`, so an unknown string fails at the
//! document boundary with the list of accepted values and never reaches the
//! reconciliation core.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parse error
// ---------------------------------------------------------------------------

/// A string did not match any member of a closed value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}'. expected one of: {}",
            self.field,
            self.value,
            self.expected.join(" | ")
        )
    }
}

impl std::error::Error for UnknownValue {}

fn unknown(field: &'static str, value: &str, expected: &'static [&'static str]) -> UnknownValue {
    UnknownValue {
        field,
        value: value.to_string(),
        expected,
    }
}

macro_rules! parse_on_deserialize {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = UnknownValue;

                fn try_from(s: String) -> Result<Self, Self::Error> {
                    <$ty>::parse(&s)
                }
            }
        )+
    };
}

parse_on_deserialize!(Behavior, FlagType, FlagCase, FileType, FileLocation, Logic, Visibility);

// ---------------------------------------------------------------------------
// Requirements behavior
// ---------------------------------------------------------------------------

/// What a locked challenge looks like to players who have not unlocked it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Behavior {
    /// Not shown at all. Remote `anonymize` is absent.
    #[default]
    Hidden,
    /// Shown with name and details masked. Remote `anonymize` is `true`.
    Anonymized,
}

impl Behavior {
    pub const ALL: &'static [&'static str] = &["hidden", "anonymized"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Hidden => "hidden",
            Behavior::Anonymized => "anonymized",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownValue> {
        match s.trim() {
            "hidden" => Ok(Behavior::Hidden),
            "anonymized" => Ok(Behavior::Anonymized),
            other => Err(unknown("behavior", other, Self::ALL)),
        }
    }
}

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

/// How submitted answers are compared against the flag content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FlagType {
    #[default]
    Static,
    Regex,
    Programmable,
}

impl FlagType {
    pub const ALL: &'static [&'static str] = &["static", "regex", "programmable"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::Static => "static",
            FlagType::Regex => "regex",
            FlagType::Programmable => "programmable",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownValue> {
        match s.trim() {
            "static" => Ok(FlagType::Static),
            "regex" => Ok(FlagType::Regex),
            "programmable" => Ok(FlagType::Programmable),
            other => Err(unknown("flag type", other, Self::ALL)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FlagCase {
    #[default]
    CaseInsensitive,
    CaseSensitive,
}

impl FlagCase {
    pub const ALL: &'static [&'static str] = &["case_insensitive", "case_sensitive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagCase::CaseInsensitive => "case_insensitive",
            FlagCase::CaseSensitive => "case_sensitive",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownValue> {
        match s.trim() {
            "case_insensitive" => Ok(FlagCase::CaseInsensitive),
            "case_sensitive" => Ok(FlagCase::CaseSensitive),
            other => Err(unknown("flag case", other, Self::ALL)),
        }
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FileType {
    #[default]
    Challenge,
    Page,
    Standard,
}

impl FileType {
    pub const ALL: &'static [&'static str] = &["challenge", "page", "standard"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Challenge => "challenge",
            FileType::Page => "page",
            FileType::Standard => "standard",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownValue> {
        match s.trim() {
            "challenge" => Ok(FileType::Challenge),
            "page" => Ok(FileType::Page),
            "standard" => Ok(FileType::Standard),
            other => Err(unknown("file type", other, Self::ALL)),
        }
    }
}

/// Upload namespace requested for a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FileLocation {
    #[default]
    Challenge,
}

impl FileLocation {
    pub const ALL: &'static [&'static str] = &["challenge"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileLocation::Challenge => "challenge",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownValue> {
        match s.trim() {
            "challenge" => Ok(FileLocation::Challenge),
            other => Err(unknown("file location", other, Self::ALL)),
        }
    }
}

// ---------------------------------------------------------------------------
// Challenge scalars
// ---------------------------------------------------------------------------

/// Flag validation logic across multiple flags / team members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Logic {
    #[default]
    Any,
    All,
    Team,
}

impl Logic {
    pub const ALL: &'static [&'static str] = &["any", "all", "team"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::Any => "any",
            Logic::All => "all",
            Logic::Team => "team",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownValue> {
        match s.trim() {
            "any" => Ok(Logic::Any),
            "all" => Ok(Logic::All),
            "team" => Ok(Logic::Team),
            other => Err(unknown("logic", other, Self::ALL)),
        }
    }
}

/// Challenge `state` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    pub const ALL: &'static [&'static str] = &["hidden", "visible"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Hidden => "hidden",
            Visibility::Visible => "visible",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownValue> {
        match s.trim() {
            "hidden" => Ok(Visibility::Hidden),
            "visible" => Ok(Visibility::Visible),
            other => Err(unknown("state", other, Self::ALL)),
        }
    }
}

// ---------------------------------------------------------------------------
// Subresource kinds
// ---------------------------------------------------------------------------

/// The subresource collections owned by a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubresourceKind {
    Tag,
    Topic,
    File,
    Flag,
    Requirements,
}

impl SubresourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubresourceKind::Tag => "tag",
            SubresourceKind::Topic => "topic",
            SubresourceKind::File => "file",
            SubresourceKind::Flag => "flag",
            SubresourceKind::Requirements => "requirements",
        }
    }
}

impl fmt::Display for SubresourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
