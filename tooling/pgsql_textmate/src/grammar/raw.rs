//! The `TextMate` grammar JSON format, as written by grammar authors.
//!
//! Only the keys the tokenizer interprets are modelled; everything else
//! (`fileTypes`, `$schema`, `injections`, free-form comments) is ignored.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer};

/// Named rules a grammar or rule makes available to `#name` includes.
pub type Repository = FxHashMap<String, RawRule>;

/// Capture rules keyed by decimal group index (`"0"`, `"1"`, ...).
pub type RawCaptures = FxHashMap<String, RawRule>;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGrammar {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scope_name: Option<String>,
    #[serde(default)]
    pub patterns: Vec<RawRule>,
    #[serde(default)]
    pub repository: Repository,
}

impl RawGrammar {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default, rename = "match")]
    pub match_: Option<String>,
    #[serde(default)]
    pub begin: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, rename = "while")]
    pub while_: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content_name: Option<String>,
    #[serde(default)]
    pub captures: RawCaptures,
    #[serde(default)]
    pub begin_captures: RawCaptures,
    #[serde(default)]
    pub end_captures: RawCaptures,
    #[serde(default)]
    pub while_captures: RawCaptures,
    #[serde(default)]
    pub patterns: Vec<RawRule>,
    #[serde(default)]
    pub repository: Repository,
    #[serde(default, deserialize_with = "flag")]
    pub apply_end_pattern_last: bool,
    #[serde(default, deserialize_with = "flag")]
    pub disabled: bool,
}

/// Grammars write boolean switches both as `true` and as `1`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}
