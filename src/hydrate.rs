// Strict parsing of raw scouting exports and match-result files.
//
// Raw records are flat objects keyed by the scouting sheet's column names,
// with numbers and flags stored as strings.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{MalformedRecordError, Result, ScoutError};
use crate::model::{MatchResult, Point, RobotMatchEntry};

pub const MATCH_NUMBER: &str = "Match Number";
pub const TEAM_NUMBER: &str = "Team Number";
pub const AUTONOMOUS_PATH: &str = "Autonomous Path";
pub const AUTO_CROSS_LINE: &str = "Auto Cross Line";
pub const AUTO_SWITCH_CUBES: &str = "Auto Switch Cubes";
pub const AUTO_SCALE_CUBES: &str = "Auto Scale Cubes";
pub const OWN_SWITCH_CUBES_TELEOP: &str = "Own Switch Cubes Teleop";
pub const SCALE_CUBES_TELEOP: &str = "Scale Cubes Teleop";
pub const OPP_SWITCH_CUBES_TELEOP: &str = "Opponent Switch Cubes Teleop";
pub const EXCHANGE_CUBES: &str = "Exchange Cubes";
pub const SINGLE_CLIMB: &str = "Single Climb";
pub const CLIMB_WITH_ONE_BUDDY: &str = "Climb + 1 Buddy";
pub const CLIMB_WITH_TWO_BUDDIES: &str = "Climb + 2 Buddies";
pub const PLAYED_DEFENSE: &str = "Played Defense";

type RawRecord = Map<String, Value>;

/// One raw record and its position in the export, for error reporting.
struct RecordReader<'a> {
    index: usize,
    record: &'a RawRecord,
}

impl<'a> RecordReader<'a> {
    fn malformed(&self, field: &str, reason: impl Into<String>) -> MalformedRecordError {
        MalformedRecordError::new(self.index, field, reason)
    }

    fn get(&self, field: &str) -> std::result::Result<&'a Value, MalformedRecordError> {
        self.record
            .get(field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| self.malformed(field, "is missing"))
    }

    fn count(&self, field: &str) -> std::result::Result<u32, MalformedRecordError> {
        match self.get(field)? {
            Value::String(s) => s
                .trim()
                .parse::<u32>()
                .map_err(|_| self.malformed(field, format!("is not a non-negative integer: {s:?}"))),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| self.malformed(field, format!("is not a non-negative integer: {n}"))),
            other => Err(self.malformed(field, format!("has unexpected type: {other}"))),
        }
    }

    fn positive(&self, field: &str) -> std::result::Result<u32, MalformedRecordError> {
        match self.count(field)? {
            0 => Err(self.malformed(field, "must be positive")),
            n => Ok(n),
        }
    }

    /// `"1"` is true; `"0"` and blank are false.
    fn flag(&self, field: &str) -> std::result::Result<bool, MalformedRecordError> {
        match self.get(field)? {
            Value::String(s) => match s.trim() {
                "1" => Ok(true),
                "0" | "" => Ok(false),
                _ => Err(self.malformed(field, format!("is not a 0/1 flag: {s:?}"))),
            },
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => match n.as_u64() {
                Some(1) => Ok(true),
                Some(0) => Ok(false),
                _ => Err(self.malformed(field, format!("is not a 0/1 flag: {n}"))),
            },
            other => Err(self.malformed(field, format!("has unexpected type: {other}"))),
        }
    }

    fn path(&self, field: &str) -> std::result::Result<Vec<Point>, MalformedRecordError> {
        match self.get(field)? {
            Value::String(s) => parse_path(s).map_err(|reason| self.malformed(field, reason)),
            v @ Value::Array(_) => Vec::<Point>::deserialize(v)
                .map_err(|e| self.malformed(field, format!("is not a list of [y, x] pairs: {e}"))),
            other => Err(self.malformed(field, format!("has unexpected type: {other}"))),
        }
    }
}

/// Parse a path literal like `[[10,20],[50,60]]`. Blank text is an empty path.
pub fn parse_path(text: &str) -> std::result::Result<Vec<Point>, String> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<Point>>(text)
        .map_err(|e| format!("is not a list of [y, x] pairs: {e}"))
}

/// Build a typed entry from one raw record.
pub fn hydrate_robot_entry(
    index: usize,
    record: &RawRecord,
) -> std::result::Result<RobotMatchEntry, MalformedRecordError> {
    let r = RecordReader { index, record };
    let entry = RobotMatchEntry {
        match_number: r.positive(MATCH_NUMBER)?,
        team_number: r.positive(TEAM_NUMBER)?,
        autonomous_path: r.path(AUTONOMOUS_PATH)?,
        auto_cross_line: r.flag(AUTO_CROSS_LINE)?,
        auto_switch_cubes: r.count(AUTO_SWITCH_CUBES)?,
        auto_scale_cubes: r.count(AUTO_SCALE_CUBES)?,
        own_switch_cubes_teleop: r.count(OWN_SWITCH_CUBES_TELEOP)?,
        scale_cubes_teleop: r.count(SCALE_CUBES_TELEOP)?,
        opp_switch_cubes_teleop: r.count(OPP_SWITCH_CUBES_TELEOP)?,
        exchange_cubes: r.count(EXCHANGE_CUBES)?,
        single_climb: r.flag(SINGLE_CLIMB)?,
        climb_with_one_buddy: r.flag(CLIMB_WITH_ONE_BUDDY)?,
        climb_with_two_buddies: r.flag(CLIMB_WITH_TWO_BUDDIES)?,
        played_defense: r.flag(PLAYED_DEFENSE)?,
    };

    // A robot climbs at most one way.
    let climbs = [
        (SINGLE_CLIMB, entry.single_climb),
        (CLIMB_WITH_ONE_BUDDY, entry.climb_with_one_buddy),
        (CLIMB_WITH_TWO_BUDDIES, entry.climb_with_two_buddies),
    ];
    if let Some((field, _)) = climbs.iter().filter(|(_, set)| *set).nth(1) {
        return Err(r.malformed(field, "conflicts with another climb flag"));
    }
    Ok(entry)
}

/// Parse a full event data file, rejecting duplicate (match, team) pairs.
pub fn parse_event_data(json: &str) -> Result<Vec<RobotMatchEntry>> {
    let records: Vec<RawRecord> = serde_json::from_str(json)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut entries = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let entry = hydrate_robot_entry(index, record)?;
        if !seen.insert((entry.match_number, entry.team_number)) {
            return Err(ScoutError::DuplicateEntry {
                index,
                match_number: entry.match_number,
                team_number: entry.team_number,
            });
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Parse a match-results file, either a list of matches or an object keyed by match key.
pub fn parse_match_results(json: &str) -> Result<BTreeMap<String, MatchResult>> {
    if json.trim_start().starts_with('[') {
        let list: Vec<MatchResult> = serde_json::from_str(json)?;
        return Ok(list.into_iter().map(|m| (m.key.clone(), m)).collect());
    }

    let keyed: BTreeMap<String, MatchResult> = serde_json::from_str(json)?;
    if let Some((key, m)) = keyed.iter().find(|(key, m)| **key != m.key) {
        return Err(ScoutError::MatchKeyMismatch {
            key: key.clone(),
            match_key: m.key.clone(),
        });
    }
    Ok(keyed)
}
