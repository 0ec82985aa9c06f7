use std::sync::OnceLock;

use chrono::{DateTime, Local, Months, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::error::SiftError;

// ---------------------------------------------------------------------------
// CompareOp
// ---------------------------------------------------------------------------

/// The relational operator of a parsed comparison expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    LessEq,
    Eq,
    GreaterEq,
    Greater,
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// A parsed comparison against an integer target (byte count, Unix timestamp
/// or tree depth). Immutable once parsed; filtering never re-reads the
/// original expression.
///
/// # Example
///
/// ```rust
/// use sift::Comparator;
///
/// let c = Comparator::size("< 1K").unwrap();
/// assert!(c.matches(500));
/// assert!(!c.matches(2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    op:     CompareOp,
    target: i64,
}

impl Comparator {
    /// Parse a size expression: an optional operator followed by an integer
    /// and an optional unit suffix. Decimal suffixes (`k`, `m`, `g`) multiply
    /// by powers of 1000, binary suffixes (`ki`, `mi`, `gi`) by powers of
    /// 1024. No suffix means bytes; no operator means equality.
    pub fn size(expr: &str) -> Result<Self, SiftError> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"(?i)^(<=|>=|<|>|==?)?\s*([0-9]+)\s*([kmg]i?)?$").unwrap()
        });

        let trimmed = expr.trim();
        let caps = re
            .captures(trimmed)
            .ok_or_else(|| SiftError::parse(expr, "expected [operator] integer [unit]"))?;

        let op = match caps.get(1).map(|m| m.as_str()) {
            None => CompareOp::Eq,
            Some(tok) => op_token(tok),
        };

        let value: i64 = caps[2]
            .parse()
            .map_err(|_| SiftError::parse(expr, "integer out of range"))?;

        let multiplier: i64 = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
            None => 1,
            Some(unit) => match unit.as_str() {
                "k" => 1000,
                "ki" => 1024,
                "m" => 1000 * 1000,
                "mi" => 1024 * 1024,
                "g" => 1000 * 1000 * 1000,
                "gi" => 1024 * 1024 * 1024,
                other => return Err(SiftError::parse(expr, format!("unknown unit `{other}`"))),
            },
        };

        let target = value
            .checked_mul(multiplier)
            .ok_or_else(|| SiftError::parse(expr, "size overflows"))?;

        Ok(Self { op, target })
    }

    /// Parse a depth expression. Same numeric grammar as [`Comparator::size`]
    /// but without unit suffixes. Depth counts from the scan root: the root
    /// itself is depth 0, its direct children depth 1.
    pub fn depth(expr: &str) -> Result<Self, SiftError> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re =
            RE.get_or_init(|| Regex::new(r"^(<=|>=|<|>|==?)?\s*([0-9]+)$").unwrap());

        let trimmed = expr.trim();
        let caps = re
            .captures(trimmed)
            .ok_or_else(|| SiftError::parse(expr, "expected [operator] integer"))?;

        let op = match caps.get(1).map(|m| m.as_str()) {
            None => CompareOp::Eq,
            Some(tok) => op_token(tok),
        };

        let target: i64 = caps[2]
            .parse()
            .map_err(|_| SiftError::parse(expr, "integer out of range"))?;

        Ok(Self { op, target })
    }

    /// Parse a date expression against the current clock.
    ///
    /// The value is either an absolute date (`2024-01-31`,
    /// `2024-01-31 10:30:00`, RFC 3339) or a relative phrase (`now`, `today`,
    /// `yesterday`, `3 days ago`, `last month`). `since`/`after` mean
    /// on-or-after, `until`/`before` mean on-or-before; a bare value without
    /// an operator is treated as on-or-after. Relative phrases resolve to an
    /// absolute timestamp at parse time.
    pub fn date(expr: &str) -> Result<Self, SiftError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(SiftError::parse(expr, "empty expression"));
        }

        let (op, value) = split_date_op(trimmed);
        let target = resolve_instant(value.trim(), expr)?;
        Ok(Self { op, target })
    }

    /// Apply the comparison to an actual value.
    pub fn matches(&self, actual: i64) -> bool {
        match self.op {
            CompareOp::Less => actual < self.target,
            CompareOp::LessEq => actual <= self.target,
            CompareOp::Eq => actual == self.target,
            CompareOp::GreaterEq => actual >= self.target,
            CompareOp::Greater => actual > self.target,
        }
    }

    /// The largest value this comparator can admit, if bounded above.
    /// Used to cap traversal depth before the walk begins.
    pub fn ceiling(&self) -> Option<i64> {
        match self.op {
            CompareOp::Less => Some(self.target.saturating_sub(1)),
            CompareOp::LessEq | CompareOp::Eq => Some(self.target),
            _ => None,
        }
    }

    /// The smallest value this comparator can admit, if bounded below.
    pub fn floor(&self) -> Option<i64> {
        match self.op {
            CompareOp::Greater => Some(self.target.saturating_add(1)),
            CompareOp::GreaterEq | CompareOp::Eq => Some(self.target),
            _ => None,
        }
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn target(&self) -> i64 {
        self.target
    }
}

// ---------------------------------------------------------------------------
// Date resolution
// ---------------------------------------------------------------------------

fn op_token(tok: &str) -> CompareOp {
    match tok {
        "<" => CompareOp::Less,
        "<=" => CompareOp::LessEq,
        ">" => CompareOp::Greater,
        ">=" => CompareOp::GreaterEq,
        _ => CompareOp::Eq,
    }
}

/// Split a leading word or symbol operator off a date expression. Word
/// operators match case-insensitively; the value keeps its original case so
/// absolute forms parse untouched.
fn split_date_op(s: &str) -> (CompareOp, &str) {
    const WORDS: [(&str, CompareOp); 4] = [
        ("since ", CompareOp::GreaterEq),
        ("after ", CompareOp::GreaterEq),
        ("until ", CompareOp::LessEq),
        ("before ", CompareOp::LessEq),
    ];
    for (word, op) in WORDS {
        if s.len() > word.len() && s[..word.len()].eq_ignore_ascii_case(word) {
            return (op, &s[word.len()..]);
        }
    }

    const TOKENS: [(&str, CompareOp); 6] = [
        ("<=", CompareOp::LessEq),
        (">=", CompareOp::GreaterEq),
        ("==", CompareOp::Eq),
        ("=", CompareOp::Eq),
        ("<", CompareOp::Less),
        (">", CompareOp::Greater),
    ];
    for (token, op) in TOKENS {
        if let Some(rest) = s.strip_prefix(token) {
            return (op, rest);
        }
    }

    // A bare value means on-or-after.
    (CompareOp::GreaterEq, s)
}

/// Resolve a date value (absolute or relative phrase) into Unix seconds.
fn resolve_instant(value: &str, original: &str) -> Result<i64, SiftError> {
    let now = Local::now();
    let lower = value.to_ascii_lowercase();

    match lower.as_str() {
        "" => return Err(SiftError::parse(original, "missing date value")),
        "now" => return Ok(now.timestamp()),
        "today" => return local_midnight(now.date_naive(), original),
        "yesterday" => {
            let day = now
                .date_naive()
                .pred_opt()
                .ok_or_else(|| SiftError::parse(original, "date out of range"))?;
            return local_midnight(day, original);
        }
        "last week" => return Ok(now.timestamp() - 7 * 86_400),
        "last month" => return sub_months(now, 1, original),
        "last year" => return sub_months(now, 12, original),
        _ => {}
    }

    // "N <unit> ago"
    static AGO: OnceLock<Regex> = OnceLock::new();
    let ago = AGO.get_or_init(|| {
        Regex::new(r"^([0-9]+)\s+(second|minute|hour|day|week|month|year)s?\s+ago$").unwrap()
    });
    if let Some(caps) = ago.captures(&lower) {
        let n: i64 = caps[1]
            .parse()
            .map_err(|_| SiftError::parse(original, "count out of range"))?;
        return match &caps[2] {
            "second" => Ok(now.timestamp() - n),
            "minute" => Ok(now.timestamp() - n * 60),
            "hour" => Ok(now.timestamp() - n * 3600),
            "day" => Ok(now.timestamp() - n * 86_400),
            "week" => Ok(now.timestamp() - n * 7 * 86_400),
            "month" => sub_months(now, n, original),
            "year" => sub_months(now, n.saturating_mul(12), original),
            _ => unreachable!(),
        };
    }

    // Absolute forms, most specific first.
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return local_timestamp(naive, original);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return local_midnight(date, original);
    }

    Err(SiftError::parse(original, "unparsable date"))
}

fn local_midnight(date: NaiveDate, original: &str) -> Result<i64, SiftError> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| SiftError::parse(original, "date out of range"))?;
    local_timestamp(naive, original)
}

fn local_timestamp(naive: NaiveDateTime, original: &str) -> Result<i64, SiftError> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| SiftError::parse(original, "date out of range"))
}

fn sub_months(now: DateTime<Local>, n: i64, original: &str) -> Result<i64, SiftError> {
    let n = u32::try_from(n).map_err(|_| SiftError::parse(original, "count out of range"))?;
    now.checked_sub_months(Months::new(n))
        .map(|dt| dt.timestamp())
        .ok_or_else(|| SiftError::parse(original, "date out of range"))
}
