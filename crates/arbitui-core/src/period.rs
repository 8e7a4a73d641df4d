//! Tenor periods with a compact string wire form (`"3M"`, `"10Y"`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Calendar unit of a [`Period`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Day.
    Day,
    /// Week.
    Week,
    /// Month.
    Month,
    /// Year.
    Year,
}

impl Unit {
    fn suffix(self) -> char {
        match self {
            Unit::Day => 'D',
            Unit::Week => 'W',
            Unit::Month => 'M',
            Unit::Year => 'Y',
        }
    }

    /// Scaled length of one unit in 1/4380ths of a year.
    ///
    /// 4380 = lcm-friendly base for 1/365 (day), 7/365 (week), 1/12 (month)
    /// so relative ordering stays exact in integer arithmetic.
    fn scale(self) -> u64 {
        match self {
            Unit::Day => 12,
            Unit::Week => 84,
            Unit::Month => 365,
            Unit::Year => 4380,
        }
    }
}

/// A tenor such as `3M` or `10Y`.
///
/// Serializes to its compact string form so it can be used as a JSON map
/// key, matching the engine's wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Period {
    /// Number of units.
    pub length: u32,
    /// Calendar unit.
    pub unit: Unit,
}

impl Period {
    /// Construct a period.
    pub fn new(length: u32, unit: Unit) -> Self {
        Self { length, unit }
    }

    /// Approximate length in year fractions (day = 1/365, month = 1/12).
    pub fn to_year_fraction(self) -> f64 {
        let u = match self.unit {
            Unit::Day => 1.0 / 365.0,
            Unit::Week => 7.0 / 365.0,
            Unit::Month => 1.0 / 12.0,
            Unit::Year => 1.0,
        };
        f64::from(self.length) * u
    }

    fn scaled(self) -> u64 {
        u64::from(self.length) * self.unit.scale()
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        // Tie-break so that e.g. 7D and 1W stay distinct map keys.
        self.scaled()
            .cmp(&other.scaled())
            .then_with(|| self.unit.scale().cmp(&other.unit.scale()))
            .then_with(|| self.length.cmp(&other.length))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit.suffix())
    }
}

/// Error parsing a period from its string form.
#[derive(Debug, thiserror::Error)]
#[error("invalid period {0:?}")]
pub struct PeriodParseError(pub String);

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || PeriodParseError(s.to_owned());
        if s.len() < 2 {
            return Err(bad());
        }
        let (num, suffix) = s.split_at(s.len() - 1);
        let length: u32 = num.parse().map_err(|_| bad())?;
        let unit = match suffix {
            "D" => Unit::Day,
            "W" => Unit::Week,
            "M" => Unit::Month,
            "Y" => Unit::Year,
            _ => return Err(bad()),
        };
        Ok(Period { length, unit })
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trip() {
        let p = Period::new(3, Unit::Month);
        assert_eq!(p.to_string(), "3M");
        assert_eq!("3M".parse::<Period>().unwrap(), p);
    }

    #[test]
    fn parse_all_units() {
        assert_eq!("5D".parse::<Period>().unwrap().unit, Unit::Day);
        assert_eq!("2W".parse::<Period>().unwrap().unit, Unit::Week);
        assert_eq!("6M".parse::<Period>().unwrap().unit, Unit::Month);
        assert_eq!("10Y".parse::<Period>().unwrap().unit, Unit::Year);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Period>().is_err());
        assert!("M".parse::<Period>().is_err());
        assert!("3X".parse::<Period>().is_err());
        assert!("-3M".parse::<Period>().is_err());
        assert!("3.5M".parse::<Period>().is_err());
    }

    #[test]
    fn ordering_by_year_fraction() {
        let m6: Period = "6M".parse().unwrap();
        let y1: Period = "1Y".parse().unwrap();
        let d30: Period = "30D".parse().unwrap();
        assert!(d30 < m6);
        assert!(m6 < y1);
        assert_ne!("12M".parse::<Period>().unwrap(), y1);
    }

    #[test]
    fn equal_year_fraction_stays_distinct() {
        let d7: Period = "7D".parse().unwrap();
        let w1: Period = "1W".parse().unwrap();
        assert_ne!(d7.cmp(&w1), Ordering::Equal);
        assert!((d7.to_year_fraction() - w1.to_year_fraction()).abs() < 1e-12);
    }

    #[test]
    fn serde_as_string() {
        let p = Period::new(10, Unit::Year);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"10Y\"");
        let back: Period = serde_json::from_str("\"10Y\"").unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn serde_map_key() {
        use std::collections::BTreeMap;
        let mut m = BTreeMap::new();
        let _ = m.insert(Period::new(1, Unit::Year), 1.0_f64);
        let _ = m.insert(Period::new(6, Unit::Month), 2.0_f64);
        let js = serde_json::to_string(&m).unwrap();
        assert_eq!(js, r#"{"6M":2.0,"1Y":1.0}"#);
        let back: BTreeMap<Period, f64> = serde_json::from_str(&js).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn year_fraction_values() {
        assert!((Period::new(1, Unit::Year).to_year_fraction() - 1.0).abs() < 1e-12);
        assert!((Period::new(6, Unit::Month).to_year_fraction() - 0.5).abs() < 1e-12);
        assert!((Period::new(365, Unit::Day).to_year_fraction() - 1.0).abs() < 1e-12);
    }
}
