// src/region.rs

use crate::error::IngestError;
use std::fmt;
use std::str::FromStr;

/// One of the 14 administrative regions covered by the archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Pha,
    Stc,
    Jhc,
    Plk,
    Kvk,
    Ulk,
    Lbk,
    Hkk,
    Pak,
    Olk,
    Msk,
    Jhm,
    Zlk,
    Vys,
}

impl Region {
    /// Default load order when the caller does not name any regions.
    pub const ALL: [Region; 14] = [
        Region::Pha,
        Region::Stc,
        Region::Jhc,
        Region::Plk,
        Region::Kvk,
        Region::Ulk,
        Region::Lbk,
        Region::Hkk,
        Region::Pak,
        Region::Olk,
        Region::Msk,
        Region::Jhm,
        Region::Zlk,
        Region::Vys,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::Pha => "PHA",
            Region::Stc => "STC",
            Region::Jhc => "JHC",
            Region::Plk => "PLK",
            Region::Kvk => "KVK",
            Region::Ulk => "ULK",
            Region::Lbk => "LBK",
            Region::Hkk => "HKK",
            Region::Pak => "PAK",
            Region::Olk => "OLK",
            Region::Msk => "MSK",
            Region::Jhm => "JHM",
            Region::Zlk => "ZLK",
            Region::Vys => "VYS",
        }
    }

    /// Name of this region's CSV inside every monthly archive.
    pub fn entry_name(self) -> &'static str {
        match self {
            Region::Pha => "00.csv",
            Region::Stc => "01.csv",
            Region::Jhc => "02.csv",
            Region::Plk => "03.csv",
            Region::Ulk => "04.csv",
            Region::Hkk => "05.csv",
            Region::Jhm => "06.csv",
            Region::Msk => "07.csv",
            Region::Olk => "14.csv",
            Region::Zlk => "15.csv",
            Region::Vys => "16.csv",
            Region::Pak => "17.csv",
            Region::Lbk => "18.csv",
            Region::Kvk => "19.csv",
        }
    }

    /// Parse a comma-separated list such as `"PHA,jhm"`, keeping the given order.
    pub fn parse_list(s: &str) -> Result<Vec<Region>, IngestError> {
        s.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Region::from_str)
            .collect()
    }
}

impl FromStr for Region {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Region::ALL
            .into_iter()
            .find(|r| r.code() == upper)
            .ok_or_else(|| IngestError::UnknownRegion(s.to_string()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn entry_names_are_unique() {
        let names: HashSet<_> = Region::ALL.iter().map(|r| r.entry_name()).collect();
        assert_eq!(names.len(), Region::ALL.len());
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("pha".parse::<Region>().unwrap(), Region::Pha);
        assert_eq!(" VYS ".parse::<Region>().unwrap(), Region::Vys);
        assert_eq!(Region::Kvk.entry_name(), "19.csv");
    }

    #[test]
    fn unknown_code_is_a_configuration_error() {
        let err = "XYZ".parse::<Region>().unwrap_err();
        assert!(matches!(err, IngestError::UnknownRegion(ref c) if c == "XYZ"));
    }

    #[test]
    fn list_keeps_caller_order() {
        let list = Region::parse_list("JHM, pha,STC").unwrap();
        assert_eq!(list, vec![Region::Jhm, Region::Pha, Region::Stc]);
        assert!(Region::parse_list("PHA,BAD").is_err());
    }
}
