use chrono::NaiveDate;

/// Parse the accident date (`"YYYY-MM-DD"`, optionally quoted or padded).
pub fn parse_accident_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim().trim_matches('"');
    // minimal length + separators check
    if s.len() != 10 || !s.is_ascii() || &s[4..5] != "-" || &s[7..8] != "-" {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_accident_date("2016-02-29"),
            NaiveDate::from_ymd_opt(2016, 2, 29)
        );
        assert_eq!(
            parse_accident_date(" \"2021-12-01\" "),
            NaiveDate::from_ymd_opt(2021, 12, 1)
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(parse_accident_date("2017-02-29"), None);
        assert_eq!(parse_accident_date("01.02.2020"), None);
        assert_eq!(parse_accident_date("2020-1-1"), None);
        assert_eq!(parse_accident_date(""), None);
        assert_eq!(parse_accident_date("2020-01-0x"), None);
        assert_eq!(parse_accident_date("2020-0č-01"), None);
    }
}
