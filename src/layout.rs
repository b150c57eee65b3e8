//! Date layouts such as `YYYY-MM-DD` or `02/01/2006`.
//!
//! A layout is made of numeric fields and literal separators. Fields are written either with
//! symbolic tokens (`YYYY`, `YY`, `MM`, `DD`) or with the reference date tokens (`2006`, `06`,
//! `01`, `02`, and the unpadded `1` and `2`). Any other digit stands for itself. Textual fields
//! like month names are not supported.

use crate::error::CompileError;
use chrono::NaiveDate;

/// Reference date tokens, longest first
const REFERENCE_TOKENS: [(&str, Field, usize); 6] = [
    ("2006", Field::Year, 4),
    ("01", Field::Month, 2),
    ("02", Field::Day, 2),
    ("06", Field::ShortYear, 2),
    ("1", Field::Month, 1),
    ("2", Field::Day, 1),
];

const DIGIT: &str = "[[:digit:]]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year = 0,
    ShortYear = 1,
    Month = 2,
    Day = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    /// A numeric field spanning exactly `width` digits
    Field(Field, usize),
    Literal(char),
}

/// A validated date layout, able to produce a matching sub-pattern and to parse dates
#[derive(Debug, Clone)]
pub struct DateLayout {
    layout: String,
    pieces: Vec<Piece>,
    pattern: String,
}

impl DateLayout {
    pub fn parse(layout: &str) -> Result<Self, CompileError> {
        if let Some(c) = layout.chars().find(|&c| is_unsupported(c)) {
            return Err(CompileError::UnsupportedLayoutCharacter(c));
        }

        let pieces = tokenize(layout)?;

        let mut pattern = String::new();
        for piece in &pieces {
            match *piece {
                Piece::Field(_, width) => pattern.push_str(&DIGIT.repeat(width)),
                Piece::Literal(c) if c.is_ascii_digit() => pattern.push_str(DIGIT),
                Piece::Literal(c) => {
                    let mut buf = [0; 4];
                    pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                }
            }
        }

        Ok(Self {
            layout: layout.to_string(),
            pieces,
            pattern,
        })
    }

    /// Sub-pattern recognising a date written in this layout. Has no capture groups.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn as_str(&self) -> &str {
        &self.layout
    }

    /// Parse a date written in this layout, `None` if it is not a real calendar date.
    ///
    /// Missing fields default to year 0, January and the 1st. Two-digit years from 69 on
    /// fall in the 1900s, the others in the 2000s.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let mut chars = text.chars();
        let mut fields: [Option<u32>; 4] = [None; 4];

        for piece in &self.pieces {
            match *piece {
                Piece::Field(field, width) => {
                    let mut value = 0;
                    for _ in 0..width {
                        value = value * 10 + chars.next()?.to_digit(10)?;
                    }
                    let slot = &mut fields[field as usize];
                    if slot.is_some_and(|previous| previous != value) {
                        return None;
                    }
                    *slot = Some(value);
                }
                Piece::Literal(c) => {
                    if chars.next()? != c {
                        return None;
                    }
                }
            }
        }
        if chars.next().is_some() {
            return None;
        }

        let year = match (fields[Field::Year as usize], fields[Field::ShortYear as usize]) {
            (Some(year), _) => year as i32,
            (None, Some(short)) if short >= 69 => 1900 + short as i32,
            (None, Some(short)) => 2000 + short as i32,
            (None, None) => 0,
        };
        let month = fields[Field::Month as usize].unwrap_or(1);
        let day = fields[Field::Day as usize].unwrap_or(1);

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

fn is_unsupported(c: char) -> bool {
    c.is_alphanumeric() && !c.is_ascii_digit() && !matches!(c, 'Y' | 'M' | 'D')
}

fn tokenize(layout: &str) -> Result<Vec<Piece>, CompileError> {
    let mut pieces = Vec::new();
    let mut rest = layout;

    while let Some(c) = rest.chars().next() {
        if c.is_ascii_digit() {
            match REFERENCE_TOKENS
                .iter()
                .find(|(token, _, _)| rest.starts_with(token))
            {
                Some((token, field, width)) => {
                    pieces.push(Piece::Field(*field, *width));
                    rest = &rest[token.len()..];
                }
                None => {
                    pieces.push(Piece::Literal(c));
                    rest = &rest[1..];
                }
            }
        } else if matches!(c, 'Y' | 'M' | 'D') {
            let run_len = rest.chars().take_while(|&r| r == c).count();
            let field = match (c, run_len) {
                ('Y', 4) => Field::Year,
                ('Y', 2) => Field::ShortYear,
                ('M', 2) => Field::Month,
                ('D', 2) => Field::Day,
                _ => return Err(CompileError::UnsupportedLayoutCharacter(c)),
            };
            pieces.push(Piece::Field(field, run_len));
            rest = &rest[run_len..];
        } else {
            pieces.push(Piece::Literal(c));
            rest = &rest[c.len_utf8()..];
        }
    }

    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_match(layout: &DateLayout) -> Regex {
        Regex::new(&format!("^{}$", layout.pattern())).unwrap()
    }

    #[test]
    fn test_symbolic_layout_pattern() {
        let layout = DateLayout::parse("YYYY-MM-DD").unwrap();
        assert_eq!(layout.pattern().matches(DIGIT).count(), 8);

        let re = full_match(&layout);
        assert!(re.is_match("2099-01-01"));
        assert!(!re.is_match("2099/01/01"));
        assert!(!re.is_match("99-01-01"));
    }

    #[test]
    fn test_pattern_matches_shape_only() {
        let layout = DateLayout::parse("DD/MM/YYYY").unwrap();
        let re = full_match(&layout);

        assert!(re.is_match("30/04/1993"));
        assert!(re.is_match("99/04/1993"));
        assert!(!re.is_match("3/04/1993"));
        assert!(!re.is_match("30-04-1993"));
    }

    #[test]
    fn test_pattern_has_no_capture_groups() {
        let layout = DateLayout::parse("(YYYY).MM.DD").unwrap();
        let re = Regex::new(layout.pattern()).unwrap();
        assert_eq!(re.captures_len(), 1);
        assert!(re.is_match("(2024).01.31"));
    }

    #[test]
    fn test_reference_layout() {
        let layout = DateLayout::parse("02/01/2006").unwrap();
        assert_eq!(layout.parse_date("30/04/1993"), Some(date(1993, 4, 30)));

        let compact = DateLayout::parse("20060102").unwrap();
        assert_eq!(compact.parse_date("20220619"), Some(date(2022, 6, 19)));
    }

    #[test]
    fn test_unpadded_reference_fields() {
        let layout = DateLayout::parse("2006-1-2").unwrap();
        let re = full_match(&layout);

        assert!(re.is_match("2024-3-5"));
        assert!(!re.is_match("2024-03-05"));
        assert_eq!(layout.parse_date("2024-3-5"), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_missing_fields_default() {
        let layout = DateLayout::parse("2006-01").unwrap();
        assert_eq!(layout.parse_date("2024-07"), Some(date(2024, 7, 1)));
        assert_eq!(layout.parse_date("2024-13"), None);
    }

    #[test]
    fn test_other_digits_stand_for_themselves() {
        let layout = DateLayout::parse("2006-01-02/7").unwrap();
        assert!(full_match(&layout).is_match("2024-01-31/8"));

        assert_eq!(layout.parse_date("2024-01-31/7"), Some(date(2024, 1, 31)));
        assert_eq!(layout.parse_date("2024-01-31/8"), None);
    }

    #[test]
    fn test_short_year() {
        let layout = DateLayout::parse("DD.MM.YY").unwrap();
        assert_eq!(layout.parse_date("18.05.91"), Some(date(1991, 5, 18)));
        assert_eq!(layout.parse_date("01.01.69"), Some(date(1969, 1, 1)));
        assert_eq!(layout.parse_date("01.01.68"), Some(date(2068, 1, 1)));
    }

    #[test]
    fn test_parse_date_rejects_calendar_invalid() {
        let layout = DateLayout::parse("DD/MM/YYYY").unwrap();
        assert_eq!(layout.parse_date("99/04/1993"), None);
        assert_eq!(layout.parse_date("30/02/2024"), None);
        assert_eq!(layout.parse_date("29/02/2024"), Some(date(2024, 2, 29)));
        assert_eq!(layout.parse_date("29/02/2024 "), None);
    }

    #[test]
    fn test_repeated_field_must_agree() {
        let layout = DateLayout::parse("YYYY-MM-DD/DD").unwrap();
        assert_eq!(layout.parse_date("2024-01-31/31"), Some(date(2024, 1, 31)));
        assert_eq!(layout.parse_date("2024-01-31/30"), None);
    }

    #[test]
    fn test_percent_separator() {
        let layout = DateLayout::parse("YYYY%MM%DD").unwrap();
        assert_eq!(layout.parse_date("2024%01%31"), Some(date(2024, 1, 31)));
    }

    #[test]
    fn test_letters_are_rejected() {
        let err = DateLayout::parse("02/Jan/2006").unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedLayoutCharacter('J')));

        let err = DateLayout::parse("DD/Mon/YYYY").unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedLayoutCharacter('o')));

        let err = DateLayout::parse("dd/mm/yyyy").unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedLayoutCharacter('d')));

        let err = DateLayout::parse("YYY-MM-DD").unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedLayoutCharacter('Y')));
    }
}
