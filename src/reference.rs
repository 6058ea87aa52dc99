use crate::error::{RangeIssue, ReferenceError};
use crate::models::VerseId;

/// Upper bound on the verses a single range may expand to. The longest
/// chapter (Ps 119) has 176 verses.
pub const MAX_RANGE_SPAN: u32 = 1000;

/// Parses OSIS-style reference tokens (`Gen.1.1`, `Gen.1.1-Gen.1.3`) into
/// concrete verses.
pub struct ReferenceParser {
    range_separator: char,
    component_separator: char,
}

impl ReferenceParser {
    pub fn new() -> Self {
        ReferenceParser {
            range_separator: '-',
            component_separator: '.',
        }
    }

    /// Expands a token into its verses. A single reference yields one verse,
    /// a range yields every verse from start to end inclusive, ascending.
    pub fn parse(&self, raw: &str) -> Result<Vec<VerseId>, ReferenceError> {
        let mut sides = raw.split(self.range_separator);
        let start = sides.next().unwrap_or_default();
        let end = sides.next();

        if sides.next().is_some() {
            return Err(ReferenceError::malformed(
                raw,
                format!(
                    "expected at most one '{}', found {}",
                    self.range_separator,
                    raw.matches(self.range_separator).count()
                ),
            ));
        }

        let start = self.parse_single(start)?;
        match end {
            None => Ok(vec![start]),
            Some(end) => {
                let end = self.parse_single(end)?;
                self.expand_range(raw, start, end)
            }
        }
    }

    fn parse_single(&self, raw: &str) -> Result<VerseId, ReferenceError> {
        let components: Vec<&str> = raw.split(self.component_separator).collect();
        if components.len() != 3 {
            return Err(ReferenceError::malformed(
                raw,
                format!("expected 3 components, found {}", components.len()),
            ));
        }

        let book = components[0];
        if book.is_empty() {
            return Err(ReferenceError::malformed(raw, "book is empty"));
        }

        let chapter = Self::parse_number(raw, "chapter", components[1])?;
        let verse = Self::parse_number(raw, "verse", components[2])?;

        Ok(VerseId::new(book, chapter, verse))
    }

    fn parse_number(raw: &str, field: &str, value: &str) -> Result<u32, ReferenceError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReferenceError::malformed(
                raw,
                format!("{} '{}' is not a number", field, value),
            ));
        }
        value.parse::<u32>().map_err(|e| {
            ReferenceError::malformed(raw, format!("{} '{}' out of range: {}", field, value, e))
        })
    }

    fn expand_range(
        &self,
        raw: &str,
        start: VerseId,
        end: VerseId,
    ) -> Result<Vec<VerseId>, ReferenceError> {
        if start.book != end.book {
            return Err(ReferenceError::invalid_range(raw, RangeIssue::CrossBook));
        }
        if start.chapter != end.chapter {
            return Err(ReferenceError::invalid_range(raw, RangeIssue::CrossChapter));
        }
        if end.verse < start.verse {
            return Err(ReferenceError::invalid_range(raw, RangeIssue::Descending));
        }
        let span = u64::from(end.verse - start.verse) + 1;
        if span > u64::from(MAX_RANGE_SPAN) {
            return Err(ReferenceError::invalid_range(
                raw,
                RangeIssue::TooLong {
                    span,
                    max: MAX_RANGE_SPAN,
                },
            ));
        }

        Ok((start.verse..=end.verse)
            .map(|verse| VerseId::new(start.book.as_str(), start.chapter, verse))
            .collect())
    }
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gen(chapter: u32, verse: u32) -> VerseId {
        VerseId::new("Gen", chapter, verse)
    }

    #[test]
    fn test_parse_single_reference() {
        let parser = ReferenceParser::default();
        assert_eq!(parser.parse("Gen.1.1").unwrap(), vec![gen(1, 1)]);
        assert_eq!(
            parser.parse("1Cor.13.4").unwrap(),
            vec![VerseId::new("1Cor", 13, 4)]
        );
    }

    #[test]
    fn test_parse_range_is_inclusive_and_ascending() {
        let parser = ReferenceParser::default();
        assert_eq!(
            parser.parse("Gen.1.1-Gen.1.3").unwrap(),
            vec![gen(1, 1), gen(1, 2), gen(1, 3)]
        );
        assert_eq!(parser.parse("Gen.1.5-Gen.1.5").unwrap(), vec![gen(1, 5)]);
    }

    #[test]
    fn test_range_across_chapters_is_invalid() {
        let parser = ReferenceParser::default();
        assert_eq!(
            parser.parse("Gen.1.1-Gen.2.1").unwrap_err(),
            ReferenceError::invalid_range("Gen.1.1-Gen.2.1", RangeIssue::CrossChapter)
        );
    }

    #[test]
    fn test_range_across_books_is_invalid() {
        let parser = ReferenceParser::default();
        assert_eq!(
            parser.parse("Gen.1.1-Exo.1.1").unwrap_err(),
            ReferenceError::invalid_range("Gen.1.1-Exo.1.1", RangeIssue::CrossBook)
        );
    }

    #[test]
    fn test_descending_range_is_rejected() {
        let parser = ReferenceParser::default();
        assert_eq!(
            parser.parse("Gen.1.5-Gen.1.2").unwrap_err(),
            ReferenceError::invalid_range("Gen.1.5-Gen.1.2", RangeIssue::Descending)
        );
    }

    #[test]
    fn test_multiple_separators_are_malformed() {
        let parser = ReferenceParser::default();
        let err = parser.parse("Gen.1.1-Gen.1.2-Gen.1.3").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_malformed_references() {
        let parser = ReferenceParser::default();
        for raw in [
            "",
            "Gen",
            "Gen.1",
            "Gen.1.1.1",
            ".1.1",
            "Gen.one.1",
            "Gen.1.x",
            "Gen.1.+1",
            "Gen.1.-1",
            "Gen.1.1-",
            "-Gen.1.1",
            "Gen.99999999999.1",
        ] {
            let err = parser.parse(raw).unwrap_err();
            assert!(err.is_malformed(), "expected malformed for {:?}, got {:?}", raw, err);
        }
    }

    #[test]
    fn test_zero_chapter_and_verse_are_accepted() {
        let parser = ReferenceParser::default();
        assert_eq!(parser.parse("Gen.0.0").unwrap(), vec![gen(0, 0)]);
        assert_eq!(
            parser.parse("Gen.0.0-Gen.0.1").unwrap(),
            vec![gen(0, 0), gen(0, 1)]
        );
    }

    #[test]
    fn test_oversized_range_is_rejected() {
        let parser = ReferenceParser::default();
        assert_eq!(
            parser.parse("Gen.1.1-Gen.1.4000000000").unwrap_err(),
            ReferenceError::invalid_range(
                "Gen.1.1-Gen.1.4000000000",
                RangeIssue::TooLong {
                    span: 4_000_000_000,
                    max: MAX_RANGE_SPAN
                }
            )
        );

        let widest = format!("Ps.119.1-Ps.119.{}", MAX_RANGE_SPAN);
        assert_eq!(parser.parse(&widest).unwrap().len(), MAX_RANGE_SPAN as usize);

        let too_wide = format!("Ps.119.0-Ps.119.{}", MAX_RANGE_SPAN);
        assert!(matches!(
            parser.parse(&too_wide).unwrap_err(),
            ReferenceError::InvalidRange {
                issue: RangeIssue::TooLong { .. },
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn prop_range_expansion(chapter in 1u32..150, start in 1u32..180, len in 0u32..40) {
            let parser = ReferenceParser::default();
            let end = start + len;
            let raw = format!("Ps.{chapter}.{start}-Ps.{chapter}.{end}");
            let verses = parser.parse(&raw).unwrap();

            prop_assert_eq!(verses.len() as u32, len + 1);
            prop_assert_eq!(verses.first().map(|v| v.verse), Some(start));
            prop_assert_eq!(verses.last().map(|v| v.verse), Some(end));
            prop_assert!(verses.windows(2).all(|w| w[1].verse == w[0].verse + 1));
            prop_assert!(verses.iter().all(|v| v.book == "Ps" && v.chapter == chapter));
        }
    }
}
