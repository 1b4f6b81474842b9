use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;

use crate::structs::timestamp::Timestamp;
use crate::structs::timing::Timing;
use crate::utils::errors::ParseError;

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2},\d{3})(?:\s.*)?$")
        .expect("timing line pattern is valid")
});

static TIMESTAMP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,}:\d{2}:\d{2},\d").expect("prefix pattern is valid"));

const UTF8_BOM: char = '\u{feff}';

/// Classification of a single subtitle line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Timing(Timestamp, Timestamp),
    Other,
}

impl Line {
    /// Classifies one line body (without its terminator).
    ///
    /// `line_no` is 1-based and only used for error reporting. A line that
    /// starts with an SRT timestamp (`HH:MM:SS,m`) but is not a well-formed
    /// timing line is an error rather than caption text. Other times, such
    /// as `00:00:05.5`, are ordinary caption text.
    pub fn classify(line_no: usize, body: &str) -> Result<Self, ParseError> {
        let trimmed = body.trim().trim_start_matches(UTF8_BOM);

        let Some(captures) = TIMING_LINE.captures(trimmed) else {
            if TIMESTAMP_PREFIX.is_match(trimmed) {
                return Err(ParseError::MalformedTiming {
                    line: line_no,
                    content: trimmed.to_string(),
                });
            }
            return Ok(Line::Other);
        };

        let out_of_range = |_| ParseError::TimestampOutOfRange {
            line: line_no,
            content: trimmed.to_string(),
        };
        let start = captures[1].parse().map_err(out_of_range)?;
        let end = captures[2].parse().map_err(out_of_range)?;

        Ok(Line::Timing(start, end))
    }
}

/// Splits a line produced by `split_inclusive('\n')` into its body and its
/// terminator (`""`, `"\n"` or `"\r\n"`).
pub(crate) fn split_terminator(line: &str) -> (&str, &str) {
    let body_len = line
        .strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .map_or(line.len(), str::len);

    line.split_at(body_len)
}

/// Parses SubRip text into its timing endpoints.
///
/// Every timing line contributes a START and an END endpoint, in file order.
///
/// ```
/// use substeg::process::parse::parse;
///
/// let timing = parse("1\n00:00:01,000 --> 00:00:02,501\nHello\n\n")?;
/// assert_eq!(timing.len(), 2);
/// assert_eq!(timing.pointers(), [0, 1]);
/// # Ok::<(), substeg::utils::errors::ParseError>(())
/// ```
pub fn parse(text: &str) -> Result<Timing, ParseError> {
    let mut pairs = Vec::new();

    for (line_no, line) in text.split_inclusive('\n').enumerate() {
        let (body, _) = split_terminator(line);
        if let Line::Timing(start, end) = Line::classify(line_no + 1, body)? {
            trace!("Timing line {}: {start} --> {end}", line_no + 1);
            pairs.push((start, end));
        }
    }

    if pairs.is_empty() {
        return Err(ParseError::NoTimingLines);
    }

    let timing = Timing::from_pairs(pairs);
    debug!("Parsed {} timing endpoints", timing.len());

    Ok(timing)
}

/// Validates raw subtitle bytes as UTF-8 and drops a leading byte-order mark.
pub fn decode_text(data: &[u8]) -> Result<&str, ParseError> {
    let text = std::str::from_utf8(data).map_err(|e| ParseError::InvalidUtf8(e.valid_up_to()))?;
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text))
}

#[test]
fn parse_example() -> anyhow::Result<()> {
    use crate::process::EXAMPLE_SRT;

    let timing = parse(EXAMPLE_SRT)?;
    assert_eq!(timing.len(), 32);
    assert_eq!(timing.endpoints()[0].time.to_string(), "00:00:01,000");
    assert_eq!(timing.endpoints()[1].time.to_string(), "00:00:03,517");
    assert_eq!(timing.pointers()[..4], [0, 1, 0, 1]);
    Ok(())
}

#[test]
fn classify_lines() {
    assert_eq!(Line::classify(1, "1"), Ok(Line::Other));
    assert_eq!(Line::classify(1, ""), Ok(Line::Other));
    assert_eq!(Line::classify(1, "At 12:30, we leave."), Ok(Line::Other));
    assert_eq!(
        Line::classify(3, "00:00:05.5 left on the clock"),
        Ok(Line::Other)
    );
    assert_eq!(
        Line::classify(1, "  00:00:01,000 --> 00:00:02,002 X1:10 X2:20  "),
        Ok(Line::Timing(
            Timestamp::from_millis(1_000),
            Timestamp::from_millis(2_002)
        ))
    );
    assert_eq!(
        Line::classify(1, "00:00:01,000-->00:00:02,002"),
        Ok(Line::Timing(
            Timestamp::from_millis(1_000),
            Timestamp::from_millis(2_002)
        ))
    );
}

#[test]
fn malformed_timing_is_an_error() {
    assert!(matches!(
        parse("1\n00:00:01,000 -> 00:00:02,000\nHi\n"),
        Err(ParseError::MalformedTiming { line: 2, .. })
    ));
    assert!(matches!(
        parse("1\n00:00:01,000 --> soon\nHi\n"),
        Err(ParseError::MalformedTiming { line: 2, .. })
    ));
    assert!(matches!(
        parse("1\n00:61:01,000 --> 00:61:02,000\nHi\n"),
        Err(ParseError::TimestampOutOfRange { line: 2, .. })
    ));
}

#[test]
fn dotted_times_are_caption_text() -> anyhow::Result<()> {
    let timing = parse("1\n00:00:01,000 --> 00:00:02,000\n00:00:05.5 left on the clock\n\n")?;
    assert_eq!(timing.len(), 2);
    assert_eq!(
        parse("1\n00:00:01.000 --> 00:00:02.000\nHi\n"),
        Err(ParseError::NoTimingLines)
    );
    Ok(())
}

#[test]
fn no_timing_lines() {
    assert_eq!(parse(""), Err(ParseError::NoTimingLines));
    assert_eq!(parse("just some text\n\n"), Err(ParseError::NoTimingLines));
}

#[test]
fn crlf_and_bom() -> anyhow::Result<()> {
    let data = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,003\r\nHi\r\n\r\n".as_bytes();
    let timing = parse(decode_text(data)?)?;
    assert_eq!(timing.pointers(), [0, 1]);

    assert_eq!(decode_text(&[b'a', 0xFF]), Err(ParseError::InvalidUtf8(1)));
    assert_eq!(split_terminator("abc\r\n"), ("abc", "\r\n"));
    assert_eq!(split_terminator("abc\n"), ("abc", "\n"));
    assert_eq!(split_terminator("abc"), ("abc", ""));
    Ok(())
}
