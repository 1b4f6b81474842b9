use log::debug;

use crate::process::parse::{Line, split_terminator};
use crate::structs::timing::Timing;
use crate::utils::errors::RewriteError;

/// Rewrites `source` with the endpoint times of `timing`.
///
/// Timing lines are replaced in file order, consuming two endpoints each.
/// All other lines, including their terminators, are copied unchanged.
///
/// ```
/// use substeg::process::{parse::parse, rewrite::rewrite};
///
/// let srt = "1\r\n00:00:01,000 --> 00:00:02,000 X1:10\r\nHi\r\n";
/// let timing = parse(srt)?;
/// assert_eq!(rewrite(srt, &timing)?, "1\r\n00:00:01,000 --> 00:00:02,000\r\nHi\r\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn rewrite(source: &str, timing: &Timing) -> Result<String, RewriteError> {
    let endpoints = timing.endpoints();
    let mut out = String::with_capacity(source.len());
    let mut next = 0;

    for (line_no, line) in source.split_inclusive('\n').enumerate() {
        let (body, terminator) = split_terminator(line);

        match Line::classify(line_no + 1, body)? {
            Line::Timing(..) => {
                let (Some(start), Some(end)) = (endpoints.get(next), endpoints.get(next + 1))
                else {
                    return Err(RewriteError::EndpointsExhausted {
                        line: line_no + 1,
                        available: endpoints.len(),
                    });
                };
                out.push_str(&format!("{} --> {}", start.time, end.time));
                out.push_str(terminator);
                next += 2;
            }
            Line::Other => out.push_str(line),
        }
    }

    if next != endpoints.len() {
        return Err(RewriteError::EndpointsLeftOver {
            unused: endpoints.len() - next,
        });
    }

    debug!("Rewrote {} timing lines", next / 2);

    Ok(out)
}

#[test]
fn identity_rewrite() -> anyhow::Result<()> {
    use crate::process::{EXAMPLE_SRT, parse::parse};

    let timing = parse(EXAMPLE_SRT)?;
    assert_eq!(rewrite(EXAMPLE_SRT, &timing)?, EXAMPLE_SRT);
    Ok(())
}

#[test]
fn dotted_time_caption_passes_through() -> anyhow::Result<()> {
    use crate::process::parse::parse;

    let srt = "1\n00:00:01,000 --> 00:00:02,000\n00:00:05.5 left on the clock\n\n";
    assert_eq!(rewrite(srt, &parse(srt)?)?, srt);
    Ok(())
}

#[test]
fn replaces_only_timing_lines() -> anyhow::Result<()> {
    use crate::process::parse::parse;
    use crate::structs::timestamp::Timestamp;

    let srt = "1\n00:00:01,000 --> 00:00:02,000\n  indented caption\n\n2\n00:00:03,000 --> 00:00:04,000\nlast";
    let edited = Timing::from_times([1_001, 1_999, 3_000, 3_999].map(Timestamp::from_millis));

    assert_eq!(parse(srt)?.len(), 4);
    assert_eq!(
        rewrite(srt, &edited)?,
        "1\n00:00:01,001 --> 00:00:01,999\n  indented caption\n\n2\n00:00:03,000 --> 00:00:03,999\nlast"
    );
    Ok(())
}

#[test]
fn endpoint_count_must_match() {
    use crate::structs::timestamp::Timestamp;

    let srt = "1\n00:00:01,000 --> 00:00:02,000\nHi\n";
    let short = Timing::default();
    let long = Timing::from_times([1, 2, 3, 4].map(Timestamp::from_millis));

    assert_eq!(
        rewrite(srt, &short),
        Err(RewriteError::EndpointsExhausted {
            line: 2,
            available: 0
        })
    );
    assert_eq!(
        rewrite(srt, &long),
        Err(RewriteError::EndpointsLeftOver { unused: 2 })
    );
}
