//! Terminal rendering of query results

use crate::index::build::VerifyReport;
use roaring::RoaringBitmap;
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Stdout stream honoring the `--color` flag
pub fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Write one line per matching id, as `id:key` when the dictionary lines are
/// available, with the first occurrence of `word` highlighted
pub fn write_search_hits<W: WriteColor>(
    out: &mut W,
    word: &str,
    ids: &RoaringBitmap,
    keys: Option<&[String]>,
    limit: Option<usize>,
) -> io::Result<()> {
    let limit = limit.unwrap_or(usize::MAX);
    for id in ids.iter().take(limit) {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{id}")?;
        out.reset()?;

        match keys.and_then(|k| k.get(id as usize)) {
            Some(key) => {
                write!(out, ":")?;
                write_highlighted(out, key, word)?;
            }
            None => writeln!(out)?,
        }
    }

    let total = ids.len() as usize;
    if total > limit {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, "... and {} more", total - limit)?;
        out.reset()?;
    }
    Ok(())
}

/// `line` with the first occurrence of `word` in bold red
fn write_highlighted<W: WriteColor>(out: &mut W, line: &str, word: &str) -> io::Result<()> {
    let Some(start) = line.find(word).filter(|_| !word.is_empty()) else {
        return writeln!(out, "{line}");
    };
    let end = start + word.len();
    write!(out, "{}", &line[..start])?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "{}", &line[start..end])?;
    out.reset()?;
    writeln!(out, "{}", &line[end..])
}

/// Write `word` with its matched prefix highlighted and the unmatched rest
/// dimmed
pub fn write_match<W: WriteColor>(out: &mut W, word: &str, matched: &str) -> io::Result<()> {
    let rest = word.strip_prefix(matched).unwrap_or(word);
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "{matched}")?;
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(out, "{rest}")?;
    out.reset()?;
    writeln!(out, " ({}/{} chars)", matched.chars().count(), word.chars().count())
}

/// Summarize a verification run
pub fn write_verify_report<W: WriteColor>(out: &mut W, report: &VerifyReport) -> io::Result<()> {
    for failure in &report.failures {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{}", failure.id)?;
        out.reset()?;
        write!(out, ":")?;
        write_match(out, &failure.key, &failure.matched)?;
        if !failure.found_id {
            writeln!(out, "  id {} missing from search results", failure.id)?;
        }
    }

    let (color, verdict) = if report.is_ok() {
        (Color::Green, "ok")
    } else {
        (Color::Red, "FAILED")
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{verdict}")?;
    out.reset()?;
    writeln!(
        out,
        ": {} keys checked, {} failures",
        report.checked,
        report.failures.len()
    )
}
