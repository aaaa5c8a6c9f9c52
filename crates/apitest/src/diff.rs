//! Failure rendering: the matcher error followed by a line-oriented unified
//! diff of the pretty-printed pattern (`-`) against the actual document
//! (`+`), with three lines of context per hunk.

use similar::{ChangeTag, TextDiff};
use std::io::Write;
use termcolor::{Color, ColorSpec, WriteColor};

/// Render a plain-text failure message suitable for a panic or error value.
pub fn render(expected: &str, actual: &str, error: &str) -> String {
    let mut out = String::new();
    out.push_str(error);
    out.push('\n');
    out.push('\n');

    let diff = TextDiff::from_lines(expected, actual);
    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            out.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                out.push_str(sign);
                out.push_str(change.value());
                if change.missing_newline() {
                    out.push('\n');
                }
            }
        }
    }
    out
}

/// Write the same failure shape with colors: red for expected-only lines,
/// green for actual-only lines.
pub fn write_colored(
    w: &mut dyn WriteColor,
    expected: &str,
    actual: &str,
    error: &str,
) -> std::io::Result<()> {
    writeln!(w, "{}", error)?;
    writeln!(w)?;

    let diff = TextDiff::from_lines(expected, actual);
    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            writeln!(w, "...")?;
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("-", Some(Color::Red)),
                    ChangeTag::Insert => ("+", Some(Color::Green)),
                    ChangeTag::Equal => (" ", None),
                };
                w.set_color(ColorSpec::new().set_fg(color))?;
                write!(w, "{}{}", sign, change.value())?;
                w.reset()?;
                if change.missing_newline() {
                    writeln!(w)?;
                }
            }
        }
    }
    Ok(())
}
