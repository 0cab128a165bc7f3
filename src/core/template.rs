//! Runtime message templates
//!
//! Templates use `{N}` for a positional argument and `{}` for the next
//! implicit one; `{{` and `}}` produce literal braces. Unlike `format!`,
//! the argument list is only known at run time, so expansion can fail and
//! callers fall back to the raw template.

use super::error::{LoggerError, Result};
use std::fmt::{Display, Write};

/// Expand `template` with `args`.
///
/// An empty argument slice returns the template verbatim without parsing
/// it, so messages that merely contain braces need no escaping.
///
/// ```
/// use rust_log_spooler::format_template;
///
/// let text = format_template("{1} of {0}", &[&5, &"step"]).unwrap();
/// assert_eq!(text, "step of 5");
/// assert!(format_template("{2}", &[&1]).is_err());
/// ```
pub fn format_template(template: &str, args: &[&dyn Display]) -> Result<String> {
    if args.is_empty() {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut chars = template.char_indices().peekable();
    let mut next_implicit = 0usize;

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut spec = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    spec.push(c);
                }
                if !closed {
                    return Err(LoggerError::template(template, offset, "unclosed placeholder"));
                }

                let spec = spec.trim();
                let index = if spec.is_empty() {
                    let index = next_implicit;
                    next_implicit += 1;
                    index
                } else {
                    spec.parse::<usize>().map_err(|_| {
                        LoggerError::template(
                            template,
                            offset,
                            format!("placeholder '{{{}}}' is not an argument index", spec),
                        )
                    })?
                };

                let arg = args.get(index).ok_or_else(|| {
                    LoggerError::template(
                        template,
                        offset,
                        format!("argument index {} out of range ({} given)", index, args.len()),
                    )
                })?;
                write!(out, "{}", arg).map_err(|_| {
                    LoggerError::template(template, offset, "argument failed to format")
                })?;
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(LoggerError::template(template, offset, "unmatched '}'"));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_implicit() {
        assert_eq!(format_template("{0}-{1}-{0}", &[&"a", &"b"]).unwrap(), "a-b-a");
        assert_eq!(format_template("{} and {}", &[&1, &2.5]).unwrap(), "1 and 2.5");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(format_template("{{{0}}}", &[&7]).unwrap(), "{7}");
    }

    #[test]
    fn test_no_args_returns_raw_template() {
        assert_eq!(format_template("map {a: 1}", &[]).unwrap(), "map {a: 1}");
    }

    #[test]
    fn test_errors() {
        let err = format_template("value {3}", &[&1]).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = format_template("value {0", &[&1]).unwrap_err();
        assert!(err.to_string().contains("unclosed"));

        let err = format_template("value {x}", &[&1]).unwrap_err();
        assert!(err.to_string().contains("not an argument index"));

        let err = format_template("value }", &[&1]).unwrap_err();
        assert!(err.to_string().contains("unmatched"));
    }
}
