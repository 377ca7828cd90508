//! Template engine integration.
//!
//! The renderer is exposed to templates as a single directive:
//!
//! ```text
//! {{ rimage(src, alt, widths, classes="", url="", target=<default>) }}
//! ```
//!
//! Arguments are positional, matching the blog's existing content. `widths`
//! may be a list or a single integer. An omitted, undefined or `none` alt is
//! missing; `""` is an intentionally empty alt.

pub mod minijinja;

/// Name the directive is registered under.
pub const DIRECTIVE: &str = "rimage";

/// Parses a directive's width argument.
///
/// Engine-specific glue extracts integers; this checks their range so every
/// engine reports malformed lists the same way.
pub(crate) fn widths_from_ints<I>(values: I) -> Result<Vec<u32>, String>
    where I: IntoIterator<Item = Option<i64>>
{
    values.into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Some(w) if w > 0 && w <= u32::MAX as i64 => Ok(w as u32),
            Some(w) => Err(format!("width #{} ({w}) is not a positive pixel count", i + 1)),
            None => Err(format!("width #{} is not an integer", i + 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ranges() {
        assert_eq!(widths_from_ints([Some(480), Some(768)]), Ok(vec![480, 768]));
        assert_eq!(
            widths_from_ints([Some(480), Some(-1)]),
            Err("width #2 (-1) is not a positive pixel count".to_string())
        );
        assert_eq!(widths_from_ints([None]), Err("width #1 is not an integer".to_string()));
        assert!(widths_from_ints([Some(1 << 40)]).is_err());
    }
}
