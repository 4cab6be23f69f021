//! Placement of phrase words around the screen centre
//!
//! Positions are text baselines, like every `Text` drawn on the display.

use core::fmt;

use embedded_graphics::geometry::Point;
use heapless::{String, Vec};

use crate::phrase::{PhraseToken, Role};

/// Longest line: "zwanzig nach" plus headroom for the widest words
pub const LINE_LEN: usize = 24;

/// A phrase never needs more than three draw calls
pub const MAX_SPANS: usize = 3;

/// One draw call of the phrase
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String<LINE_LEN>,
    pub position: Point,
    pub role: Role,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Phrases are two to four words long
    UnsupportedLength(usize),
    /// A line does not fit into `LINE_LEN` bytes
    LineTooLong,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::UnsupportedLength(n) => write!(f, "cannot lay out {} words", n),
            LayoutError::LineTooLong => f.write_str("phrase line too long"),
        }
    }
}

/// Lay out a 2-4 word phrase around `center`.
///
/// * 2 words share one line, the hour name in hour colour.
/// * 3 words: the first two on the upper line, the hour name below.
/// * 4 words: two per line, the last one in hour colour.
///
/// A word following another on the same line carries its own leading space
/// and starts where the previous word's width ends.
pub fn layout(
    tokens: &[PhraseToken],
    center: Point,
    line_height: i32,
    measure: impl Fn(&str) -> i32,
) -> Result<Vec<Span, MAX_SPANS>, LayoutError> {
    let mut spans = Vec::new();
    let upper = center.y - line_height / 2;
    let lower = center.y + line_height;

    match tokens {
        [first, second] => {
            let y = center.y + line_height / 2;
            let (left, right) = split_line(first, second, center.x, y, &measure)?;
            // Whichever word is not the hour name gets the filler colour
            push(&mut spans, left)?;
            push(&mut spans, right)?;
        }
        [first, second, hour] => {
            let text = joined(first.text, second.text)?;
            let x = center.x - measure(text.as_str()) / 2;
            push(&mut spans, span(text, Point::new(x, upper), Role::FillerWord))?;

            let text = line(hour.text)?;
            let x = center.x - measure(text.as_str()) / 2;
            push(&mut spans, span(text, Point::new(x, lower), Role::HourWord))?;
        }
        [first, second, third, hour] => {
            let text = joined(first.text, second.text)?;
            let x = center.x - measure(text.as_str()) / 2;
            push(&mut spans, span(text, Point::new(x, upper), Role::FillerWord))?;

            let (left, right) = split_line(third, hour, center.x, lower, &measure)?;
            push(&mut spans, span(left.text, left.position, Role::FillerWord))?;
            push(&mut spans, span(right.text, right.position, Role::HourWord))?;
        }
        _ => return Err(LayoutError::UnsupportedLength(tokens.len())),
    }

    Ok(spans)
}

/// Two words on one centred line, each keeping its own role.
fn split_line(
    first: &PhraseToken,
    second: &PhraseToken,
    center_x: i32,
    y: i32,
    measure: &impl Fn(&str) -> i32,
) -> Result<(Span, Span), LayoutError> {
    let width = measure(joined(first.text, second.text)?.as_str());
    let x = center_x - width / 2;
    let padding = measure(first.text);

    let left = span(line(first.text)?, Point::new(x, y), first.role);
    let right = span(
        leading_space(second.text)?,
        Point::new(x + padding, y),
        second.role,
    );
    Ok((left, right))
}

fn span(text: String<LINE_LEN>, position: Point, role: Role) -> Span {
    Span {
        text,
        position,
        role,
    }
}

fn push(spans: &mut Vec<Span, MAX_SPANS>, span: Span) -> Result<(), LayoutError> {
    spans.push(span).map_err(|_| LayoutError::LineTooLong)
}

fn line(word: &str) -> Result<String<LINE_LEN>, LayoutError> {
    String::try_from(word).map_err(|_| LayoutError::LineTooLong)
}

fn leading_space(word: &str) -> Result<String<LINE_LEN>, LayoutError> {
    let mut text = line(" ")?;
    text.push_str(word).map_err(|_| LayoutError::LineTooLong)?;
    Ok(text)
}

/// `first + " " + second`
fn joined(first: &str, second: &str) -> Result<String<LINE_LEN>, LayoutError> {
    let mut text = line(first)?;
    text.push(' ').map_err(|_| LayoutError::LineTooLong)?;
    text.push_str(second).map_err(|_| LayoutError::LineTooLong)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrase::phrase_for;

    const CENTER: Point = Point::new(120, 120);

    fn owned(text: &str) -> std::string::String {
        text.into()
    }

    fn width(text: &str) -> i32 {
        text.chars().count() as i32 * 10
    }

    fn laid_out(hour: u32, minute: u32) -> std::vec::Vec<(std::string::String, Point, Role)> {
        layout(phrase_for(hour, minute).tokens(), CENTER, 20, width)
            .unwrap()
            .into_iter()
            .map(|span| (span.text.as_str().into(), span.position, span.role))
            .collect()
    }

    #[test]
    fn on_the_hour_single_line() {
        // "zwölf uhr" is 9 characters wide
        assert_eq!(
            laid_out(12, 0),
            [
                (owned("zwölf"), Point::new(75, 130), Role::HourWord),
                (owned(" uhr"), Point::new(125, 130), Role::FillerWord),
            ]
        );
    }

    #[test]
    fn half_hour_colours_the_second_word() {
        // "halb elf" is 8 characters wide
        assert_eq!(
            laid_out(10, 30),
            [
                (owned("halb"), Point::new(80, 130), Role::FillerWord),
                (owned(" elf"), Point::new(120, 130), Role::HourWord),
            ]
        );
    }

    #[test]
    fn three_words_on_two_lines() {
        assert_eq!(
            laid_out(10, 5),
            [
                (owned("fünf nach"), Point::new(75, 110), Role::FillerWord),
                (owned("zehn"), Point::new(100, 140), Role::HourWord),
            ]
        );
    }

    #[test]
    fn four_words_split_the_lower_line() {
        assert_eq!(
            laid_out(10, 25),
            [
                (owned("kurz vor"), Point::new(80, 110), Role::FillerWord),
                (owned("halb"), Point::new(80, 140), Role::FillerWord),
                (owned(" elf"), Point::new(120, 140), Role::HourWord),
            ]
        );
    }

    #[test]
    fn every_minute_lays_out() {
        for minute in 0..60 {
            let spans = layout(phrase_for(7, minute).tokens(), CENTER, 20, width).unwrap();
            assert!((2..=3).contains(&spans.len()));
            assert_eq!(
                spans.iter().filter(|s| s.role == Role::HourWord).count(),
                1
            );
        }
    }

    #[test]
    fn other_lengths_are_rejected() {
        let phrase = phrase_for(1, 0);
        let token = phrase.tokens()[0];
        assert_eq!(
            layout(&[token], CENTER, 20, width),
            Err(LayoutError::UnsupportedLength(1))
        );
        assert_eq!(
            layout(&[token; 5], CENTER, 20, width),
            Err(LayoutError::UnsupportedLength(5))
        );
        assert_eq!(
            layout(&[], CENTER, 20, width),
            Err(LayoutError::UnsupportedLength(0))
        );
    }
}
