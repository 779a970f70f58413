//! Heading-level directive evaluation.
//!
//! Header blocks steer the document outline through two payload directives:
//! `heading-reset` (absolute) and `heading-level` (relative). The live render
//! path and the table-of-contents flattener both consume [`evaluate`], so the
//! outline a TOC advertises can never drift from the levels the headers
//! actually render at.

use serde_json::Value;

use crate::node::{JsonMap, int_value};

/// Outcome of evaluating one header's directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// The level this header renders at.
    pub level: i64,
    /// Whether `heading-reset` was present. An explicit reset suppresses the
    /// usual one-deeper bump applied to content following the header.
    pub explicit_reset: bool,
}

/// Running accumulators shared by the render context and the TOC walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingState {
    pub level: i64,
    pub count: u64,
}

impl HeadingState {
    /// Evaluate a header's directives against this state and advance it:
    /// count the heading, carry the evaluated level forward, and nest
    /// subsequent content one deeper unless the header explicitly reset.
    pub fn advance(&mut self, content: &JsonMap) -> Evaluation {
        let eval = evaluate(self.level, self.count, content);
        self.count += 1;
        self.level = eval.level;
        if !eval.explicit_reset {
            self.level += 1;
        }
        eval
    }

    /// The default level for a heading given how many have been seen: the
    /// very first heading is the document's only H1, everything later lands
    /// at 2 unless directives say otherwise.
    pub fn default_level(count: u64) -> i64 {
        if count == 0 { 1 } else { 2 }
    }
}

/// Evaluate `heading-reset` / `heading-level` for one header payload.
///
/// `heading-reset` wins when both are present. A literal reset of 1 or more
/// is applied verbatim (so `heading-reset: 1` forces an H1 every time it
/// appears); 0 means "first heading gets 1, later ones 2"; a negative value
/// is subtracted from the current level and then floored. Without a reset, a
/// `heading-level` adjustment (`+`/`inc`/`increment`, `-`/`dec`/`decrement`,
/// or a signed integer) shifts the current level and is floored the same
/// way. A header with neither directive takes the count-dependent default.
pub fn evaluate(level: i64, count: u64, content: &JsonMap) -> Evaluation {
    if let Some(reset) = content.get("heading-reset").and_then(int_value) {
        let level = if reset >= 1 {
            reset
        } else if reset == 0 {
            HeadingState::default_level(count)
        } else {
            floor(level + reset, count)
        };
        return Evaluation {
            level,
            explicit_reset: true,
        };
    }

    if let Some(adjust) = content.get("heading-level").and_then(parse_adjustment) {
        return Evaluation {
            level: floor(level + adjust, count),
            explicit_reset: false,
        };
    }

    Evaluation {
        level: HeadingState::default_level(count),
        explicit_reset: false,
    }
}

/// Runaway de-indentation must not mint a second H1: anything at or below 1
/// collapses to the count-dependent default.
fn floor(level: i64, count: u64) -> i64 {
    if level <= 1 {
        HeadingState::default_level(count)
    } else {
        level
    }
}

fn parse_adjustment(value: &Value) -> Option<i64> {
    if let Some(word) = value.as_str() {
        match word.trim() {
            "+" | "inc" | "increment" => return Some(1),
            "-" | "dec" | "decrement" => return Some(-1),
            _ => {}
        }
    }
    int_value(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn content(value: serde_json::Value) -> JsonMap {
        value.as_object().expect("object").clone()
    }

    #[test]
    fn plain_headers_render_one_then_twos() {
        let mut state = HeadingState::default();
        let empty = JsonMap::new();
        let levels: Vec<i64> = (0..4).map(|_| state.advance(&empty).level).collect();
        assert_eq!(levels, vec![1, 2, 2, 2]);
    }

    #[test]
    fn reset_one_forces_h1_idempotently() {
        let mut state = HeadingState::default();
        let reset = content(json!({"heading-reset": 1}));
        assert_eq!(state.advance(&reset).level, 1);
        assert_eq!(state.advance(&JsonMap::new()).level, 2);
        assert_eq!(state.advance(&reset).level, 1);
    }

    #[test]
    fn reset_zero_is_conditional_on_count() {
        let first = evaluate(5, 0, &content(json!({"heading-reset": 0})));
        assert_eq!(first.level, 1);
        assert!(first.explicit_reset);
        let later = evaluate(5, 3, &content(json!({"heading-reset": 0})));
        assert_eq!(later.level, 2);
    }

    #[test]
    fn positive_reset_is_literal() {
        let eval = evaluate(2, 4, &content(json!({"heading-reset": 4})));
        assert_eq!(eval.level, 4);
        assert!(eval.explicit_reset);
    }

    #[test]
    fn negative_reset_subtracts_then_floors() {
        let eval = evaluate(4, 2, &content(json!({"heading-reset": -1})));
        assert_eq!(eval.level, 3);
        let floored = evaluate(4, 2, &content(json!({"heading-reset": -5})));
        assert_eq!(floored.level, 2);
    }

    #[test]
    fn relative_adjustments_accept_words_and_integers() {
        let base = content(json!({"heading-level": "+"}));
        assert_eq!(evaluate(2, 1, &base).level, 3);
        let dec = content(json!({"heading-level": "decrement"}));
        assert_eq!(evaluate(4, 1, &dec).level, 3);
        let literal = content(json!({"heading-level": 2}));
        assert_eq!(evaluate(2, 1, &literal).level, 4);
        let negative = content(json!({"heading-level": -3}));
        assert_eq!(evaluate(3, 1, &negative).level, 2);
    }

    #[test]
    fn reset_takes_precedence_over_adjustment() {
        let both = content(json!({"heading-reset": 3, "heading-level": "+"}));
        let eval = evaluate(1, 1, &both);
        assert_eq!(eval.level, 3);
        assert!(eval.explicit_reset);
    }

    #[test]
    fn explicit_reset_suppresses_the_nesting_bump() {
        let mut state = HeadingState::default();
        state.advance(&content(json!({"heading-reset": 3})));
        assert_eq!(state.level, 3);
        state.advance(&JsonMap::new());
        assert_eq!(state.level, 3);
    }
}
