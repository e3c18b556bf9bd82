//! Typed representation of a derived-field formula.
//!
//! A formula goes through two stages. The raw text is first compiled into a
//! [`Template`]: literal text interleaved with references to parent fields.
//! Rendering the template against the current values yields plain text, which
//! is then parsed into an [`Expression`]: either a builtin call or the text
//! itself.

use std::fmt;

use crate::schema::types::{FieldId, SubmissionData};

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    /// Occurrence of a parent field's token, replaced by its current value.
    FieldRef { field_id: FieldId, token: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Literal(text.into())],
        }
    }

    /// Substitutes each field reference with the stringified current value,
    /// or the empty string when the field has none.
    pub fn render(&self, values: &SubmissionData) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::FieldRef { field_id, .. } => {
                    // Falsy values (false, 0, "", empty list) render as nothing.
                    if let Some(value) = values.get(field_id).filter(|v| !v.is_empty()) {
                        out.push_str(&value.to_text());
                    }
                }
            }
        }
        out
    }

    /// Ids of the fields referenced at least once, in first-use order.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::FieldRef { field_id, .. } = segment {
                if !ids.contains(&field_id.as_str()) {
                    ids.push(field_id);
                }
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sum,
    Concat,
    Age,
}

impl Builtin {
    /// Builtin names are matched case-sensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SUM" => Some(Builtin::Sum),
            "CONCAT" => Some(Builtin::Concat),
            "AGE" => Some(Builtin::Age),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Sum => "SUM",
            Builtin::Concat => "CONCAT",
            Builtin::Age => "AGE",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `NAME(arg, arg, ...)` spanning the whole text. Arguments are the raw
    /// text between commas; `source` is the full text for fall-through.
    Call {
        function: Builtin,
        args: Vec<String>,
        source: String,
    },
    /// Anything that is not a recognised call evaluates to itself.
    Literal(String),
}

impl Expression {
    pub fn source(&self) -> &str {
        match self {
            Expression::Call { source, .. } => source,
            Expression::Literal(text) => text,
        }
    }
}
