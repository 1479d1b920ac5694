//! Flat `${name}` script templates.
//!
//! Substitution is strict: every placeholder must resolve to a set
//! parameter, otherwise nothing is rendered. `$$` produces a literal `$`;
//! any other `$` is copied through unchanged.

use tscore_model::ParameterSet;

use crate::error::TemplateError;

/// The bundled SQL*Plus script that computes counts and scores.
pub const TEMPORAL_SCORE_SQL: &str = include_str!("../assets/temporal_score.sql");

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed script template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    segments: Vec<Segment>,
}

impl ScriptTemplate {
    /// Parse template text.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;
        let mut offset = 0;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if after.starts_with('$') {
                literal.push('$');
                rest = &after[1..];
                offset += pos + 2;
            } else if let Some(body) = after.strip_prefix('{') {
                let name = body
                    .find('}')
                    .map(|end| &body[..end])
                    .filter(|name| is_identifier(name))
                    .ok_or_else(|| TemplateError::Malformed {
                        offset: offset + pos,
                        snippet: rest[pos..].chars().take(24).collect(),
                    })?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.to_string()));
                let consumed = pos + 2 + name.len() + 1;
                rest = &rest[consumed..];
                offset += consumed;
            } else {
                literal.push('$');
                rest = after;
                offset += pos + 1;
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// The bundled temporal score script.
    pub fn temporal_score() -> Self {
        Self::parse(TEMPORAL_SCORE_SQL).expect("bundled template is well-formed")
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }

    /// Placeholders with no resolved value in `params`.
    pub fn missing(&self, params: &ParameterSet) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|name| params.is_unset(name))
            .map(str::to_string)
            .collect()
    }

    /// Substitute every placeholder from `params`.
    pub fn render(&self, params: &ParameterSet) -> Result<String, TemplateError> {
        let missing = self.missing(params);
        if !missing.is_empty() {
            return Err(TemplateError::MissingParameters { names: missing });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    // Checked above.
                    if let Some(value) = params.text(name) {
                        out.push_str(&value);
                    }
                }
            }
        }
        Ok(out)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
