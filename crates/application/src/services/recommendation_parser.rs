//! Recommendation parser - turns model prose into horizon-tagged suggestions
//!
//! Accepts the section layout requested by the prompt as well as the usual
//! markdown variations models produce (`## Short-term`, `**Long-term:**`,
//! `1. Medium-term strategies`). Plain lines only open a section when their
//! label is exactly a section name, so prose that merely starts with "Risk" or
//! "Immediate" never moves items between sections. Text that yields no
//! horizon-tagged suggestion is rejected rather than guessed at.

use domain::{Horizon, Recommendation, Suggestion};
use thiserror::Error;

/// Longest markdown heading label, in words, that is still treated as a heading
const MAX_HEADING_WORDS: usize = 6;

/// Section names, longest first within each family
const SECTION_PHRASES: &[(&str, Section)] = &[
    ("short term", Section::Horizon(Horizon::ShortTerm)),
    ("immediate", Section::Horizon(Horizon::ShortTerm)),
    ("medium term", Section::Horizon(Horizon::MediumTerm)),
    ("mid term", Section::Horizon(Horizon::MediumTerm)),
    ("long term", Section::Horizon(Horizon::LongTerm)),
    ("risk mitigation", Section::RiskMitigation),
    ("risk management", Section::RiskMitigation),
    ("risks", Section::RiskMitigation),
    ("risk", Section::RiskMitigation),
];

/// Words allowed after a section name in a plain heading ("Short-term actions:")
const HEADING_QUALIFIERS: &[&str] = &[
    "actions",
    "adaptation",
    "adjustments",
    "measures",
    "operational",
    "plan",
    "recommendations",
    "steps",
    "strategies",
];

/// Why a model response could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The response had no visible text
    #[error("response was empty")]
    Empty,
    /// No section produced a suggestion
    #[error("response contained no horizon-tagged suggestions")]
    NoSuggestions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Horizon(Horizon),
    RiskMitigation,
    Other,
}

/// List marker in front of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    None,
    Dash,
    Enumerated,
}

/// Parse a model response into a recommendation
pub fn parse_recommendation(text: &str, model: &str) -> Result<Recommendation, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut section: Option<Section> = None;
    let mut suggestions: Vec<Suggestion> = Vec::new();
    let mut risks: Vec<String> = Vec::new();
    // whether the previous line opened an item that a continuation may extend
    let mut open_item = false;
    // once a section holds list items, unindented prose in it is commentary
    let mut listed = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            open_item = false;
            continue;
        }

        let (marker, content) = strip_marker(line);
        if let Some(found) = heading(content, marker) {
            if accepts(section, marker, &found) {
                section = Some(found.section);
                open_item = false;
                listed = false;
                if !found.rest.is_empty() {
                    listed = marker != Marker::None;
                    open_item = push(found.section, found.rest, &mut suggestions, &mut risks);
                }
                continue;
            }
        }

        let Some(current) = section else {
            continue;
        };

        let content = clean(content);
        if content.is_empty() {
            continue;
        }

        if marker == Marker::None {
            if open_item && raw.starts_with([' ', '\t']) {
                append(current, content, &mut suggestions, &mut risks);
            } else if listed {
                open_item = false;
            } else {
                open_item = push(current, content, &mut suggestions, &mut risks);
            }
        } else {
            listed = true;
            open_item = push(current, content, &mut suggestions, &mut risks);
        }
    }

    if suggestions.is_empty() {
        return Err(ParseError::NoSuggestions);
    }
    Ok(Recommendation::new(suggestions, risks, model))
}

struct Heading<'a> {
    section: Section,
    colon: bool,
    rest: &'a str,
}

/// Recognise a section heading and any text after its colon
///
/// `#` and bold headings may carry extra words after the section name;
/// plain and enumerated labels must be a section name plus qualifiers.
fn heading(line: &str, marker: Marker) -> Option<Heading<'_>> {
    let hashes = line.starts_with('#');
    let body = line.trim_start_matches('#').trim();
    let body = strip_enumeration(body).unwrap_or(body);
    let bold = body.starts_with("**") || body.starts_with("__");
    let body = body.trim_start_matches(['*', '_']).trim();

    let (label, rest, colon) = match body.split_once(':') {
        Some((label, rest)) => (label, clean(rest), true),
        None => (body, "", false),
    };

    let normalized = normalize(label);
    let words = normalized.split_whitespace().count();
    if words == 0 {
        return None;
    }

    let section = if hashes || bold {
        match leading_section(&normalized) {
            Some(section) if words <= MAX_HEADING_WORDS => section,
            Some(_) => return None,
            None if hashes || (colon && rest.is_empty()) || body.ends_with(['*', '_']) => {
                Section::Other
            },
            None => return None,
        }
    } else {
        if !colon && marker != Marker::Enumerated {
            return None;
        }
        match exact_section(&normalized) {
            Some(section) => section,
            None if colon && rest.is_empty() && marker == Marker::None => Section::Other,
            None => return None,
        }
    };

    Some(Heading {
        section,
        colon,
        rest,
    })
}

/// Whether a recognised heading on a list item may switch the current section
fn accepts(current: Option<Section>, marker: Marker, found: &Heading<'_>) -> bool {
    if marker == Marker::None {
        return true;
    }
    if found.section == Section::Other || !(found.colon || marker == Marker::Enumerated) {
        return false;
    }
    // a "Risk ...: detail" item inside a horizon list is an item of that list
    !(found.section == Section::RiskMitigation
        && !found.rest.is_empty()
        && matches!(current, Some(Section::Horizon(_))))
}

/// Section whose name the label starts with
fn leading_section(label: &str) -> Option<Section> {
    SECTION_PHRASES.iter().find_map(|(phrase, section)| {
        let rest = label.strip_prefix(*phrase)?;
        (rest.is_empty() || rest.starts_with(' ')).then_some(*section)
    })
}

/// Section whose name is the whole label, allowing qualifier words after it
fn exact_section(label: &str) -> Option<Section> {
    SECTION_PHRASES.iter().find_map(|(phrase, section)| {
        let rest = label.strip_prefix(*phrase)?;
        if !(rest.is_empty() || rest.starts_with(' ')) {
            return None;
        }
        rest.split_whitespace()
            .all(|word| HEADING_QUALIFIERS.contains(&word))
            .then_some(*section)
    })
}

fn push(
    section: Section,
    text: &str,
    suggestions: &mut Vec<Suggestion>,
    risks: &mut Vec<String>,
) -> bool {
    match section {
        Section::Horizon(horizon) => {
            suggestions.push(Suggestion {
                horizon,
                text: text.to_string(),
            });
            true
        },
        Section::RiskMitigation => {
            risks.push(text.to_string());
            true
        },
        Section::Other => false,
    }
}

fn append(section: Section, text: &str, suggestions: &mut [Suggestion], risks: &mut [String]) {
    let target = match section {
        Section::Horizon(_) => suggestions.last_mut().map(|s| &mut s.text),
        Section::RiskMitigation => risks.last_mut(),
        Section::Other => None,
    };
    if let Some(target) = target {
        target.push(' ');
        target.push_str(text);
    }
}

/// Remove a list marker ("- ", "* ", "• ", "1. ", "2) ")
fn strip_marker(line: &str) -> (Marker, &str) {
    for marker in ["- ", "* ", "• ", "– "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return (Marker::Dash, rest.trim());
        }
    }
    strip_enumeration(line).map_or((Marker::None, line), |rest| (Marker::Enumerated, rest))
}

fn strip_enumeration(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    rest.starts_with(' ').then(|| rest.trim())
}

/// Trim whitespace and stray emphasis markers
fn clean(text: &str) -> &str {
    text.trim().trim_matches(['*', '_']).trim()
}

fn normalize(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '-' | '_' | '*' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
