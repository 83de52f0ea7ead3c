//! Structured documentation attached to declarations.
//!
//! Front-ends fill these from doc comments (see [`parse_doc_comment`]);
//! generators read them without knowing which dialect they came from.

mod comment;

pub use comment::{parse_doc_comment, ParsedDoc};

/// A piece of brief or description text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocInline {
    Text(String),
    /// Inline reference to a parameter (`@p name`).
    ParamRef(String),
}

/// A block tag from a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocTag {
    Param { name: String, is_out: bool, text: String },
    RetVal { name: String, text: String },
    Throws { name: String, text: String },
    Private,
    /// A directive nobody recognized, kept verbatim.
    Unknown { raw: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub brief: Vec<DocInline>,
    pub description: Vec<DocInline>,
    pub tags: Vec<DocTag>,
}

impl Documentation {
    pub fn is_empty(&self) -> bool {
        self.brief.is_empty() && self.description.is_empty() && self.tags.is_empty()
    }

    pub fn brief_text(&self) -> String {
        flatten(&self.brief)
    }

    pub fn description_text(&self) -> String {
        flatten(&self.description)
    }

    pub fn param(&self, name: &str) -> Option<&DocTag> {
        self.tags
            .iter()
            .find(|tag| matches!(tag, DocTag::Param { name: n, .. } if n == name))
    }

    pub fn is_private(&self) -> bool {
        self.tags.iter().any(|tag| matches!(tag, DocTag::Private))
    }

    pub fn unknown_tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().filter_map(|tag| match tag {
            DocTag::Unknown { raw } => Some(raw.as_str()),
            _ => None,
        })
    }
}

fn flatten(items: &[DocInline]) -> String {
    let mut text = String::new();
    for item in items {
        match item {
            DocInline::Text(s) => text.push_str(s),
            DocInline::ParamRef(name) => text.push_str(name),
        }
    }
    text.trim().to_string()
}
