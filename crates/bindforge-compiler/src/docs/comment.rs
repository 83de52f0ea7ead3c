//! Doc-comment text to [`Documentation`] plus attribute directives.

use crate::attribute::{self, AttributeError, RawAttribute};

use super::{DocInline, DocTag, Documentation};

/// Everything extracted from one doc comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDoc {
    pub documentation: Documentation,
    pub attributes: Vec<RawAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Brief,
    Description,
    Tag(usize),
}

/// Parses comment text whose comment markers have already been stripped.
///
/// The first paragraph is the brief unless `@brief` appears; later paragraphs
/// form the description. Lines starting with `@name` are either attribute
/// directives, known block tags, or kept verbatim as [`DocTag::Unknown`].
/// Errors carry the zero-based line offset inside the comment.
pub fn parse_doc_comment(text: &str) -> Result<ParsedDoc, (usize, AttributeError)> {
    let mut doc = ParsedDoc::default();
    let mut section = Section::Brief;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            section = match section {
                Section::Brief if doc.documentation.brief.is_empty() => Section::Brief,
                _ => Section::Description,
            };
            continue;
        }

        let directive = line.strip_prefix('@').or_else(|| line.strip_prefix('\\'));
        if let Some(rest) = directive {
            let name_len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let (name, after) = rest.split_at(name_len);

            if name != "p" && name != "paramref" {
                if attribute::is_attribute_name(name) {
                    let args = invocation_arguments(name, after).map_err(|e| (line_no, e))?;
                    doc.attributes.push(RawAttribute {
                        name: name.to_string(),
                        args,
                        line: line_no,
                    });
                    continue;
                }
                section = block_tag(&mut doc.documentation, name, after.trim(), line, section);
                continue;
            }
        }

        let docs = &mut doc.documentation;
        match section {
            Section::Brief => push_inline(&mut docs.brief, line),
            Section::Description => push_inline(&mut docs.description, line),
            Section::Tag(index) => continue_tag(&mut docs.tags[index], line),
        }
    }

    Ok(doc)
}

fn block_tag(docs: &mut Documentation, name: &str, after: &str, line: &str, current: Section) -> Section {
    match name {
        "brief" | "short" => {
            docs.brief.clear();
            push_inline(&mut docs.brief, after);
            Section::Brief
        }
        "details" | "description" | "remarks" => {
            push_inline(&mut docs.description, after);
            Section::Description
        }
        "param" => {
            let (is_out, after) = param_direction(after);
            let (param, text) = split_word(after);
            docs.tags.push(DocTag::Param {
                name: param.to_string(),
                is_out,
                text: text.to_string(),
            });
            Section::Tag(docs.tags.len() - 1)
        }
        "retval" => {
            let (value, text) = split_word(after);
            docs.tags.push(DocTag::RetVal {
                name: value.to_string(),
                text: text.to_string(),
            });
            Section::Tag(docs.tags.len() - 1)
        }
        "return" | "returns" | "result" => {
            docs.tags.push(DocTag::RetVal {
                name: String::new(),
                text: after.to_string(),
            });
            Section::Tag(docs.tags.len() - 1)
        }
        "throws" | "throw" | "exception" | "raises" => {
            let (error, text) = split_word(after);
            docs.tags.push(DocTag::Throws {
                name: error.to_string(),
                text: text.to_string(),
            });
            Section::Tag(docs.tags.len() - 1)
        }
        "private" | "internal" => {
            docs.tags.push(DocTag::Private);
            match current {
                Section::Tag(_) => Section::Description,
                other => other,
            }
        }
        _ => {
            docs.tags.push(DocTag::Unknown {
                raw: line[1..].to_string(),
            });
            Section::Tag(docs.tags.len() - 1)
        }
    }
}

fn continue_tag(tag: &mut DocTag, line: &str) {
    match tag {
        DocTag::Param { text, .. } | DocTag::RetVal { text, .. } | DocTag::Throws { text, .. } => {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(line);
        }
        DocTag::Unknown { raw } => {
            raw.push('\n');
            raw.push_str(line);
        }
        DocTag::Private => {}
    }
}

/// `[out]`, `[in,out]` or `[in]` right after `@param`.
fn param_direction(after: &str) -> (bool, &str) {
    let Some(rest) = after.strip_prefix('[') else {
        return (false, after);
    };
    match rest.find(']') {
        Some(end) => {
            let direction = rest[..end].to_ascii_lowercase();
            let is_out = direction.split(',').any(|part| part.trim() == "out");
            (is_out, rest[end + 1..].trim_start())
        }
        None => (false, after),
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim()),
        None => (text, ""),
    }
}

/// Arguments between the parentheses of `@name(...)`; no parentheses means none.
fn invocation_arguments(name: &str, after: &str) -> Result<Vec<attribute::AttrArg>, AttributeError> {
    let after = after.trim_start();
    let Some(inner) = after.strip_prefix('(') else {
        return Ok(Vec::new());
    };
    let end = inner.rfind(')').ok_or_else(|| AttributeError::Malformed {
        attribute: name.to_string(),
        message: "missing closing parenthesis".to_string(),
    })?;
    attribute::parse_invocation(name, &inner[..end])
}

fn push_inline(target: &mut Vec<DocInline>, line: &str) {
    if line.is_empty() {
        return;
    }
    if !target.is_empty() {
        push_text(target, " ");
    }
    let mut rest = line;
    while let Some(at) = rest.find('@') {
        let after = &rest[at + 1..];
        let word_len = after
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after.len());
        let word = &after[..word_len];
        if word == "p" || word == "paramref" {
            let tail = after[word_len..].trim_start();
            let name_len = tail
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(tail.len());
            if name_len > 0 {
                push_text(target, &rest[..at]);
                target.push(DocInline::ParamRef(tail[..name_len].to_string()));
                rest = &tail[name_len..];
                continue;
            }
        }
        push_text(target, &rest[..at + 1]);
        rest = after;
    }
    push_text(target, rest);
}

fn push_text(target: &mut Vec<DocInline>, text: &str) {
    if text.is_empty() {
        return;
    }
    match target.last_mut() {
        Some(DocInline::Text(last)) => last.push_str(text),
        _ => target.push(DocInline::Text(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttrValue;

    #[test]
    fn test_brief_and_description() {
        let parsed = parse_doc_comment("Plays media.\nSecond line.\n\nLonger text here.").unwrap();
        assert_eq!(parsed.documentation.brief_text(), "Plays media. Second line.");
        assert_eq!(parsed.documentation.description_text(), "Longer text here.");
    }

    #[test]
    fn test_param_tags() {
        let text = "Reads a value.\n@param[out] value receives the value\n@param index zero based";
        let docs = parse_doc_comment(text).unwrap().documentation;
        assert_eq!(
            docs.param("value"),
            Some(&DocTag::Param {
                name: "value".to_string(),
                is_out: true,
                text: "receives the value".to_string(),
            })
        );
        assert!(matches!(docs.param("index"), Some(DocTag::Param { is_out: false, .. })));
    }

    #[test]
    fn test_inline_param_ref() {
        let docs = parse_doc_comment("Clamps @p level to the range.").unwrap().documentation;
        assert_eq!(
            docs.brief,
            vec![
                DocInline::Text("Clamps ".to_string()),
                DocInline::ParamRef("level".to_string()),
                DocInline::Text(" to the range.".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let docs = parse_doc_comment("Brief.\n@since 2.1 added streaming").unwrap().documentation;
        assert_eq!(docs.unknown_tags().collect::<Vec<_>>(), vec!["since 2.1 added streaming"]);
    }

    #[test]
    fn test_attributes_are_separated_from_docs() {
        let parsed = parse_doc_comment("Volume level.\n@property(Volume, get)\n@private").unwrap();
        assert_eq!(parsed.attributes.len(), 1);
        assert_eq!(parsed.attributes[0].name, "property");
        assert_eq!(parsed.attributes[0].args[0].value, AttrValue::Ident("Volume".to_string()));
        assert_eq!(parsed.attributes[0].line, 1);
        assert!(parsed.documentation.is_private());
        assert_eq!(parsed.documentation.brief_text(), "Volume level.");
    }

    #[test]
    fn test_unclosed_attribute_reports_line() {
        let err = parse_doc_comment("Brief.\n@factory(IFoo, Default").unwrap_err();
        assert_eq!(err.0, 1);
        assert!(matches!(err.1, AttributeError::Malformed { .. }));
    }
}
