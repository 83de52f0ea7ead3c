//! Template lookup and rendering.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use minijinja::Environment;
use serde::Serialize;
use tracing::debug;

use crate::diagnostic::CompilerError;

use super::{to_pascal_case, to_snake_case};

/// Templates compiled into the binary, keyed by name.
const BUILTIN: &[(&str, &str)] = &[
    ("cpp/bindings.h.j2", include_str!("../../templates/cpp/bindings.h.j2")),
    ("cpp/config.json.j2", include_str!("../../templates/cpp/config.json.j2")),
    ("csharp/bindings.cs.j2", include_str!("../../templates/csharp/bindings.cs.j2")),
    ("csharp/config.json.j2", include_str!("../../templates/csharp/config.json.j2")),
    ("fallback/bindings.txt.j2", include_str!("../../templates/fallback/bindings.txt.j2")),
    ("fallback/config.json.j2", include_str!("../../templates/fallback/config.json.j2")),
];

/// Where templates come from: an optional override directory, then the
/// built-in set.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    directory: Option<PathBuf>,
}

impl TemplateSet {
    pub fn builtin() -> Self {
        Self { directory: None }
    }

    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Template source for `name`.
    pub fn source(&self, name: &str) -> Result<Cow<'static, str>, CompilerError> {
        let mut searched = Vec::new();
        if let Some(directory) = &self.directory {
            let path = directory.join(name);
            if path.is_file() {
                debug!(template = name, path = %path.display(), "using template override");
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| CompilerError::io(&path, e.to_string()))?;
                return Ok(Cow::Owned(content));
            }
            searched.push(path);
        }
        match BUILTIN.iter().find(|(builtin, _)| *builtin == name) {
            Some((_, content)) => Ok(Cow::Borrowed(content)),
            None => {
                searched.push(PathBuf::from(format!("<builtin>/{name}")));
                Err(CompilerError::TemplateNotFound {
                    name: name.to_string(),
                    searched,
                })
            }
        }
    }

    /// Renders template `name` with `bindings` as its context.
    pub fn render<S: Serialize>(&self, name: &str, bindings: &S) -> Result<String, CompilerError> {
        let source = self.source(name)?;
        let env = environment();
        let render_error = |e: minijinja::Error| CompilerError::TemplateRender {
            name: name.to_string(),
            message: e.to_string(),
        };
        let template = env
            .template_from_named_str(name, &source)
            .map_err(render_error)?;
        template.render(bindings).map_err(render_error)
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_filter("snake_case", |value: String| to_snake_case(&value));
    env.add_filter("pascal_case", |value: String| to_pascal_case(&value));
    env
}
