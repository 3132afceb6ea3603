//! Plain-text will documents rendered with Tera.

use std::error::Error as _;
use std::fs;
use std::path::{Path, PathBuf};

use tera::Tera;
use tracing::debug;
use will_core::{DocumentRenderer, RenderError, RenderRequest, keys};

const BUILTIN_WILL_TEMPLATE: &str = include_str!("../templates/universal_will.txt.tera");
const TEMPLATE_SUFFIX: &str = ".txt.tera";
const OUTPUT_EXTENSION: &str = "txt";

fn template_name(template_id: &str) -> String {
    format!("{template_id}{TEMPLATE_SUFFIX}")
}

/// Tera's own message plus every underlying cause.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Renders `{template_id}.txt.tera` into `{output_dir}/{file_stem}.txt`.
///
/// Templates come from `template_dir` when one is given; the built-in
/// `universal_will` template fills in when the directory lacks it.
pub struct TeraDocumentRenderer {
    tera: Tera,
    output_dir: PathBuf,
}

impl TeraDocumentRenderer {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        template_dir: Option<&Path>,
    ) -> Result<Self, RenderError> {
        let mut tera = match template_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(RenderError::TemplateNotFound(format!(
                        "template directory {} does not exist",
                        dir.display()
                    )));
                }
                let glob = format!("{}/**/*{}", dir.display(), TEMPLATE_SUFFIX);
                Tera::new(&glob).map_err(|e| RenderError::Render(describe(&e)))?
            }
            None => Tera::default(),
        };

        let builtin = template_name(will_core::document::WILL_TEMPLATE_ID);
        if !tera.get_template_names().any(|name| name == builtin) {
            tera.add_raw_template(&builtin, BUILTIN_WILL_TEMPLATE)
                .map_err(|e| RenderError::Render(describe(&e)))?;
        }
        debug!(
            templates = ?tera.get_template_names().collect::<Vec<_>>(),
            "document templates loaded"
        );

        Ok(Self {
            tera,
            output_dir: output_dir.into(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl DocumentRenderer for TeraDocumentRenderer {
    fn render(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<PathBuf, RenderError> {
        let name = template_name(request.template_id);
        if !self.tera.get_template_names().any(|n| n == name) {
            return Err(RenderError::TemplateNotFound(request.template_id.to_string()));
        }

        let mut context = tera::Context::from_serialize(request.context)
            .map_err(|e| RenderError::Render(describe(&e)))?;
        for key in keys::optional() {
            if !context.contains_key(&key) {
                context.insert(key, "");
            }
        }
        let text = self
            .tera
            .render(&name, &context)
            .map_err(|e| RenderError::Render(describe(&e)))?;

        fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(request.file_stem)
            .with_extension(OUTPUT_EXTENSION);
        fs::write(&path, text)?;
        Ok(path)
    }
}
