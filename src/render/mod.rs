//! Page rendering: bind evaluated records into a template.
//!
//! Templates are Jinja2 (via `minijinja`), loaded from the templates
//! directory. Each page sees this context:
//!
//! | Key         | Value                                             |
//! |-------------|---------------------------------------------------|
//! | `page`      | `title`, `output`, `template`, `root`             |
//! | `records`   | map of record id to evaluated value               |
//! | `items`     | evaluated values in page order                    |
//! | `<id>`      | each evaluated value under its own identifier     |
//!
//! `page.root` is the relative prefix back to the output root (`""` for a
//! top-level page, `"../"` one level down), for links between pages.
//!
//! Undefined variables are errors, so a typo in a template fails the page
//! instead of rendering an empty string.

use std::collections::BTreeMap;
use std::path::Path;

use minijinja::{Environment, UndefinedBehavior, Value, path_loader};
use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::data::PageSpec;
use crate::formula::format::significant;
use crate::formula::{DEFAULT_PRECISION, EvaluatedValue};

/// Why a page could not be rendered.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("page `{page}` references `{record}`, which has no evaluated value")]
    MissingBinding { page: String, record: String },

    #[error("template `{template}`: {source}")]
    Engine {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    title: Option<&'a str>,
    output: String,
    template: &'a str,
    root: String,
}

/// Template environment for one build.
///
/// Templates are cached after first use, so a fresh renderer is created per
/// rebuild to pick up edits.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Load templates lazily from `dir`; `precision` is the default digit
    /// count of the `sig` filter.
    pub fn from_dir(dir: &Path, precision: usize) -> Self {
        let mut env = Self::environment(precision);
        env.set_loader(path_loader(dir));
        Self { env }
    }

    /// In-memory templates, keyed by name.
    pub fn from_templates<'a>(
        templates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, TemplateError> {
        let mut env = Self::environment(DEFAULT_PRECISION);
        for (name, source) in templates {
            env.add_template_owned(name.to_string(), source.to_string())
                .map_err(|source| TemplateError::Engine {
                    template: name.to_string(),
                    source,
                })?;
        }
        Ok(Self { env })
    }

    fn environment(precision: usize) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("sig", move |value: f64, digits: Option<usize>| {
            significant(value, digits.unwrap_or(precision))
        });
        env
    }

    /// Render one page. Pure: the result depends only on the page, the
    /// values, and the template sources.
    pub fn render(
        &self,
        page: &PageSpec,
        values: &FxHashMap<String, EvaluatedValue>,
    ) -> Result<Vec<u8>, TemplateError> {
        let engine = |source| TemplateError::Engine {
            template: page.template.clone(),
            source,
        };

        let mut items = Vec::with_capacity(page.records.len());
        for id in &page.records {
            let value = values.get(id).ok_or_else(|| TemplateError::MissingBinding {
                page: page.output.display().to_string(),
                record: id.clone(),
            })?;
            items.push((id.as_str(), value));
        }

        let mut context: BTreeMap<&str, Value> = items
            .iter()
            .map(|(id, value)| (*id, Value::from_serialize(value)))
            .collect();
        context.insert(
            "page",
            Value::from_serialize(PageContext {
                title: page.title.as_deref(),
                output: page.output.to_string_lossy().replace('\\', "/"),
                template: &page.template,
                root: "../".repeat(page.output.components().count().saturating_sub(1)),
            }),
        );
        context.insert(
            "records",
            Value::from_serialize(items.iter().copied().collect::<BTreeMap<_, _>>()),
        );
        context.insert(
            "items",
            Value::from_serialize(items.iter().map(|(_, v)| *v).collect::<Vec<_>>()),
        );

        let template = self.env.get_template(&page.template).map_err(engine)?;
        let html = template.render(context).map_err(engine)?;
        Ok(html.into_bytes())
    }
}
