//! Template resolution and rendering.
//!
//! A logical template name resolves through a precedence chain: custom
//! override directory, extracted override directory, embedded
//! target-specific source, embedded common source, embedded flat root
//! (legacy). The first hit wins and is cached per `(target, name)`.

mod embedded;

pub use embedded::EMBEDDED_TEMPLATES;

use crate::error::GenError;
use crate::naming;
use minijinja::Environment;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default directory the extraction command writes into
pub const EXTRACTED_ROOT: &str = "./abpgen-templates";

/// Template names whose absence is a soft skip rather than a fatal error
const OPTIONAL_TEMPLATES: &[&str] = &[
    "integration_test",
    "enum_extensions",
    "custom_repository_interface",
    "custom_repository_efcore",
    "custom_repository_mongodb",
];

/// Loads templates through the precedence chain and renders them
pub struct TemplateLoader {
    custom_path: Option<PathBuf>,
    extracted_root: PathBuf,
    target_framework: String,
    cache: HashMap<String, String>,
}

impl TemplateLoader {
    pub fn new(custom_path: Option<PathBuf>, target_framework: &str) -> Self {
        TemplateLoader {
            custom_path,
            extracted_root: PathBuf::from(EXTRACTED_ROOT),
            target_framework: target_framework.to_string(),
            cache: HashMap::new(),
        }
    }

    /// Override the extracted-templates directory (used by tests)
    pub fn with_extracted_root(mut self, root: PathBuf) -> Self {
        self.extracted_root = root;
        self
    }

    pub fn set_target_framework(&mut self, target: &str) {
        if self.target_framework != target {
            self.target_framework = target.to_string();
            self.cache.clear();
        }
    }

    /// Resolve a logical template name to its source text
    ///
    /// Resolution order for name `N` under target `T`:
    /// 1. `custom/T/N.j2`
    /// 2. `custom/common/N.j2`
    /// 3. `extracted/T/N.j2`
    /// 4. `extracted/common/N.j2`
    /// 5. embedded `T/N.j2`
    /// 6. embedded `common/N.j2`
    /// 7. embedded `N.j2` (legacy flat root)
    pub fn source(&mut self, name: &str) -> Result<String, GenError> {
        let cache_key = format!("{}:{}", self.target_framework, name);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached.clone());
        }

        let file = format!("{name}.j2");
        let target = self.target_framework.clone();

        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(custom) = &self.custom_path {
            candidates.push(custom.join(&target).join(&file));
            candidates.push(custom.join("common").join(&file));
        }
        candidates.push(self.extracted_root.join(&target).join(&file));
        candidates.push(self.extracted_root.join("common").join(&file));

        for candidate in candidates {
            if let Ok(source) = std::fs::read_to_string(&candidate) {
                self.cache.insert(cache_key, source.clone());
                return Ok(source);
            }
        }

        for embedded_path in [
            format!("{target}/{file}"),
            format!("common/{file}"),
            file.clone(),
        ] {
            if let Some(source) = embedded::embedded(&embedded_path) {
                self.cache.insert(cache_key, source.to_string());
                return Ok(source.to_string());
            }
        }

        Err(GenError::TemplateMissing {
            name: name.to_string(),
            target,
        })
    }

    /// Render a required template with the given context
    pub fn render(
        &mut self,
        name: &str,
        context: &serde_json::Value,
    ) -> anyhow::Result<String> {
        let source = self.source(name)?;
        render_source(name, &source, context)
    }

    /// Render an optional template, reporting absence instead of failing
    pub fn render_optional(
        &mut self,
        name: &str,
        context: &serde_json::Value,
    ) -> anyhow::Result<Option<String>> {
        match self.source(name) {
            Ok(source) => Ok(Some(render_source(name, &source, context)?)),
            Err(GenError::TemplateMissing { .. }) if OPTIONAL_TEMPLATES.contains(&name) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Render one template source with the shared filter set
fn render_source(
    name: &str,
    source: &str,
    context: &serde_json::Value,
) -> anyhow::Result<String> {
    let mut env = Environment::new();
    register_filters(&mut env);
    env.add_template(name, source)
        .map_err(|e| anyhow::anyhow!("template '{name}' failed to parse: {e}"))?;
    let template = env.get_template(name)?;
    let rendered = template
        .render(context)
        .map_err(|e| anyhow::anyhow!("template '{name}' failed to render: {e}"))?;
    Ok(rendered)
}

/// Register the naming filters every template can use
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("pluralize", |s: String| naming::pluralize(&s));
    env.add_filter("pascal_case", |s: String| naming::pascal_case(&s));
    env.add_filter("camel_case", |s: String| naming::camel_case(&s));
    env.add_filter("lower_first", |s: String| naming::lower_first(&s));
    env.add_filter("upper_first", |s: String| naming::upper_first(&s));
    env.add_filter("cs_type", |s: String| naming::cs_type(&s));
    env.add_filter("nullable", |s: String, is_nullable: bool| {
        naming::nullable(&s, is_nullable)
    });
}

/// Extract every embedded template under `dest`
pub fn extract_templates(dest: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (relative, source) in EMBEDDED_TEMPLATES {
        let dest_file = dest.join(relative);
        if let Some(parent) = dest_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest_file, source)?;
        written.push(dest_file);
    }
    Ok(written)
}
