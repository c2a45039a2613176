use std::fs;
use std::path::Path;

use landscaper_templating::{TemplateContext, Templates};
use tracing::debug;

use crate::model::WorkspaceScope;
use crate::SyncResult;

pub const LANDSCAPE_TEMPLATE_NAME: &str = "landscape.dsl";
pub const SOFTWARE_SYSTEM_TEMPLATE_NAME: &str = "software-system.dsl";

const LANDSCAPE_TEMPLATE: &str = include_str!("../templates/landscape.dsl");
const SOFTWARE_SYSTEM_TEMPLATE: &str = include_str!("../templates/software-system.dsl");

fn template_name(scope: WorkspaceScope) -> &'static str {
    match scope {
        WorkspaceScope::Landscape => LANDSCAPE_TEMPLATE_NAME,
        WorkspaceScope::SoftwareSystem => SOFTWARE_SYSTEM_TEMPLATE_NAME,
    }
}

/// The workspace descriptor templates, one per scope.
#[derive(Debug)]
pub struct DescriptorTemplates {
    templates: Templates<'static>,
}

impl DescriptorTemplates {
    /// Loads the templates, preferring a file of the same name in `dir` over the built-in one.
    pub fn load(dir: Option<&Path>) -> SyncResult<Self> {
        let mut templates = Templates::new();
        for (name, builtin) in [
            (LANDSCAPE_TEMPLATE_NAME, LANDSCAPE_TEMPLATE),
            (SOFTWARE_SYSTEM_TEMPLATE_NAME, SOFTWARE_SYSTEM_TEMPLATE),
        ] {
            let custom = dir.map(|d| d.join(name)).filter(|p| p.is_file());
            let source = match custom {
                Some(path) => {
                    debug!(template = %path.display(), "using custom template");
                    fs::read_to_string(path)?
                }
                None => builtin.to_string(),
            };
            templates.add_template(name, source)?;
        }

        Ok(Self { templates })
    }

    pub fn render(&self, scope: WorkspaceScope, context: &TemplateContext) -> SyncResult<String> {
        Ok(self.templates.render(template_name(scope), context)?)
    }
}
