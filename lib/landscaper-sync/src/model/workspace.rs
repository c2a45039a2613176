use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Model, Views, GROUP_SEPARATOR_PROPERTY_NAME, THEME_URL};
use crate::SyncResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum WorkspaceScope {
    Landscape,
    SoftwareSystem,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<WorkspaceScope>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One architecture model plus its presentation configuration and modification timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub configuration: WorkspaceConfiguration,
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub views: Views,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workspace {
    pub fn new(id: i64, name: &str, description: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
            last_modified_date: None,
            configuration: WorkspaceConfiguration::default(),
            model: Model::new(),
            views: Views::default(),
            extra: Map::new(),
        }
    }

    /// A new workspace carrying the default theme and group separator. Software system scoped
    /// shells also get their primary software system, named after the workspace.
    pub fn shell(
        id: i64,
        name: &str,
        description: Option<&str>,
        scope: WorkspaceScope,
    ) -> SyncResult<Self> {
        let mut workspace = Workspace::new(id, name, description);
        workspace.configuration.scope = Some(scope);
        workspace.views.configuration.add_theme(THEME_URL);
        workspace
            .model
            .properties
            .insert(GROUP_SEPARATOR_PROPERTY_NAME.to_string(), "/".to_string());

        if scope == WorkspaceScope::SoftwareSystem {
            let software_system = workspace.model.add_software_system(name, description)?;
            software_system.url = Some(system_context_url(id));
        }

        Ok(workspace)
    }

    pub fn scope(&self) -> Option<WorkspaceScope> {
        self.configuration.scope
    }

    /// The software system named after the workspace.
    pub fn primary_software_system(&self) -> Option<&crate::model::Element> {
        self.model.software_system_with_name(&self.name)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified_date = Some(now);
    }

    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Link from an element to the system context diagram of the workspace with `id`.
pub fn system_context_url(id: i64) -> String {
    format!("{{workspace:{id}}}/diagrams#SystemContext")
}

#[cfg(test)]
mod tests {
    use crate::model::{
        system_context_url, Workspace, WorkspaceScope, GROUP_SEPARATOR_PROPERTY_NAME, THEME_URL,
    };

    #[test]
    fn software_system_shell_has_primary_system() {
        let workspace =
            Workspace::shell(42, "Billing", Some("Bills things"), WorkspaceScope::SoftwareSystem)
                .unwrap();

        let system = workspace.primary_software_system().unwrap();
        assert_eq!(Some("Bills things"), system.description.as_deref());
        assert_eq!(Some("{workspace:42}/diagrams#SystemContext"), system.url.as_deref());
        assert_eq!(vec![THEME_URL.to_string()], workspace.views.configuration.themes);
        assert_eq!(
            Some(&"/".to_string()),
            workspace.model.properties.get(GROUP_SEPARATOR_PROPERTY_NAME)
        );
        assert!(workspace.last_modified_date.is_none());
    }

    #[test]
    fn landscape_shell_has_no_elements() {
        let workspace = Workspace::shell(1, "Landscape", None, WorkspaceScope::Landscape).unwrap();

        assert_eq!(0, workspace.model.elements().count());
        assert_eq!(Some(WorkspaceScope::Landscape), workspace.scope());
    }

    #[test]
    fn url_encodes_workspace_id() {
        assert_eq!("{workspace:7}/diagrams#SystemContext", system_context_url(7));
    }
}
