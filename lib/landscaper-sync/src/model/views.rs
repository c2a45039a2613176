use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::Model;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Views {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_landscape_views: Vec<SystemLandscapeView>,
    #[serde(default)]
    pub configuration: ViewConfiguration,
    /// Other view kinds are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Views {
    pub fn system_landscape_view(&self, key: &str) -> Option<&SystemLandscapeView> {
        self.system_landscape_views.iter().find(|v| v.key == key)
    }

    /// Returns the landscape view with `key`, creating it first if needed. The flag is `true`
    /// when the view was created.
    pub fn ensure_system_landscape_view(
        &mut self,
        key: &str,
        description: &str,
    ) -> (&mut SystemLandscapeView, bool) {
        let position = self.system_landscape_views.iter().position(|v| v.key == key);
        let (index, created) = match position {
            Some(index) => (index, false),
            None => {
                self.system_landscape_views.push(SystemLandscapeView {
                    key: key.to_string(),
                    description: Some(description.to_string()),
                    ..Default::default()
                });
                (self.system_landscape_views.len() - 1, true)
            }
        };

        (&mut self.system_landscape_views[index], created)
    }

    /// Carries element positions over from `other` for views with the same key. Positions this
    /// side already has are kept.
    pub fn copy_layout_from(&mut self, other: &Views) {
        for view in &mut self.system_landscape_views {
            let Some(source) = other.system_landscape_view(&view.key) else {
                continue;
            };
            for element in &mut view.elements {
                if element.x.is_some() || element.y.is_some() {
                    continue;
                }
                if let Some(positioned) = source.elements.iter().find(|e| e.id == element.id) {
                    element.x = positioned.x;
                    element.y = positioned.y;
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfiguration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ViewConfiguration {
    /// Adds a theme unless it is already referenced. Returns `true` if it was added.
    pub fn add_theme(&mut self, url: &str) -> bool {
        if self.themes.iter().any(|t| t == url) {
            return false;
        }
        self.themes.push(url.to_string());
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLandscapeView {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementView>,
    #[serde(default)]
    pub relationships: Vec<RelationshipView>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SystemLandscapeView {
    pub fn contains_element(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Includes every person and software system of `model` plus the relationships between
    /// included elements. Elements already in the view are left as they are, so repeated calls
    /// do not change the view. Returns the number of elements added.
    pub fn add_all_elements(&mut self, model: &Model) -> usize {
        let mut added = 0;
        for element in model.elements().filter(|e| e.is_person_or_software_system()) {
            if !self.contains_element(&element.id) {
                self.elements.push(ElementView {
                    id: element.id.clone(),
                    ..Default::default()
                });
                added += 1;
            }
        }

        for relationship in model.relationships() {
            if self.contains_element(&relationship.source_id)
                && self.contains_element(&relationship.destination_id)
                && !self.relationships.iter().any(|r| r.id == relationship.id)
            {
                self.relationships.push(RelationshipView {
                    id: relationship.id.clone(),
                    ..Default::default()
                });
            }
        }

        added
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementView {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipView {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use crate::model::{Model, ViewConfiguration, Views};

    #[test]
    fn add_theme_is_idempotent() {
        let mut configuration = ViewConfiguration::default();
        assert!(configuration.add_theme("https://example.com/theme.json"));
        assert!(!configuration.add_theme("https://example.com/theme.json"));
        assert_eq!(1, configuration.themes.len());
    }

    #[test]
    fn add_all_elements_is_idempotent() {
        let mut model = Model::new();
        let a = model.add_software_system("A", None).unwrap().id.clone();
        let b = model.add_software_system("B", None).unwrap().id.clone();
        model.add_person("Clerk", None).unwrap();
        model.add_container(&a, "API", None).unwrap();
        model
            .connect(&a, &b, None, &[crate::model::ElementKind::SoftwareSystem])
            .unwrap();

        let mut views = Views::default();
        let (view, created) = views.ensure_system_landscape_view("Landscape", "generated");
        assert!(created);
        assert_eq!(3, view.add_all_elements(&model));
        assert_eq!(1, view.relationships.len());

        let (view, created) = views.ensure_system_landscape_view("Landscape", "generated");
        assert!(!created);
        assert_eq!(0, view.add_all_elements(&model));
        assert_eq!(3, view.elements.len());
        assert_eq!(1, view.relationships.len());
        assert_eq!(1, views.system_landscape_views.len());
    }

    #[test]
    fn copy_layout_only_fills_unpositioned_elements() {
        let remote: Views = serde_json::from_str(
            r#"{"systemLandscapeViews": [{"key": "Landscape", "elements": [
                {"id": "1", "x": 100, "y": 200}, {"id": "2", "x": 5, "y": 5}]}]}"#,
        )
        .unwrap();
        let mut local: Views = serde_json::from_str(
            r#"{"systemLandscapeViews": [{"key": "Landscape", "elements": [
                {"id": "1"}, {"id": "2", "x": 50, "y": 60}, {"id": "3"}]}]}"#,
        )
        .unwrap();

        local.copy_layout_from(&remote);

        let view = local.system_landscape_view("Landscape").unwrap();
        assert_eq!((Some(100), Some(200)), (view.elements[0].x, view.elements[0].y));
        assert_eq!((Some(50), Some(60)), (view.elements[1].x, view.elements[1].y));
        assert_eq!((None, None), (view.elements[2].x, view.elements[2].y));
    }
}
