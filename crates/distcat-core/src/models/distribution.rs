//! Catalog records: lightweight index entries and full distributions

use serde::{Deserialize, Serialize};

/// Minimal metadata for one distribution, always resident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: u32,
    pub name: String,
    pub title: String,
    /// Group whose payload holds the full record
    pub group: u32,
}

/// Pointer from one distribution to another worth reading next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedModel {
    pub id: u32,
    pub name: String,
    pub reason: String,
}

/// Full catalog record for one statistical model
///
/// Parsed from a group payload and shared as `Arc<Distribution>` between
/// the group cache and the distribution cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub id: u32,
    pub name: String,
    pub title: String,
    pub description: String,
    pub parameters: String,
    pub formula: String,
    pub application: Vec<String>,
    pub takeaway: String,
    pub group: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_models: Option<Vec<RelatedModel>>,
}

impl Distribution {
    /// Index entry describing this record
    pub fn index_entry(&self) -> IndexEntry {
        IndexEntry {
            id: self.id,
            name: self.name.clone(),
            title: self.title.clone(),
            group: self.group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_related_models() {
        let json = r#"{
            "id": 5,
            "name": "正态分布",
            "title": "Bell curve",
            "description": "d",
            "parameters": "μ, σ",
            "formula": "f(x)",
            "application": ["scheduling"],
            "takeaway": "t",
            "group": 1,
            "relatedModels": [{"id": 6, "name": "泊松分布", "reason": "counts"}]
        }"#;

        let dist: Distribution = serde_json::from_str(json).unwrap();
        assert_eq!(dist.id, 5);
        assert_eq!(dist.application, vec!["scheduling".to_string()]);
        let related = dist.related_models.as_ref().unwrap();
        assert_eq!(related[0].id, 6);
        assert_eq!(related[0].reason, "counts");
    }

    #[test]
    fn test_related_models_optional() {
        let json = r#"{
            "id": 1, "name": "n", "title": "t", "description": "d",
            "parameters": "p", "formula": "f", "application": [],
            "takeaway": "k", "group": 2
        }"#;

        let dist: Distribution = serde_json::from_str(json).unwrap();
        assert!(dist.related_models.is_none());

        let out = serde_json::to_string(&dist).unwrap();
        assert!(!out.contains("relatedModels"));
    }

    #[test]
    fn test_missing_application_rejected() {
        let json = r#"{
            "id": 1, "name": "n", "title": "t", "description": "d",
            "parameters": "p", "formula": "f",
            "takeaway": "k", "group": 2
        }"#;

        let err = serde_json::from_str::<Distribution>(json).unwrap_err();
        assert!(err.to_string().contains("application"));
    }

    #[test]
    fn test_index_entry_projection() {
        let json = r#"{
            "id": 9, "name": "n", "title": "t", "description": "d",
            "parameters": "p", "formula": "f", "application": [],
            "takeaway": "k", "group": 4
        }"#;
        let dist: Distribution = serde_json::from_str(json).unwrap();

        let entry = dist.index_entry();
        assert_eq!(
            entry,
            IndexEntry {
                id: 9,
                name: "n".to_string(),
                title: "t".to_string(),
                group: 4,
            }
        );
    }
}
