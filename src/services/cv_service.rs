use crate::dto::envelope::ApiResponse;
use crate::error::{Error, Result};
use crate::models::cv::{AcademicInfo, Certification, CvBundle, Project, Skill, StudentProfile};
use crate::services::backend_service::BackendClient;
use crate::utils::time::now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Pending edits over a loaded CV. `original` is what the backend last
/// confirmed; `edited` is what the student sees.
#[derive(Debug, Clone, PartialEq)]
pub struct CvEditor {
    original: JsonValue,
    edited: JsonValue,
}

impl CvEditor {
    pub fn new(original: JsonValue) -> Self {
        Self {
            edited: original.clone(),
            original,
        }
    }

    pub fn original(&self) -> &JsonValue {
        &self.original
    }

    pub fn edited(&self) -> &JsonValue {
        &self.edited
    }

    /// Assigns `value` at a dot-separated path, creating missing objects on
    /// the way down. On error the editor is unchanged.
    pub fn update_section(&mut self, path: &str, value: JsonValue) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        if path.trim().is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(Error::BadRequest(format!("Invalid CV path '{}'", path)));
        }
        let (leaf, parents) = segments
            .split_last()
            .ok_or_else(|| Error::BadRequest("Empty CV path".to_string()))?;

        if !self.edited.is_object() {
            return Err(Error::BadRequest("CV root is not an object".to_string()));
        }
        let mut cursor = &mut self.edited;
        for (depth, segment) in parents.iter().enumerate() {
            let map = cursor
                .as_object_mut()
                .ok_or_else(|| not_an_object(&segments[..depth]))?;
            let next = map
                .entry(segment.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if next.is_null() {
                *next = JsonValue::Object(Map::new());
            }
            if !next.is_object() {
                return Err(not_an_object(&segments[..=depth]));
            }
            cursor = next;
        }

        let map = cursor
            .as_object_mut()
            .ok_or_else(|| not_an_object(parents))?;
        map.insert(leaf.to_string(), value);
        Ok(())
    }

    pub fn reset_changes(&mut self) {
        self.edited = self.original.clone();
    }

    pub fn has_changes(&self) -> bool {
        self.edited != self.original
    }

    fn commit(&mut self) {
        self.original = self.edited.clone();
    }
}

fn not_an_object(segments: &[&str]) -> Error {
    Error::BadRequest(format!(
        "CV field '{}' is not an object",
        segments.join(".")
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvView {
    pub student_id: String,
    pub cv: JsonValue,
    pub has_changes: bool,
    /// Sections that could not be loaded and were left empty.
    pub missing_sections: Vec<String>,
}

struct CvEntry {
    editor: CvEditor,
    missing_sections: Vec<String>,
    touched_at: DateTime<Utc>,
}

impl CvEntry {
    fn view(&self, student_id: &str) -> CvView {
        CvView {
            student_id: student_id.to_string(),
            cv: self.editor.edited().clone(),
            has_changes: self.editor.has_changes(),
            missing_sections: self.missing_sections.clone(),
        }
    }
}

/// One editor per student, kept across requests.
#[derive(Clone, Default)]
pub struct CvService {
    entries: Arc<RwLock<HashMap<String, CvEntry>>>,
}

impl CvService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(
        &self,
        backend: &BackendClient,
        student_id: &str,
        refresh: bool,
    ) -> Result<CvView> {
        if !refresh {
            if let Some(view) = self.view(student_id) {
                return Ok(view);
            }
        }

        let (bundle, missing_sections) = fetch_bundle(backend, student_id).await;
        let entry = CvEntry {
            editor: CvEditor::new(serde_json::to_value(&bundle)?),
            missing_sections,
            touched_at: now(),
        };
        let view = entry.view(student_id);
        self.write().insert(student_id.to_string(), entry);
        Ok(view)
    }

    pub async fn update_section(
        &self,
        backend: &BackendClient,
        student_id: &str,
        path: &str,
        value: JsonValue,
    ) -> Result<CvView> {
        self.load(backend, student_id, false).await?;
        let mut entries = self.write();
        let entry = entries
            .get_mut(student_id)
            .ok_or_else(|| Error::NotFound("CV not loaded".to_string()))?;
        entry.touched_at = now();
        entry.editor.update_section(path, value)?;
        Ok(entry.view(student_id))
    }

    pub fn reset(&self, student_id: &str) -> Result<CvView> {
        let mut entries = self.write();
        let entry = entries
            .get_mut(student_id)
            .ok_or_else(|| Error::NotFound("CV not loaded".to_string()))?;
        entry.touched_at = now();
        entry.editor.reset_changes();
        Ok(entry.view(student_id))
    }

    /// Pushes pending edits; on success they become the new baseline.
    pub async fn save(&self, backend: &BackendClient, student_id: &str) -> Result<CvView> {
        let edited = {
            let entries = self.read();
            let entry = entries
                .get(student_id)
                .ok_or_else(|| Error::NotFound("CV not loaded".to_string()))?;
            if !entry.editor.has_changes() {
                return Ok(entry.view(student_id));
            }
            entry.editor.edited().clone()
        };

        let bundle: CvBundle = serde_json::from_value(edited.clone())
            .map_err(|e| Error::BadRequest(format!("Edited CV is not valid: {}", e)))?;
        let _: JsonValue = backend
            .patch(&format!("students/{}/cv", student_id), &bundle)
            .await
            .into_result()?;

        let mut entries = self.write();
        let entry = entries
            .get_mut(student_id)
            .ok_or_else(|| Error::NotFound("CV not loaded".to_string()))?;
        entry.touched_at = now();
        // edits made while the request was in flight stay pending
        if entry.editor.edited() == &edited {
            entry.editor.commit();
        } else {
            entry.editor.original = edited;
        }
        tracing::info!(student_id, "CV saved");
        Ok(entry.view(student_id))
    }

    /// The saved profile, used to share the CV.
    pub fn profile(&self, student_id: &str) -> Option<StudentProfile> {
        let entries = self.read();
        let original = entries.get(student_id)?.editor.original().get("student")?.clone();
        serde_json::from_value(original).ok()
    }

    /// Forgets editors nobody has used for `max_age`, pending edits included.
    pub fn purge_idle(&self, max_age: chrono::Duration) -> usize {
        let cutoff = now() - max_age;
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, e| e.touched_at > cutoff);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn view(&self, student_id: &str) -> Option<CvView> {
        let mut entries = self.write();
        let entry = entries.get_mut(student_id)?;
        entry.touched_at = now();
        Some(entry.view(student_id))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, CvEntry>> {
        self.entries.read().expect("cv store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, CvEntry>> {
        self.entries.write().expect("cv store lock poisoned")
    }
}

/// Loads the five CV parts in parallel; each one that fails is left empty
/// and named in the returned list.
pub async fn fetch_bundle(backend: &BackendClient, student_id: &str) -> (CvBundle, Vec<String>) {
    let student_path = format!("students/{}", student_id);
    let academic_path = format!("students/{}/academic", student_id);
    let skills_path = format!("students/{}/skills", student_id);
    let projects_path = format!("students/{}/projects", student_id);
    let certifications_path = format!("students/{}/certifications", student_id);
    let (student, academic, skills, projects, certifications) = tokio::join!(
        backend.get::<StudentProfile>(&student_path),
        backend.get::<AcademicInfo>(&academic_path),
        backend.get::<Vec<Skill>>(&skills_path),
        backend.get::<Vec<Project>>(&projects_path),
        backend.get::<Vec<Certification>>(&certifications_path),
    );

    let mut missing = Vec::new();
    let bundle = CvBundle {
        student: section(student, "student", &mut missing),
        academic: section(academic, "academic", &mut missing),
        skills: section(skills, "skills", &mut missing).unwrap_or_default(),
        projects: section(projects, "projects", &mut missing).unwrap_or_default(),
        certifications: section(certifications, "certifications", &mut missing)
            .unwrap_or_default(),
    };
    (bundle, missing)
}

fn section<T>(resp: ApiResponse<T>, name: &str, missing: &mut Vec<String>) -> Option<T> {
    match resp.into_result() {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(section = name, error = %e, "CV section unavailable, using empty placeholder");
            missing.push(name.to_string());
            None
        }
    }
}
