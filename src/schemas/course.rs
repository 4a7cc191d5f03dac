use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Course;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreateRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) published: bool,
    #[serde(default = "empty_curriculum")]
    pub(crate) curriculum: serde_json::Value,
}

fn empty_curriculum() -> serde_json::Value {
    serde_json::json!({ "modules": [] })
}

/// Course summary. The raw curriculum document never leaves through this
/// shape; quiz content is served redacted by the quiz endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) published: bool,
    pub(crate) module_count: usize,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        let module_count = course
            .curriculum
            .0
            .get("modules")
            .and_then(|modules| modules.as_array())
            .map(|modules| modules.len())
            .unwrap_or(0);

        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            published: course.published,
            module_count,
            created_by: course.created_by,
            created_at: format_primitive(course.created_at),
        }
    }
}
