//! Development seed data. Each insert is independent; failures are logged and skipped.

use crate::error::AppError;
use crate::model::{
    EntityDef, COURSES, PROJECTS, PROJECT_SKILLS, PROJECT_USERS, SEMESTERS, SKILLS, USERS, USER_COURSES,
    USER_SKILLS,
};
use crate::response::{success_one, ApiResult};
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::extract::State;
use serde_json::{json, Map, Value};
use sqlx::PgPool;

const USERS_SEED: [(&str, &str, &str, &str); 5] = [
    ("john_doe", "student", "john123", "john@vt.edu"),
    ("jane_smith", "student", "jane456", "jane@vt.edu"),
    ("bob_wilson", "student", "bob789", "bob@vt.edu"),
    ("alice_jones", "staff", "alice101", "alice@vt.edu"),
    ("charlie_brown", "student", "charlie202", "charlie@vt.edu"),
];

const SEMESTERS_SEED: [(&str, &str, &str); 2] = [
    ("Fall 2024", "2024-08-26T00:00:00Z", "2024-12-13T00:00:00Z"),
    ("Spring 2025", "2025-01-13T00:00:00Z", "2025-05-02T00:00:00Z"),
];

const SKILLS_SEED: [&str; 10] = [
    "Python",
    "JavaScript",
    "React",
    "Node.js",
    "SQL",
    "Git",
    "Docker",
    "AWS",
    "Machine Learning",
    "Data Analysis",
];

/// (semester index, crn, display name)
const COURSES_SEED: [(usize, &str, &str); 3] = [
    (0, "12345", "CS 3704 - Software Engineering"),
    (0, "12346", "CS 3214 - Computer Systems"),
    (1, "12347", "CS 4604 - Introduction to Database Management Systems"),
];

/// (course index, title, description, capacity, team)
const PROJECTS_SEED: [(usize, &str, &str, i32, &str); 4] = [
    (0, "Web Application", "Build a full-stack web application", 4, "Team Alpha"),
    (0, "Mobile App", "Develop a mobile application", 3, "Team Beta"),
    (1, "System Optimization", "Optimize system performance", 2, "Team Gamma"),
    (2, "Database Design", "Design and implement a database", 4, "Team Delta"),
];

/// POST /api/populate/ (development only)
pub async fn populate(State(state): State<AppState>) -> ApiResult<Value> {
    if !state.config.environment.is_development() {
        return Err(AppError::Forbidden(
            "This endpoint is only available in development mode".into(),
        ));
    }
    let pool = &state.pool;

    let mut users = Vec::new();
    for (username, affiliation, uupid, principal) in USERS_SEED {
        let body = json!({
            "username": username,
            "edupersonprimaryaffiliation": affiliation,
            "uupid": uupid,
            "edupersonprincipalname": principal,
        });
        users.extend(seed(pool, &USERS, body).await);
    }

    let mut semesters = Vec::new();
    for (name, start, end) in SEMESTERS_SEED {
        let body = json!({ "displayName": name, "semesterStartDate": start, "semesterEndDate": end });
        semesters.extend(seed(pool, &SEMESTERS, body).await);
    }

    let mut skills = Vec::new();
    for name in SKILLS_SEED {
        skills.extend(seed(pool, &SKILLS, json!({ "name": name })).await);
    }

    let mut courses = Vec::new();
    for (semester, crn, name) in COURSES_SEED {
        let body = json!({ "semester_id": semesters.get(semester), "crn": crn, "displayName": name });
        courses.extend(seed(pool, &COURSES, body).await);
    }

    let mut projects = Vec::new();
    for (course, title, description, capacity, team) in PROJECTS_SEED {
        let body = json!({
            "course_id": courses.get(course),
            "title": title,
            "description": description,
            "maxCapacity": capacity,
            "teamName": team,
        });
        projects.extend(seed(pool, &PROJECTS, body).await);
    }

    let project_skills =
        link(pool, &PROJECT_SKILLS, ("project_id", projects.as_slice()), ("skill_id", skills.as_slice()), 3).await;
    let project_users =
        link(pool, &PROJECT_USERS, ("project_id", projects.as_slice()), ("user_id", users.as_slice()), 2).await;
    let user_courses =
        link(pool, &USER_COURSES, ("course_id", courses.as_slice()), ("user_id", users.as_slice()), 2).await;
    let user_skills =
        link(pool, &USER_SKILLS, ("user_id", users.as_slice()), ("skill_id", skills.as_slice()), 2).await;

    let counts = json!({
        "users": users.len(),
        "semesters": semesters.len(),
        "skills": skills.len(),
        "courses": courses.len(),
        "projects": projects.len(),
        "project_skills": project_skills,
        "project_users": project_users,
        "user_courses": user_courses,
        "user_skills": user_skills,
    });
    tracing::info!(%counts, "database populated");
    Ok(success_one(json!({ "message": "Database populated successfully", "counts": counts })))
}

/// Insert one seed row; returns its id, or `None` after logging why it was skipped.
async fn seed(pool: &PgPool, entity: &EntityDef, body: Value) -> Option<i64> {
    let Value::Object(map) = body else {
        return None;
    };
    let result = match RequestValidator::validate(entity, &map) {
        Ok(values) => CrudService::create(pool, entity, &values).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(row) => row["id"].as_i64(),
        Err(e) => {
            tracing::warn!(entity = entity.label, error = %e, "seed row skipped");
            None
        }
    }
}

/// Link `left[i]` to `right[j]` whenever `(i + j) % modulus == 0`. Returns how many links were created.
async fn link(
    pool: &PgPool,
    entity: &EntityDef,
    left: (&str, &[i64]),
    right: (&str, &[i64]),
    modulus: usize,
) -> usize {
    let mut created = 0;
    for (i, a) in left.1.iter().enumerate() {
        for (j, b) in right.1.iter().enumerate() {
            if (i + j) % modulus != 0 {
                continue;
            }
            let mut map = Map::new();
            map.insert(left.0.to_string(), json!(a));
            map.insert(right.0.to_string(), json!(b));
            if seed(pool, entity, Value::Object(map)).await.is_some() {
                created += 1;
            }
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_rows_pass_validation() {
        for (username, affiliation, uupid, principal) in USERS_SEED {
            let body = json!({
                "username": username,
                "edupersonprimaryaffiliation": affiliation,
                "uupid": uupid,
                "edupersonprincipalname": principal,
            });
            assert!(RequestValidator::validate(&USERS, body.as_object().unwrap()).is_ok());
        }
        for (name, start, end) in SEMESTERS_SEED {
            let body = json!({ "displayName": name, "semesterStartDate": start, "semesterEndDate": end });
            assert!(RequestValidator::validate(&SEMESTERS, body.as_object().unwrap()).is_ok());
        }
        for name in SKILLS_SEED {
            assert!(RequestValidator::validate(&SKILLS, json!({ "name": name }).as_object().unwrap()).is_ok());
        }
    }

    #[test]
    fn course_seed_without_semester_is_still_valid() {
        let semesters: Vec<i64> = Vec::new();
        let (semester, crn, name) = COURSES_SEED[0];
        let body = json!({ "semester_id": semesters.get(semester), "crn": crn, "displayName": name });
        assert!(body["semester_id"].is_null());
        assert!(RequestValidator::validate(&COURSES, body.as_object().unwrap()).is_ok());
    }
}
