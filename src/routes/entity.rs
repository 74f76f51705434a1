//! Resource routes. Every entity gets the generic CRUD set built from its descriptor;
//! users, semesters, courses, projects and skills add their own lookups on top.
//! Collection routes are registered with and without the trailing slash.

use crate::extractors::{JsonBody, Pagination, PathParam, QueryMap};
use crate::handlers::entity::{count, count_by, create, delete, list, list_by, read, search, update};
use crate::handlers::{lookups, skills};
use crate::model::{EntityDef, COURSES, ENTITIES, PROJECTS};
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

type S = State<AppState>;

/// Generic CRUD, count, search and relation routes for one entity under `/api/{path}`.
pub fn resource_routes(entity: &'static EntityDef) -> Router<AppState> {
    let base = format!("/api/{}", entity.path);

    let collection = get(move |s: S, p: Pagination| list(entity, s, p))
        .post(move |s: S, b: JsonBody| create(entity, s, b));
    let item = get(move |s: S, id: PathParam<i32>| read(entity, s, id))
        .put(move |s: S, id: PathParam<i32>, b: JsonBody| update(entity, s, id, b))
        .delete(move |s: S, id: PathParam<i32>| delete(entity, s, id));

    let mut router = Router::new()
        .route(&base, collection.clone())
        .route(&format!("{}/", base), collection)
        .route(&format!("{}/count", base), get(move |s: S| count(entity, s)))
        .route(&format!("{}/:id", base), item);

    if !entity.search.is_empty() {
        router = router.route(
            &format!("{}/search", base),
            get(move |s: S, q: QueryMap| search(entity, s, q)),
        );
    }

    for rel in entity.relations {
        router = router.merge(group_routes(
            entity,
            rel.column,
            &format!("{}/by-{}/:id", base, rel.segment),
            &format!("{}/count/by-{}/:id", base, rel.segment),
        ));
    }
    router
}

/// List-by-parent and count-by-parent for one foreign key.
fn group_routes(entity: &'static EntityDef, column: &'static str, list_path: &str, count_path: &str) -> Router<AppState> {
    Router::new()
        .route(
            list_path,
            get(move |s: S, id: PathParam<i32>, p: Pagination| list_by(entity, column, s, id, p)),
        )
        .route(
            count_path,
            get(move |s: S, id: PathParam<i32>| count_by(entity, column, s, id)),
        )
}

fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/by-username/:username", get(lookups::user_by_username))
        .route("/api/users/by-uupid/:uupid", get(lookups::user_by_uupid))
        .route("/api/semesters/current", get(lookups::current_semester))
        .route(
            "/api/semesters/by-display-name/:display_name",
            get(lookups::semester_by_display_name),
        )
        .route("/api/courses/by-crn/:crn", get(lookups::course_by_crn))
        .route("/api/courses/without-semester", get(lookups::courses_without_semester))
        .merge(group_routes(
            &COURSES,
            "semester_id",
            "/api/courses/by-semester/:id",
            "/api/courses/by-semester/:id/count",
        ))
        .route("/api/projects/by-team/:team_name", get(lookups::projects_by_team))
        .route("/api/projects/by-capacity", get(lookups::projects_by_capacity))
        .route("/api/projects/without-course", get(lookups::projects_without_course))
        .merge(group_routes(
            &PROJECTS,
            "course_id",
            "/api/projects/by-course/:id",
            "/api/projects/count/by-course/:id",
        ))
        .route("/api/skills/bulk", post(skills::bulk_create))
        .route("/api/skills/multi-select", get(skills::multi_select))
}

/// Every business route. The caller applies the API key layer.
pub fn entity_routes() -> Router<AppState> {
    ENTITIES
        .iter()
        .fold(Router::new(), |router, entity| router.merge(resource_routes(entity)))
        .merge(lookup_routes())
}
