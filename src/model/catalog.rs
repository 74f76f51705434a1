//! The nine roster tables.

use super::{CascadeStep, ColumnDef, EntityDef, Relation};

pub static USERS: EntityDef = EntityDef {
    label: "User",
    path: "users",
    table: "users",
    columns: &[
        ColumnDef::text("username", 255),
        ColumnDef::text("edupersonprimaryaffiliation", 255),
        ColumnDef::text("uupid", 255),
        ColumnDef::text("edupersonprincipalname", 255),
    ],
    timestamps: true,
    search: &["username", "uupid", "edupersonprincipalname"],
    count_key: "total_users",
    relations: &[],
    cascade: &[
        CascadeStep::delete("user_skills", "user_id"),
        CascadeStep::delete("user_courses", "user_id"),
        CascadeStep::delete("project_users", "user_id"),
    ],
};

pub static SEMESTERS: EntityDef = EntityDef {
    label: "Semester",
    path: "semesters",
    table: "semesters",
    columns: &[
        ColumnDef::text("displayName", 255),
        ColumnDef::timestamp("semesterStartDate"),
        ColumnDef::timestamp("semesterEndDate"),
    ],
    timestamps: true,
    search: &["displayName"],
    count_key: "total_semesters",
    relations: &[],
    cascade: &[
        CascadeStep::delete("user_courses", "course_id").through("courses", "semester_id"),
        CascadeStep::detach("projects", "course_id").through("courses", "semester_id"),
        CascadeStep::delete("courses", "semester_id"),
    ],
};

pub static COURSES: EntityDef = EntityDef {
    label: "Course",
    path: "courses",
    table: "courses",
    columns: &[
        ColumnDef::int("semester_id").nullable(),
        ColumnDef::text("crn", 100),
        ColumnDef::text("displayName", 255),
    ],
    timestamps: true,
    search: &["displayName", "crn"],
    count_key: "total_courses",
    relations: &[],
    cascade: &[
        CascadeStep::delete("user_courses", "course_id"),
        CascadeStep::detach("projects", "course_id"),
    ],
};

pub static PROJECTS: EntityDef = EntityDef {
    label: "Project",
    path: "projects",
    table: "projects",
    columns: &[
        ColumnDef::int("course_id").nullable(),
        ColumnDef::text("title", 255),
        ColumnDef::long_text("description"),
        ColumnDef::int("maxCapacity").with_default().at_least(0),
        ColumnDef::text("teamName", 255).nullable(),
    ],
    timestamps: true,
    search: &["title", "description", "teamName"],
    count_key: "total_projects",
    relations: &[],
    cascade: &[
        CascadeStep::delete("project_skills", "project_id"),
        CascadeStep::delete("project_users", "project_id"),
    ],
};

pub static SKILLS: EntityDef = EntityDef {
    label: "Skill",
    path: "skills",
    table: "skills",
    columns: &[ColumnDef::text("name", 50)],
    timestamps: false,
    search: &["name"],
    count_key: "total_skills",
    relations: &[],
    cascade: &[
        CascadeStep::delete("user_skills", "skill_id"),
        CascadeStep::delete("project_skills", "skill_id"),
    ],
};

pub static PROJECT_SKILLS: EntityDef = EntityDef {
    label: "Project-skill relationship",
    path: "project-skills",
    table: "project_skills",
    columns: &[ColumnDef::int("project_id"), ColumnDef::int("skill_id")],
    timestamps: false,
    search: &[],
    count_key: "total_project_skills",
    relations: &[
        Relation { segment: "project", column: "project_id" },
        Relation { segment: "skill", column: "skill_id" },
    ],
    cascade: &[],
};

pub static PROJECT_USERS: EntityDef = EntityDef {
    label: "Project-user relationship",
    path: "project-users",
    table: "project_users",
    columns: &[ColumnDef::int("project_id"), ColumnDef::int("user_id")],
    timestamps: false,
    search: &[],
    count_key: "total_project_users",
    relations: &[
        Relation { segment: "project", column: "project_id" },
        Relation { segment: "user", column: "user_id" },
    ],
    cascade: &[],
};

pub static USER_COURSES: EntityDef = EntityDef {
    label: "User-course relationship",
    path: "user-courses",
    table: "user_courses",
    columns: &[ColumnDef::int("user_id"), ColumnDef::int("course_id")],
    timestamps: false,
    search: &[],
    count_key: "total_user_courses",
    relations: &[
        Relation { segment: "user", column: "user_id" },
        Relation { segment: "course", column: "course_id" },
    ],
    cascade: &[],
};

pub static USER_SKILLS: EntityDef = EntityDef {
    label: "User-skill relationship",
    path: "user-skills",
    table: "user_skills",
    columns: &[ColumnDef::int("user_id"), ColumnDef::int("skill_id")],
    timestamps: false,
    search: &[],
    count_key: "total_user_skills",
    relations: &[
        Relation { segment: "user", column: "user_id" },
        Relation { segment: "skill", column: "skill_id" },
    ],
    cascade: &[],
};

/// All entities, parents before children (table creation order).
pub static ENTITIES: [&EntityDef; 9] = [
    &USERS,
    &SEMESTERS,
    &COURSES,
    &PROJECTS,
    &SKILLS,
    &PROJECT_SKILLS,
    &PROJECT_USERS,
    &USER_COURSES,
    &USER_SKILLS,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CascadeAction, Scope};

    #[test]
    fn paths_are_unique() {
        let mut paths: Vec<_> = ENTITIES.iter().map(|e| e.path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), ENTITIES.len());
    }

    #[test]
    fn semester_cascade_reaches_course_dependents_first() {
        let steps = SEMESTERS.cascade;
        assert_eq!(steps.len(), 3);
        assert_eq!(
            steps[0].scope,
            Scope::Through { table: "courses", column: "semester_id" }
        );
        assert_eq!(steps[1].action, CascadeAction::Detach);
        assert_eq!(steps[2].table, "courses");
        assert_eq!(steps[2].scope, Scope::Direct);
    }

    #[test]
    fn every_search_column_is_a_text_column() {
        for e in ENTITIES.iter() {
            for s in e.search {
                let col = e.column(s).expect("search column exists");
                assert_eq!(col.ty, crate::model::ColumnType::Text, "{}.{}", e.table, s);
            }
        }
    }
}
