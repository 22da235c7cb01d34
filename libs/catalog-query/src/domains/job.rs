use crate::field::{FacetField, FieldDef, FieldKind};
use crate::kind::ListingKind;
use crate::schema::ListingSchema;
use crate::sort::{OrderKey, SortKey, SortRule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobFacet {
    Type,
    WorkMode,
    Experience,
    Location,
}

impl FacetField for JobFacet {
    const KIND: ListingKind = ListingKind::Jobs;
    const FIELDS: &'static [Self] = &[Self::Type, Self::WorkMode, Self::Experience, Self::Location];

    fn name(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::WorkMode => "workMode",
            Self::Experience => "experience",
            Self::Location => "location",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Type => "job_type",
            Self::WorkMode => "work_mode",
            Self::Experience => "experience",
            Self::Location => "location",
        }
    }
}

pub static SCHEMA: ListingSchema = ListingSchema {
    kind: ListingKind::Jobs,
    collection: "jobs",
    fields: &[
        FieldDef::text("id", "id", 36).system(),
        FieldDef::text("title", "title", 200).required(),
        FieldDef::text("slug", "slug", 200),
        FieldDef::text("description", "description", 10_000),
        FieldDef::object("company", "company"),
        FieldDef::text("type", "job_type", 50).required(),
        FieldDef::text("workMode", "work_mode", 50),
        FieldDef::text("experience", "experience", 50),
        FieldDef::text("location", "location", 200),
        FieldDef::new("salaryMin", "salary_min", FieldKind::I64),
        FieldDef::new("salaryMax", "salary_max", FieldKind::I64),
        FieldDef::text("currency", "currency", 10),
        FieldDef::text("applyUrl", "apply_url", 2048),
        FieldDef::text("image", "image", 2048),
        FieldDef::new("views", "views", FieldKind::I64),
        FieldDef::sequence("tags", "tags"),
        FieldDef::sequence("requirements", "requirements"),
        FieldDef::sequence("responsibilities", "responsibilities"),
        FieldDef::sequence("benefits", "benefits"),
        FieldDef::text("visibility", "visibility", 20),
        FieldDef::new("createdAt", "created_at", FieldKind::DateTimeUtc).system(),
        FieldDef::new("updatedAt", "updated_at", FieldKind::DateTimeUtc).system(),
    ],
    search: &["title", "company", "tags"],
    sorts: &[
        SortRule {
            key: SortKey::Newest,
            order: &[OrderKey::desc("created_at")],
        },
        SortRule {
            key: SortKey::Oldest,
            order: &[OrderKey::asc("created_at")],
        },
        SortRule {
            key: SortKey::Popularity,
            order: &[OrderKey::desc("views")],
        },
        SortRule {
            key: SortKey::Salary,
            order: &[OrderKey::desc("salary_max"), OrderKey::desc("salary_min")],
        },
        SortRule {
            key: SortKey::Title,
            order: &[OrderKey::asc("title")],
        },
    ],
    default_limit: 10,
    max_limit: 100,
    asset_field: Some("image"),
    unique: &["slug"],
};
