use crate::field::{FacetField, FieldDef, FieldKind};
use crate::kind::ListingKind;
use crate::schema::ListingSchema;
use crate::sort::{OrderKey, SortKey, SortRule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CourseFacet {
    Platform,
    Category,
    Level,
}

impl FacetField for CourseFacet {
    const KIND: ListingKind = ListingKind::Courses;
    const FIELDS: &'static [Self] = &[Self::Platform, Self::Category, Self::Level];

    fn name(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Category => "category",
            Self::Level => "level",
        }
    }

    fn column(&self) -> &'static str {
        self.name()
    }
}

pub static SCHEMA: ListingSchema = ListingSchema {
    kind: ListingKind::Courses,
    collection: "courses",
    fields: &[
        FieldDef::text("id", "id", 36).system(),
        FieldDef::text("title", "title", 200).required(),
        FieldDef::text("slug", "slug", 200),
        FieldDef::text("description", "description", 10_000),
        FieldDef::text("platform", "platform", 100).required(),
        FieldDef::text("category", "category", 100),
        FieldDef::text("level", "level", 50),
        FieldDef::text("language", "language", 50),
        FieldDef::new("price", "price", FieldKind::F64),
        FieldDef::new("rating", "rating", FieldKind::F64),
        FieldDef::new("enrollments", "enrollments", FieldKind::I64),
        FieldDef::new("durationHours", "duration_hours", FieldKind::F64),
        FieldDef::new("isFree", "is_free", FieldKind::Bool),
        FieldDef::text("url", "url", 2048),
        FieldDef::text("image", "image", 2048),
        FieldDef::object("instructor", "instructor"),
        FieldDef::sequence("tags", "tags"),
        FieldDef::sequence("requirements", "requirements"),
        FieldDef::sequence("learningOutcomes", "learning_outcomes"),
        FieldDef::text("visibility", "visibility", 20),
        FieldDef::new("createdAt", "created_at", FieldKind::DateTimeUtc).system(),
        FieldDef::new("updatedAt", "updated_at", FieldKind::DateTimeUtc).system(),
    ],
    search: &["title", "instructor", "tags"],
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
            order: &[OrderKey::desc("enrollments")],
        },
        SortRule {
            key: SortKey::Rating,
            order: &[OrderKey::desc("rating")],
        },
        SortRule {
            key: SortKey::PriceLow,
            order: &[OrderKey::asc("price")],
        },
        SortRule {
            key: SortKey::PriceHigh,
            order: &[OrderKey::desc("price")],
        },
        SortRule {
            key: SortKey::Title,
            order: &[OrderKey::asc("title")],
        },
    ],
    default_limit: 12,
    max_limit: 100,
    asset_field: Some("image"),
    unique: &["slug"],
};
