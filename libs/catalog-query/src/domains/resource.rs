use crate::field::{FacetField, FieldDef, FieldKind};
use crate::kind::ListingKind;
use crate::schema::ListingSchema;
use crate::sort::{OrderKey, SortKey, SortRule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceFacet {
    Type,
    Category,
    Level,
}

impl FacetField for ResourceFacet {
    const KIND: ListingKind = ListingKind::Resources;
    const FIELDS: &'static [Self] = &[Self::Type, Self::Category, Self::Level];

    fn name(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Category => "category",
            Self::Level => "level",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Type => "resource_type",
            Self::Category => "category",
            Self::Level => "level",
        }
    }
}

pub static SCHEMA: ListingSchema = ListingSchema {
    kind: ListingKind::Resources,
    collection: "resources",
    fields: &[
        FieldDef::text("id", "id", 36).system(),
        FieldDef::text("title", "title", 200).required(),
        FieldDef::text("slug", "slug", 200),
        FieldDef::text("description", "description", 10_000),
        FieldDef::object("author", "author"),
        FieldDef::text("type", "resource_type", 50).required(),
        FieldDef::text("category", "category", 100),
        FieldDef::text("level", "level", 50),
        FieldDef::text("format", "format", 50),
        FieldDef::text("url", "url", 2048),
        FieldDef::text("image", "image", 2048),
        FieldDef::new("isFree", "is_free", FieldKind::Bool),
        FieldDef::new("rating", "rating", FieldKind::F64),
        FieldDef::new("downloads", "downloads", FieldKind::I64),
        FieldDef::sequence("topics", "topics"),
        FieldDef::sequence("tags", "tags"),
        FieldDef::text("visibility", "visibility", 20),
        FieldDef::new("createdAt", "created_at", FieldKind::DateTimeUtc).system(),
        FieldDef::new("updatedAt", "updated_at", FieldKind::DateTimeUtc).system(),
    ],
    search: &["title", "author", "tags"],
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
            order: &[OrderKey::desc("downloads")],
        },
        SortRule {
            key: SortKey::Rating,
            order: &[OrderKey::desc("rating")],
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
