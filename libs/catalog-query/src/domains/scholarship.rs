use crate::field::{FacetField, FieldDef, FieldKind};
use crate::kind::ListingKind;
use crate::schema::ListingSchema;
use crate::sort::{OrderKey, SortKey, SortRule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScholarshipFacet {
    Country,
    DegreeLevel,
    FundingType,
}

impl FacetField for ScholarshipFacet {
    const KIND: ListingKind = ListingKind::Scholarships;
    const FIELDS: &'static [Self] = &[Self::Country, Self::DegreeLevel, Self::FundingType];

    fn name(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::DegreeLevel => "degreeLevel",
            Self::FundingType => "fundingType",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::DegreeLevel => "degree_level",
            Self::FundingType => "funding_type",
        }
    }
}

pub static SCHEMA: ListingSchema = ListingSchema {
    kind: ListingKind::Scholarships,
    collection: "scholarships",
    fields: &[
        FieldDef::text("id", "id", 36).system(),
        FieldDef::text("title", "title", 200).required(),
        FieldDef::text("slug", "slug", 200),
        FieldDef::text("description", "description", 10_000),
        FieldDef::object("provider", "provider"),
        FieldDef::text("country", "country", 100).required(),
        FieldDef::text("degreeLevel", "degree_level", 50),
        FieldDef::text("fundingType", "funding_type", 50),
        FieldDef::new("amount", "amount", FieldKind::F64),
        FieldDef::text("currency", "currency", 10),
        // ISO date, so lexical order is chronological
        FieldDef::text("deadline", "deadline", 32),
        FieldDef::text("applyUrl", "apply_url", 2048),
        FieldDef::text("image", "image", 2048),
        FieldDef::new("views", "views", FieldKind::I64),
        FieldDef::sequence("eligibility", "eligibility"),
        FieldDef::sequence("benefits", "benefits"),
        FieldDef::sequence("tags", "tags"),
        FieldDef::text("visibility", "visibility", 20),
        FieldDef::new("createdAt", "created_at", FieldKind::DateTimeUtc).system(),
        FieldDef::new("updatedAt", "updated_at", FieldKind::DateTimeUtc).system(),
    ],
    search: &["title", "provider", "tags"],
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
            key: SortKey::Deadline,
            order: &[OrderKey::asc("deadline")],
        },
        SortRule {
            key: SortKey::Amount,
            order: &[OrderKey::desc("amount")],
        },
        SortRule {
            key: SortKey::Popularity,
            order: &[OrderKey::desc("views")],
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
