use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Panduan,
    Data,
    Memo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Ppt,
    Excel,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Section {
    /// Password-gated.
    Internal,
    /// Public.
    #[default]
    Eksternal,
}

/// Category selection in the catalog view; `All` disables the predicate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Panduan,
    Data,
    Memo,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Panduan, Category::Data, Category::Memo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Panduan => "Panduan",
            Category::Data => "Data",
            Category::Memo => "Memo",
        }
    }
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Pdf, FileType::Ppt, FileType::Excel];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Ppt => "ppt",
            FileType::Excel => "excel",
        }
    }
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Internal, Section::Eksternal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Internal => "Internal",
            Section::Eksternal => "Eksternal",
        }
    }

    pub fn is_gated(&self) -> bool {
        matches!(self, Section::Internal)
    }
}

impl CategoryFilter {
    /// Options in the order the category bar lists them.
    pub const ALL: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Panduan,
        CategoryFilter::Data,
        CategoryFilter::Memo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Panduan => "Panduan",
            CategoryFilter::Data => "Data",
            CategoryFilter::Memo => "Memo",
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Panduan => category == Category::Panduan,
            CategoryFilter::Data => category == Category::Data,
            CategoryFilter::Memo => category == Category::Memo,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        match category {
            Category::Panduan => CategoryFilter::Panduan,
            Category::Data => CategoryFilter::Data,
            Category::Memo => CategoryFilter::Memo,
        }
    }
}

fn parse_variant<T: Copy>(
    s: &str,
    kind: &str,
    variants: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T, String> {
    variants
        .iter()
        .find(|v| name(*v).eq_ignore_ascii_case(s.trim()))
        .copied()
        .ok_or_else(|| format!("Invalid {}: {}", kind, s))
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "category", &Category::ALL, Category::as_str)
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "file type", &FileType::ALL, FileType::as_str)
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "section", &Section::ALL, Section::as_str)
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "category filter", &CategoryFilter::ALL, CategoryFilter::as_str)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry as stored in the `documents` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub file_type: FileType,
    pub section: Section,
    pub thumbnail_url: Option<String>,
    pub download_url: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Editable fields of a record; everything except identity and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFields {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub file_type: FileType,
    pub section: Section,
    pub thumbnail_url: Option<String>,
    pub download_url: String,
}

impl DocumentRecord {
    pub fn new(fields: DocumentFields) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), fields, Utc::now())
    }

    pub fn with_id(id: String, fields: DocumentFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            category: fields.category,
            file_type: fields.file_type,
            section: fields.section,
            thumbnail_url: fields.thumbnail_url,
            download_url: fields.download_url,
            created_at,
        }
    }

    /// Replaces every editable field, keeping `id` and `created_at`.
    pub fn replace_fields(&mut self, fields: DocumentFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.category = fields.category;
        self.file_type = fields.file_type;
        self.section = fields.section;
        self.thumbnail_url = fields.thumbnail_url;
        self.download_url = fields.download_url;
    }
}
