//! Ensaio (photo shoot) entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// An ensaio row from the `ensaios` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ensaio {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub shoot_date: Option<NaiveDate>,
    pub status: String,
    pub created_by_id: DbId,
    pub subject_cpf: String,
    pub cover_image_key: Option<String>,
    pub term_pdf_key: Option<String>,
    pub sync_folder_url: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A photo belonging to an ensaio.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnsaioPhoto {
    pub id: DbId,
    pub ensaio_id: DbId,
    pub storage_key: String,
    pub sort_order: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new ensaio.
#[derive(Debug, Clone)]
pub struct CreateEnsaio {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub shoot_date: Option<NaiveDate>,
    /// Defaults to `PUBLISHED` if omitted.
    pub status: Option<String>,
    pub created_by_id: DbId,
    pub subject_cpf: String,
    pub cover_image_key: Option<String>,
    pub term_pdf_key: Option<String>,
    pub sync_folder_url: Option<String>,
}

/// DTO for updating an existing ensaio. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEnsaio {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub shoot_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub cover_image_key: Option<String>,
    pub term_pdf_key: Option<String>,
    pub sync_folder_url: Option<String>,
}

/// New sort position for one photo.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PhotoOrder {
    pub id: DbId,
    pub sort_order: i32,
}
