use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use sqlx::{
    FromRow, PgPool, Postgres,
    postgres::PgRow,
    query_builder::{QueryBuilder, Separated},
};
use uuid::Uuid;

use crate::models::{
    Administrator, Document, Education, Experience, Message, Profile, Project, Skill,
};

/// RepoError
///
/// Storage unavailability or a failed statement. Handlers surface it as a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// SortSpec
///
/// Ordered `(column, direction)` pairs. Columns are compile-time constants owned by the
/// models, never client input, so rendering them straight into SQL is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(&'static str, Direction)>,
}

impl SortSpec {
    pub fn asc(column: &'static str) -> Self {
        Self {
            keys: vec![(column, Direction::Asc)],
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            keys: vec![(column, Direction::Desc)],
        }
    }

    pub fn then_asc(mut self, column: &'static str) -> Self {
        self.keys.push((column, Direction::Asc));
        self
    }

    pub fn then_desc(mut self, column: &'static str) -> Self {
        self.keys.push((column, Direction::Desc));
        self
    }

    pub fn keys(&self) -> &[(&'static str, Direction)] {
        &self.keys
    }

    pub fn to_sql(&self) -> String {
        let keys = self
            .keys
            .iter()
            .map(|(column, direction)| format!("{column} {}", direction.as_sql()))
            .collect::<Vec<_>>();
        format!("ORDER BY {}", keys.join(", "))
    }
}

/// Repository Trait
///
/// The persistence contract for one content entity kind. Handlers only ever see
/// `Arc<dyn Repository<T>>`, so tests swap in an in-memory implementation.
/// Validation is not performed here: documents arrive already checked by the service.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// Every stored document in the given order. Empty when nothing is stored.
    async fn list_all(&self, sort: &SortSpec) -> Result<Vec<T>, RepoError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError>;

    async fn insert(&self, doc: &T) -> Result<T, RepoError>;

    /// Replaces the stored document with the same id. `None` when it no longer exists.
    async fn update(&self, doc: &T) -> Result<Option<T>, RepoError>;

    /// `true` when a row was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// ProfileRepository
///
/// Storage for the singleton profile. Both operations are single atomic statements
/// keyed on the `singleton` guard column, so concurrent first reads cannot create two
/// profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Inserts `placeholder` unless a profile already exists, then returns the stored one.
    async fn get_or_create(&self, placeholder: &Profile) -> Result<Profile, RepoError>;

    /// Creates the profile or overwrites the existing one.
    async fn save(&self, profile: &Profile) -> Result<Profile, RepoError>;
}

/// AdminRepository
///
/// The credential store.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Lookup by (already normalised) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Administrator>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Administrator>, RepoError>;

    async fn insert(&self, admin: &Administrator) -> Result<Administrator, RepoError>;
}

pub type RepositoryState<T> = Arc<dyn Repository<T>>;
pub type ProfileRepositoryState = Arc<dyn ProfileRepository>;
pub type AdminRepositoryState = Arc<dyn AdminRepository>;

// --- Postgres ---

/// PgRecord
///
/// Row mapping for a table. `COLUMNS` starts with `id` and lists every writable column
/// in the same order `push_values` binds them.
pub trait PgRecord: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>);
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_query<T: PgRecord>(doc: &T) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        T::TABLE,
        column_list(T::COLUMNS)
    ));
    doc.push_values(&mut builder.separated(", "));
    builder.push(") RETURNING *");
    builder
}

fn update_query<T: PgRecord>(id: Uuid, doc: &T) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "UPDATE {} SET ({}) = ROW(",
        T::TABLE,
        column_list(T::COLUMNS)
    ));
    doc.push_values(&mut builder.separated(", "));
    builder.push(") WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    builder
}

/// PgRepository
///
/// `Repository<T>` over one PostgreSQL table.
pub struct PgRepository<T> {
    pool: PgPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Repository<T> for PgRepository<T>
where
    T: Document + PgRecord,
{
    async fn list_all(&self, sort: &SortSpec) -> Result<Vec<T>, RepoError> {
        let sql = format!("SELECT * FROM {} {}", T::TABLE, sort.to_sql());
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, doc: &T) -> Result<T, RepoError> {
        let mut builder = insert_query(doc);
        let row = builder.build_query_as::<T>().fetch_one(&self.pool).await?;
        Ok(row)
    }

    async fn update(&self, doc: &T) -> Result<Option<T>, RepoError> {
        let mut builder = update_query(doc.id(), doc);
        let row = builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepoError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

/// PgProfileRepository
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn upsert_query(profile: &Profile, on_conflict: &str) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {} (\"singleton\", {}) VALUES (TRUE, ",
            Profile::TABLE,
            column_list(Profile::COLUMNS)
        ));
        profile.push_values(&mut builder.separated(", "));
        builder.push(") ON CONFLICT (singleton) ");
        builder.push(on_conflict);
        builder
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get_or_create(&self, placeholder: &Profile) -> Result<Profile, RepoError> {
        Self::upsert_query(placeholder, "DO NOTHING")
            .build()
            .execute(&self.pool)
            .await?;

        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE singleton")
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<Profile, RepoError> {
        // The stored id and creation time survive an overwrite.
        let mutable = Profile::COLUMNS
            .iter()
            .filter(|column| !matches!(**column, "id" | "created_at"))
            .copied()
            .collect::<Vec<_>>();
        let excluded = mutable
            .iter()
            .map(|column| format!("EXCLUDED.\"{column}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let on_conflict = format!(
            "DO UPDATE SET ({}) = ROW({excluded}) RETURNING *",
            column_list(&mutable)
        );

        let mut builder = Self::upsert_query(profile, &on_conflict);
        let saved = builder
            .build_query_as::<Profile>()
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }
}

/// PgAdminRepository
pub struct PgAdminRepository {
    pool: PgPool,
}

impl PgAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for PgAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Administrator>, RepoError> {
        let admin = sqlx::query_as::<_, Administrator>("SELECT * FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Administrator>, RepoError> {
        let admin = sqlx::query_as::<_, Administrator>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn insert(&self, admin: &Administrator) -> Result<Administrator, RepoError> {
        let admin = sqlx::query_as::<_, Administrator>(
            r#"
            INSERT INTO admins (id, username, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(admin.id)
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.role)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(admin)
    }
}

// --- Table mappings ---

impl PgRecord for Project {
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "technologies",
        "image",
        "images",
        "live_url",
        "github_url",
        "featured",
        "details",
        "sort_order",
        "created_at",
        "updated_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.id)
            .push_bind(self.title.clone())
            .push_bind(self.description.clone())
            .push_bind(self.technologies.clone())
            .push_bind(self.image.clone())
            .push_bind(self.images.clone())
            .push_bind(self.live_url.clone())
            .push_bind(self.github_url.clone())
            .push_bind(self.featured)
            .push_bind(self.details.clone())
            .push_bind(self.order)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Skill {
    const TABLE: &'static str = "skills";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "category",
        "level",
        "icon",
        "sort_order",
        "created_at",
        "updated_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.id)
            .push_bind(self.name.clone())
            .push_bind(self.category.as_str())
            .push_bind(self.level)
            .push_bind(self.icon.clone())
            .push_bind(self.order)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Experience {
    const TABLE: &'static str = "experiences";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "company",
        "position",
        "location",
        "description",
        "start_date",
        "end_date",
        "current",
        "sort_order",
        "created_at",
        "updated_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.id)
            .push_bind(self.company.clone())
            .push_bind(self.position.clone())
            .push_bind(self.location.clone())
            .push_bind(self.description.clone())
            .push_bind(self.start_date)
            .push_bind(self.end_date)
            .push_bind(self.current)
            .push_bind(self.order)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Education {
    const TABLE: &'static str = "education";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "institution",
        "degree",
        "field_of_study",
        "start_date",
        "end_date",
        "current",
        "grade",
        "description",
        "sort_order",
        "created_at",
        "updated_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.id)
            .push_bind(self.institution.clone())
            .push_bind(self.degree.clone())
            .push_bind(self.field_of_study.clone())
            .push_bind(self.start_date)
            .push_bind(self.end_date)
            .push_bind(self.current)
            .push_bind(self.grade.clone())
            .push_bind(self.description.clone())
            .push_bind(self.order)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Message {
    const TABLE: &'static str = "messages";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "subject",
        "message",
        "read",
        "created_at",
        "updated_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.id)
            .push_bind(self.name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.subject.clone())
            .push_bind(self.message.clone())
            .push_bind(self.read)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Profile {
    const TABLE: &'static str = "profiles";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "title",
        "bio",
        "email",
        "phone",
        "location",
        "avatar",
        "resume",
        "github",
        "linkedin",
        "twitter",
        "facebook",
        "instagram",
        "created_at",
        "updated_at",
    ];

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.id)
            .push_bind(self.name.clone())
            .push_bind(self.title.clone())
            .push_bind(self.bio.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.location.clone())
            .push_bind(self.avatar.clone())
            .push_bind(self.resume.clone())
            .push_bind(self.social.github.clone())
            .push_bind(self.social.linkedin.clone())
            .push_bind(self.social.twitter.clone())
            .push_bind(self.social.facebook.clone())
            .push_bind(self.social.instagram.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}
