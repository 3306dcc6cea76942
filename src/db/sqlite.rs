use crate::db::models::{
    BackgroundType, Button, DEFAULT_OVERLAY_OPACITY, Link, PageSnapshot, User,
};
use crate::db::schema::{EXTENDED_USER_COLUMNS, SQLITE_INIT};
use crate::error::BiolinkError;
use crate::types::payload::{
    ButtonInput, LinkInput, ProfileInput, non_blank, validate_buttons, validate_links,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{info, warn};

pub type SqlitePool = Pool<Sqlite>;

const LINK_COLUMNS: &str =
    "id, user_id, title, url, icon_url, order_index, created_at, updated_at";
const BUTTON_COLUMNS: &str = "id, user_id, label, url, order_index, created_at, updated_at";

/// Repository for the profile, its links and its buttons. Every query is
/// scoped to `owner_id`.
#[derive(Clone)]
pub struct ProfileStore {
    pool: SqlitePool,
    owner_id: i64,
}

impl ProfileStore {
    pub fn new(pool: SqlitePool, owner_id: i64) -> Self {
        Self { pool, owner_id }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str, owner_id: i64) -> Result<Self, BiolinkError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let store = Self::new(pool, owner_id);
        store.init_schema().await?;
        Ok(store)
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BiolinkError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn fetch_user(&self) -> Result<Option<User>, BiolinkError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ? LIMIT 1")
            .bind(self.owner_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_user).transpose()
    }

    /// Update the profile in place, creating it on first save.
    ///
    /// Databases created before the background image columns existed reject
    /// the full statement; the save is then retried with the base columns and
    /// the image/overlay fields are dropped.
    pub async fn save_profile(&self, input: &ProfileInput) -> Result<User, BiolinkError> {
        input.validate()?;
        match self.save_profile_full(input).await {
            Err(BiolinkError::DatabaseError(e)) if is_missing_extended_column(&e) => {
                warn!(error = %e, "background image columns not found; saving base profile fields");
                self.save_profile_base(input).await
            }
            other => other,
        }
    }

    async fn save_profile_full(&self, input: &ProfileInput) -> Result<User, BiolinkError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE users SET
                name = ?,
                bio = ?,
                profile_image_url = ?,
                background_color = ?,
                background_type = ?,
                background_image_url = ?,
                background_overlay_opacity = ?,
                updated_at = ?
              WHERE id = ?
              RETURNING *"#,
        )
        .bind(input.name.trim())
        .bind(input.bio.as_deref())
        .bind(non_blank(input.profile_image_url.as_deref()))
        .bind(input.background_color())
        .bind(input.background_type().as_str())
        .bind(input.background_image_url())
        .bind(input.overlay_opacity())
        .bind(&now)
        .bind(self.owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match updated {
            Some(row) => row,
            None => {
                sqlx::query(
                    r#"INSERT INTO users (
                        id, name, bio, profile_image_url, background_color, background_type,
                        background_image_url, background_overlay_opacity, created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING *"#,
                )
                .bind(self.owner_id)
                .bind(input.name.trim())
                .bind(input.bio.as_deref())
                .bind(non_blank(input.profile_image_url.as_deref()))
                .bind(input.background_color())
                .bind(input.background_type().as_str())
                .bind(input.background_image_url())
                .bind(input.overlay_opacity())
                .bind(&now)
                .bind(&now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let user = Self::row_to_user(row)?;
        tx.commit().await?;
        Ok(user)
    }

    async fn save_profile_base(&self, input: &ProfileInput) -> Result<User, BiolinkError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE users SET
                name = ?,
                bio = ?,
                profile_image_url = ?,
                background_color = ?,
                background_type = ?,
                updated_at = ?
              WHERE id = ?
              RETURNING *"#,
        )
        .bind(input.name.trim())
        .bind(input.bio.as_deref())
        .bind(non_blank(input.profile_image_url.as_deref()))
        .bind(input.background_color())
        .bind(input.background_type().as_str())
        .bind(&now)
        .bind(self.owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match updated {
            Some(row) => row,
            None => {
                sqlx::query(
                    r#"INSERT INTO users (
                        id, name, bio, profile_image_url, background_color, background_type,
                        created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING *"#,
                )
                .bind(self.owner_id)
                .bind(input.name.trim())
                .bind(input.bio.as_deref())
                .bind(non_blank(input.profile_image_url.as_deref()))
                .bind(input.background_color())
                .bind(input.background_type().as_str())
                .bind(&now)
                .bind(&now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let user = Self::row_to_user(row)?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn list_links(&self) -> Result<Vec<Link>, BiolinkError> {
        let rows = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE user_id = ? ORDER BY order_index ASC"
        ))
        .bind(self.owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_link).collect()
    }

    /// Replace every link of the owner with `links`, in one transaction.
    /// `order_index` is the array position; nothing is touched when any entry is invalid.
    pub async fn replace_links(&self, links: &[LinkInput]) -> Result<Vec<Link>, BiolinkError> {
        validate_links(links)?;
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM links WHERE user_id = ?")
            .bind(self.owner_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut saved = Vec::with_capacity(links.len());
        for (index, link) in links.iter().enumerate() {
            let row = sqlx::query(&format!(
                "INSERT INTO links (user_id, title, url, icon_url, order_index, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 RETURNING {LINK_COLUMNS}"
            ))
            .bind(self.owner_id)
            .bind(link.title.trim())
            .bind(link.url.trim())
            .bind(non_blank(link.icon_url.as_deref()))
            .bind(index as i64)
            .bind(&now)
            .bind(&now)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(Self::row_to_link(row)?);
        }

        tx.commit().await?;
        info!(removed, inserted = saved.len(), "links replaced");
        Ok(saved)
    }

    pub async fn list_buttons(&self) -> Result<Vec<Button>, BiolinkError> {
        let rows = sqlx::query(&format!(
            "SELECT {BUTTON_COLUMNS} FROM buttons WHERE user_id = ? ORDER BY order_index ASC"
        ))
        .bind(self.owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_button).collect()
    }

    /// Replace every button of the owner with `buttons`, in one transaction.
    pub async fn replace_buttons(
        &self,
        buttons: &[ButtonInput],
    ) -> Result<Vec<Button>, BiolinkError> {
        validate_buttons(buttons)?;
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM buttons WHERE user_id = ?")
            .bind(self.owner_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut saved = Vec::with_capacity(buttons.len());
        for (index, button) in buttons.iter().enumerate() {
            let row = sqlx::query(&format!(
                "INSERT INTO buttons (user_id, label, url, order_index, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 RETURNING {BUTTON_COLUMNS}"
            ))
            .bind(self.owner_id)
            .bind(button.label.trim())
            .bind(button.url.trim())
            .bind(index as i64)
            .bind(&now)
            .bind(&now)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(Self::row_to_button(row)?);
        }

        tx.commit().await?;
        info!(removed, inserted = saved.len(), "buttons replaced");
        Ok(saved)
    }

    /// Profile, buttons and links read concurrently.
    pub async fn snapshot(&self) -> Result<PageSnapshot, BiolinkError> {
        let (user, buttons, links) =
            futures::try_join!(self.fetch_user(), self.list_buttons(), self.list_links())?;
        Ok(PageSnapshot {
            user,
            buttons,
            links,
        })
    }

    fn row_to_user(row: SqliteRow) -> Result<User, BiolinkError> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let bio: Option<String> = row.try_get("bio")?;
        let profile_image_url: Option<String> = row.try_get("profile_image_url")?;
        let background_color: String = row.try_get("background_color")?;
        let background_type_str: String = row.try_get("background_type")?;
        let background_image_url =
            optional_column::<Option<String>>(&row, "background_image_url")?.flatten();
        let background_overlay_opacity: f64 = optional_column(&row, "background_overlay_opacity")?
            .unwrap_or(DEFAULT_OVERLAY_OPACITY);
        let created_at = parse_timestamp(row.try_get("created_at")?)?;
        let updated_at = parse_timestamp(row.try_get("updated_at")?)?;

        // unknown values written by older tooling render as a solid background
        let background_type = background_type_str.parse().unwrap_or(BackgroundType::Solid);

        Ok(User {
            id,
            name,
            bio,
            profile_image_url,
            background_color,
            background_type,
            background_image_url,
            background_overlay_opacity,
            created_at,
            updated_at,
        })
    }

    fn row_to_link(row: SqliteRow) -> Result<Link, BiolinkError> {
        Ok(Link {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            url: row.try_get("url")?,
            icon_url: row.try_get("icon_url")?,
            order_index: row.try_get("order_index")?,
            created_at: parse_timestamp(row.try_get("created_at")?)?,
            updated_at: parse_timestamp(row.try_get("updated_at")?)?,
        })
    }

    fn row_to_button(row: SqliteRow) -> Result<Button, BiolinkError> {
        Ok(Button {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            label: row.try_get("label")?,
            url: row.try_get("url")?,
            order_index: row.try_get("order_index")?,
            created_at: parse_timestamp(row.try_get("created_at")?)?,
            updated_at: parse_timestamp(row.try_get("updated_at")?)?,
        })
    }
}

fn is_missing_extended_column(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            let msg = db.message();
            EXTENDED_USER_COLUMNS.iter().any(|col| msg.contains(col))
        }
        _ => false,
    }
}

/// `Ok(None)` when the column is absent from the row (legacy schema).
fn optional_column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<Option<T>, sqlx::Error>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    match row.try_get::<T, _>(name) {
        Ok(v) => Ok(Some(v)),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn parse_timestamp(raw: String) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
