//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ArtworkId, UserId};
use sqlx::PgPool;

use crate::domain::entities::{Artwork, ArtworkView, Rating};
use crate::domain::repository::{ArtworkRepository, RatingRepository};
use crate::error::{ArtworkError, ArtworkResult};

/// Artwork columns plus aggregates
///
/// `$1` is the viewer id (NULL for anonymous). The viewer's rating is joined
/// separately; the unique constraint keeps it to at most one row, so the
/// aggregate counts are unaffected.
const VIEW_SELECT: &str = r#"
    SELECT o.id,
           o.nombre,
           o.descripcion,
           o."tipoArte" AS tipo_arte,
           o."archivoJPG" AS archivo_jpg,
           o.publicada,
           o.fecha,
           o.autor_id,
           u."userName" AS autor_nombre,
           ROUND(AVG(v.puntuacion)::numeric, 2)::float8 AS promedio_valoracion,
           COUNT(v.id) AS cantidad_valoraciones,
           MAX(mv.puntuacion) AS puntuacion_usuario
    FROM obras o
    JOIN usuarios u ON u.id = o.autor_id
    LEFT JOIN valoraciones v ON v.obra_id = o.id
    LEFT JOIN valoraciones mv ON mv.obra_id = o.id AND mv.usuario_id = $1
"#;

const VIEW_GROUP: &str = r#"GROUP BY o.id, u."userName""#;

fn view_query(filter: &str, order: &str) -> String {
    format!("{VIEW_SELECT} WHERE {filter} {VIEW_GROUP} {order}")
}

/// PostgreSQL-backed artwork and rating repository
#[derive(Clone)]
pub struct PgArtworkRepository {
    pool: PgPool,
}

impl PgArtworkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_views(
        &self,
        filter: &str,
        viewer: Option<&UserId>,
        filter_arg: Option<String>,
    ) -> ArtworkResult<Vec<ArtworkView>> {
        let sql = view_query(filter, "ORDER BY o.fecha DESC");
        let mut query = sqlx::query_as::<_, ArtworkViewRow>(&sql).bind(viewer.map(|v| v.to_string()));
        if let Some(arg) = filter_arg {
            query = query.bind(arg);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(ArtworkViewRow::into_view).collect()
    }
}

// ============================================================================
// Artwork Repository Implementation
// ============================================================================

impl ArtworkRepository for PgArtworkRepository {
    async fn create(&self, artwork: &Artwork) -> ArtworkResult<()> {
        sqlx::query(
            r#"
            INSERT INTO obras (id, nombre, descripcion, "tipoArte", "archivoJPG", publicada, fecha, autor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(artwork.id.to_string())
        .bind(&artwork.nombre)
        .bind(&artwork.descripcion)
        .bind(&artwork.tipo_arte)
        .bind(&artwork.archivo_jpg)
        .bind(artwork.publicada)
        .bind(artwork.fecha)
        .bind(artwork.autor_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_view(
        &self,
        id: &ArtworkId,
        viewer: Option<&UserId>,
    ) -> ArtworkResult<Option<ArtworkView>> {
        let sql = view_query("o.id = $2", "");
        let row = sqlx::query_as::<_, ArtworkViewRow>(&sql)
            .bind(viewer.map(|v| v.to_string()))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ArtworkViewRow::into_view).transpose()
    }

    async fn list_by_author(&self, author: &UserId) -> ArtworkResult<Vec<ArtworkView>> {
        self.fetch_views("o.autor_id = $2", Some(author), Some(author.to_string()))
            .await
    }

    async fn list_published(&self, viewer: Option<&UserId>) -> ArtworkResult<Vec<ArtworkView>> {
        self.fetch_views("o.publicada = TRUE", viewer, None).await
    }

    async fn list_all(&self) -> ArtworkResult<Vec<Artwork>> {
        let rows = sqlx::query_as::<_, ArtworkRow>(
            r#"
            SELECT id, nombre, descripcion, "tipoArte" AS tipo_arte, "archivoJPG" AS archivo_jpg,
                   publicada, fecha, autor_id
            FROM obras
            ORDER BY fecha DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ArtworkRow::into_artwork).collect()
    }

    async fn set_published(
        &self,
        id: &ArtworkId,
        owner: &UserId,
        publicada: bool,
    ) -> ArtworkResult<bool> {
        let result = sqlx::query("UPDATE obras SET publicada = $1 WHERE id = $2 AND autor_id = $3")
            .bind(publicada)
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: &ArtworkId, owner: &UserId) -> ArtworkResult<bool> {
        // valoraciones rows go with ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM obras WHERE id = $1 AND autor_id = $2")
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Rating Repository Implementation
// ============================================================================

impl RatingRepository for PgArtworkRepository {
    async fn add(&self, rating: &Rating) -> ArtworkResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO valoraciones (id, puntuacion, obra_id, usuario_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(rating.id.to_string())
        .bind(i32::from(rating.puntuacion))
        .bind(rating.obra_id.to_string())
        .bind(rating.usuario_id.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ArtworkError::AlreadyRated)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(ArtworkError::ArtworkNotFound)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_check_violation() => {
                Err(ArtworkError::InvalidScore)
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ArtworkRow {
    id: String,
    nombre: String,
    descripcion: String,
    tipo_arte: String,
    archivo_jpg: String,
    publicada: bool,
    fecha: DateTime<Utc>,
    autor_id: String,
}

impl ArtworkRow {
    fn into_artwork(self) -> ArtworkResult<Artwork> {
        let id = self
            .id
            .parse::<ArtworkId>()
            .map_err(|e| ArtworkError::Internal(format!("Invalid artwork id: {}", e)))?;
        let autor_id = self
            .autor_id
            .parse::<UserId>()
            .map_err(|e| ArtworkError::Internal(format!("Invalid author id: {}", e)))?;

        Ok(Artwork {
            id,
            nombre: self.nombre,
            descripcion: self.descripcion,
            tipo_arte: self.tipo_arte,
            archivo_jpg: self.archivo_jpg,
            publicada: self.publicada,
            fecha: self.fecha,
            autor_id,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ArtworkViewRow {
    #[sqlx(flatten)]
    artwork: ArtworkRow,
    autor_nombre: String,
    promedio_valoracion: Option<f64>,
    cantidad_valoraciones: i64,
    puntuacion_usuario: Option<i32>,
}

impl ArtworkViewRow {
    fn into_view(self) -> ArtworkResult<ArtworkView> {
        Ok(ArtworkView {
            artwork: self.artwork.into_artwork()?,
            autor_nombre: self.autor_nombre,
            promedio_valoracion: self.promedio_valoracion,
            cantidad_valoraciones: self.cantidad_valoraciones,
            ya_valorada: self.puntuacion_usuario.is_some(),
            puntuacion_usuario: self.puntuacion_usuario,
        })
    }
}
