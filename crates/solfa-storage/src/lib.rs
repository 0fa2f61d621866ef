pub mod models;
pub mod schema;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::DatabaseErrorKind;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use uuid::Uuid;

use solfa_core::domain::genre::Genre;
use solfa_core::domain::ids::{AdminId, GenreId, SongId, UserId};
use solfa_core::domain::song::{Song, SongFields};
use solfa_core::domain::user::{AdminRecord, UserRecord};
use solfa_core::ports::accounts::AccountStore;
use solfa_core::ports::catalog::{CatalogError, CatalogStore};

use crate::models::{
  AdminRow, GenreRow, NewAdminRow, NewGenreRow, NewSongRow, NewUserRow, SongChangeset, SongRow,
  UserRow,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Catalog and account store backed by SQLite through an r2d2 pool.
///
/// Clonable: clones share the pool, so one instance can be handed to every
/// service that needs persistence.
#[derive(Clone)]
pub struct SqliteCatalog {
  pool: SqlitePool,
}

impl SqliteCatalog {
  pub fn new(database_url: &str) -> Result<Self, CatalogError> {
    Self::with_pool_size(database_url, 8)
  }

  /// `:memory:` databases need a pool of exactly one connection, otherwise
  /// each checkout would see its own empty database.
  pub fn with_pool_size(database_url: &str, size: u32) -> Result<Self, CatalogError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
      .max_size(size)
      .build(manager)
      .map_err(|e| CatalogError::Storage(e.to_string()))?;

    let mut conn = pool.get().map_err(|e| CatalogError::Storage(e.to_string()))?;
    conn
      .run_pending_migrations(MIGRATIONS)
      .map_err(|e| CatalogError::Storage(e.to_string()))?;

    Ok(Self { pool })
  }

  fn conn(&self) -> Result<Conn, CatalogError> {
    self.pool.get().map_err(|e| CatalogError::Storage(e.to_string()))
  }

  fn load_song(&self, conn: &mut Conn, id: &str) -> Result<Song, CatalogError> {
    let joined: (SongRow, Option<String>) = schema::songs::table
      .left_join(schema::genres::table)
      .select((schema::songs::all_columns, schema::genres::name.nullable()))
      .filter(schema::songs::id.eq(id))
      .first(conn)
      .map_err(map_diesel)?;
    song_from_row(joined)
  }
}

fn map_diesel(err: diesel::result::Error) -> CatalogError {
  match err {
    diesel::result::Error::NotFound => CatalogError::NotFound,
    diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
      CatalogError::Conflict(info.message().to_string())
    }
    other => CatalogError::Storage(other.to_string()),
  }
}

fn parse_uuid(s: &str) -> Result<Uuid, CatalogError> {
  Uuid::parse_str(s).map_err(|_| CatalogError::Storage(format!("invalid uuid in db: {s}")))
}

fn song_from_row((row, genre_name): (SongRow, Option<String>)) -> Result<Song, CatalogError> {
  let genre_id = match &row.genre_id {
    Some(gid) => Some(GenreId::from_uuid(parse_uuid(gid)?)),
    None => None,
  };
  Ok(Song {
    id: SongId::from_uuid(parse_uuid(&row.id)?),
    title: row.title,
    artist: row.artist,
    genre_id,
    genre_name,
    release_year: row.release_year,
    audio_file_path: row.audio_file_path,
    image_path: row.image_path,
  })
}

fn genre_from_row(row: GenreRow) -> Result<Genre, CatalogError> {
  Ok(Genre { id: GenreId::from_uuid(parse_uuid(&row.id)?), name: row.name })
}

fn user_from_row(row: UserRow) -> Result<UserRecord, CatalogError> {
  Ok(UserRecord {
    id: UserId::from_uuid(parse_uuid(&row.id)?),
    email: row.email,
    username: row.username,
    password_hash: row.password_hash,
  })
}

fn admin_from_row(row: AdminRow) -> Result<AdminRecord, CatalogError> {
  Ok(AdminRecord {
    id: AdminId::from_uuid(parse_uuid(&row.id)?),
    email: row.email,
    password_hash: row.password_hash,
  })
}

impl CatalogStore for SqliteCatalog {
  fn list_songs(&self) -> Result<Vec<Song>, CatalogError> {
    let mut conn = self.conn()?;
    let rows: Vec<(SongRow, Option<String>)> = schema::songs::table
      .left_join(schema::genres::table)
      .select((schema::songs::all_columns, schema::genres::name.nullable()))
      .order(schema::songs::created_at.asc())
      .load(&mut conn)
      .map_err(map_diesel)?;
    rows.into_iter().map(song_from_row).collect()
  }

  fn find_song(&self, id: SongId) -> Result<Option<Song>, CatalogError> {
    let mut conn = self.conn()?;
    let joined: Option<(SongRow, Option<String>)> = schema::songs::table
      .left_join(schema::genres::table)
      .select((schema::songs::all_columns, schema::genres::name.nullable()))
      .filter(schema::songs::id.eq(id.to_string()))
      .first(&mut conn)
      .optional()
      .map_err(map_diesel)?;
    joined.map(song_from_row).transpose()
  }

  fn insert_song(&self, fields: &SongFields) -> Result<Song, CatalogError> {
    let mut conn = self.conn()?;
    let id = SongId::new();
    let new_row = NewSongRow {
      id: id.to_string(),
      title: &fields.title,
      artist: &fields.artist,
      genre_id: fields.genre_id.map(|g| g.to_string()),
      release_year: fields.release_year,
      audio_file_path: fields.audio_file_path.as_deref(),
      image_path: fields.image_path.as_deref(),
    };

    diesel::insert_into(schema::songs::table)
      .values(&new_row)
      .execute(&mut conn)
      .map_err(map_diesel)?;

    // Re-read through the join so the caller sees the resolved genre name.
    self.load_song(&mut conn, &new_row.id)
  }

  fn update_song(&self, id: SongId, fields: &SongFields) -> Result<Song, CatalogError> {
    let mut conn = self.conn()?;
    let id_str = id.to_string();
    let changeset = SongChangeset {
      title: &fields.title,
      artist: &fields.artist,
      genre_id: fields.genre_id.map(|g| g.to_string()),
      release_year: fields.release_year,
      audio_file_path: fields.audio_file_path.as_deref(),
      image_path: fields.image_path.as_deref(),
    };

    let affected = diesel::update(schema::songs::table.filter(schema::songs::id.eq(&id_str)))
      .set(&changeset)
      .execute(&mut conn)
      .map_err(map_diesel)?;
    if affected == 0 {
      return Err(CatalogError::NotFound);
    }

    self.load_song(&mut conn, &id_str)
  }

  fn delete_song(&self, id: SongId) -> Result<usize, CatalogError> {
    let mut conn = self.conn()?;
    diesel::delete(schema::songs::table.filter(schema::songs::id.eq(id.to_string())))
      .execute(&mut conn)
      .map_err(map_diesel)
  }

  fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
    let mut conn = self.conn()?;
    let rows: Vec<GenreRow> = schema::genres::table
      .order(schema::genres::name.asc())
      .load(&mut conn)
      .map_err(map_diesel)?;
    rows.into_iter().map(genre_from_row).collect()
  }

  fn find_genre(&self, id: GenreId) -> Result<Option<Genre>, CatalogError> {
    let mut conn = self.conn()?;
    let row: Option<GenreRow> = schema::genres::table
      .filter(schema::genres::id.eq(id.to_string()))
      .first(&mut conn)
      .optional()
      .map_err(map_diesel)?;
    row.map(genre_from_row).transpose()
  }

  fn exists_genre(&self, id: GenreId) -> Result<bool, CatalogError> {
    let mut conn = self.conn()?;
    diesel::select(diesel::dsl::exists(
      schema::genres::table.filter(schema::genres::id.eq(id.to_string())),
    ))
    .get_result(&mut conn)
    .map_err(map_diesel)
  }

  fn insert_genre(&self, name: &str) -> Result<Genre, CatalogError> {
    let mut conn = self.conn()?;
    let new_row = NewGenreRow { id: GenreId::new().to_string(), name };

    let row: GenreRow = diesel::insert_into(schema::genres::table)
      .values(&new_row)
      .get_result(&mut conn)
      .map_err(map_diesel)?;
    genre_from_row(row)
  }

  fn update_genre(&self, id: GenreId, name: &str) -> Result<Genre, CatalogError> {
    let mut conn = self.conn()?;
    let row: GenreRow =
      diesel::update(schema::genres::table.filter(schema::genres::id.eq(id.to_string())))
        .set(schema::genres::name.eq(name))
        .get_result(&mut conn)
        .map_err(map_diesel)?;
    genre_from_row(row)
  }

  fn delete_genre(&self, id: GenreId) -> Result<usize, CatalogError> {
    let mut conn = self.conn()?;
    diesel::delete(schema::genres::table.filter(schema::genres::id.eq(id.to_string())))
      .execute(&mut conn)
      .map_err(map_diesel)
  }

  fn count_songs_by_genre(&self, id: GenreId) -> Result<i64, CatalogError> {
    let mut conn = self.conn()?;
    schema::songs::table
      .filter(schema::songs::genre_id.eq(id.to_string()))
      .count()
      .get_result(&mut conn)
      .map_err(map_diesel)
  }
}

impl AccountStore for SqliteCatalog {
  fn list_users(&self) -> Result<Vec<UserRecord>, CatalogError> {
    let mut conn = self.conn()?;
    let rows: Vec<UserRow> = schema::users::table
      .order(schema::users::created_at.asc())
      .load(&mut conn)
      .map_err(map_diesel)?;
    rows.into_iter().map(user_from_row).collect()
  }

  fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, CatalogError> {
    let mut conn = self.conn()?;
    let row: Option<UserRow> = schema::users::table
      .filter(schema::users::id.eq(id.to_string()))
      .first(&mut conn)
      .optional()
      .map_err(map_diesel)?;
    row.map(user_from_row).transpose()
  }

  fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, CatalogError> {
    let mut conn = self.conn()?;
    let row: Option<UserRow> = schema::users::table
      .filter(schema::users::email.eq(email))
      .first(&mut conn)
      .optional()
      .map_err(map_diesel)?;
    row.map(user_from_row).transpose()
  }

  fn insert_user(
    &self,
    email: &str,
    username: &str,
    password_hash: &str,
  ) -> Result<UserRecord, CatalogError> {
    let mut conn = self.conn()?;
    let new_row = NewUserRow { id: UserId::new().to_string(), email, username, password_hash };

    let row: UserRow = diesel::insert_into(schema::users::table)
      .values(&new_row)
      .get_result(&mut conn)
      .map_err(map_diesel)?;
    user_from_row(row)
  }

  fn update_user(
    &self,
    id: UserId,
    email: &str,
    username: Option<&str>,
    password_hash: Option<&str>,
  ) -> Result<usize, CatalogError> {
    let mut conn = self.conn()?;
    let target = schema::users::table.filter(schema::users::id.eq(id.to_string()));

    // Optional columns keep their stored value when the caller omits them, so
    // the update is built per combination instead of through a changeset.
    let affected = match (username, password_hash) {
      (Some(u), Some(h)) => diesel::update(target)
        .set((
          schema::users::email.eq(email),
          schema::users::username.eq(u),
          schema::users::password_hash.eq(h),
        ))
        .execute(&mut conn),
      (Some(u), None) => diesel::update(target)
        .set((schema::users::email.eq(email), schema::users::username.eq(u)))
        .execute(&mut conn),
      (None, Some(h)) => diesel::update(target)
        .set((schema::users::email.eq(email), schema::users::password_hash.eq(h)))
        .execute(&mut conn),
      (None, None) => {
        diesel::update(target).set(schema::users::email.eq(email)).execute(&mut conn)
      }
    };
    affected.map_err(map_diesel)
  }

  fn delete_user(&self, id: UserId) -> Result<usize, CatalogError> {
    let mut conn = self.conn()?;
    diesel::delete(schema::users::table.filter(schema::users::id.eq(id.to_string())))
      .execute(&mut conn)
      .map_err(map_diesel)
  }

  fn user_email_taken(&self, email: &str, exclude: Option<UserId>) -> Result<bool, CatalogError> {
    let mut conn = self.conn()?;
    let count: i64 = match exclude {
      Some(ex) => schema::users::table
        .filter(schema::users::email.eq(email))
        .filter(schema::users::id.ne(ex.to_string()))
        .count()
        .get_result(&mut conn),
      None => {
        schema::users::table.filter(schema::users::email.eq(email)).count().get_result(&mut conn)
      }
    }
    .map_err(map_diesel)?;
    Ok(count > 0)
  }

  fn username_taken(&self, username: &str, exclude: Option<UserId>) -> Result<bool, CatalogError> {
    let mut conn = self.conn()?;
    let count: i64 = match exclude {
      Some(ex) => schema::users::table
        .filter(schema::users::username.eq(username))
        .filter(schema::users::id.ne(ex.to_string()))
        .count()
        .get_result(&mut conn),
      None => schema::users::table
        .filter(schema::users::username.eq(username))
        .count()
        .get_result(&mut conn),
    }
    .map_err(map_diesel)?;
    Ok(count > 0)
  }

  fn list_admins(&self) -> Result<Vec<AdminRecord>, CatalogError> {
    let mut conn = self.conn()?;
    let rows: Vec<AdminRow> = schema::admins::table
      .order(schema::admins::created_at.asc())
      .load(&mut conn)
      .map_err(map_diesel)?;
    rows.into_iter().map(admin_from_row).collect()
  }

  fn find_admin(&self, id: AdminId) -> Result<Option<AdminRecord>, CatalogError> {
    let mut conn = self.conn()?;
    let row: Option<AdminRow> = schema::admins::table
      .filter(schema::admins::id.eq(id.to_string()))
      .first(&mut conn)
      .optional()
      .map_err(map_diesel)?;
    row.map(admin_from_row).transpose()
  }

  fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminRecord>, CatalogError> {
    let mut conn = self.conn()?;
    let row: Option<AdminRow> = schema::admins::table
      .filter(schema::admins::email.eq(email))
      .first(&mut conn)
      .optional()
      .map_err(map_diesel)?;
    row.map(admin_from_row).transpose()
  }

  fn insert_admin(&self, email: &str, password_hash: &str) -> Result<AdminRecord, CatalogError> {
    let mut conn = self.conn()?;
    let new_row = NewAdminRow { id: AdminId::new().to_string(), email, password_hash };

    let row: AdminRow = diesel::insert_into(schema::admins::table)
      .values(&new_row)
      .get_result(&mut conn)
      .map_err(map_diesel)?;
    admin_from_row(row)
  }

  fn update_admin(
    &self,
    id: AdminId,
    email: &str,
    password_hash: Option<&str>,
  ) -> Result<usize, CatalogError> {
    let mut conn = self.conn()?;
    let target = schema::admins::table.filter(schema::admins::id.eq(id.to_string()));

    let affected = match password_hash {
      Some(h) => diesel::update(target)
        .set((schema::admins::email.eq(email), schema::admins::password_hash.eq(h)))
        .execute(&mut conn),
      None => diesel::update(target).set(schema::admins::email.eq(email)).execute(&mut conn),
    };
    affected.map_err(map_diesel)
  }

  fn delete_admin(&self, id: AdminId) -> Result<usize, CatalogError> {
    let mut conn = self.conn()?;
    diesel::delete(schema::admins::table.filter(schema::admins::id.eq(id.to_string())))
      .execute(&mut conn)
      .map_err(map_diesel)
  }

  fn admin_email_taken(
    &self,
    email: &str,
    exclude: Option<AdminId>,
  ) -> Result<bool, CatalogError> {
    let mut conn = self.conn()?;
    let count: i64 = match exclude {
      Some(ex) => schema::admins::table
        .filter(schema::admins::email.eq(email))
        .filter(schema::admins::id.ne(ex.to_string()))
        .count()
        .get_result(&mut conn),
      None => schema::admins::table
        .filter(schema::admins::email.eq(email))
        .count()
        .get_result(&mut conn),
    }
    .map_err(map_diesel)?;
    Ok(count > 0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> SqliteCatalog {
    SqliteCatalog::with_pool_size(":memory:", 1).unwrap()
  }

  fn fields(title: &str, artist: &str) -> SongFields {
    SongFields { title: title.into(), artist: artist.into(), ..Default::default() }
  }

  #[test]
  fn song_roundtrip_resolves_genre_name() {
    let store = store();
    let genre = store.insert_genre("Rock").unwrap();

    let mut f = fields("Song A", "Artist A");
    f.genre_id = Some(genre.id);
    f.audio_file_path = Some("https://blobs.test/a".into());
    let inserted = store.insert_song(&f).unwrap();

    assert_eq!(inserted.genre_name.as_deref(), Some("Rock"));
    assert_eq!(inserted.audio_file_path.as_deref(), Some("https://blobs.test/a"));

    let found = store.find_song(inserted.id).unwrap().unwrap();
    assert_eq!(found, inserted);
  }

  #[test]
  fn song_without_genre_has_no_genre_name() {
    let store = store();
    let inserted = store.insert_song(&fields("Song A", "Artist A")).unwrap();
    assert_eq!(inserted.genre_id, None);
    assert_eq!(inserted.genre_name, None);
  }

  #[test]
  fn update_writes_explicit_nulls() {
    let store = store();
    let genre = store.insert_genre("Rock").unwrap();

    let mut f = fields("Song A", "Artist A");
    f.genre_id = Some(genre.id);
    f.release_year = Some(1984);
    let song = store.insert_song(&f).unwrap();

    // Fully resolved fields: a None here must clear the column.
    f.genre_id = None;
    f.release_year = None;
    let updated = store.update_song(song.id, &f).unwrap();

    assert_eq!(updated.genre_id, None);
    assert_eq!(updated.genre_name, None);
    assert_eq!(updated.release_year, None);
  }

  #[test]
  fn update_missing_song_is_not_found() {
    let store = store();
    let err = store.update_song(SongId::new(), &fields("T", "A")).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound));
  }

  #[test]
  fn duplicate_genre_name_is_a_conflict() {
    let store = store();
    store.insert_genre("Rock").unwrap();
    let err = store.insert_genre("Rock").unwrap_err();
    assert!(matches!(err, CatalogError::Conflict(_)));
  }

  #[test]
  fn delete_reports_affected_rows() {
    let store = store();
    let song = store.insert_song(&fields("T", "A")).unwrap();

    assert_eq!(store.delete_song(song.id).unwrap(), 1);
    assert_eq!(store.delete_song(song.id).unwrap(), 0);
  }

  #[test]
  fn count_songs_by_genre_counts_only_that_genre() {
    let store = store();
    let rock = store.insert_genre("Rock").unwrap();
    let jazz = store.insert_genre("Jazz").unwrap();

    let mut f = fields("A", "A");
    f.genre_id = Some(rock.id);
    store.insert_song(&f).unwrap();
    store.insert_song(&f).unwrap();
    f.genre_id = Some(jazz.id);
    store.insert_song(&f).unwrap();

    assert_eq!(store.count_songs_by_genre(rock.id).unwrap(), 2);
    assert_eq!(store.count_songs_by_genre(jazz.id).unwrap(), 1);
  }

  #[test]
  fn email_taken_respects_exclusion() {
    let store = store();
    let user = store.insert_user("a@example.com", "user123456", "hash").unwrap();

    assert!(store.user_email_taken("a@example.com", None).unwrap());
    assert!(!store.user_email_taken("a@example.com", Some(user.id)).unwrap());
    assert!(!store.user_email_taken("b@example.com", None).unwrap());
  }

  #[test]
  fn update_user_keeps_omitted_columns() {
    let store = store();
    let user = store.insert_user("a@example.com", "user123456", "hash").unwrap();

    let affected = store.update_user(user.id, "b@example.com", None, None).unwrap();
    assert_eq!(affected, 1);

    let stored = store.find_user(user.id).unwrap().unwrap();
    assert_eq!(stored.email, "b@example.com");
    assert_eq!(stored.username, "user123456");
    assert_eq!(stored.password_hash, "hash");
  }
}
