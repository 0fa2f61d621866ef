use diesel::prelude::*;

use crate::schema::{admins, genres, songs, users};

#[derive(Debug, Queryable)]
#[diesel(table_name = songs)]
pub struct SongRow {
  pub id: String,
  pub title: String,
  pub artist: String,
  pub genre_id: Option<String>,
  pub release_year: Option<i32>,
  pub audio_file_path: Option<String>,
  pub image_path: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = songs)]
pub struct NewSongRow<'a> {
  pub id: String,
  pub title: &'a str,
  pub artist: &'a str,
  pub genre_id: Option<String>,
  pub release_year: Option<i32>,
  pub audio_file_path: Option<&'a str>,
  pub image_path: Option<&'a str>,
}

/// Changeset completo de una canción. `treat_none_as_null` porque los campos
/// ya vienen resueltos: un `None` aquí significa "escribe NULL", no "omite".
#[derive(Debug, AsChangeset)]
#[diesel(table_name = songs, treat_none_as_null = true)]
pub struct SongChangeset<'a> {
  pub title: &'a str,
  pub artist: &'a str,
  pub genre_id: Option<String>,
  pub release_year: Option<i32>,
  pub audio_file_path: Option<&'a str>,
  pub image_path: Option<&'a str>,
}

#[derive(Debug, Queryable)]
#[diesel(table_name = genres)]
pub struct GenreRow {
  pub id: String,
  pub name: String,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = genres)]
pub struct NewGenreRow<'a> {
  pub id: String,
  pub name: &'a str,
}

#[derive(Debug, Queryable)]
#[diesel(table_name = users)]
pub struct UserRow {
  pub id: String,
  pub email: String,
  pub username: String,
  pub password_hash: String,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
  pub id: String,
  pub email: &'a str,
  pub username: &'a str,
  pub password_hash: &'a str,
}

#[derive(Debug, Queryable)]
#[diesel(table_name = admins)]
pub struct AdminRow {
  pub id: String,
  pub email: String,
  pub password_hash: String,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admins)]
pub struct NewAdminRow<'a> {
  pub id: String,
  pub email: &'a str,
  pub password_hash: &'a str,
}
