use serde::{Deserialize, Deserializer};

/// Valor de un campo en una actualización parcial.
///
/// Distingue los tres estados que JSON colapsa con facilidad:
/// - `Absent`: el campo no vino en la petición → conservar el valor actual.
/// - `Null`: vino `null` explícito → borrar el valor.
/// - `Value(v)`: vino un valor → reemplazar.
///
/// Un `Option<Option<T>>` expresaría lo mismo, pero sobrecargar `None` con dos
/// significados es exactamente el patrón que queremos evitar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
  #[default]
  Absent,
  Null,
  Value(T),
}

impl<T> Field<T> {
  /// Resuelve el campo contra el valor actualmente almacenado.
  pub fn resolve(self, current: Option<T>) -> Option<T> {
    match self {
      Field::Absent => current,
      Field::Null => None,
      Field::Value(v) => Some(v),
    }
  }

  pub fn is_absent(&self) -> bool {
    matches!(self, Field::Absent)
  }

  pub fn as_ref(&self) -> Field<&T> {
    match self {
      Field::Absent => Field::Absent,
      Field::Null => Field::Null,
      Field::Value(v) => Field::Value(v),
    }
  }
}

/// Con `#[serde(default)]` en el campo del struct, un campo ausente queda en
/// `Absent`; si el campo está presente, `null` se vuelve `Null` y cualquier
/// otro valor, `Value`.
impl<'de, T> Deserialize<'de> for Field<T>
where
  T: Deserialize<'de>,
{
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(value) => Field::Value(value),
      None => Field::Null,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Deserialize)]
  struct Payload {
    #[serde(default)]
    year: Field<i32>,
  }

  #[test]
  fn absent_field_stays_absent() {
    let p: Payload = serde_json::from_str("{}").unwrap();
    assert_eq!(p.year, Field::Absent);
    assert_eq!(p.year.resolve(Some(1999)), Some(1999));
  }

  #[test]
  fn explicit_null_clears() {
    let p: Payload = serde_json::from_str(r#"{"year":null}"#).unwrap();
    assert_eq!(p.year, Field::Null);
    assert_eq!(p.year.resolve(Some(1999)), None);
  }

  #[test]
  fn explicit_value_replaces() {
    let p: Payload = serde_json::from_str(r#"{"year":2001}"#).unwrap();
    assert_eq!(p.year, Field::Value(2001));
    assert_eq!(p.year.resolve(Some(1999)), Some(2001));
  }
}
