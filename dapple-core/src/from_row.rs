use crate::{AsValue, Error, Result, Row, RowLabeled, Value};

/// Maps a result row into a caller type.
///
/// Tuples decode columns by position, user types usually decode by name:
/// ```rust
/// use dapple_core::{FromRow, Result, RowLabeled};
/// struct User {
///     id: i64,
///     name: String,
/// }
/// impl FromRow for User {
///     fn from_row(row: RowLabeled) -> Result<Self> {
///         Ok(Self {
///             id: row.get("id")?,
///             name: row.get("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: RowLabeled) -> Result<Self>;
}

impl FromRow for RowLabeled {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row)
    }
}

impl FromRow for Row {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row.values)
    }
}

/// The first column of the row.
impl FromRow for Value {
    fn from_row(row: RowLabeled) -> Result<Self> {
        row.values
            .into_vec()
            .into_iter()
            .next()
            .ok_or_else(|| Error::msg("Cannot decode a value from a row without columns"))
    }
}

macro_rules! impl_from_row_tuple {
    ($len:literal, $($t:ident => $i:tt),+) => {
        impl<$($t: AsValue),+> FromRow for ($($t,)+) {
            fn from_row(row: RowLabeled) -> Result<Self> {
                if row.values.len() < $len {
                    return Err(Error::msg(format!(
                        "Expected at least {} columns but the row has {}",
                        $len,
                        row.values.len(),
                    )));
                }
                Ok(($(row.get_index::<$t>($i)?,)+))
            }
        }
    };
}
impl_from_row_tuple!(1, A => 0);
impl_from_row_tuple!(2, A => 0, B => 1);
impl_from_row_tuple!(3, A => 0, B => 1, C => 2);
impl_from_row_tuple!(4, A => 0, B => 1, C => 2, D => 3);
impl_from_row_tuple!(5, A => 0, B => 1, C => 2, D => 3, E => 4);
impl_from_row_tuple!(6, A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
