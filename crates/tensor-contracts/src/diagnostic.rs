//! Expected and actual type strings for failure messages.

use crate::detail::Detail;
use crate::shape::ShapeSpec;
use crate::tensor::ArgValue;
use crate::types::TensorType;

/// `Class[piece, piece]`, skipping empty pieces. A class with no pieces
/// renders bare.
pub fn render_type<I, S>(class: &str, pieces: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pieces: Vec<S> = pieces
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .collect();
    if pieces.is_empty() {
        return class.to_string();
    }
    let joined: Vec<&str> = pieces.iter().map(AsRef::as_ref).collect();
    format!("{class}[{}]", joined.join(", "))
}

/// The type as declared, with `shape` in place of the declared shape.
pub fn expected(ty: &TensorType, shape: Option<&ShapeSpec>) -> String {
    render_type(ty.class_name(), ty.pieces(shape))
}

/// What the value looks like through the same details as `ty`.
pub fn actual(ty: &TensorType, value: &ArgValue<'_>) -> String {
    match value {
        ArgValue::Tensor(tensor) => {
            let shape = ty.shape().map(|s| s.describe(*tensor));
            let details = ty.details().map(|d| d.describe(*tensor));
            render_type(ty.class_name(), shape.into_iter().chain(details))
        }
        ArgValue::NotTensor(type_name) => (*type_name).to_string(),
    }
}
