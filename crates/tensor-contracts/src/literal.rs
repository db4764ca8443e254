//! Text form of a tensor type.
//!
//! ```text
//! batch: ..., 3, channels          one subscript, default class
//! NamedTensorType[a, b][f32]       class name, two chained subscripts
//! ()                               zero-dimensional
//! ```

use crate::dim::{Item, SliceSize};
use crate::error::SpecError;
use crate::tensor::{DType, Layout};

#[derive(Debug, Clone)]
pub(crate) struct ParsedLiteral {
    pub class: Option<String>,
    pub subscripts: Vec<Vec<Item>>,
}

pub(crate) fn parse_literal(src: &str) -> Result<ParsedLiteral, SpecError> {
    let text = src.trim();
    if text.is_empty() {
        return Ok(ParsedLiteral {
            class: None,
            subscripts: Vec::new(),
        });
    }

    if let Some(open) = text.find('[')
        && is_ident(text[..open].trim())
    {
        let class = text[..open].trim().to_string();
        let subscripts = parse_brackets(src, &text[open..])?;
        return Ok(ParsedLiteral {
            class: Some(class),
            subscripts,
        });
    }

    Ok(ParsedLiteral {
        class: None,
        subscripts: vec![parse_items(text)?],
    })
}

fn parse_brackets(src: &str, mut rest: &str) -> Result<Vec<Vec<Item>>, SpecError> {
    let mut subscripts = Vec::new();
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('[') else {
            return Err(literal_error(src, "expected `[`"));
        };
        let Some(close) = body.find(']') else {
            return Err(literal_error(src, "unclosed `[`"));
        };
        let inner = &body[..close];
        if inner.trim().is_empty() {
            return Err(literal_error(src, "empty subscript; use `()` for zero dimensions"));
        }
        if inner.contains('[') {
            return Err(literal_error(src, "nested `[`"));
        }
        subscripts.push(parse_items(inner)?);
        rest = body[close + 1..].trim_start();
    }
    Ok(subscripts)
}

/// Parses the inside of one subscript. `()` is the empty subscript.
pub fn parse_items(text: &str) -> Result<Vec<Item>, SpecError> {
    let text = text.trim();
    if text == "()" {
        return Ok(Vec::new());
    }
    let mut parts: Vec<&str> = text.split(',').map(str::trim).collect();
    // one trailing comma, as in `3,`
    if parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts.into_iter().map(parse_element).collect()
}

fn parse_element(token: &str) -> Result<Item, SpecError> {
    match token {
        "" => return Err(literal_error(token, "empty element")),
        "..." => return Ok(Item::Group),
        "_" => return Ok(Item::Any),
        "None" => return Ok(Item::NoneName),
        "true" => return Ok(Item::Bool(true)),
        "false" => return Ok(Item::Bool(false)),
        "float_detail" => return Ok(Item::FloatFlag),
        "named_detail" => return Ok(Item::NamedFlag),
        _ => {}
    }

    if let Some(name) = token.strip_prefix('*') {
        let name = name.trim();
        if !is_ident(name) {
            return Err(SpecError::invalid(token));
        }
        return Ok(Item::slice(name, SliceSize::Group));
    }

    if token.contains(':') {
        return parse_pair(token);
    }

    if let Ok(n) = token.parse::<i64>() {
        return Ok(Item::Int(n));
    }
    if let Ok(dtype) = token.parse::<DType>() {
        return Ok(Item::Dtype(dtype));
    }
    if let Ok(layout) = token.parse::<Layout>() {
        return Ok(Item::Layout(layout));
    }
    if is_ident(token) {
        return Ok(Item::Str(token.to_string()));
    }
    Err(SpecError::invalid(token))
}

fn parse_pair(token: &str) -> Result<Item, SpecError> {
    let parts: Vec<&str> = token.split(':').map(str::trim).collect();
    if parts.len() > 3 {
        return Err(SpecError::invalid(token));
    }

    let name = match parts[0] {
        "" | "None" => None,
        name if is_ident(name) => Some(name.to_string()),
        _ => return Err(SpecError::invalid(token)),
    };
    let size = match parts[1] {
        "" => None,
        "..." => Some(SliceSize::Group),
        size => match size.parse::<i64>() {
            Ok(n) => Some(SliceSize::Int(n)),
            Err(_) if is_ident(size) => Some(SliceSize::Symbol(size.to_string())),
            Err(_) => return Err(SpecError::invalid(token)),
        },
    };
    let step = match parts.get(2).copied() {
        None | Some("") => None,
        Some(step) => Some(step.parse::<i64>().map_err(|_| SpecError::invalid(token))?),
    };
    Ok(Item::Slice { name, size, step })
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn literal_error(literal: &str, message: &str) -> SpecError {
    SpecError::Literal {
        literal: literal.to_string(),
        message: message.to_string(),
    }
}
