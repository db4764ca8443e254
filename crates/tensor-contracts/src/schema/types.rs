use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::tensor::Tensor;

/// A YAML file declaring the tensor contracts of a set of functions.
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureFile {
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionSignature>,
}

impl SignatureFile {
    pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Declared argument and return types of one function.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    /// In declaration order.
    #[serde(default, deserialize_with = "ordered_arguments")]
    pub args: Vec<ArgumentSpec>,
    #[serde(default)]
    pub returns: Option<String>,
}

impl FunctionSignature {
    /// Arguments that carry a type literal.
    pub fn typed_args(&self) -> impl Iterator<Item = (&str, &str)> {
        self.args
            .iter()
            .filter_map(|a| a.spec.as_deref().map(|spec| (a.name.as_str(), spec)))
    }
}

/// One parameter. `spec` is `None` for parameters left unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub spec: Option<String>,
}

fn ordered_arguments<'de, D>(deserializer: D) -> Result<Vec<ArgumentSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = serde_yaml::Mapping::deserialize(deserializer)?;
    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = key
                .as_str()
                .ok_or_else(|| D::Error::custom("argument names must be strings"))?
                .to_string();
            let spec = match value {
                serde_yaml::Value::Null => None,
                serde_yaml::Value::String(s) => Some(s),
                serde_yaml::Value::Number(n) => Some(n.to_string()),
                _ => {
                    return Err(D::Error::custom(format!(
                        "argument `{name}` must map to a type literal"
                    )));
                }
            };
            Ok(ArgumentSpec { name, spec })
        })
        .collect()
}

/// A YAML file of recorded calls to replay against signatures.
#[derive(Debug, Clone, Deserialize)]
pub struct CallFile {
    #[serde(default)]
    pub calls: Vec<RecordedCall>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedCall {
    pub function: String,
    #[serde(default)]
    pub args: BTreeMap<String, RecordedValue>,
    #[serde(default)]
    pub returns: Option<RecordedValue>,
}

/// A concrete value seen at a call boundary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordedValue {
    Tensor(Tensor),
    NotTensor { not_tensor: String },
}
