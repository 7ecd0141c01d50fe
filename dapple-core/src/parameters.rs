use crate::Value;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display},
    slice,
    vec,
};

/// A single value bound to a command, either by name or by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name without the `@`, `:` or `$` prefix. `None` for positional parameters.
    pub name: Option<String>,
    pub value: Value,
}

impl Parameter {
    pub fn named(name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        Self {
            name: Some(strip_prefix(name.as_ref()).to_owned()),
            value: value.into(),
        }
    }
    pub fn positional(value: impl Into<Value>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }
}

fn strip_prefix(name: &str) -> &str {
    name.strip_prefix(['@', ':', '$']).unwrap_or(name)
}

/// Ordered parameters of a command.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ParameterList(Vec<Parameter>);

impl ParameterList {
    pub fn new() -> Self {
        Self(Vec::new())
    }
    /// Adds a named parameter, replacing an existing one with the same name.
    pub fn add(&mut self, name: impl AsRef<str>, value: impl Into<Value>) -> &mut Self {
        let parameter = Parameter::named(name, value);
        match self
            .0
            .iter_mut()
            .find(|p| p.name.is_some() && p.name == parameter.name)
        {
            Some(existing) => existing.value = parameter.value,
            None => self.0.push(parameter),
        }
        self
    }
    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.0.push(Parameter::positional(value));
        self
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = strip_prefix(name);
        self.0
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .map(|p| &p.value)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> slice::Iter<'_, Parameter> {
        self.0.iter()
    }
}

impl IntoIterator for ParameterList {
    type Item = Parameter;
    type IntoIter = vec::IntoIter<Parameter>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = slice::Iter<'a, Parameter>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Parameter> for ParameterList {
    fn from_iter<T: IntoIterator<Item = Parameter>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for ParameterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, parameter) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &parameter.name {
                Some(name) => write!(f, "@{name} = {}", parameter.value)?,
                None => write!(f, "{}", parameter.value)?,
            }
        }
        f.write_str("]")
    }
}

/// Anything usable as the parameter object of a command.
pub trait Parameters {
    fn into_parameters(self) -> ParameterList;
}

impl Parameters for () {
    fn into_parameters(self) -> ParameterList {
        ParameterList::new()
    }
}

impl Parameters for ParameterList {
    fn into_parameters(self) -> ParameterList {
        self
    }
}

impl Parameters for &ParameterList {
    fn into_parameters(self) -> ParameterList {
        self.clone()
    }
}

impl<T: Parameters> Parameters for Option<T> {
    fn into_parameters(self) -> ParameterList {
        self.map(Parameters::into_parameters).unwrap_or_default()
    }
}

impl Parameters for Vec<Value> {
    fn into_parameters(self) -> ParameterList {
        self.into_iter().map(Parameter::positional).collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>> Parameters for Vec<(K, V)> {
    fn into_parameters(self) -> ParameterList {
        self.into_iter()
            .map(|(k, v)| Parameter::named(k, v))
            .collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>, const N: usize> Parameters for [(K, V); N] {
    fn into_parameters(self) -> ParameterList {
        self.into_iter()
            .map(|(k, v)| Parameter::named(k, v))
            .collect()
    }
}

impl<K: AsRef<str>, V: Clone + Into<Value>> Parameters for &[(K, V)] {
    fn into_parameters(self) -> ParameterList {
        self.iter()
            .map(|(k, v)| Parameter::named(k, v.clone()))
            .collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>> Parameters for BTreeMap<K, V> {
    fn into_parameters(self) -> ParameterList {
        self.into_iter()
            .map(|(k, v)| Parameter::named(k, v))
            .collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>, S> Parameters for HashMap<K, V, S> {
    fn into_parameters(self) -> ParameterList {
        self.into_iter()
            .map(|(k, v)| Parameter::named(k, v))
            .collect()
    }
}

/// Builds a [`ParameterList`] of named parameters.
///
/// ```rust
/// use dapple_core::{Value, params};
/// let params = params! { "Value" => "Test", "@Id" => 7 };
/// assert_eq!(params.get("Id"), Some(&Value::Int32(Some(7))));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::ParameterList::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::ParameterList::new();
        $(params.add($name, $value);)+
        params
    }};
}
