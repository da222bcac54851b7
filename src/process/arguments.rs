// src/process/arguments.rs

//! Declarative command-line construction.
//!
//! A type that wants to be turned into a command line implements
//! [`CommandLine`], usually by evaluating a table of [`ArgumentSpec`]s
//! (order, flag, force-quote, value accessor) against itself. The resulting
//! [`ArgumentDescriptor`]s are serialized by [`format_arguments`]:
//!
//! - descriptors with an explicit order come first, ascending by order;
//! - the rest follow in declared sequence;
//! - each emits `flag ` (if any) then its value, where a blank value becomes
//!   `""`, and a value containing whitespace (or marked force-quote) is
//!   wrapped in double quotes;
//! - tokens are joined by single spaces and the whole string is trimmed.

use serde::Deserialize;

use crate::errors::{ModuleError, Result};

/// One argument of a command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArgumentDescriptor {
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub force_quotes: bool,
}

impl ArgumentDescriptor {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn quoted(mut self) -> Self {
        self.force_quotes = true;
        self
    }
}

/// Something that can describe itself as command-line arguments.
pub trait CommandLine: Send + Sync {
    fn arguments(&self) -> Vec<ArgumentDescriptor>;
}

impl CommandLine for () {
    fn arguments(&self) -> Vec<ArgumentDescriptor> {
        Vec::new()
    }
}

impl CommandLine for Vec<ArgumentDescriptor> {
    fn arguments(&self) -> Vec<ArgumentDescriptor> {
        self.clone()
    }
}

/// Static description of how one field of `T` becomes an argument.
pub struct ArgumentSpec<T> {
    pub order: Option<i32>,
    pub flag: Option<&'static str>,
    pub force_quotes: bool,
    pub value: fn(&T) -> String,
}

impl<T> ArgumentSpec<T> {
    pub fn new(value: fn(&T) -> String) -> Self {
        Self {
            order: None,
            flag: None,
            force_quotes: false,
            value,
        }
    }

    pub fn flag(mut self, flag: &'static str) -> Self {
        self.flag = Some(flag);
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn quoted(mut self) -> Self {
        self.force_quotes = true;
        self
    }

    pub fn describe(&self, source: &T) -> ArgumentDescriptor {
        ArgumentDescriptor {
            flag: self.flag.map(str::to_string),
            value: (self.value)(source),
            order: self.order,
            force_quotes: self.force_quotes,
        }
    }
}

/// Evaluate a spec table against `source`, in declared sequence.
pub fn describe<T>(source: &T, specs: &[ArgumentSpec<T>]) -> Vec<ArgumentDescriptor> {
    specs.iter().map(|spec| spec.describe(source)).collect()
}

/// Explicitly ordered descriptors first (stable, ascending), then the rest.
pub fn order_arguments(arguments: Vec<ArgumentDescriptor>) -> Vec<ArgumentDescriptor> {
    let (mut ordered, unordered): (Vec<_>, Vec<_>) =
        arguments.into_iter().partition(|arg| arg.order.is_some());
    ordered.sort_by_key(|arg| arg.order);
    ordered.extend(unordered);
    ordered
}

pub fn quote_value(value: &str, force_quotes: bool) -> String {
    if value.trim().is_empty() {
        "\"\"".to_string()
    } else if force_quotes || value.chars().any(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

pub fn format_arguments(arguments: Vec<ArgumentDescriptor>) -> String {
    let mut line = String::new();
    for arg in order_arguments(arguments) {
        if let Some(flag) = arg.flag.as_deref().filter(|f| !f.is_empty()) {
            line.push_str(flag);
            line.push(' ');
        }
        line.push_str(&quote_value(&arg.value, arg.force_quotes));
        line.push(' ');
    }
    line.trim().to_string()
}

/// Split a serialized argument string back into argv tokens.
pub fn split_arguments(arguments: &str) -> Result<Vec<String>> {
    shlex::split(arguments).ok_or_else(|| {
        ModuleError::Validation(format!("cannot split argument string: {arguments}"))
    })
}
