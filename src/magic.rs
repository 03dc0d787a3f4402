use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::args::ArgumentList;

/// Everything a magic evaluator gets to see about one invocation
#[derive(Debug, Clone, Copy)]
pub struct MagicCall<'a> {
    /// Trimmed invocation name
    pub name: &'a str,
    /// Arguments bound at this invocation
    pub args: &'a ArgumentList,
    /// Scope the invocation appears in
    pub scope: &'a ArgumentList,
    /// Page the expansion was started for
    pub page: &'a str,
}

/// Built-in evaluator for a reserved invocation name.
///
/// Returning `None` hands the invocation on to ordinary template lookup.
pub trait Magic: Send + Sync {
    fn evaluate(&self, call: &MagicCall<'_>) -> Option<String>;
}

impl<F> Magic for F
where
    F: Fn(&MagicCall<'_>) -> Option<String> + Send + Sync,
{
    fn evaluate(&self, call: &MagicCall<'_>) -> Option<String> {
        self(call)
    }
}

/// Immutable name -> evaluator table, shared between expanders
#[derive(Clone, Default)]
pub struct MagicRegistry(Arc<HashMap<String, Box<dyn Magic>>>);

impl MagicRegistry {
    /// Registry without any magic names
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> MagicRegistryBuilder {
        MagicRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Magic> {
        self.0.get(name).map(|m| m.as_ref())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Run the evaluator registered for `call.name`, if any
    pub fn evaluate(&self, call: &MagicCall<'_>) -> Option<String> {
        let magic = self.get(call.name)?;
        log::debug!("dispatching magic {:?}", call.name);
        magic.evaluate(call)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for MagicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.0.keys().collect();
        names.sort();
        f.debug_tuple("MagicRegistry").field(&names).finish()
    }
}

#[derive(Default)]
pub struct MagicRegistryBuilder(HashMap<String, Box<dyn Magic>>);

impl MagicRegistryBuilder {
    /// Register `magic` under `name`, replacing an earlier registration
    pub fn register(mut self, name: impl Into<String>, magic: impl Magic + 'static) -> Self {
        self.0.insert(name.into(), Box::new(magic));
        self
    }

    /// Register a closure; same as [`register`](Self::register) but lets the
    /// closure's argument type be inferred
    pub fn register_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&MagicCall<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.register(name, f)
    }

    pub fn build(self) -> MagicRegistry {
        MagicRegistry(Arc::new(self.0))
    }
}
