//! Modules and binding declarations.
//!
//! A [`Module`] describes which types it contributes to a [`Container`] as a
//! static list of [`Binding`]s. Bindings are plain data: nothing is
//! constructed when they are declared, only when the container first resolves
//! the bound key.
//!
//! ```rust
//! use discoveryx_config::ConfigManager;
//! use discoveryx_core::{Binding, Container, Environment, Module, Qualifier};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! struct GreeterModule;
//!
//! impl Module for GreeterModule {
//!     fn bindings(&self, _env: &Environment, _config: &ConfigManager) -> Vec<Binding> {
//!         vec![
//!             Binding::bind::<English>().to_provider(|_| Ok::<_, std::io::Error>(Arc::new(English))),
//!             Binding::bind::<dyn Greeter>()
//!                 .qualified_with(Qualifier::named("default"))
//!                 .to::<English, _>(|english| english as Arc<dyn Greeter>),
//!         ]
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .install(&GreeterModule, &Environment::simple(), &ConfigManager::new())
//!     .unwrap();
//!
//! let greeter = container
//!     .resolve_qualified::<dyn Greeter>(&Qualifier::named("default"))
//!     .unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

use crate::container::{Instance, ProviderFactory, Upcast};
use crate::{Container, Environment, Provider};
use discoveryx_config::ConfigManager;
use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Distinguishes several bindings of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// A string name, e.g. `"discoveryx"`
    Named(Cow<'static, str>),
    /// A marker type used as an annotation
    Marker {
        type_id: TypeId,
        type_name: &'static str,
    },
}

impl Qualifier {
    /// Qualify by name
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Qualifier::Named(name.into())
    }

    /// Qualify by a marker type
    pub fn of<M: ?Sized + 'static>() -> Self {
        Qualifier::Marker {
            type_id: TypeId::of::<M>(),
            type_name: type_name::<M>(),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Named(name) => write!(f, "@Named(\"{}\")", name),
            Qualifier::Marker { type_name, .. } => write!(f, "@{}", type_name),
        }
    }
}

/// Key under which a binding is registered: a type plus an optional qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<Qualifier>,
}

impl BindingKey {
    /// Unqualified key for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            qualifier: None,
        }
    }

    /// Same type, with a qualifier
    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{} {}", qualifier, self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}

/// What a binding resolves to
#[derive(Clone)]
pub(crate) enum BindingTarget {
    Instance(Instance),
    Provider(ProviderFactory),
    Alias { target: BindingKey, upcast: Upcast },
}

/// A single binding declaration
#[derive(Clone)]
pub struct Binding {
    pub(crate) key: BindingKey,
    pub(crate) target: BindingTarget,
}

impl Binding {
    /// Start declaring a binding for `T`
    pub fn bind<T: ?Sized + Send + Sync + 'static>() -> BindingBuilder<T> {
        BindingBuilder {
            key: BindingKey::of::<T>(),
            _marker: PhantomData,
        }
    }

    /// The key this binding registers
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// The key this binding forwards to, when it is an alias
    pub fn alias_target(&self) -> Option<&BindingKey> {
        match &self.target {
            BindingTarget::Alias { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Whether this binding is backed by a provider
    pub fn is_provider(&self) -> bool {
        matches!(self.target, BindingTarget::Provider(_))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            BindingTarget::Instance(_) => "instance".to_string(),
            BindingTarget::Provider(_) => "provider".to_string(),
            BindingTarget::Alias { target, .. } => format!("alias of {}", target),
        };
        f.debug_struct("Binding")
            .field("key", &self.key.to_string())
            .field("target", &target)
            .finish()
    }
}

/// Builder returned by [`Binding::bind`]
pub struct BindingBuilder<T: ?Sized> {
    key: BindingKey,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> BindingBuilder<T> {
    /// Qualify the binding
    pub fn qualified_with(mut self, qualifier: Qualifier) -> Self {
        self.key = self.key.qualified(qualifier);
        self
    }

    /// Bind to an already constructed instance
    pub fn to_instance(self, instance: Arc<T>) -> Binding {
        Binding {
            key: self.key,
            target: BindingTarget::Instance(Arc::new(instance)),
        }
    }

    /// Bind to a provider built by `factory` on first resolution.
    ///
    /// The factory receives the container so it can resolve its own
    /// dependencies. It must not depend on the key it is bound to.
    pub fn to_provider<P, E, F>(self, factory: F) -> Binding
    where
        P: Provider<T>,
        E: Into<crate::BoxError>,
        F: Fn(&Container) -> Result<P, E> + Send + Sync + 'static,
    {
        let binding = self.key.to_string();
        let factory: ProviderFactory = Arc::new(move |container: &Container| {
            let provider = factory(container)
                .map_err(|e| crate::Error::construction(binding.clone(), e))?;
            Ok(Arc::new(provider.get()) as Instance)
        });
        Binding {
            key: self.key,
            target: BindingTarget::Provider(factory),
        }
    }

    /// Alias this key to the unqualified binding of `C`.
    ///
    /// `upcast` converts the concrete instance into `T`, typically an unsizing
    /// cast such as `|c| c as Arc<dyn Trait>`.
    pub fn to<C, F>(self, upcast: F) -> Binding
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>) -> Arc<T> + Send + Sync + 'static,
    {
        let upcast: Upcast = Arc::new(move |instance: &Instance| {
            (**instance)
                .downcast_ref::<Arc<C>>()
                .map(|concrete| Arc::new(upcast(Arc::clone(concrete))) as Instance)
        });
        Binding {
            key: self.key,
            target: BindingTarget::Alias {
                target: BindingKey::of::<C>(),
                upcast,
            },
        }
    }
}

/// A unit of bindings installed into a [`Container`]
pub trait Module: Send + Sync + 'static {
    /// Human-readable module name
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Returns the bindings this module contributes.
    ///
    /// Must be deterministic for a given environment and configuration.
    fn bindings(&self, environment: &Environment, config: &ConfigManager) -> Vec<Binding>;
}
