// Dependency injection container

use crate::logging::{debug, trace};
use crate::module::BindingTarget;
use crate::{Binding, BindingKey, Environment, Error, Module, Qualifier};
use discoveryx_config::ConfigManager;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased registered value. The concrete type is always `Arc<T>` for the
/// bound `T`, which lets unsized interface types share the same storage.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type ProviderFactory = Arc<dyn Fn(&Container) -> Result<Instance, Error> + Send + Sync>;

pub(crate) type Upcast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

#[derive(Clone)]
enum Entry {
    Instance(Instance),
    Provider(Arc<ProviderSlot>),
    Alias { target: BindingKey, upcast: Upcast },
}

struct ProviderSlot {
    factory: ProviderFactory,
    instance: OnceCell<Instance>,
}

#[derive(Default)]
struct Registry {
    entries: HashMap<BindingKey, Entry>,
    modules: HashMap<TypeId, &'static str>,
}

/// The dependency injection container
#[derive(Clone)]
pub struct Container {
    registry: Arc<RwLock<Registry>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new DI container");
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    /// Register an instance under its own type, replacing any previous one
    pub fn register<T: Send + Sync + 'static>(&self, instance: T) {
        self.register_arc(Arc::new(instance));
    }

    /// Register a shared instance under `T`, replacing any previous one
    pub fn register_arc<T: ?Sized + Send + Sync + 'static>(&self, instance: Arc<T>) {
        let key = BindingKey::of::<T>();
        trace!(binding = %key, "Acquiring write lock for registration");
        self.registry
            .write()
            .entries
            .insert(key, Entry::Instance(Arc::new(instance)));

        debug!(provider = type_name::<T>(), "Provider registered in DI container");
    }

    /// Add a single binding declaration.
    ///
    /// Fails with [`Error::DuplicateBinding`] when the key is already bound.
    pub fn bind(&self, binding: Binding) -> Result<(), Error> {
        let mut registry = self.registry.write();
        if registry.entries.contains_key(&binding.key) {
            return Err(Error::DuplicateBinding(binding.key.to_string()));
        }
        trace!(binding = %binding.key, "Adding binding");
        registry.entries.insert(binding.key, entry_for(binding.target));
        Ok(())
    }

    /// Install every binding a module declares.
    ///
    /// Installing the same module type twice is a no-op. The module's bindings
    /// are added all-or-nothing: if any key is already claimed, nothing is
    /// registered and [`Error::DuplicateBinding`] is returned.
    pub fn install<M: Module>(
        &self,
        module: &M,
        environment: &Environment,
        config: &ConfigManager,
    ) -> Result<(), Error> {
        let module_id = TypeId::of::<M>();
        if self.registry.read().modules.contains_key(&module_id) {
            debug!(module = module.name(), "Module already installed, skipping");
            return Ok(());
        }

        let bindings = module.bindings(environment, config);

        let mut registry = self.registry.write();
        // Re-check under the write lock; another thread may have won the race.
        if registry.modules.contains_key(&module_id) {
            return Ok(());
        }
        if let Some(taken) = bindings
            .iter()
            .find(|binding| registry.entries.contains_key(&binding.key))
        {
            return Err(Error::DuplicateBinding(format!(
                "{} (declared by {})",
                taken.key,
                module.name()
            )));
        }

        let count = bindings.len();
        for binding in bindings {
            registry.entries.insert(binding.key, entry_for(binding.target));
        }
        registry.modules.insert(module_id, module.name());

        debug!(module = module.name(), binding_count = count, "Module installed");
        Ok(())
    }

    /// Whether a module type has been installed
    pub fn is_installed<M: Module>(&self) -> bool {
        self.registry.read().modules.contains_key(&TypeId::of::<M>())
    }

    /// Resolve the unqualified binding of `T`
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.resolve_key(&BindingKey::of::<T>())
    }

    /// Resolve the binding of `T` qualified with `qualifier`
    pub fn resolve_qualified<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: &Qualifier,
    ) -> Result<Arc<T>, Error> {
        self.resolve_key(&BindingKey::of::<T>().qualified(qualifier.clone()))
    }

    fn resolve_key<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: &BindingKey,
    ) -> Result<Arc<T>, Error> {
        trace!(binding = %key, "Attempting to resolve provider");
        let instance = self.resolve_instance(key)?;

        let resolved = (*instance).downcast_ref::<Arc<T>>().cloned().ok_or_else(|| {
            Error::DependencyInjection(format!(
                "binding {} does not hold a {}",
                key,
                type_name::<T>()
            ))
        })?;

        debug!(binding = %key, "Provider resolved successfully");
        Ok(resolved)
    }

    fn resolve_instance(&self, key: &BindingKey) -> Result<Instance, Error> {
        // The lock is released before running providers, which may resolve
        // their own dependencies from this container.
        let entry = self.registry.read().entries.get(key).cloned();

        match entry {
            None => {
                debug!(binding = %key, "Provider not found in container");
                Err(Error::ProviderNotFound(key.to_string()))
            }
            Some(Entry::Instance(instance)) => Ok(instance),
            Some(Entry::Provider(slot)) => slot
                .instance
                .get_or_try_init(|| {
                    debug!(binding = %key, "Constructing singleton from provider");
                    (slot.factory)(self)
                })
                .cloned(),
            Some(Entry::Alias { target, upcast }) => {
                let instance = self.resolve_instance(&target)?;
                upcast(&instance).ok_or_else(|| {
                    Error::DependencyInjection(format!(
                        "alias {} cannot be satisfied by {}",
                        key, target
                    ))
                })
            }
        }
    }

    /// Check if `T` is bound without a qualifier
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        let exists = self
            .registry
            .read()
            .entries
            .contains_key(&BindingKey::of::<T>());

        trace!(provider = type_name::<T>(), exists = exists, "Checked provider existence");
        exists
    }

    /// Check if `T` is bound with `qualifier`
    pub fn has_qualified<T: ?Sized + 'static>(&self, qualifier: &Qualifier) -> bool {
        let key = BindingKey::of::<T>().qualified(qualifier.clone());
        self.registry.read().entries.contains_key(&key)
    }

    /// Clear all bindings and installed modules
    pub fn clear(&self) {
        let mut registry = self.registry.write();
        let count = registry.entries.len();
        registry.entries.clear();
        registry.modules.clear();

        debug!(provider_count = count, "Cleared all providers from container");
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_for(target: BindingTarget) -> Entry {
    match target {
        BindingTarget::Instance(instance) => Entry::Instance(instance),
        BindingTarget::Provider(factory) => Entry::Provider(Arc::new(ProviderSlot {
            factory,
            instance: OnceCell::new(),
        })),
        BindingTarget::Alias { target, upcast } => Entry::Alias { target, upcast },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    #[derive(Debug)]
    struct Service {
        name: String,
    }

    impl Named for Service {
        fn name(&self) -> &str {
            &self.name
        }
    }

    struct Tag;

    #[test]
    fn test_register_and_resolve() {
        let container = Container::new();
        container.register(Service {
            name: "svc".to_string(),
        });

        let service = container.resolve::<Service>().unwrap();
        assert_eq!(service.name, "svc");
        assert!(container.has::<Service>());
    }

    #[test]
    fn test_missing_provider() {
        let container = Container::new();
        assert!(matches!(
            container.resolve::<Service>(),
            Err(Error::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_register_trait_object() {
        let container = Container::new();
        let service: Arc<dyn Named> = Arc::new(Service {
            name: "dyn".to_string(),
        });
        container.register_arc(service);

        assert_eq!(container.resolve::<dyn Named>().unwrap().name(), "dyn");
    }

    #[test]
    fn test_provider_constructed_once() {
        static BUILT: AtomicUsize = AtomicUsize::new(0);

        let container = Container::new();
        container
            .bind(Binding::bind::<Service>().to_provider(|_| {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(Arc::new(Service {
                    name: "lazy".to_string(),
                }))
            }))
            .unwrap();

        assert_eq!(BUILT.load(Ordering::SeqCst), 0);
        let first = container.resolve::<Service>().unwrap();
        let second = container.resolve::<Service>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_alias_shares_instance() {
        let container = Container::new();
        container
            .bind(Binding::bind::<Service>().to_provider(|_| {
                Ok::<_, Error>(Arc::new(Service {
                    name: "shared".to_string(),
                }))
            }))
            .unwrap();
        container
            .bind(
                Binding::bind::<dyn Named>()
                    .qualified_with(Qualifier::of::<Tag>())
                    .to::<Service, _>(|s| s as Arc<dyn Named>),
            )
            .unwrap();

        let concrete = container.resolve::<Service>().unwrap();
        let named = container
            .resolve_qualified::<dyn Named>(&Qualifier::of::<Tag>())
            .unwrap();

        assert_eq!(named.name(), "shared");
        assert!(std::ptr::addr_eq(Arc::as_ptr(&concrete), Arc::as_ptr(&named)));
        assert!(container.resolve::<dyn Named>().is_err());
    }

    #[test]
    fn test_provider_failure_is_construction_error() {
        let container = Container::new();
        container
            .bind(Binding::bind::<Service>().to_provider(|_| {
                Err::<Arc<Service>, _>(std::io::Error::other("no sockets left"))
            }))
            .unwrap();

        let err = container.resolve::<Service>().unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));
        assert!(err.to_string().contains("no sockets left"));
    }

    #[test]
    fn test_duplicate_bind_rejected() {
        let container = Container::new();
        let binding = Binding::bind::<String>().to_instance(Arc::new("a".to_string()));
        container.bind(binding.clone()).unwrap();

        assert!(matches!(
            container.bind(binding),
            Err(Error::DuplicateBinding(_))
        ));
    }

    #[test]
    fn test_clear() {
        let container = Container::new();
        container.register(1u32);
        container.clear();
        assert!(!container.has::<u32>());
    }
}
