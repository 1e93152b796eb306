// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy creation
//!
//! [`InterceptorProxyCreator`] is the entry point that turns a target class
//! or instance into an intercepted surrogate. It consults every configured
//! registry for models, builds the dispatcher stack, and wires the surrogate.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatch::{
    CallArgs, CompositeDispatcher, DispatchMode, Instance, InterceptionHandlerFactory,
    InterceptorDispatcher, MethodDispatcher,
};
use crate::error::{Error, Result};
use crate::metadata::{ClassId, ClassMetadata, InterceptorMetadata, TypeName};
use crate::model::{InterceptionModel, InterceptionModelRegistry};
use crate::proxy::{
    DescriptorProxyClassProvider, Instantiator, ProxyClass, ProxyClassProvider, ProxyMode,
    Surrogate,
};

/// Creates intercepted proxies for target classes and instances
pub struct InterceptorProxyCreator {
    registries: Vec<Arc<dyn InterceptionModelRegistry>>,
    factories: Vec<Arc<dyn InterceptionHandlerFactory>>,
    proxy_classes: Arc<dyn ProxyClassProvider>,
    instantiator: Instantiator,
}

impl InterceptorProxyCreator {
    pub fn new(
        registries: Vec<Arc<dyn InterceptionModelRegistry>>,
        factories: Vec<Arc<dyn InterceptionHandlerFactory>>,
        proxy_classes: Arc<dyn ProxyClassProvider>,
    ) -> Self {
        InterceptorProxyCreator {
            registries,
            factories,
            proxy_classes,
            instantiator: Instantiator::new(),
        }
    }

    /// Creator over a single registry and handler factory, with the default
    /// proxy class provider
    pub fn single(
        registry: Arc<dyn InterceptionModelRegistry>,
        factory: Arc<dyn InterceptionHandlerFactory>,
    ) -> Self {
        Self::new(
            vec![registry],
            vec![factory],
            Arc::new(DescriptorProxyClassProvider::new()),
        )
    }

    /// Models for `target` from every registry, in registry order
    ///
    /// Models are never merged; each keeps its own chains and contributes
    /// them in sequence at dispatch time.
    pub fn models_for(&self, target: &ClassId) -> Vec<Arc<InterceptionModel>> {
        self.registries
            .iter()
            .map(|r| r.interception_model(target))
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// Wrap an existing instance in an intercepted proxy
    ///
    /// The instance's own constructor already ran; no constructor is invoked
    /// here.
    pub fn create_proxy_from_instance(
        &self,
        target: Instance,
        proxified: &Arc<ClassMetadata>,
        metadata: &Arc<InterceptorMetadata>,
    ) -> Result<Surrogate> {
        let models = self.models_for(proxified.id());
        let state = Arc::new(Mutex::new(Some(target)));
        let dispatcher = InterceptorDispatcher::new(
            DispatchMode::Wrap {
                target: state.clone(),
            },
            proxified.clone(),
            models,
            &self.factories,
            metadata.clone(),
        )?;
        let proxy_class = self.proxy_classes.proxy_class(proxified, ProxyMode::Wrap);
        let surrogate = Surrogate::new(proxy_class, state);
        surrogate.install_dispatcher(Arc::new(dispatcher));
        tracing::debug!(class = %proxified.id(), mode = "wrap", "created proxy");
        Ok(surrogate)
    }

    /// Construct the target through one of its declared constructors and
    /// proxy it in subclassing mode
    ///
    /// The constructor runs exactly once. The dispatcher goes in as a single
    /// composite layer so callers can stack further layers on top.
    pub fn create_proxy_from_class(
        &self,
        proxified: &Arc<ClassMetadata>,
        ctor_types: &[TypeName],
        ctor_args: CallArgs,
        metadata: &Arc<InterceptorMetadata>,
    ) -> Result<Surrogate> {
        let ctor = proxified.find_constructor(ctor_types).ok_or_else(|| {
            Error::construction(
                proxified.id(),
                "no constructor matching the given parameter types",
            )
        })?;
        let instance = ctor.invoke(ctor_args).map_err(|cause| {
            Error::construction_caused(
                proxified.id(),
                "constructor failed",
                cause,
            )
        })?;
        let models = self.models_for(proxified.id());
        let dispatcher = InterceptorDispatcher::new(
            DispatchMode::Subclass,
            proxified.clone(),
            models,
            &self.factories,
            metadata.clone(),
        )?;
        let composite = CompositeDispatcher::single(Arc::new(dispatcher));
        let proxy_class = self.proxy_classes.proxy_class(proxified, ProxyMode::Subclass);
        let surrogate = Surrogate::new(proxy_class, Arc::new(Mutex::new(Some(instance))));
        surrogate.install_dispatcher(Arc::new(composite));
        tracing::debug!(class = %proxified.id(), mode = "subclass", "created proxy");
        Ok(surrogate)
    }

    /// Instantiate a bare proxy for a prepared class descriptor and install
    /// the given dispatcher
    ///
    /// The instance comes from the no-arg constructor when one exists,
    /// otherwise from the class's raw allocator.
    pub fn create_proxy_instance(
        &self,
        proxy_class: Arc<ProxyClass>,
        dispatcher: Arc<dyn MethodDispatcher>,
    ) -> Result<Surrogate> {
        let instance = self.instantiator.instantiate(proxy_class.target_class())?;
        let surrogate = Surrogate::new(proxy_class, Arc::new(Mutex::new(Some(instance))));
        surrogate.install_dispatcher(dispatcher);
        Ok(surrogate)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::dispatch::{CallValue, DefaultHandlerFactory, InvocationContext};
    use crate::metadata::{InterceptionCategory, InterceptorRole, MethodSignature};
    use crate::model::BindingModelRegistry;

    fn audit_interceptor() -> Arc<InterceptorMetadata> {
        let class = ClassMetadata::builder("Audit")
            .default_constructor(|| ())
            .interceptor_method(
                MethodSignature::new("audit"),
                InterceptionCategory::AroundInvoke,
                |_recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
                    inv.args_mut().push("audit:before".to_string());
                    let outcome = inv.proceed()?;
                    inv.args_mut().push("audit:after".to_string());
                    Ok(outcome)
                },
            )
            .build();
        InterceptorMetadata::of(&class, InterceptorRole::Interceptor)
    }

    fn counter_class(ctor_runs: Arc<AtomicU32>) -> Arc<ClassMetadata> {
        ClassMetadata::builder("Counter")
            .constructor(["u32"], move |args: CallArgs| {
                ctor_runs.fetch_add(1, Ordering::SeqCst);
                Ok(*args.get::<u32>(0)?)
            })
            .business_method(
                MethodSignature::new("bump"),
                |recv: &mut (dyn std::any::Any + Send), args: &mut CallArgs| {
                    args.push("bump".to_string());
                    let counter = recv.downcast_mut::<u32>().unwrap();
                    *counter += 1;
                    Ok(CallValue::of(*counter))
                },
            )
            .build()
    }

    fn target_metadata(class: &Arc<ClassMetadata>) -> Arc<InterceptorMetadata> {
        InterceptorMetadata::of(class, InterceptorRole::TargetClass)
    }

    fn creator_with(interceptor: Arc<InterceptorMetadata>, target: ClassId) -> InterceptorProxyCreator {
        let registry = BindingModelRegistry::builder().bind(target, interceptor).build();
        InterceptorProxyCreator::single(Arc::new(registry), Arc::new(DefaultHandlerFactory::new()))
    }

    #[test]
    fn test_from_instance_wraps_without_running_constructor() {
        let ctor_runs = Arc::new(AtomicU32::new(0));
        let class = counter_class(ctor_runs.clone());
        let creator = creator_with(audit_interceptor(), class.id().clone());

        let surrogate = creator
            .create_proxy_from_instance(Box::new(5u32), &class, &target_metadata(&class))
            .unwrap();
        assert_eq!(ctor_runs.load(Ordering::SeqCst), 0);

        let value = surrogate.invoke("bump", CallArgs::new()).unwrap();
        assert_eq!(value.downcast::<u32>().unwrap(), 6);
        surrogate.with_instance(|n: &u32| assert_eq!(*n, 6)).unwrap();
    }

    #[test]
    fn test_from_class_runs_constructor_once_with_args() {
        let ctor_runs = Arc::new(AtomicU32::new(0));
        let class = counter_class(ctor_runs.clone());
        let creator = creator_with(audit_interceptor(), class.id().clone());

        let surrogate = creator
            .create_proxy_from_class(
                &class,
                &[TypeName::from("u32")],
                CallArgs::new().with(10u32),
                &target_metadata(&class),
            )
            .unwrap();
        assert_eq!(ctor_runs.load(Ordering::SeqCst), 1);

        let value = surrogate.invoke("bump", CallArgs::new()).unwrap();
        assert_eq!(value.downcast::<u32>().unwrap(), 11);
        assert_eq!(ctor_runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unbound_target_behaves_like_direct_call() {
        let class = counter_class(Arc::new(AtomicU32::new(0)));
        let registry = BindingModelRegistry::builder().build();
        let creator = InterceptorProxyCreator::single(
            Arc::new(registry),
            Arc::new(DefaultHandlerFactory::new()),
        );
        let surrogate = creator
            .create_proxy_from_instance(Box::new(3u32), &class, &target_metadata(&class))
            .unwrap();
        let value = surrogate.invoke("bump", CallArgs::new()).unwrap();
        assert_eq!(value.downcast::<u32>().unwrap(), 4);
        let err = surrogate.invoke("absent", CallArgs::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownMethod { .. }));
    }

    #[test]
    fn test_unknown_constructor_signature() {
        let class = counter_class(Arc::new(AtomicU32::new(0)));
        let creator = creator_with(audit_interceptor(), class.id().clone());
        let err = creator
            .create_proxy_from_class(&class, &[], CallArgs::new(), &target_metadata(&class))
            .unwrap_err();
        assert!(matches!(err, Error::ProxyConstruction { .. }));
    }

    #[test]
    fn test_two_registries_chain_in_registry_order() {
        let class = counter_class(Arc::new(AtomicU32::new(0)));
        let log: Arc<parking_lot::Mutex<Vec<&'static str>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let tag_interceptor = |tag: &'static str| {
            let log = log.clone();
            let ic = ClassMetadata::builder(format!("{tag}I"))
                .default_constructor(|| ())
                .interceptor_method(
                    MethodSignature::new("tag"),
                    InterceptionCategory::AroundInvoke,
                    move |_recv: &mut (dyn std::any::Any + Send),
                          inv: &mut dyn InvocationContext| {
                        log.lock().push(tag);
                        inv.proceed()
                    },
                )
                .build();
            InterceptorMetadata::of(&ic, InterceptorRole::Interceptor)
        };
        let first = BindingModelRegistry::builder()
            .bind(class.id().clone(), tag_interceptor("first"))
            .build();
        let second = BindingModelRegistry::builder()
            .bind(class.id().clone(), tag_interceptor("second"))
            .build();
        let creator = InterceptorProxyCreator::new(
            vec![Arc::new(first), Arc::new(second)],
            vec![Arc::new(DefaultHandlerFactory::new())],
            Arc::new(DescriptorProxyClassProvider::new()),
        );

        let surrogate = creator
            .create_proxy_from_instance(Box::new(0u32), &class, &target_metadata(&class))
            .unwrap();
        surrogate.invoke("bump", CallArgs::new()).unwrap();
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_audit_records_around_business_result() {
        let log: Arc<parking_lot::Mutex<Vec<String>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));

        let audit_log = log.clone();
        let audit = ClassMetadata::builder("Audit")
            .default_constructor(|| ())
            .interceptor_method(
                MethodSignature::new("audit"),
                InterceptionCategory::AroundInvoke,
                move |_recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
                    audit_log.lock().push("before".to_string());
                    let outcome = inv.proceed()?;
                    audit_log.lock().push("after".to_string());
                    Ok(outcome)
                },
            )
            .build();

        let work_log = log.clone();
        let service = ClassMetadata::builder("Service")
            .default_constructor(|| ())
            .business_method(
                MethodSignature::new("do_work"),
                move |_recv: &mut (dyn std::any::Any + Send), _args: &mut CallArgs| {
                    work_log.lock().push("result".to_string());
                    Ok(CallValue::of("result"))
                },
            )
            .build();

        let creator = creator_with(
            InterceptorMetadata::of(&audit, InterceptorRole::Interceptor),
            service.id().clone(),
        );
        let surrogate = creator
            .create_proxy_from_class(&service, &[], CallArgs::new(), &target_metadata(&service))
            .unwrap();
        let value = surrogate.invoke("do_work", CallArgs::new()).unwrap();
        // The business result comes back unchanged, bracketed by the audit.
        assert_eq!(value.downcast::<&str>().unwrap(), "result");
        assert_eq!(*log.lock(), vec!["before", "result", "after"]);
    }

    #[test]
    fn test_interceptor_error_propagates() {
        let failing = ClassMetadata::builder("Failing")
            .default_constructor(|| ())
            .interceptor_method(
                MethodSignature::new("fail"),
                InterceptionCategory::AroundInvoke,
                |_recv: &mut (dyn std::any::Any + Send), _inv: &mut dyn InvocationContext| {
                    Err(Error::invocation("interceptor refused"))
                },
            )
            .build();
        let class = counter_class(Arc::new(AtomicU32::new(0)));
        let creator = creator_with(
            InterceptorMetadata::of(&failing, InterceptorRole::Interceptor),
            class.id().clone(),
        );
        let surrogate = creator
            .create_proxy_from_instance(Box::new(0u32), &class, &target_metadata(&class))
            .unwrap();
        let err = surrogate.invoke("bump", CallArgs::new()).unwrap_err();
        assert!(matches!(err, Error::Invocation(_)));
        // The chain never proceeded.
        surrogate.with_instance(|n: &u32| assert_eq!(*n, 0)).unwrap();
    }

    #[test]
    fn test_post_construct_chain_runs() {
        let observed = Arc::new(AtomicU32::new(0));
        let seen = observed.clone();
        let lifecycle = ClassMetadata::builder("Lifecycle")
            .default_constructor(|| ())
            .interceptor_method(
                MethodSignature::new("init"),
                InterceptionCategory::PostConstruct,
                move |_recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    inv.proceed()
                },
            )
            .build();
        let class = counter_class(Arc::new(AtomicU32::new(0)));
        let creator = creator_with(
            InterceptorMetadata::of(&lifecycle, InterceptorRole::Interceptor),
            class.id().clone(),
        );
        let surrogate = creator
            .create_proxy_from_instance(Box::new(0u32), &class, &target_metadata(&class))
            .unwrap();
        assert!(surrogate.post_construct().unwrap().is_unit());
        assert_eq!(observed.load(Ordering::SeqCst), 1);
        // Business interception is unaffected.
        surrogate.invoke("bump", CallArgs::new()).unwrap();
        surrogate.with_instance(|n: &u32| assert_eq!(*n, 1)).unwrap();
    }

    #[test]
    fn test_timeout_and_passivation_chains_are_reachable() {
        let hits: Arc<parking_lot::Mutex<Vec<&'static str>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let on_timeout = hits.clone();
        let on_activate = hits.clone();
        let on_passivate = hits.clone();
        let timers = ClassMetadata::builder("Timers")
            .default_constructor(|| ())
            .interceptor_method(
                MethodSignature::new("on_timeout"),
                InterceptionCategory::AroundTimeout,
                move |_recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
                    on_timeout.lock().push("timeout");
                    inv.proceed()
                },
            )
            .interceptor_method(
                MethodSignature::new("on_activate"),
                InterceptionCategory::PostActivate,
                move |_recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
                    on_activate.lock().push("activate");
                    inv.proceed()
                },
            )
            .interceptor_method(
                MethodSignature::new("on_passivate"),
                InterceptionCategory::PrePassivate,
                move |_recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
                    on_passivate.lock().push("passivate");
                    inv.proceed()
                },
            )
            .build();
        let class = counter_class(Arc::new(AtomicU32::new(0)));
        let creator = creator_with(
            InterceptorMetadata::of(&timers, InterceptorRole::Interceptor),
            class.id().clone(),
        );
        let surrogate = creator
            .create_proxy_from_instance(Box::new(0u32), &class, &target_metadata(&class))
            .unwrap();

        // An ordinary call maps to around-invoke and runs none of these.
        surrogate.invoke("bump", CallArgs::new()).unwrap();
        assert!(hits.lock().is_empty());

        // A timer call runs the around-timeout chain and still reaches the
        // business method.
        let value = surrogate.invoke_timeout("bump", CallArgs::new()).unwrap();
        assert_eq!(value.downcast::<u32>().unwrap(), 2);
        assert!(surrogate.post_activate().unwrap().is_unit());
        assert!(surrogate.pre_passivate().unwrap().is_unit());
        assert_eq!(*hits.lock(), vec!["timeout", "activate", "passivate"]);
    }

    #[test]
    fn test_create_proxy_instance_uses_raw_allocation() {
        let class = ClassMetadata::builder("NoCtor")
            .raw_allocator(|| 7u32)
            .business_method(
                MethodSignature::new("get"),
                |recv: &mut (dyn std::any::Any + Send), _args: &mut CallArgs| {
                    Ok(CallValue::of(*recv.downcast_ref::<u32>().unwrap()))
                },
            )
            .build();
        let creator = creator_with(audit_interceptor(), class.id().clone());
        let proxy_class = Arc::new(ProxyClass::new(class.clone(), ProxyMode::Subclass));
        let models = creator.models_for(class.id());
        let dispatcher = InterceptorDispatcher::new(
            DispatchMode::Subclass,
            class.clone(),
            models,
            &[Arc::new(DefaultHandlerFactory::new()) as Arc<dyn InterceptionHandlerFactory>],
            target_metadata(&class),
        )
        .unwrap();
        let surrogate = creator
            .create_proxy_instance(proxy_class, Arc::new(dispatcher))
            .unwrap();
        let value = surrogate.invoke("get", CallArgs::new()).unwrap();
        assert_eq!(value.downcast::<u32>().unwrap(), 7);
    }
}
