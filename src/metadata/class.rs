// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Class and method metadata
//!
//! Immutable, shareable descriptors built once at registration time by a
//! metadata provider. The dispatcher never introspects types at runtime;
//! everything it needs to know about a class is captured here, including
//! invocable method and constructor bodies.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::{BusinessFn, CallArgs, CallValue, Instance, InterceptorFn, InvocationContext};
use crate::error::{Error, Result};

/// Cheap-to-clone class identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassId(Arc<str>);

impl ClassId {
    /// Create a new class identity
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        ClassId(name.into())
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(name: &str) -> Self {
        ClassId::new(name)
    }
}

impl From<String> for ClassId {
    fn from(name: String) -> Self {
        ClassId::new(name)
    }
}

/// Type identity used for return types, parameter types, and constructor
/// signature matching
pub type TypeName = Arc<str>;

/// Opaque declarative marker attached to classes and methods by the
/// metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker(Arc<str>);

impl Marker {
    /// Create a new marker
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Marker(name.into())
    }

    /// Marker name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Marker {
    fn from(name: &str) -> Self {
        Marker::new(name)
    }
}

impl From<InterceptionCategory> for Marker {
    fn from(category: InterceptionCategory) -> Self {
        Marker::new(category.marker_name())
    }
}

/// Classifies *when* an interceptor chain applies
///
/// Categories are opaque tags to the dispatch layer; the calling convention
/// decides which one a given entry point maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterceptionCategory {
    /// Around an ordinary business method invocation
    AroundInvoke,
    /// Around a timer callback
    AroundTimeout,
    /// After construction completes
    PostConstruct,
    /// Before teardown
    PreDestroy,
    /// After activation
    PostActivate,
    /// Before passivation
    PrePassivate,
}

impl InterceptionCategory {
    /// Every known category, in a stable order
    pub const ALL: [InterceptionCategory; 6] = [
        InterceptionCategory::AroundInvoke,
        InterceptionCategory::AroundTimeout,
        InterceptionCategory::PostConstruct,
        InterceptionCategory::PreDestroy,
        InterceptionCategory::PostActivate,
        InterceptionCategory::PrePassivate,
    ];

    /// Marker name declaring a method for this category
    pub fn marker_name(self) -> &'static str {
        match self {
            InterceptionCategory::AroundInvoke => "around-invoke",
            InterceptionCategory::AroundTimeout => "around-timeout",
            InterceptionCategory::PostConstruct => "post-construct",
            InterceptionCategory::PreDestroy => "pre-destroy",
            InterceptionCategory::PostActivate => "post-activate",
            InterceptionCategory::PrePassivate => "pre-passivate",
        }
    }

    /// Map a declarative marker back to a category, if it names one
    pub fn from_marker(marker: &Marker) -> Option<Self> {
        InterceptionCategory::ALL
            .into_iter()
            .find(|c| c.marker_name() == marker.name())
    }

    /// Whether this category wraps a lifecycle transition rather than a
    /// business call
    pub fn is_lifecycle(self) -> bool {
        !matches!(
            self,
            InterceptionCategory::AroundInvoke | InterceptionCategory::AroundTimeout
        )
    }
}

impl fmt::Display for InterceptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker_name())
    }
}

/// Method signature: name, parameter types, return type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    name: Arc<str>,
    param_types: Vec<TypeName>,
    return_type: TypeName,
}

impl MethodSignature {
    /// Create a signature with no parameters and a unit return
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        MethodSignature {
            name: name.into(),
            param_types: Vec::new(),
            return_type: TypeName::from("()"),
        }
    }

    /// Set parameter types
    pub fn params<P, I>(mut self, params: P) -> Self
    where
        P: IntoIterator<Item = I>,
        I: Into<TypeName>,
    {
        self.param_types = params.into_iter().map(Into::into).collect();
        self
    }

    /// Set the return type
    pub fn returning(mut self, return_type: impl Into<TypeName>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types
    pub fn param_types(&self) -> &[TypeName] {
        &self.param_types
    }

    /// Return type
    pub fn return_type(&self) -> &TypeName {
        &self.return_type
    }
}

impl From<&str> for MethodSignature {
    fn from(name: &str) -> Self {
        MethodSignature::new(name)
    }
}

/// Invocable body carried by a method descriptor
#[derive(Clone)]
pub enum MethodBody {
    /// Real target logic: receives the target instance and the call arguments
    Business(Arc<BusinessFn>),
    /// Interceptor logic: receives the interceptor instance and the in-flight
    /// invocation, which it may proceed or short-circuit
    Interceptor(Arc<InterceptorFn>),
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Business(_) => f.write_str("MethodBody::Business"),
            MethodBody::Interceptor(_) => f.write_str("MethodBody::Interceptor"),
        }
    }
}

/// Immutable view over a single method
///
/// Many surrogates may share one instance; all state is fixed at
/// construction, so concurrent reads are safe.
#[derive(Debug, Clone)]
pub struct MethodMetadata {
    signature: MethodSignature,
    declaring_class: ClassId,
    markers: Vec<Marker>,
    body: MethodBody,
}

impl MethodMetadata {
    /// Describe a business method
    pub fn business(
        signature: impl Into<MethodSignature>,
        declaring_class: ClassId,
        markers: Vec<Marker>,
        body: Arc<BusinessFn>,
    ) -> Self {
        MethodMetadata {
            signature: signature.into(),
            declaring_class,
            markers,
            body: MethodBody::Business(body),
        }
    }

    /// Describe an interceptor method
    pub fn interceptor(
        signature: impl Into<MethodSignature>,
        declaring_class: ClassId,
        markers: Vec<Marker>,
        body: Arc<InterceptorFn>,
    ) -> Self {
        MethodMetadata {
            signature: signature.into(),
            declaring_class,
            markers,
            body: MethodBody::Interceptor(body),
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// Full signature
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Class that declared this method
    pub fn declaring_class(&self) -> &ClassId {
        &self.declaring_class
    }

    /// Parameter types
    pub fn param_types(&self) -> &[TypeName] {
        self.signature.param_types()
    }

    /// Return type
    pub fn return_type(&self) -> &TypeName {
        self.signature.return_type()
    }

    /// Declarative markers on this method
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Whether this method carries the given marker
    pub fn has_marker(&self, marker: &Marker) -> bool {
        self.markers.contains(marker)
    }

    /// Interception categories this method is declared for
    pub fn categories(&self) -> impl Iterator<Item = InterceptionCategory> + '_ {
        self.markers.iter().filter_map(InterceptionCategory::from_marker)
    }

    /// Whether `self` overrides `other` (same name and parameter types)
    pub fn overrides(&self, other: &MethodMetadata) -> bool {
        self.name() == other.name() && self.param_types() == other.param_types()
    }

    /// Run the business body against a target instance
    pub fn invoke_business(
        &self,
        receiver: &mut (dyn Any + Send),
        args: &mut CallArgs,
    ) -> Result<CallValue> {
        match &self.body {
            MethodBody::Business(f) => f(receiver, args),
            MethodBody::Interceptor(_) => Err(Error::BodyMismatch {
                method: self.name().to_string(),
                expected: "business",
            }),
        }
    }

    /// Run the interceptor body against an interceptor instance
    pub fn invoke_interceptor(
        &self,
        receiver: &mut (dyn Any + Send),
        ctx: &mut dyn InvocationContext,
    ) -> Result<CallValue> {
        match &self.body {
            MethodBody::Interceptor(f) => f(receiver, ctx),
            MethodBody::Business(_) => Err(Error::BodyMismatch {
                method: self.name().to_string(),
                expected: "interceptor",
            }),
        }
    }
}

/// Constructor factory for producing new instances from a class when raw
/// allocation is not wanted
pub type ConstructFn = dyn Fn(CallArgs) -> Result<Instance> + Send + Sync;

/// Factory producing an instance without running any constructor body
pub type RawAllocateFn = dyn Fn() -> Instance + Send + Sync;

/// Immutable view over a single constructor
#[derive(Clone)]
pub struct ConstructorMetadata {
    declaring_class: ClassId,
    param_types: Vec<TypeName>,
    body: Arc<ConstructFn>,
}

impl ConstructorMetadata {
    /// Describe a constructor
    pub fn new(declaring_class: ClassId, param_types: Vec<TypeName>, body: Arc<ConstructFn>) -> Self {
        ConstructorMetadata {
            declaring_class,
            param_types,
            body,
        }
    }

    /// Class that declared this constructor
    pub fn declaring_class(&self) -> &ClassId {
        &self.declaring_class
    }

    /// Parameter types
    pub fn param_types(&self) -> &[TypeName] {
        &self.param_types
    }

    /// Run the constructor with the supplied arguments
    pub fn invoke(&self, args: CallArgs) -> Result<Instance> {
        (self.body)(args)
    }
}

impl fmt::Debug for ConstructorMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorMetadata")
            .field("declaring_class", &self.declaring_class)
            .field("param_types", &self.param_types)
            .finish()
    }
}

/// Immutable view over a class: identity, hierarchy position, markers,
/// declared methods and constructors
pub struct ClassMetadata {
    id: ClassId,
    superclass: Option<Arc<ClassMetadata>>,
    markers: Vec<Marker>,
    methods: Vec<Arc<MethodMetadata>>,
    constructors: Vec<Arc<ConstructorMetadata>>,
    raw_allocator: Option<Arc<RawAllocateFn>>,
}

impl ClassMetadata {
    /// Start building a class descriptor
    pub fn builder(id: impl Into<ClassId>) -> ClassMetadataBuilder {
        ClassMetadataBuilder::new(id.into())
    }

    /// Class identity
    pub fn id(&self) -> &ClassId {
        &self.id
    }

    /// Superclass descriptor, if any
    pub fn superclass(&self) -> Option<&Arc<ClassMetadata>> {
        self.superclass.as_ref()
    }

    /// Declarative markers on this class
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Whether this class carries the given marker
    pub fn has_marker(&self, marker: &Marker) -> bool {
        self.markers.contains(marker)
    }

    /// Methods declared directly on this class
    pub fn declared_methods(&self) -> &[Arc<MethodMetadata>] {
        &self.methods
    }

    /// Declared plus inherited methods, most-derived version winning
    pub fn methods(&self) -> Vec<Arc<MethodMetadata>> {
        let mut resolved = match &self.superclass {
            Some(superclass) => superclass.methods(),
            None => Vec::new(),
        };
        for method in &self.methods {
            if let Some(pos) = resolved.iter().position(|m| method.overrides(m)) {
                resolved[pos] = method.clone();
            } else {
                resolved.push(method.clone());
            }
        }
        resolved
    }

    /// Look up a method by name, most-derived declaration winning
    pub fn find_method(&self, name: &str) -> Option<Arc<MethodMetadata>> {
        if let Some(method) = self.methods.iter().find(|m| m.name() == name) {
            return Some(method.clone());
        }
        self.superclass.as_ref().and_then(|s| s.find_method(name))
    }

    /// Constructors declared on this class
    pub fn constructors(&self) -> &[Arc<ConstructorMetadata>] {
        &self.constructors
    }

    /// Look up a constructor by exact parameter types
    pub fn find_constructor(&self, param_types: &[TypeName]) -> Option<&Arc<ConstructorMetadata>> {
        self.constructors
            .iter()
            .find(|c| c.param_types() == param_types)
    }

    /// No-argument constructor, if the class declares one
    pub fn no_arg_constructor(&self) -> Option<&Arc<ConstructorMetadata>> {
        self.find_constructor(&[])
    }

    /// Constructor-bypassing allocation factory, if registered.
    ///
    /// The produced value has not run any constructor body; callers must not
    /// rely on invariants a constructor would normally establish.
    pub fn raw_allocator(&self) -> Option<&Arc<RawAllocateFn>> {
        self.raw_allocator.as_ref()
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("id", &self.id)
            .field("superclass", &self.superclass.as_ref().map(|s| s.id()))
            .field("markers", &self.markers)
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Builder for [`ClassMetadata`]
pub struct ClassMetadataBuilder {
    id: ClassId,
    superclass: Option<Arc<ClassMetadata>>,
    markers: Vec<Marker>,
    methods: Vec<Arc<MethodMetadata>>,
    constructors: Vec<Arc<ConstructorMetadata>>,
    raw_allocator: Option<Arc<RawAllocateFn>>,
}

impl ClassMetadataBuilder {
    fn new(id: ClassId) -> Self {
        ClassMetadataBuilder {
            id,
            superclass: None,
            markers: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            raw_allocator: None,
        }
    }

    /// Set the superclass
    pub fn superclass(mut self, superclass: Arc<ClassMetadata>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Add a class-level marker
    pub fn marker(mut self, marker: impl Into<Marker>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Add a pre-built method descriptor
    pub fn method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    /// Add a business method
    pub fn business_method<S, F>(mut self, signature: S, body: F) -> Self
    where
        S: Into<MethodSignature>,
        F: Fn(&mut (dyn Any + Send), &mut CallArgs) -> Result<CallValue> + Send + Sync + 'static,
    {
        let method = MethodMetadata::business(signature, self.id.clone(), Vec::new(), Arc::new(body));
        self.methods.push(Arc::new(method));
        self
    }

    /// Add an interceptor method declared for one category
    pub fn interceptor_method<S, F>(
        mut self,
        signature: S,
        category: InterceptionCategory,
        body: F,
    ) -> Self
    where
        S: Into<MethodSignature>,
        F: Fn(&mut (dyn Any + Send), &mut dyn InvocationContext) -> Result<CallValue>
            + Send
            + Sync
            + 'static,
    {
        let method = MethodMetadata::interceptor(
            signature,
            self.id.clone(),
            vec![Marker::from(category)],
            Arc::new(body),
        );
        self.methods.push(Arc::new(method));
        self
    }

    /// Add a constructor taking the given parameter types
    pub fn constructor<P, I, T, F>(mut self, param_types: P, body: F) -> Self
    where
        P: IntoIterator<Item = I>,
        I: Into<TypeName>,
        T: Any + Send,
        F: Fn(CallArgs) -> Result<T> + Send + Sync + 'static,
    {
        let params: Vec<TypeName> = param_types.into_iter().map(Into::into).collect();
        let ctor = ConstructorMetadata::new(
            self.id.clone(),
            params,
            Arc::new(move |args| body(args).map(|v| Box::new(v) as Instance)),
        );
        self.constructors.push(Arc::new(ctor));
        self
    }

    /// Add a no-argument constructor
    pub fn default_constructor<T, F>(mut self, body: F) -> Self
    where
        T: Any + Send,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let ctor = ConstructorMetadata::new(
            self.id.clone(),
            Vec::new(),
            Arc::new(move |_args| Ok(Box::new(body()) as Instance)),
        );
        self.constructors.push(Arc::new(ctor));
        self
    }

    /// Register a constructor-bypassing allocation fallback
    pub fn raw_allocator<T, F>(mut self, body: F) -> Self
    where
        T: Any + Send,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.raw_allocator = Some(Arc::new(move || Box::new(body()) as Instance));
        self
    }

    /// Finish building
    pub fn build(self) -> Arc<ClassMetadata> {
        Arc::new(ClassMetadata {
            id: self.id,
            superclass: self.superclass,
            markers: self.markers,
            methods: self.methods,
            constructors: self.constructors,
            raw_allocator: self.raw_allocator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_business() -> Arc<BusinessFn> {
        Arc::new(|_recv, _args| Ok(CallValue::unit()))
    }

    #[test]
    fn test_category_marker_round_trip() {
        for category in InterceptionCategory::ALL {
            let marker = Marker::from(category);
            assert_eq!(InterceptionCategory::from_marker(&marker), Some(category));
        }
        assert_eq!(
            InterceptionCategory::from_marker(&Marker::from("transactional")),
            None
        );
    }

    #[test]
    fn test_lifecycle_categories() {
        assert!(!InterceptionCategory::AroundInvoke.is_lifecycle());
        assert!(!InterceptionCategory::AroundTimeout.is_lifecycle());
        assert!(InterceptionCategory::PostConstruct.is_lifecycle());
        assert!(InterceptionCategory::PreDestroy.is_lifecycle());
    }

    #[test]
    fn test_method_overrides_by_signature() {
        let a = MethodMetadata::business(
            MethodSignature::new("run").params(["i32"]),
            ClassId::from("Base"),
            Vec::new(),
            noop_business(),
        );
        let b = MethodMetadata::business(
            MethodSignature::new("run").params(["i32"]),
            ClassId::from("Derived"),
            Vec::new(),
            noop_business(),
        );
        let c = MethodMetadata::business(
            MethodSignature::new("run").params(["u64"]),
            ClassId::from("Derived"),
            Vec::new(),
            noop_business(),
        );
        assert!(b.overrides(&a));
        assert!(!c.overrides(&a));
    }

    #[test]
    fn test_find_method_prefers_most_derived() {
        let base = ClassMetadata::builder("Base")
            .business_method("greet", |_recv, _args| Ok(CallValue::of("base")))
            .business_method("only_base", |_recv, _args| Ok(CallValue::unit()))
            .build();
        let derived = ClassMetadata::builder("Derived")
            .superclass(base)
            .business_method("greet", |_recv, _args| Ok(CallValue::of("derived")))
            .build();

        let greet = derived.find_method("greet").unwrap();
        assert_eq!(greet.declaring_class().name(), "Derived");

        let only_base = derived.find_method("only_base").unwrap();
        assert_eq!(only_base.declaring_class().name(), "Base");

        assert!(derived.find_method("missing").is_none());
    }

    #[test]
    fn test_methods_resolves_overrides_once() {
        let base = ClassMetadata::builder("Base")
            .business_method("greet", |_recv, _args| Ok(CallValue::unit()))
            .build();
        let derived = ClassMetadata::builder("Derived")
            .superclass(base)
            .business_method("greet", |_recv, _args| Ok(CallValue::unit()))
            .business_method("extra", |_recv, _args| Ok(CallValue::unit()))
            .build();

        let methods = derived.methods();
        assert_eq!(methods.len(), 2);
        let greet = methods.iter().find(|m| m.name() == "greet").unwrap();
        assert_eq!(greet.declaring_class().name(), "Derived");
    }

    #[test]
    fn test_constructor_lookup_by_signature() {
        struct Widget;
        let class = ClassMetadata::builder("Widget")
            .default_constructor(|| Widget)
            .constructor(["u32"], |args| {
                let _size = *args.get::<u32>(0)?;
                Ok(Widget)
            })
            .build();

        assert!(class.no_arg_constructor().is_some());
        assert!(class.find_constructor(&[TypeName::from("u32")]).is_some());
        assert!(class.find_constructor(&[TypeName::from("i64")]).is_none());
    }

    #[test]
    fn test_body_mismatch_is_an_error() {
        let class = ClassMetadata::builder("Widget")
            .business_method("work", |_recv, _args| Ok(CallValue::unit()))
            .build();
        let method = class.find_method("work").unwrap();
        let mut instance: Instance = Box::new(());

        // A business method cannot serve as an interceptor link.
        struct NoopCtx;
        impl InvocationContext for NoopCtx {
            fn proceed(&mut self) -> Result<CallValue> {
                Ok(CallValue::unit())
            }
            fn method(&self) -> Option<&MethodMetadata> {
                None
            }
            fn category(&self) -> InterceptionCategory {
                InterceptionCategory::AroundInvoke
            }
            fn args(&self) -> &CallArgs {
                unreachable!()
            }
            fn args_mut(&mut self) -> &mut CallArgs {
                unreachable!()
            }
        }
        let result = method.invoke_interceptor(instance.as_mut(), &mut NoopCtx);
        assert!(matches!(result, Err(Error::BodyMismatch { .. })));
    }

    #[test]
    fn test_method_categories_from_markers() {
        let class = ClassMetadata::builder("Audit")
            .interceptor_method("around", InterceptionCategory::AroundInvoke, |_recv, inv| {
                inv.proceed()
            })
            .build();
        let method = class.find_method("around").unwrap();
        let categories: Vec<_> = method.categories().collect();
        assert_eq!(categories, vec![InterceptionCategory::AroundInvoke]);
    }
}
