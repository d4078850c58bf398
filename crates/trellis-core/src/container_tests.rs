    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;
    use trellis_protocols::ComponentError;

    struct Service {
        foo: Arc<String>,
        bar: Arc<String>,
    }

    impl Component for Service {}

    fn service_class() -> ComponentClass {
        ComponentClass::new("Service", "fn new($foo, bar)", |deps| {
            Ok(Service {
                foo: deps.get::<String>(0)?,
                bar: deps.get::<String>(1)?,
            })
        })
    }

    struct Tracked {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl Component for Tracked {
        fn dispose(&self) -> Option<Result<(), ComponentError>> {
            self.log.lock().push(self.name);
            if self.fail {
                Some(Err(ComponentError::DisposeFailed(self.name.to_string())))
            } else {
                Some(Ok(()))
            }
        }
    }

    fn tracked(
        name: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    ) -> Arc<Tracked> {
        Arc::new(Tracked {
            name,
            log: log.clone(),
            fail,
        })
    }

    #[test]
    fn test_resolve_unknown_component() {
        let container = Container::new();
        let result = container.resolve("nope");
        assert!(matches!(result, Err(ContainerError::UnknownComponent(name)) if name == "nope"));
    }

    #[test]
    fn test_registered_value_is_returned_unchanged() {
        let container = Container::new();
        let value = Arc::new(serde_json::json!({"a": 1}));
        container.register_value("obj", value.clone()).unwrap();

        let resolved = container.resolve_as::<serde_json::Value>("obj").unwrap();
        assert!(Arc::ptr_eq(&value, &resolved));
    }

    #[test]
    fn test_resolve_twice_returns_same_instance() {
        let container = Container::new();
        container.register_value("foo", Arc::new("foo".to_string())).unwrap();
        container.register_value("bar", Arc::new("bar".to_string())).unwrap();
        container.register_class("service", service_class()).unwrap();

        let first = container.resolve("service").unwrap();
        let second = container.resolve("service").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            container.resolution_state("service"),
            Some(ResolutionState::Resolved)
        );
    }

    #[test]
    fn test_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let container = Container::new();
        container
            .register_factory("answer", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(42i64)
            })
            .unwrap();

        assert_eq!(*container.resolve_as::<i64>("answer").unwrap(), 42);
        assert_eq!(*container.resolve_as::<i64>("answer").unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_class_dependencies_are_injected() {
        let container = Container::new();
        let foo = Arc::new("foo".to_string());
        container.register_value("foo", foo.clone()).unwrap();
        container.register_value("bar", Arc::new("bar".to_string())).unwrap();
        container.register_class("service", service_class()).unwrap();

        let service = container.resolve_as::<Service>("service").unwrap();
        assert!(Arc::ptr_eq(&service.foo, &foo));
        assert_eq!(service.bar.as_str(), "bar");
    }

    #[test]
    fn test_override_wins_for_that_parameter_only() {
        let container = Container::new();
        let foo = Arc::new("registered foo".to_string());
        container.register_value("foo", foo.clone()).unwrap();
        container
            .register_value("bar", Arc::new("registered bar".to_string()))
            .unwrap();

        let x = Arc::new("X".to_string());
        let overrides = Overrides::new().with("bar", x.clone());
        let instance = container.resolve_class(&service_class(), &overrides).unwrap();
        let service = downcast::<Service>(&instance).unwrap();

        assert!(Arc::ptr_eq(&service.foo, &foo));
        assert!(Arc::ptr_eq(&service.bar, &x));
    }

    #[test]
    fn test_override_supplies_unregistered_dependency() {
        let container = Container::new();
        container.register_value("foo", Arc::new("foo".to_string())).unwrap();
        let overrides = Overrides::new().with("$bar", Arc::new("only here".to_string()));

        let instance = container.resolve_class(&service_class(), &overrides).unwrap();
        let service = downcast::<Service>(&instance).unwrap();
        assert_eq!(service.bar.as_str(), "only here");
    }

    #[test]
    fn test_resolve_class_is_never_cached() {
        let container = Container::new();
        container.register_value("foo", Arc::new("foo".to_string())).unwrap();
        container.register_value("bar", Arc::new("bar".to_string())).unwrap();

        let class = service_class();
        let first = container.resolve_class(&class, &Overrides::new()).unwrap();
        let second = container.resolve_class(&class, &Overrides::new()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_overrides_ignored_once_cached() {
        let container = Container::new();
        container.register_value("foo", Arc::new("foo".to_string())).unwrap();
        container.register_value("bar", Arc::new("bar".to_string())).unwrap();
        container.register_class("service", service_class()).unwrap();

        let first = container.resolve("service").unwrap();
        let overrides = Overrides::new().with("bar", Arc::new("other".to_string()));
        let second = container.resolve_with("service", &overrides).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_marker_names_resolve_identically() {
        let container = Container::new();
        container.register_value("$fs", Arc::new(true)).unwrap();
        let a = container.resolve("fs").unwrap();
        let b = container.resolve("$fs").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(container.is_registered("$fs"));
    }

    #[test]
    fn test_transient_builds_every_time() {
        let container = Container::new();
        container
            .register_transient_class("counter", ComponentClass::new("Counter", "()", |_| Ok(0u64)))
            .unwrap();
        let first = container.resolve("counter").unwrap();
        let second = container.resolve("counter").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(
            container.resolution_state("counter"),
            Some(ResolutionState::Unresolved)
        );
    }

    #[test]
    fn test_circular_dependency() {
        let container = Container::new();
        container
            .register_class(
                "a",
                ComponentClass::from_instance_fn("A", "fn new(b)", |deps| deps.instance(0)),
            )
            .unwrap();
        container
            .register_class(
                "b",
                ComponentClass::from_instance_fn("B", "fn new(a)", |deps| deps.instance(0)),
            )
            .unwrap();

        let err = container.resolve("a").err().unwrap();
        match err {
            ContainerError::CircularDependency { chain } => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            container.resolution_state("a"),
            Some(ResolutionState::Unresolved)
        );
        assert_eq!(
            container.resolution_state("b"),
            Some(ResolutionState::Unresolved)
        );
    }

    #[test]
    fn test_concurrent_resolution_is_not_a_cycle() {
        use std::sync::Barrier;

        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let container = Arc::new(Container::new());
        {
            let started = started.clone();
            let release = release.clone();
            container
                .register_factory("slow", move || {
                    started.wait();
                    release.wait();
                    Ok(1i64)
                })
                .unwrap();
        }
        container.register_value("fast", Arc::new(2i64)).unwrap();

        let worker = {
            let container = container.clone();
            std::thread::spawn(move || container.resolve("slow"))
        };
        started.wait();

        assert!(matches!(
            container.resolve("slow"),
            Err(ContainerError::ResolutionInProgress(name)) if name == "slow"
        ));
        assert!(container.resolve("fast").is_ok());

        release.wait();
        let from_worker = worker.join().unwrap().unwrap();
        let cached = container.resolve("slow").unwrap();
        assert!(Arc::ptr_eq(&from_worker, &cached));
    }

    #[test]
    fn test_self_dependency() {
        let container = Container::new();
        container
            .register_class(
                "loop",
                ComponentClass::from_instance_fn("Loop", "|$loop| loop", |deps| deps.instance(0)),
            )
            .unwrap();
        let err = container.resolve("loop").err().unwrap();
        assert_eq!(err.to_string(), "Circular dependency detected: loop -> loop");
    }

    #[test]
    fn test_signature_error_aborts_resolution() {
        let container = Container::new();
        container
            .register_class("broken", ComponentClass::new("Broken", "fn new(a b)", |_| Ok(true)))
            .unwrap();
        assert!(matches!(
            container.resolve("broken"),
            Err(ContainerError::Signature { .. })
        ));
    }

    #[test]
    fn test_construction_error_propagates() {
        let container = Container::new();
        container
            .register_class(
                "failing",
                ComponentClass::new("Failing", "()", |_| -> Result<bool, ContainerError> {
                    Err(ContainerError::construction("Failing", "disk full"))
                }),
            )
            .unwrap();

        let err = container.resolve("failing").err().unwrap();
        assert!(matches!(err, ContainerError::Construction { .. }));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_missing_dependency_is_unknown_component() {
        let container = Container::new();
        container.register_value("foo", Arc::new("foo".to_string())).unwrap();
        container.register_class("service", service_class()).unwrap();
        assert!(matches!(
            container.resolve("service"),
            Err(ContainerError::UnknownComponent(name)) if name == "bar"
        ));
    }

    #[test]
    fn test_register_duplicate() {
        let container = Container::new();
        container.register_value("x", Arc::new(1i64)).unwrap();
        assert!(matches!(
            container.register_value("x", Arc::new(2i64)),
            Err(ContainerError::AlreadyRegistered(_))
        ));

        container.set_override_required_modules(true);
        container.register_value("x", Arc::new(2i64)).unwrap();
        assert_eq!(*container.resolve_as::<i64>("x").unwrap(), 2);
    }

    #[test]
    fn test_resolve_as_wrong_type() {
        let container = Container::new();
        container.register_value("x", Arc::new(1i64)).unwrap();
        assert!(matches!(
            container.resolve_as::<String>("x"),
            Err(ContainerError::DependencyType { .. })
        ));
    }

    #[test]
    fn test_is_registered_includes_required_names() {
        let container = Container::new();
        assert!(!container.is_registered("later"));
        container.require("later", "./later").unwrap();
        assert!(container.is_registered("later"));
    }

    #[test]
    fn test_registered_names_sorted() {
        let container = Container::new();
        container.register_value("zeta", Arc::new(1i64)).unwrap();
        container.register_value("alpha", Arc::new(2i64)).unwrap();
        assert_eq!(container.registered_names(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_registered_names_include_required() {
        let container = Container::new();
        container.register_value("alpha", Arc::new(1i64)).unwrap();
        container.require("beta", "./beta").unwrap();
        container.require("alpha", "./alpha").unwrap();
        assert_eq!(container.registered_names(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_dispose_reverse_resolution_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let container = Container::new();
        container.register_value("first", tracked("first", &log, false)).unwrap();
        container.register_value("second", tracked("second", &log, false)).unwrap();
        container.register_value("unused", tracked("unused", &log, false)).unwrap();
        container.register_value("plain", Arc::new(5u32)).unwrap();

        container.resolve("first").unwrap();
        container.resolve("second").unwrap();
        container.resolve("plain").unwrap();

        container.dispose().unwrap();
        assert_eq!(*log.lock(), vec!["second", "first"]);
        assert_eq!(container.state(), ContainerState::Disposed);
        assert!(container.is_registered("first"));
    }

    #[test]
    fn test_dispose_twice_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let container = Container::new();
        container.register_value("x", tracked("x", &log, false)).unwrap();
        container.resolve("x").unwrap();

        container.dispose().unwrap();
        container.dispose().unwrap();
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_dispose_shared_instance_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = tracked("shared", &log, false);
        let container = Container::new();
        container.register_value("a", shared.clone()).unwrap();
        container.register_value("b", shared).unwrap();
        container.resolve("a").unwrap();
        container.resolve("b").unwrap();

        container.dispose().unwrap();
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_dispose_failures_are_counted() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let container = Container::new();
        container.register_value("bad", tracked("bad", &log, true)).unwrap();
        container.register_value("good", tracked("good", &log, false)).unwrap();
        container.resolve("bad").unwrap();
        container.resolve("good").unwrap();

        let result = container.dispose();
        assert!(matches!(result, Err(ContainerError::DisposeFailed(1))));
        assert_eq!(*log.lock(), vec!["good", "bad"]);
    }
