#[cfg(test)]
pub mod test {
    use toml::Table;

    use crate::blueprint::{Blueprint, Config, Declarations};
    use crate::spec::{Input, Spec};
    use crate::types::InputType;

    /// Database settings with one local and one global input.
    pub struct DbConfig;

    impl Config for DbConfig {
        fn declare(decl: &mut Declarations) {
            decl.local_input("pool", Input::of(InputType::Integer).with_default(5))
                .object("driver", "postgres")
                .global_input(
                    "db_url",
                    Input::of(InputType::String).with_default("pg://localhost"),
                );
        }
    }

    #[derive(Debug)]
    pub struct ServerFactory;

    /// Two equal nested blueprints (`db`, `cache_db`) and one distinct (`replica`).
    pub struct AppConfig;

    impl Config for AppConfig {
        fn declare(decl: &mut Declarations) {
            decl.object("name", "app")
                .config("db", Blueprint::new::<DbConfig>().input("pool", 8))
                .config("cache_db", Blueprint::new::<DbConfig>().input("pool", 8))
                .config("replica", Blueprint::new::<DbConfig>().input("pool", 2))
                .spec("server", Spec::deferred("server factory", ServerFactory));
        }
    }

    pub struct InputsConfig;

    impl Config for InputsConfig {
        fn declare(decl: &mut Declarations) {
            decl.global_input("port", Input::of(InputType::Integer))
                .global_input(
                    "host",
                    Input::of(InputType::String).with_default("localhost"),
                );
        }
    }

    pub struct ExampleConfig;

    impl Config for ExampleConfig {
        fn declare(decl: &mut Declarations) {
            decl.global_input("x", Input::of(InputType::Integer))
                .local_input("y", Input::of(InputType::Integer).with_default(5));
        }
    }

    pub struct TypedConfig;

    impl Config for TypedConfig {
        fn declare(decl: &mut Declarations) {
            decl.global_input("port", Input::of(InputType::Integer));
        }
    }

    pub struct NeedsSize;

    impl Config for NeedsSize {
        fn declare(decl: &mut Declarations) {
            decl.local_input("size", Input::of(InputType::Integer));
        }
    }

    pub struct BadDefault;

    impl Config for BadDefault {
        fn declare(decl: &mut Declarations) {
            decl.local_input("size", Input::of(InputType::Integer).with_default("big"));
        }
    }

    // -- Global input sharing and collisions ------------------------------------

    pub struct SharedX;

    impl Config for SharedX {
        fn declare(decl: &mut Declarations) {
            decl.global_input("x", Input::of(InputType::Integer))
                .local_input("tag", Input::of(InputType::String).with_default(""));
        }
    }

    pub struct OtherX;

    impl Config for OtherX {
        fn declare(decl: &mut Declarations) {
            decl.global_input("x", Input::of(InputType::Integer));
        }
    }

    /// Two instances of one type: the `x` slot has one id.
    pub struct SharingParent;

    impl Config for SharingParent {
        fn declare(decl: &mut Declarations) {
            decl.config("left", Blueprint::new::<SharedX>().input("tag", "l"))
                .config("right", Blueprint::new::<SharedX>().input("tag", "r"));
        }
    }

    /// Two types that each declare their own `x`.
    pub struct CollidingParent;

    impl Config for CollidingParent {
        fn declare(decl: &mut Declarations) {
            decl.config("a", Blueprint::new::<SharedX>())
                .config("b", Blueprint::new::<OtherX>());
        }
    }

    // -- Nesting ---------------------------------------------------------------

    pub struct InnerConfig;

    impl Config for InnerConfig {
        fn declare(decl: &mut Declarations) {
            decl.object("leaf", 1);
        }
    }

    pub struct MiddleConfig;

    impl Config for MiddleConfig {
        fn declare(decl: &mut Declarations) {
            decl.config("inner", Blueprint::new::<InnerConfig>());
        }
    }

    pub struct OuterConfig;

    impl Config for OuterConfig {
        fn declare(decl: &mut Declarations) {
            decl.object("label", "outer")
                .config("middle", Blueprint::new::<MiddleConfig>());
        }
    }

    pub struct CycleA;

    impl Config for CycleA {
        fn declare(decl: &mut Declarations) {
            decl.config("b", Blueprint::new::<CycleB>());
        }
    }

    pub struct CycleB;

    impl Config for CycleB {
        fn declare(decl: &mut Declarations) {
            decl.config("a", Blueprint::new::<CycleA>());
        }
    }

    /// Nests itself with a NaN local input.
    pub struct NanLoop;

    impl Config for NanLoop {
        fn declare(decl: &mut Declarations) {
            decl.config("me", Blueprint::new::<NanLoop>().input("r", f64::NAN));
        }
    }

    // -- Declaration edge cases ------------------------------------------------

    pub struct PartialConfig;

    impl Config for PartialConfig {
        fn declare(decl: &mut Declarations) {
            let mut kwargs = Table::new();
            kwargs.insert("retries".into(), 3.into());
            decl.partial("kwargs", kwargs).object("value", true);
        }
    }

    pub struct DuplicateName;

    impl Config for DuplicateName {
        fn declare(decl: &mut Declarations) {
            decl.object("a", 1).object("a", 2);
        }
    }

    pub struct DottedName;

    impl Config for DottedName {
        fn declare(decl: &mut Declarations) {
            decl.object("a.b", 1);
        }
    }

    #[test]
    fn declarations_keep_order() {
        let mut decl = Declarations::default();
        AppConfig::declare(&mut decl);
        let names: Vec<&str> = decl.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "db", "cache_db", "replica", "server"]);
    }
}
