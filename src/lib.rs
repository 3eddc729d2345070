//! Declarative configuration graphs for dependency injection. Describe your
//! slots once, resolve them with inputs, and hand the graph to an evaluator.
//!
//! A configuration type lists named **specs**: plain values, inputs the caller
//! must provide, nested configurations, or opaque value specs that a
//! downstream container knows how to build. Specfig turns that description
//! into a realized, overridable graph.
//!
//! ```ignore
//! struct DbConfig;
//!
//! impl Config for DbConfig {
//!     fn declare(decl: &mut Declarations) {
//!         decl.global_input("db_url", Input::of(InputType::String))
//!             .local_input("pool", Input::of(InputType::Integer).with_default(5));
//!     }
//! }
//!
//! struct AppConfig;
//!
//! impl Config for AppConfig {
//!     fn declare(decl: &mut Declarations) {
//!         decl.object("name", "app")
//!             .config("db", Blueprint::new::<DbConfig>().input("pool", 8));
//!     }
//! }
//!
//! let mut graph = get_config::<AppConfig>([("db_url", "pg://prod")])?;
//! graph.set("name", "staging")?;
//! graph.freeze_all();
//! ```
//!
//! # Blueprints, not instances
//!
//! [`Blueprint::new`] does not build anything. It records "configuration type
//! `C` with these local inputs" and nothing else: no inputs are checked, no
//! children are created. All work happens in [`Blueprint::get`], which:
//!
//! 1. creates a [`ConfigLocator`] seeded with the global inputs,
//! 2. realizes the root, recursively realizing every nested blueprint through
//!    the same locator,
//! 3. rejects global inputs that no config in the tree declares.
//!
//! Because declarations only produce blueprints, nesting a config inside
//! another is just another spec, and a config type can be referenced from many
//! places without side effects.
//!
//! # Identity
//!
//! Every spec has a [`SpecId`]. Declarations run once per configuration type
//! per process, so a type's slots have the same ids in every instance and every
//! session. The id survives everything that happens to the slot afterwards:
//!
//! - resolving an input rewrites it into an object spec with the **same** id;
//! - [`ConfigGraph::set`] writes a replacement with the **same** id.
//!
//! Downstream evaluators can therefore key dependency graphs on `SpecId` and
//! stay correct after overrides.
//!
//! # Inputs
//!
//! - **Global inputs** are supplied by the caller of [`Blueprint::get`]. Any
//!   config in the tree can declare one; instances of the same type share the
//!   declaration, so they also share the value. Two *different* declarations
//!   with the same name are a collision and fail resolution.
//! - **Local inputs** are supplied by the blueprint that creates the config
//!   (`Blueprint::new::<DbConfig>().input("pool", 8)`). They are invisible to
//!   the caller's validation.
//!
//! Either kind may carry a default and an expected [`InputType`]. A missing
//! input without a default, a value of the wrong type, and a global input the
//! tree never declares all fail resolution. The last check is strict on
//! purpose: a typo in an input name surfaces immediately instead of being
//! silently ignored.
//!
//! [`Inputs`] assembles global inputs from explicit values, TOML text or
//! files, prefixed environment variables, or any `Serialize` struct:
//!
//! ```ignore
//! let inputs = Inputs::new()
//!     .toml_file("inputs.toml")?
//!     .env("MYAPP", std::env::vars())?
//!     .set("port", 9000);
//! ```
//!
//! # Sharing
//!
//! Within one session, blueprints that compare equal (same type, equal local
//! inputs) realize to one instance. Two parents that nest
//! `Blueprint::new::<DbConfig>().input("pool", 8)` see the same child, and
//! a perturbation made through one path is visible through the other.
//! Separate calls to [`Blueprint::get`] never share instances.
//!
//! # Lifecycle
//!
//! ```text
//! loaded (mutable) ──freeze()──▶ frozen
//! ```
//!
//! An instance is loaded once when it is realized. Until frozen, existing
//! specs may be replaced through [`ConfigGraph::set`]; plain values are wrapped
//! into object specs. Adding names and replacing child configs are errors at
//! any time. Freezing is per instance, one-way and idempotent;
//! [`ConfigGraph::freeze_all`] freezes the whole session.
//!
//! # Paths
//!
//! Reads and writes accept dotted paths. `graph.get("db.pool")` is the same as
//! `graph.child("db")?.get("pool")`, and `graph.set("db.pool", 16)` writes to
//! the `db` instance (subject to *its* frozen state).
//!
//! # Error handling
//!
//! All fallible operations return [`SpecfigError`]. Errors are caller-facing
//! and never recovered internally: a failed resolution returns no graph at all.
//! See the [`error`] module for the full set.

pub mod error;
pub mod types;

mod blueprint;
mod check;
mod graph;
mod inputs;
mod instance;
mod locator;
mod ops;
mod spec;

#[cfg(test)]
mod fixtures;

pub use blueprint::{Blueprint, Config, ConfigType, Declarations, Declared, blueprint, get_config};
pub use check::check;
pub use error::{InputScope, SpecfigError};
pub use graph::{ConfigGraph, ConfigView, Entry};
pub use inputs::Inputs;
pub use instance::{ConfigInstance, Slot};
pub use locator::{ConfigId, ConfigLocator};
pub use ops::{Listing, SpecEntry};
pub use spec::{Input, Perturbation, Spec, SpecKind};
pub use types::{InputDefault, InputType, SpecId};
