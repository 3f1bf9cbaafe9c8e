//! Annotation-driven application bootstrapping based on [trellis_di] dependency injection.
//!
//! Applications declare their services as components, group them with controllers into
//! [modules](module), and let an [Application](application::Application) do the wiring: all
//! providers and controllers of a module are constructed (each exactly once), and every routed
//! controller method is compiled into a [RouteTable](router::RouteTable) entry. The framework does
//! not serve requests - the route table is the product of bootstrapping, and each handler can
//! optionally be invoked once as a smoke test.
//!
//! ```
//! use trellis::application;
//! use trellis::controller;
//! use trellis::Module;
//! use trellis_di::instance_provider::ComponentInstancePtr;
//! use trellis_di::Component;
//!
//! #[derive(Component)]
//! struct UserService;
//!
//! #[derive(Component)]
//! struct UserController {
//!     service: ComponentInstancePtr<UserService>,
//! }
//!
//! #[controller(path = "/users")]
//! impl UserController {
//!     #[get("/")]
//!     fn get_all_users(&self) {}
//! }
//!
//! #[derive(Module)]
//! #[module(providers = [UserService], controllers = [UserController])]
//! struct UsersModule;
//!
//! let routes = application::create_default()
//!     .expect("unable to create application")
//!     .bootstrap::<UsersModule>()
//!     .expect("error bootstrapping module");
//!
//! assert_eq!(routes.len(), 1);
//! ```
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers and `Send + Sync` trait bounds
//! * `derive` - automatically import helper macros

pub mod application;
pub mod config;
pub mod controller;
pub mod module;
pub mod router;

#[cfg(feature = "derive")]
pub use trellis_derive::*;
